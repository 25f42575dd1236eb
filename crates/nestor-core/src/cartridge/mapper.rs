use std::{fmt::Debug, ops::RangeInclusive};

use dyn_clone::DynClone;

use crate::{error::Error, space::Observer};

pub mod mapper0;

pub use mapper0::Mapper0;

/// Board logic resolving CPU-side PRG and PPU-side CHR accesses.
///
/// The mapper owns both regions; main memory forwards every address in
/// `prg_start()..prg_start() + prg_size()` here, and the PPU pulls CHR out once
/// at boot through [`Mapper::chr_read_block`].
pub trait Mapper: DynClone + Debug {
    /// First CPU address served by the cartridge.
    fn prg_start(&self) -> u16;

    /// Number of CPU addresses served, starting at [`Mapper::prg_start`].
    fn prg_size(&self) -> usize;

    fn prg_read(&mut self, addr: u16) -> Result<u8, Error>;

    /// Read without notifying observers.
    fn prg_peek(&self, addr: u16) -> Result<u8, Error>;

    fn prg_write(&mut self, addr: u16, value: u8) -> Result<(), Error>;

    fn prg_register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error>;

    fn prg_register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error>;

    fn chr_size(&self) -> usize;

    fn chr_read(&mut self, addr: u16) -> Result<u8, Error>;

    fn chr_write(&mut self, addr: u16, value: u8) -> Result<(), Error>;

    fn chr_read_block(&self, range: RangeInclusive<u16>) -> Result<Vec<u8>, Error>;

    fn chr_register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error>;

    fn chr_register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error>;

    /// iNES mapper number.
    fn mapper_id(&self) -> u16;

    /// Human readable board name.
    fn name(&self) -> &'static str;

    /// Whether `addr` falls inside the PRG window.
    fn serves_prg(&self, addr: u16) -> bool {
        let start = self.prg_start() as usize;
        (start..start + self.prg_size()).contains(&(addr as usize))
    }
}

dyn_clone::clone_trait_object!(Mapper);
