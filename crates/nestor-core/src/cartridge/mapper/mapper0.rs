//! Mapper 0 (NROM).
//!
//! NROM has no banking hardware: the CPU sees the whole PRG ROM and the PPU
//! the whole CHR ROM.
//!
//! # Memory Layout
//!
//! - **Cartridge window**: `$4020-$FFFF`, one [`AddressSpace`].
//! - **PRG ROM**: mapped at `$8000-$FFFF`.
//!   - **NROM-128 (16 KiB)**: appears at both `$8000` and `$C000`.
//!   - **NROM-256 (32 KiB)**: fills `$8000-$FFFF` linearly.
//! - **Trainer**: when present, its 512 bytes land at `$7000-$71FF`.
//! - **CHR**: copied verbatim. Images without CHR banks get 8 KiB of CHR RAM.
//!
//! Writes into `$8000-$FFFF` are dropped; the rest of the window behaves as RAM.

use std::ops::RangeInclusive;

use crate::{
    cartridge::mapper::Mapper,
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    space::{AddressSpace, BlockAccessible, Observable, Observer},
};

/// Where a trainer is placed inside the cartridge window.
const TRAINER_ADDR: u16 = 0x7000;

#[derive(Debug, Clone)]
pub struct Mapper0 {
    prg: AddressSpace,
    chr: AddressSpace,
}

impl Mapper0 {
    pub fn new(prg_rom: &[u8], chr_rom: &[u8], trainer: Option<&[u8]>) -> Result<Self, Error> {
        let mut prg = AddressSpace::new(cpu_mem::CARTRIDGE_SPACE_BASE, cpu_mem::CARTRIDGE_SPACE_SIZE);

        let window_len = 0x1_0000 - cpu_mem::PRG_ROM_START as usize;
        if !prg_rom.is_empty() {
            let window: Vec<u8> = (0..window_len)
                .map(|offset| prg_rom[offset % prg_rom.len()])
                .collect();
            prg.write_block(cpu_mem::PRG_ROM_START, &window)?;
        }

        if let Some(trainer) = trainer {
            prg.write_block(TRAINER_ADDR, trainer)?;
        }

        let chr = if chr_rom.is_empty() {
            AddressSpace::new(ppu_mem::CHR_START, ppu_mem::CHR_BANK_SIZE)
        } else {
            let mut chr = AddressSpace::new(ppu_mem::CHR_START, chr_rom.len());
            chr.write_block(ppu_mem::CHR_START, chr_rom)?;
            chr
        };

        Ok(Self { prg, chr })
    }
}

impl Mapper for Mapper0 {
    fn prg_start(&self) -> u16 {
        self.prg.start()
    }

    fn prg_size(&self) -> usize {
        self.prg.size()
    }

    fn prg_read(&mut self, addr: u16) -> Result<u8, Error> {
        self.prg.read(addr)
    }

    fn prg_peek(&self, addr: u16) -> Result<u8, Error> {
        self.prg.peek(addr)
    }

    fn prg_write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        if addr >= cpu_mem::PRG_ROM_START {
            tracing::trace!("ignoring PRG ROM write ${addr:04X} <- ${value:02X}");
            return Ok(());
        }
        self.prg.write(addr, value)
    }

    fn prg_register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        self.prg.register_for_read(addr, observer)
    }

    fn prg_register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        self.prg.register_for_write(addr, observer)
    }

    fn chr_size(&self) -> usize {
        self.chr.size()
    }

    fn chr_read(&mut self, addr: u16) -> Result<u8, Error> {
        self.chr.read(addr)
    }

    fn chr_write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        self.chr.write(addr, value)
    }

    fn chr_read_block(&self, range: RangeInclusive<u16>) -> Result<Vec<u8>, Error> {
        self.chr.read_block(range)
    }

    fn chr_register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        self.chr.register_for_read(addr, observer)
    }

    fn chr_register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        self.chr.register_for_write(addr, observer)
    }

    fn mapper_id(&self) -> u16 {
        0
    }

    fn name(&self) -> &'static str {
        "NROM"
    }
}
