use std::fmt::Debug;

use crate::{cpu::interrupt::InterruptController, error::Error};

pub mod cpu;
#[cfg(test)]
pub(crate) mod mock;

/// Everything the CPU can reach while executing.
///
/// The CPU never calls into the PPU; it reads and writes memory and hands the
/// cycles it consumed to [`Bus::clock`], which lets the rest of the machine
/// catch up and raise interrupts.
pub trait Bus: Debug {
    fn read(&mut self, addr: u16) -> Result<u8, Error>;

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Error>;

    fn push(&mut self, value: u8) -> Result<(), Error>;

    fn pop(&mut self) -> Result<u8, Error>;

    fn set_stack_ptr(&mut self, value: u8);

    fn stack_ptr(&self) -> u8;

    /// Advances everything clocked off the CPU by `cpu_cycles`.
    fn clock(
        &mut self,
        cpu_cycles: u64,
        interrupts: &mut InterruptController,
    ) -> Result<(), Error>;

    /// Little-endian 16-bit read.
    fn read_word(&mut self, addr: u16) -> Result<u16, Error> {
        let lo = self.read(addr)?;
        let hi = self.read(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

impl<T: Bus + ?Sized> Bus for &mut T {
    fn read(&mut self, addr: u16) -> Result<u8, Error> {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        (**self).write(addr, value)
    }

    fn push(&mut self, value: u8) -> Result<(), Error> {
        (**self).push(value)
    }

    fn pop(&mut self) -> Result<u8, Error> {
        (**self).pop()
    }

    fn set_stack_ptr(&mut self, value: u8) {
        (**self).set_stack_ptr(value)
    }

    fn stack_ptr(&self) -> u8 {
        (**self).stack_ptr()
    }

    fn clock(
        &mut self,
        cpu_cycles: u64,
        interrupts: &mut InterruptController,
    ) -> Result<(), Error> {
        (**self).clock(cpu_cycles, interrupts)
    }
}
