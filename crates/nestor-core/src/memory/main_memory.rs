use std::fmt;

use crate::{
    cartridge::Mapper,
    error::Error,
    memory::cpu as cpu_mem,
    space::{AddressSpace, Mirrorable, Observable, Observer, StackPage, Stacked},
};

/// The CPU's view of memory: internal RAM and I/O cells below `$4020`, the
/// cartridge mapper above.
///
/// Accesses, observer registrations and peeks are routed by address. Anything
/// neither side serves fails with [`Error::AddressOutOfRange`].
#[derive(Clone)]
pub struct MainMemory {
    ram: AddressSpace,
    mapper: Box<dyn Mapper>,
    stack: StackPage,
}

enum Route {
    Ram,
    Cartridge,
}

impl MainMemory {
    pub fn new(mapper: Box<dyn Mapper>) -> Result<Self, Error> {
        let mut ram = AddressSpace::new(cpu_mem::RAM_START, cpu_mem::RAM_SIZE);

        for mirror in cpu_mem::INTERNAL_RAM_MIRRORS {
            ram.mirror(cpu_mem::INTERNAL_RAM, mirror)?;
        }

        let registers = cpu_mem::PPU_REGISTERS;
        let block = *registers.end() - *registers.start() + 1;
        let mut start = *registers.start() + block;
        while start <= cpu_mem::PPU_REGISTER_MIRROR_END {
            ram.mirror(registers.clone(), start..=start + block - 1)?;
            start += block;
        }

        Ok(Self {
            ram,
            mapper,
            stack: StackPage::new(cpu_mem::STACK_PAGE_START),
        })
    }

    pub fn read(&mut self, addr: u16) -> Result<u8, Error> {
        match self.route(addr)? {
            Route::Ram => self.ram.read(addr),
            Route::Cartridge => self.mapper.prg_read(addr),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        match self.route(addr)? {
            Route::Ram => self.ram.write(addr, value),
            Route::Cartridge => self.mapper.prg_write(addr, value),
        }
    }

    /// Reads without notifying observers.
    pub fn peek(&self, addr: u16) -> Result<u8, Error> {
        match self.route(addr)? {
            Route::Ram => self.ram.peek(addr),
            Route::Cartridge => self.mapper.prg_peek(addr),
        }
    }

    /// Little-endian 16-bit peek.
    pub fn peek_word(&self, addr: u16) -> Result<u16, Error> {
        let lo = self.peek(addr)?;
        let hi = self.peek(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn ram(&self) -> &AddressSpace {
        &self.ram
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    fn route(&self, addr: u16) -> Result<Route, Error> {
        if self.mapper.serves_prg(addr) {
            Ok(Route::Cartridge)
        } else if self.ram.contains(addr) {
            Ok(Route::Ram)
        } else {
            Err(Error::AddressOutOfRange { addr })
        }
    }
}

impl Observable for MainMemory {
    fn register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        match self.route(addr)? {
            Route::Ram => self.ram.register_for_read(addr, observer),
            Route::Cartridge => self.mapper.prg_register_for_read(addr, observer),
        }
    }

    fn register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        match self.route(addr)? {
            Route::Ram => self.ram.register_for_write(addr, observer),
            Route::Cartridge => self.mapper.prg_register_for_write(addr, observer),
        }
    }
}

impl Stacked for MainMemory {
    fn push(&mut self, value: u8) -> Result<(), Error> {
        let addr = self.stack.push_addr();
        self.ram.write(addr, value)
    }

    fn pop(&mut self) -> Result<u8, Error> {
        let addr = self.stack.pop_addr();
        self.ram.read(addr)
    }

    fn set_stack_ptr(&mut self, value: u8) {
        self.stack.set_ptr(value);
    }

    fn stack_ptr(&self) -> u8 {
        self.stack.ptr()
    }
}

impl fmt::Debug for MainMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainMemory")
            .field("ram", &self.ram)
            .field("mapper", &self.mapper.name())
            .field("stack_ptr", &format_args!("${:02X}", self.stack.ptr()))
            .finish()
    }
}
