use std::path::Path;

use tracing::info;

use crate::{
    bus::{Bus, cpu::CpuBus},
    cartridge::{Cartridge, header::Header},
    config::EntryPoint,
    cpu::interrupt::InterruptSink,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod debug;
pub mod error;
pub mod memory;
pub mod ppu;
pub mod space;

pub use cartridge::{load_cartridge, load_cartridge_from_file};
pub use config::MachineConfig;
pub use cpu::{Cpu, CpuSnapshot, interrupt::Interrupt};
pub use debug::{Watch, WatchError};
pub use error::Error;
pub use memory::MainMemory;
pub use ppu::Ppu;

/// CPU, PPU and main memory wired together around one cartridge.
///
/// The machine is single-threaded: the PPU's register bridge shares state
/// through `Rc`, so a `Nes` never leaves the thread that built it.
#[derive(Debug)]
pub struct Nes {
    cpu: Cpu,
    memory: MainMemory,
    ppu: Ppu,
    header: Header,
    config: MachineConfig,
}

impl Nes {
    /// Boots `cartridge`: fills VRAM from CHR, attaches the PPU register
    /// bridge and points `pc` at the configured entry point.
    pub fn new(cartridge: Cartridge, config: MachineConfig) -> Result<Self, Error> {
        let (header, mapper) = cartridge.into_parts();

        let chr = match mapper.chr_size().min(ppu_mem::CHR_BANK_SIZE) {
            0 => Vec::new(),
            len => mapper.chr_read_block(0..=(len - 1) as u16)?,
        };
        let ppu = Ppu::new(&chr)?;
        let mut memory = MainMemory::new(mapper)?;
        ppu.attach(&mut memory)?;

        let entry = match config.entry_point {
            EntryPoint::ResetVector => memory.peek_word(cpu_mem::RESET_VECTOR)?,
            EntryPoint::Fixed(addr) => addr,
        };
        let mut cpu = Cpu::new(&config);
        cpu.set_pc(entry);

        info!(
            mapper = header.mapper,
            prg_rom = header.prg_rom_size,
            chr_rom = header.chr_rom_size,
            "booted at ${entry:04X} (entry point: {})",
            config.entry_point
        );

        Ok(Self {
            cpu,
            memory,
            ppu,
            header,
            config,
        })
    }

    /// Parses an iNES image and boots it.
    pub fn from_rom_bytes(bytes: &[u8], config: MachineConfig) -> Result<Self, Error> {
        Self::new(load_cartridge(bytes)?, config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, config: MachineConfig) -> Result<Self, Error> {
        Self::new(load_cartridge_from_file(path)?, config)
    }

    /// Executes instructions until more than `budget` cycles were consumed or
    /// the CPU is paused. Returns the cycles consumed.
    pub fn run(&mut self, budget: u64) -> Result<u64, Error> {
        let mut bus = CpuBus::new(&mut self.memory, &mut self.ppu);
        self.cpu.run(budget, &mut bus)
    }

    /// Executes exactly one instruction unless paused.
    pub fn step(&mut self) -> Result<u64, Error> {
        self.run(1)
    }

    /// Single-steps until one of `watches` holds, at most `max_instructions`
    /// times. Returns the index of the first watch that fired.
    pub fn run_until_watch(
        &mut self,
        watches: &[Watch],
        max_instructions: usize,
    ) -> Result<Option<usize>, Error> {
        for _ in 0..max_instructions {
            self.step()?;
            for (index, watch) in watches.iter().enumerate() {
                if watch.evaluate(self)? {
                    info!("watch #{index} `{watch}` fired at ${:04X}", self.cpu.pc());
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }

    /// Toggles the pause flag checked before every instruction.
    pub fn pause(&mut self) {
        self.cpu.pause();
    }

    pub fn is_paused(&self) -> bool {
        self.cpu.is_paused()
    }

    pub fn request_interrupt(&mut self, kind: Interrupt) {
        self.cpu.request_interrupt(kind);
    }

    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        self.cpu.pending_interrupt()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    /// CPU-visible read, observers included.
    pub fn read(&mut self, addr: u16) -> Result<u8, Error> {
        self.memory.read(addr)
    }

    /// Side-effect free read.
    pub fn peek(&self, addr: u16) -> Result<u8, Error> {
        self.memory.peek(addr)
    }

    /// CPU-visible write, including a DMA triggered through `$4014`.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        CpuBus::new(&mut self.memory, &mut self.ppu).write(addr, value)
    }
}
