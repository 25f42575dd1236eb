use crate::{
    bus::Bus,
    cpu::interrupt::InterruptController,
    error::Error,
    memory::MainMemory,
    ppu::Ppu,
    space::Stacked,
};

/// CPU-side bus: main memory plus the PPU it clocks.
///
/// OAM DMA is latched by the PPU's `$4014` observer and carried out here, right
/// after the write that requested it returns.
#[derive(Debug)]
pub struct CpuBus<'a> {
    memory: &'a mut MainMemory,
    ppu: &'a mut Ppu,
}

impl<'a> CpuBus<'a> {
    pub fn new(memory: &'a mut MainMemory, ppu: &'a mut Ppu) -> Self {
        Self { memory, ppu }
    }

    fn oam_dma(&mut self, page: u8) -> Result<(), Error> {
        let base = u16::from(page) << 8;
        let mut bytes = [0u8; 256];
        for (offset, byte) in bytes.iter_mut().enumerate() {
            *byte = self.memory.read(base.wrapping_add(offset as u16))?;
        }
        self.ppu.load_oam(&bytes)?;
        tracing::debug!("OAM DMA from ${base:04X}");
        Ok(())
    }
}

impl Bus for CpuBus<'_> {
    fn read(&mut self, addr: u16) -> Result<u8, Error> {
        self.memory.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        self.memory.write(addr, value)?;
        if let Some(page) = self.ppu.take_dma_request() {
            self.oam_dma(page)?;
        }
        Ok(())
    }

    fn push(&mut self, value: u8) -> Result<(), Error> {
        self.memory.push(value)
    }

    fn pop(&mut self) -> Result<u8, Error> {
        self.memory.pop()
    }

    fn set_stack_ptr(&mut self, value: u8) {
        self.memory.set_stack_ptr(value);
    }

    fn stack_ptr(&self) -> u8 {
        self.memory.stack_ptr()
    }

    fn clock(
        &mut self,
        cpu_cycles: u64,
        interrupts: &mut InterruptController,
    ) -> Result<(), Error> {
        self.ppu.update(cpu_cycles, self.memory, interrupts)
    }
}
