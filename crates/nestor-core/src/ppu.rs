//! Picture Processing Unit: video memory, the scanline/dot timing machine and
//! the bridge that turns CPU register accesses into PPU state changes.
//!
//! The CPU never calls into the PPU directly. [`Ppu::attach`] registers
//! observers on the register cells of [`MainMemory`]; those observers share
//! the PPU's state through an `Rc<RefCell<_>>`, so everything stays on the
//! thread that owns the machine.
//!
//! No pixels are produced. The fetch pipeline only latches the bytes it would
//! feed a renderer.

mod fetch;
mod registers;
pub mod timing;

use std::{cell::RefCell, ops::RangeInclusive, rc::Rc};

use tracing::{debug, trace};

use crate::{
    cpu::interrupt::{Interrupt, InterruptSink},
    error::Error,
    memory::{
        MainMemory,
        ppu::{self as ppu_mem, Register},
    },
    space::{AddressSpace, BlockAccessible, Mirrorable, Observable, observer},
};

pub use fetch::{FetchLatches, FetchStep};
pub use registers::{ColorMode, Control, Mask};

use registers::{Registers, Status};
use timing::{DOTS_PER_CPU_CYCLE, Timing};

/// State reachable from the register observers.
#[derive(Debug)]
struct Shared {
    registers: Registers,
    vram: AddressSpace,
    oam: AddressSpace,
}

#[derive(Debug)]
pub struct Ppu {
    shared: Rc<RefCell<Shared>>,
    timing: Timing,
    latches: FetchLatches,
}

impl Ppu {
    /// Builds VRAM with `chr` copied to `$0000` and the palette and
    /// `$4000-$7FFF` mirrors in place. Only the first 8 KiB of `chr` are used.
    pub fn new(chr: &[u8]) -> Result<Self, Error> {
        let mut vram = AddressSpace::new(0, ppu_mem::VRAM_SIZE);
        let chr = &chr[..chr.len().min(ppu_mem::CHR_BANK_SIZE)];
        vram.write_block(ppu_mem::CHR_START, chr)?;

        let base = ppu_mem::PALETTE_BASE;
        for addr in ppu_mem::BACKGROUND_MIRRORS {
            vram.mirror(base..=base, addr..=addr)?;
        }
        let len = palette_len();
        let mut start = *ppu_mem::PALETTE.end() + 1;
        while start <= ppu_mem::PALETTE_MIRROR_END {
            vram.mirror(ppu_mem::PALETTE, start..=start + (len - 1))?;
            start += len;
        }
        vram.mirror(ppu_mem::MIRRORED_VRAM, ppu_mem::VRAM_MIRROR)?;

        Ok(Self {
            shared: Rc::new(RefCell::new(Shared {
                registers: Registers::default(),
                vram,
                oam: AddressSpace::new(0, ppu_mem::OAM_SIZE),
            })),
            timing: Timing::default(),
            latches: FetchLatches::default(),
        })
    }

    /// Hooks the register bridge into `memory`.
    ///
    /// Call once per machine: every call adds another set of observers.
    pub fn attach(&self, memory: &mut MainMemory) -> Result<(), Error> {
        for register in [
            Register::Control,
            Register::Mask,
            Register::OamAddr,
            Register::OamData,
            Register::Addr,
            Register::Data,
            Register::OamDma,
        ] {
            let shared = Rc::clone(&self.shared);
            memory.register_for_write(
                register.addr(),
                observer(move |_, notification| {
                    on_write(&mut shared.borrow_mut(), register, notification.value)
                }),
            )?;
        }

        let shared = Rc::clone(&self.shared);
        memory.register_for_read(
            Register::Status.addr(),
            observer(move |cells, notification| {
                let cleared = cells.get(notification.addr)? & !Status::VERTICAL_BLANK.bits();
                cells.set(notification.addr, cleared)?;
                shared.borrow_mut().registers.latch.reset();
                Ok(())
            }),
        )?;

        let shared = Rc::clone(&self.shared);
        memory.register_for_read(
            Register::Data.addr(),
            observer(move |_, notification| {
                store_vram_data(&mut shared.borrow_mut(), notification.value)
            }),
        )?;

        debug!("PPU register bridge attached");
        Ok(())
    }

    /// Advances the PPU by the dots matching `cpu_cycles`.
    ///
    /// Raises vblank first when the frame counter crosses its threshold, then
    /// walks the scanline machine one dot at a time.
    pub fn update<S>(
        &mut self,
        cpu_cycles: u64,
        memory: &mut MainMemory,
        interrupts: &mut S,
    ) -> Result<(), Error>
    where
        S: InterruptSink + ?Sized,
    {
        let dots = cpu_cycles * DOTS_PER_CPU_CYCLE;

        if self.timing.accumulate(dots) {
            let status = Register::Status.addr();
            let value = memory.peek(status)? | Status::VERTICAL_BLANK.bits();
            memory.write(status, value)?;
            let nmi = self.shared.borrow().registers.control.nmi_enabled();
            debug!(nmi, "vblank");
            if nmi {
                interrupts.request_interrupt(Interrupt::Nmi);
            }
        }

        let shared = self.shared.borrow();
        for _ in 0..dots {
            if let Some(slot) = self.timing.tick() {
                self.latches
                    .fetch(&shared.vram, shared.registers.control, slot)?;
            }
        }
        Ok(())
    }

    /// Returns timing and registers to their power-on state. VRAM and OAM
    /// contents are kept.
    pub fn reset(&mut self) {
        self.timing = Timing::default();
        self.latches = FetchLatches::default();
        self.shared.borrow_mut().registers = Registers::default();
    }

    /// Page written to `$4014` since the last call, if any.
    pub fn take_dma_request(&mut self) -> Option<u8> {
        self.shared.borrow_mut().registers.dma_request.take()
    }

    /// Copies `bytes` into OAM starting at `$00`.
    pub fn load_oam(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.shared.borrow_mut().oam.write_block(0, bytes)
    }

    pub fn current_scanline(&self) -> u16 {
        self.timing.scanline()
    }

    /// Dot within the current scanline.
    pub fn current_dot(&self) -> u16 {
        self.timing.dot()
    }

    pub fn memory_fetch_phase(&self) -> u8 {
        self.timing.fetch_phase()
    }

    pub fn fetch_latches(&self) -> FetchLatches {
        self.latches
    }

    pub fn control(&self) -> Control {
        self.shared.borrow().registers.control
    }

    pub fn mask(&self) -> Mask {
        self.shared.borrow().registers.mask
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mask().color_mode()
    }

    /// Target of the next `$2007` access.
    pub fn vram_address(&self) -> u16 {
        self.shared.borrow().registers.vram_addr
    }

    pub fn oam_address(&self) -> u8 {
        self.shared.borrow().registers.oam_addr
    }

    pub fn vram_peek(&self, addr: u16) -> Result<u8, Error> {
        self.shared.borrow().vram.peek(addr)
    }

    pub fn oam_peek(&self, addr: u8) -> Result<u8, Error> {
        self.shared.borrow().oam.peek(u16::from(addr))
    }

    /// Pattern table `index & 1`: 4 KiB at `$0000` or `$1000`.
    pub fn pattern_table(&self, index: u8) -> Result<Vec<u8>, Error> {
        let start = u16::from(index & 1) * ppu_mem::PATTERN_TABLE_SIZE;
        self.vram_block(start..=start + (ppu_mem::PATTERN_TABLE_SIZE - 1))
    }

    /// Tile bytes of name table `index & 3`.
    pub fn name_table(&self, index: u8) -> Result<Vec<u8>, Error> {
        let start = nametable_start(index);
        self.vram_block(start..=start + (ppu_mem::NAMETABLE_TILE_BYTES - 1))
    }

    /// Attribute bytes of name table `index & 3`.
    pub fn attribute_table(&self, index: u8) -> Result<Vec<u8>, Error> {
        let start = nametable_start(index) + ppu_mem::ATTRIBUTE_TABLE_OFFSET;
        self.vram_block(start..=start + (ppu_mem::ATTRIBUTE_TABLE_SIZE - 1))
    }

    fn vram_block(&self, range: RangeInclusive<u16>) -> Result<Vec<u8>, Error> {
        self.shared.borrow().vram.read_block(range)
    }
}

fn palette_len() -> u16 {
    *ppu_mem::PALETTE.end() - *ppu_mem::PALETTE.start() + 1
}

fn nametable_start(index: u8) -> u16 {
    ppu_mem::NAMETABLE_BASE + u16::from(index & 3) * ppu_mem::NAMETABLE_STRIDE
}

fn on_write(shared: &mut Shared, register: Register, value: u8) -> Result<(), Error> {
    trace!("{register:?} <- ${value:02X}");
    let registers = &mut shared.registers;
    match register {
        Register::Control => registers.control = Control::from_bits_retain(value),
        Register::Mask => registers.mask = Mask::from_bits_retain(value),
        Register::OamAddr => registers.oam_addr = value,
        Register::OamData => {
            shared.oam.write(u16::from(registers.oam_addr), value)?;
            registers.oam_addr = registers.oam_addr.wrapping_add(1);
        }
        Register::Addr => {
            if let Some(addr) = registers.latch.write(value) {
                registers.vram_addr = addr;
            }
        }
        Register::Data => store_vram_data(shared, value)?,
        Register::OamDma => registers.dma_request = Some(value),
        Register::Status => {}
    }
    Ok(())
}

/// Data-port side effect shared by reads and writes of `$2007`.
fn store_vram_data(shared: &mut Shared, value: u8) -> Result<(), Error> {
    shared.vram.write(shared.registers.vram_addr, value)?;
    shared.registers.step_vram_addr();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cartridge::mapper::Mapper0,
        cpu::interrupt::InterruptController,
        ppu::timing::DOTS_PER_FRAME,
    };

    fn machine() -> (Ppu, MainMemory) {
        let mapper = Mapper0::new(&[0; 0x4000], &[], None).expect("mapper");
        let mut memory = MainMemory::new(Box::new(mapper)).expect("memory");
        let mut chr = vec![0; 0x2000];
        chr[0x0010] = 0xAA;
        chr[0x1FFF] = 0x55;
        let ppu = Ppu::new(&chr).expect("ppu");
        ppu.attach(&mut memory).expect("attach");
        (ppu, memory)
    }

    fn point_at(memory: &mut MainMemory, addr: u16) {
        let [hi, lo] = addr.to_be_bytes();
        memory.write(0x2006, hi).expect("hi");
        memory.write(0x2006, lo).expect("lo");
    }

    #[test]
    fn chr_is_copied_into_vram() {
        let (ppu, _) = machine();
        assert_eq!(ppu.vram_peek(0x0010).expect("peek"), 0xAA);
        assert_eq!(ppu.vram_peek(0x1FFF).expect("peek"), 0x55);
        // Block copies bypass mirroring.
        assert_eq!(ppu.vram_peek(0x4010).expect("peek"), 0x00);
    }

    #[test]
    fn vblank_fires_once_per_frame_and_raises_nmi() {
        let (mut ppu, mut memory) = machine();
        let mut interrupts = InterruptController::default();
        memory.write(0x2000, 0x80).expect("enable nmi");

        ppu.update(262 * 114, &mut memory, &mut interrupts)
            .expect("update");

        assert_eq!(memory.peek(0x2002).expect("status") & 0x80, 0x80);
        assert_eq!(interrupts.pending(), Some(Interrupt::Nmi));
        assert_eq!(ppu.timing.frame_dots(), 0);

        interrupts.clear();
        ppu.update(100, &mut memory, &mut interrupts).expect("update");
        assert_eq!(interrupts.pending(), None);
    }

    #[test]
    fn vblank_without_nmi_enable_only_sets_the_flag() {
        let (mut ppu, mut memory) = machine();
        let mut interrupts = InterruptController::default();

        let cycles = DOTS_PER_FRAME.div_ceil(DOTS_PER_CPU_CYCLE);
        ppu.update(cycles, &mut memory, &mut interrupts)
            .expect("update");

        assert_eq!(memory.peek(0x2002).expect("status") & 0x80, 0x80);
        assert_eq!(interrupts.pending(), None);
    }

    #[test]
    fn status_read_clears_vblank_and_resets_latch() {
        let (ppu, mut memory) = machine();
        memory.write(0x2002, 0xC0).expect("status");
        // Half-written address left in the latch.
        memory.write(0x2006, 0x3F).expect("stale hi");

        assert_eq!(memory.read(0x2002).expect("read"), 0xC0);
        assert_eq!(memory.peek(0x2002).expect("peek"), 0x40);

        point_at(&mut memory, 0x2108);
        memory.write(0x2007, 0x99).expect("data");
        assert_eq!(ppu.vram_peek(0x2108).expect("peek"), 0x99);
        assert_eq!(ppu.vram_address(), 0x2109);
    }

    #[test]
    fn data_port_steps_by_configured_increment() {
        let (ppu, mut memory) = machine();
        point_at(&mut memory, 0x2000);
        memory.write(0x2007, 0x01).expect("data");
        memory.write(0x2007, 0x02).expect("data");
        assert_eq!(ppu.vram_peek(0x2001).expect("peek"), 0x02);

        memory.write(0x2000, 0x04).expect("increment 32");
        point_at(&mut memory, 0x2400);
        memory.write(0x2007, 0x03).expect("data");
        memory.write(0x2007, 0x04).expect("data");
        assert_eq!(ppu.vram_peek(0x2420).expect("peek"), 0x04);
        assert_eq!(ppu.vram_address(), 0x2440);
    }

    #[test]
    fn data_port_read_stores_and_steps() {
        let (ppu, mut memory) = machine();
        point_at(&mut memory, 0x2300);
        memory.write(0x2007, 0x11).expect("data");
        assert_eq!(memory.read(0x2007).expect("read"), 0x11);
        assert_eq!(ppu.vram_peek(0x2301).expect("peek"), 0x11);
        assert_eq!(ppu.vram_address(), 0x2302);
    }

    #[test]
    fn control_and_mask_writes_are_decoded() {
        let (ppu, mut memory) = machine();
        memory.write(0x2000, 0b1001_1010).expect("control");
        memory.write(0x2001, 0x01).expect("mask");

        let control = ppu.control();
        assert_eq!(control.nametable_index(), 2);
        assert_eq!(control.sprite_pattern_table(), 0x1000);
        assert_eq!(control.background_pattern_table(), 0x1000);
        assert!(control.nmi_enabled());
        assert_eq!(ppu.color_mode(), ColorMode::Monochrome);

        memory.write(0x2001, 0x00).expect("mask");
        assert_eq!(ppu.color_mode(), ColorMode::Color);
    }

    #[test]
    fn oam_port_writes_at_cursor_and_advances() {
        let (ppu, mut memory) = machine();
        memory.write(0x2003, 0xFE).expect("oam addr");
        for value in [0x10, 0x20, 0x30] {
            memory.write(0x2004, value).expect("oam data");
        }
        assert_eq!(ppu.oam_peek(0xFE).expect("peek"), 0x10);
        assert_eq!(ppu.oam_peek(0xFF).expect("peek"), 0x20);
        assert_eq!(ppu.oam_peek(0x00).expect("peek"), 0x30);
        assert_eq!(ppu.oam_address(), 0x01);
    }

    #[test]
    fn dma_write_is_latched_for_the_bus() {
        let (mut ppu, mut memory) = machine();
        memory.write(0x4014, 0x02).expect("dma");
        assert_eq!(ppu.take_dma_request(), Some(0x02));
        assert_eq!(ppu.take_dma_request(), None);

        let page: Vec<u8> = (0..=255).collect();
        ppu.load_oam(&page).expect("load");
        assert_eq!(ppu.oam_peek(0x80).expect("peek"), 0x80);
    }

    #[test]
    fn palette_background_entry_is_mirrored() {
        let (ppu, mut memory) = machine();
        point_at(&mut memory, 0x3F00);
        memory.write(0x2007, 0x0F).expect("data");

        for addr in [0x3F04, 0x3F10, 0x3F1C, 0x3F20, 0x3FE0, 0x7F00] {
            assert_eq!(ppu.vram_peek(addr).expect("peek"), 0x0F, "${addr:04X}");
        }

        point_at(&mut memory, 0x3F05);
        memory.write(0x2007, 0x21).expect("data");
        assert_eq!(ppu.vram_peek(0x3F25).expect("peek"), 0x21);
        assert_eq!(ppu.vram_peek(0x7F05).expect("peek"), 0x21);
    }

    #[test]
    fn table_extraction() {
        let (ppu, mut memory) = machine();
        point_at(&mut memory, 0x27C0);
        memory.write(0x2007, 0x77).expect("attribute");

        let pattern = ppu.pattern_table(1).expect("pattern");
        assert_eq!(pattern.len(), 0x1000);
        assert_eq!(pattern[0x0FFF], 0x55);
        assert_eq!(ppu.pattern_table(0).expect("pattern")[0x10], 0xAA);

        assert_eq!(ppu.name_table(1).expect("name").len(), 0x3C0);
        let attributes = ppu.attribute_table(1).expect("attributes");
        assert_eq!(attributes.len(), 0x40);
        assert_eq!(attributes[0], 0x77);
    }

    #[test]
    fn scanline_and_fetch_phase_advance_with_cycles() {
        let (mut ppu, mut memory) = machine();
        let mut interrupts = InterruptController::default();
        point_at(&mut memory, 0x2000);
        memory.write(0x2007, 0x01).expect("name table");
        point_at(&mut memory, 0x23C0);
        memory.write(0x2007, 0x0E).expect("attribute");
        assert_eq!(ppu.current_scanline(), 0);
        assert_eq!(ppu.memory_fetch_phase(), 1);

        // 20 idle scanlines, then phases 1 and 2 on dots 1 and 3.
        let cycles = (20 * 341 + 5) / 3;
        ppu.update(cycles, &mut memory, &mut interrupts)
            .expect("update");
        assert_eq!(ppu.current_scanline(), 20);
        assert_eq!(ppu.current_dot(), 5);
        assert_eq!(ppu.memory_fetch_phase(), 3);
        let latches = ppu.fetch_latches();
        assert_eq!(latches.name_table, 0x01);
        assert_eq!(latches.attribute, 0x0E);

        ppu.reset();
        assert_eq!(ppu.current_scanline(), 0);
        assert_eq!(ppu.memory_fetch_phase(), 1);
    }
}
