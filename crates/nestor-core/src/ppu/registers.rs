//! Decoded state of the CPU-facing PPU registers.
//!
//! The register cells themselves live in main memory; the bridge observers
//! copy each write in here so the PPU can act on it.

mod control;
mod mask;
mod status;
mod vram_latch;

pub use control::Control;
pub use mask::{ColorMode, Mask};
pub(crate) use status::Status;
pub(crate) use vram_latch::VramLatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct Registers {
    /// Last value written to `$2000`.
    pub(crate) control: Control,
    /// Last value written to `$2001`.
    pub(crate) mask: Mask,
    pub(crate) latch: VramLatch,
    /// Target of the next `$2007` access.
    pub(crate) vram_addr: u16,
    /// OAM cursor driven by `$2003`/`$2004`.
    pub(crate) oam_addr: u8,
    /// Page written to `$4014`, waiting for the bus to run the DMA.
    pub(crate) dma_request: Option<u8>,
}

impl Registers {
    /// Advances the VRAM pointer after a data-port access.
    pub(crate) fn step_vram_addr(&mut self) {
        self.vram_addr = self.vram_addr.wrapping_add(self.control.vram_increment());
    }
}
