use crate::{
    error::Error,
    memory::ppu as ppu_mem,
    ppu::{registers::Control, timing::FIRST_FETCH_SCANLINE, timing::FetchSlot},
    space::AddressSpace,
};

/// Bytes picked up by the most recent background fetches.
///
/// Nothing is rendered from these; they are kept for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FetchLatches {
    pub name_table: u8,
    pub attribute: u8,
    pub pattern_low: u8,
    pub pattern_high: u8,
}

/// The four fetches of one tile, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStep {
    NameTable,
    Attribute,
    PatternLow,
    PatternHigh,
}

impl FetchStep {
    pub fn of_phase(phase: u8) -> Self {
        match phase.saturating_sub(1) % 4 {
            0 => FetchStep::NameTable,
            1 => FetchStep::Attribute,
            2 => FetchStep::PatternLow,
            _ => FetchStep::PatternHigh,
        }
    }
}

impl FetchLatches {
    /// Performs the fetch scheduled for `slot`.
    pub(crate) fn fetch(
        &mut self,
        vram: &AddressSpace,
        control: Control,
        slot: FetchSlot,
    ) -> Result<(), Error> {
        let line = slot.scanline - FIRST_FETCH_SCANLINE;
        let row = (line / 8) % 30;
        let fine_y = line % 8;
        let column = u16::from(slot.phase.saturating_sub(1) / 4) % 32;
        let nametable = control.base_nametable_addr();
        let tile = control.background_pattern_table() + u16::from(self.name_table) * 16 + fine_y;

        match FetchStep::of_phase(slot.phase) {
            FetchStep::NameTable => {
                self.name_table = vram.peek(nametable + row * 32 + column)?;
            }
            FetchStep::Attribute => {
                let addr =
                    nametable + ppu_mem::ATTRIBUTE_TABLE_OFFSET + (row / 4) * 8 + column / 4;
                self.attribute = vram.peek(addr)?;
            }
            FetchStep::PatternLow => self.pattern_low = vram.peek(tile)?,
            FetchStep::PatternHigh => self.pattern_high = vram.peek(tile + 8)?,
        }
        Ok(())
    }
}
