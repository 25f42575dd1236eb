use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// PPU control register (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N . S B s I n n
    /// ```
    /// - `n n`: name table select
    /// - `I`: VRAM increment (0=+1, 1=+32)
    /// - `s`: sprite pattern table
    /// - `B`: background pattern table
    /// - `S`: sprite size (0=8x8, 1=8x16)
    /// - `N`: raise NMI when vblank starts
    ///
    /// Bit 6 is unused and kept as written.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Control: u8 {
        const NAMETABLE = 0b0000_0011;
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    /// Active name table (0..=3).
    pub fn nametable_index(self) -> u8 {
        self.bits() & 0b11
    }

    /// `$2000`, `$2400`, `$2800` or `$2C00`.
    pub fn base_nametable_addr(self) -> u16 {
        ppu_mem::NAMETABLE_BASE + u16::from(self.nametable_index()) * ppu_mem::NAMETABLE_STRIDE
    }

    /// Step applied to the VRAM pointer after each `$2007` access.
    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    pub fn sprite_pattern_table(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    pub fn background_pattern_table(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }

    pub fn use_8x16_sprites(self) -> bool {
        self.contains(Control::SPRITE_SIZE_16)
    }

    pub fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_field() {
        let control = Control::from_bits_retain(0b1011_1110);
        assert_eq!(control.nametable_index(), 2);
        assert_eq!(control.base_nametable_addr(), 0x2800);
        assert_eq!(control.vram_increment(), 32);
        assert_eq!(control.sprite_pattern_table(), 0x1000);
        assert_eq!(control.background_pattern_table(), 0x1000);
        assert!(control.use_8x16_sprites());
        assert!(control.nmi_enabled());

        let control = Control::from_bits_retain(0b0100_0001);
        assert_eq!(control.base_nametable_addr(), 0x2400);
        assert_eq!(control.vram_increment(), 1);
        assert_eq!(control.sprite_pattern_table(), 0x0000);
        assert_eq!(control.background_pattern_table(), 0x0000);
        assert!(!control.use_8x16_sprites());
        assert!(!control.nmi_enabled());
        assert_eq!(control.bits(), 0b0100_0001);
    }
}
