//! Shared definitions for the NES memory map.
//!
//! Every address the CPU, PPU or cartridge code refers to lives here so the
//! other modules never carry magic numbers of their own.

mod main_memory;

pub use main_memory::MainMemory;

/// CPU memory map details.
pub mod cpu {
    use std::ops::RangeInclusive;

    /// First byte of CPU RAM.
    pub const RAM_START: u16 = 0x0000;
    /// Size of the CPU-side RAM region, including the I/O register block.
    pub const RAM_SIZE: usize = 0x4020;

    /// The 2 KiB of real internal RAM.
    pub const INTERNAL_RAM: RangeInclusive<u16> = 0x0000..=0x07FF;
    /// Internal RAM repeats three more times up to `$1FFF`.
    pub const INTERNAL_RAM_MIRRORS: [RangeInclusive<u16>; 3] =
        [0x0800..=0x0FFF, 0x1000..=0x17FF, 0x1800..=0x1FFF];

    /// The eight PPU registers as seen by the CPU.
    pub const PPU_REGISTERS: RangeInclusive<u16> = 0x2000..=0x2007;
    /// Last address of the PPU register mirror region.
    pub const PPU_REGISTER_MIRROR_END: u16 = 0x3FFF;

    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;
    /// Size of the hardware stack page.
    pub const STACK_PAGE_SIZE: usize = 0x0100;

    /// First address handled by the cartridge.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// Size of the cartridge window (`$4020-$FFFF`).
    pub const CARTRIDGE_SPACE_SIZE: usize = 0xBFE0;
    /// PRG ROM window start address (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Start of the upper 16 KiB PRG bank (`$C000`).
    pub const PRG_ROM_UPPER: u16 = 0xC000;

    /// Reset vector low byte address (`$FFFC`).
    pub const RESET_VECTOR: u16 = 0xFFFC;
    /// NMI vector low byte address (`$FFFA`).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    /// IRQ/BRK vector low byte address (`$FFFE`).
    pub const IRQ_VECTOR: u16 = 0xFFFE;
}

/// PPU register layout and VRAM mirror rules.
pub mod ppu {
    use std::ops::RangeInclusive;

    /// CPU-visible PPU registers and the DMA port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(u16)]
    pub enum Register {
        /// `$2000` - PPUCTRL.
        Control = 0x2000,
        /// `$2001` - PPUMASK.
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS.
        Status = 0x2002,
        /// `$2003` - OAMADDR.
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA.
        OamData = 0x2004,
        /// `$2006` - PPUADDR, written high byte first.
        Addr = 0x2006,
        /// `$2007` - PPUDATA.
        Data = 0x2007,
        /// `$4014` - OAM DMA page select.
        OamDma = 0x4014,
    }

    impl Register {
        pub const fn addr(self) -> u16 {
            self as u16
        }
    }

    /// Logical size of the PPU address space.
    pub const VRAM_SIZE: usize = 0x1_0000;
    /// Object attribute memory size.
    pub const OAM_SIZE: usize = 0x100;

    /// Pattern table 0 base (`$0000`).
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    /// Pattern table 1 base (`$1000`).
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Size of one pattern table.
    pub const PATTERN_TABLE_SIZE: u16 = 0x1000;
    /// CHR data is loaded into VRAM starting here.
    pub const CHR_START: u16 = 0x0000;
    /// Size of one 8 KiB CHR bank.
    pub const CHR_BANK_SIZE: usize = 0x2000;

    /// First name table (`$2000`).
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Distance between consecutive name tables.
    pub const NAMETABLE_STRIDE: u16 = 0x0400;
    /// Tile bytes in one name table (32x30).
    pub const NAMETABLE_TILE_BYTES: u16 = 0x03C0;
    /// Attribute table offset inside a name table.
    pub const ATTRIBUTE_TABLE_OFFSET: u16 = 0x03C0;
    /// Attribute bytes per name table.
    pub const ATTRIBUTE_TABLE_SIZE: u16 = 0x0040;

    /// Universal background colour entry.
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Mirrors of the universal background colour inside the palette.
    pub const BACKGROUND_MIRRORS: [u16; 7] = [0x3F04, 0x3F08, 0x3F0C, 0x3F10, 0x3F14, 0x3F18, 0x3F1C];
    /// The 32 palette bytes, repeated through `$3FFF`.
    pub const PALETTE: RangeInclusive<u16> = 0x3F00..=0x3F1F;
    /// Last palette mirror address.
    pub const PALETTE_MIRROR_END: u16 = 0x3FFF;

    /// Everything below `$4000` reappears at `$4000-$7FFF`.
    pub const MIRRORED_VRAM: RangeInclusive<u16> = 0x0000..=0x3FFF;
    pub const VRAM_MIRROR: RangeInclusive<u16> = 0x4000..=0x7FFF;
}
