//! iNES header decoding.
//!
//! The first 16 bytes of every `.nes` image describe how much PRG/CHR data
//! follows and which mapper the board uses:
//!
//! ```text
//! 0-3  "NES" $1A
//! 4    PRG ROM banks (16 KiB units)
//! 5    CHR ROM banks (8 KiB units)
//! 6    control byte 1: mirroring, battery, trainer, mapper low nibble
//! 7    control byte 2: mapper high nibble
//! 8    save RAM banks
//! 9-15 reserved
//! ```

use bitflags::bitflags;

use crate::error::Error;

const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;
/// PRG bank unit.
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// CHR bank unit.
pub const CHR_BANK_SIZE: usize = 8 * 1024;

bitflags! {
    /// Control byte 1 (header byte 6).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const MIRRORING       = 0b0000_0001;
        const BATTERY         = 0b0000_0010;
        const TRAINER         = 0b0000_0100;
        const FOUR_SCREEN     = 0b0000_1000;
        const MAPPER_LOW_MASK = 0b1111_0000;
    }
}

bitflags! {
    /// Control byte 2 (header byte 7).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags7: u8 {
        const VS_UNISYSTEM     = 0b0000_0001;
        const PLAYCHOICE_10    = 0b0000_0010;
        const MAPPER_HIGH_MASK = 0b1111_0000;
    }
}

/// Decoded iNES header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// Mapper number (0 == NROM).
    pub mapper: u16,
    pub prg_banks: u8,
    pub chr_banks: u8,
    pub save_ram_banks: u8,
    pub flags6: Flags6,
    pub flags7: Flags7,
    /// Whether a 512-byte trainer sits between the header and PRG data.
    pub trainer_present: bool,
    /// PRG ROM size in bytes.
    pub prg_rom_size: usize,
    /// CHR ROM size in bytes. Zero means the board uses CHR RAM.
    pub chr_rom_size: usize,
}

impl Header {
    /// Parse an iNES header from the given byte slice.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let Some(bytes) = bytes.get(..NES_HEADER_LEN) else {
            return Err(Error::TooShort {
                actual: bytes.len(),
            });
        };

        if &bytes[0..4] != NES_MAGIC {
            return Err(Error::CorruptRomImage("missing NES magic bytes"));
        }

        let prg_banks = bytes[4];
        let chr_banks = bytes[5];
        let flags6 = Flags6::from_bits_retain(bytes[6]);
        let flags7 = Flags7::from_bits_retain(bytes[7]);
        let mapper = mapper_number(bytes[6], bytes[7]);

        Ok(Self {
            mapper,
            prg_banks,
            chr_banks,
            save_ram_banks: bytes[8],
            flags6,
            flags7,
            trainer_present: flags6.contains(Flags6::TRAINER),
            prg_rom_size: prg_banks as usize * PRG_BANK_SIZE,
            chr_rom_size: chr_banks as usize * CHR_BANK_SIZE,
        })
    }
}

/// `(ctrl2 & $F0) + ((ctrl1 & $F0) >> 4)`.
pub fn mapper_number(ctrl1: u8, ctrl2: u8) -> u16 {
    (ctrl2 & 0xF0) as u16 + ((ctrl1 & 0xF0) >> 4) as u16
}
