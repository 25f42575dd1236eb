use thiserror::Error;

use crate::cartridge::header::NES_HEADER_LEN;

/// Every fatal condition the core can raise.
///
/// None of these are recoverable from inside the machine: the run loop stops at
/// the first one and hands it back to the embedder unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// A read or write landed outside every mapped region.
    #[error("address ${addr:04X} is outside every mapped region")]
    AddressOutOfRange { addr: u16 },
    /// The byte at `pc` has no entry in the dispatch table.
    #[error("unknown opcode ${opcode:02X} at ${pc:04X}")]
    UnknownOpcode { pc: u16, opcode: u8 },
    /// Magic number or another structural field of the image is wrong.
    #[error("corrupt ROM image: {0}")]
    CorruptRomImage(&'static str),
    /// Provided buffer is shorter than the 16-byte header.
    #[error("header expected {NES_HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },
    /// A ROM section (trainer/PRG/CHR) is shorter than advertised.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The header asks for banking hardware this core does not model.
    #[error("mapper {number} is not supported")]
    UnsupportedMapper { number: u16 },
    /// Mirror source and target ranges must have the same length.
    #[error("mirror ranges differ in length: source {source_len} bytes, target {target_len} bytes")]
    MirrorLengthMismatch { source_len: usize, target_len: usize },
    /// Wrapper for I/O errors raised while reading ROMs from disk.
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}
