use std::{fs, path::Path};

use crate::{
    cartridge::header::{Header, NES_HEADER_LEN},
    error::Error,
};

use self::mapper::Mapper0;

pub const TRAINER_SIZE: usize = 512;

pub mod header;
pub mod mapper;
pub use mapper::Mapper;

/// A parsed cartridge image: the header plus the board that serves it.
#[derive(Debug)]
pub struct Cartridge {
    header: Header,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    pub fn new(header: Header, mapper: Box<dyn Mapper>) -> Self {
        Self { header, mapper }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    /// Splits the cartridge into its parts.
    pub fn into_parts(self) -> (Header, Box<dyn Mapper>) {
        (self.header, self.mapper)
    }
}

impl Clone for Cartridge {
    fn clone(&self) -> Self {
        Self {
            header: self.header,
            mapper: dyn_clone::clone_box(&*self.mapper),
        }
    }
}

/// Parses an iNES image and builds the board it asks for.
///
/// Only mapper 0 is modelled; any other number is rejected before a CPU or PPU
/// exists.
pub fn load_cartridge(bytes: &[u8]) -> Result<Cartridge, Error> {
    let header = Header::parse(bytes)?;
    let (trainer, prg, chr) = slice_sections(bytes, &header)?;

    let mapper: Box<dyn Mapper> = match header.mapper {
        0 => Box::new(Mapper0::new(prg, chr, trainer)?),
        number => return Err(Error::UnsupportedMapper { number }),
    };

    tracing::info!(
        mapper = header.mapper,
        board = mapper.name(),
        prg_banks = header.prg_banks,
        chr_banks = header.chr_banks,
        trainer = header.trainer_present,
        "cartridge loaded"
    );

    Ok(Cartridge::new(header, mapper))
}

/// Reads an iNES image from `path`, then behaves like [`load_cartridge`].
pub fn load_cartridge_from_file<P>(path: P) -> Result<Cartridge, Error>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    load_cartridge(&bytes)
}

type Sections<'a> = (Option<&'a [u8]>, &'a [u8], &'a [u8]);

fn slice_sections<'a>(bytes: &'a [u8], header: &Header) -> Result<Sections<'a>, Error> {
    let mut at = NES_HEADER_LEN;
    let trainer = header
        .trainer_present
        .then(|| section(bytes, &mut at, TRAINER_SIZE, "trainer"))
        .transpose()?;
    let prg = section(bytes, &mut at, header.prg_rom_size, "PRG ROM")?;
    let chr = section(bytes, &mut at, header.chr_rom_size, "CHR ROM")?;
    Ok((trainer, prg, chr))
}

fn section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], Error> {
    let too_short = || Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    };

    let end = cursor.checked_add(len).ok_or_else(too_short)?;
    let slice = bytes.get(*cursor..end).ok_or_else(too_short)?;

    *cursor = end;
    Ok(slice)
}
