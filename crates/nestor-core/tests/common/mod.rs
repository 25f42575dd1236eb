#![allow(dead_code)]

use anyhow::{Context, Result};
use nestor_core::{MachineConfig, Nes};

pub const PRG_BANK: usize = 0x4000;
pub const CHR_BANK: usize = 0x2000;

/// Assembles an in-memory iNES image.
#[derive(Debug, Clone)]
pub struct RomBuilder {
    prg: Vec<u8>,
    chr: Vec<u8>,
    trainer: Option<Vec<u8>>,
    mapper: u8,
}

impl RomBuilder {
    /// One 16 KiB PRG bank (zero filled) and one CHR bank.
    pub fn nrom128() -> Self {
        Self {
            prg: vec![0; PRG_BANK],
            chr: vec![0; CHR_BANK],
            trainer: None,
            mapper: 0,
        }
    }

    pub fn nrom256() -> Self {
        Self {
            prg: vec![0; 2 * PRG_BANK],
            ..Self::nrom128()
        }
    }

    /// Copies `code` into PRG at CPU address `addr` (`$8000` based).
    pub fn code(mut self, addr: u16, code: &[u8]) -> Self {
        let offset = (addr as usize - 0x8000) % self.prg.len();
        self.prg[offset..offset + code.len()].copy_from_slice(code);
        self
    }

    pub fn vector(self, addr: u16, target: u16) -> Self {
        self.code(addr, &target.to_le_bytes())
    }

    pub fn chr(mut self, chr: Vec<u8>) -> Self {
        self.chr = chr;
        self
    }

    pub fn trainer(mut self, trainer: Vec<u8>) -> Self {
        self.trainer = Some(trainer);
        self
    }

    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut flags6 = (self.mapper & 0x0F) << 4;
        if self.trainer.is_some() {
            flags6 |= 0b0000_0100;
        }
        let mut image = vec![
            b'N',
            b'E',
            b'S',
            0x1A,
            (self.prg.len() / PRG_BANK) as u8,
            (self.chr.len() / CHR_BANK) as u8,
            flags6,
            self.mapper & 0xF0,
        ];
        image.resize(16, 0);
        if let Some(trainer) = &self.trainer {
            image.extend_from_slice(trainer);
        }
        image.extend_from_slice(&self.prg);
        image.extend_from_slice(&self.chr);
        image
    }

    pub fn boot(&self, config: MachineConfig) -> Result<Nes> {
        Nes::from_rom_bytes(&self.build(), config).context("booting synthetic image")
    }
}

/// Runs single instructions until `pc` reaches `addr`.
pub fn run_to(nes: &mut Nes, addr: u16, max_instructions: usize) -> Result<()> {
    for _ in 0..max_instructions {
        if nes.cpu().pc() == addr {
            return Ok(());
        }
        nes.step()?;
    }
    anyhow::bail!(
        "pc never reached ${addr:04X}, stopped at ${:04X}",
        nes.cpu().pc()
    )
}
