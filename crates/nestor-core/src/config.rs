use core::fmt;
use std::str::FromStr;

use crate::memory::cpu as cpu_mem;

/// Where execution starts after the machine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryPoint {
    /// Load `pc` from the reset vector at `$FFFC`.
    #[default]
    ResetVector,
    /// Start at a fixed address, ignoring the vector.
    Fixed(u16),
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::ResetVector => f.write_str("reset"),
            EntryPoint::Fixed(addr) => write!(f, "${addr:04X}"),
        }
    }
}

/// Returned when an entry point string is neither `reset` nor an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entry point {0:?}, expected `reset`, `$XXXX` or `0xXXXX`")]
pub struct ParseEntryPointError(String);

impl FromStr for EntryPoint {
    type Err = ParseEntryPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("reset") {
            return Ok(EntryPoint::ResetVector);
        }
        let digits = trimmed
            .strip_prefix('$')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ParseEntryPointError(s.to_owned()))?;
        u16::from_str_radix(digits, 16)
            .map(EntryPoint::Fixed)
            .map_err(|_| ParseEntryPointError(s.to_owned()))
    }
}

/// Machine construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineConfig {
    pub entry_point: EntryPoint,
    /// Subtracted from return addresses pushed on the stack and added back
    /// when they are pulled.
    pub load_base: u16,
    /// Emit a `trace!` event for every executed instruction.
    pub trace_instructions: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            entry_point: EntryPoint::default(),
            load_base: cpu_mem::PRG_ROM_START,
            trace_instructions: false,
        }
    }
}

impl MachineConfig {
    pub fn with_entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_instructions = enabled;
        self
    }
}
