use std::fmt::Display;

use crate::cpu::{addressing::Addressing, cycle::Cycle, mnemonic::Mnemonic};

/// One decoded dispatch-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub addressing: Addressing,
    pub(crate) cycle: Cycle,
}

impl Instruction {
    pub(crate) const fn new(mnemonic: Mnemonic, addressing: Addressing, cycle: Cycle) -> Self {
        Self {
            mnemonic,
            addressing,
            cycle,
        }
    }

    /// Total byte length, opcode included.
    pub const fn byte_len(&self) -> u16 {
        1 + self.addressing.operand_bytes()
    }

    /// Cycles before any page-cross or branch penalty.
    pub const fn base_cycles(&self) -> u64 {
        self.cycle.basic_cycle()
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.mnemonic, self.addressing)
    }
}
