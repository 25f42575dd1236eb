//! Watch expressions for stopping a run when machine state matches.
//!
//! A watch is `<operand> <op> <value>`, whitespace separated:
//!
//! ```text
//! a == 0x10
//! pc >= $C000
//! [$0200] != 0
//! status & 0x80
//! ```
//!
//! Operands are `a`, `x`, `y`, `pc`, `status`, `scanline` or a bracketed
//! main-memory address. Numbers are decimal, `0x`-prefixed or `$`-prefixed hex.

use core::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{Nes, error::Error as CoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("expected `<operand> <op> <value>`, got {0:?}")]
    Malformed(String),
    #[error("unknown operand {0:?}")]
    UnknownOperand(String),
    #[error("unknown comparison {0:?}")]
    UnknownComparison(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    X,
    Y,
    Pc,
    Status,
    Scanline,
    /// Main-memory byte, read without side effects.
    Memory(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// True when the operand and value share at least one set bit.
    AnyBits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Watch {
    pub operand: Operand,
    pub comparison: Comparison,
    pub value: u16,
}

impl Watch {
    pub fn parse(input: &str) -> Result<Self, WatchError> {
        input.parse()
    }

    /// Reads the operand from `nes` and applies the comparison.
    pub fn evaluate(&self, nes: &Nes) -> Result<bool, CoreError> {
        let cpu = nes.cpu();
        let current = match self.operand {
            Operand::A => u16::from(cpu.a()),
            Operand::X => u16::from(cpu.x()),
            Operand::Y => u16::from(cpu.y()),
            Operand::Pc => cpu.pc(),
            Operand::Status => u16::from(cpu.status().bits()),
            Operand::Scanline => nes.ppu().current_scanline(),
            Operand::Memory(addr) => u16::from(nes.peek(addr)?),
        };
        Ok(self.comparison.holds(current, self.value))
    }
}

impl Comparison {
    fn holds(self, lhs: u16, rhs: u16) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::AnyBits => lhs & rhs != 0,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::AnyBits => "&",
        }
    }
}

impl FromStr for Operand {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            return parse_number(inner).map(Operand::Memory);
        }
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Operand::A),
            "x" => Ok(Operand::X),
            "y" => Ok(Operand::Y),
            "pc" => Ok(Operand::Pc),
            "status" | "p" => Ok(Operand::Status),
            "scanline" => Ok(Operand::Scanline),
            _ => Err(WatchError::UnknownOperand(s.to_owned())),
        }
    }
}

impl FromStr for Comparison {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Comparison::Eq),
            "!=" => Ok(Comparison::Ne),
            "<" => Ok(Comparison::Lt),
            "<=" => Ok(Comparison::Le),
            ">" => Ok(Comparison::Gt),
            ">=" => Ok(Comparison::Ge),
            "&" => Ok(Comparison::AnyBits),
            _ => Err(WatchError::UnknownComparison(s.to_owned())),
        }
    }
}

impl FromStr for Watch {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let (Some(operand), Some(comparison), Some(value), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(WatchError::Malformed(s.to_owned()));
        };
        Ok(Watch {
            operand: operand.parse()?,
            comparison: comparison.parse()?,
            value: parse_number(value)?,
        })
    }
}

fn parse_number(s: &str) -> Result<u16, WatchError> {
    let parsed = if let Some(hex) = s.strip_prefix('$') {
        u16::from_str_radix(hex, 16)
    } else if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| WatchError::InvalidNumber(s.to_owned()))
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::A => f.write_str("a"),
            Operand::X => f.write_str("x"),
            Operand::Y => f.write_str("y"),
            Operand::Pc => f.write_str("pc"),
            Operand::Status => f.write_str("status"),
            Operand::Scanline => f.write_str("scanline"),
            Operand::Memory(addr) => write!(f, "[${addr:04X}]"),
        }
    }
}

impl fmt::Display for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ${:X}",
            self.operand,
            self.comparison.symbol(),
            self.value
        )
    }
}
