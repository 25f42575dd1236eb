use std::fmt::Display;

use crate::{
    bus::Bus,
    cpu::{Cpu, status::Status},
    error::Error,
};

/// The implemented instruction subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    //Load/Store
    LDA,
    LDX,
    LDY,
    STA,
    STX,
    //Transfer
    TXS,
    //Stack
    PHA,
    PLA,
    //Logic
    AND,
    //Arithmetic
    ADC,
    CMP,
    CPX,
    //Arithmetic: Inc/Dec
    DEX,
    INC,
    INX,
    INY,
    //Control Flow
    JMP,
    JSR,
    RTI,
    RTS,
    //Control Flow: Branch
    BEQ,
    BNE,
    BPL,
    //Flags
    CLC,
    CLD,
    CLI,
    SEI,
}

/// Resolved operand of the instruction being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    None,
    Immediate(u8),
    Address(u16),
    /// Branch destination.
    Target(u16),
}

impl Operand {
    fn value<B: Bus>(self, bus: &mut B) -> Result<u8, Error> {
        match self {
            Operand::Immediate(value) => Ok(value),
            Operand::Address(addr) => bus.read(addr),
            Operand::None | Operand::Target(_) => Ok(0),
        }
    }

    fn address(self) -> u16 {
        match self {
            Operand::Address(addr) | Operand::Target(addr) => addr,
            Operand::None | Operand::Immediate(_) => 0,
        }
    }
}

impl Mnemonic {
    /// Executes against `cpu`, whose `pc` already points past the instruction.
    ///
    /// Returns whether a branch was taken.
    pub(crate) fn execute<B: Bus>(
        self,
        cpu: &mut Cpu,
        bus: &mut B,
        operand: Operand,
    ) -> Result<bool, Error> {
        match self {
            Mnemonic::LDA => {
                cpu.a = operand.value(bus)?;
                cpu.status.update_zn(cpu.a);
            }
            Mnemonic::LDX => {
                cpu.x = operand.value(bus)?;
                cpu.status.update_zn(cpu.x);
            }
            Mnemonic::LDY => {
                cpu.y = operand.value(bus)?;
                cpu.status.update_zn(cpu.y);
            }
            Mnemonic::STA => bus.write(operand.address(), cpu.a)?,
            Mnemonic::STX => bus.write(operand.address(), cpu.x)?,
            Mnemonic::TXS => bus.set_stack_ptr(cpu.x),
            Mnemonic::PHA => bus.push(cpu.a)?,
            Mnemonic::PLA => {
                cpu.a = bus.pop()?;
                cpu.status.update_zn(cpu.a);
            }
            Mnemonic::AND => {
                cpu.a &= operand.value(bus)?;
                cpu.status.update_zn(cpu.a);
            }
            Mnemonic::ADC => {
                let sum = cpu.a as u16 + operand.value(bus)? as u16 + cpu.status.c() as u16;
                cpu.status.set(Status::CARRY, sum > 0xFF);
                cpu.a = sum as u8;
                cpu.status.update_zn(cpu.a);
            }
            Mnemonic::CMP => {
                let value = operand.value(bus)?;
                let result = cpu.a.wrapping_sub(value);
                cpu.status.update_zn(result);
                // Carry is only ever set here, never cleared.
                if cpu.a >= value {
                    cpu.status.insert(Status::CARRY);
                }
            }
            Mnemonic::CPX => {
                let value = operand.value(bus)?;
                let result = cpu.x.wrapping_sub(value);
                cpu.status.update_zn(result);
                cpu.status.set(Status::CARRY, cpu.x >= value);
            }
            Mnemonic::DEX => {
                cpu.x = cpu.x.wrapping_sub(1);
                cpu.status.update_zn(cpu.x);
            }
            Mnemonic::INX => {
                cpu.x = cpu.x.wrapping_add(1);
                cpu.status.update_zn(cpu.x);
            }
            Mnemonic::INY => {
                cpu.y = cpu.y.wrapping_add(1);
                cpu.status.update_zn(cpu.y);
            }
            Mnemonic::INC => {
                let addr = operand.address();
                let value = bus.read(addr)?.wrapping_add(1);
                bus.write(addr, value)?;
                cpu.status.update_zn(value);
            }
            Mnemonic::JMP => cpu.pc = operand.address(),
            Mnemonic::JSR => {
                let [lo, hi] = cpu.pc.wrapping_sub(cpu.load_base).to_le_bytes();
                bus.push(hi)?;
                bus.push(lo)?;
                cpu.pc = operand.address();
            }
            Mnemonic::RTS => {
                cpu.pc = pop_word(bus)?.wrapping_add(cpu.load_base);
            }
            Mnemonic::RTI => {
                cpu.status = Status::from_bits_retain(bus.pop()?);
                cpu.pc = pop_word(bus)?.wrapping_add(cpu.load_base);
            }
            Mnemonic::BEQ | Mnemonic::BNE | Mnemonic::BPL => {
                let taken = match self {
                    Mnemonic::BEQ => cpu.status.z(),
                    Mnemonic::BNE => !cpu.status.z(),
                    _ => !cpu.status.n(),
                };
                if taken {
                    cpu.pc = operand.address();
                }
                return Ok(taken);
            }
            Mnemonic::CLC => cpu.status.remove(Status::CARRY),
            Mnemonic::CLD => cpu.status.remove(Status::DECIMAL),
            Mnemonic::CLI => cpu.status.remove(Status::INTERRUPT),
            Mnemonic::SEI => cpu.status.insert(Status::INTERRUPT),
        }
        Ok(false)
    }
}

fn pop_word<B: Bus>(bus: &mut B) -> Result<u16, Error> {
    let lo = bus.pop()?;
    let hi = bus.pop()?;
    Ok(u16::from_le_bytes([lo, hi]))
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mnemonic::LDA => "lda",
            Mnemonic::LDX => "ldx",
            Mnemonic::LDY => "ldy",
            Mnemonic::STA => "sta",
            Mnemonic::STX => "stx",
            Mnemonic::TXS => "txs",
            Mnemonic::PHA => "pha",
            Mnemonic::PLA => "pla",
            Mnemonic::AND => "and",
            Mnemonic::ADC => "adc",
            Mnemonic::CMP => "cmp",
            Mnemonic::CPX => "cpx",
            Mnemonic::DEX => "dex",
            Mnemonic::INC => "inc",
            Mnemonic::INX => "inx",
            Mnemonic::INY => "iny",
            Mnemonic::JMP => "jmp",
            Mnemonic::JSR => "jsr",
            Mnemonic::RTI => "rti",
            Mnemonic::RTS => "rts",
            Mnemonic::BEQ => "beq",
            Mnemonic::BNE => "bne",
            Mnemonic::BPL => "bpl",
            Mnemonic::CLC => "clc",
            Mnemonic::CLD => "cld",
            Mnemonic::CLI => "cli",
            Mnemonic::SEI => "sei",
        };
        f.write_str(name)
    }
}
