use std::fmt::Display;

/// Represents the addressing modes supported by the 6502 CPU.
///
/// Addressing modes define how the CPU interprets the operand bytes
/// of an instruction to determine the effective memory address or
/// immediate value for the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    /// No additional data required. The instruction operates implicitly.
    ///
    /// # Examples
    /// - `CLC` (Clear Carry Flag)
    /// - `PHA` (Push Accumulator)
    Implied,

    /// The byte following the opcode is the operand value itself.
    ///
    /// # Examples
    /// - `LDA #$42` (Load Accumulator with immediate value $42)
    Immediate,

    /// Uses the full 16-bit address specified by the two bytes following the opcode.
    ///
    /// # Examples
    /// - `LDA $1234` (Load Accumulator from address $1234)
    /// - `JSR $8000` (Jump to subroutine at $8000)
    Absolute,

    /// Absolute address indexed by the X register.
    ///
    /// The effective address is `address + X`, wrapping at `$FFFF`.
    /// Reads take an extra cycle when a page boundary is crossed.
    AbsoluteX,

    /// Absolute address indexed by the Y register.
    AbsoluteY,

    /// Uses a single byte address that refers to the zero page ($0000-$00FF).
    ///
    /// # Examples
    /// - `LDA $42` (Load Accumulator from zero page address $42)
    ZeroPage,

    /// Zero page address indexed by the X register.
    ///
    /// The effective address wraps within the zero page: `(address + X) & 0xFF`.
    ZeroPageX,

    /// Zero page address indexed by the Y register.
    ZeroPageY,

    /// Post-indexed indirect addressing, `(zp),Y`.
    ///
    /// The zero page byte points at a little-endian pointer, which is then
    /// offset by Y. Crossing a page costs a cycle.
    IndirectY,

    /// Used for branch instructions. The operand is a signed 8-bit offset
    /// relative to the address of the next instruction.
    ///
    /// # Examples
    /// - `BNE $F0` (Branch back 16 bytes if Not Equal)
    Relative,
}

impl Addressing {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u16 {
        match self {
            Addressing::Implied => 0,
            Addressing::Immediate
            | Addressing::ZeroPage
            | Addressing::ZeroPageX
            | Addressing::ZeroPageY
            | Addressing::IndirectY
            | Addressing::Relative => 1,
            Addressing::Absolute | Addressing::AbsoluteX | Addressing::AbsoluteY => 2,
        }
    }
}

impl Display for Addressing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Addressing::Implied => "imp",
            Addressing::Immediate => "imm",
            Addressing::Absolute => "abs",
            Addressing::AbsoluteX => "abs,x",
            Addressing::AbsoluteY => "abs,y",
            Addressing::ZeroPage => "zp",
            Addressing::ZeroPageX => "zp,x",
            Addressing::ZeroPageY => "zp,y",
            Addressing::IndirectY => "(zp),y",
            Addressing::Relative => "rel",
        };
        f.write_str(name)
    }
}

/// `$00xx`.
pub const fn zero_page(addr: u8) -> u16 {
    addr as u16
}

/// Zero page address plus index, wrapping inside page zero.
pub const fn indexed_zero_page(addr: u8, index: u8) -> u16 {
    addr.wrapping_add(index) as u16
}

/// Little-endian address from two operand bytes.
pub const fn absolute(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

/// Absolute address plus index, wrapping at `$FFFF`.
pub const fn indexed_absolute(lo: u8, hi: u8, index: u8) -> u16 {
    absolute(lo, hi).wrapping_add(index as u16)
}

/// `pc` displaced by a signed 8-bit offset.
pub const fn relative(pc: u16, offset: u8) -> u16 {
    pc.wrapping_add_signed(offset as i8 as i16)
}

/// Whether two addresses sit on different 256-byte pages.
pub const fn crosses_page(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}
