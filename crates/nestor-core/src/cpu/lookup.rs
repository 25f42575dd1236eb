use crate::cpu::{
    addressing::Addressing as A,
    cycle::{b, c, n},
    instruction::Instruction as I,
    mnemonic::Mnemonic as M,
};

// Short aliases for addressing modes (to keep the table readable)
const IMP: A = A::Implied;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const INY: A = A::IndirectY;

macro_rules! op {
    ($table:ident; $($opcode:literal => $ins:ident, $addr:ident, $cycle:expr;)*) => {
        $( $table[$opcode] = Some(I::new(M::$ins, $addr, $cycle)); )*
    };
}

/// Opcode dispatch table. `None` entries are unknown opcodes.
pub(crate) static LOOKUP_TABLE: [Option<I>; 256] = build();

const fn build() -> [Option<I>; 256] {
    let mut table = [None; 256];
    op! { table;
        0x10 => BPL, REL, b(2);
        0x18 => CLC, IMP, n(2);
        0x20 => JSR, ABS, n(6);
        0x29 => AND, IMM, n(2);
        0x40 => RTI, IMP, n(6);
        0x48 => PHA, IMP, n(3);
        0x4C => JMP, ABS, n(3);
        0x58 => CLI, IMP, n(2);
        0x60 => RTS, IMP, n(6);
        0x65 => ADC, ZP,  n(3);
        0x68 => PLA, IMP, n(4);
        0x78 => SEI, IMP, n(2);
        0x85 => STA, ZP,  n(3);
        0x86 => STX, ZP,  n(3);
        0x8D => STA, ABS, n(4);
        0x8E => STX, ABS, n(4);
        0x95 => STA, ZPX, n(4);
        0x9A => TXS, IMP, n(2);
        0x9D => STA, ABX, n(5);
        0xA0 => LDY, IMM, n(2);
        0xA2 => LDX, IMM, n(2);
        0xA5 => LDA, ZP,  n(3);
        0xA6 => LDX, ZP,  n(3);
        0xA9 => LDA, IMM, n(2);
        0xAD => LDA, ABS, n(4);
        0xB1 => LDA, INY, c(5);
        0xB5 => LDA, ZPX, n(4);
        0xBD => LDA, ABX, c(4);
        0xC8 => INY, IMP, n(2);
        0xC9 => CMP, IMM, n(2);
        0xCA => DEX, IMP, n(2);
        0xD0 => BNE, REL, b(2);
        0xD8 => CLD, IMP, n(2);
        0xE0 => CPX, IMM, n(2);
        0xE6 => INC, ZP,  n(5);
        0xE8 => INX, IMP, n(2);
        0xF0 => BEQ, REL, b(2);
    }
    table
}

/// Decodes `opcode`.
pub(crate) fn lookup(opcode: u8) -> Option<I> {
    LOOKUP_TABLE[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_holds_the_implemented_subset() {
        let known = LOOKUP_TABLE.iter().filter(|entry| entry.is_some()).count();
        assert_eq!(known, 37);
    }

    #[test]
    fn decodes_lengths() {
        let lda = lookup(0xA9).expect("lda");
        assert_eq!(lda.mnemonic, M::LDA);
        assert_eq!(lda.byte_len(), 2);
        assert_eq!(lda.base_cycles(), 2);
        assert_eq!(lda.to_string(), "lda imm");
        assert_eq!(lookup(0x20).expect("jsr").byte_len(), 3);
        assert_eq!(lookup(0x60).expect("rts").byte_len(), 1);
    }

    #[test]
    fn unmapped_opcodes_decode_to_none() {
        for opcode in [0x00u8, 0x02, 0xEA, 0xFF] {
            assert!(lookup(opcode).is_none(), "{opcode:02X}");
        }
    }
}
