use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// 7 6 5 4 3 2 1 0
    /// N _ _ _ D I Z C
    ///
    /// Bits 4-6 (break, unused, overflow) are carried through pushes and pulls
    /// but no instruction in this core sets or tests them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Carry flag (C)
        const CARRY     = 0b0000_0001;

        /// Zero flag (Z)
        /// Set when the result of an operation is zero.
        const ZERO      = 0b0000_0010;

        /// Interrupt Disable flag (I)
        /// While set, pending interrupts are held back.
        const INTERRUPT = 0b0000_0100;

        /// Decimal Mode flag (D)
        /// Stored only; the NES CPU has no BCD arithmetic.
        const DECIMAL   = 0b0000_1000;

        /// Negative flag (N)
        /// Reflects bit 7 of the result of the last operation.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Set or clear the Zero flag based on a value.
    pub fn update_zero(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
    }

    /// Set or clear the Negative flag based on bit 7 of a value.
    pub fn update_negative(&mut self, value: u8) {
        self.set(Status::NEGATIVE, value > 0x7F);
    }

    /// Update both Zero and Negative flags.
    pub fn update_zn(&mut self, value: u8) {
        self.update_zero(value);
        self.update_negative(value);
    }

    pub fn c(&self) -> bool {
        self.contains(Status::CARRY)
    }

    pub fn z(&self) -> bool {
        self.contains(Status::ZERO)
    }

    pub fn i(&self) -> bool {
        self.contains(Status::INTERRUPT)
    }

    pub fn d(&self) -> bool {
        self.contains(Status::DECIMAL)
    }

    pub fn n(&self) -> bool {
        self.contains(Status::NEGATIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zn_follow_the_value() {
        let mut status = Status::empty();
        status.update_zn(0);
        assert!(status.z() && !status.n());
        status.update_zn(0x80);
        assert!(!status.z() && status.n());
        status.update_zn(0x7F);
        assert!(!status.z() && !status.n());
    }

    #[test]
    fn unmodelled_bits_survive_a_round_trip() {
        let status = Status::from_bits_retain(0b0111_0001);
        assert_eq!(status.bits(), 0b0111_0001);
        assert!(status.c());
    }
}
