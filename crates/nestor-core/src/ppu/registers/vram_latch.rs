/// Two-write latch behind `$2006`: high byte first, then low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramLatch {
    hi: u8,
    lo: u8,
    /// `false` => next write is the high byte.
    second: bool,
}

impl VramLatch {
    /// Stores one half. On the second write, returns the composed pointer.
    pub(crate) fn write(&mut self, value: u8) -> Option<u16> {
        let second = self.second;
        if second {
            self.lo = value;
        } else {
            self.hi = value;
        }
        self.second = !second;
        second.then(|| u16::from_be_bytes([self.hi, self.lo]))
    }

    /// Clears both halves and the write toggle.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
