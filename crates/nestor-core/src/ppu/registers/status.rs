use bitflags::bitflags;

bitflags! {
    /// PPU status register (`$2002`).
    ///
    /// The register lives in main memory; these are the bits the PPU touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Status: u8 {
        /// Set when the frame counter wraps, cleared by reading `$2002`.
        const VERTICAL_BLANK = 0b1000_0000;
    }
}
