use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// PPU mask register (`$2001`).
    ///
    /// Only the grayscale bit affects this core; the rest are stored so the
    /// register reads back as written.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mask: u8 {
        const GRAYSCALE = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

/// Rendering mode selected by bit 0 of `$2001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    #[default]
    Color,
    Monochrome,
}

impl Mask {
    pub fn color_mode(self) -> ColorMode {
        if self.contains(Mask::GRAYSCALE) {
            ColorMode::Monochrome
        } else {
            ColorMode::Color
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Color => f.write_str("color"),
            ColorMode::Monochrome => f.write_str("monochrome"),
        }
    }
}
