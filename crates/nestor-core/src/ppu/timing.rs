//! Scanline/dot counters driven by CPU cycle deltas.

/// The dot clock runs three times as fast as the CPU.
pub const DOTS_PER_CPU_CYCLE: u64 = 3;
pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
/// Frame-counter threshold at which vblank is raised.
pub const DOTS_PER_FRAME: u64 = SCANLINES_PER_FRAME as u64 * DOTS_PER_SCANLINE as u64;
/// Fetch phases per scanline, one on every odd dot.
pub const FETCH_PHASES: u8 = 170;

/// First and last scanline that fetch tile data. Everything else is idle.
pub(crate) const FIRST_FETCH_SCANLINE: u16 = 20;
pub(crate) const LAST_FETCH_SCANLINE: u16 = 260;

/// A fetch the state machine scheduled for the dot just consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchSlot {
    pub(crate) scanline: u16,
    pub(crate) phase: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timing {
    /// Dots since the last vblank.
    frame_dots: u64,
    scanline: u16,
    /// Position inside the scanline (0..=340).
    dot: u16,
    /// Phase the next fetch will run (1..=170).
    fetch_phase: u8,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            frame_dots: 0,
            scanline: 0,
            dot: 0,
            fetch_phase: 1,
        }
    }
}

impl Timing {
    pub(crate) fn scanline(&self) -> u16 {
        self.scanline
    }

    pub(crate) fn dot(&self) -> u16 {
        self.dot
    }

    pub(crate) fn fetch_phase(&self) -> u8 {
        self.fetch_phase
    }

    pub(crate) fn frame_dots(&self) -> u64 {
        self.frame_dots
    }

    /// Adds `dots` to the frame counter. Returns `true` when the vblank
    /// threshold was reached, in which case the counter restarts at zero.
    pub(crate) fn accumulate(&mut self, dots: u64) -> bool {
        self.frame_dots += dots;
        if self.frame_dots >= DOTS_PER_FRAME {
            self.frame_dots = 0;
            true
        } else {
            false
        }
    }

    /// Consumes one dot.
    ///
    /// Dot 0 of every scanline is idle, so the 170 fetches of an active line
    /// land on dots 1, 3, ..., 339 and dot 340 closes the line.
    pub(crate) fn tick(&mut self) -> Option<FetchSlot> {
        let fetching = (FIRST_FETCH_SCANLINE..=LAST_FETCH_SCANLINE).contains(&self.scanline);
        let slot = (fetching && self.dot % 2 == 1).then(|| {
            let phase = self.fetch_phase;
            self.fetch_phase = phase % FETCH_PHASES + 1;
            FetchSlot {
                scanline: self.scanline,
                phase,
            }
        });

        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline = (self.scanline + 1) % SCANLINES_PER_FRAME;
        }
        slot
    }
}
