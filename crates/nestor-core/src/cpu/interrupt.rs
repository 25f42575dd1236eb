use std::fmt;

use crate::memory::cpu as cpu_mem;

/// Interrupt sources, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interrupt {
    Reset,
    Nmi,
    Irq,
}

impl Interrupt {
    /// Address of the little-endian handler vector.
    pub const fn vector(self) -> u16 {
        match self {
            Interrupt::Reset => cpu_mem::RESET_VECTOR,
            Interrupt::Nmi => cpu_mem::NMI_VECTOR,
            Interrupt::Irq => cpu_mem::IRQ_VECTOR,
        }
    }

    /// Whether `self` may replace an already pending `other`.
    pub const fn outranks(self, other: Interrupt) -> bool {
        matches!(
            (self, other),
            (Interrupt::Reset, Interrupt::Nmi | Interrupt::Irq) | (Interrupt::Nmi, Interrupt::Irq)
        )
    }
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interrupt::Reset => "RESET",
            Interrupt::Nmi => "NMI",
            Interrupt::Irq => "IRQ",
        };
        f.write_str(name)
    }
}

/// Anything that accepts interrupt requests.
pub trait InterruptSink {
    fn request_interrupt(&mut self, kind: Interrupt);
}

/// Holds at most one outstanding request.
///
/// A second request only replaces the pending one when it has strictly higher
/// priority; requests are never queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptController {
    pending: Option<Interrupt>,
}

impl InterruptController {
    pub fn pending(&self) -> Option<Interrupt> {
        self.pending
    }

    /// Takes the pending request, leaving none.
    pub fn take(&mut self) -> Option<Interrupt> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

impl InterruptSink for InterruptController {
    fn request_interrupt(&mut self, kind: Interrupt) {
        match self.pending {
            None => {
                tracing::debug!("{kind} requested");
                self.pending = Some(kind);
            }
            Some(current) if kind.outranks(current) => {
                tracing::debug!("pending {current} upgraded to {kind}");
                self.pending = Some(kind);
            }
            Some(_) => {}
        }
    }
}
