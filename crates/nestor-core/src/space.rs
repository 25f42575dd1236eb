//! Bounds-checked byte-addressable memory regions.
//!
//! An [`AddressSpace`] is a flat array of cells anchored at a start address.
//! Hardware behaviour is layered on by composition rather than by special
//! memory types:
//!
//! - [`Mirrorable`]: one-directional aliasing of one range onto another,
//!   applied synchronously after every canonical write.
//! - [`Observable`]: per-address handlers notified after a read or write
//!   completes. Memory-mapped registers are built from these.
//! - [`BlockAccessible`]: bulk transfers that bypass both of the above.
//!
//! The order of side effects on a write is fixed: canonical cell, then mirror
//! targets, then write observers. Mirror targets never trigger observers and
//! never chain into further mirror rules.

use std::{fmt, ops::RangeInclusive, rc::Rc};

use crate::error::Error;

pub mod mirror;
pub mod observer;
pub mod stack;

pub use mirror::{MirrorRule, MirrorTable};
pub use observer::{Access, Notification, Observer, ObserverBus};
pub use stack::{StackPage, Stacked};

/// Registers one-directional address aliases.
pub trait Mirrorable {
    /// Every canonical write inside `source` is copied to the same offset in `target`.
    fn mirror(&mut self, source: RangeInclusive<u16>, target: RangeInclusive<u16>)
    -> Result<(), Error>;

    /// Registers the alias in both directions. Still a single hop: a write to
    /// one side updates the other and stops there.
    fn two_sided_mirror(
        &mut self,
        a: RangeInclusive<u16>,
        b: RangeInclusive<u16>,
    ) -> Result<(), Error> {
        self.mirror(a.clone(), b.clone())?;
        self.mirror(b, a)
    }
}

/// Attaches handlers to single addresses.
pub trait Observable {
    fn register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error>;

    fn register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error>;
}

/// Bulk transfers that skip mirroring and notification.
pub trait BlockAccessible {
    fn read_block(&self, range: RangeInclusive<u16>) -> Result<Vec<u8>, Error>;

    fn write_block(&mut self, start: u16, values: &[u8]) -> Result<(), Error>;
}

/// Wraps a closure into an [`Observer`] handle.
pub fn observer<F>(f: F) -> Observer
where
    F: Fn(&mut RawCells<'_>, Notification) -> Result<(), Error> + 'static,
{
    Rc::new(f)
}

/// Direct access to the cells of the space that raised a notification.
///
/// Handlers use this to rewrite a cell as a side effect (e.g. clearing a flag
/// right after it was read). Writes made here are not mirrored and notify no one.
pub struct RawCells<'a> {
    start: u16,
    cells: &'a mut [u8],
}

impl RawCells<'_> {
    pub fn get(&self, addr: u16) -> Result<u8, Error> {
        let index = offset(self.start, self.cells.len(), addr)?;
        Ok(self.cells[index])
    }

    pub fn set(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        let index = offset(self.start, self.cells.len(), addr)?;
        self.cells[index] = value;
        Ok(())
    }
}

/// A contiguous block of 8-bit cells starting at `start`.
#[derive(Clone)]
pub struct AddressSpace {
    start: u16,
    cells: Box<[u8]>,
    mirrors: MirrorTable,
    observers: ObserverBus,
}

impl AddressSpace {
    /// Creates a zero-filled space. `size` is clamped so the space ends at `$FFFF`
    /// at the latest.
    pub fn new(start: u16, size: usize) -> Self {
        Self::filled(start, size, 0x00)
    }

    pub fn filled(start: u16, size: usize, value: u8) -> Self {
        let size = size.min(0x1_0000 - start as usize);
        Self {
            start,
            cells: vec![value; size].into_boxed_slice(),
            mirrors: MirrorTable::default(),
            observers: ObserverBus::default(),
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Last valid address (inclusive).
    pub fn end(&self) -> u16 {
        (self.start as usize + self.cells.len().saturating_sub(1)) as u16
    }

    pub fn contains(&self, addr: u16) -> bool {
        offset(self.start, self.cells.len(), addr).is_ok()
    }

    pub fn mirrors(&self) -> &MirrorTable {
        &self.mirrors
    }

    pub fn observers(&self) -> &ObserverBus {
        &self.observers
    }

    /// Reads a cell, then notifies read observers with the fetched value.
    ///
    /// The returned byte is the value before any observer ran.
    pub fn read(&mut self, addr: u16) -> Result<u8, Error> {
        let value = self.cells[self.index(addr)?];
        self.notify(Notification::new(addr, value, Access::Read))?;
        Ok(value)
    }

    /// Writes a cell, propagates it to mirror targets, then notifies write observers.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        let index = self.index(addr)?;
        self.cells[index] = value;
        for target in self.mirrors.targets(addr) {
            // Targets were bounds-checked when the rule was registered.
            self.cells[target.wrapping_sub(self.start) as usize] = value;
        }
        self.notify(Notification::new(addr, value, Access::Write))
    }

    /// Side-effect-free read.
    pub fn peek(&self, addr: u16) -> Result<u8, Error> {
        Ok(self.cells[self.index(addr)?])
    }

    /// Raw cell view over the whole space.
    pub fn raw(&mut self) -> RawCells<'_> {
        RawCells {
            start: self.start,
            cells: &mut self.cells[..],
        }
    }

    fn index(&self, addr: u16) -> Result<usize, Error> {
        offset(self.start, self.cells.len(), addr)
    }

    fn check_range(&self, range: &RangeInclusive<u16>) -> Result<(), Error> {
        self.index(*range.start())?;
        self.index(*range.end())?;
        Ok(())
    }

    fn notify(&mut self, notification: Notification) -> Result<(), Error> {
        let Self {
            start,
            cells,
            observers,
            ..
        } = self;
        for observer in observers.observers(notification.access, notification.addr) {
            let mut raw = RawCells {
                start: *start,
                cells: &mut cells[..],
            };
            observer(&mut raw, notification)?;
        }
        Ok(())
    }
}

impl Mirrorable for AddressSpace {
    fn mirror(
        &mut self,
        source: RangeInclusive<u16>,
        target: RangeInclusive<u16>,
    ) -> Result<(), Error> {
        self.check_range(&source)?;
        self.check_range(&target)?;
        self.mirrors.push(MirrorRule::new(source, target)?);
        Ok(())
    }
}

impl Observable for AddressSpace {
    fn register_for_read(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        self.index(addr)?;
        self.observers.register(Access::Read, addr, observer);
        Ok(())
    }

    fn register_for_write(&mut self, addr: u16, observer: Observer) -> Result<(), Error> {
        self.index(addr)?;
        self.observers.register(Access::Write, addr, observer);
        Ok(())
    }
}

impl BlockAccessible for AddressSpace {
    fn read_block(&self, range: RangeInclusive<u16>) -> Result<Vec<u8>, Error> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let first = self.index(*range.start())?;
        let last = self.index(*range.end())?;
        Ok(self.cells[first..=last].to_vec())
    }

    fn write_block(&mut self, start: u16, values: &[u8]) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }
        let first = self.index(start)?;
        let last = first + values.len() - 1;
        if last >= self.cells.len() {
            return Err(Error::AddressOutOfRange {
                addr: (self.start as usize + last).min(u16::MAX as usize) as u16,
            });
        }
        self.cells[first..=last].copy_from_slice(values);
        Ok(())
    }
}

impl fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressSpace")
            .field("start", &format_args!("${:04X}", self.start))
            .field("size", &self.cells.len())
            .field("mirrors", &self.mirrors.len())
            .field("observers", &self.observers)
            .finish()
    }
}

fn offset(start: u16, size: usize, addr: u16) -> Result<usize, Error> {
    match addr.checked_sub(start) {
        Some(delta) if (delta as usize) < size => Ok(delta as usize),
        _ => Err(Error::AddressOutOfRange { addr }),
    }
}
