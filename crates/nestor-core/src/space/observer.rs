use std::{collections::HashMap, fmt, rc::Rc};

use crate::{error::Error, space::RawCells};

/// Direction of the access that produced a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

/// Delivered to every observer of an address once the access has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub addr: u16,
    /// The value read, or the value that was written.
    pub value: u8,
    pub access: Access,
}

impl Notification {
    pub fn new(addr: u16, value: u8, access: Access) -> Self {
        Self {
            addr,
            value,
            access,
        }
    }
}

/// Handler invoked synchronously from inside a read or write.
pub type Observer = Rc<dyn Fn(&mut RawCells<'_>, Notification) -> Result<(), Error>>;

/// Per-address subscriber lists, kept separately for reads and writes.
#[derive(Clone, Default)]
pub struct ObserverBus {
    reads: HashMap<u16, Vec<Observer>>,
    writes: HashMap<u16, Vec<Observer>>,
}

impl ObserverBus {
    pub fn register(&mut self, access: Access, addr: u16, observer: Observer) {
        self.table_mut(access).entry(addr).or_default().push(observer);
    }

    /// Observers for `addr`, in registration order.
    pub fn observers(&self, access: Access, addr: u16) -> &[Observer] {
        self.table(access)
            .get(&addr)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn table(&self, access: Access) -> &HashMap<u16, Vec<Observer>> {
        match access {
            Access::Read => &self.reads,
            Access::Write => &self.writes,
        }
    }

    fn table_mut(&mut self, access: Access) -> &mut HashMap<u16, Vec<Observer>> {
        match access {
            Access::Read => &mut self.reads,
            Access::Write => &mut self.writes,
        }
    }
}

impl fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reads: Vec<_> = self.reads.keys().copied().collect();
        let mut writes: Vec<_> = self.writes.keys().copied().collect();
        reads.sort_unstable();
        writes.sort_unstable();
        f.debug_struct("ObserverBus")
            .field("reads", &reads)
            .field("writes", &writes)
            .finish()
    }
}
