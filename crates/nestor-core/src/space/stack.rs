use crate::error::Error;

/// Hardware stack behaviour on top of a memory region.
pub trait Stacked {
    fn push(&mut self, value: u8) -> Result<(), Error>;

    fn pop(&mut self) -> Result<u8, Error>;

    /// Sets the page-relative stack pointer (`TXS`).
    fn set_stack_ptr(&mut self, value: u8);

    fn stack_ptr(&self) -> u8;
}

/// A 256-byte descending stack confined to one page.
///
/// The pointer names the next free slot and wraps inside the page in both
/// directions, so pushing past `$xx00` continues at `$xxFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackPage {
    base: u16,
    ptr: u8,
}

impl StackPage {
    pub fn new(base: u16) -> Self {
        Self { base, ptr: 0xFF }
    }

    pub fn ptr(&self) -> u8 {
        self.ptr
    }

    pub fn set_ptr(&mut self, ptr: u8) {
        self.ptr = ptr;
    }

    /// Address to store the pushed byte at; moves the pointer down.
    pub fn push_addr(&mut self) -> u16 {
        let addr = self.base + self.ptr as u16;
        self.ptr = self.ptr.wrapping_sub(1);
        addr
    }

    /// Moves the pointer up; returns the address holding the popped byte.
    pub fn pop_addr(&mut self) -> u16 {
        self.ptr = self.ptr.wrapping_add(1);
        self.base + self.ptr as u16
    }
}
