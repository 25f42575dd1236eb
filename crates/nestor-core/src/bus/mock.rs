use crate::{bus::Bus, cpu::interrupt::InterruptController, error::Error};

/// Flat 64 KiB memory with a page-one stack and a cycle tally.
#[derive(Debug)]
pub(crate) struct MockBus {
    pub(crate) mem: Box<[u8]>,
    pub(crate) stack_ptr: u8,
    pub(crate) clocked: Vec<u64>,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            mem: vec![0; 0x1_0000].into_boxed_slice(),
            stack_ptr: 0xFF,
            clocked: Vec::new(),
        }
    }
}

impl MockBus {
    /// Places `program` at `addr`.
    pub(crate) fn load(&mut self, addr: u16, program: &[u8]) {
        let start = addr as usize;
        self.mem[start..start + program.len()].copy_from_slice(program);
    }

    pub(crate) fn set_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.mem[addr as usize] = lo;
        self.mem[addr.wrapping_add(1) as usize] = hi;
    }
}

impl Bus for MockBus {
    fn read(&mut self, addr: u16) -> Result<u8, Error> {
        Ok(self.mem[addr as usize])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        self.mem[addr as usize] = value;
        Ok(())
    }

    fn push(&mut self, value: u8) -> Result<(), Error> {
        self.mem[0x0100 + self.stack_ptr as usize] = value;
        self.stack_ptr = self.stack_ptr.wrapping_sub(1);
        Ok(())
    }

    fn pop(&mut self) -> Result<u8, Error> {
        self.stack_ptr = self.stack_ptr.wrapping_add(1);
        Ok(self.mem[0x0100 + self.stack_ptr as usize])
    }

    fn set_stack_ptr(&mut self, value: u8) {
        self.stack_ptr = value;
    }

    fn stack_ptr(&self) -> u8 {
        self.stack_ptr
    }

    fn clock(&mut self, cpu_cycles: u64, _: &mut InterruptController) -> Result<(), Error> {
        self.clocked.push(cpu_cycles);
        Ok(())
    }
}
