use std::fmt;

use crate::{
    bus::Bus,
    config::MachineConfig,
    cpu::{
        addressing::{
            Addressing, absolute, crosses_page, indexed_absolute, indexed_zero_page, relative,
            zero_page,
        },
        interrupt::{Interrupt, InterruptController, InterruptSink},
        lookup::lookup,
        mnemonic::Operand,
        status::Status,
    },
    error::Error,
};

pub mod addressing;
mod cycle;
pub mod instruction;
pub mod interrupt;
mod lookup;
pub mod mnemonic;
pub mod status;

pub use instruction::Instruction;

/// Register view handed to debuggers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub status: u8,
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC:${:04X} A:${:02X} X:${:02X} Y:${:02X} P:${:02X}",
            self.pc, self.a, self.x, self.y, self.status
        )
    }
}

/// The 6502 core: registers, pending interrupt and the run loop.
#[derive(Debug, Clone)]
pub struct Cpu {
    pc: u16,
    a: u8,
    x: u8,
    y: u8,
    status: Status,
    interrupts: InterruptController,
    paused: bool,
    load_base: u16,
    trace: bool,
    /// Cycles executed since construction.
    cycles: u64,
}

impl Cpu {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            pc: 0,
            a: 0,
            x: 0,
            y: 0,
            status: Status::empty(),
            interrupts: InterruptController::default(),
            paused: false,
            load_base: config.load_base,
            trace: config.trace_instructions,
            cycles: 0,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            status: self.status.bits(),
        }
    }

    /// Toggles the cooperative pause flag checked at the top of the run loop.
    pub fn pause(&mut self) {
        self.paused = !self.paused;
        tracing::debug!(paused = self.paused, "pause toggled");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        self.interrupts.pending()
    }

    pub fn interrupts_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupts
    }

    /// Executes instructions while the cycles consumed so far are within
    /// `budget` and the CPU is not paused.
    ///
    /// After each instruction the bus is clocked with exactly that
    /// instruction's cycles, then a pending interrupt is serviced if the
    /// interrupt-disable flag is clear. Returns the cycles consumed.
    pub fn run<B: Bus>(&mut self, budget: u64, bus: &mut B) -> Result<u64, Error> {
        let mut consumed = 0;
        while consumed <= budget && !self.paused {
            let delta = self.execute_next(bus)?;
            consumed += delta;
            self.cycles += delta;
            bus.clock(delta, &mut self.interrupts)?;
            self.service_interrupt(bus)?;
        }
        Ok(consumed)
    }

    fn execute_next<B: Bus>(&mut self, bus: &mut B) -> Result<u64, Error> {
        let pc = self.pc;
        let opcode = bus.read(pc)?;
        let instruction = lookup(opcode).ok_or(Error::UnknownOpcode { pc, opcode })?;
        let (operand, crossed) = self.fetch_operand(bus, pc, instruction.addressing)?;

        if self.trace {
            tracing::trace!("${pc:04X} {opcode:02X} {instruction} {operand:?} {}", self.snapshot());
        }

        self.pc = pc.wrapping_add(instruction.byte_len());
        let taken = instruction.mnemonic.execute(self, bus, operand)?;
        let crossed = if taken {
            crosses_page(pc, self.pc)
        } else {
            crossed
        };
        Ok(instruction.cycle.total_cycle(crossed, taken))
    }

    /// Resolves the operand of the instruction at `pc`. The flag reports an
    /// indexed access that crossed a page.
    fn fetch_operand<B: Bus>(
        &self,
        bus: &mut B,
        pc: u16,
        addressing: Addressing,
    ) -> Result<(Operand, bool), Error> {
        let mut byte = |offset: u16| bus.read(pc.wrapping_add(offset));

        let resolved = match addressing {
            Addressing::Implied => (Operand::None, false),
            Addressing::Immediate => (Operand::Immediate(byte(1)?), false),
            Addressing::ZeroPage => (Operand::Address(zero_page(byte(1)?)), false),
            Addressing::ZeroPageX => (Operand::Address(indexed_zero_page(byte(1)?, self.x)), false),
            Addressing::ZeroPageY => (Operand::Address(indexed_zero_page(byte(1)?, self.y)), false),
            Addressing::Absolute => (Operand::Address(absolute(byte(1)?, byte(2)?)), false),
            Addressing::AbsoluteX | Addressing::AbsoluteY => {
                let index = if addressing == Addressing::AbsoluteX {
                    self.x
                } else {
                    self.y
                };
                let (lo, hi) = (byte(1)?, byte(2)?);
                let addr = indexed_absolute(lo, hi, index);
                (Operand::Address(addr), crosses_page(absolute(lo, hi), addr))
            }
            Addressing::IndirectY => {
                let ptr = byte(1)?;
                let lo = bus.read(zero_page(ptr))?;
                let hi = bus.read(indexed_zero_page(ptr, 1))?;
                let addr = indexed_absolute(lo, hi, self.y);
                (Operand::Address(addr), crosses_page(absolute(lo, hi), addr))
            }
            Addressing::Relative => {
                let next = pc.wrapping_add(2);
                (Operand::Target(relative(next, byte(1)?)), false)
            }
        };
        Ok(resolved)
    }

    fn service_interrupt<B: Bus>(&mut self, bus: &mut B) -> Result<(), Error> {
        if self.status.i() {
            return Ok(());
        }
        let Some(kind) = self.interrupts.take() else {
            return Ok(());
        };

        let [lo, hi] = self.pc.wrapping_sub(self.load_base).to_le_bytes();
        bus.push(hi)?;
        bus.push(lo)?;
        bus.push(self.status.bits())?;
        self.status.insert(Status::INTERRUPT);
        let from = self.pc;
        self.pc = bus.read_word(kind.vector())?;
        tracing::debug!("servicing {kind}: ${from:04X} -> ${:04X}", self.pc);
        Ok(())
    }
}

impl InterruptSink for Cpu {
    fn request_interrupt(&mut self, kind: Interrupt) {
        self.interrupts.request_interrupt(kind);
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::MockBus;

    fn cpu_at(pc: u16) -> Cpu {
        let mut cpu = Cpu::new(&MachineConfig::default());
        cpu.set_pc(pc);
        cpu
    }

    fn run_one(cpu: &mut Cpu, bus: &mut MockBus) -> u64 {
        cpu.run(1, bus).expect("run")
    }

    #[test]
    fn lda_immediate_loads_and_sets_flags() {
        for (operand, zero, negative) in [(0x00u8, true, false), (0x80, false, true), (0x42, false, false)] {
            let mut bus = MockBus::default();
            bus.load(0x8000, &[0xA9, operand]);
            let mut cpu = cpu_at(0x8000);

            let cycles = run_one(&mut cpu, &mut bus);

            assert_eq!(cpu.a(), operand);
            assert_eq!(cpu.status().z(), zero);
            assert_eq!(cpu.status().n(), negative);
            assert_eq!(cpu.pc(), 0x8002);
            assert_eq!(cycles, 2);
            assert_eq!(bus.clocked, [2]);
        }
    }

    #[test]
    fn run_stops_once_the_budget_is_exceeded() {
        let mut bus = MockBus::default();
        // Six INX instructions, 2 cycles each.
        bus.load(0x8000, &[0xE8; 6]);
        let mut cpu = cpu_at(0x8000);

        let consumed = cpu.run(4, &mut bus).expect("run");

        assert_eq!(consumed, 6);
        assert_eq!(cpu.x(), 3);
        assert_eq!(bus.clocked, [2, 2, 2]);
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0xEA]);
        let mut cpu = cpu_at(0x8000);

        let err = cpu.run(10, &mut bus).expect_err("should fail");

        assert!(matches!(
            err,
            Error::UnknownOpcode {
                pc: 0x8000,
                opcode: 0xEA
            }
        ));
        assert!(bus.clocked.is_empty());
    }

    #[test]
    fn paused_cpu_does_nothing() {
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0xE8]);
        let mut cpu = cpu_at(0x8000);
        cpu.pause();

        assert_eq!(cpu.run(100, &mut bus).expect("run"), 0);
        assert_eq!(cpu.pc(), 0x8000);

        cpu.pause();
        assert!(!cpu.is_paused());
        assert_eq!(run_one(&mut cpu, &mut bus), 2);
    }

    #[test]
    fn indexed_reads_pay_for_page_crossings() {
        let mut bus = MockBus::default();
        // LDX #$01; LDA $80FF,X
        bus.load(0x8000, &[0xA2, 0x01, 0xBD, 0xFF, 0x80]);
        bus.mem[0x8100] = 0x99;
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        let cycles = run_one(&mut cpu, &mut bus);

        assert_eq!(cpu.a(), 0x99);
        assert_eq!(cycles, 5);
    }

    #[test]
    fn indirect_indexed_follows_the_zero_page_pointer() {
        let mut bus = MockBus::default();
        // LDY #$04; LDA ($10),Y
        bus.load(0x8000, &[0xA0, 0x04, 0xB1, 0x10]);
        bus.set_word(0x0010, 0x0300);
        bus.mem[0x0304] = 0x7E;
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        let cycles = run_one(&mut cpu, &mut bus);

        assert_eq!(cpu.a(), 0x7E);
        assert_eq!(cycles, 5);
    }

    #[test]
    fn zero_page_x_wraps_and_stores() {
        let mut bus = MockBus::default();
        // LDX #$02; LDA #$33; STA $FF,X; LDA #$00; LDA $FF,X
        bus.load(0x8000, &[0xA2, 0x02, 0xA9, 0x33, 0x95, 0xFF, 0xA9, 0x00, 0xB5, 0xFF]);
        let mut cpu = cpu_at(0x8000);

        for _ in 0..5 {
            run_one(&mut cpu, &mut bus);
        }

        assert_eq!(bus.mem[0x0001], 0x33);
        assert_eq!(cpu.a(), 0x33);
    }

    #[test]
    fn branches_charge_for_taken_and_page_cross() {
        // BNE not taken after LDA #0 sets Z.
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0xA9, 0x00, 0xD0, 0x10]);
        let mut cpu = cpu_at(0x8000);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 2);
        assert_eq!(cpu.pc(), 0x8004);

        // BEQ taken, same page.
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0xA9, 0x00, 0xF0, 0x10]);
        let mut cpu = cpu_at(0x8000);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 3);
        assert_eq!(cpu.pc(), 0x8014);

        // BPL taken backwards onto the previous page.
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0xA9, 0x01, 0x10, 0x80]);
        let mut cpu = cpu_at(0x8000);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 4);
        assert_eq!(cpu.pc(), 0x7F84);
    }

    #[test]
    fn jsr_and_rts_use_the_load_base() {
        let mut bus = MockBus::default();
        // JSR $9000 ... $9000: RTS
        bus.load(0x8000, &[0x20, 0x00, 0x90]);
        bus.load(0x9000, &[0x60]);
        let mut cpu = cpu_at(0x8000);

        assert_eq!(run_one(&mut cpu, &mut bus), 6);
        assert_eq!(cpu.pc(), 0x9000);
        assert_eq!(bus.stack_ptr, 0xFD);
        assert_eq!(bus.mem[0x01FF], 0x00);
        assert_eq!(bus.mem[0x01FE], 0x03);

        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(bus.stack_ptr, 0xFF);
    }

    #[test]
    fn adc_sets_carry_on_overflow_past_ff() {
        let mut bus = MockBus::default();
        // LDA #$F0; ADC $10
        bus.load(0x8000, &[0xA9, 0xF0, 0x65, 0x10]);
        bus.mem[0x0010] = 0x20;
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);

        assert_eq!(cpu.a(), 0x10);
        assert!(cpu.status().c());
        assert!(!cpu.status().z());
    }

    #[test]
    fn cmp_never_clears_carry() {
        let mut bus = MockBus::default();
        // LDA #$10; CMP #$10; CMP #$20
        bus.load(0x8000, &[0xA9, 0x10, 0xC9, 0x10, 0xC9, 0x20]);
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);
        assert!(cpu.status().c() && cpu.status().z());

        run_one(&mut cpu, &mut bus);
        assert!(cpu.status().c());
        assert!(!cpu.status().z());
        assert!(cpu.status().n());
    }

    #[test]
    fn cpx_compares_against_the_immediate() {
        let mut bus = MockBus::default();
        // LDX #$05; CPX #$06
        bus.load(0x8000, &[0xA2, 0x05, 0xE0, 0x06]);
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);

        assert!(!cpu.status().c());
        assert!(cpu.status().n());
    }

    #[test]
    fn stack_and_transfer_ops() {
        let mut bus = MockBus::default();
        // LDX #$80; TXS; LDA #$AB; PHA; LDA #$00; PLA
        bus.load(0x8000, &[0xA2, 0x80, 0x9A, 0xA9, 0xAB, 0x48, 0xA9, 0x00, 0x68]);
        let mut cpu = cpu_at(0x8000);

        for _ in 0..6 {
            run_one(&mut cpu, &mut bus);
        }

        assert_eq!(bus.mem[0x0180], 0xAB);
        assert_eq!(cpu.a(), 0xAB);
        assert!(cpu.status().n());
    }

    #[test]
    fn inc_and_register_counters_wrap() {
        let mut bus = MockBus::default();
        // INC $20; DEX; INY
        bus.load(0x8000, &[0xE6, 0x20, 0xCA, 0xC8]);
        bus.mem[0x0020] = 0xFF;
        let mut cpu = cpu_at(0x8000);

        assert_eq!(run_one(&mut cpu, &mut bus), 5);
        assert_eq!(bus.mem[0x0020], 0x00);
        assert!(cpu.status().z());

        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.x(), 0xFF);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.y(), 0x01);
    }

    #[test]
    fn flag_instructions() {
        let mut bus = MockBus::default();
        // SEI; CLI; CLD; CLC
        bus.load(0x8000, &[0x78, 0x58, 0xD8, 0x18]);
        let mut cpu = cpu_at(0x8000);
        cpu.status = Status::CARRY | Status::DECIMAL;

        run_one(&mut cpu, &mut bus);
        assert!(cpu.status().i());
        for _ in 0..3 {
            run_one(&mut cpu, &mut bus);
        }
        assert_eq!(cpu.status(), Status::empty());
    }

    #[test]
    fn interrupts_are_serviced_after_the_instruction() {
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0xE8]);
        bus.set_word(0xFFFA, 0x9000);
        let mut cpu = cpu_at(0x8000);
        cpu.request_interrupt(Interrupt::Nmi);

        run_one(&mut cpu, &mut bus);

        assert_eq!(cpu.x(), 1);
        assert_eq!(cpu.pc(), 0x9000);
        assert!(cpu.status().i());
        assert_eq!(cpu.pending_interrupt(), None);
        // Return address relative to the load base, then status.
        assert_eq!(bus.mem[0x01FF], 0x00);
        assert_eq!(bus.mem[0x01FE], 0x01);
        assert_eq!(bus.mem[0x01FD], 0x00);
    }

    #[test]
    fn interrupt_disable_holds_every_kind_back() {
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0x78, 0xE8, 0x58, 0xE8]);
        bus.set_word(0xFFFC, 0xA000);
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        cpu.request_interrupt(Interrupt::Reset);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.pc(), 0x8002);
        assert_eq!(cpu.pending_interrupt(), Some(Interrupt::Reset));

        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.pc(), 0xA000);
    }

    #[test]
    fn rti_restores_status_and_pc() {
        let mut bus = MockBus::default();
        bus.load(0x8000, &[0x58, 0xE8]);
        bus.load(0x9000, &[0x40]);
        bus.set_word(0xFFFE, 0x9000);
        let mut cpu = cpu_at(0x8000);

        run_one(&mut cpu, &mut bus);
        cpu.request_interrupt(Interrupt::Irq);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.pc(), 0x9000);

        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.pc(), 0x8002);
        assert!(!cpu.status().i());
        assert_eq!(bus.stack_ptr, 0xFF);
    }

    #[test]
    fn snapshot_display() {
        let mut cpu = cpu_at(0xC000);
        cpu.a = 0x12;
        assert_eq!(
            cpu.to_string(),
            "PC:$C000 A:$12 X:$00 Y:$00 P:$00"
        );
    }
}
