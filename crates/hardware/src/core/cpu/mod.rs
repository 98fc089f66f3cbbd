//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, the complete state of one hart.
//! It coordinates the following:
//! 1. **State Management:** Registers, program counter, privilege level, CSRs, the
//!    LR/SC reservation and the interrupt nesting guard.
//! 2. **Stepping:** One instruction boundary per `step`: interrupt arbitration, fetch,
//!    decode, execute, then a pc update driven by the instruction's explicit result.
//! 3. **System Integration:** Owns the physical bus and shares the device set with
//!    stimulus sources.

/// Control and Status Register instructions.
pub mod csr;

/// Instruction dispatch and execution.
pub mod execution;

/// Interrupt arbitration and `mip` mirroring.
pub mod interrupts;

/// Memory access through the MMU and bus.
pub mod memory;

/// Read-only state snapshots.
pub mod snapshot;

/// Trap entry and trap return.
pub mod trap;

use tracing::trace;

use crate::common::Trap;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::config::Config;
use crate::core::arch::csr::{CsrFile, MCYCLE, MINSTRET};
use crate::core::arch::fpr::Fpr;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::mode::PrivilegeMode;
use crate::core::units::mmu::Mmu;
use crate::isa::decode::decode;
use crate::isa::disasm::disassemble;
use crate::soc::{Bus, DeviceSet, System};

pub use self::execution::Control;
pub use self::interrupts::InterruptPriority;
pub use self::snapshot::HartSnapshot;

/// Result of one [`Cpu::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction completed and the pc moved on.
    Retired,
    /// An interrupt or exception redirected the pc to the trap vector.
    Trapped(Trap),
    /// The hart is suspended in `WFI` with nothing pending.
    Waiting,
}

/// Complete state of one hart.
pub struct Cpu {
    /// Value reported by `mhartid`; selects this hart's device registers.
    pub hart_id: usize,
    /// General-purpose registers.
    pub regs: Gpr,
    /// Floating-point registers.
    pub fregs: Fpr,
    /// Program counter.
    pub pc: u64,
    /// Control and Status Registers.
    pub csrs: CsrFile,
    /// Current privilege mode.
    pub privilege: PrivilegeMode,
    /// Physical address reserved by the last LR.
    pub reservation: Option<u64>,
    /// Priority of the interrupt currently being serviced (0 = none).
    pub priority_guard: u8,
    /// Memory Management Unit.
    pub mmu: Mmu,
    /// Physical bus.
    pub bus: Bus,
    /// Shared device handles.
    pub devices: DeviceSet,
    /// Set by `WFI` until an interrupt becomes pending.
    pub waiting: bool,
    /// Emit a trace event per retired instruction.
    pub trace: bool,
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("hart_id", &self.hart_id)
            .field("pc", &format_args!("{:#x}", self.pc))
            .field("privilege", &self.privilege)
            .field("priority_guard", &self.priority_guard)
            .field("reservation", &self.reservation)
            .field("waiting", &self.waiting)
            .finish_non_exhaustive()
    }
}

impl Cpu {
    /// Creates a hart attached to `system`.
    ///
    /// # Arguments
    ///
    /// * `system` - The bus and device set.
    /// * `hart_id` - Hart index.
    /// * `config` - Machine configuration (TLB size, tracing, reset pc).
    ///
    /// # Returns
    ///
    /// A hart in machine mode with `pc` at the RAM base.
    pub fn new(system: System, hart_id: usize, config: &Config) -> Self {
        let System { bus, devices } = system;
        Self {
            hart_id,
            regs: Gpr::new(),
            fregs: Fpr::new(),
            pc: config.system.ram_base,
            csrs: CsrFile::new(hart_id as u64),
            privilege: PrivilegeMode::Machine,
            reservation: None,
            priority_guard: 0,
            mmu: Mmu::new(config.memory.tlb_size),
            bus,
            devices,
            waiting: false,
            trace: config.general.trace_instructions,
        }
    }

    /// Reinitializes architectural state and sets the pc.
    ///
    /// RAM and devices are reset separately by the owner of the boot image.
    pub fn reset(&mut self, pc: u64) {
        self.regs = Gpr::new();
        self.fregs = Fpr::new();
        self.pc = pc;
        self.csrs = CsrFile::new(self.hart_id as u64);
        self.privilege = PrivilegeMode::Machine;
        self.reservation = None;
        self.priority_guard = 0;
        self.mmu.flush_tlb();
        self.waiting = false;
    }

    /// Advances the hart by one instruction boundary.
    ///
    /// The device lines are sampled first, then the arbitrator may take an
    /// interrupt (with `mepc` = the instruction about to run). Otherwise the
    /// instruction at `pc` is fetched, decoded and executed; a fault traps with
    /// `mepc` = the faulting instruction.
    pub fn step(&mut self) -> StepOutcome {
        self.devices.tick();
        self.sync_interrupt_pending();

        if self.waiting {
            if !self.wake_pending() {
                return StepOutcome::Waiting;
            }
            self.waiting = false;
        }

        self.bump(MCYCLE);

        if let Some(irq) = self.arbitrate() {
            self.take_trap(irq, self.pc);
            return StepOutcome::Trapped(irq);
        }

        let pc = self.pc;
        match self.fetch_and_execute(pc) {
            Ok(Control::Advance) => self.pc = pc.wrapping_add(INSTRUCTION_SIZE),
            Ok(Control::Redirect(target)) => self.pc = target,
            Err(trap) => {
                self.take_trap(trap, pc);
                return StepOutcome::Trapped(trap);
            }
        }

        self.bump(MINSTRET);
        StepOutcome::Retired
    }

    fn fetch_and_execute(&mut self, pc: u64) -> Result<Control, Trap> {
        let inst = self.fetch(pc)?;
        if self.trace {
            trace!(
                hart = self.hart_id,
                pc = format_args!("{pc:#x}"),
                inst = format_args!("{inst:08x}"),
                "{}",
                disassemble(inst)
            );
        }
        let decoded = decode(inst);
        self.execute(&decoded, pc)
    }

    fn bump(&mut self, counter: u16) {
        let val = self.csrs.get(counter);
        self.csrs.set(counter, val.wrapping_add(1));
    }
}
