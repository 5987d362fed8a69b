//! Host-side test support: a scripted platform and a booted kernel.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::boot;
use crate::config::{devices::UART0_IRQ, MAXPROCS, TIMER_INTERVAL};
use crate::error::KernelError;
use crate::kernel::Kernel;
use crate::mm::address::PhysAddr;
use crate::platform::Platform;
use crate::process::{Pcb, Pid, ProcState, ProcessTable};
use crate::trap::{reg, Resume, TrapFrame, TrapInfo, ECALL_FROM_U, INTERRUPT_FLAG, MEI, MTI};

/// Records everything the kernel asks of the machine.
#[derive(Debug, Default)]
pub struct MockPlatform {
    /// Sparse physical memory, zero where never written.
    pub memory: BTreeMap<usize, u8>,
    pub frames: HashMap<usize, TrapFrame>,
    pub uart_in: VecDeque<u8>,
    pub uart_out: Vec<u8>,
    pub pending_irqs: VecDeque<u32>,
    pub completed_irqs: Vec<u32>,
    pub now: u64,
    pub timer_deadline: Option<u64>,
    pub scratch: Option<PhysAddr>,
    pub active_root: Option<PhysAddr>,
    pub tlb_flushes: usize,
}

impl MockPlatform {
    pub fn write_bytes(&mut self, at: PhysAddr, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.memory.insert(at.as_usize() + i, b);
        }
    }
}

impl Platform for MockPlatform {
    fn uart_read_ready(&self) -> bool {
        !self.uart_in.is_empty()
    }

    fn uart_read_byte(&mut self) -> u8 {
        self.uart_in.pop_front().unwrap_or(0)
    }

    fn uart_write_ready(&self) -> bool {
        true
    }

    fn uart_write_byte(&mut self, byte: u8) {
        self.uart_out.push(byte);
    }

    fn irq_claim(&mut self) -> u32 {
        self.pending_irqs.pop_front().unwrap_or(0)
    }

    fn irq_complete(&mut self, irq: u32) {
        self.completed_irqs.push(irq);
    }

    fn timer_now(&self) -> u64 {
        self.now
    }

    fn timer_set_next(&mut self, deadline: u64) {
        self.timer_deadline = Some(deadline);
    }

    fn set_scratch(&mut self, physbase: PhysAddr) {
        self.scratch = Some(physbase);
    }

    fn activate_page_table(&mut self, root: PhysAddr) {
        self.active_root = Some(root);
        self.tlb_flushes += 1;
    }

    fn load_byte(&self, addr: PhysAddr) -> u8 {
        self.memory.get(&addr.as_usize()).copied().unwrap_or(0)
    }

    fn frame_mut(&mut self, addr: PhysAddr) -> &mut TrapFrame {
        self.frames.entry(addr.as_usize()).or_default()
    }
}

/// Fake root page table address of `pid`.
pub fn root_of(pid: Pid) -> PhysAddr {
    PhysAddr::new(0x8100_0000 + pid * 0x2000)
}

/// Kernel with the listed pids runnable. The first one is current and
/// RUNNING, the rest are READY, every other slot is NONE. Each process
/// starts at its boot layout with its initial frame in place.
pub fn boot_kernel(runnable: &[Pid]) -> Kernel<MockPlatform> {
    let first = runnable[0];
    let pcbs: [Pcb; MAXPROCS] = core::array::from_fn(|pid| {
        let layout = boot::layout(pid);
        let mut pcb = Pcb::new(layout.physbase, root_of(pid), layout.entry, layout.frame);
        pcb.state = if pid == first {
            ProcState::Running
        } else if runnable.contains(&pid) {
            ProcState::Ready
        } else {
            ProcState::None
        };
        pcb
    });

    let mut platform = MockPlatform::default();
    for pid in 0..MAXPROCS {
        let layout = boot::layout(pid);
        let at = layout.physbase.add(layout.frame.as_usize());
        platform.frames.insert(at.as_usize(), boot::initial_frame(&layout));
    }
    Kernel::new(ProcessTable::new(pcbs, first), platform)
}

/// Physical address of the saved frame of `pid`.
pub fn frame_of(k: &Kernel<MockPlatform>, pid: Pid) -> PhysAddr {
    let pcb = k.procs.get(pid).unwrap();
    pcb.physbase().add(pcb.sp.as_usize())
}

/// Saved `a0` of `pid`.
pub fn a0_of(k: &mut Kernel<MockPlatform>, pid: Pid) -> usize {
    let at = frame_of(k, pid);
    k.platform.frame_mut(at).x[reg::A0]
}

fn trap(k: &mut Kernel<MockPlatform>, cause: usize, tval: usize) -> Result<Resume, KernelError> {
    let pid = k.procs.current_pid();
    let frame = frame_of(k, pid);
    let epc = k.procs.current().pc;
    k.handle_trap(frame, TrapInfo { cause, epc, tval })
}

/// The current process executes `ecall` with `a7 = nr`, `a0 = param`.
pub fn ecall(k: &mut Kernel<MockPlatform>, nr: usize, param: usize) -> Result<Resume, KernelError> {
    let at = frame_of(k, k.procs.current_pid());
    let regs = k.platform.frame_mut(at);
    regs.x[reg::A7] = nr;
    regs.x[reg::A0] = param;
    trap(k, ECALL_FROM_U, 0)
}

/// One timer interrupt, `TIMER_INTERVAL` cycles after the last.
pub fn timer_tick(k: &mut Kernel<MockPlatform>) -> Result<Resume, KernelError> {
    k.platform.now += TIMER_INTERVAL;
    trap(k, INTERRUPT_FLAG | MTI, 0)
}

/// The UART receives `byte` and raises its interrupt.
pub fn uart_irq(k: &mut Kernel<MockPlatform>, byte: u8) -> Result<Resume, KernelError> {
    k.platform.uart_in.push_back(byte);
    k.platform.pending_irqs.push_back(UART0_IRQ);
    trap(k, INTERRUPT_FLAG | MEI, 0)
}

/// Any exception other than ECALL.
pub fn fault(k: &mut Kernel<MockPlatform>, cause: usize, tval: usize) -> Result<Resume, KernelError> {
    trap(k, cause, tval)
}
