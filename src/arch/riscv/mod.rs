//! RISC-V machine-mode glue for QEMU virt
//!
//! Boot, the trap entry point, and `Machine`, the `Platform` the kernel
//! core drives on real hardware. Everything here runs in M-mode with
//! `satp` only affecting U-mode, so kernel pointers are physical.

use core::arch::{asm, global_asm};
use core::panic::PanicInfo;

use riscv::register::{mcause, mepc, mie, mstatus, mtval};
use spin::Mutex;

use crate::boot;
use crate::config::devices::{CLINT_BASE, PLIC_BASE, UART0_IRQ};
use crate::config::{BOOT_PROCESSES, MAXPROCS, TIMER_INTERVAL};
use crate::drivers::clint::Clint;
use crate::drivers::plic::Plic;
use crate::drivers::uart::UART;
use crate::kernel::Kernel;
use crate::kprintln;
use crate::logger;
use crate::mm::address::PhysAddr;
use crate::mm::paging::{satp_value, MappingError, ProcessPageTables};
use crate::platform::Platform;
use crate::trap::{TrapFrame, TrapInfo};

global_asm!(include_str!("trap.S"));

extern "C" {
    fn __trap_entry();
    fn __trap_resume(frame: usize) -> !;
}

/// The kernel context. Held for the whole of one trap.
static KERNEL: Mutex<Option<Kernel<Machine>>> = Mutex::new(None);

/// Address spaces, one per slot. Never moved once mapped.
static PAGE_TABLES: Mutex<[ProcessPageTables; MAXPROCS]> = {
    const EMPTY: ProcessPageTables = ProcessPageTables::new();
    Mutex::new([EMPTY; MAXPROCS])
};

/// QEMU virt as seen from hart 0 in M-mode.
pub struct Machine {
    plic: Plic,
    clint: Clint,
}

impl Machine {
    pub const fn new() -> Self {
        Self {
            plic: Plic::new(PLIC_BASE),
            clint: Clint::new(CLINT_BASE),
        }
    }
}

impl Platform for Machine {
    fn uart_read_ready(&self) -> bool {
        UART.lock().read_ready()
    }

    fn uart_read_byte(&mut self) -> u8 {
        UART.lock().read_byte()
    }

    fn uart_write_ready(&self) -> bool {
        UART.lock().write_ready()
    }

    fn uart_write_byte(&mut self, byte: u8) {
        UART.lock().write_byte(byte);
    }

    fn irq_claim(&mut self) -> u32 {
        self.plic.claim()
    }

    fn irq_complete(&mut self, irq: u32) {
        self.plic.complete(irq);
    }

    fn timer_now(&self) -> u64 {
        self.clint.now()
    }

    fn timer_set_next(&mut self, deadline: u64) {
        self.clint.set_deadline(deadline);
    }

    fn set_scratch(&mut self, physbase: PhysAddr) {
        // SAFETY: mscratch is only read by the trap trampoline
        unsafe { asm!("csrw mscratch, {0}", in(reg) physbase.as_usize()) };
    }

    fn activate_page_table(&mut self, root: PhysAddr) {
        // SAFETY: root is one of PAGE_TABLES, which live for the whole run.
        // M-mode accesses are untranslated, so this only affects user mode.
        unsafe {
            asm!(
                "csrw satp, {0}",
                "sfence.vma zero, zero",
                in(reg) satp_value(root),
            )
        };
    }

    fn load_byte(&self, addr: PhysAddr) -> u8 {
        // SAFETY: callers only pass addresses inside a process region
        unsafe { core::ptr::read_volatile(addr.as_usize() as *const u8) }
    }

    fn frame_mut(&mut self, addr: PhysAddr) -> &mut TrapFrame {
        // SAFETY: addr is a frame the trampoline saved, or one written at
        // boot, inside the owning process's region and 8-byte aligned.
        // Nothing else touches it while the kernel lock is held.
        unsafe { &mut *(addr.as_usize() as *mut TrapFrame) }
    }
}

/// Called from `trap.S` with the physical address of the saved frame.
/// Returns the physical address of the frame to restore.
#[no_mangle]
extern "C" fn trap_handler(frame: usize) -> usize {
    let info = TrapInfo {
        cause: mcause::read().bits(),
        epc: mepc::read(),
        tval: mtval::read(),
    };

    let mut guard = KERNEL.lock();
    let Some(kernel) = guard.as_mut() else {
        panic!("trap before the kernel was initialised, mcause {:#x}", info.cause);
    };
    match kernel.handle_trap(PhysAddr::new(frame), info) {
        Ok(resume) => {
            write_mepc(resume.pc);
            resume.frame.as_usize()
        }
        Err(e) => panic!("{}", e),
    }
}

fn write_mepc(pc: usize) {
    // SAFETY: the next mret jumps to pc in user mode
    unsafe { asm!("csrw mepc, {0}", in(reg) pc) };
}

/// Build every address space and return the root table addresses.
fn map_processes() -> Result<[PhysAddr; MAXPROCS], MappingError> {
    let mut tables = PAGE_TABLES.lock();
    let mut roots = [PhysAddr::new(0); MAXPROCS];
    for (pid, root) in roots.iter_mut().enumerate() {
        tables[pid].map_region(boot::layout(pid).physbase)?;
        *root = tables[pid].root_addr();
    }
    Ok(roots)
}

/// Give user mode access to all of memory; the page tables do the
/// isolating.
///
/// SAFETY AUDIT: 2026-10-19
/// - pmpaddr0 covers the whole 56-bit physical space, TOR with RWX
fn open_pmp() {
    // SAFETY: only widens U-mode permissions; M-mode is unaffected
    unsafe {
        asm!(
            "csrw pmpaddr0, {addr}",
            "csrw pmpcfg0, {cfg}",
            addr = in(reg) 0x3f_ffff_ffff_ffffusize,
            cfg = in(reg) 0xfusize,
        )
    };
}

/// Kernel entry point called from boot.S on hart 0
#[no_mangle]
pub extern "C" fn kernel_main() -> ! {
    // SAFETY: UART address is fixed by the QEMU virt machine, interrupts
    // are still off
    unsafe {
        UART.lock().init();
    }
    logger::init();

    kprintln!();
    kprintln!("OtterOS v{} - RISC-V machine-mode kernel", crate::VERSION);
    kprintln!();

    let roots = match map_processes() {
        Ok(roots) => roots,
        Err(e) => panic!("page tables: {}", e),
    };
    log::info!("mapped {} process regions", MAXPROCS);

    let procs = boot::process_table(&roots, BOOT_PROCESSES);
    let mut machine = Machine::new();
    for pid in 0..MAXPROCS {
        let layout = boot::layout(pid);
        let at = layout.physbase.add(layout.frame.as_usize());
        *machine.frame_mut(at) = boot::initial_frame(&layout);
    }

    // SAFETY: PLIC base is fixed by QEMU virt; UART0 is the only source
    unsafe {
        machine.plic.enable(UART0_IRQ, 1);
        machine.plic.set_threshold(0);
    }
    open_pmp();
    let now = machine.timer_now();
    machine.timer_set_next(now + TIMER_INTERVAL);

    // SAFETY: __trap_entry is 16-byte aligned (direct mode). The first
    // mret drops to U-mode with machine timer and external interrupts on.
    unsafe {
        asm!("csrw mtvec, {0}", in(reg) __trap_entry as usize);
        mstatus::set_mpp(mstatus::MPP::User);
        mstatus::set_mpie();
        mie::set_mtimer();
        mie::set_mext();
    }

    let (frame, pc) = {
        let mut guard = KERNEL.lock();
        let kernel = guard.insert(Kernel::new(procs, machine));
        kernel.start()
    };
    log::info!("starting {} processes", BOOT_PROCESSES);

    write_mepc(pc);
    // SAFETY: frame holds pid 0's initial registers and all CSRs for the
    // switch are set
    unsafe { __trap_resume(frame.as_usize()) }
}

/// Halt the CPU in a low-power state
pub fn halt() -> ! {
    loop {
        // SAFETY: WFI is always safe to execute
        unsafe {
            asm!("wfi");
        }
    }
}

/// Panic handler - called on unrecoverable errors
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    // SAFETY: single hart and nothing runs after this, so a holder of the
    // lock will never release it
    unsafe { UART.force_unlock() };

    kprintln!();
    kprintln!("!!! KERNEL PANIC !!!");
    if let Some(location) = info.location() {
        kprintln!(
            "Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
    }
    kprintln!("Message: {}", info.message());
    kprintln!("System halted.");

    halt();
}
