use super::*;
use crate::boot;
use crate::config::RING_CAPACITY;
use crate::mm::address::ProcAddr;
use crate::syscall::numbers;
use crate::testing::{a0_of, boot_kernel, ecall, fault, frame_of, root_of, timer_tick, uart_irq};

fn assert_one_running(k: &Kernel<crate::testing::MockPlatform>) {
    assert_eq!(k.procs.count_in(ProcState::Running), 1);
    assert_eq!(k.procs.current().state, ProcState::Running);
}

#[test]
fn test_print_string_advances_caller_past_ecall() {
    let mut k = boot_kernel(&[0, 1]);
    k.procs.current_mut().pc = 0x40;
    let at = k.procs.to_kernel(ProcAddr::new(0x100));
    k.platform.write_bytes(at, b"Hi\0");

    let resume = ecall(&mut k, numbers::PRINTASTRING, 0x100).unwrap();
    assert_eq!(k.platform.uart_out, b"Hi");
    assert_eq!(resume.pid, 0);
    assert_eq!(resume.pc, 0x44);
    assert_eq!(resume.frame, frame_of(&k, 0));
    assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Complete(0)));
    assert_eq!(a0_of(&mut k, 0), 0);
    assert_one_running(&k);
}

#[test]
fn test_yield_resumes_next_ready_untouched() {
    let mut k = boot_kernel(&[1, 3]);
    k.procs.current_mut().pc = 0x200;
    let other = frame_of(&k, 3);
    k.platform.frame_mut(other).x[reg::A0] = 0x77;

    let resume = ecall(&mut k, numbers::YIELD, 0).unwrap();
    assert_eq!(resume.pid, 3);
    assert_eq!(resume.pc, 0);
    assert_eq!(resume.frame, other);
    // the caller, not the resumed process, moves past its ECALL
    assert_eq!(k.procs.get(1).unwrap().pc, 0x204);
    assert_eq!(k.procs.get(1).unwrap().state, ProcState::Ready);
    assert_eq!(a0_of(&mut k, 3), 0x77);
    assert_eq!(k.platform.active_root, Some(root_of(3)));
    assert_eq!(k.platform.scratch, Some(boot::layout(3).physbase));
    assert_one_running(&k);

    // and back again
    let resume = ecall(&mut k, numbers::YIELD, 0).unwrap();
    assert_eq!(resume.pid, 1);
    assert_eq!(resume.pc, 0x204);
    assert_eq!(k.procs.get(3).unwrap().pc, 4);
}

#[test]
fn test_blocked_getachar_is_retried_after_input() {
    let mut k = boot_kernel(&[0, 1]);
    k.procs.current_mut().pc = 0x80;

    let resume = ecall(&mut k, numbers::GETACHAR, 0).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Pending));
    assert_eq!(resume.pid, 1);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Blocked);
    assert_eq!(k.procs.get(0).unwrap().pc, 0x80);
    assert_eq!(k.procs.waiting_pid(), Some(0));

    // input arrives while pid 1 runs; pid 1 keeps the CPU
    let resume = uart_irq(&mut k, 0x61).unwrap();
    assert_eq!(resume.pid, 1);
    assert_eq!(resume.outcome, TrapOutcome::External { irq: UART0_IRQ });
    assert_eq!(k.platform.completed_irqs, vec![UART0_IRQ]);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Ready);
    assert_eq!(k.procs.waiting_pid(), None);
    assert_eq!(k.input.len(), 1);

    let resume = ecall(&mut k, numbers::YIELD, 0).unwrap();
    assert_eq!((resume.pid, resume.pc), (0, 0x80));

    let resume = ecall(&mut k, numbers::GETACHAR, 0).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Complete(0x61)));
    assert_eq!((resume.pid, resume.pc), (0, 0x84));
    assert_eq!(a0_of(&mut k, 0), 0x61);
    assert!(k.input.is_empty());
}

#[test]
fn test_input_overflow_drops_and_marks() {
    let mut k = boot_kernel(&[0, 1]);
    for byte in 0..=RING_CAPACITY as u8 {
        uart_irq(&mut k, byte).unwrap();
    }
    assert_eq!(k.input.len(), RING_CAPACITY);
    assert_eq!(k.platform.uart_out, b"*");
    assert_eq!(k.platform.completed_irqs.len(), RING_CAPACITY + 1);

    for expected in 0..RING_CAPACITY {
        let resume = ecall(&mut k, numbers::GETACHAR, 0).unwrap();
        assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Complete(expected)));
        assert_eq!(resume.pid, 0);
    }

    let resume = ecall(&mut k, numbers::GETACHAR, 0).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Pending));
    assert_eq!(resume.pid, 1);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Blocked);
}

#[test]
fn test_sleep_parameter_is_an_absolute_tick() {
    let mut k = boot_kernel(&[0, 1]);
    k.ticks = 12;
    let resume = ecall(&mut k, numbers::SLEEP, 5).unwrap();
    assert_eq!(resume.pid, 1);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Sleeping);
    assert_eq!(k.procs.get(0).unwrap().wakeuptime, 5);

    // already past tick 5, but sleepers are only checked every tenth tick
    for _ in 13..20 {
        timer_tick(&mut k).unwrap();
        assert_eq!(k.procs.get(0).unwrap().state, ProcState::Sleeping);
    }
    let resume = timer_tick(&mut k).unwrap();
    assert_eq!(k.ticks, 20);
    assert_eq!(resume.outcome, TrapOutcome::Timer { ticks: 20, rescheduled: true });
    assert_eq!(k.procs.get(0).unwrap().wakeuptime, 0);
    // woken and picked up by the same rescheduling tick
    assert_eq!(resume.pid, 0);
    assert_one_running(&k);
}

#[test]
fn test_sleep_past_next_check_waits_another_period() {
    let mut k = boot_kernel(&[0, 1]);
    k.ticks = 12;
    ecall(&mut k, numbers::SLEEP, 25).unwrap();
    for _ in 12..30 {
        timer_tick(&mut k).unwrap();
    }
    assert_eq!(k.ticks, 30);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Running);
    assert_eq!(k.procs.current_pid(), 0);
}

#[test]
fn test_sleep_zero_keeps_caller_ready() {
    let mut k = boot_kernel(&[0, 1]);
    let resume = ecall(&mut k, numbers::SLEEP, 0).unwrap();
    assert_eq!(resume.pid, 1);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Ready);
    assert_eq!(k.procs.get(0).unwrap().pc, 4);
}

#[test]
fn test_invalid_syscall_number_returns_zero() {
    let mut k = boot_kernel(&[0, 1]);
    k.procs.current_mut().pc = 0x10;
    let resume = ecall(&mut k, 99, 0x1234).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Complete(0)));
    assert_eq!((resume.pid, resume.pc), (0, 0x14));
    assert_eq!(a0_of(&mut k, 0), 0);
    assert!(k.platform.uart_out.is_empty());
    assert_eq!(k.procs.get(1).unwrap().state, ProcState::Ready);
}

#[test]
fn test_putachar() {
    let mut k = boot_kernel(&[0]);
    ecall(&mut k, numbers::PUTACHAR, b'x' as usize).unwrap();
    assert_eq!(k.platform.uart_out, b"x");
}

#[test]
fn test_exit_hands_over_and_stays_gone() {
    let mut k = boot_kernel(&[0, 1]);
    let resume = ecall(&mut k, numbers::EXIT, 0).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::Syscall(SyscallOutcome::Exited));
    assert_eq!(resume.pid, 1);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::None);

    for _ in 0..3 * WAKE_CHECK_PERIOD {
        timer_tick(&mut k).unwrap();
        uart_irq(&mut k, b'z').unwrap();
        assert_eq!(k.procs.current_pid(), 1);
    }
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::None);
}

#[test]
fn test_exit_of_last_process_is_fatal() {
    let mut k = boot_kernel(&[2]);
    assert_eq!(ecall(&mut k, numbers::EXIT, 0), Err(KernelError::NoRunnableProcess));
}

#[test]
fn test_timer_rearms_and_rotates_every_period() {
    let mut k = boot_kernel(&[0, 1, 2]);
    k.platform.now = 1000;
    let resume = timer_tick(&mut k).unwrap();
    assert_eq!(k.platform.timer_deadline, Some(1000 + 2 * TIMER_INTERVAL));
    assert_eq!(resume.outcome, TrapOutcome::Timer { ticks: 1, rescheduled: false });
    assert_eq!(resume.pid, 0);

    let mut order = Vec::new();
    for _ in 0..3 * WAKE_CHECK_PERIOD {
        let resume = timer_tick(&mut k).unwrap();
        if let TrapOutcome::Timer { rescheduled: true, .. } = resume.outcome {
            order.push(resume.pid);
        }
        assert_one_running(&k);
    }
    assert_eq!(order, vec![1, 2, 0]);
}

#[test]
fn test_preempted_process_resumes_where_it_stopped() {
    let mut k = boot_kernel(&[0, 1]);
    k.ticks = WAKE_CHECK_PERIOD - 1;
    k.procs.current_mut().pc = 0x3c;
    let resume = timer_tick(&mut k).unwrap();
    assert_eq!(resume.pid, 1);
    assert_eq!(k.procs.get(0).unwrap().pc, 0x3c);
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Ready);
}

#[test]
fn test_unhandled_exception_resumes_at_faulting_pc() {
    let mut k = boot_kernel(&[0, 1]);
    k.procs.current_mut().pc = 0x123;
    let resume = fault(&mut k, 2, 0xdead).unwrap();
    assert_eq!(
        resume.outcome,
        TrapOutcome::Fault { cause: 2, pc: 0x123, tval: 0xdead }
    );
    assert_eq!((resume.pid, resume.pc), (0, 0x123));
    assert_one_running(&k);
}

#[test]
fn test_other_external_irq_is_completed_without_input() {
    let mut k = boot_kernel(&[0, 1]);
    k.procs.current_mut().pc = 0x80;
    ecall(&mut k, numbers::GETACHAR, 0).unwrap();

    k.platform.pending_irqs.push_back(5);
    let resume = fault(&mut k, INTERRUPT_FLAG | MEI, 0).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::External { irq: 5 });
    assert_eq!(k.platform.completed_irqs, vec![5]);
    assert!(k.input.is_empty());
    // only UART input wakes a reader
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Blocked);

    // spurious claim: nothing to complete
    fault(&mut k, INTERRUPT_FLAG | MEI, 0).unwrap();
    assert_eq!(k.platform.completed_irqs, vec![5]);
}

#[test]
fn test_software_interrupt_is_ignored() {
    let mut k = boot_kernel(&[0]);
    let resume = fault(&mut k, INTERRUPT_FLAG | 3, 0).unwrap();
    assert_eq!(resume.outcome, TrapOutcome::Ignored { cause: INTERRUPT_FLAG | 3 });
    assert_eq!(resume.pid, 0);
}

#[test]
fn test_waiters_are_woken_in_arrival_order() {
    let mut k = boot_kernel(&[0, 1, 2]);
    ecall(&mut k, numbers::GETACHAR, 0).unwrap();
    assert_eq!(k.procs.current_pid(), 1);
    ecall(&mut k, numbers::GETACHAR, 0).unwrap();
    assert_eq!(k.procs.current_pid(), 2);

    uart_irq(&mut k, b'a').unwrap();
    assert_eq!(k.procs.get(0).unwrap().state, ProcState::Ready);
    assert_eq!(k.procs.get(1).unwrap().state, ProcState::Blocked);
    assert_eq!(k.procs.waiting_pid(), Some(1));
}

#[test]
fn test_every_trap_switches_address_space() {
    let mut k = boot_kernel(&[0, 1]);
    ecall(&mut k, numbers::PUTACHAR, b'a' as usize).unwrap();
    ecall(&mut k, numbers::YIELD, 0).unwrap();
    assert_eq!(k.platform.tlb_flushes, 2);
    assert_eq!(k.platform.active_root, Some(root_of(1)));
}

#[test]
fn test_start_enters_pid_zero_at_its_entry() {
    let mut k = boot_kernel(&[0, 1]);
    let (frame, pc) = k.start();
    assert_eq!(frame, frame_of(&k, 0));
    assert_eq!(pc, 0);
    assert_eq!(k.platform.active_root, Some(root_of(0)));
    assert_eq!(k.platform.scratch, Some(boot::layout(0).physbase));
    assert_eq!(
        k.platform.frame_mut(frame).sp(),
        boot::layout(0).stack_top.as_usize()
    );
}
