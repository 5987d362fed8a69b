//! `mcause` decoding

/// Top bit of `mcause`: set for asynchronous interrupts.
pub const INTERRUPT_FLAG: usize = usize::MAX - (usize::MAX >> 1);

/// Machine timer interrupt code
pub const MTI: usize = 7;
/// Machine external interrupt code
pub const MEI: usize = 11;
/// Environment call from U-mode
pub const ECALL_FROM_U: usize = 8;

/// What caused a trap, as far as the kernel cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapCause {
    MachineTimer,
    MachineExternal,
    EnvCall,
    /// Any other interrupt code.
    Interrupt(usize),
    /// Any other exception code.
    Exception(usize),
}

impl From<usize> for TrapCause {
    fn from(mcause: usize) -> Self {
        let code = mcause & !INTERRUPT_FLAG;
        if is_interrupt(mcause) {
            match code {
                MTI => TrapCause::MachineTimer,
                MEI => TrapCause::MachineExternal,
                _ => TrapCause::Interrupt(code),
            }
        } else {
            match code {
                ECALL_FROM_U => TrapCause::EnvCall,
                _ => TrapCause::Exception(code),
            }
        }
    }
}

#[inline]
pub fn is_interrupt(mcause: usize) -> bool {
    mcause & INTERRUPT_FLAG != 0
}

/// Human-readable name of an `mcause` value for diagnostics.
pub fn describe_cause(mcause: usize) -> &'static str {
    let code = mcause & !INTERRUPT_FLAG;
    if is_interrupt(mcause) {
        match code {
            3 => "MachineSoftInt",
            MTI => "MachineTimerInt",
            MEI => "MachineExternalInt",
            _ => "Interrupt",
        }
    } else {
        match code {
            0 => "InstructionAddressMisaligned",
            1 => "InstructionAccessFault",
            2 => "IllegalInstruction",
            3 => "Breakpoint",
            4 => "LoadAddressMisaligned",
            5 => "LoadAccessFault",
            6 => "StoreAMOAddressMisaligned",
            7 => "StoreAMOAccessFault",
            8 => "EnvironmentCallFromUMode",
            11 => "EnvironmentCallFromMMode",
            12 => "InstructionPageFault",
            13 => "LoadPageFault",
            15 => "StoreAMOPageFault",
            _ => "Exception",
        }
    }
}
