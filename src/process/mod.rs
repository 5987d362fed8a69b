//! Processes
//!
//! The process table owns every PCB. It is created once at boot and only
//! the trap handler mutates it afterwards.

mod pcb;
mod table;

pub use pcb::{Pcb, Pid, ProcState};
pub use table::ProcessTable;
