//! Architecture-specific code
//!
//! Only built for the bare-metal RISC-V target. Host builds (and the test
//! suite) run the kernel core against `testing::MockPlatform` instead.

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub mod riscv;
