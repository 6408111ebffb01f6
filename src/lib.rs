//! Emulator for a small 8-bit register machine with 256 bytes of memory,
//! eight registers and a compare-only flags register.

pub mod fault;
pub mod memory;
pub mod processor;

pub use fault::{Fault, FaultKind};
