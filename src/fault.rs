use std::{error, fmt};

use crate::memory::Byte;

/// Reasons the processor stops with an error instead of halting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The opcode is tagged as an ALU operation but the ALU does not know it
    UnsupportedOperation,
    /// No handler exists for a non-ALU opcode
    UnknownOpcode,
    /// A computed memory address lies outside of memory
    MemoryOutOfBounds { address: isize },
    /// A register operand names a register that does not exist
    RegisterOutOfBounds { index: usize },
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::UnsupportedOperation => f.write_str("unsupported ALU operation"),
            FaultKind::UnknownOpcode => f.write_str("unknown opcode"),
            FaultKind::MemoryOutOfBounds { address } => {
                write!(f, "memory has no address `{}`", address)
            }
            FaultKind::RegisterOutOfBounds { index } => {
                write!(f, "there is no register `r{}`", index)
            }
        }
    }
}

impl error::Error for FaultKind {}

/// A fault together with the machine state needed to reproduce it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fault {
    pub kind: FaultKind,
    /// Program counter of the faulting instruction
    pub pc: Byte,
    /// `None` if the opcode itself could not be fetched
    pub opcode: Option<Byte>,
}

impl Fault {
    pub fn new(kind: FaultKind, pc: Byte, opcode: Option<Byte>) -> Self {
        Self { kind, pc, opcode }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(opcode) => write!(
                f,
                "fault [pc: 0x{:02X}, opcode: 0b{:08b}]: {}",
                self.pc, opcode, self.kind
            ),
            None => write!(f, "fault [pc: 0x{:02X}]: {}", self.pc, self.kind),
        }
    }
}

impl error::Error for Fault {}
