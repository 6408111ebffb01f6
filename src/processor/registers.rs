use std::cmp::Ordering;

use crate::fault::FaultKind;
use crate::memory::Byte;

/// Number of general purpose register slots
pub const REGISTER_COUNT: usize = 8;
/// Slot holding the program counter
pub const PC: usize = 4;
/// Slot holding the stack pointer
pub const SP: usize = 7;
/// Initial stack pointer. The stack grows downwards from here.
pub const STACK_START: Byte = 0xF3;

/// The register file. Two of the eight slots double as program counter and
/// stack pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    slots: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut slots = [0; REGISTER_COUNT];
        slots[SP] = STACK_START;

        Self { slots }
    }
}

impl Registers {
    /// Reads the register named by an operand byte
    pub fn get(&self, index: Byte) -> Result<Byte, FaultKind> {
        self.slots
            .get(index as usize)
            .copied()
            .ok_or(FaultKind::RegisterOutOfBounds {
                index: index as usize,
            })
    }

    /// Writes the register named by an operand byte
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<(), FaultKind> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(FaultKind::RegisterOutOfBounds {
                index: index as usize,
            })?;
        *slot = value;

        Ok(())
    }

    pub fn pc(&self) -> Byte {
        self.slots[PC]
    }

    pub fn set_pc(&mut self, value: Byte) {
        self.slots[PC] = value;
    }

    pub fn sp(&self) -> Byte {
        self.slots[SP]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.slots[SP] = value;
    }

    pub fn slots(&self) -> &[Byte; REGISTER_COUNT] {
        &self.slots
    }
}

/// Result of the last compare. Exactly one bit is set after any `CMP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(Byte);

impl Flags {
    pub const EQUAL: Byte = 0b0000_0001;
    pub const GREATER: Byte = 0b0000_0010;
    pub const LESS: Byte = 0b0000_0100;

    /// Flags for `a.cmp(&b)`
    pub fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self(Self::LESS),
            Ordering::Greater => Self(Self::GREATER),
            Ordering::Equal => Self(Self::EQUAL),
        }
    }

    pub fn bits(self) -> Byte {
        self.0
    }

    pub fn equal(self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn greater(self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn less(self) -> bool {
        self.0 & Self::LESS != 0
    }
}
