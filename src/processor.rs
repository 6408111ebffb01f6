use std::convert::TryFrom;

use crate::fault::{Fault, FaultKind};
use crate::memory::{Byte, Memory};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

pub mod alu;
pub mod decode;
pub mod observer;
pub mod registers;

use alu::AluOp;
use decode::Decoded;
use observer::{Observer, Trace};
use registers::{Flags, Registers};

/// Execution state. `Halted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    Halted,
}

/// Emulates a CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    pub registers: Registers,
    pub flags: Flags,
    pub state: State,
    /// Makes `JMP` (and taken `JEQ`/`JNE` branches) push a return address
    /// the way `CALL` does. Only needed to reproduce traces of programs
    /// written against that behaviour.
    pub legacy_jump: bool,
}

impl Default for Processor {
    /// Initializes a new CPU
    fn default() -> Self {
        Self::new()
    }
}

impl Processor {
    /// Initializes a new CPU with `PC = 0` and an empty stack
    pub fn new() -> Self {
        Self {
            registers: Registers::default(),
            flags: Flags::default(),
            state: State::Running,
            legacy_jump: false,
        }
    }

    pub fn with_legacy_jump(mut self, legacy_jump: bool) -> Self {
        self.legacy_jump = legacy_jump;
        self
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Runs one execution step and reports the state afterwards. Does
    /// nothing once the processor has halted.
    pub fn execute<O, const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
        observer: &mut O,
    ) -> Result<State, Fault>
    where
        O: Observer + ?Sized,
    {
        if self.is_halted() {
            return Ok(State::Halted);
        }

        let pc = self.registers.pc();
        let opcode = memory
            .read_byte(pc as usize)
            .map_err(|kind| Fault::new(kind, pc, None))?;
        self.execute_opcode(opcode, memory, observer)
            .map_err(|kind| Fault::new(kind, pc, Some(opcode)))?;

        if !self.is_halted() {
            observer.trace(&Trace::capture(&self.registers, memory));
        }

        Ok(self.state)
    }

    /// Run program until it halts or faults
    pub fn run<O, const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
        observer: &mut O,
    ) -> Result<(), Fault>
    where
        O: Observer + ?Sized,
    {
        while !self.is_halted() {
            self.execute(memory, observer)?;
        }

        Ok(())
    }

    fn execute_opcode<O, const S: usize>(
        &mut self,
        opcode: Byte,
        memory: &mut Memory<S>,
        observer: &mut O,
    ) -> Result<(), FaultKind>
    where
        O: Observer + ?Sized,
    {
        if opcode == Byte::from(Instruction::HLT) {
            self.state = State::Halted;
            info!("HLT: program complete");

            return Ok(());
        }

        let decoded = Decoded::new(opcode);
        let pc = self.registers.pc() as usize;

        let mut operands = [0; 3];
        for (offset, operand) in operands
            .iter_mut()
            .take(decoded.operand_count as usize)
            .enumerate()
        {
            *operand = memory.read_byte(pc + 1 + offset)?;
        }
        let [a, b, _] = operands;
        let next = pc + decoded.len();

        let instruction = Instruction::try_from(opcode).ok();
        trace!(
            "[0x{:02X}] {} (id 0b{:04b}, {} operand(s))",
            pc,
            instruction.map_or("???", |instruction| instruction.name()),
            decoded.id,
            decoded.operand_count
        );

        if decoded.is_alu {
            let op = instruction
                .and_then(AluOp::from_instruction)
                .ok_or(FaultKind::UnsupportedOperation)?;
            alu::execute(op, a, b, &mut self.registers, &mut self.flags)?;
        } else {
            let instruction = instruction.ok_or(FaultKind::UnknownOpcode)?;
            self.execute_instruction(instruction, a, b, next, memory, observer)?;
        }

        // the handler may have written the PC register, advance from there
        if !decoded.sets_pc {
            let pc = self.registers.pc() as usize + decoded.len();
            self.registers.set_pc(address(pc)?);
        }

        Ok(())
    }

    /// Executes a non-ALU instruction. `next` is the address of the
    /// instruction that follows it in memory.
    fn execute_instruction<O, const S: usize>(
        &mut self,
        instruction: Instruction,
        a: Byte,
        b: Byte,
        next: usize,
        memory: &mut Memory<S>,
        observer: &mut O,
    ) -> Result<(), FaultKind>
    where
        O: Observer + ?Sized,
    {
        match instruction {
            Instruction::LDI => {
                self.registers.set(a, b)?;

                debug!("LDI r{} {}", a, b);
            }
            Instruction::PRN => {
                let value = self.registers.get(a)?;
                observer.print(value);

                debug!("PRN r{}: {}", a, value);
            }
            Instruction::PUSH => {
                let sp = self.decrement_sp()?;
                let value = self.registers.get(a)?;
                memory.write_byte(sp as usize, value)?;

                debug!("PUSH r{}: {} -> [0x{:02X}]", a, value, sp);
            }
            Instruction::POP => {
                let sp = self.registers.sp();
                let value = memory.read_byte(sp as usize)?;
                self.registers.set(a, value)?;
                self.increment_sp()?;

                debug!("POP r{}: [0x{:02X}] -> {}", a, sp, value);
            }
            Instruction::CALL => {
                let return_address = address(next)?;
                self.push(return_address, memory)?;
                let target = self.registers.get(a)?;
                self.registers.set_pc(target);

                debug!(
                    "CALL r{}: 0x{:02X}, returns to 0x{:02X}",
                    a, target, return_address
                );
            }
            Instruction::RET => {
                let return_address = self.pop(memory)?;
                self.registers.set_pc(return_address);

                debug!("RET 0x{:02X}", return_address);
            }
            Instruction::JMP => self.jump(a, next, memory)?,
            Instruction::JEQ => {
                if self.flags.equal() {
                    self.jump(a, next, memory)?;
                } else {
                    self.registers.set_pc(address(next)?);

                    debug!("JEQ r{}: not taken", a);
                }
            }
            Instruction::JNE => {
                if !self.flags.equal() {
                    self.jump(a, next, memory)?;
                } else {
                    self.registers.set_pc(address(next)?);

                    debug!("JNE r{}: not taken", a);
                }
            }
            // halting happens before decoding and ALU opcodes never get here
            Instruction::HLT | Instruction::ADD | Instruction::MUL | Instruction::CMP => {
                return Err(FaultKind::UnknownOpcode)
            }
        }

        Ok(())
    }

    /// Sets the program counter to the value of register `reg`
    fn jump<const S: usize>(
        &mut self,
        reg: Byte,
        next: usize,
        memory: &mut Memory<S>,
    ) -> Result<(), FaultKind> {
        if self.legacy_jump {
            self.push(address(next)?, memory)?;
        }

        let target = self.registers.get(reg)?;
        self.registers.set_pc(target);

        debug!("JUMP r{}: 0x{:02X}", reg, target);

        Ok(())
    }

    fn push<const S: usize>(
        &mut self,
        value: Byte,
        memory: &mut Memory<S>,
    ) -> Result<(), FaultKind> {
        let sp = self.decrement_sp()?;
        memory.write_byte(sp as usize, value)
    }

    fn pop<const S: usize>(&mut self, memory: &Memory<S>) -> Result<Byte, FaultKind> {
        let value = memory.read_byte(self.registers.sp() as usize)?;
        self.increment_sp()?;

        Ok(value)
    }

    fn decrement_sp(&mut self) -> Result<Byte, FaultKind> {
        let sp = self
            .registers
            .sp()
            .checked_sub(1)
            .ok_or(FaultKind::MemoryOutOfBounds { address: -1 })?;
        self.registers.set_sp(sp);

        Ok(sp)
    }

    fn increment_sp(&mut self) -> Result<Byte, FaultKind> {
        let sp = address(self.registers.sp() as usize + 1)?;
        self.registers.set_sp(sp);

        Ok(sp)
    }
}

/// Narrows a computed address to a register value
fn address(position: usize) -> Result<Byte, FaultKind> {
    Byte::try_from(position).map_err(|_| FaultKind::MemoryOutOfBounds {
        address: position as isize,
    })
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instructions. The bits of each opcode describe its
        /// shape, see [`Decoded`].
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $( Self::$name => f.write_str(stringify!($name)) , )+
                }
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001,
    /// Load an immediate value into a register
    /// @param reg, value
    LDI = 0b1000_0010,
    /// Print the value of a register
    /// @param reg
    PRN = 0b0100_0111,
    /// Push the value of a register onto the stack
    /// @param reg
    PUSH = 0b0100_0101,
    /// Pop the top of the stack into a register
    /// @param reg
    POP = 0b0100_0110,
    /// Push the return address and jump to the address held in a register
    /// @param reg
    CALL = 0b0101_0000,
    /// Pop the return address into the program counter
    RET = 0b0001_0001,
    /// Jump to the address held in a register
    /// @param reg
    JMP = 0b0101_0100,
    /// Jump if the last compare was equal
    /// @param reg
    JEQ = 0b0101_0101,
    /// Jump if the last compare was not equal
    /// @param reg
    JNE = 0b0101_0110,
    /// `reg_a = reg_a + reg_b`
    /// @param reg_a, reg_b
    ADD = 0b1010_0000,
    /// `reg_a = reg_a * reg_b`
    /// @param reg_a, reg_b
    MUL = 0b1010_0010,
    /// Compare two registers and set the flags
    /// @param reg_a, reg_b
    CMP = 0b1010_0111,
}
