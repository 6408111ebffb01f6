use std::fmt;

use log::*;

use super::registers::{Registers, REGISTER_COUNT};
use crate::memory::{Byte, Memory};

/// Receives everything a program makes visible to the outside. Observers
/// never influence execution.
pub trait Observer {
    /// Called by `PRN` with the printed register value
    fn print(&mut self, value: Byte);

    /// Called after every executed instruction that did not halt
    fn trace(&mut self, _trace: &Trace) {}
}

/// Snapshot of the machine after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trace {
    pub pc: Byte,
    /// The byte at `pc` and the two after it, `None` past the end of memory
    pub bytes: [Option<Byte>; 3],
    pub registers: [Byte; REGISTER_COUNT],
}

impl Trace {
    pub fn capture<const S: usize>(registers: &Registers, memory: &Memory<S>) -> Self {
        let pc = registers.pc();
        let mut bytes = [None; 3];
        for (offset, byte) in bytes.iter_mut().enumerate() {
            *byte = memory.read_byte(pc as usize + offset).ok();
        }

        Self {
            pc,
            bytes,
            registers: *registers.slots(),
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRACE: {:02X} |", self.pc)?;
        for byte in self.bytes.iter() {
            match byte {
                Some(byte) => write!(f, " {:02X}", byte)?,
                None => f.write_str(" --")?,
            }
        }
        f.write_str(" |")?;
        for register in self.registers.iter() {
            write!(f, " {:02X}", register)?;
        }

        Ok(())
    }
}

/// Forwards prints and traces to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn print(&mut self, value: Byte) {
        info!("{}", value);
    }

    fn trace(&mut self, trace: &Trace) {
        trace!("{}", trace);
    }
}

/// Keeps everything it observes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorder {
    pub printed: Vec<Byte>,
    pub traces: Vec<Trace>,
}

impl Observer for Recorder {
    fn print(&mut self, value: Byte) {
        self.printed.push(value);
    }

    fn trace(&mut self, trace: &Trace) {
        self.traces.push(*trace);
    }
}
