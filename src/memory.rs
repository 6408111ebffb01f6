use std::fs;
use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::fault::FaultKind;

pub mod parse;

pub type Byte = u8; // 1 byte

/// Number of addressable cells of the machine
pub const MEMORY_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: usize) -> Result<Byte, FaultKind> {
        self.data
            .get(position)
            .copied()
            .ok_or(FaultKind::MemoryOutOfBounds {
                address: position as isize,
            })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: usize, value: Byte) -> Result<(), FaultKind> {
        let cell = self
            .data
            .get_mut(position)
            .ok_or(FaultKind::MemoryOutOfBounds {
                address: position as isize,
            })?;
        *cell = value;

        Ok(())
    }

    /// Writes an array of bytes to the memory. Nothing is written if the
    /// array does not fit.
    pub fn write_array(&mut self, position: usize, data: &[Byte]) -> Result<(), FaultKind> {
        let end = position + data.len();
        if end > S {
            return Err(FaultKind::MemoryOutOfBounds {
                address: position.max(S) as isize,
            });
        }

        self.data[position..end].copy_from_slice(data);
        Ok(())
    }

    /// Loads a program image from `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read program image `{}`", path.display()))?;

        Self::from_str(&data).map_err(|errors| {
            let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
            eyre!(
                "Program image `{}` is malformed:\n{}",
                path.display(),
                lines.join("\n")
            )
        })
    }

    /// Logs a hex dump of the memory, 16 bytes per row
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            let bytes: Vec<String> = chunk.iter().map(|byte| format!("{:02X}", byte)).collect();
            log::debug!("{:02X}: {}", row * 16, bytes.join(" "));
        }
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = Vec<parse::ParseError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::Parser::new(s, Self::default()).parse()
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2)?, 0x12);

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0x44, 12)?;
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_out_of_bounds() -> Result<()> {
        let mut mem = StdMem::default();

        assert_eq!(
            mem.read_byte(256),
            Err(FaultKind::MemoryOutOfBounds { address: 256 })
        );
        assert_eq!(
            mem.write_byte(300, 1),
            Err(FaultKind::MemoryOutOfBounds { address: 300 })
        );
        assert_eq!(mem, StdMem::default());

        Ok(())
    }

    #[test]
    fn test_small_memory_bounds() -> Result<()> {
        let mut mem = Memory::<16>::default();
        mem.write_byte(15, 7)?;

        assert_eq!(mem.read_byte(15)?, 7);
        assert_eq!(
            mem.read_byte(16),
            Err(FaultKind::MemoryOutOfBounds { address: 16 })
        );

        Ok(())
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78])?;
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);
        assert_eq!(mem.data[0x46], 0x56);
        assert_eq!(mem.data[0x47], 0x78);

        Ok(())
    }

    #[test]
    fn test_write_array_past_end() -> Result<()> {
        let mut mem = StdMem::default();

        assert_eq!(
            mem.write_array(0xFE, &[1, 2, 3]),
            Err(FaultKind::MemoryOutOfBounds { address: 256 })
        );
        assert_eq!(mem, StdMem::default());

        Ok(())
    }

    #[test]
    fn test_write_instructions() -> Result<()> {
        let mut mem = StdMem::default();

        mem.write_array(
            0x10,
            &[
                Instruction::LDI as Byte,
                0,
                42,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ],
        )?;

        let mut mem2 = StdMem::default();
        use crate::processor::Instruction::*;
        write_instructions!(mem2 : 0x10 => LDI, 0, 42, PRN, 0, HLT)?;

        assert_eq!(mem, mem2);

        Ok(())
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("cpu8-from-file-{}.ls8", std::process::id()));
        fs::write(&path, "10000010 # LDI R0,8\n00000000\n00001000\n\n00000001\n")?;

        let mem = StdMem::from_file(&path);
        fs::remove_file(&path)?;
        let mem = mem?;

        assert_eq!(&mem.data[0..4], &[0x82, 0x00, 0x08, 0x01]);

        Ok(())
    }

    #[test]
    fn test_from_missing_file() {
        assert!(StdMem::from_file("does/not/exist.ls8").is_err());
    }
}
