use log::*;

use super::registers::{Flags, Registers};
use super::Instruction;
use crate::fault::FaultKind;
use crate::memory::Byte;

/// Operations carried out by the arithmetic-logic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Mul,
    Cmp,
}

impl AluOp {
    pub fn from_instruction(instruction: Instruction) -> Option<Self> {
        match instruction {
            Instruction::ADD => Some(Self::Add),
            Instruction::MUL => Some(Self::Mul),
            Instruction::CMP => Some(Self::Cmp),
            _ => None,
        }
    }
}

/// Applies `op` to the registers `reg_a` and `reg_b`. Add and multiply write
/// their result to `reg_a` and wrap around on overflow; compare only touches
/// `flags`.
pub fn execute(
    op: AluOp,
    reg_a: Byte,
    reg_b: Byte,
    registers: &mut Registers,
    flags: &mut Flags,
) -> Result<(), FaultKind> {
    let a = registers.get(reg_a)?;
    let b = registers.get(reg_b)?;

    match op {
        AluOp::Add => {
            let result = a.wrapping_add(b);
            registers.set(reg_a, result)?;

            debug!("ADD r{} r{}: {} + {} = {}", reg_a, reg_b, a, b, result);
        }
        AluOp::Mul => {
            let result = a.wrapping_mul(b);
            registers.set(reg_a, result)?;

            debug!("MUL r{} r{}: {} * {} = {}", reg_a, reg_b, a, b, result);
        }
        AluOp::Cmp => {
            *flags = Flags::from_ordering(a.cmp(&b));

            debug!("CMP r{} r{}: {} vs {} -> 0b{:03b}", reg_a, reg_b, a, b, flags.bits());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    fn registers_with(a: Byte, b: Byte) -> Result<Registers> {
        let mut registers = Registers::default();
        registers.set(0, a)?;
        registers.set(1, b)?;

        Ok(registers)
    }

    #[test]
    fn test_add() -> Result<()> {
        let mut registers = registers_with(8, 9)?;
        let mut flags = Flags::default();

        execute(AluOp::Add, 0, 1, &mut registers, &mut flags)?;

        assert_eq!(registers.get(0)?, 17);
        assert_eq!(registers.get(1)?, 9);
        assert_eq!(flags, Flags::default());

        Ok(())
    }

    #[test]
    fn test_mul_wraps() -> Result<()> {
        let mut registers = registers_with(20, 13)?;
        let mut flags = Flags::default();

        execute(AluOp::Mul, 0, 1, &mut registers, &mut flags)?;

        assert_eq!(registers.get(0)?, (20u16 * 13 % 256) as Byte);
        assert_eq!(registers.get(1)?, 13);

        Ok(())
    }

    #[test]
    fn test_add_same_register() -> Result<()> {
        let mut registers = registers_with(21, 0)?;
        let mut flags = Flags::default();

        execute(AluOp::Add, 0, 0, &mut registers, &mut flags)?;

        assert_eq!(registers.get(0)?, 42);

        Ok(())
    }

    #[test]
    fn test_cmp() -> Result<()> {
        let mut flags = Flags::default();

        let mut registers = registers_with(3, 5)?;
        execute(AluOp::Cmp, 0, 1, &mut registers, &mut flags)?;
        assert!(flags.less() && !flags.greater() && !flags.equal());

        let mut registers = registers_with(200, 5)?;
        execute(AluOp::Cmp, 0, 1, &mut registers, &mut flags)?;
        assert_eq!(flags.bits(), Flags::GREATER);

        let mut registers = registers_with(7, 7)?;
        execute(AluOp::Cmp, 0, 1, &mut registers, &mut flags)?;
        assert_eq!(flags.bits(), Flags::EQUAL);
        assert_eq!(registers, registers_with(7, 7)?);

        Ok(())
    }

    #[test]
    fn test_invalid_register() -> Result<()> {
        let mut registers = registers_with(1, 2)?;
        let mut flags = Flags::default();

        assert_eq!(
            execute(AluOp::Add, 0, 9, &mut registers, &mut flags),
            Err(FaultKind::RegisterOutOfBounds { index: 9 })
        );
        assert_eq!(registers.get(0)?, 1);

        Ok(())
    }

    #[test]
    fn test_from_instruction() {
        assert_eq!(AluOp::from_instruction(Instruction::CMP), Some(AluOp::Cmp));
        assert_eq!(AluOp::from_instruction(Instruction::LDI), None);
    }
}
