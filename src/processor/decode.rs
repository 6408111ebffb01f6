use crate::memory::Byte;

/// The shape of an instruction, read straight from the bits of its opcode:
///
/// ```text
/// 7 6 | 5   | 4      | 3 2 1 0
/// ops | alu | set pc | id
/// ```
///
/// Every byte decodes to something. Whether the identity is known is only
/// checked when the instruction is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoded {
    /// Number of operand bytes following the opcode
    pub operand_count: u8,
    pub is_alu: bool,
    /// The instruction moves the program counter itself
    pub sets_pc: bool,
    /// Low nibble of the opcode. Not unique across instructions, so
    /// dispatch uses the whole opcode byte.
    pub id: u8,
}

impl Decoded {
    pub const fn new(opcode: Byte) -> Self {
        Self {
            operand_count: (opcode & 0b1100_0000) >> 6,
            is_alu: opcode & 0b0010_0000 != 0,
            sets_pc: opcode & 0b0001_0000 != 0,
            id: opcode & 0b0000_1111,
        }
    }

    /// Size of the whole instruction in bytes
    pub const fn len(&self) -> usize {
        self.operand_count as usize + 1
    }
}

impl From<Byte> for Decoded {
    fn from(opcode: Byte) -> Self {
        Self::new(opcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::Instruction;

    #[test]
    fn test_decode_fields() {
        assert_eq!(
            Decoded::new(0b1010_0111),
            Decoded {
                operand_count: 2,
                is_alu: true,
                sets_pc: false,
                id: 0b0111,
            }
        );
        assert_eq!(
            Decoded::new(0b0101_0100),
            Decoded {
                operand_count: 1,
                is_alu: false,
                sets_pc: true,
                id: 0b0100,
            }
        );
        assert_eq!(Decoded::new(0xFF).operand_count, 3);
        assert_eq!(Decoded::new(0xFF).len(), 4);
    }

    #[test]
    fn test_instruction_shapes() {
        use Instruction::*;

        for instruction in Instruction::ALL {
            let decoded = Decoded::from(Byte::from(*instruction));

            let operands = match instruction {
                HLT | RET => 0,
                PRN | PUSH | POP | CALL | JMP | JEQ | JNE => 1,
                LDI | ADD | MUL | CMP => 2,
            };
            assert_eq!(decoded.operand_count, operands, "{}", instruction);
            assert_eq!(
                decoded.is_alu,
                matches!(instruction, ADD | MUL | CMP),
                "{}",
                instruction
            );
            assert_eq!(
                decoded.sets_pc,
                matches!(instruction, CALL | RET | JMP | JEQ | JNE),
                "{}",
                instruction
            );
        }
    }
}
