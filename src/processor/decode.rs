use crate::memory::{wrap_address, Byte, Memory, Word};

use super::registers::Register;
use super::wires::{ControlWires, Wire};

/// Length of an instruction in bytes
pub const INSTRUCTION_SIZE: Word = 3;

/// Stops the processor
pub const OP_HALT: Byte = 0xFF;
/// Unconditional jump
pub const OP_JUMP: Byte = 0xFE;
/// Unconditional jump, second encoding
pub const OP_JUMP_ALT: Byte = 0xF4;
/// Jump when the last latched result was zero
pub const OP_JUMP_ZERO: Byte = 0xF0;
/// Jump when the last latched result was positive
pub const OP_JUMP_POSITIVE: Byte = 0xF1;

/// High nibble reserved for control flow, it disables the low nibble fields
const CONTROL_GROUP: Byte = 0xF;
/// `p` field value of the control group
const P_NONE: Byte = 4;

/// A raw instruction word as it sits in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Byte,
    pub high: Byte,
    pub low: Byte,
}

impl Instruction {
    /// Reads the three instruction bytes at `ip`, wrapping at the end of memory
    pub fn fetch(memory: &Memory, ip: Word) -> Self {
        Self {
            opcode: memory.read_byte(ip),
            high: memory.read_byte(ip.wrapping_add(1)),
            low: memory.read_byte(ip.wrapping_add(2)),
        }
    }

    /// The address the instruction operates on.
    ///
    /// SI's high byte is added to the high address byte before the shift and
    /// its low byte to the low address byte after it.
    pub fn operand_address(&self, si: Register) -> Word {
        let high = self.high as u32 + si.high as u32;
        let low = self.low as u32 + si.low as u32;
        wrap_address((high << 8) + low)
    }
}

/// Opcode fields extracted by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoded {
    pub opcode: Byte,
    /// ALU function requested by the opcode (high nibble)
    pub function: Byte,
    /// Operand mode bit
    pub i: Byte,
    /// Destination field
    pub p: Byte,
}

impl Decoded {
    /// ALU selector, forced to zero when the selection wire is cut
    pub fn selector(&self, wires: &ControlWires) -> Byte {
        if wires.effective(Wire::AluSelect) {
            self.function
        } else {
            0
        }
    }
}

/// Decodes `opcode` and drives wires 0 to 7.
///
/// The result flags (wires 8 and 9) are only read here, they keep the value
/// latched by the previous cycle.
pub fn decode(opcode: Byte, wires: &mut ControlWires) -> Decoded {
    let function = opcode >> 4;
    let low = opcode & 0x0F;

    let (i, p) = if function == CONTROL_GROUP {
        (0, P_NONE)
    } else {
        ((low & 0b0100) >> 2, low & 0b11)
    };

    let jump = opcode == OP_JUMP
        || (opcode == OP_JUMP_ZERO && wires.effective(Wire::Zero))
        || opcode == OP_JUMP_ALT
        || (opcode == OP_JUMP_POSITIVE && wires.effective(Wire::Positive));

    wires.set(Wire::Run, opcode != OP_HALT);
    wires.set(Wire::LatchAx, p == 1);
    wires.set(Wire::LatchSi, true);
    wires.set(Wire::ClearSi, p != 2);
    wires.set(Wire::Immediate, i == 1);
    wires.set(Wire::WriteBack, p == 0);
    wires.set(Wire::AluSelect, true);
    wires.set(Wire::Jump, jump);

    Decoded {
        opcode,
        function,
        i,
        p,
    }
}
