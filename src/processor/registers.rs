use std::io::{self, Write};

use crate::memory::{Byte, Word};

/// A 16 bit register built from two 8 bit halves
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    pub high: Byte,
    pub low: Byte,
}

impl Register {
    pub fn value(&self) -> Word {
        (self.high as Word) << 8 | self.low as Word
    }

    pub fn set(&mut self, value: Word) {
        self.high = (value >> 8) as Byte;
        self.low = (value & 0xFF) as Byte;
    }
}

impl From<Word> for Register {
    fn from(value: Word) -> Self {
        let mut register = Register::default();
        register.set(value);
        register
    }
}

/// Register file of the processor
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    /// Accumulator
    pub ax: Register,
    /// Index register, offsets every operand address
    pub si: Register,
    /// Instruction pointer
    pub ip: Word,
}

impl Registers {
    /// Prints the registers as four digit hex values
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "    ip : {:04X}", self.ip)?;
        writeln!(out, "    ax : {:04X}", self.ax.value())?;
        writeln!(out, "    si : {:04X}", self.si.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_register_halves() -> Result<()> {
        let mut reg = Register::default();
        reg.set(0xBEEF);

        assert_eq!(reg.high, 0xBE);
        assert_eq!(reg.low, 0xEF);
        assert_eq!(reg.value(), 0xBEEF);
        assert_eq!(Register::from(0x0102), Register { high: 1, low: 2 });

        Ok(())
    }

    #[test]
    fn test_dump() -> Result<()> {
        let regs = Registers {
            ax: Register::from(0x0005),
            si: Register::from(0xABCD),
            ip: 0x0003,
        };

        let mut out = Vec::new();
        regs.dump(&mut out)?;

        assert_eq!(
            String::from_utf8(out)?,
            "\n    ip : 0003\n    ax : 0005\n    si : ABCD\n"
        );

        Ok(())
    }
}
