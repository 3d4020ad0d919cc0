use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{Result, WrapErr};

pub mod parse;

use parse::{ParseErrors, Parser};

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Number of addressable cells
pub const MEMORY_SIZE: usize = 0x10000;

/// Bytes printed per row of a memory dump
const DUMP_ROW_WIDTH: usize = 16;

/// Reduces any value to a valid address (modulo 65536)
pub fn wrap_address(value: u32) -> Word {
    (value & 0xFFFF) as Word
}

/// Emulates the flat byte memory of the processor
///
/// Addresses are [`Word`]s, so every access is already wrapped into range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Memory {
    /// The actual data of the memory
    pub data: [Byte; MEMORY_SIZE],
}

impl Default for Memory {
    /// Initializes the memory with zeroes
    fn default() -> Self {
        Memory {
            data: [0; MEMORY_SIZE],
        }
    }
}

impl Memory {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Byte {
        self.data[position as usize]
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) {
        self.data[position as usize] = value;
    }

    /// Reads a word from the memory (big endian, wrapping past the last cell)
    pub fn read_word(&self, position: Word) -> Word {
        (self.read_byte(position) as Word) << 8 | self.read_byte(position.wrapping_add(1)) as Word
    }

    /// Writes a word to the memory (big endian, wrapping past the last cell)
    pub fn write_word(&mut self, position: Word, value: Word) {
        self.write_byte(position, (value >> 8) as Byte);
        self.write_byte(position.wrapping_add(1), (value & 0xFF) as Byte);
    }

    /// Writes an array of bytes to consecutive cells starting at `position`
    pub fn write_array(&mut self, position: Word, data: &[Byte]) {
        let mut address = position;
        for byte in data {
            self.write_byte(address, *byte);
            address = address.wrapping_add(1);
        }
    }

    /// Loads a program text file into a fresh memory image
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read program `{}`", path.display()))?;

        data.parse::<Memory>()
            .wrap_err_with(|| format!("Failed to load program `{}`", path.display()))
    }

    /// Prints the whole memory as a hex grid, sixteen bytes per row
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (row, chunk) in self.data.chunks(DUMP_ROW_WIDTH).enumerate() {
            write!(out, "{:04X}: ", row * DUMP_ROW_WIDTH)?;
            for pair in chunk.chunks(2) {
                write!(out, "{:02X}{:02X} ", pair[0], pair[1])?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

impl FromStr for Memory {
    type Err = ParseErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s, Memory::default()).parse()
    }
}

/// Writes a block of raw bytes directly into the memory
#[macro_export]
macro_rules! write_program {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ]);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = Memory::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2), 0x12);

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = Memory::default();
        mem.write_byte(0x44, 12);
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut mem = Memory::default();
        mem.data[0] = 0x12;
        mem.data[1] = 0x34;
        assert_eq!(mem.read_word(0), 0x1234); // big endian

        Ok(())
    }

    #[test]
    fn test_write_word() -> Result<()> {
        let mut mem = Memory::default();
        mem.write_word(0x44, 0x1234);
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);

        Ok(())
    }

    #[test]
    fn test_word_wraps_at_end_of_memory() -> Result<()> {
        let mut mem = Memory::default();
        mem.write_word(0xFFFF, 0xABCD);
        assert_eq!(mem.data[0xFFFF], 0xAB);
        assert_eq!(mem.data[0x0000], 0xCD);
        assert_eq!(mem.read_word(0xFFFF), 0xABCD);

        Ok(())
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = Memory::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);
        assert_eq!(mem.data[0x46], 0x56);
        assert_eq!(mem.data[0x47], 0x78);

        mem.write_array(0xFFFE, &[0x01, 0x02, 0x03]);
        assert_eq!(mem.data[0xFFFE], 0x01);
        assert_eq!(mem.data[0xFFFF], 0x02);
        assert_eq!(mem.data[0x0000], 0x03);

        Ok(())
    }

    #[test]
    fn test_write_program() -> Result<()> {
        let mut mem = Memory::default();
        mem.write_array(0x1FFF, &[0x21, 0x00, 0x03, 0xFF]);

        let mut mem2 = Memory::default();
        write_program!(mem2 : 0x1FFF => 0x21, 0x00, 0x03, 0xFF);

        assert_eq!(mem, mem2);

        Ok(())
    }

    #[test]
    fn test_wrap_address_is_idempotent() -> Result<()> {
        for value in [0, 1, 0xFFFF, 0x10000, 0x10003, 0x1FFFF, 0xDEAD_BEEF, u32::MAX] {
            let once = wrap_address(value);
            assert_eq!(wrap_address(once as u32), once);
        }
        assert_eq!(wrap_address(0x10003), 0x0003);

        Ok(())
    }

    #[test]
    fn test_dump() -> Result<()> {
        let mut mem = Memory::default();
        write_program!(mem : 0x0000 => 0x21, 0x00, 0x03, 0xFF, 0x00, 0x05);
        mem.write_byte(0xFFFF, 0xEE);

        let mut out = Vec::new();
        mem.dump(&mut out)?;
        let text = String::from_utf8(out)?;
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4096);
        assert_eq!(
            lines[0],
            "0000: 2100 03FF 0005 0000 0000 0000 0000 0000 "
        );
        assert_eq!(
            lines[4095],
            "FFF0: 0000 0000 0000 0000 0000 0000 0000 00EE "
        );

        Ok(())
    }
}
