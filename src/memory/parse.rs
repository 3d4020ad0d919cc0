//! Program text loader.
//!
//! ```text
//! ; load 10 into AX, store it at 0x0020, halt
//! 15000A
//! 00 0020
//! FF
//! ```

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use super::{Byte, Memory, MEMORY_SIZE};

/// Starts a comment running to the end of the line
const COMMENT: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    OddLength,
    InvalidHex,
    ProgramTooLarge,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::OddLength => f.write_str("incorrect sequence of codes"),
            ParseErrorKind::InvalidHex => f.write_str("invalid hex digits"),
            ParseErrorKind::ProgramTooLarge => {
                write!(f, "program does not fit into {} bytes", MEMORY_SIZE)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

/// Every error found while loading a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, err) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl error::Error for ParseErrors {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    offset: usize,
    memory: Memory,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data` which will populate `memory` from
    /// address zero.
    pub fn new(data: &'a str, memory: Memory) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            offset: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all `self.data` into memory.
    ///
    /// # Errors
    ///
    /// Malformed tokens are collected and returned at the end. A program
    /// that overflows the memory stops the parse immediately.
    pub fn parse(mut self) -> Result<Memory, ParseErrors> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                let fatal = err.kind == ParseErrorKind::ProgramTooLarge;
                errors.push(err);
                if fatal {
                    break;
                }
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.offset);
            Ok(self.memory)
        } else {
            Err(ParseErrors(errors))
        }
    }

    /// Tries to parse the next line of [`Parser::lines`]. Everything after
    /// the comment marker is ignored.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let code = match line.split_once(COMMENT) {
            Some((code, _)) => code,
            None => line,
        };

        for token in code.split_whitespace() {
            if let Err(err) = self.parse_token(token) {
                return Some(Err(err));
            }
        }

        Some(Ok(()))
    }

    /// Tries to parse a token as a sequence of hex digit pairs and writes
    /// them to memory.
    ///
    /// # Examples
    ///
    /// - `FF`
    /// - `21000A`
    fn parse_token(&mut self, token: &str) -> Result<()> {
        if token.len() % 2 != 0 {
            return Err(ParseError::new(
                ParseErrorKind::OddLength,
                format!("`{}`", token),
                self.line_nr,
            ));
        }

        let mut bytes = Vec::with_capacity(token.len() / 2);
        for pair in token.as_bytes().chunks(2) {
            bytes.push(self.parse_pair(pair, token)?);
        }

        log::trace!("[{}] Found token `{}`", self.line_nr, token);

        for byte in bytes {
            self.write_byte(byte, token)?;
        }

        Ok(())
    }

    fn parse_pair(&self, pair: &[u8], token: &str) -> Result<Byte> {
        let invalid = || {
            ParseError::new(
                ParseErrorKind::InvalidHex,
                format!("`{}`", token),
                self.line_nr,
            )
        };

        if !pair.iter().all(u8::is_ascii_hexdigit) {
            return Err(invalid());
        }

        let digits = std::str::from_utf8(pair).map_err(|_| invalid())?;
        Byte::from_str_radix(digits, 16).map_err(|_| invalid())
    }

    /// Writes `byte` into memory at [self.offset](`Parser::offset`). Then it
    /// increments the offset by one.
    ///
    /// # Errors
    ///
    /// This will return an error naming `token` if the memory is already full.
    fn write_byte(&mut self, byte: Byte, token: &str) -> Result<()> {
        if self.offset >= MEMORY_SIZE {
            return Err(ParseError::new(
                ParseErrorKind::ProgramTooLarge,
                format!("`{}`", token),
                self.line_nr,
            ));
        }

        self.memory.data[self.offset] = byte;
        self.offset += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_comment_and_lines() -> Result<()> {
        let mem = Memory::from_str("AB CD ; comment\n01")?;

        assert_eq!(mem.read_byte(0), 0xAB);
        assert_eq!(mem.read_byte(1), 0xCD);
        assert_eq!(mem.read_byte(2), 0x01);

        let mut expected = Memory::default();
        expected.write_array(0, &[0xAB, 0xCD, 0x01]);
        assert_eq!(mem, expected);

        Ok(())
    }

    #[test]
    fn parse_multi_byte_tokens() -> Result<()> {
        let data = r#"
            ; add the word at 0x0003
            210003   ; add
            FF 0005  ; halt, data

            ; trailing comment only
        "#;

        let mem = Memory::from_str(data)?;

        assert_eq!(mem.read_byte(0), 0x21);
        assert_eq!(mem.read_byte(1), 0x00);
        assert_eq!(mem.read_byte(2), 0x03);
        assert_eq!(mem.read_byte(3), 0xFF);
        assert_eq!(mem.read_byte(4), 0x00);
        assert_eq!(mem.read_byte(5), 0x05);
        assert_eq!(mem.read_byte(6), 0x00);

        Ok(())
    }

    #[test]
    fn parse_lower_case_hex() -> Result<()> {
        let mem = Memory::from_str("fe0a bc")?;

        assert_eq!(mem.read_word(0), 0xFE0A);
        assert_eq!(mem.read_byte(2), 0xBC);

        Ok(())
    }

    #[test]
    fn parse_odd_length_token() -> Result<()> {
        let errors = Memory::from_str("AB\nCD 123 EF").unwrap_err();

        assert_eq!(errors.0.len(), 1);
        let err = &errors.0[0];
        assert_eq!(err.kind(), ParseErrorKind::OddLength);
        assert_eq!(err.line_nr(), 2);
        assert_eq!(
            err.to_string(),
            "error [ln: 2]: incorrect sequence of codes - `123`"
        );

        Ok(())
    }

    #[test]
    fn parse_collects_errors_from_every_line() -> Result<()> {
        let errors = Memory::from_str("ABC\nFF\nXY\n").unwrap_err();

        let found: Vec<(ParseErrorKind, usize)> =
            errors.iter().map(|err| (err.kind(), err.line_nr())).collect();
        assert_eq!(
            found,
            vec![
                (ParseErrorKind::OddLength, 1),
                (ParseErrorKind::InvalidHex, 3)
            ]
        );

        Ok(())
    }

    #[test]
    fn parse_rejects_signs() -> Result<()> {
        let errors = Memory::from_str("+1").unwrap_err();
        assert_eq!(errors.0[0].kind(), ParseErrorKind::InvalidHex);

        Ok(())
    }

    #[test]
    fn parse_full_memory() -> Result<()> {
        let line = "00".repeat(MEMORY_SIZE - 1);
        let data = format!("{}\n7F", line);

        let mem = Memory::from_str(&data)?;
        assert_eq!(mem.read_byte(0xFFFF), 0x7F);

        Ok(())
    }

    #[test]
    fn parse_program_too_large() -> Result<()> {
        let line = "01".repeat(MEMORY_SIZE);
        let data = format!("{}\n02AB\n0", line);

        let errors = Memory::from_str(&data).unwrap_err();

        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].kind(), ParseErrorKind::ProgramTooLarge);
        assert_eq!(errors.0[0].line_nr(), 2);
        assert_eq!(
            errors.0[0].to_string(),
            "error [ln: 2]: program does not fit into 65536 bytes - `02AB`"
        );

        Ok(())
    }
}
