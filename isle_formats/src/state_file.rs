use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

/// Strings are stored as a little-endian `u16` length followed by raw bytes.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("state file truncated while reading {what} at offset {offset}")]
    Truncated { what: &'static str, offset: u64 },
    #[error("state file opened for {actual:?} but a {expected:?} operation was requested")]
    WrongMode { expected: FileMode, actual: FileMode },
    #[error("string of {0} bytes does not fit a u16 length prefix")]
    StringTooLong(usize),
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidString { offset: u64 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// In-memory record stream shared by the save and load paths.
///
/// A single `serialize_*` call either reads into or writes from the given
/// field depending on the direction the file was opened with, so one routine
/// describes both halves of the on-disk layout and they can never drift apart.
#[derive(Debug)]
pub struct StateFile {
    mode: FileMode,
    cursor: Cursor<Vec<u8>>,
}

macro_rules! scalar_codec {
    ($read:ident, $write:ident, $serialize:ident, $ty:ty, $what:literal, $read_call:ident, $write_call:ident) => {
        pub fn $read(&mut self) -> Result<$ty, FormatError> {
            self.expect_mode(FileMode::Read)?;
            let offset = self.cursor.position();
            self.cursor
                .$read_call::<LittleEndian>()
                .map_err(|err| truncated(err, $what, offset))
        }

        pub fn $write(&mut self, value: $ty) -> Result<(), FormatError> {
            self.expect_mode(FileMode::Write)?;
            self.cursor.$write_call::<LittleEndian>(value)?;
            Ok(())
        }

        pub fn $serialize(&mut self, value: &mut $ty) -> Result<(), FormatError> {
            match self.mode {
                FileMode::Read => *value = self.$read()?,
                FileMode::Write => self.$write(*value)?,
            }
            Ok(())
        }
    };
}

impl StateFile {
    pub fn writer() -> Self {
        StateFile {
            mode: FileMode::Write,
            cursor: Cursor::new(Vec::new()),
        }
    }

    pub fn reader(bytes: Vec<u8>) -> Self {
        StateFile {
            mode: FileMode::Read,
            cursor: Cursor::new(bytes),
        }
    }

    /// Load a save file from disk in read mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("reading state file {}", path.display()))?;
        Ok(Self::reader(bytes))
    }

    /// Flush everything written so far to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating save directory {}", parent.display()))?;
            }
        }
        fs::write(path, self.cursor.get_ref())
            .with_context(|| format!("writing state file {}", path.display()))
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn is_read_mode(&self) -> bool {
        self.mode == FileMode::Read
    }

    pub fn is_write_mode(&self) -> bool {
        self.mode == FileMode::Write
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    scalar_codec!(read_u16, write_u16, serialize_u16, u16, "u16", read_u16, write_u16);
    scalar_codec!(read_i16, write_i16, serialize_i16, i16, "i16", read_i16, write_i16);
    scalar_codec!(read_u32, write_u32, serialize_u32, u32, "u32", read_u32, write_u32);
    scalar_codec!(read_i32, write_i32, serialize_i32, i32, "i32", read_i32, write_i32);
    scalar_codec!(read_f32, write_f32, serialize_f32, f32, "f32", read_f32, write_f32);

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        self.expect_mode(FileMode::Read)?;
        let offset = self.cursor.position();
        self.cursor
            .read_u8()
            .map_err(|err| truncated(err, "u8", offset))
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), FormatError> {
        self.expect_mode(FileMode::Write)?;
        self.cursor.write_u8(value)?;
        Ok(())
    }

    pub fn serialize_u8(&mut self, value: &mut u8) -> Result<(), FormatError> {
        match self.mode {
            FileMode::Read => *value = self.read_u8()?,
            FileMode::Write => self.write_u8(*value)?,
        }
        Ok(())
    }

    pub fn read_string(&mut self) -> Result<String, FormatError> {
        let len = self.read_u16()? as usize;
        let offset = self.cursor.position();
        let mut bytes = vec![0u8; len];
        self.cursor
            .read_exact(&mut bytes)
            .map_err(|err| truncated(err, "string body", offset))?;
        String::from_utf8(bytes).map_err(|_| FormatError::InvalidString { offset })
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), FormatError> {
        let bytes = value.as_bytes();
        if bytes.len() > MAX_STRING_LEN {
            return Err(FormatError::StringTooLong(bytes.len()));
        }
        self.write_u16(bytes.len() as u16)?;
        self.cursor.write_all(bytes)?;
        Ok(())
    }

    pub fn serialize_string(&mut self, value: &mut String) -> Result<(), FormatError> {
        match self.mode {
            FileMode::Read => *value = self.read_string()?,
            FileMode::Write => self.write_string(value)?,
        }
        Ok(())
    }

    fn expect_mode(&self, expected: FileMode) -> Result<(), FormatError> {
        if self.mode != expected {
            return Err(FormatError::WrongMode {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }
}

fn truncated(err: io::Error, what: &'static str, offset: u64) -> FormatError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::Truncated { what, offset }
    } else {
        FormatError::Io(err)
    }
}
