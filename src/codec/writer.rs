//! Byte sinks for serialization

use super::HASH_SIZE;
use std::io::{self, Write};

/// Number of bytes a compact size takes on the wire
pub fn compact_size_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// A little-endian byte sink
///
/// Writes never return errors; a failing sink records the failure and
/// reports it through `is_valid()`.
pub trait Writer {
    fn write_bytes(&mut self, data: &[u8]);

    fn is_valid(&self) -> bool;

    fn write_byte(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    fn write_hash(&mut self, hash: &[u8; HASH_SIZE]) {
        self.write_bytes(hash);
    }

    fn write_u16_le(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_u64_le(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_compact_size(&mut self, value: u64) {
        match compact_size_len(value) {
            1 => self.write_byte(value as u8),
            3 => {
                self.write_byte(0xfd);
                self.write_u16_le(value as u16);
            }
            5 => {
                self.write_byte(0xfe);
                self.write_u32_le(value as u32);
            }
            _ => {
                self.write_byte(0xff);
                self.write_u64_le(value);
            }
        }
    }
}

impl Writer for Vec<u8> {
    fn write_bytes(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }

    fn is_valid(&self) -> bool {
        true
    }
}

/// Writes to any `io::Write` sink, keeping the first error
pub struct StreamWriter<W: Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Flush the sink and surface the first recorded error
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Writer for StreamWriter<W> {
    fn write_bytes(&mut self, data: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.inner.write_all(data) {
            self.error = Some(e);
        }
    }

    fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}
