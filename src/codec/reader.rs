//! Byte sources for deserialization
//!
//! A reader keeps a sticky validity flag: once any read fails, the source is
//! invalidated and every later read fails as well. Callers can either
//! propagate the returned error or check `is_valid()` after a batch of reads.

use super::{CodecError, HASH_SIZE};
use std::io::{self, BufRead, Read};

/// A cursor over a little-endian byte stream
pub trait Reader {
    /// Fill `buf` completely or fail
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError>;

    /// Read exactly `len` bytes
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, CodecError>;

    /// Read everything up to the end of the source
    fn read_remaining(&mut self) -> Result<Vec<u8>, CodecError>;

    /// True when no more bytes can be read
    fn is_exhausted(&mut self) -> bool;

    /// False once any read has failed
    fn is_valid(&self) -> bool;

    /// Mark the source as failed
    fn invalidate(&mut self);

    fn read_byte(&mut self) -> Result<u8, CodecError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_hash(&mut self) -> Result<[u8; HASH_SIZE], CodecError> {
        let mut hash = [0u8; HASH_SIZE];
        self.read_exact(&mut hash)?;
        Ok(hash)
    }

    fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a Bitcoin-style variable length integer
    fn read_compact_size(&mut self) -> Result<u64, CodecError> {
        match self.read_byte()? {
            0xfd => self.read_u16_le().map(u64::from),
            0xfe => self.read_u32_le().map(u64::from),
            0xff => self.read_u64_le(),
            value => Ok(u64::from(value)),
        }
    }

    /// Read a compact-size length followed by that many bytes
    fn read_size_prefixed(&mut self, limit: usize) -> Result<Vec<u8>, CodecError> {
        let length = self.read_compact_size()?;
        if length > limit as u64 {
            self.invalidate();
            return Err(CodecError::LengthTooLarge { length, limit });
        }
        self.read_bytes(length as usize)
    }
}

// =============================================================================
// Slice Reader
// =============================================================================

/// Reads from a borrowed byte slice
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    position: usize,
    valid: bool,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            valid: true,
        }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if !self.valid {
            return Err(CodecError::Invalidated);
        }

        let available = self.remaining();
        if len > available {
            self.valid = false;
            return Err(CodecError::UnexpectedEnd {
                needed: len,
                available,
            });
        }

        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }
}

impl Reader for SliceReader<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        let slice = self.take(buf.len())?;
        buf.copy_from_slice(slice);
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        self.take(len).map(<[u8]>::to_vec)
    }

    fn read_remaining(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.remaining();
        self.read_bytes(len)
    }

    fn is_exhausted(&mut self) -> bool {
        self.remaining() == 0
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }
}

// =============================================================================
// Stream Reader
// =============================================================================

/// Reads from a buffered stream owned by the caller
///
/// Only the bytes a decode asks for are consumed, so records can be read one
/// after another from the same stream. Any read-ahead stays in the caller's
/// `BufRead`.
pub struct StreamReader<R: BufRead> {
    inner: R,
    valid: bool,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, valid: true }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fail<T>(&mut self, error: CodecError) -> Result<T, CodecError> {
        self.valid = false;
        Err(error)
    }

    /// Read until `buf` is full or the stream ends, returning the count
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: BufRead> Reader for StreamReader<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        if !self.valid {
            return Err(CodecError::Invalidated);
        }

        match self.fill(buf) {
            Ok(filled) if filled == buf.len() => Ok(()),
            Ok(filled) => self.fail(CodecError::UnexpectedEnd {
                needed: buf.len(),
                available: filled,
            }),
            Err(e) => self.fail(e.into()),
        }
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        if !self.valid {
            return Err(CodecError::Invalidated);
        }

        // `take` keeps an untrusted length from driving a large allocation.
        let mut data = Vec::new();
        if let Err(e) = (&mut self.inner).take(len as u64).read_to_end(&mut data) {
            return self.fail(e.into());
        }

        if data.len() < len {
            return self.fail(CodecError::UnexpectedEnd {
                needed: len,
                available: data.len(),
            });
        }

        Ok(data)
    }

    fn read_remaining(&mut self) -> Result<Vec<u8>, CodecError> {
        if !self.valid {
            return Err(CodecError::Invalidated);
        }

        let mut data = Vec::new();
        match self.inner.read_to_end(&mut data) {
            Ok(_) => Ok(data),
            Err(e) => self.fail(e.into()),
        }
    }

    fn is_exhausted(&mut self) -> bool {
        match self.inner.fill_buf() {
            Ok(buf) => buf.is_empty(),
            Err(e) => {
                log::debug!("Stream failed while checking for more data: {}", e);
                self.valid = false;
                true
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_reader_integers() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = SliceReader::new(&data);

        assert_eq!(reader.read_byte().unwrap(), 0x01);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0x12345678);
        assert!(reader.is_exhausted());
        assert!(reader.is_valid());
    }

    #[test]
    fn test_slice_reader_underflow_is_sticky() {
        let data = [0xaa, 0xbb];
        let mut reader = SliceReader::new(&data);

        assert!(matches!(
            reader.read_u32_le(),
            Err(CodecError::UnexpectedEnd {
                needed: 4,
                available: 2
            })
        ));
        assert!(!reader.is_valid());

        // Enough bytes remain for a single byte, but the source stays failed.
        assert!(matches!(reader.read_byte(), Err(CodecError::Invalidated)));
    }

    #[test]
    fn test_compact_size() {
        let data = [0xfc, 0xfd, 0x00, 0x01, 0xfe, 0x00, 0x00, 0x01, 0x00];
        let mut reader = SliceReader::new(&data);

        assert_eq!(reader.read_compact_size().unwrap(), 0xfc);
        assert_eq!(reader.read_compact_size().unwrap(), 0x0100);
        assert_eq!(reader.read_compact_size().unwrap(), 0x0001_0000);
    }

    #[test]
    fn test_size_prefixed_limit() {
        let data = [0xfd, 0x00, 0x10];
        let mut reader = SliceReader::new(&data);

        assert!(matches!(
            reader.read_size_prefixed(100),
            Err(CodecError::LengthTooLarge { length: 0x1000, .. })
        ));
        assert!(!reader.is_valid());
    }

    #[test]
    fn test_stream_reader() {
        let data: &[u8] = &[0x03, 0xaa, 0xbb, 0xcc, 0x01];
        let mut reader = StreamReader::new(data);

        assert_eq!(reader.read_size_prefixed(10).unwrap(), vec![0xaa, 0xbb, 0xcc]);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.read_remaining().unwrap(), vec![0x01]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_stream_reader_short_read() {
        let data: &[u8] = &[0x05, 0xaa];
        let mut reader = StreamReader::new(data);

        assert!(matches!(
            reader.read_size_prefixed(10),
            Err(CodecError::UnexpectedEnd {
                needed: 5,
                available: 1
            })
        ));
        assert!(!reader.is_valid());
    }

    #[test]
    fn test_stream_reader_reports_partial_read() {
        let data: &[u8] = &[0x01, 0x02, 0x03];
        let mut reader = StreamReader::new(data);

        assert!(matches!(
            reader.read_u64_le(),
            Err(CodecError::UnexpectedEnd {
                needed: 8,
                available: 3
            })
        ));
        assert!(!reader.is_valid());
    }

    #[test]
    fn test_stream_reader_leaves_rest_in_caller_stream() {
        let mut data: &[u8] = &[0x78, 0x56, 0x34, 0x12, 0xaa, 0xbb];

        let mut reader = StreamReader::new(&mut data);
        assert_eq!(reader.read_u32_le().unwrap(), 0x12345678);
        drop(reader);

        assert_eq!(data, &[0xaa, 0xbb]);
    }

    struct BrokenStream;

    impl Read for BrokenStream {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    impl BufRead for BrokenStream {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }

        fn consume(&mut self, _amount: usize) {}
    }

    #[test]
    fn test_stream_reader_error_while_checking_exhaustion() {
        let mut reader = StreamReader::new(BrokenStream);

        assert!(reader.is_exhausted());
        assert!(!reader.is_valid());
        assert!(matches!(reader.read_byte(), Err(CodecError::Invalidated)));
    }

    #[test]
    fn test_stream_reader_io_error() {
        let mut reader = StreamReader::new(BrokenStream);

        assert!(matches!(reader.read_byte(), Err(CodecError::IoError(_))));
        assert!(!reader.is_valid());
    }
}
