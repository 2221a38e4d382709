//! Random access over a forward-only byte source.
use std::{
    fmt,
    io::{self, Read, Seek, SeekFrom},
};

use crate::FormatError;

const DEFAULT_NAME: &str = "<stream>";

/// Owns a byte source together with everything it yielded at construction,
/// and serves seeks and reads from that copy.
///
/// The source is drained exactly once, in [`StreamBuffer::new`]. Every later
/// operation is index arithmetic over the materialized bytes, so a source that
/// only supports forward reads can still be read from its tail.
///
/// Valid seek targets are `0..len()`. Seeking to `len()` itself is rejected,
/// the cursor can only reach the end by reading up to it.
///
/// [`Read`] and [`Seek`] are implemented on top of the inherent methods with
/// the same bounds, for consumers that only speak `std::io`.
pub struct StreamBuffer<R> {
    source: R,
    name: String,
    data: Vec<u8>,
    position: u64,
}

impl<R: Read> StreamBuffer<R> {
    /// Drain `source` into a new buffer positioned at offset 0.
    pub fn new(mut source: R) -> Result<Self, FormatError> {
        let mut data = Vec::new();
        source
            .read_to_end(&mut data)
            .map_err(FormatError::SourceUnavailable)?;
        Ok(Self {
            source,
            name: DEFAULT_NAME.to_string(),
            data,
            position: 0,
        })
    }

    /// Drain `source`, failing unless it yields exactly `length` bytes.
    pub fn with_length(source: R, length: u64) -> Result<Self, FormatError> {
        let buffer = Self::new(source)?;
        if buffer.len() != length {
            return Err(FormatError::SourceUnavailable(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "declared length {length} but source yielded {} bytes",
                    buffer.len()
                ),
            )));
        }
        Ok(buffer)
    }
}

impl StreamBuffer<io::Empty> {
    /// Wrap bytes that were already materialized elsewhere.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: io::empty(),
            name: DEFAULT_NAME.to_string(),
            data: bytes.into(),
            position: 0,
        }
    }
}

impl<R> StreamBuffer<R> {
    /// Name reported in container errors, e.g. a path or URL.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes from the cursor to the end, without advancing.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.position as usize..]
    }

    pub fn seek(&mut self, offset: u64) -> Result<(), FormatError> {
        if offset >= self.len() {
            return Err(FormatError::OutOfRange {
                offset,
                length: self.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    /// Return the next `n` bytes and advance past them. Nothing is consumed
    /// when fewer than `n` bytes remain.
    pub fn read_exact(&mut self, n: usize) -> Result<&[u8], FormatError> {
        let end = self
            .position
            .checked_add(n as u64)
            .filter(|end| *end <= self.len())
            .ok_or(FormatError::EndOfData {
                position: self.position,
                requested: n as u64,
                length: self.len(),
            })?;
        let start = self.position as usize;
        self.position = end;
        Ok(&self.data[start..end as usize])
    }

    pub fn read_byte(&mut self) -> Result<u8, FormatError> {
        let byte = *self
            .data
            .get(self.position as usize)
            .ok_or(FormatError::EndOfData {
                position: self.position,
                requested: 1,
                length: self.len(),
            })?;
        self.position += 1;
        Ok(byte)
    }

    /// Copy as many bytes as fit into `buf`, returning how many were copied.
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let remaining = self.remaining();
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.position += count as u64;
        count
    }

    pub fn read_u32_le(&mut self) -> Result<u32, FormatError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_exact(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    /// Release the materialized bytes and hand the source back.
    pub fn close(self) -> R {
        self.source
    }
}

impl<R> fmt::Debug for StreamBuffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBuffer")
            .field("name", &self.name)
            .field("length", &self.len())
            .field("position", &self.position)
            .finish()
    }
}

impl<R> Read for StreamBuffer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf))
    }
}

impl<R> Seek for StreamBuffer<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        let offset = target.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid seek to a negative or overflowing position: {pos:?}"),
            )
        })?;
        StreamBuffer::seek(self, offset)?;
        Ok(offset)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
