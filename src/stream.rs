//! Low-level tag stream primitives.
//!
//! The outer layer of an archive is a raw byte stream of little-endian
//! 32-bit words. This module defines the stream contracts the codec
//! consumes, the `(tag, size)` pair writer, and the packed variable-length
//! unsigned integer used for factory-name lengths.
//!
//! ## Packed uints
//!
//! A single byte `b < 255` encodes the value directly; `255` is followed by
//! a full 32-bit little-endian value. Values above `u32::MAX` are not
//! representable on the wire.
//!
//! ## Adapters
//!
//! - [`StreamWriter`]: wraps any `std::io::Write` and tracks the offset.
//! - [`StreamReader`]: wraps any `std::io::Read`; short reads surface as
//!   [`PicarcError::Truncated`].
//! - [`MemReader`]: cursor over an in-memory slice that knows how many
//!   bytes remain, so stream-supplied sizes can be pre-validated before
//!   allocation.
//! - [`NullWriter`]: discards everything but counts bytes. The encoder
//!   serializes sub-pictures into one purely for the side effect of
//!   collecting their typefaces.

use crate::error::{PicarcError, Result};
use std::io;

/// A byte source the decoder pulls an archive from.
///
/// `read` fills the whole buffer or fails; partial reads are reported as
/// truncation by the adapters.
pub trait ReadStream {
    /// Reads exactly `buf.len()` bytes.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Number of unread bytes, when the source knows it.
    ///
    /// Sources backed by memory report `Some`; pipe-like sources report
    /// `None` and stream-supplied sizes are then only bounded by the read
    /// itself failing.
    fn remaining(&self) -> Option<usize> {
        None
    }

    /// Reads one little-endian 32-bit word.
    fn read_u32(&mut self) -> Result<u32> {
        let mut word = [0u8; 4];
        self.read(&mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Reads one packed variable-length unsigned integer.
    fn read_packed_uint(&mut self) -> Result<u64> {
        let mut head = [0u8; 1];
        self.read(&mut head)?;
        if head[0] < 255 {
            Ok(u64::from(head[0]))
        } else {
            Ok(u64::from(self.read_u32()?))
        }
    }
}

/// A byte sink the encoder pushes an archive into.
pub trait WriteStream {
    /// Appends the bytes to the stream.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Total bytes written so far.
    fn bytes_written(&self) -> usize;

    /// Writes one little-endian 32-bit word.
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Writes one packed variable-length unsigned integer.
    fn write_packed_uint(&mut self, value: u64) -> Result<()> {
        if value < 255 {
            self.write(&[value as u8])
        } else {
            let word = u32::try_from(value)
                .map_err(|_| PicarcError::Format(format!("packed uint {value} overflows u32")))?;
            self.write(&[255])?;
            self.write_u32(word)
        }
    }
}

/// Emits a `(tag, size)` pair as two 32-bit words.
pub fn write_tag_size(stream: &mut dyn WriteStream, tag: u32, size: u32) -> Result<()> {
    stream.write_u32(tag)?;
    stream.write_u32(size)
}

/// Encoded byte length of a packed uint, for section-size bookkeeping.
pub(crate) fn packed_uint_size(value: u64) -> usize {
    if value < 255 {
        1
    } else {
        5
    }
}

/// Checked `usize` to `u32` narrowing for on-wire sizes.
pub(crate) fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| PicarcError::Format(format!("size {value} overflows u32")))
}

/// Reads `len` bytes into a fresh vector, pre-validating `len` against the
/// stream's remaining length when it is known.
pub(crate) fn read_exact_vec(stream: &mut dyn ReadStream, len: usize) -> Result<Vec<u8>> {
    if let Some(remaining) = stream.remaining() {
        if len > remaining {
            return Err(PicarcError::Truncated);
        }
    }
    let mut bytes = vec![0u8; len];
    stream.read(&mut bytes)?;
    Ok(bytes)
}

/// A [`WriteStream`] over any `std::io::Write`, tracking the offset.
#[derive(Debug)]
pub struct StreamWriter<W: io::Write> {
    inner: W,
    bytes_written: usize,
}

impl<W: io::Write> StreamWriter<W> {
    /// Wraps a writer positioned at offset zero.
    pub fn new(inner: W) -> Self {
        Self { inner, bytes_written: 0 }
    }

    /// Unwraps the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Borrows the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: io::Write> WriteStream for StreamWriter<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len();
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

/// A [`ReadStream`] over any `std::io::Read`.
#[derive(Debug)]
pub struct StreamReader<R: io::Read> {
    inner: R,
}

impl<R: io::Read> StreamReader<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: io::Read> ReadStream for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                PicarcError::Truncated
            } else {
                e.into()
            }
        })
    }
}

/// A [`ReadStream`] cursor over an in-memory slice.
///
/// Knows its remaining length, which lets the decoder reject
/// adversary-controlled section sizes before allocating for them.
#[derive(Debug)]
pub struct MemReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MemReader<'a> {
    /// Creates a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl ReadStream for MemReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self
            .pos
            .checked_add(buf.len())
            .filter(|&end| end <= self.data.len())
            .ok_or(PicarcError::Truncated)?;
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }
}

/// A [`WriteStream`] that discards its input and only counts bytes.
#[derive(Debug, Default)]
pub struct NullWriter {
    bytes_written: usize,
}

impl NullWriter {
    /// Creates a fresh discard sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WriteStream for NullWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes_written += bytes.len();
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}
