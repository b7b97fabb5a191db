// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Encoding and decoding of TLS variable-length vectors, as described in
//! [RFC 5246 §4.3](https://datatracker.ietf.org/doc/html/rfc5246#section-4.3).
//!
//! A vector declared as `opaque value<0..max_length>` is encoded as a
//! big-endian length prefix followed by the payload. The width of the prefix
//! is the number of bytes needed to represent `max_length`, not the length of
//! the payload, so a `<0..2^24-1>` vector always carries a 3-byte prefix.
//!
//! ```
//! use length_prefixed::{VariableLengthVector, MAX_OPAQUE_16};
//!
//! let encoded = VariableLengthVector::new(b"abc", MAX_OPAQUE_16).unwrap().encode();
//! assert_eq!(encoded, [0, 3, b'a', b'b', b'c']);
//!
//! let (vector, rest) = VariableLengthVector::decode(&[0, 1, 7, 9], MAX_OPAQUE_16).unwrap();
//! assert_eq!(vector.payload(), &[7]);
//! assert_eq!(rest, &[9]);
//! ```

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{ErrorKind, Read, Write};
use thiserror::Error;

/// Upper bound of an `opaque<0..2^8-1>` vector.
pub const MAX_OPAQUE_8: u32 = (1 << 8) - 1;

/// Upper bound of an `opaque<0..2^16-1>` vector, used for signatures and extensions.
pub const MAX_OPAQUE_16: u32 = (1 << 16) - 1;

/// Upper bound of an `opaque<0..2^24-1>` vector, used for certificates and chains.
pub const MAX_OPAQUE_24: u32 = (1 << 24) - 1;

#[derive(Error, Debug)]
pub enum LengthPrefixedError {
    #[error("truncated input")]
    TruncatedInput,
    #[error("declared length {length} exceeds bound {max_length}")]
    LengthExceedsBound { length: u64, max_length: u32 },
    #[error("payload length {length} exceeds bound {max_length}")]
    PayloadExceedsBound { length: usize, max_length: u32 },
    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for LengthPrefixedError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::UnexpectedEof {
            LengthPrefixedError::TruncatedInput
        } else {
            LengthPrefixedError::Io(e)
        }
    }
}

/// Returns the width in bytes of the length prefix of a vector bounded by
/// `max_length`. This is never less than one.
pub fn prefix_width(max_length: u32) -> usize {
    let bits = u32::BITS - max_length.leading_zeros();
    (bits.div_ceil(8) as usize).max(1)
}

/// A borrowed TLS variable-length vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLengthVector<'a> {
    max_length: u32,
    payload: &'a [u8],
}

impl<'a> VariableLengthVector<'a> {
    /// Returns a new vector wrapping `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`LengthPrefixedError::PayloadExceedsBound`] if the payload is
    /// longer than `max_length`.
    pub fn new(payload: &'a [u8], max_length: u32) -> Result<Self, LengthPrefixedError> {
        if payload.len() as u64 > u64::from(max_length) {
            return Err(LengthPrefixedError::PayloadExceedsBound {
                length: payload.len(),
                max_length,
            });
        }
        Ok(Self {
            max_length,
            payload,
        })
    }

    /// Decodes a vector from the front of `buffer`, returning it together
    /// with the bytes that follow it.
    ///
    /// # Errors
    ///
    /// Returns [`LengthPrefixedError::TruncatedInput`] if `buffer` is shorter
    /// than the length prefix or the declared payload, and
    /// [`LengthPrefixedError::LengthExceedsBound`] if the declared length is
    /// greater than `max_length`.
    pub fn decode(buffer: &'a [u8], max_length: u32) -> Result<(Self, &'a [u8]), LengthPrefixedError> {
        let width = prefix_width(max_length);
        if buffer.len() < width {
            return Err(LengthPrefixedError::TruncatedInput);
        }
        let (mut prefix, rest) = buffer.split_at(width);
        let length = prefix.read_uint::<BigEndian>(width)?;
        if length > u64::from(max_length) {
            return Err(LengthPrefixedError::LengthExceedsBound { length, max_length });
        }
        // The bound check above keeps `length` within u32.
        let length = length as usize;
        if rest.len() < length {
            return Err(LengthPrefixedError::TruncatedInput);
        }
        let (payload, rest) = rest.split_at(length);

        Ok((
            Self {
                max_length,
                payload,
            },
            rest,
        ))
    }

    /// Returns the payload of the vector.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Returns the upper bound of the vector.
    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    /// Returns the encoded size of the vector, including its length prefix.
    pub fn encoded_len(&self) -> usize {
        prefix_width(self.max_length) + self.payload.len()
    }

    /// Returns the encoded vector.
    ///
    /// # Panics
    ///
    /// Panics if writing to the internal buffer fails, which should never happen.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut buffer).unwrap();
        buffer
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_uint::<BigEndian>(self.payload.len() as u64, prefix_width(self.max_length))?;
        writer.write_all(self.payload)
    }
}

/// Decodes a vector from the front of `buffer` and returns its payload and
/// the remaining bytes.
///
/// # Errors
///
/// See [`VariableLengthVector::decode`].
pub fn decode(buffer: &[u8], max_length: u32) -> Result<(&[u8], &[u8]), LengthPrefixedError> {
    let (vector, rest) = VariableLengthVector::decode(buffer, max_length)?;
    Ok((vector.payload(), rest))
}

/// Returns `payload` encoded as a vector bounded by `max_length`.
///
/// # Errors
///
/// Returns [`LengthPrefixedError::PayloadExceedsBound`] if the payload is
/// longer than `max_length`.
pub fn encode(payload: &[u8], max_length: u32) -> Result<Vec<u8>, LengthPrefixedError> {
    Ok(VariableLengthVector::new(payload, max_length)?.encode())
}

pub trait ReadLengthPrefixedBytesExt: Read {
    /// Read a big-endian length-prefixed vector bounded by `max_length` from
    /// the reader.
    ///
    /// The declared length is checked against `max_length` before any payload
    /// is read, and the payload buffer only grows as bytes actually arrive.
    ///
    /// # Errors
    ///
    /// Returns [`LengthPrefixedError::LengthExceedsBound`] if the declared
    /// length is too large, and [`LengthPrefixedError::TruncatedInput`] if the
    /// reader runs out of bytes.
    #[inline]
    fn read_length_prefixed(&mut self, max_length: u32) -> Result<Vec<u8>, LengthPrefixedError> {
        let length = self.read_uint::<BigEndian>(prefix_width(max_length))?;
        if length > u64::from(max_length) {
            return Err(LengthPrefixedError::LengthExceedsBound { length, max_length });
        }
        let mut buffer = Vec::new();
        self.take(length).read_to_end(&mut buffer)?;
        if buffer.len() as u64 != length {
            return Err(LengthPrefixedError::TruncatedInput);
        }
        Ok(buffer)
    }

    /// Read exactly `N` bytes from the reader.
    ///
    /// # Errors
    ///
    /// Returns [`LengthPrefixedError::TruncatedInput`] if fewer than `N` bytes remain.
    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], LengthPrefixedError> {
        let mut buffer = [0; N];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

/// All types that implement `Read` get methods defined in
/// `ReadLengthPrefixedBytesExt` for free.
impl<R: Read + ?Sized> ReadLengthPrefixedBytesExt for R {}

pub trait WriteLengthPrefixedBytesExt: Write {
    /// Write `data` to the writer as a big-endian length-prefixed vector
    /// bounded by `max_length`.
    ///
    /// # Errors
    ///
    /// Returns [`LengthPrefixedError::PayloadExceedsBound`] if `data` is longer
    /// than `max_length`, or the error of
    /// [`Write::write_all`](https://doc.rust-lang.org/std/io/trait.Write.html#method.write_all).
    #[inline]
    fn write_length_prefixed(&mut self, data: &[u8], max_length: u32) -> Result<(), LengthPrefixedError> {
        VariableLengthVector::new(data, max_length)?.write_to(self)?;
        Ok(())
    }
}

/// All types that implement `Write` get methods defined in
/// `WriteLengthPrefixedBytesExt` for free.
impl<W: Write + ?Sized> WriteLengthPrefixedBytesExt for W {}
