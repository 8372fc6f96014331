//! Bit-level I/O for transmission packets.
//!
//! `BitReader` is the cursor every decoder stage reads through; `BitWriter`
//! is its mirror used by the encoder. Both operate in MSB-first order, so
//! the first bit read from a field is its most significant bit.
//!
//! # Padding Rules
//! - BitWriter: pads incomplete bytes with trailing zeros
//! - BitReader: only exposes the first `bit_len` bits of its buffer; bits
//!   beyond that (the low nibble of an odd-length hex transmission) are
//!   invisible to the reader
//!
//! # Example
//! ```
//! use bits_decoder_core::bitio::{BitWriter, BitReader};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b110, 3).unwrap(); // version 6
//! writer.write_bits(0b100, 3).unwrap(); // type id 4
//! let bit_len = writer.bit_len();
//!
//! let bytes = writer.finish();
//! let mut reader = BitReader::new(&bytes, bit_len);
//! assert_eq!(reader.read_bits(3).unwrap(), 6);
//! assert_eq!(reader.read_bits(3).unwrap(), 4);
//! assert_eq!(reader.remaining(), 0);
//! ```

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bit_count` is always < 8
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// Create a new BitWriter with empty output.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Write the lowest `count` bits of `value`, MSB-first.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let bits_to_write = remaining.min(8 - self.bit_count as usize);
            let shift = remaining - bits_to_write;
            let bits = ((value >> shift) & ((1u64 << bits_to_write) - 1)) as u8;

            self.bit_buffer |= bits << (8 - self.bit_count as usize - bits_to_write);
            self.bit_count += bits_to_write as u8;

            if self.bit_count == 8 {
                self.bytes.push(self.bit_buffer);
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            remaining -= bits_to_write;
        }

        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Append everything written to `other` after the bits already here.
    pub fn append(&mut self, other: BitWriter) -> Result<()> {
        let bit_len = other.bit_len();
        let bytes = other.finish();
        let mut reader = BitReader::new(&bytes, bit_len);
        while reader.remaining() > 0 {
            let count = reader.remaining().min(64);
            let value = reader.read_bits(count)?;
            self.write_bits(value, count)?;
        }
        Ok(())
    }

    /// Finish writing and return the output bytes.
    ///
    /// Any partial byte is padded with trailing zeros.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
        }
        self.bytes
    }

    /// Return the total number of bits written (including partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor over a finite bit sequence, read MSB-first.
///
/// Reading only moves forward. The reader is handed down the recursive
/// descent by exclusive reference, so `position()` deltas measure exactly
/// how many bits a subtree consumed.
///
/// # Invariants
/// - `bit_position <= bit_len <= data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Number of valid bits in `data`
    bit_len: usize,
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader over the first `bit_len` bits of `data`.
    ///
    /// `bit_len` is clamped to the size of the buffer.
    pub fn new(data: &'a [u8], bit_len: usize) -> Self {
        Self {
            data,
            bit_len: bit_len.min(data.len() * 8),
            bit_position: 0,
        }
    }

    /// Create a reader over every bit of `data`.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(data, data.len() * 8)
    }

    /// Read up to 64 bits as an unsigned integer.
    ///
    /// The first bit read becomes the most significant bit of the result.
    /// On error the position is left unchanged.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::OutOfBits` if fewer than `count` bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let available = self.remaining();
        if count > available {
            return Err(BitIoError::OutOfBits {
                requested: count,
                available,
            }
            .into());
        }

        let mut result = 0u64;
        let mut remaining = count;

        while remaining > 0 {
            let byte_idx = self.bit_position / 8;
            let bit_offset = self.bit_position % 8;

            let bits_in_byte = 8 - bit_offset;
            let bits_to_read = remaining.min(bits_in_byte);

            let byte = self.data[byte_idx];
            let mask = ((1u16 << bits_to_read) - 1) as u8;
            let bits = (byte >> (bits_in_byte - bits_to_read)) & mask;

            result = (result << bits_to_read) | bits as u64;

            self.bit_position += bits_to_read;
            remaining -= bits_to_read;
        }

        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Current bit offset from the start of the sequence.
    pub fn position(&self) -> usize {
        self.bit_position
    }

    /// Number of bits left to read.
    pub fn remaining(&self) -> usize {
        self.bit_len - self.bit_position
    }

    /// Total number of readable bits.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Check if every bit has been read.
    pub fn is_empty(&self) -> bool {
        self.bit_position >= self.bit_len
    }

    /// True if every unread bit is zero. Does not move the cursor.
    pub fn rest_is_zero(&self) -> bool {
        let mut probe = self.clone();
        while probe.remaining() > 0 {
            let count = probe.remaining().min(64);
            match probe.read_bits(count) {
                Ok(0) => continue,
                _ => return false,
            }
        }
        true
    }
}
