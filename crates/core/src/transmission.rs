//! Hex transmission text and the bit sequence it encodes.
//!
//! Each hex digit expands to exactly four bits, most significant first, and
//! digits are concatenated in input order:
//!
//! ```text
//! "D2FE28" -> 1101 0010 1111 1110 0010 1000
//! ```
//!
//! Digits are packed two per byte. For an odd number of digits the low
//! nibble of the final byte is unused and `bit_len` excludes it.
//!
//! # Padding
//!
//! A transmission carries one top-level packet followed by zero padding up
//! to a hex digit or byte boundary; the encoder pads to whole bytes. The
//! padding is never parsed and its length is not validated.

use std::fmt;

use crate::bitio::{BitReader, BitWriter};
use crate::error::{HexError, Result};

/// An immutable bit sequence decoded from hex text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// Nibble-packed bits, MSB-first
    bytes: Vec<u8>,
    /// Number of valid bits (always a multiple of 4)
    bit_len: usize,
}

impl Transmission {
    /// Parse hex text (case-insensitive, no separators).
    ///
    /// The caller trims line endings; any whitespace left in `hex` is an
    /// invalid digit.
    ///
    /// # Errors
    /// Returns `HexError::InvalidDigit` naming the first bad character.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let mut bytes = Vec::with_capacity(hex.len() / 2 + 1);
        let mut digits = 0usize;

        for (position, found) in hex.chars().enumerate() {
            let nibble = found
                .to_digit(16)
                .ok_or(HexError::InvalidDigit { position, found })? as u8;

            if digits % 2 == 0 {
                bytes.push(nibble << 4);
            } else if let Some(last) = bytes.last_mut() {
                *last |= nibble;
            }
            digits += 1;
        }

        Ok(Self {
            bytes,
            bit_len: digits * 4,
        })
    }

    /// Build a transmission from written bits, zero-padding to a whole byte.
    pub fn from_writer(writer: BitWriter) -> Self {
        let bytes = writer.finish();
        let bit_len = bytes.len() * 8;
        Self { bytes, bit_len }
    }

    /// A fresh cursor positioned at the first bit.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.bytes, self.bit_len)
    }

    /// Number of bits in the sequence.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Number of hex digits the sequence was built from.
    pub fn hex_len(&self) -> usize {
        self.bit_len / 4
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Render as uppercase hex.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.hex_len() {
            let byte = self.bytes[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            write!(f, "{:X}", nibble)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Transmission {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_hex_to_bits() {
        let t = Transmission::from_hex("D2FE28").unwrap();
        assert_eq!(t.bit_len(), 24);

        let mut reader = t.reader();
        assert_eq!(reader.read_bits(24).unwrap(), 0b1101_0010_1111_1110_0010_1000);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_odd_digit_count() {
        let t = Transmission::from_hex("A1F").unwrap();
        assert_eq!(t.bit_len(), 12);
        assert_eq!(t.hex_len(), 3);

        let mut reader = t.reader();
        assert_eq!(reader.read_bits(12).unwrap(), 0xA1F);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_zero_digits_keep_four_bits() {
        let t = Transmission::from_hex("01").unwrap();
        let mut reader = t.reader();
        assert_eq!(reader.read_bits(4).unwrap(), 0);
        assert_eq!(reader.read_bits(4).unwrap(), 1);
    }

    #[test]
    fn test_case_insensitive() {
        let upper = Transmission::from_hex("C200B40A82").unwrap();
        let lower = Transmission::from_hex("c200b40a82").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower.to_hex(), "C200B40A82");
    }

    #[test]
    fn test_invalid_digit() {
        let err = Transmission::from_hex("D2G").unwrap_err();
        assert!(matches!(
            err,
            Error::Hex(HexError::InvalidDigit {
                position: 2,
                found: 'G'
            })
        ));

        assert!(Transmission::from_hex("D2FE28\n").is_err());
    }

    #[test]
    fn test_empty() {
        let t = Transmission::from_hex("").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.to_hex(), "");
    }

    #[test]
    fn test_from_writer_pads_to_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b110100101, 9).unwrap();
        let t = Transmission::from_writer(writer);
        assert_eq!(t.bit_len(), 16);
        assert_eq!(t.to_hex(), "D280");
    }
}
