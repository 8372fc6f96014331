//! Packet tree and wire layout.
//!
//! A transmission carries one packet. Every packet starts with a 6-bit
//! header; the type id then selects a literal body or an operator body.
//!
//! # Packet Format
//!
//! ```text
//! +-------------+-------------+
//! | version (3) | type_id (3) |
//! +-------------+-------------+
//!
//! type_id == 4 (literal):
//! +---+---------+---+---------+     +---+---------+
//! | 1 | data(4) | 1 | data(4) | ... | 0 | data(4) |
//! +---+---------+---+---------+     +---+---------+
//!
//! any other type_id (operator):
//! +-----+--------------------+---------------------+
//! | 0   | total_bits (15)    | children ...        |
//! +-----+--------------------+---------------------+
//! | 1   | child_count (11)   | children ...        |
//! +-----+--------------------+---------------------+
//! ```
//!
//! Literal data nibbles concatenate most significant first. Operator
//! children are themselves complete packets, so nesting is unbounded.

use std::fmt;

use crate::bitio::BitWriter;
use crate::error::{PacketError, Result};
use crate::transmission::Transmission;

/// Width of the version field
pub const VERSION_BITS: usize = 3;

/// Width of the type id field
pub const TYPE_ID_BITS: usize = 3;

/// Type id reserved for literal packets
pub const LITERAL_TYPE_ID: u8 = 4;

/// Width of one literal group: continuation bit plus a data nibble
pub const LITERAL_GROUP_BITS: usize = 5;

/// Width of the total-bit-length field (length type 0)
pub const TOTAL_BITS_FIELD: usize = 15;

/// Width of the child-count field (length type 1)
pub const CHILD_COUNT_FIELD: usize = 11;

/// Largest version a packet can carry
pub const MAX_VERSION: u8 = (1 << VERSION_BITS) - 1;

/// Operator kinds, keyed by type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpCode {
    Sum,
    Product,
    Minimum,
    Maximum,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl OpCode {
    /// Every opcode in type id order.
    pub const ALL: [OpCode; 7] = [
        OpCode::Sum,
        OpCode::Product,
        OpCode::Minimum,
        OpCode::Maximum,
        OpCode::GreaterThan,
        OpCode::LessThan,
        OpCode::EqualTo,
    ];

    /// The 3-bit type id carried on the wire.
    pub fn type_id(self) -> u8 {
        match self {
            OpCode::Sum => 0,
            OpCode::Product => 1,
            OpCode::Minimum => 2,
            OpCode::Maximum => 3,
            OpCode::GreaterThan => 5,
            OpCode::LessThan => 6,
            OpCode::EqualTo => 7,
        }
    }

    /// Exact child count the opcode requires, if fixed.
    pub fn required_children(self) -> Option<usize> {
        match self {
            OpCode::GreaterThan | OpCode::LessThan | OpCode::EqualTo => Some(2),
            _ => None,
        }
    }

    /// True for Minimum/Maximum, which have no value over zero children.
    pub fn needs_children(self) -> bool {
        matches!(self, OpCode::Minimum | OpCode::Maximum)
    }

    /// Short mnemonic used by `Display`.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Sum => "sum",
            OpCode::Product => "product",
            OpCode::Minimum => "min",
            OpCode::Maximum => "max",
            OpCode::GreaterThan => "gt",
            OpCode::LessThan => "lt",
            OpCode::EqualTo => "eq",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = PacketError;

    fn try_from(type_id: u8) -> std::result::Result<Self, Self::Error> {
        match type_id {
            0 => Ok(OpCode::Sum),
            1 => Ok(OpCode::Product),
            2 => Ok(OpCode::Minimum),
            3 => Ok(OpCode::Maximum),
            5 => Ok(OpCode::GreaterThan),
            6 => Ok(OpCode::LessThan),
            7 => Ok(OpCode::EqualTo),
            other => Err(PacketError::UnknownTypeId(other)),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One decoded packet.
///
/// Children are owned exclusively by their parent and kept in wire order,
/// which is argument order for the comparison opcodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Literal {
        version: u8,
        value: u64,
    },
    Operator {
        version: u8,
        opcode: OpCode,
        children: Vec<Packet>,
    },
}

impl Packet {
    pub fn literal(version: u8, value: u64) -> Self {
        Packet::Literal { version, value }
    }

    pub fn operator(version: u8, opcode: OpCode, children: Vec<Packet>) -> Self {
        Packet::Operator {
            version,
            opcode,
            children,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Packet::Literal { version, .. } | Packet::Operator { version, .. } => *version,
        }
    }

    /// Type id this packet is written with.
    pub fn type_id(&self) -> u8 {
        match self {
            Packet::Literal { .. } => LITERAL_TYPE_ID,
            Packet::Operator { opcode, .. } => opcode.type_id(),
        }
    }

    /// Direct children (empty for literals).
    pub fn children(&self) -> &[Packet] {
        match self {
            Packet::Literal { .. } => &[],
            Packet::Operator { children, .. } => children,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Packet::Literal { .. })
    }

    /// Number of packets in this subtree, including itself.
    pub fn packet_count(&self) -> usize {
        1 + self.children().iter().map(Packet::packet_count).sum::<usize>()
    }

    /// Depth of this subtree; a lone literal has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Packet::depth).max().unwrap_or(0)
    }

    /// Encode as a complete transmission, zero-padded to a whole byte.
    ///
    /// The encoder writes whatever tree it is given, including trees the
    /// decoder would reject for arity, so malformed inputs can be built.
    ///
    /// # Errors
    /// `PacketError::FieldTooWide` if a version, child count or children
    /// bit total does not fit its header field.
    pub fn encode(&self, mode: LengthMode) -> Result<Transmission> {
        let mut writer = BitWriter::new();
        self.write_to(&mut writer, mode, 0)?;
        Ok(Transmission::from_writer(writer))
    }

    /// Append this packet's bits to `writer`.
    pub fn write_to(&self, writer: &mut BitWriter, mode: LengthMode, depth: usize) -> Result<()> {
        let version = self.version();
        if version > MAX_VERSION {
            return Err(PacketError::FieldTooWide {
                field: "version",
                value: version as u64,
                bits: VERSION_BITS,
            }
            .into());
        }
        writer.write_bits(version as u64, VERSION_BITS)?;
        writer.write_bits(self.type_id() as u64, TYPE_ID_BITS)?;

        match self {
            Packet::Literal { value, .. } => write_literal_body(writer, *value),
            Packet::Operator { children, .. } => match mode.at_depth(depth) {
                LengthType::TotalBits => {
                    let mut body = BitWriter::new();
                    for child in children {
                        child.write_to(&mut body, mode, depth + 1)?;
                    }
                    let total = body.bit_len();
                    check_field("total bits", total, TOTAL_BITS_FIELD)?;

                    writer.write_bit(false)?;
                    writer.write_bits(total as u64, TOTAL_BITS_FIELD)?;
                    writer.append(body)
                }
                LengthType::ChildCount => {
                    check_field("child count", children.len(), CHILD_COUNT_FIELD)?;

                    writer.write_bit(true)?;
                    writer.write_bits(children.len() as u64, CHILD_COUNT_FIELD)?;
                    for child in children {
                        child.write_to(writer, mode, depth + 1)?;
                    }
                    Ok(())
                }
            },
        }
    }
}

fn check_field(field: &'static str, value: usize, bits: usize) -> Result<()> {
    if value >= 1 << bits {
        return Err(PacketError::FieldTooWide {
            field,
            value: value as u64,
            bits,
        }
        .into());
    }
    Ok(())
}

/// Write the minimal number of 5-bit groups holding `value`.
fn write_literal_body(writer: &mut BitWriter, value: u64) -> Result<()> {
    let significant = 64 - value.leading_zeros() as usize;
    let groups = significant.div_ceil(4).max(1);

    for i in (0..groups).rev() {
        writer.write_bit(i > 0)?;
        writer.write_bits((value >> (4 * i)) & 0xF, 4)?;
    }
    Ok(())
}

/// How operator children are framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthType {
    /// Length type 0: 15-bit total bit length of the children
    TotalBits,
    /// Length type 1: 11-bit count of direct children
    ChildCount,
}

/// Framing policy for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthMode {
    /// Every operator uses length type 0
    TotalBits,
    /// Every operator uses length type 1
    #[default]
    ChildCount,
    /// Length type 1 at even depths, length type 0 at odd depths
    Alternate,
}

impl LengthMode {
    fn at_depth(self, depth: usize) -> LengthType {
        match self {
            LengthMode::TotalBits => LengthType::TotalBits,
            LengthMode::ChildCount => LengthType::ChildCount,
            LengthMode::Alternate if depth % 2 == 0 => LengthType::ChildCount,
            LengthMode::Alternate => LengthType::TotalBits,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Literal { version, value } => write!(f, "(lit v{} {})", version, value),
            Packet::Operator {
                version,
                opcode,
                children,
            } => {
                write!(f, "({} v{}", opcode, version)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}
