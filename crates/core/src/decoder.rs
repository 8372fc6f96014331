//! Recursive-descent packet decoder.
//!
//! The decoder reads exactly one packet from a `BitReader` and leaves the
//! reader positioned just after that packet's last bit. Operator children
//! are framed one of two ways:
//!
//! - length type 0: the children occupy exactly `total_bits` bits, measured
//!   as the cursor position delta across the child parses
//! - length type 1: exactly `child_count` children follow, whatever their size
//!
//! # Recursion
//!
//! Each nesting level costs one native stack frame. `DecoderConfig::max_depth`
//! bounds the nesting so a hostile transmission fails with
//! `PacketError::DepthExceeded` instead of exhausting the stack. Every level
//! consumes at least 11 bits of framing, so the default limit is far beyond
//! anything a realistic transmission produces.

use log::{debug, trace, warn};

use crate::bitio::BitReader;
use crate::error::{PacketError, Result};
use crate::metrics::DecodeMetrics;
use crate::packet::{
    OpCode, Packet, CHILD_COUNT_FIELD, LITERAL_GROUP_BITS, LITERAL_TYPE_ID, TOTAL_BITS_FIELD,
    TYPE_ID_BITS, VERSION_BITS,
};
use crate::transmission::Transmission;

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Continuation flag inside a literal group.
const GROUP_CONTINUES: u64 = 0b1_0000;

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Deepest allowed nesting; the top-level packet is depth 1
    pub max_depth: usize,
}

impl DecoderConfig {
    /// No nesting limit. Pathological input may overflow the stack.
    pub fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decodes transmissions into packet trees.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode the single top-level packet of a transmission.
    ///
    /// Bits after the packet are padding and are ignored.
    pub fn decode(&self, transmission: &Transmission) -> Result<Packet> {
        self.decode_with_metrics(transmission).map(|(packet, _)| packet)
    }

    /// Decode the top-level packet and report what the decode saw.
    pub fn decode_with_metrics(
        &self,
        transmission: &Transmission,
    ) -> Result<(Packet, DecodeMetrics)> {
        let mut metrics = DecodeMetrics::new();
        let mut reader = transmission.reader();

        let packet = self.parse(&mut reader, 1, &mut metrics)?;

        metrics.total_bits = reader.bit_len();
        metrics.bits_consumed = reader.position();
        metrics.padding_bits = reader.remaining();
        metrics.padding_is_zero = reader.rest_is_zero();
        metrics.complete();

        if !metrics.padding_is_zero {
            warn!(
                "non-zero padding after top-level packet ({} bits at offset {})",
                metrics.padding_bits, metrics.bits_consumed
            );
        }
        debug!(
            "decoded {} packets in {} of {} bits (max depth {})",
            metrics.packets, metrics.bits_consumed, metrics.total_bits, metrics.max_depth
        );

        Ok((packet, metrics))
    }

    /// Decode one packet starting at the reader's position.
    ///
    /// On success the reader sits just past the packet; trailing bits are
    /// left for the caller.
    pub fn parse_packet(&self, reader: &mut BitReader<'_>) -> Result<Packet> {
        let mut metrics = DecodeMetrics::new();
        self.parse(reader, 1, &mut metrics)
    }

    fn parse(
        &self,
        reader: &mut BitReader<'_>,
        depth: usize,
        metrics: &mut DecodeMetrics,
    ) -> Result<Packet> {
        if depth > self.config.max_depth {
            return Err(PacketError::DepthExceeded {
                limit: self.config.max_depth,
            }
            .into());
        }

        let offset = reader.position();
        let version = reader.read_bits(VERSION_BITS)? as u8;
        let type_id = reader.read_bits(TYPE_ID_BITS)? as u8;
        trace!("packet @{}: version {} type {} depth {}", offset, version, type_id, depth);

        if type_id == LITERAL_TYPE_ID {
            let (value, groups) = read_literal(reader)?;
            metrics.record_literal(depth, groups);
            return Ok(Packet::Literal { version, value });
        }

        let opcode = OpCode::try_from(type_id)?;
        metrics.record_operator(depth, opcode);

        let children = if reader.read_bit()? {
            let count = reader.read_bits(CHILD_COUNT_FIELD)? as usize;
            let mut children = Vec::with_capacity(count);
            for _ in 0..count {
                children.push(self.parse(reader, depth + 1, metrics)?);
            }
            children
        } else {
            let declared = reader.read_bits(TOTAL_BITS_FIELD)? as usize;
            let start = reader.position();
            let mut children = Vec::new();
            while reader.position() - start < declared {
                children.push(self.parse(reader, depth + 1, metrics)?);
                let consumed = reader.position() - start;
                if consumed > declared {
                    return Err(PacketError::LengthOverrun { declared, consumed }.into());
                }
            }
            children
        };

        check_arity(opcode, children.len())?;

        Ok(Packet::Operator {
            version,
            opcode,
            children,
        })
    }
}

/// Read literal groups until one has a clear continuation bit.
///
/// Returns the value and the number of groups read.
fn read_literal(reader: &mut BitReader<'_>) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut groups = 0usize;

    loop {
        let group = reader.read_bits(LITERAL_GROUP_BITS)?;
        groups += 1;

        if value >> 60 != 0 {
            return Err(PacketError::LiteralOverflow { bits: groups * 4 }.into());
        }
        value = (value << 4) | (group & 0xF);

        if group & GROUP_CONTINUES == 0 {
            return Ok((value, groups));
        }
    }
}

fn check_arity(opcode: OpCode, actual: usize) -> Result<()> {
    if let Some(expected) = opcode.required_children() {
        if actual != expected {
            return Err(PacketError::Arity {
                opcode,
                expected,
                actual,
            }
            .into());
        }
    }
    if opcode.needs_children() && actual == 0 {
        return Err(PacketError::EmptyOperator { opcode }.into());
    }
    Ok(())
}

/// Decode one packet from `reader` with the default configuration.
pub fn decode_packet(reader: &mut BitReader<'_>) -> Result<Packet> {
    Decoder::default().parse_packet(reader)
}
