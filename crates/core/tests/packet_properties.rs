//! Property-based tests for the packet decoder.
//!
//! These tests use proptest to verify invariants hold for arbitrary trees:
//! - Encoding then decoding reproduces the tree in every framing mode
//! - Literal groups concatenate into the original value
//! - Version sums are additive over children
//! - Both length types consume exactly what their header declares
//! - Arbitrary hex never panics the decoder

use bits_decoder_core::{
    bitio::BitWriter,
    decode_hex, evaluate,
    packet::{CHILD_COUNT_FIELD, TOTAL_BITS_FIELD},
    version_sum, Decoder, LengthMode, OpCode, Packet,
};
use proptest::prelude::*;

// Strategy for an operator over children drawn from `inner`, honoring arity
fn operator_over(inner: BoxedStrategy<Packet>) -> BoxedStrategy<Packet> {
    prop_oneof![
        (
            0u8..=7,
            prop::sample::select(vec![OpCode::Sum, OpCode::Product]),
            prop::collection::vec(inner.clone(), 0..4),
        )
            .prop_map(|(v, op, children)| Packet::operator(v, op, children)),
        (
            0u8..=7,
            prop::sample::select(vec![OpCode::Minimum, OpCode::Maximum]),
            prop::collection::vec(inner.clone(), 1..4),
        )
            .prop_map(|(v, op, children)| Packet::operator(v, op, children)),
        (
            0u8..=7,
            prop::sample::select(vec![OpCode::GreaterThan, OpCode::LessThan, OpCode::EqualTo]),
            inner.clone(),
            inner,
        )
            .prop_map(|(v, op, a, b)| Packet::operator(v, op, vec![a, b])),
    ]
    .boxed()
}

// Strategy for well-formed packet trees
fn packet_strategy() -> BoxedStrategy<Packet> {
    let leaf = (0u8..=7, any::<u64>()).prop_map(|(version, value)| Packet::literal(version, value));
    leaf.prop_recursive(4, 32, 3, |inner| operator_over(inner.boxed()))
        .boxed()
}

// Strategy for trees whose root is an operator
fn operator_strategy() -> BoxedStrategy<Packet> {
    operator_over(packet_strategy())
}

fn mode_strategy() -> impl Strategy<Value = LengthMode> {
    prop_oneof![
        Just(LengthMode::TotalBits),
        Just(LengthMode::ChildCount),
        Just(LengthMode::Alternate),
    ]
}

fn encoded_bits(packet: &Packet, mode: LengthMode, depth: usize) -> usize {
    let mut writer = BitWriter::new();
    packet.write_to(&mut writer, mode, depth).unwrap();
    writer.bit_len()
}

#[test]
fn prop_encode_decode_identity() {
    proptest!(|(packet in packet_strategy(), mode in mode_strategy())| {
        let transmission = packet.encode(mode).unwrap();
        let decoded = Decoder::default().decode(&transmission).unwrap();
        prop_assert_eq!(&decoded, &packet);
        prop_assert_eq!(evaluate(&decoded).ok(), evaluate(&packet).ok());
    });
}

#[test]
fn prop_literal_groups_concatenate() {
    proptest!(|(version in 0u8..=7, value in any::<u64>())| {
        let transmission = Packet::literal(version, value).encode(LengthMode::default()).unwrap();
        let (decoded, metrics) = Decoder::default().decode_with_metrics(&transmission).unwrap();

        prop_assert_eq!(decoded, Packet::literal(version, value));

        // reference decode: nibbles as a big-endian number
        let groups = (64 - value.leading_zeros() as usize).div_ceil(4).max(1);
        prop_assert_eq!(metrics.literal_groups, groups as u64);
        prop_assert_eq!(metrics.bits_consumed, 6 + 5 * groups);

        let mut reader = transmission.reader();
        reader.read_bits(6).unwrap();
        let mut reference = 0u128;
        loop {
            let group = reader.read_bits(5).unwrap();
            reference = (reference << 4) | (group & 0xF) as u128;
            if group & 0x10 == 0 {
                break;
            }
        }
        prop_assert_eq!(reference, value as u128);
    });
}

#[test]
fn prop_version_sum_additive() {
    proptest!(|(packet in packet_strategy())| {
        let children_sum: u64 = packet.children().iter().map(version_sum).sum();
        prop_assert_eq!(version_sum(&packet), packet.version() as u64 + children_sum);
    });
}

#[test]
fn prop_total_bits_consumed_exactly() {
    proptest!(|(packet in operator_strategy())| {
        let transmission = packet.encode(LengthMode::TotalBits).unwrap();

        let mut reader = transmission.reader();
        reader.read_bits(6).unwrap();
        prop_assert!(!reader.read_bit().unwrap());
        let declared = reader.read_bits(TOTAL_BITS_FIELD).unwrap() as usize;

        let expected: usize = packet
            .children()
            .iter()
            .map(|c| encoded_bits(c, LengthMode::TotalBits, 1))
            .sum();
        prop_assert_eq!(declared, expected);

        let start = reader.position();
        let decoder = Decoder::default();
        let mut children = Vec::new();
        while reader.position() - start < declared {
            children.push(decoder.parse_packet(&mut reader).unwrap());
        }
        prop_assert_eq!(reader.position() - start, declared);
        prop_assert_eq!(children.as_slice(), packet.children());
    });
}

#[test]
fn prop_child_count_consumed_exactly() {
    proptest!(|(packet in operator_strategy())| {
        let transmission = packet.encode(LengthMode::ChildCount).unwrap();

        let mut reader = transmission.reader();
        reader.read_bits(6).unwrap();
        prop_assert!(reader.read_bit().unwrap());
        let count = reader.read_bits(CHILD_COUNT_FIELD).unwrap() as usize;
        prop_assert_eq!(count, packet.children().len());

        let decoded = Decoder::default().decode(&transmission).unwrap();
        prop_assert_eq!(decoded.children().len(), count);
    });
}

#[test]
fn prop_decoder_stops_after_packet() {
    proptest!(|(packet in packet_strategy(), mode in mode_strategy())| {
        let transmission = packet.encode(mode).unwrap();
        let (_, metrics) = Decoder::default().decode_with_metrics(&transmission).unwrap();

        prop_assert_eq!(metrics.bits_consumed, encoded_bits(&packet, mode, 0));
        prop_assert!(metrics.padding_bits < 8);
        prop_assert!(metrics.padding_is_zero);
        prop_assert_eq!(metrics.packets as usize, packet.packet_count());
        prop_assert_eq!(metrics.max_depth, packet.depth());
    });
}

#[test]
fn prop_arbitrary_hex_never_panics() {
    proptest!(|(hex in "[0-9a-fA-F]{0,64}")| {
        if let Ok(packet) = decode_hex(&hex) {
            let _ = version_sum(&packet);
            let _ = evaluate(&packet);
        }
    });
}
