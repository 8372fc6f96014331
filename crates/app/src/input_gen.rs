//! Random transmission generation.
//!
//! When no input is given we generate a well-formed packet tree from a
//! seeded RNG so every run is reproducible from its printed seed.
//!
//! # Design
//!
//! Generated trees:
//! - Always give comparison operators exactly two children
//! - Always give Minimum/Maximum at least one child
//! - Stop nesting at `max_depth` (literals below that)
//! - Mix both framing types via `LengthMode::Alternate`

use bits_decoder_core::{LengthMode, OpCode, Packet, Result, Transmission};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Chance that a nested (non-root) packet is a literal.
const LITERAL_WEIGHT: f64 = 0.4;

/// Widest literal the generator emits, in bits.
const MAX_LITERAL_BITS: u32 = 16;

/// Generate a random well-formed packet tree.
///
/// The root is an operator unless `max_depth` is 0. The tree is at most
/// `max_depth + 1` packets deep and always evaluates without overflow.
pub fn generate_packet(seed: u64, max_depth: usize) -> Packet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    gen_packet(&mut rng, 0, max_depth, u64::BITS)
}

/// Generate and encode a random transmission.
pub fn generate_transmission(seed: u64, max_depth: usize) -> Result<Transmission> {
    generate_packet(seed, max_depth).encode(LengthMode::Alternate)
}

/// Build a subtree whose value is below `2^budget`.
///
/// Sum children get two bits less (at most four addends), Product children
/// split the budget between them, and comparisons need one bit for their
/// 0/1 result.
fn gen_packet(rng: &mut ChaCha8Rng, depth: usize, max_depth: usize, budget: u32) -> Packet {
    let version = rng.gen_range(0..=7);

    if budget == 0 || depth >= max_depth || (depth > 0 && rng.gen_bool(LITERAL_WEIGHT)) {
        let bits = rng.gen_range(0..=budget.min(MAX_LITERAL_BITS));
        return Packet::literal(version, rng.gen_range(0..(1u64 << bits)));
    }

    let opcode = OpCode::ALL[rng.gen_range(0..OpCode::ALL.len())];
    let count = match opcode.required_children() {
        Some(n) => n,
        None => rng.gen_range(1..=4),
    };

    let child_budget = match opcode {
        OpCode::Sum => budget.saturating_sub(2),
        OpCode::Product => budget / count as u32,
        _ => budget,
    };

    let children = (0..count)
        .map(|_| gen_packet(rng, depth + 1, max_depth, child_budget))
        .collect();
    Packet::operator(version, opcode, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bits_decoder_core::{evaluate, Decoder};
    use std::collections::HashSet;

    #[test]
    fn test_determinism() {
        let a = generate_transmission(12345, 4).unwrap();
        let b = generate_transmission(12345, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let distinct: HashSet<String> = (0..10)
            .map(|seed| generate_transmission(seed, 3).unwrap().to_hex())
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_generated_trees_decode() {
        for seed in 0..50 {
            let packet = generate_packet(seed, 4);
            let transmission = packet.encode(LengthMode::Alternate).unwrap();
            let decoded = Decoder::default().decode(&transmission).unwrap();
            assert_eq!(decoded, packet, "seed {}", seed);
            assert!(packet.depth() <= 5);
        }
    }

    #[test]
    fn test_generated_trees_evaluate() {
        for max_depth in [2, 4, 6] {
            for seed in 0..2000 {
                let transmission = generate_transmission(seed, max_depth).unwrap();
                let decoded = Decoder::default().decode(&transmission).unwrap();
                assert!(
                    evaluate(&decoded).is_ok(),
                    "seed {} depth {}: {}",
                    seed,
                    max_depth,
                    decoded
                );
            }
        }
    }

    #[test]
    fn test_budget_bounds_value() {
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let packet = gen_packet(&mut rng, 0, 5, 20);
            assert!(evaluate(&packet).unwrap() < 1 << 20, "seed {}: {}", seed, packet);
        }
    }

    #[test]
    fn test_zero_depth_is_literal() {
        assert!(generate_packet(7, 0).is_literal());
        assert!(!generate_packet(7, 2).is_literal());
    }
}
