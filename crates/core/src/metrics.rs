//! Metrics for a single decode.
//!
//! The decoder fills a `DecodeMetrics` as it walks the transmission:
//! - Packet counts (literals, operators, per-opcode breakdown)
//! - Nesting depth
//! - Bit accounting (consumed, padding, literal payload)
//! - Timing
//!
//! # Thread Safety
//!
//! Each decode owns its metrics; nothing is shared between decodes.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::packet::OpCode;

/// What one decode observed.
#[derive(Debug, Clone)]
pub struct DecodeMetrics {
    // === Timing ===
    /// When the decode started
    pub start_time: Instant,

    /// When the decode ended (set on completion)
    pub end_time: Option<Instant>,

    // === Packets ===
    /// Packets decoded, at every depth
    pub packets: u64,

    /// Literal packets decoded
    pub literals: u64,

    /// Operator packets decoded
    pub operators: u64,

    /// Operators decoded, per opcode
    pub opcode_counts: BTreeMap<OpCode, u64>,

    /// Deepest nesting seen (top-level packet is 1)
    pub max_depth: usize,

    /// 5-bit literal groups read
    pub literal_groups: u64,

    // === Bits ===
    /// Bits in the transmission
    pub total_bits: usize,

    /// Bits occupied by the top-level packet
    pub bits_consumed: usize,

    /// Bits after the top-level packet
    pub padding_bits: usize,

    /// Whether every padding bit was zero
    pub padding_is_zero: bool,
}

impl DecodeMetrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            packets: 0,
            literals: 0,
            operators: 0,
            opcode_counts: BTreeMap::new(),
            max_depth: 0,
            literal_groups: 0,
            total_bits: 0,
            bits_consumed: 0,
            padding_bits: 0,
            padding_is_zero: true,
        }
    }

    pub fn record_literal(&mut self, depth: usize, groups: usize) {
        self.packets += 1;
        self.literals += 1;
        self.literal_groups += groups as u64;
        self.max_depth = self.max_depth.max(depth);
    }

    pub fn record_operator(&mut self, depth: usize, opcode: OpCode) {
        self.packets += 1;
        self.operators += 1;
        *self.opcode_counts.entry(opcode).or_insert(0) += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Mark the decode as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Share of consumed bits that carry literal data nibbles.
    ///
    /// Returns 0.0 if nothing was consumed.
    pub fn payload_ratio(&self) -> f64 {
        if self.bits_consumed == 0 {
            0.0
        } else {
            (self.literal_groups * 4) as f64 / self.bits_consumed as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Decode Summary ===");
        println!("Duration: {} us", self.duration().as_micros());
        println!();

        println!("=== Packets ===");
        println!("Total: {}", self.packets);
        println!("Literals: {} ({} groups)", self.literals, self.literal_groups);
        println!("Operators: {}", self.operators);
        for (opcode, count) in &self.opcode_counts {
            println!("  {:<8} {}", opcode.mnemonic(), count);
        }
        println!("Max depth: {}", self.max_depth);
        println!();

        println!("=== Bits ===");
        println!("Transmission: {}", self.total_bits);
        println!("Consumed: {}", self.bits_consumed);
        println!(
            "Padding: {} ({})",
            self.padding_bits,
            if self.padding_is_zero { "zero" } else { "NON-ZERO" }
        );
        println!("Payload ratio: {:.1}%", self.payload_ratio() * 100.0);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_us={}\n\
             packets={}\n\
             literals={}\n\
             operators={}\n\
             max_depth={}\n\
             total_bits={}\n\
             bits_consumed={}\n\
             padding_bits={}\n\
             padding_is_zero={}\n\
             payload_ratio={:.4}\n",
            self.duration().as_micros(),
            self.packets,
            self.literals,
            self.operators,
            self.max_depth,
            self.total_bits,
            self.bits_consumed,
            self.padding_bits,
            self.padding_is_zero,
            self.payload_ratio(),
        )
    }
}

impl Default for DecodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
