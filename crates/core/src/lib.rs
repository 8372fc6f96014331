//! bits-decoder-core: decoder and evaluator for bit-packed transmission packets
//!
//! A transmission is a hex string encoding one packet plus zero padding.
//! Each packet is either a literal value or an operator applied to nested
//! child packets, with boundaries carried entirely by in-band length fields.
//!
//! # Architecture
//!
//! The pipeline runs leaves first:
//! - `transmission`: hex text to bit sequence
//! - `bitio`: bit cursor (and the writer used by the encoder)
//! - `decoder`: recursive descent from cursor to packet tree
//! - `packet`: the packet tree, opcodes, and the encoder
//! - `eval`: version sum and evaluation over a decoded tree
//! - `metrics`: what a decode observed
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and surfaced to the caller
//! - **No guessing**: Malformed framing or arity is an error, never a default
//! - **Bounded recursion**: Nesting depth is capped by `DecoderConfig`
//!
//! # Example
//! ```
//! use bits_decoder_core::{evaluate_hex, version_sum_hex};
//!
//! assert_eq!(version_sum_hex("8A004A801A8002F478").unwrap(), 16);
//! assert_eq!(evaluate_hex("9C0141080250320F1802104A08").unwrap(), 1);
//! ```

pub mod bitio;
pub mod decoder;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod packet;
pub mod transmission;

// Re-export commonly used types
pub use decoder::{Decoder, DecoderConfig};
pub use error::{Error, Result};
pub use eval::{evaluate, version_sum};
pub use packet::{LengthMode, OpCode, Packet};
pub use transmission::Transmission;

/// Decode the top-level packet of a hex transmission with default settings.
pub fn decode_hex(hex: &str) -> Result<Packet> {
    let transmission = Transmission::from_hex(hex)?;
    Decoder::default().decode(&transmission)
}

/// Version sum of a hex transmission.
pub fn version_sum_hex(hex: &str) -> Result<u64> {
    Ok(version_sum(&decode_hex(hex)?))
}

/// Evaluated value of a hex transmission.
pub fn evaluate_hex(hex: &str) -> Result<u64> {
    evaluate(&decode_hex(hex)?)
}
