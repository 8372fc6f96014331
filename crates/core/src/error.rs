//! Error types for the transmission decoder.
//!
//! All operations return structured errors rather than panicking.
//! Nothing is recovered internally: an error raised by the innermost
//! bit read or child parse reaches the top-level caller unchanged.

use thiserror::Error;

use crate::packet::OpCode;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits (truncated transmissions)
/// - Hex: the textual transmission is not hexadecimal
/// - Packet: structural violations found while decoding or encoding
/// - Eval: arity or overflow violations found while evaluating
/// - I/O: loading the transmission from disk
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of the transmission)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Transmission text contained a non-hex character
    #[error("hex error: {0}")]
    Hex(#[from] HexError),

    /// Malformed packet structure
    #[error("malformed packet: {0}")]
    Packet(#[from] PacketError),

    /// Evaluation failed
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True if this error means the transmission ran out of bits.
    pub fn is_out_of_bits(&self) -> bool {
        matches!(self, Error::BitIo(BitIoError::OutOfBits { .. }))
    }

    /// True if this error is a structural packet violation.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Packet(_))
    }
}

/// Bit-level I/O errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitIoError {
    /// Attempted to read more bits than remain
    #[error("out of bits: requested {requested}, available {available}")]
    OutOfBits { requested: usize, available: usize },

    /// Invalid bit count (more than 64 bits in one read or write)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Errors converting transmission text into bits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// Character is not a hexadecimal digit
    #[error("invalid hex digit {found:?} at position {position}")]
    InvalidDigit { position: usize, found: char },
}

/// Structural packet errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Type id outside the known set
    #[error("unknown type id {0}")]
    UnknownTypeId(u8),

    /// Children of a total-bit-length operator overshot the declared length
    #[error("children consumed {consumed} bits, declared length is {declared}")]
    LengthOverrun { declared: usize, consumed: usize },

    /// Comparison operator without exactly two children
    #[error("{opcode} expects {expected} children, got {actual}")]
    Arity {
        opcode: OpCode,
        expected: usize,
        actual: usize,
    },

    /// Minimum/Maximum without any children
    #[error("{opcode} has no children")]
    EmptyOperator { opcode: OpCode },

    /// Literal value wider than 64 bits
    #[error("literal carries {bits} data bits, at most 64 supported")]
    LiteralOverflow { bits: usize },

    /// Nesting deeper than the configured limit
    #[error("packet nesting exceeds depth limit {limit}")]
    DepthExceeded { limit: usize },

    /// Value does not fit its fixed-width header field (encoder side)
    #[error("{field} value {value} does not fit in {bits} bits")]
    FieldTooWide {
        field: &'static str,
        value: u64,
        bits: usize,
    },
}

/// Evaluation errors.
///
/// The decoder rejects malformed arity up front, so `Arity` and
/// `EmptyOperator` only fire for hand-built trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Operator evaluated with the wrong number of children
    #[error("{opcode} expects {expected} children, got {actual}")]
    Arity {
        opcode: OpCode,
        expected: usize,
        actual: usize,
    },

    /// Minimum/Maximum evaluated with no children
    #[error("{opcode} has no children")]
    EmptyOperator { opcode: OpCode },

    /// Result does not fit in 64 bits
    #[error("{opcode} overflowed u64")]
    Overflow { opcode: OpCode },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
