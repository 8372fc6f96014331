//! Tree walks over decoded packets: version sum and evaluation.
//!
//! Both are pure and recurse once per nesting level, so a tree produced by
//! a depth-limited `Decoder` walks within the same bound.

use crate::error::{EvalError, Result};
use crate::packet::{OpCode, Packet};

/// Sum of the version field over every packet in the tree.
pub fn version_sum(packet: &Packet) -> u64 {
    match packet {
        Packet::Literal { version, .. } => *version as u64,
        Packet::Operator {
            version, children, ..
        } => *version as u64 + children.iter().map(version_sum).sum::<u64>(),
    }
}

/// Compute the numeric value of a packet.
///
/// Children are evaluated left to right, all of them, before the opcode is
/// applied. Arithmetic is checked; a result that does not fit in `u64` is
/// an error, never a wrapped value.
///
/// # Errors
/// - `EvalError::Arity` if a comparison does not have exactly two children
/// - `EvalError::EmptyOperator` for Minimum/Maximum without children
/// - `EvalError::Overflow` if Sum or Product exceeds `u64::MAX`
pub fn evaluate(packet: &Packet) -> Result<u64> {
    let (opcode, children) = match packet {
        Packet::Literal { value, .. } => return Ok(*value),
        Packet::Operator {
            opcode, children, ..
        } => (*opcode, children),
    };

    if let Some(expected) = opcode.required_children() {
        if children.len() != expected {
            return Err(EvalError::Arity {
                opcode,
                expected,
                actual: children.len(),
            }
            .into());
        }
    }

    let values = children.iter().map(evaluate).collect::<Result<Vec<u64>>>()?;
    apply(opcode, &values)
}

fn apply(opcode: OpCode, values: &[u64]) -> Result<u64> {
    let overflow = EvalError::Overflow { opcode };
    let empty = EvalError::EmptyOperator { opcode };

    let result = match opcode {
        OpCode::Sum => values
            .iter()
            .try_fold(0u64, |acc, v| acc.checked_add(*v))
            .ok_or(overflow)?,
        OpCode::Product => values
            .iter()
            .try_fold(1u64, |acc, v| acc.checked_mul(*v))
            .ok_or(overflow)?,
        OpCode::Minimum => values.iter().copied().min().ok_or(empty)?,
        OpCode::Maximum => values.iter().copied().max().ok_or(empty)?,
        OpCode::GreaterThan => (values[0] > values[1]) as u64,
        OpCode::LessThan => (values[0] < values[1]) as u64,
        OpCode::EqualTo => (values[0] == values[1]) as u64,
    };
    Ok(result)
}
