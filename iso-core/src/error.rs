//! Error types for ISO 20022 value types

use thiserror::Error;

/// Result type for value type construction and arithmetic
pub type Result<T> = std::result::Result<T, Error>;

/// Value type errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Value has the wrong length
    #[error("Invalid {kind} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Value type name
        kind: &'static str,
        /// Accepted lengths
        expected: &'static str,
        /// Length after normalization
        actual: usize,
    },

    /// Value does not match the structural pattern
    #[error("Invalid {kind} format: '{value}'")]
    InvalidFormat {
        /// Value type name
        kind: &'static str,
        /// Offending (normalized) value
        value: String,
    },

    /// Check digits do not verify
    #[error("Invalid {kind} checksum: '{value}'")]
    ChecksumMismatch {
        /// Value type name
        kind: &'static str,
        /// Offending (normalized) value
        value: String,
    },

    /// Arithmetic between two different currencies
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Left operand currency
        left: String,
        /// Right operand currency
        right: String,
    },

    /// Division of money by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Decimal overflow
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: &'static str,
    },

    /// Message identifier or namespace could not be parsed
    #[error("Invalid message identifier: '{0}'")]
    InvalidMessageIdentifier(String),

    /// Declared totals disagree with the decoded content
    #[error("Inconsistent {scope}: {detail}")]
    Inconsistent {
        /// Aggregate the check ran on
        scope: String,
        /// What disagreed
        detail: String,
    },
}
