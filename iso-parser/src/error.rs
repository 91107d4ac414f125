//! Error types for the ISO 20022 decoder

use iso_core::MessageIdentifier;
use thiserror::Error;

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Decoder errors
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Markup is not well-formed XML
    #[error("Malformed input at byte {position}: {message}")]
    MalformedInput {
        /// Byte offset where the problem was detected
        position: u64,
        /// Description from the tokenizer
        message: String,
    },

    /// Document carries a DOCTYPE declaration
    #[error("Document type declarations are not accepted")]
    DtdNotAllowed,

    /// Element other than the one the message structure requires
    #[error("Unexpected element: expected <{expected}>, found <{found}>")]
    UnexpectedElement {
        /// Required element
        expected: String,
        /// Element actually present
        found: String,
    },

    /// Required child element absent
    #[error("Missing field {field} in {aggregate}")]
    MissingField {
        /// Aggregate being decoded
        aggregate: &'static str,
        /// Wire name of the missing element or attribute
        field: &'static str,
    },

    /// Scalar text that cannot be read as the expected type
    #[error("Invalid value for {field} in {aggregate}: '{value}'")]
    InvalidValue {
        /// Aggregate being decoded
        aggregate: &'static str,
        /// Wire name of the element
        field: &'static str,
        /// Offending text
        value: String,
    },

    /// Value type rejected the element content
    #[error("Validation of {field} in {aggregate} failed: {source}")]
    Validation {
        /// Aggregate being decoded
        aggregate: &'static str,
        /// Wire name of the element
        field: &'static str,
        /// Value type error
        #[source]
        source: iso_core::Error,
    },

    /// Namespace is not in the supported version table
    #[error("Unsupported version: namespace '{namespace}' (supported: {})", .supported.join(", "))]
    UnsupportedVersion {
        /// Namespace found in the document
        namespace: String,
        /// Supported version tags
        supported: Vec<String>,
    },

    /// Root namespace differs from the decoder's schema
    #[error("Namespace mismatch: expected '{expected}', found '{found}'")]
    NamespaceMismatch {
        /// Namespace of the decoder's schema
        expected: String,
        /// Namespace of the document
        found: String,
    },

    /// Source already consumed and cannot be rewound
    #[error("Source is not seekable and has already been consumed")]
    NotSeekable,

    /// Identifier registered twice without replace intent
    #[error("Parser already registered for {0}")]
    AlreadyRegistered(MessageIdentifier),

    /// No parser registered for the identifier
    #[error("No parser registered for {0}")]
    NotRegistered(MessageIdentifier),

    /// Registered parser produces a different document type
    #[error("Type mismatch: requested {expected}, registered parser produces {actual}")]
    TypeMismatch {
        /// Requested document type
        expected: &'static str,
        /// Registered document type
        actual: &'static str,
    },

    /// Value type or consistency error outside a specific field
    #[error("Document error: {0}")]
    Core(#[from] iso_core::Error),

    /// Streaming stopped by its cancellation token
    #[error("Decoding cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::MalformedInput { .. } | Error::DtdNotAllowed => "malformed",
            Error::UnexpectedElement { .. } => "structure",
            Error::MissingField { .. } => "missing_field",
            Error::InvalidValue { .. } | Error::Validation { .. } => "validation",
            Error::UnsupportedVersion { .. } | Error::NamespaceMismatch { .. } => "version",
            Error::NotSeekable => "not_seekable",
            Error::AlreadyRegistered(_) | Error::NotRegistered(_) | Error::TypeMismatch { .. } => {
                "registry"
            }
            Error::Core(_) => "consistency",
            Error::Cancelled => "cancelled",
            Error::Config(_) | Error::Metrics(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_lists_supported() {
        let err = Error::UnsupportedVersion {
            namespace: "urn:iso:std:iso:20022:tech:xsd:pain.001.001.02".to_string(),
            supported: vec!["003".to_string(), "009".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported version: namespace 'urn:iso:std:iso:20022:tech:xsd:pain.001.001.02' (supported: 003, 009)"
        );
        assert_eq!(err.kind(), "version");
    }

    #[test]
    fn test_missing_field_names_aggregate() {
        let err = Error::MissingField {
            aggregate: "GroupHeader",
            field: "MsgId",
        };
        assert_eq!(err.to_string(), "Missing field MsgId in GroupHeader");
    }
}
