//! The crate-wide error taxonomy.
//!
//! Every fallible operation in `barewire` returns one of these six variants.
//! Failures are surfaced to the nearest caller that can diagnose them: there
//! are no retries, no local recovery, and no silent coercion anywhere in the
//! crate.

use thiserror::Error;

/// The error type shared by the schema validator, the wire codec, and the
/// typed view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Raised by the schema validator; wraps the set of per-type violations.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// Varint overflow, invalid bool/optional/union tag, invalid UTF-8,
    /// truncated input.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// Buffer overflow, un-encodable value.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// A view access disagreed with the declared schema.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: String,
        actual: String,
    },

    /// An explicit index check in region slicing or view access failed.
    #[error("out of bounds: offset {offset}, region length {length}")]
    OutOfBounds { offset: usize, length: usize },

    /// Catch-all for structural errors, e.g. an unknown field path.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Renders the error as a human-readable string. This is the crate's
    /// only user-visible error channel, per the error-handling design.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_matches_display() {
        let err = Error::InvalidValue("bad path".to_string());
        assert_eq!(err.render(), err.to_string());
    }

    #[test]
    fn type_mismatch_message_contains_both_sides() {
        let err = Error::TypeMismatch {
            expected: "u32".to_string(),
            actual: "string".to_string(),
        };
        let msg = err.render();
        assert!(msg.contains("u32"));
        assert!(msg.contains("string"));
    }
}
