use thiserror::Error;

/// Errors produced while constructing or parsing a primitive value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PrimitiveError {
    /// The input was missing the `0x` prefix required of all hex forms.
    #[error("hex string {0:?} is missing the 0x prefix")]
    MissingPrefix(String),

    /// The input did not decode as hex at all.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// The input decoded to hex but had the wrong byte length for the
    /// target type.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Number of bytes the target type requires.
        expected: usize,
        /// Number of bytes actually present.
        actual: usize,
    },

    /// A hex digit string had odd length, which cannot represent whole
    /// bytes.
    #[error("hex string has odd length: {0:?}")]
    OddLength(String),
}
