use thiserror::Error;

/// Errors produced while decoding (or, more rarely, encoding) RLP data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A length or value claimed more bytes than were available.
    #[error("invalid encoding at offset {offset}: required {required} bytes, {available} available")]
    InvalidEncoding {
        /// Byte offset, within the buffer passed to the failing decode
        /// call, at which the short read was detected.
        offset: usize,
        /// Bytes required to satisfy the declared length.
        required: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// A length prefix used a non-minimal form (e.g. a long-form string
    /// header for a length that fits in the short form, or a leading zero
    /// byte in a length-of-length or integer payload).
    #[error("non-minimal RLP encoding, prefix byte {prefix:#04x}")]
    NonMinimal {
        /// The offending prefix byte.
        prefix: u8,
    },

    /// A list's declared payload length did not exactly bound its items;
    /// some item's decode reached past the list's declared end.
    #[error(
        "list payload declared to end at byte {declared_end}, but an item's \
         decoding reached byte {actual_end}"
    )]
    ListLengthMismatch {
        /// Offset (from the start of the buffer passed to the list's
        /// decode call) at which the list's payload was declared to end.
        declared_end: usize,
        /// Offset at which decoding the overrunning item would have
        /// finished.
        actual_end: usize,
    },

    /// Expected a list header, found a string header.
    #[error("expected a list, found a string")]
    UnexpectedString,

    /// Expected a string header, found a list header.
    #[error("expected a string, found a list")]
    UnexpectedList,

    /// A fixed-width integer extractor was asked to decode a payload too
    /// large for its target width.
    #[error(
        "{type_name} cannot hold a {payload_len}-byte RLP integer; use an \
         arbitrary-precision extractor instead"
    )]
    IntegerOverflow {
        /// Name of the target integer type.
        type_name: &'static str,
        /// Length of the offending payload, in bytes.
        payload_len: usize,
    },

    /// Bytes remained after decoding the single top-level item a caller
    /// asked for.
    #[error("{remaining} unconsumed byte(s) after decoding the top-level item")]
    TrailingBytes {
        /// Number of bytes left over.
        remaining: usize,
    },

    /// A `bytesN`/fixed-length type did not receive exactly `N` bytes.
    #[error("expected exactly {expected} bytes, got {actual}")]
    UnexpectedLength {
        /// Bytes expected.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },
}
