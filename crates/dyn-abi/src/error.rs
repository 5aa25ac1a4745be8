use thiserror::Error;

/// Errors raised while encoding or decoding an [`crate::AbiValue`] against
/// an [`crate::AbiType`] schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AbiError {
    /// A value's shape did not match the schema it was encoded against
    /// (e.g. a `Tuple` value encoded against an `Array` schema).
    #[error("value does not match schema {schema}")]
    SchemaMismatch {
        /// The schema's canonical type string.
        schema: String,
    },

    /// A tuple or fixed-size array had the wrong number of elements for
    /// its schema.
    #[error("expected {expected} element(s), found {actual}")]
    ArityMismatch {
        /// Elements the schema requires.
        expected: usize,
        /// Elements the value actually had.
        actual: usize,
    },

    /// A word offset read from the head region exceeded `usize` (on
    /// platforms narrower than 256 bits) or was otherwise unrepresentable.
    #[error("offset word at head position {head_offset} does not fit in a pointer-sized offset")]
    OffsetTooLarge {
        /// Byte offset, within the buffer being decoded, of the
        /// offending offset word.
        head_offset: usize,
    },

    /// A declared offset pointed past the end of the buffer.
    #[error("offset {offset} exceeds buffer length {buffer_len}")]
    OffsetOutOfBounds {
        /// The offending offset.
        offset: usize,
        /// Length of the buffer it was read against.
        buffer_len: usize,
    },

    /// A declared length, combined with its starting offset, read past
    /// the end of the buffer.
    #[error(
        "declared length {length} starting at offset {offset} exceeds buffer length {buffer_len}"
    )]
    LengthOutOfBounds {
        /// Offset the length was declared at.
        offset: usize,
        /// Declared length.
        length: usize,
        /// Length of the buffer it was read against.
        buffer_len: usize,
    },

    /// The buffer ran out before a fixed-width word could be read.
    #[error("need {required} byte(s) at offset {offset}, have {available}")]
    BufferTooShort {
        /// Offset the read was attempted at.
        offset: usize,
        /// Bytes required.
        required: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// A `bytesN` word's right-hand padding (bytes `N..32`) was not zero.
    #[error("bytes{width} padding was not zero")]
    NonZeroPadding {
        /// The fixed-bytes width.
        width: usize,
    },

    /// An `address` word's left-hand padding (bytes `0..12`) was not zero.
    #[error("address word had non-zero bytes in its leading 12 bytes")]
    NonZeroAddressPadding,

    /// A `bool` word was neither `0` nor `1`.
    #[error("bool word was not 0 or 1")]
    InvalidBool,

    /// A decoded `string` was not valid UTF-8.
    #[error("decoded string was not valid UTF-8")]
    InvalidUtf8,
}
