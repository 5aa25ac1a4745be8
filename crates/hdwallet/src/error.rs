use thiserror::Error;

/// Errors from mnemonic parsing, seed derivation, or BIP-32 key
/// derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A mnemonic phrase did not have a word count BIP-39 permits
    /// (12, 15, 18, 21, or 24).
    #[error("mnemonic has {actual} words, expected one of 12, 15, 18, 21, 24")]
    InvalidWordCount {
        /// The word count found.
        actual: usize,
    },

    /// A word in the phrase is not present in the wordlist.
    #[error("word {index} (\"{word}\") is not in the wordlist")]
    UnknownWord {
        /// Position of the offending word in the phrase.
        index: usize,
        /// The offending word.
        word: String,
    },

    /// The mnemonic's trailing checksum bits did not match the SHA-256
    /// checksum of its entropy.
    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    /// A derivation path string was malformed.
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// Hardened derivation was requested from a public (non-extended
    /// private) key, which BIP-32 does not permit.
    #[error("cannot derive a hardened child from a public key")]
    HardenedFromPublic,

    /// A derived child key's resulting scalar was invalid (probability
    /// ~1 in 2^127; BIP-32 specifies skipping to the next index).
    #[error("derived scalar at index {0} is invalid; retry at the next index")]
    InvalidChildScalar(u32),
}
