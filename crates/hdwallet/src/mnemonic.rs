use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::{Digest, Sha256, Sha512};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::wordlist::Wordlist;

const PBKDF2_ROUNDS: u32 = 2048;
const SEED_LEN: usize = 64;

/// A BIP-39 mnemonic phrase, validated against its wordlist and checksum.
///
/// The phrase itself is not secret-sensitive in the way a derived seed or
/// private key is, so it is kept as a plain `String` rather than zeroized;
/// the derived seed is what gets wrapped in [`Zeroizing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mnemonic {
    phrase: String,
}

impl Mnemonic {
    /// Generates a new random mnemonic with `word_count` words, drawn from
    /// `wordlist`. `word_count` must be one of 12, 15, 18, 21, 24.
    pub fn generate(
        word_count: usize,
        wordlist: &Wordlist,
        rng: &mut impl rand::RngCore,
    ) -> Result<Self, Error> {
        let entropy_bits = entropy_bits_for_word_count(word_count)?;
        let entropy_bytes = entropy_bits / 8;
        let mut entropy = vec![0u8; entropy_bytes];
        rng.fill_bytes(&mut entropy);
        Self::from_entropy(&entropy, wordlist)
    }

    /// Builds a mnemonic from raw entropy, appending the checksum and
    /// mapping each 11-bit group to a wordlist entry.
    pub fn from_entropy(entropy: &[u8], wordlist: &Wordlist) -> Result<Self, Error> {
        let entropy_bits = entropy.len() * 8;
        let word_count = word_count_for_entropy_bits(entropy_bits)?;
        let checksum_bits = entropy_bits / 32;

        let checksum_byte = Sha256::digest(entropy)[0];

        let mut bits = Vec::with_capacity(entropy_bits + checksum_bits);
        for byte in entropy {
            for i in (0..8).rev() {
                bits.push((byte >> i) & 1 == 1);
            }
        }
        for i in 0..checksum_bits {
            bits.push((checksum_byte >> (7 - i)) & 1 == 1);
        }

        let words: Vec<&str> = bits
            .chunks(11)
            .map(|chunk| {
                let index = chunk
                    .iter()
                    .fold(0u16, |acc, &bit| (acc << 1) | bit as u16);
                wordlist.word_at(index)
            })
            .collect();
        debug_assert_eq!(words.len(), word_count);

        Ok(Self {
            phrase: words.join(" "),
        })
    }

    /// Parses and validates a phrase: every word must be in `wordlist` and
    /// the trailing checksum bits must match the leading entropy.
    pub fn from_phrase(phrase: &str, wordlist: &Wordlist) -> Result<Self, Error> {
        let normalized: String = phrase.nfkd().collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let word_count = words.len();
        entropy_bits_for_word_count(word_count)?;

        let mut bits = Vec::with_capacity(word_count * 11);
        for (index, word) in words.iter().enumerate() {
            let word_index = wordlist.index_of(word).ok_or_else(|| Error::UnknownWord {
                index,
                word: word.to_string(),
            })?;
            for i in (0..11).rev() {
                bits.push((word_index >> i) & 1 == 1);
            }
        }

        let checksum_bits = bits.len() / 33;
        let entropy_bits = bits.len() - checksum_bits;

        let mut entropy = vec![0u8; entropy_bits / 8];
        for (i, byte) in entropy.iter_mut().enumerate() {
            for b in 0..8 {
                if bits[i * 8 + b] {
                    *byte |= 1 << (7 - b);
                }
            }
        }

        let expected_checksum_byte = Sha256::digest(&entropy)[0];
        for i in 0..checksum_bits {
            let expected_bit = (expected_checksum_byte >> (7 - i)) & 1 == 1;
            if bits[entropy_bits + i] != expected_bit {
                return Err(Error::ChecksumMismatch);
            }
        }

        Ok(Self {
            phrase: words.join(" "),
        })
    }

    /// The space-separated phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Derives the 64-byte BIP-39 seed via PBKDF2-HMAC-SHA512 (2048 rounds)
    /// over the NFKD-normalized phrase, salted with `"mnemonic"` plus an
    /// optional passphrase.
    pub fn to_seed(&self, passphrase: &str) -> Zeroizing<[u8; SEED_LEN]> {
        let normalized_phrase: String = self.phrase.nfkd().collect();
        let normalized_passphrase: String = passphrase.nfkd().collect();
        let salt = format!("mnemonic{normalized_passphrase}");

        let mut seed = [0u8; SEED_LEN];
        pbkdf2::<Hmac<Sha512>>(
            normalized_phrase.as_bytes(),
            salt.as_bytes(),
            PBKDF2_ROUNDS,
            &mut seed,
        )
        .expect("HMAC-SHA512 output length is valid for any key/salt length");
        Zeroizing::new(seed)
    }
}

fn entropy_bits_for_word_count(word_count: usize) -> Result<usize, Error> {
    match word_count {
        12 => Ok(128),
        15 => Ok(160),
        18 => Ok(192),
        21 => Ok(224),
        24 => Ok(256),
        actual => Err(Error::InvalidWordCount { actual }),
    }
}

fn word_count_for_entropy_bits(entropy_bits: usize) -> Result<usize, Error> {
    match entropy_bits {
        128 => Ok(12),
        160 => Ok(15),
        192 => Ok(18),
        224 => Ok(21),
        256 => Ok(24),
        _ => Err(Error::InvalidWordCount {
            actual: entropy_bits / 11,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::test_wordlist;

    #[test]
    fn generate_then_parse_round_trips() {
        let wordlist = test_wordlist::get();
        let mut rng = rand::thread_rng();
        let mnemonic = Mnemonic::generate(12, &wordlist, &mut rng).unwrap();
        assert_eq!(mnemonic.phrase().split_whitespace().count(), 12);

        let reparsed = Mnemonic::from_phrase(mnemonic.phrase(), &wordlist).unwrap();
        assert_eq!(reparsed, mnemonic);
    }

    #[test]
    fn from_entropy_is_deterministic() {
        let wordlist = test_wordlist::get();
        let entropy = [0x0fu8; 16];
        let a = Mnemonic::from_entropy(&entropy, &wordlist).unwrap();
        let b = Mnemonic::from_entropy(&entropy, &wordlist).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tampered_checksum_is_rejected() {
        let wordlist = test_wordlist::get();
        let entropy = [0x42u8; 16];
        let mnemonic = Mnemonic::from_entropy(&entropy, &wordlist).unwrap();

        let mut words: Vec<&str> = mnemonic.phrase().split_whitespace().collect();
        let last = words.last().copied().unwrap();
        let last_index = wordlist.index_of(last).unwrap();
        let swapped = wordlist.word_at(last_index ^ 1);
        *words.last_mut().unwrap() = swapped;
        let tampered = words.join(" ");

        assert_eq!(
            Mnemonic::from_phrase(&tampered, &wordlist),
            Err(Error::ChecksumMismatch)
        );
    }

    #[test]
    fn unknown_word_is_rejected() {
        let wordlist = test_wordlist::get();
        let phrase = "w0000 ".repeat(11) + "not-a-real-word";
        match Mnemonic::from_phrase(&phrase, &wordlist) {
            Err(Error::UnknownWord { index, .. }) => assert_eq!(index, 11),
            other => panic!("expected UnknownWord, got {other:?}"),
        }
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        let wordlist = test_wordlist::get();
        let phrase = "w0000 w0001 w0002";
        assert_eq!(
            Mnemonic::from_phrase(phrase, &wordlist),
            Err(Error::InvalidWordCount { actual: 3 })
        );
    }

    #[test]
    fn seed_derivation_is_deterministic_and_passphrase_sensitive() {
        let wordlist = test_wordlist::get();
        let mnemonic = Mnemonic::from_entropy(&[0x01u8; 16], &wordlist).unwrap();

        let seed_a = mnemonic.to_seed("");
        let seed_b = mnemonic.to_seed("");
        assert_eq!(*seed_a, *seed_b);

        let seed_with_pass = mnemonic.to_seed("extra words");
        assert_ne!(*seed_a, *seed_with_pass);
    }
}
