use sha3::{Digest, Keccak256 as Sha3Keccak256};
use std::cell::RefCell;

thread_local! {
    static SCRATCH: RefCell<Sha3Keccak256> = RefCell::new(Sha3Keccak256::new());
}

/// Computes the Keccak-256 digest of `bytes`.
///
/// Reuses a thread-local hasher instance across calls on the same thread.
/// Callers that invoke this from a pooled executor whose threads outlive
/// Brane's use of them should call [`Keccak256::cleanup`] on detach.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> [u8; 32] {
    SCRATCH.with(|cell| {
        let mut hasher = cell.borrow_mut();
        hasher.update(bytes.as_ref());
        hasher.finalize_reset().into()
    })
}

/// Namespace for thread-local Keccak-256 housekeeping.
#[derive(Debug)]
pub struct Keccak256;

impl Keccak256 {
    /// Clears this thread's scratch hasher state.
    ///
    /// Pooled-thread executors (e.g. a worker pool shared with other
    /// libraries) should call this before returning a thread to the pool,
    /// so that no partial digest state lingers across unrelated work.
    pub fn cleanup() {
        SCRATCH.with(|cell| *cell.borrow_mut() = Sha3Keccak256::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(keccak256(b"abc"), keccak256(b"abc"));
    }

    #[test]
    fn distinct_inputs_distinct_digests() {
        assert_ne!(keccak256(b"abc"), keccak256(b"abd"));
    }

    #[test]
    fn digest_is_32_bytes() {
        assert_eq!(keccak256([]).len(), 32);
    }

    #[test]
    fn cleanup_does_not_perturb_result() {
        let _ = keccak256(b"warm up the scratch buffer");
        Keccak256::cleanup();
        let a = keccak256(b"abc");
        let b = keccak256(b"abc");
        assert_eq!(a, b);
    }
}
