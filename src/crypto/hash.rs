//! Hash function selection for signatures and `OP_HASH`.

use crate::crypto::errors::CryptoError;
use crate::crypto::lsh256::Lsh256Bytes;
use crate::types::der::EncodeSink;
use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use std::fmt;

/// Hash function used to digest messages before signing and by `OP_HASH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Lsh256 { output_bits: usize },
    Sha256,
    Sha3_256,
}

impl Default for HashAlgorithm {
    /// LSH-256 with a 256-bit digest.
    fn default() -> Self {
        HashAlgorithm::Lsh256 { output_bits: 256 }
    }
}

impl HashAlgorithm {
    /// Starts an incremental hash.
    pub fn hasher(&self) -> Result<Hasher, CryptoError> {
        let state = match *self {
            HashAlgorithm::Lsh256 { output_bits } => HasherState::Lsh256(Lsh256Bytes::new(output_bits)?),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha3_256 => HasherState::Sha3_256(Sha3_256::new()),
        };
        Ok(Hasher { state })
    }

    /// Hashes `data` in one call.
    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut hasher = self.hasher()?;
        hasher.update(data);
        Ok(hasher.finalize())
    }

    /// Digest length in bits.
    pub fn output_bits(&self) -> usize {
        match *self {
            HashAlgorithm::Lsh256 { output_bits } => output_bits,
            HashAlgorithm::Sha256 | HashAlgorithm::Sha3_256 => 256,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Lsh256 { output_bits } => write!(f, "LSH-256-{output_bits}"),
            HashAlgorithm::Sha256 => write!(f, "SHA-256"),
            HashAlgorithm::Sha3_256 => write!(f, "SHA3-256"),
        }
    }
}

/// Incremental hash state for any [`HashAlgorithm`].
///
/// Implements [`EncodeSink`] so DER values can be hashed without an
/// intermediate buffer. Only whole bytes can be written.
pub struct Hasher {
    state: HasherState,
}

enum HasherState {
    Lsh256(Lsh256Bytes),
    Sha256(Sha256),
    Sha3_256(Sha3_256),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Lsh256(state) => state.update(data),
            HasherState::Sha256(state) => Digest::update(state, data),
            HasherState::Sha3_256(state) => Digest::update(state, data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self.state {
            HasherState::Lsh256(state) => state.finalize(),
            HasherState::Sha256(state) => state.finalize().to_vec(),
            HasherState::Sha3_256(state) => state.finalize().to_vec(),
        }
    }
}

impl EncodeSink for Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}
