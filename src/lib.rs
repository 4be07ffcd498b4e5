//! Stack processor library.
//!
//! Provides elliptic-curve cryptography, LSH-256, DER codecs and a stack-based
//! script processor for transaction validation.

pub mod crypto;
#[cfg(test)]
pub mod test_utils;
pub mod types;
pub mod utils;
pub mod virtual_machine;
