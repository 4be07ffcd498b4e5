//! Elliptic-curve cryptography over prime fields.
//!
//! - [`number_theory`]: modular inverse, Legendre symbol, square roots
//! - [`curve_domain`]: curve parameters and SEC1 point decoding
//! - [`curve_point`]: point arithmetic and encoding
//! - [`curves`]: named curves and the OID registry
//! - [`lsh256`]: the LSH-256 hash family
//! - [`hash`]: hash algorithm selection
//! - [`ecdsa`]: key pairs, signing and verification

pub mod curve_domain;
pub mod curve_point;
pub mod curves;
pub mod ecdsa;
pub mod errors;
pub mod hash;
pub mod lsh256;
pub mod number_theory;
