//! Wire formats for script literals.
//!
//! - `der`: DER encoding and decoding for INTEGER, BIT STRING, OID and SEQUENCE
//! - `public_key_info`: X.509 `SubjectPublicKeyInfo` records

pub mod der;
pub mod public_key_info;
