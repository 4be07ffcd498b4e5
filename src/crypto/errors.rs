use num_bigint::{BigInt, BigUint};
use thiserror::Error;

/// Errors raised by the number-theory, curve, hash and signature layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// `value` has no inverse modulo `modulus`.
    #[error("{value} is not invertible modulo {modulus}")]
    NotInvertible { value: BigInt, modulus: BigUint },
    /// Euler's criterion rejected the input of a square root.
    #[error("{value} is not a quadratic residue modulo {modulus}")]
    NonResidue { value: BigUint, modulus: BigUint },
    /// Modulus is not usable for the requested operation.
    #[error("invalid modulus {0}")]
    InvalidModulus(BigUint),
    /// Points from two different curve domains were combined.
    #[error("curve domain mismatch: {left} vs {right}")]
    DomainMismatch { left: String, right: String },
    /// Domain parameters satisfy 4a^3 + 27b^2 = 0 mod p.
    #[error("singular curve: 4a^3 + 27b^2 = 0 mod p")]
    SingularCurve,
    /// Only prime fields of odd characteristic are supported.
    #[error("binary fields are not supported")]
    UnsupportedField,
    /// Octet string is not valid hexadecimal.
    #[error("invalid octet string: {0}")]
    InvalidOctetString(String),
    /// Encoded point has a length matching neither the compressed nor uncompressed form.
    #[error("invalid point encoding length {actual}, expected {compressed} or {uncompressed}")]
    InvalidPointLength {
        actual: usize,
        compressed: usize,
        uncompressed: usize,
    },
    /// Leading byte of an encoded point is not valid for its length.
    #[error("invalid point prefix 0x{0:02x}")]
    InvalidPointPrefix(u8),
    /// Coordinate does not lie in [0, p).
    #[error("field F_{modulus} does not contain {value}")]
    FieldElementOutOfRange { value: BigUint, modulus: BigUint },
    /// Decoded coordinates do not satisfy the curve equation.
    #[error("point is not on the curve")]
    PointNotOnCurve,
    /// Private scalar outside [1, n-1].
    #[error("private scalar must be in [1, n-1]")]
    InvalidPrivateKey,
    /// Requested digest length is outside 1..=256 bits.
    #[error("output length must be between 1 and 256 bits, got {0}")]
    InvalidOutputLength(usize),
    /// A byte-level update followed a partial-byte update.
    #[error("bit level update is only allowed as the last update")]
    UnalignedUpdate,
    /// Bit length exceeds the supplied buffer.
    #[error("bit length {bits} exceeds input of {available} bytes")]
    BitLengthOverflow { bits: usize, available: usize },
}
