//! Typed stack operands.

use crate::crypto::ecdsa::Signature;
use crate::types::der::{Encode, EncodeSink};
use crate::types::public_key_info::PublicKeyInfo;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigInt;
use std::fmt;

/// A value on the operand stack.
///
/// Booleans are produced by opcodes only and compare equal to the integers
/// 0 and 1.
#[derive(Clone, Debug)]
pub enum StackValue {
    Int(BigInt),
    Bool(bool),
    Bytes(Vec<u8>),
    Signature(Signature),
    PublicKey(PublicKeyInfo),
}

impl StackValue {
    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            StackValue::Int(_) => "Int",
            StackValue::Bool(_) => "Bool",
            StackValue::Bytes(_) => "Bytes",
            StackValue::Signature(_) => "Signature",
            StackValue::PublicKey(_) => "PublicKey",
        }
    }

    /// Integer view of the value; booleans count as 0 and 1.
    pub fn as_int(&self) -> Option<BigInt> {
        match self {
            StackValue::Int(v) => Some(v.clone()),
            StackValue::Bool(b) => Some(BigInt::from(*b as u8)),
            _ => None,
        }
    }

    /// Writes the raw byte form that `OP_HASH` and `OP_CheckSig` consume.
    ///
    /// Integers use minimal big-endian two's complement, signatures and
    /// public keys their DER encoding.
    pub fn write_to<S: EncodeSink>(&self, out: &mut S) {
        match self {
            StackValue::Int(v) => out.write(&v.to_signed_bytes_be()),
            StackValue::Bool(b) => out.write(&[*b as u8]),
            StackValue::Bytes(bytes) => out.write(bytes),
            StackValue::Signature(sig) => sig.encode(out),
            StackValue::PublicKey(key) => key.encode(out),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

impl PartialEq for StackValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StackValue::Bytes(a), StackValue::Bytes(b)) => a == b,
            (StackValue::Signature(a), StackValue::Signature(b)) => a == b,
            (StackValue::PublicKey(a), StackValue::PublicKey(b)) => a == b,
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for StackValue {}

impl From<BigInt> for StackValue {
    fn from(value: BigInt) -> Self {
        StackValue::Int(value)
    }
}

impl From<i64> for StackValue {
    fn from(value: i64) -> Self {
        StackValue::Int(BigInt::from(value))
    }
}

impl From<bool> for StackValue {
    fn from(value: bool) -> Self {
        StackValue::Bool(value)
    }
}

impl From<Vec<u8>> for StackValue {
    fn from(value: Vec<u8>) -> Self {
        StackValue::Bytes(value)
    }
}

impl From<&[u8]> for StackValue {
    fn from(value: &[u8]) -> Self {
        StackValue::Bytes(value.to_vec())
    }
}

/// Literal token syntax; booleans, which have no literal, print as `true`/`false`.
impl fmt::Display for StackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackValue::Int(v) => write!(f, "{v}"),
            StackValue::Bool(b) => write!(f, "{b}"),
            StackValue::Bytes(bytes) => write!(f, "base64:{}", STANDARD.encode(bytes)),
            StackValue::Signature(sig) => write!(f, "sig:{}", STANDARD.encode(sig.to_der())),
            StackValue::PublicKey(key) => write!(f, "pubkey:{}", STANDARD.encode(key.to_der())),
        }
    }
}

/// Formats a stack bottom to top, e.g. `[1, true, base64:AA==]`.
pub fn format_stack(stack: &[StackValue]) -> String {
    let items: Vec<String> = stack.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn booleans_equal_zero_and_one() {
        assert_eq!(StackValue::Bool(true), StackValue::from(1i64));
        assert_eq!(StackValue::from(0i64), StackValue::Bool(false));
        assert_ne!(StackValue::Bool(true), StackValue::from(2i64));
        assert_ne!(StackValue::Bool(true), StackValue::Bool(false));
    }

    #[test]
    fn different_kinds_are_unequal() {
        assert_ne!(StackValue::from(1i64), StackValue::from(vec![1u8]));
        assert_ne!(StackValue::from(Vec::<u8>::new()), StackValue::Bool(false));
    }

    #[test]
    fn raw_bytes() {
        assert_eq!(StackValue::from(0i64).to_bytes(), [0x00]);
        assert_eq!(StackValue::from(255i64).to_bytes(), [0x00, 0xff]);
        assert_eq!(StackValue::from(-1i64).to_bytes(), [0xff]);
        assert_eq!(StackValue::Bool(true).to_bytes(), [0x01]);
        assert_eq!(StackValue::from(b"abc".as_slice()).to_bytes(), b"abc");

        let sig = Signature::new(BigUint::from(1u32), BigUint::from(2u32));
        assert_eq!(
            StackValue::Signature(sig).to_bytes(),
            [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]
        );
    }

    #[test]
    fn display_uses_token_syntax() {
        let stack = vec![
            StackValue::from(-7i64),
            StackValue::Bool(true),
            StackValue::from(b"hi".as_slice()),
            StackValue::Signature(Signature::new(BigUint::from(1u32), BigUint::from(2u32))),
        ];
        assert_eq!(format_stack(&stack), "[-7, true, base64:aGk=, sig:MAYCAQECAQI=]");
        assert_eq!(format_stack(&[]), "[]");
    }
}
