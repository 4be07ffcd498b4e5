//! Script token parsing.
//!
//! Literal forms are tried in order and the first match wins:
//!
//! 1. decimal integer with optional sign: `42`, `-7`, `1_000`
//! 2. hexadecimal integer: `0xff`, `0xdead_beef`
//! 3. `base64:` followed by standard base64
//! 4. `bytes_utf8:` followed by arbitrary text
//! 5. `sig:` followed by a base64 DER `SEQUENCE { INTEGER r, INTEGER s }`
//! 6. `pubkey:` followed by a base64 DER `SubjectPublicKeyInfo`
//!
//! A token that is none of these, including a prefixed token with a malformed
//! payload, is treated as an opcode mnemonic.

use crate::crypto::ecdsa::Signature;
use crate::types::der::Decode;
use crate::types::public_key_info::PublicKeyInfo;
use crate::virtual_machine::errors::ProcessorError;
use crate::virtual_machine::isa::Opcode;
use crate::virtual_machine::value::StackValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigInt;

/// A parsed script token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Push(StackValue),
    Op(Opcode),
}

/// Parses one token, failing only if it is neither a literal nor an opcode.
pub fn parse_token(token: &str) -> Result<Token, ProcessorError> {
    match parse_literal(token) {
        Some(value) => Ok(Token::Push(value)),
        None => Opcode::try_from(token).map(Token::Op),
    }
}

/// Parses a literal token, or returns `None` if it should be read as an opcode.
pub fn parse_literal(token: &str) -> Option<StackValue> {
    if let Some(value) = parse_integer(token, 10) {
        return Some(StackValue::Int(value));
    }
    if let Some(value) = token.strip_prefix("0x").and_then(|digits| parse_integer(digits, 16)) {
        return Some(StackValue::Int(value));
    }
    if let Some(bytes) = token.strip_prefix("base64:").and_then(decode_base64) {
        return Some(StackValue::Bytes(bytes));
    }
    if let Some(text) = token.strip_prefix("bytes_utf8:") {
        return Some(StackValue::Bytes(text.as_bytes().to_vec()));
    }
    if let Some(signature) = token
        .strip_prefix("sig:")
        .and_then(decode_base64)
        .and_then(|der| Signature::from_der(&der).ok())
    {
        return Some(StackValue::Signature(signature));
    }
    if let Some(key) = token
        .strip_prefix("pubkey:")
        .and_then(decode_base64)
        .and_then(|der| PublicKeyInfo::from_der(&der).ok())
    {
        return Some(StackValue::PublicKey(key));
    }
    None
}

/// Optional sign followed by digits of `radix`, which may be grouped with
/// single underscores as in `1_000`.
fn parse_integer(text: &str, radix: u32) -> Option<BigInt> {
    let digits = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    let well_formed = digits
        .split('_')
        .all(|group| !group.is_empty() && group.chars().all(|c| c.is_digit(radix)));
    if !well_formed {
        return None;
    }
    let plain: String = text.chars().filter(|&c| c != '_').collect();
    BigInt::parse_bytes(plain.as_bytes(), radix)
}

fn decode_base64(payload: &str) -> Option<Vec<u8>> {
    STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn literal(token: &str) -> StackValue {
        parse_literal(token).unwrap_or_else(|| panic!("{token} is not a literal"))
    }

    #[test]
    fn decimal_integers() {
        assert_eq!(literal("42"), StackValue::from(42i64));
        assert_eq!(literal("-7"), StackValue::from(-7i64));
        assert_eq!(literal("+7"), StackValue::from(7i64));
        let big = literal("123456789012345678901234567890");
        assert_eq!(big.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn underscore_digit_groups() {
        assert_eq!(literal("1_000"), StackValue::from(1000i64));
        assert_eq!(literal("-1_0_0"), StackValue::from(-100i64));
        assert_eq!(literal("0xff_ff"), StackValue::from(65535i64));
        for token in ["_1", "1_", "1__0", "0x_ff", "_"] {
            assert!(parse_literal(token).is_none(), "{token}");
        }
    }

    #[test]
    fn hex_integers() {
        assert_eq!(literal("0xff"), StackValue::from(255i64));
        assert_eq!(literal("0xFF"), StackValue::from(255i64));
        // "0x10" is not decimal, so the hex rule applies
        assert_eq!(literal("0x10"), StackValue::from(16i64));
        assert!(parse_literal("0x").is_none());
        assert!(parse_literal("0xzz").is_none());
    }

    #[test]
    fn base64_and_utf8_bytes() {
        assert_eq!(literal("base64:aGk="), StackValue::from(b"hi".as_slice()));
        assert_eq!(literal("base64:"), StackValue::from(Vec::<u8>::new()));
        assert_eq!(literal("bytes_utf8:hello world"), StackValue::from(b"hello world".as_slice()));
        assert_eq!(literal("bytes_utf8:"), StackValue::from(Vec::<u8>::new()));
    }

    #[test]
    fn signature_literal() {
        assert_eq!(
            literal("sig:MAYCAQECAQI="),
            StackValue::Signature(Signature::new(BigUint::from(1u32), BigUint::from(2u32)))
        );
    }

    #[test]
    fn public_key_literal() {
        let value = literal(
            "pubkey:MDkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDIgADl7iFfRl8gHaym4jl+JPFGOkFTJvuqmvhwx+m6krYPoE=",
        );
        let StackValue::PublicKey(key) = value else {
            panic!("expected a public key");
        };
        assert!(key.is_ec());
        assert_eq!(key.point.len(), 33);
    }

    #[test]
    fn malformed_payloads_fall_through() {
        for token in ["base64:!!!", "sig:aGk=", "sig:???", "pubkey:MAYCAQECAQI="] {
            assert!(parse_literal(token).is_none(), "{token}");
            assert_eq!(
                parse_token(token),
                Err(ProcessorError::UnknownOpcode(token.to_string()))
            );
        }
    }

    #[test]
    fn opcodes() {
        assert_eq!(parse_token("ADD"), Ok(Token::Op(Opcode::Add)));
        assert_eq!(parse_token("OP_CheckSig"), Ok(Token::Op(Opcode::CheckSig)));
        assert_eq!(
            parse_token("OP_NOP"),
            Err(ProcessorError::UnknownOpcode("OP_NOP".to_string()))
        );
    }
}
