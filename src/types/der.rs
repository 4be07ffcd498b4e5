//! Distinguished Encoding Rules for the handful of ASN.1 types the processor
//! needs: INTEGER, BIT STRING, OBJECT IDENTIFIER and SEQUENCE.
//!
//! # Format
//!
//! Every value is a tag byte, a length and the contents octets.
//!
//! - Lengths below 128 use one byte; longer ones use `0x80 | n` followed by
//!   `n` big-endian length bytes (at most four). Indefinite lengths are rejected.
//! - INTEGER contents are minimal big-endian two's complement.
//! - BIT STRING contents start with the number of unused bits, always zero here.
//! - SEQUENCE contents are the concatenated encodings of its fields.

use num_bigint::{BigInt, BigUint, Sign};
use std::fmt;
use thiserror::Error;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OBJECT_IDENTIFIER: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

const MAX_LENGTH_OCTETS: usize = 4;

/// Errors produced while decoding DER input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected tag 0x{expected:02x}, found 0x{actual:02x}")]
    UnexpectedTag { expected: u8, actual: u8 },
    #[error("invalid length encoding")]
    InvalidLength,
    #[error("length does not fit in four octets")]
    LengthOverflow,
    #[error("integer is not minimally encoded")]
    NonMinimalInteger,
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("invalid value")]
    InvalidValue,
}

/// Sink for writing encoded bytes.
pub trait EncodeSink {
    fn write(&mut self, bytes: &[u8]);
}

/// Counts encoded bytes without storing them.
///
/// DER needs the contents length before the contents, so every constructed
/// value is measured once and then written.
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self { len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl Default for SizeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// A value with a DER tag-length-value encoding.
pub trait Encode {
    /// Tag byte of the outermost TLV.
    fn tag(&self) -> u8;

    /// Writes the contents octets, without tag or length.
    fn encode_contents<S: EncodeSink>(&self, out: &mut S);

    /// Writes the full TLV.
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        let mut counter = SizeCounter::new();
        self.encode_contents(&mut counter);
        out.write(&[self.tag()]);
        write_length(out, counter.len());
        self.encode_contents(out);
    }

    /// Serializes to a new buffer with exact capacity.
    fn to_der(&self) -> Vec<u8> {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        let mut buf = Vec::with_capacity(counter.len());
        self.encode(&mut buf);
        buf
    }
}

/// A value that can be read back from its DER encoding.
pub trait Decode: Sized {
    /// Reads one value from the front of `input`, advancing it.
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError>;

    /// Decodes a complete buffer, rejecting trailing bytes.
    fn from_der(mut input: &[u8]) -> Result<Self, DecodeError> {
        let value = Self::decode(&mut input)?;
        ensure_consumed(input)?;
        Ok(value)
    }
}

/// Fails unless every byte of `input` has been read.
pub fn ensure_consumed(input: &[u8]) -> Result<(), DecodeError> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::TrailingBytes(input.len()))
    }
}

/// Reads exactly `n` bytes from the front of `input`.
pub fn read_bytes<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], DecodeError> {
    if input.len() < n {
        return Err(DecodeError::UnexpectedEof);
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

fn write_length<S: EncodeSink>(out: &mut S, len: usize) {
    if len < 0x80 {
        out.write(&[len as u8]);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    out.write(&[0x80 | significant.len() as u8]);
    out.write(significant);
}

fn read_length(input: &mut &[u8]) -> Result<usize, DecodeError> {
    let first = read_bytes(input, 1)?[0];
    if first < 0x80 {
        return Ok(first as usize);
    }

    let octets = (first & 0x7f) as usize;
    if octets == 0 {
        // indefinite form
        return Err(DecodeError::InvalidLength);
    }
    if octets > MAX_LENGTH_OCTETS {
        return Err(DecodeError::LengthOverflow);
    }
    let raw = read_bytes(input, octets)?;
    if raw[0] == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let len = raw.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len < 0x80 {
        return Err(DecodeError::InvalidLength);
    }
    Ok(len)
}

/// Reads a TLV with the given tag and returns its contents octets.
pub fn read_tlv<'a>(input: &mut &'a [u8], tag: u8) -> Result<&'a [u8], DecodeError> {
    let actual = read_bytes(input, 1)?[0];
    if actual != tag {
        return Err(DecodeError::UnexpectedTag {
            expected: tag,
            actual,
        });
    }
    let len = read_length(input)?;
    read_bytes(input, len)
}

// INTEGER

impl Encode for BigInt {
    fn tag(&self) -> u8 {
        TAG_INTEGER
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        out.write(&self.to_signed_bytes_be());
    }
}

impl Decode for BigInt {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let contents = read_tlv(input, TAG_INTEGER)?;
        match contents {
            [] => Err(DecodeError::InvalidLength),
            [0x00, next, ..] if next & 0x80 == 0 => Err(DecodeError::NonMinimalInteger),
            [0xff, next, ..] if next & 0x80 != 0 => Err(DecodeError::NonMinimalInteger),
            _ => Ok(BigInt::from_signed_bytes_be(contents)),
        }
    }
}

impl Encode for BigUint {
    fn tag(&self) -> u8 {
        TAG_INTEGER
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        BigInt::from_biguint(Sign::Plus, self.clone()).encode_contents(out);
    }
}

impl Decode for BigUint {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        BigInt::decode(input)?
            .to_biguint()
            .ok_or(DecodeError::InvalidValue)
    }
}

// BIT STRING

/// A BIT STRING whose length is a whole number of bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitString(pub Vec<u8>);

impl Encode for BitString {
    fn tag(&self) -> u8 {
        TAG_BIT_STRING
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[0]);
        out.write(&self.0);
    }
}

impl Decode for BitString {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let contents = read_tlv(input, TAG_BIT_STRING)?;
        match contents.split_first() {
            Some((0, bits)) => Ok(BitString(bits.to_vec())),
            Some(_) => Err(DecodeError::InvalidValue),
            None => Err(DecodeError::InvalidLength),
        }
    }
}

// OBJECT IDENTIFIER

/// An OBJECT IDENTIFIER as its sequence of arcs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier(Vec<u64>);

impl ObjectIdentifier {
    /// Builds an identifier from its arcs. The first arc must be 0, 1 or 2
    /// and, unless it is 2, the second must be below 40.
    pub fn new(arcs: &[u64]) -> Result<Self, DecodeError> {
        match arcs {
            [first, second, ..] if *first < 2 && *second < 40 => Ok(Self(arcs.to_vec())),
            [2, second, ..] if *second <= u64::MAX - 80 => Ok(Self(arcs.to_vec())),
            _ => Err(DecodeError::InvalidValue),
        }
    }

    /// Builds an identifier from arcs known to be well formed.
    pub(crate) fn from_static(arcs: &'static [u64]) -> Self {
        debug_assert!(arcs.len() >= 2 && arcs[0] <= 2);
        Self(arcs.to_vec())
    }

    pub fn arcs(&self) -> &[u64] {
        &self.0
    }
}

fn write_base128<S: EncodeSink>(out: &mut S, mut value: u64) {
    let mut buf = [0u8; 10];
    let mut pos = buf.len() - 1;
    buf[pos] = (value & 0x7f) as u8;
    value >>= 7;
    while value > 0 {
        pos -= 1;
        buf[pos] = 0x80 | (value & 0x7f) as u8;
        value >>= 7;
    }
    out.write(&buf[pos..]);
}

impl Encode for ObjectIdentifier {
    fn tag(&self) -> u8 {
        TAG_OBJECT_IDENTIFIER
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        // `new` guarantees at least two arcs
        write_base128(out, self.0[0] * 40 + self.0[1]);
        for &arc in &self.0[2..] {
            write_base128(out, arc);
        }
    }
}

impl Decode for ObjectIdentifier {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let contents = read_tlv(input, TAG_OBJECT_IDENTIFIER)?;
        if contents.is_empty() || contents[contents.len() - 1] & 0x80 != 0 {
            return Err(DecodeError::InvalidValue);
        }

        let mut subidentifiers = Vec::new();
        let mut current: u64 = 0;
        let mut started = false;
        for &byte in contents {
            if !started && byte == 0x80 {
                return Err(DecodeError::InvalidValue);
            }
            if current > u64::MAX >> 7 {
                return Err(DecodeError::LengthOverflow);
            }
            current = (current << 7) | (byte & 0x7f) as u64;
            started = true;
            if byte & 0x80 == 0 {
                subidentifiers.push(current);
                current = 0;
                started = false;
            }
        }

        let first = subidentifiers[0];
        let mut arcs = match first {
            0..=39 => vec![0, first],
            40..=79 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        arcs.extend_from_slice(&subidentifiers[1..]);
        Ok(Self(arcs))
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{first}")?;
        }
        for arc in arcs {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(arcs: &[u64]) -> ObjectIdentifier {
        ObjectIdentifier::new(arcs).unwrap()
    }

    #[test]
    fn size_counter_accumulates() {
        let mut counter = SizeCounter::new();
        counter.write(&[1, 2, 3]);
        counter.write(&[4, 5]);
        assert_eq!(counter.len(), 5);
    }

    #[test]
    fn short_and_long_lengths() {
        let mut out = Vec::new();
        write_length(&mut out, 0x7f);
        assert_eq!(out, [0x7f]);

        let mut out = Vec::new();
        write_length(&mut out, 0x80);
        assert_eq!(out, [0x81, 0x80]);

        let mut out = Vec::new();
        write_length(&mut out, 0x1234);
        assert_eq!(out, [0x82, 0x12, 0x34]);
        assert_eq!(read_length(&mut out.as_slice()).unwrap(), 0x1234);
    }

    #[test]
    fn rejects_indefinite_and_non_minimal_lengths() {
        assert_eq!(read_length(&mut [0x80].as_slice()), Err(DecodeError::InvalidLength));
        assert_eq!(read_length(&mut [0x81, 0x10].as_slice()), Err(DecodeError::InvalidLength));
        assert_eq!(read_length(&mut [0x82, 0x00, 0x90].as_slice()), Err(DecodeError::InvalidLength));
        assert_eq!(
            read_length(&mut [0x85, 1, 0, 0, 0, 0].as_slice()),
            Err(DecodeError::LengthOverflow)
        );
    }

    #[test]
    fn integer_encodings() {
        assert_eq!(BigInt::from(0).to_der(), [0x02, 0x01, 0x00]);
        assert_eq!(BigInt::from(127).to_der(), [0x02, 0x01, 0x7f]);
        assert_eq!(BigInt::from(128).to_der(), [0x02, 0x02, 0x00, 0x80]);
        assert_eq!(BigInt::from(-128).to_der(), [0x02, 0x01, 0x80]);
        assert_eq!(BigInt::from(-129).to_der(), [0x02, 0x02, 0xff, 0x7f]);
        assert_eq!(BigUint::from(0xffu32).to_der(), [0x02, 0x02, 0x00, 0xff]);
    }

    #[test]
    fn integer_decodes() {
        assert_eq!(BigInt::from_der(&[0x02, 0x02, 0xff, 0x7f]).unwrap(), BigInt::from(-129));
        assert_eq!(BigUint::from_der(&[0x02, 0x02, 0x00, 0x80]).unwrap(), BigUint::from(128u32));
    }

    #[test]
    fn integer_rejects_bad_input() {
        assert_eq!(BigInt::from_der(&[0x02, 0x00]), Err(DecodeError::InvalidLength));
        assert_eq!(
            BigInt::from_der(&[0x02, 0x02, 0x00, 0x7f]),
            Err(DecodeError::NonMinimalInteger)
        );
        assert_eq!(
            BigInt::from_der(&[0x02, 0x02, 0xff, 0x80]),
            Err(DecodeError::NonMinimalInteger)
        );
        assert_eq!(BigUint::from_der(&[0x02, 0x01, 0x80]), Err(DecodeError::InvalidValue));
        assert_eq!(
            BigInt::from_der(&[0x04, 0x01, 0x00]),
            Err(DecodeError::UnexpectedTag {
                expected: TAG_INTEGER,
                actual: 0x04
            })
        );
        assert_eq!(
            BigInt::from_der(&[0x02, 0x01, 0x00, 0x00]),
            Err(DecodeError::TrailingBytes(1))
        );
        assert_eq!(BigInt::from_der(&[0x02, 0x03, 0x01]), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn object_identifier_known_encodings() {
        let ec_public_key = oid(&[1, 2, 840, 10045, 2, 1]);
        assert_eq!(
            ec_public_key.to_der(),
            [0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01]
        );
        let secp256k1 = oid(&[1, 3, 132, 0, 10]);
        assert_eq!(secp256k1.to_der(), [0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x0a]);

        let decoded = ObjectIdentifier::from_der(&secp256k1.to_der()).unwrap();
        assert_eq!(decoded, secp256k1);
        assert_eq!(decoded.to_string(), "1.3.132.0.10");
    }

    #[test]
    fn object_identifier_large_first_arc() {
        let id = oid(&[2, 999, 3]);
        assert_eq!(id.to_der(), [0x06, 0x03, 0x88, 0x37, 0x03]);
        assert_eq!(ObjectIdentifier::from_der(&id.to_der()).unwrap(), id);
    }

    #[test]
    fn object_identifier_rejects_bad_input() {
        assert!(ObjectIdentifier::new(&[1]).is_err());
        assert!(ObjectIdentifier::new(&[1, 40]).is_err());
        assert!(ObjectIdentifier::new(&[3, 1]).is_err());
        // unterminated subidentifier
        assert_eq!(
            ObjectIdentifier::from_der(&[0x06, 0x01, 0x86]),
            Err(DecodeError::InvalidValue)
        );
        // leading 0x80 padding
        assert_eq!(
            ObjectIdentifier::from_der(&[0x06, 0x02, 0x80, 0x01]),
            Err(DecodeError::InvalidValue)
        );
    }

    #[test]
    fn bit_string_requires_zero_unused_bits() {
        let bits = BitString(vec![0x04, 0x01]);
        assert_eq!(bits.to_der(), [0x03, 0x03, 0x00, 0x04, 0x01]);
        assert_eq!(BitString::from_der(&bits.to_der()).unwrap(), bits);
        assert_eq!(
            BitString::from_der(&[0x03, 0x02, 0x01, 0x04]),
            Err(DecodeError::InvalidValue)
        );
        assert_eq!(BitString::from_der(&[0x03, 0x00]), Err(DecodeError::InvalidLength));
    }

    #[test]
    fn long_form_contents() {
        let bits = BitString(vec![0xab; 200]);
        let der = bits.to_der();
        assert_eq!(&der[..3], &[0x03, 0x81, 201]);
        assert_eq!(der.len(), 3 + 201);
        assert_eq!(der.capacity(), der.len());
        assert_eq!(BitString::from_der(&der).unwrap(), bits);
    }
}
