//! `SubjectPublicKeyInfo` records for elliptic-curve keys.
//!
//! ```text
//! SEQUENCE {
//!     SEQUENCE { OID algorithm, OID namedCurve }
//!     BIT STRING encodedPoint
//! }
//! ```

use crate::types::der::{
    BitString, Decode, DecodeError, Encode, EncodeSink, ObjectIdentifier, TAG_SEQUENCE, ensure_consumed, read_tlv,
};
use std::fmt;

/// Arcs of `id-ecPublicKey` (1.2.840.10045.2.1).
pub const EC_PUBLIC_KEY_ARCS: &[u64] = &[1, 2, 840, 10045, 2, 1];

/// Algorithm identifier for elliptic-curve public keys.
pub fn ec_public_key_oid() -> ObjectIdentifier {
    ObjectIdentifier::from_static(EC_PUBLIC_KEY_ARCS)
}

/// Decoded public key: algorithm, named curve and SEC1 point octets.
///
/// The point is kept encoded; it is only decoded against a curve domain
/// when a signature is checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyInfo {
    pub algorithm: ObjectIdentifier,
    pub curve: ObjectIdentifier,
    pub point: Vec<u8>,
}

impl PublicKeyInfo {
    /// Builds an `id-ecPublicKey` record on the given curve.
    pub fn ec(curve: ObjectIdentifier, point: Vec<u8>) -> Self {
        Self {
            algorithm: ec_public_key_oid(),
            curve,
            point,
        }
    }

    /// Returns true if the algorithm is `id-ecPublicKey`.
    pub fn is_ec(&self) -> bool {
        self.algorithm.arcs() == EC_PUBLIC_KEY_ARCS
    }
}

struct AlgorithmIdentifier<'a> {
    algorithm: &'a ObjectIdentifier,
    curve: &'a ObjectIdentifier,
}

impl Encode for AlgorithmIdentifier<'_> {
    fn tag(&self) -> u8 {
        TAG_SEQUENCE
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        self.algorithm.encode(out);
        self.curve.encode(out);
    }
}

impl Encode for PublicKeyInfo {
    fn tag(&self) -> u8 {
        TAG_SEQUENCE
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        AlgorithmIdentifier {
            algorithm: &self.algorithm,
            curve: &self.curve,
        }
        .encode(out);
        BitString(self.point.clone()).encode(out);
    }
}

impl Decode for PublicKeyInfo {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let mut contents = read_tlv(input, TAG_SEQUENCE)?;

        let mut algorithm_id = read_tlv(&mut contents, TAG_SEQUENCE)?;
        let algorithm = ObjectIdentifier::decode(&mut algorithm_id)?;
        let curve = ObjectIdentifier::decode(&mut algorithm_id)?;
        ensure_consumed(algorithm_id)?;

        let BitString(point) = BitString::decode(&mut contents)?;
        ensure_consumed(contents)?;

        Ok(Self {
            algorithm,
            curve,
            point,
        })
    }
}

impl fmt::Display for PublicKeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}, {}, {})", self.algorithm, self.curve, hex::encode(&self.point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECP256R1: &[u64] = &[1, 2, 840, 10045, 3, 1, 7];

    // openssl-generated key on secp256r1, compressed point
    const COMPRESSED_DER: &str = "3039301306072a8648ce3d020106082a8648ce3d0301070322000397b8857d197c8076b29b88e5f893c518e9054c9beeaa6be1c31fa6ea4ad83e81";

    #[test]
    fn decodes_openssl_key() {
        let der = hex::decode(COMPRESSED_DER).unwrap();
        let info = PublicKeyInfo::from_der(&der).unwrap();
        assert!(info.is_ec());
        assert_eq!(info.curve.arcs(), SECP256R1);
        assert_eq!(info.point.len(), 33);
        assert_eq!(info.point[0], 0x03);
        assert_eq!(info.to_der(), der);
    }

    #[test]
    fn encodes_uncompressed_point() {
        let mut point = vec![0x04];
        point.extend_from_slice(&[0x11; 64]);
        let info = PublicKeyInfo::ec(ObjectIdentifier::new(SECP256R1).unwrap(), point);
        let der = info.to_der();
        assert_eq!(&der[..2], &[0x30, 0x59]);
        assert_eq!(der.len(), 91);
        assert_eq!(PublicKeyInfo::from_der(&der).unwrap(), info);
    }

    #[test]
    fn rejects_trailing_bytes_and_wrong_tag() {
        let mut der = hex::decode(COMPRESSED_DER).unwrap();
        der.push(0x00);
        assert_eq!(PublicKeyInfo::from_der(&der), Err(DecodeError::TrailingBytes(1)));

        // a lone INTEGER is not a key
        assert!(matches!(
            PublicKeyInfo::from_der(&[0x02, 0x01, 0x01]),
            Err(DecodeError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn display_shows_dotted_oids() {
        let info = PublicKeyInfo::ec(ObjectIdentifier::new(SECP256R1).unwrap(), vec![0x00]);
        assert_eq!(info.to_string(), "PublicKey(1.2.840.10045.2.1, 1.2.840.10045.3.1.7, 00)");
    }
}
