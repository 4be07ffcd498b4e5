//! Test utilities for building script tokens.

#[cfg(test)]
pub mod utils {
    use crate::crypto::curve_point::CurvePoint;
    use crate::crypto::curves::CurveRegistry;
    use crate::crypto::ecdsa::Signature;
    use crate::types::der::Encode;
    use crate::types::public_key_info::PublicKeyInfo;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    pub fn base64_token(bytes: &[u8]) -> String {
        format!("base64:{}", STANDARD.encode(bytes))
    }

    pub fn sig_token(signature: &Signature) -> String {
        format!("sig:{}", STANDARD.encode(signature.to_der()))
    }

    pub fn pubkey_token(key: &PublicKeyInfo) -> String {
        format!("pubkey:{}", STANDARD.encode(key.to_der()))
    }

    /// Wraps a point in a compressed SubjectPublicKeyInfo for its named curve.
    ///
    /// Panics if the point's curve is not one of the built-in curves.
    pub fn public_key_info(point: &CurvePoint) -> PublicKeyInfo {
        let registry = CurveRegistry::default();
        let oid = registry
            .oid_of(point.domain())
            .expect("point is not on a registered curve");
        PublicKeyInfo::ec(oid.clone(), point.to_octets())
    }
}
