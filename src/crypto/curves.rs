//! Named curves and the OID-keyed registry used to resolve public keys.

use crate::crypto::curve_domain::CurveDomain;
use crate::types::der::ObjectIdentifier;
use std::collections::HashMap;
use std::sync::Arc;

/// Arcs of `secp256r1` / `prime256v1` (1.2.840.10045.3.1.7).
pub const SECP256R1_ARCS: &[u64] = &[1, 2, 840, 10045, 3, 1, 7];
/// Arcs of `secp256k1` (1.3.132.0.10).
pub const SECP256K1_ARCS: &[u64] = &[1, 3, 132, 0, 10];

/// SEC 2 recommended parameters for secp256r1.
pub fn secp256r1() -> Arc<CurveDomain> {
    let domain = CurveDomain::from_octet_strings(
        "secp256r1",
        "FFFFFFFF 00000001 00000000 00000000 00000000 FFFFFFFF FFFFFFFF FFFFFFFF",
        "FFFFFFFF 00000001 00000000 00000000 00000000 FFFFFFFF FFFFFFFF FFFFFFFC",
        "5AC635D8 AA3A93E7 B3EBBD55 769886BC 651D06B0 CC53B0F6 3BCE3C3E 27D2604B",
        "03 6B17D1F2 E12C4247 F8BCE6E5 63A440F2 77037D81 2DEB33A0 F4A13945 D898C296",
        "FFFFFFFF 00000000 FFFFFFFF FFFFFFFF BCE6FAAD A7179E84 F3B9CAC2 FC632551",
        "01",
    )
    .expect("secp256r1 parameters are valid");
    Arc::new(domain)
}

/// SEC 2 recommended parameters for secp256k1.
pub fn secp256k1() -> Arc<CurveDomain> {
    let domain = CurveDomain::from_octet_strings(
        "secp256k1",
        "FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE FFFFFC2F",
        "00",
        "07",
        "02 79BE667E F9DCBBAC 55A06295 CE870B07 029BFCDB 2DCE28D9 59F2815B 16F81798",
        "FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141",
        "01",
    )
    .expect("secp256k1 parameters are valid");
    Arc::new(domain)
}

pub fn secp256r1_oid() -> ObjectIdentifier {
    ObjectIdentifier::from_static(SECP256R1_ARCS)
}

pub fn secp256k1_oid() -> ObjectIdentifier {
    ObjectIdentifier::from_static(SECP256K1_ARCS)
}

/// Immutable map from named-curve OID to domain parameters.
#[derive(Clone, Debug)]
pub struct CurveRegistry {
    curves: HashMap<ObjectIdentifier, Arc<CurveDomain>>,
}

impl CurveRegistry {
    /// A registry with no curves.
    pub fn empty() -> Self {
        Self {
            curves: HashMap::new(),
        }
    }

    /// Returns the registry with `domain` registered under `oid`, replacing
    /// any previous entry.
    pub fn with_curve(mut self, oid: ObjectIdentifier, domain: Arc<CurveDomain>) -> Self {
        self.curves.insert(oid, domain);
        self
    }

    pub fn get(&self, oid: &ObjectIdentifier) -> Option<&Arc<CurveDomain>> {
        self.curves.get(oid)
    }

    /// Finds the OID a domain is registered under.
    pub fn oid_of(&self, domain: &CurveDomain) -> Option<&ObjectIdentifier> {
        self.curves
            .iter()
            .find(|(_, registered)| registered.as_ref() == domain)
            .map(|(oid, _)| oid)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl Default for CurveRegistry {
    /// secp256r1 and secp256k1.
    fn default() -> Self {
        Self::empty()
            .with_curve(secp256r1_oid(), secp256r1())
            .with_curve(secp256k1_oid(), secp256k1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn named_curves_have_prime_order_generators() {
        for domain in [secp256r1(), secp256k1()] {
            let g = domain.generator();
            assert!(g.is_on_curve());
            assert!(g.mul_unsigned(domain.n()).unwrap().is_infinity());
            assert_eq!(domain.h(), &BigUint::from(1u32));
            assert_eq!(domain.coordinate_len(), 32);
        }
    }

    #[test]
    fn secp256k1_generator_y() {
        let g = secp256k1().generator();
        assert_eq!(
            g.y().unwrap().to_str_radix(16),
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn default_registry_resolves_both_curves() {
        let registry = CurveRegistry::default();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&secp256r1_oid()).unwrap().name(), "secp256r1");
        assert_eq!(registry.get(&secp256k1_oid()).unwrap().name(), "secp256k1");
        assert!(registry.get(&ObjectIdentifier::new(&[1, 3, 132, 0, 34]).unwrap()).is_none());
    }

    #[test]
    fn oid_of_finds_registered_domain() {
        let registry = CurveRegistry::default();
        assert_eq!(registry.oid_of(&secp256k1()), Some(&secp256k1_oid()));
        assert!(CurveRegistry::empty().oid_of(&secp256r1()).is_none());
    }
}
