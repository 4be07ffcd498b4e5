//! ECDSA over any [`CurveDomain`] with a pluggable hash function.

use crate::crypto::curve_domain::CurveDomain;
use crate::crypto::curve_point::CurvePoint;
use crate::crypto::errors::CryptoError;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::number_theory::inv_mod;
use crate::types::der::{Decode, DecodeError, Encode, EncodeSink, TAG_SEQUENCE, ensure_consumed, read_tlv};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rand_core::{OsRng, RngCore};
use std::fmt;
use std::sync::Arc;

/// Private scalar `d` and public point `Q = d * G`.
#[derive(Clone)]
pub struct KeyPair {
    private: BigUint,
    public: CurvePoint,
}

impl KeyPair {
    /// Generates a key pair using OS-provided entropy.
    ///
    /// `d` is drawn uniformly from `[1, n-1]` by rejection sampling.
    pub fn generate(domain: &Arc<CurveDomain>) -> Result<Self, CryptoError> {
        let private = random_scalar(domain.n());
        Self::from_private(domain, private)
    }

    /// Rebuilds a key pair from a known private scalar.
    pub fn from_private(domain: &Arc<CurveDomain>, private: BigUint) -> Result<Self, CryptoError> {
        if private.is_zero() || &private >= domain.n() {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let public = domain.generator().mul_unsigned(&private)?;
        Ok(Self { private, public })
    }

    pub fn private_scalar(&self) -> &BigUint {
        &self.private
    }

    pub fn public_key(&self) -> &CurvePoint {
        &self.public
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

fn random_scalar(n: &BigUint) -> BigUint {
    let bits = n.bits();
    let mut bytes = vec![0u8; bits.div_ceil(8) as usize];
    let excess = bytes.len() as u64 * 8 - bits;
    loop {
        OsRng.fill_bytes(&mut bytes);
        bytes[0] &= 0xffu8 >> excess;
        let candidate = BigUint::from_bytes_be(&bytes);
        if !candidate.is_zero() && &candidate < n {
            return candidate;
        }
    }
}

/// An ECDSA signature `(r, s)`.
///
/// Components are signed so that any DER INTEGER pair decodes; values
/// outside `[1, n-1]` simply fail verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: BigInt,
    pub s: BigInt,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self {
            r: BigInt::from(r),
            s: BigInt::from(s),
        }
    }
}

impl Encode for Signature {
    fn tag(&self) -> u8 {
        TAG_SEQUENCE
    }

    fn encode_contents<S: EncodeSink>(&self, out: &mut S) {
        self.r.encode(out);
        self.s.encode(out);
    }
}

impl Decode for Signature {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let mut contents = read_tlv(input, TAG_SEQUENCE)?;
        let r = BigInt::decode(&mut contents)?;
        let s = BigInt::decode(&mut contents)?;
        ensure_consumed(contents)?;
        Ok(Self { r, s })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:x}, {:x})", self.r, self.s)
    }
}

/// Signer and verifier bound to one curve and hash function.
#[derive(Clone, Debug)]
pub struct Ecdsa {
    domain: Arc<CurveDomain>,
    hash: HashAlgorithm,
}

impl Ecdsa {
    pub fn new(domain: Arc<CurveDomain>, hash: HashAlgorithm) -> Self {
        Self { domain, hash }
    }

    pub fn domain(&self) -> &Arc<CurveDomain> {
        &self.domain
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Hashes `message` and keeps the leftmost `bits(n)` bits of the digest.
    pub fn message_scalar(&self, message: &[u8]) -> Result<BigUint, CryptoError> {
        let digest = self.hash.digest(message)?;
        let digest_bits = digest.len() as u64 * 8;
        let n_bits = self.domain.n().bits();
        let e = BigUint::from_bytes_be(&digest);
        if digest_bits > n_bits {
            Ok(e >> (digest_bits - n_bits))
        } else {
            Ok(e)
        }
    }

    fn check_domain(&self, point: &CurvePoint) -> Result<(), CryptoError> {
        if point.domain().as_ref() != self.domain.as_ref() {
            return Err(CryptoError::DomainMismatch {
                left: self.domain.name().to_string(),
                right: point.domain().name().to_string(),
            });
        }
        Ok(())
    }

    /// Signs `message` with a fresh ephemeral key per attempt.
    pub fn sign(&self, key: &KeyPair, message: &[u8]) -> Result<Signature, CryptoError> {
        self.check_domain(key.public_key())?;
        let n = self.domain.n();
        let e = self.message_scalar(message)?;

        loop {
            let ephemeral = KeyPair::generate(&self.domain)?;
            let Some(x) = ephemeral.public_key().x() else {
                continue;
            };
            let r = x % n;
            if r.is_zero() {
                continue;
            }
            let k_inv = inv_mod(ephemeral.private.clone(), n)?;
            let s = k_inv * (&e + &r * &key.private) % n;
            if s.is_zero() {
                continue;
            }
            return Ok(Signature::new(r, s));
        }
    }

    /// Checks `signature` over `message` against the public point `public`.
    ///
    /// Returns `Ok(false)` for any invalid signature, including out-of-range
    /// components and public points that are infinity or off the curve.
    pub fn verify(
        &self,
        public: &CurvePoint,
        message: &[u8],
        signature: &Signature,
    ) -> Result<bool, CryptoError> {
        self.check_domain(public)?;
        let n = self.domain.n();
        let in_range = |v: &BigInt| v.to_biguint().filter(|v| !v.is_zero() && v < n);
        let (Some(r), Some(s)) = (in_range(&signature.r), in_range(&signature.s)) else {
            return Ok(false);
        };
        if public.is_infinity() || !public.is_on_curve() {
            return Ok(false);
        }

        let e = self.message_scalar(message)?;
        let w = inv_mod(s, n)?;
        let u1 = &e * &w % n;
        let u2 = &r * &w % n;

        let point = self
            .domain
            .generator()
            .mul_unsigned(&u1)?
            .add(&public.mul_unsigned(&u2)?)?;
        Ok(match point.x() {
            Some(x) => x % n == r,
            None => false,
        })
    }
}
