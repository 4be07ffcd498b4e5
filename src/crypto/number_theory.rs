//! Modular inverse and modular square root over arbitrary-precision integers.

use crate::crypto::errors::CryptoError;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Computes `a^-1 mod p` with the extended Euclidean algorithm.
///
/// `a` may be negative or larger than `p`; it is reduced first. Fails with
/// [`CryptoError::NotInvertible`] when `gcd(a, p) != 1`.
pub fn inv_mod(a: impl Into<BigInt>, p: &BigUint) -> Result<BigUint, CryptoError> {
    let a = a.into();
    let modulus = BigInt::from(p.clone());
    if modulus <= BigInt::one() {
        return Err(CryptoError::InvalidModulus(p.clone()));
    }

    let reduced = a.mod_floor(&modulus);
    let egcd = reduced.extended_gcd(&modulus);
    if !egcd.gcd.is_one() {
        return Err(CryptoError::NotInvertible {
            value: a,
            modulus: p.clone(),
        });
    }

    // mod_floor keeps the result in [0, p), so the conversion cannot fail.
    egcd.x
        .mod_floor(&modulus)
        .to_biguint()
        .ok_or_else(|| CryptoError::InvalidModulus(p.clone()))
}

/// Legendre symbol of `n` modulo the odd prime `p` via Euler's criterion.
pub fn legendre(n: &BigUint, p: &BigUint) -> i8 {
    let n = n % p;
    if n.is_zero() {
        return 0;
    }
    let exponent = (p - 1u32) >> 1u32;
    if n.modpow(&exponent, p).is_one() { 1 } else { -1 }
}

/// Returns some `x` with `x^2 = n (mod p)` using Tonelli–Shanks.
///
/// Either of the two roots may be returned. `p` must be an odd prime; a
/// confirmed non-residue yields [`CryptoError::NonResidue`].
pub fn tonelli(n: &BigUint, p: &BigUint) -> Result<BigUint, CryptoError> {
    if p.is_even() || *p < BigUint::from(3u32) {
        return Err(CryptoError::InvalidModulus(p.clone()));
    }

    let n = n % p;
    if n.is_zero() {
        return Ok(n);
    }
    let non_residue = || CryptoError::NonResidue {
        value: n.clone(),
        modulus: p.clone(),
    };
    if legendre(&n, p) != 1 {
        return Err(non_residue());
    }

    // p - 1 = q * 2^s with q odd
    let p_minus_one = p - 1u32;
    let s = p_minus_one.trailing_zeros().unwrap_or(0);
    let q = &p_minus_one >> s;

    if s == 1 {
        // p = 3 mod 4
        let exponent = (p + 1u32) >> 2u32;
        return Ok(n.modpow(&exponent, p));
    }

    let mut z = BigUint::from(2u32);
    while legendre(&z, p) != -1 {
        z += 1u32;
        if &z >= p {
            return Err(CryptoError::InvalidModulus(p.clone()));
        }
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = n.modpow(&q, p);
    let mut r = n.modpow(&((&q + 1u32) >> 1u32), p);

    while !t.is_one() {
        // least i in (0, m) with t^(2^i) = 1
        let mut i = 0u64;
        let mut t_pow = t.clone();
        while !t_pow.is_one() {
            t_pow = &t_pow * &t_pow % p;
            i += 1;
            if i == m {
                return Err(non_residue());
            }
        }

        let b = c.modpow(&(BigUint::one() << (m - i - 1)), p);
        m = i;
        c = &b * &b % p;
        t = t * &c % p;
        r = r * &b % p;
    }

    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn inv_mod_small_values() {
        assert_eq!(inv_mod(3, &big(11)).unwrap(), big(4));
        assert_eq!(inv_mod(1, &big(7)).unwrap(), big(1));
        assert_eq!(inv_mod(14, &big(11)).unwrap(), big(4));
    }

    #[test]
    fn inv_mod_negative_input() {
        // -3 = 8 mod 11 and 8 * 7 = 56 = 1 mod 11
        assert_eq!(inv_mod(-3, &big(11)).unwrap(), big(7));
    }

    #[test]
    fn inv_mod_rejects_common_factor() {
        assert!(matches!(
            inv_mod(6, &big(9)),
            Err(CryptoError::NotInvertible { .. })
        ));
        assert!(matches!(
            inv_mod(0, &big(13)),
            Err(CryptoError::NotInvertible { .. })
        ));
    }

    #[test]
    fn inv_mod_product_is_one() {
        let p = big(8191);
        for a in 1u64..200 {
            let inv = inv_mod(a, &p).unwrap();
            assert_eq!(big(a) * inv % &p, big(1));
        }
    }

    #[test]
    fn tonelli_finds_roots_mod_41() {
        // 41 - 1 = 5 * 2^3 exercises the full loop
        let p = big(41);
        for i in 1u64..41 {
            let squared = big(i * i % 41);
            let root = tonelli(&squared, &p).unwrap();
            assert!(root == big(i) || root == big(41 - i), "i = {i}, root = {root}");
        }
    }

    #[test]
    fn tonelli_finds_roots_mod_3_mod_4_prime() {
        let p = big(43);
        for i in 1u64..43 {
            let root = tonelli(&big(i * i % 43), &p).unwrap();
            assert_eq!(&root * &root % &p, big(i * i % 43));
        }
    }

    #[test]
    fn tonelli_of_zero_is_zero() {
        assert_eq!(tonelli(&big(0), &big(41)).unwrap(), big(0));
    }

    #[test]
    fn tonelli_rejects_non_residue() {
        assert!(matches!(
            tonelli(&big(2), &big(3)),
            Err(CryptoError::NonResidue { .. })
        ));
        // 3 is a non-residue mod 41
        assert!(matches!(
            tonelli(&big(3), &big(41)),
            Err(CryptoError::NonResidue { .. })
        ));
    }

    #[test]
    fn tonelli_rejects_even_modulus() {
        assert!(matches!(
            tonelli(&big(4), &big(16)),
            Err(CryptoError::InvalidModulus(_))
        ));
    }

    #[test]
    fn legendre_symbol() {
        let p = big(41);
        assert_eq!(legendre(&big(0), &p), 0);
        assert_eq!(legendre(&big(4), &p), 1);
        assert_eq!(legendre(&big(3), &p), -1);
    }
}
