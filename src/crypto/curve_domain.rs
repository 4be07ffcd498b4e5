//! Elliptic-curve domain parameters over prime fields.
//!
//! A [`CurveDomain`] fixes the short Weierstrass curve `y^2 = x^3 + ax + b`
//! over `F_p` together with its base point `G`, the order `n` of `G` and the
//! cofactor `h`. Parameters are usually given as SEC1 octet strings: hex
//! digits, optionally separated by spaces, as printed in SEC 2.
//!
//! # Point encoding
//!
//! - `00`: point at infinity
//! - `02 || X` / `03 || X`: compressed, the prefix carries the parity of `y`
//! - `04 || X || Y`: uncompressed
//!
//! `X` and `Y` are big-endian and exactly `ceil(log2(p) / 8)` bytes long.

use crate::crypto::curve_point::CurvePoint;
use crate::crypto::errors::CryptoError;
use crate::crypto::number_theory::tonelli;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use std::fmt;
use std::sync::Arc;

/// Affine coordinates of a curve point, or the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Coordinates {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

/// Immutable curve domain parameters `(p, a, b, G, n, h)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveDomain {
    name: String,
    p: BigUint,
    a: BigUint,
    b: BigUint,
    generator: Coordinates,
    n: BigUint,
    h: BigUint,
}

impl CurveDomain {
    /// Builds a domain from already decoded parameters.
    ///
    /// Fails if `p` is even, if the curve is singular (`4a^3 + 27b^2 = 0 mod p`)
    /// or if an affine generator does not lie on the curve.
    pub fn new(
        name: impl Into<String>,
        p: BigUint,
        a: BigUint,
        b: BigUint,
        generator: Coordinates,
        n: BigUint,
        h: BigUint,
    ) -> Result<Self, CryptoError> {
        if p.is_even() || p < BigUint::from(3u32) {
            return Err(CryptoError::UnsupportedField);
        }
        let a = a % &p;
        let b = b % &p;

        let discriminant = (&a * &a * &a * 4u32 + &b * &b * 27u32) % &p;
        if discriminant.is_zero() {
            return Err(CryptoError::SingularCurve);
        }

        if let Coordinates::Affine { x, y } = &generator {
            check_field_element(x, &p)?;
            check_field_element(y, &p)?;
            if !satisfies_equation(x, y, &p, &a, &b) {
                return Err(CryptoError::PointNotOnCurve);
            }
        }

        Ok(Self {
            name: name.into(),
            p,
            a,
            b,
            generator,
            n,
            h,
        })
    }

    /// Decodes a domain from SEC1 octet strings.
    pub fn from_octet_strings(
        name: impl Into<String>,
        p: &str,
        a: &str,
        b: &str,
        generator: &str,
        n: &str,
        h: &str,
    ) -> Result<Self, CryptoError> {
        let p = octet_str_to_int(p)?;
        let a = octet_str_to_int(a)?;
        let b = octet_str_to_int(b)?;
        let n = octet_str_to_int(n)?;
        let h = octet_str_to_int(h)?;
        let generator = decode_point(&octet_str_to_bytes(generator)?, &p, &a, &b)?;
        Self::new(name, p, a, b, generator, n, h)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field modulus `p`.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Order `n` of the base point.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Cofactor `h`.
    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Coordinates of the base point `G`.
    pub fn generator_coordinates(&self) -> &Coordinates {
        &self.generator
    }

    /// Returns the base point `G` bound to this domain.
    pub fn generator(self: &Arc<Self>) -> CurvePoint {
        CurvePoint::from_coordinates_unchecked(Arc::clone(self), self.generator.clone())
    }

    /// Byte length of one encoded coordinate, `ceil(log2(p) / 8)`.
    pub fn coordinate_len(&self) -> usize {
        coordinate_len(&self.p)
    }

    /// Returns true if `(x, y)` satisfies the curve equation.
    pub fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        x < &self.p && y < &self.p && satisfies_equation(x, y, &self.p, &self.a, &self.b)
    }

    /// Decodes an encoded point against this domain's field and equation.
    pub fn decode_point(&self, octets: &[u8]) -> Result<Coordinates, CryptoError> {
        decode_point(octets, &self.p, &self.a, &self.b)
    }
}

impl fmt::Display for CurveDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: y^2 = x^3 + {}x + {} over F_{}",
            self.name, self.a, self.b, self.p
        )
    }
}

fn coordinate_len(p: &BigUint) -> usize {
    p.bits().div_ceil(8) as usize
}

fn satisfies_equation(x: &BigUint, y: &BigUint, p: &BigUint, a: &BigUint, b: &BigUint) -> bool {
    let lhs = y * y % p;
    let rhs = (x * x * x + a * x + b) % p;
    lhs == rhs
}

fn check_field_element(value: &BigUint, p: &BigUint) -> Result<(), CryptoError> {
    if value >= p {
        return Err(CryptoError::FieldElementOutOfRange {
            value: value.clone(),
            modulus: p.clone(),
        });
    }
    Ok(())
}

fn field_element(octets: &[u8], p: &BigUint) -> Result<BigUint, CryptoError> {
    let value = BigUint::from_bytes_be(octets);
    check_field_element(&value, p)?;
    Ok(value)
}

/// Parses a whitespace-separated hex octet string into bytes.
pub fn octet_str_to_bytes(octet_str: &str) -> Result<Vec<u8>, CryptoError> {
    let compact: String = octet_str.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|e| CryptoError::InvalidOctetString(format!("{compact}: {e}")))
}

/// Parses a whitespace-separated hex octet string into an integer.
pub fn octet_str_to_int(octet_str: &str) -> Result<BigUint, CryptoError> {
    let compact: String = octet_str.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(CryptoError::InvalidOctetString(
            "empty octet string".to_string(),
        ));
    }
    BigUint::parse_bytes(compact.as_bytes(), 16)
        .ok_or_else(|| CryptoError::InvalidOctetString(compact.clone()))
}

/// Decodes a SEC1 point encoding for the curve `y^2 = x^3 + ax + b` over `F_p`.
pub(crate) fn decode_point(
    octets: &[u8],
    p: &BigUint,
    a: &BigUint,
    b: &BigUint,
) -> Result<Coordinates, CryptoError> {
    if octets == [0x00] {
        return Ok(Coordinates::Infinity);
    }
    if p.is_even() {
        return Err(CryptoError::UnsupportedField);
    }

    let coord_len = coordinate_len(p);
    let compressed_len = 1 + coord_len;
    let uncompressed_len = 1 + 2 * coord_len;

    match octets.len() {
        len if len == compressed_len => {
            let odd = match octets[0] {
                0x02 => false,
                0x03 => true,
                other => return Err(CryptoError::InvalidPointPrefix(other)),
            };
            let x = field_element(&octets[1..], p)?;
            let alpha = (&x * &x * &x + a * &x + b) % p;
            let beta = tonelli(&alpha, p)?;
            // y = 0 is the only root and it is even
            if beta.is_zero() && odd {
                return Err(CryptoError::InvalidPointPrefix(octets[0]));
            }
            let y = if beta.is_odd() == odd {
                beta
            } else {
                (p - beta) % p
            };
            Ok(Coordinates::Affine { x, y })
        }
        len if len == uncompressed_len => {
            if octets[0] != 0x04 {
                return Err(CryptoError::InvalidPointPrefix(octets[0]));
            }
            let x = field_element(&octets[1..1 + coord_len], p)?;
            let y = field_element(&octets[1 + coord_len..], p)?;
            if !satisfies_equation(&x, &y, p, a, b) {
                return Err(CryptoError::PointNotOnCurve);
            }
            Ok(Coordinates::Affine { x, y })
        }
        actual => Err(CryptoError::InvalidPointLength {
            actual,
            compressed: compressed_len,
            uncompressed: uncompressed_len,
        }),
    }
}
