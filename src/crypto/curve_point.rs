//! Group law on short Weierstrass curves.

use crate::crypto::curve_domain::{Coordinates, CurveDomain};
use crate::crypto::errors::CryptoError;
use crate::crypto::number_theory::inv_mod;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::Zero;
use std::fmt;
use std::ops::Neg;
use std::sync::Arc;

/// A point on a specific [`CurveDomain`].
///
/// Points are immutable; every operation returns a new point. Points of
/// different domains never compare equal and cannot be added.
#[derive(Clone, Debug)]
pub struct CurvePoint {
    domain: Arc<CurveDomain>,
    coords: Coordinates,
}

/// `(a - b) mod p` for operands already reduced mod `p`.
fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    if a >= b { a - b } else { p - (b - a) }
}

impl CurvePoint {
    /// Returns the point at infinity of `domain`.
    pub fn infinity(domain: &Arc<CurveDomain>) -> Self {
        Self {
            domain: Arc::clone(domain),
            coords: Coordinates::Infinity,
        }
    }

    /// Creates an affine point, checking that it lies on the curve.
    pub fn new(domain: &Arc<CurveDomain>, x: BigUint, y: BigUint) -> Result<Self, CryptoError> {
        if !domain.contains(&x, &y) {
            return Err(CryptoError::PointNotOnCurve);
        }
        Ok(Self {
            domain: Arc::clone(domain),
            coords: Coordinates::Affine { x, y },
        })
    }

    /// Decodes a SEC1 encoded point (`00`, compressed or uncompressed).
    pub fn from_octets(domain: &Arc<CurveDomain>, octets: &[u8]) -> Result<Self, CryptoError> {
        let coords = domain.decode_point(octets)?;
        Ok(Self::from_coordinates_unchecked(Arc::clone(domain), coords))
    }

    /// Binds coordinates to a domain without validation; callers guarantee
    /// the coordinates came from the domain itself or from its decoder.
    pub(crate) fn from_coordinates_unchecked(domain: Arc<CurveDomain>, coords: Coordinates) -> Self {
        Self { domain, coords }
    }

    pub fn domain(&self) -> &Arc<CurveDomain> {
        &self.domain
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.coords, Coordinates::Infinity)
    }

    /// Affine x coordinate, `None` at infinity.
    pub fn x(&self) -> Option<&BigUint> {
        match &self.coords {
            Coordinates::Affine { x, .. } => Some(x),
            Coordinates::Infinity => None,
        }
    }

    /// Affine y coordinate, `None` at infinity.
    pub fn y(&self) -> Option<&BigUint> {
        match &self.coords {
            Coordinates::Affine { y, .. } => Some(y),
            Coordinates::Infinity => None,
        }
    }

    /// Returns true for infinity and for affine points satisfying the curve equation.
    pub fn is_on_curve(&self) -> bool {
        match &self.coords {
            Coordinates::Infinity => true,
            Coordinates::Affine { x, y } => self.domain.contains(x, y),
        }
    }

    fn same_domain(&self, other: &CurvePoint) -> bool {
        Arc::ptr_eq(&self.domain, &other.domain) || self.domain == other.domain
    }

    fn check_domain(&self, other: &CurvePoint) -> Result<(), CryptoError> {
        if !self.same_domain(other) {
            return Err(CryptoError::DomainMismatch {
                left: self.domain.name().to_string(),
                right: other.domain.name().to_string(),
            });
        }
        Ok(())
    }

    fn affine(&self, x: BigUint, y: BigUint) -> CurvePoint {
        Self {
            domain: Arc::clone(&self.domain),
            coords: Coordinates::Affine { x, y },
        }
    }

    /// Adds two points of the same domain.
    pub fn add(&self, other: &CurvePoint) -> Result<CurvePoint, CryptoError> {
        self.check_domain(other)?;

        let (x1, y1, x2, y2) = match (&self.coords, &other.coords) {
            (Coordinates::Infinity, _) => return Ok(other.clone()),
            (_, Coordinates::Infinity) => return Ok(self.clone()),
            (Coordinates::Affine { x: x1, y: y1 }, Coordinates::Affine { x: x2, y: y2 }) => {
                (x1, y1, x2, y2)
            }
        };

        let p = self.domain.p();
        let slope = if x1 == x2 {
            // P + (-P), including points of order two
            if y1 != y2 || y1.is_zero() {
                return Ok(CurvePoint::infinity(&self.domain));
            }
            let numerator = (x1 * x1 * 3u32 + self.domain.a()) % p;
            let denominator = (y1 * 2u32) % p;
            numerator * inv_mod(denominator, p)? % p
        } else {
            sub_mod(y2, y1, p) * inv_mod(sub_mod(x2, x1, p), p)? % p
        };

        let x3 = sub_mod(&(&slope * &slope % p), &((x1 + x2) % p), p);
        let y3 = sub_mod(&(&slope * sub_mod(x1, &x3, p) % p), y1, p);
        Ok(self.affine(x3, y3))
    }

    /// Returns `2P`.
    pub fn double(&self) -> Result<CurvePoint, CryptoError> {
        self.add(self)
    }

    /// Multiplies by a signed scalar using double-and-add, most significant bit first.
    ///
    /// A negative scalar multiplies by its magnitude and negates the result.
    pub fn mul(&self, scalar: &BigInt) -> Result<CurvePoint, CryptoError> {
        match scalar.sign() {
            Sign::NoSign => Ok(CurvePoint::infinity(&self.domain)),
            Sign::Plus => self.mul_unsigned(scalar.magnitude()),
            Sign::Minus => Ok(-self.mul_unsigned(scalar.magnitude())?),
        }
    }

    /// Multiplies by a non-negative scalar.
    pub fn mul_unsigned(&self, scalar: &BigUint) -> Result<CurvePoint, CryptoError> {
        let mut result = CurvePoint::infinity(&self.domain);
        for bit in (0..scalar.bits()).rev() {
            result = result.double()?;
            if scalar.bit(bit) {
                result = result.add(self)?;
            }
        }
        Ok(result)
    }

    /// Compressed SEC1 encoding: `02`/`03` followed by `x`, or `00` at infinity.
    pub fn to_octets(&self) -> Vec<u8> {
        match &self.coords {
            Coordinates::Infinity => vec![0x00],
            Coordinates::Affine { x, y } => {
                let coord_len = self.domain.coordinate_len();
                let mut out = Vec::with_capacity(1 + coord_len);
                out.push(if y.is_odd() { 0x03 } else { 0x02 });
                push_padded(&mut out, x, coord_len);
                out
            }
        }
    }

    /// Uncompressed SEC1 encoding: `04 || x || y`, or `00` at infinity.
    pub fn to_uncompressed_octets(&self) -> Vec<u8> {
        match &self.coords {
            Coordinates::Infinity => vec![0x00],
            Coordinates::Affine { x, y } => {
                let coord_len = self.domain.coordinate_len();
                let mut out = Vec::with_capacity(1 + 2 * coord_len);
                out.push(0x04);
                push_padded(&mut out, x, coord_len);
                push_padded(&mut out, y, coord_len);
                out
            }
        }
    }
}

fn push_padded(out: &mut Vec<u8>, value: &BigUint, len: usize) {
    let bytes = value.to_bytes_be();
    out.resize(out.len() + len.saturating_sub(bytes.len()), 0);
    out.extend_from_slice(&bytes);
}

impl Neg for &CurvePoint {
    type Output = CurvePoint;

    fn neg(self) -> CurvePoint {
        match &self.coords {
            Coordinates::Infinity => self.clone(),
            Coordinates::Affine { x, y } => {
                let p = self.domain.p();
                self.affine(x.clone(), sub_mod(&BigUint::zero(), y, p) % p)
            }
        }
    }
}

impl Neg for CurvePoint {
    type Output = CurvePoint;

    fn neg(self) -> CurvePoint {
        -&self
    }
}

impl PartialEq for CurvePoint {
    fn eq(&self, other: &Self) -> bool {
        self.same_domain(other) && self.coords == other.coords
    }
}

impl Eq for CurvePoint {}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coords {
            Coordinates::Infinity => write!(f, "infinity on {}", self.domain),
            Coordinates::Affine { x, y } => write!(f, "({x}, {y}) on {}", self.domain),
        }
    }
}
