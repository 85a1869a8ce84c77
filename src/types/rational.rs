//! TIFF rational numbers
//!
//! TIFF stores non-integral values as pairs of 32-bit numerator/denominator.
//! Equality is component-wise (pairs are not reduced), matching the on-wire
//! representation. Conversion from a double uses continued-fraction expansion
//! with a configurable tolerance.

/// A rational value as stored on the wire: numerator over denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rational<T> {
    pub num: T,
    pub denom: T,
}

/// Unsigned rational (two LONGs)
pub type URational = Rational<u32>;
/// Signed rational (two SLONGs)
pub type SRational = Rational<i32>;

impl<T> Rational<T> {
    pub const fn new(num: T, denom: T) -> Self {
        Self { num, denom }
    }
}

/// Default tolerance for double-to-rational conversion.
pub const RATIONAL_ACCURACY: f64 = 1e-4;

impl URational {
    /// num / denom as a double. A zero denominator yields +inf or NaN, never
    /// a panic.
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    pub fn from_f64(value: f64) -> Self {
        Self::from_f64_with_accuracy(value, RATIONAL_ACCURACY)
    }

    /// Continued-fraction approximation of a non-negative double. Negative
    /// inputs clamp to zero.
    pub fn from_f64_with_accuracy(value: f64, accuracy: f64) -> Self {
        let (num, denom) = continued_fraction(value.max(0.0), accuracy);
        Self { num, denom }
    }
}

impl SRational {
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    pub fn from_f64(value: f64) -> Self {
        Self::from_f64_with_accuracy(value, RATIONAL_ACCURACY)
    }

    pub fn from_f64_with_accuracy(value: f64, accuracy: f64) -> Self {
        let (num, denom) = continued_fraction(value.abs(), accuracy);
        let num = num.min(i32::MAX as u32) as i32;
        let denom = denom.min(i32::MAX as u32) as i32;
        Self {
            num: if value < 0.0 { -num } else { num },
            denom,
        }
    }
}

/// Best rational approximation of `value >= 0` with relative error bounded
/// by `accuracy * value`, via the convergents of its continued fraction.
fn continued_fraction(value: f64, accuracy: f64) -> (u32, u32) {
    if value == 0.0 || !value.is_finite() {
        return (0, 1);
    }
    if value > u32::MAX as f64 {
        return (u32::MAX, 1);
    }

    let tolerance = accuracy * value;
    let (mut h0, mut h1): (u64, u64) = (1, value.floor() as u64);
    let (mut k0, mut k1): (u64, u64) = (0, 1);
    let mut x = value;

    loop {
        let frac = x - x.floor();
        if (h1 as f64 / k1 as f64 - value).abs() <= tolerance || frac.abs() < f64::EPSILON {
            break;
        }
        x = 1.0 / frac;
        let a = x.floor() as u64;
        let h2 = a.saturating_mul(h1).saturating_add(h0);
        let k2 = a.saturating_mul(k1).saturating_add(k0);
        if h2 > u32::MAX as u64 || k2 > u32::MAX as u64 {
            break;
        }
        h0 = h1;
        h1 = h2;
        k0 = k1;
        k1 = k2;
    }

    (h1 as u32, k1 as u32)
}
