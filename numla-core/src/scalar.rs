//! Element types: single and double precision, real and complex.
//!
//! `Scalar` is the bound every routine in the workspace is generic over.
//! `RealScalar` adds the ordering and machine constants that only make
//! sense for real numbers (tolerances, singular values, eigenvalues of
//! Hermitian matrices).

use core::fmt::{Debug, Display};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_complex::Complex;

/// Single-precision complex.
#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;
/// Double-precision complex.
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;

/// A matrix element.
pub trait Scalar:
    Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// The underlying real type (`Self` for real scalars).
    type Real: RealScalar;

    /// `true` for complex element types.
    const IS_COMPLEX: bool;

    /// Short type tag used in log messages (`f32`, `c64`, ...).
    const NAME: &'static str;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_real(re: Self::Real) -> Self;
    /// Builds a value from real and imaginary parts; real types drop `im`.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;
    fn re(self) -> Self::Real;
    fn im(self) -> Self::Real;
    fn conj(self) -> Self;
    /// Modulus.
    fn abs(self) -> Self::Real;
    /// `|re| + |im|`, the BLAS `asum`/`iamax` norm.
    fn abs1(self) -> Self::Real;
    /// Multiplies by a real factor.
    fn scale(self, r: Self::Real) -> Self;
    fn is_finite(self) -> bool;

    #[inline]
    fn to_complex(self) -> Complex<Self::Real> {
        Complex::new(self.re(), self.im())
    }

    #[inline]
    fn from_complex(z: Complex<Self::Real>) -> Self {
        Self::from_parts(z.re, z.im)
    }

    #[inline]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }
}

/// A real matrix element.
pub trait RealScalar: Scalar<Real = Self> + PartialOrd {
    /// Machine epsilon.
    fn epsilon() -> Self;
    /// Smallest positive normal number.
    fn safe_min() -> Self;
    fn infinity() -> Self;
    fn nan() -> Self;
    fn sqrt(self) -> Self;
    fn hypot(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    /// Magnitude of `self` with the sign of `sign`.
    fn copysign(self, sign: Self) -> Self;
    fn is_nan(self) -> bool;
    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;

    #[inline]
    fn from_usize(n: usize) -> Self {
        Self::from_f64(n as f64)
    }
}

macro_rules! impl_real_scalar {
    ($t:ty, $name:literal) => {
        impl Scalar for $t {
            type Real = $t;
            const IS_COMPLEX: bool = false;
            const NAME: &'static str = $name;

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }
            #[inline(always)]
            fn one() -> Self {
                1.0
            }
            #[inline(always)]
            fn from_real(re: $t) -> Self {
                re
            }
            #[inline(always)]
            fn from_parts(re: $t, _im: $t) -> Self {
                re
            }
            #[inline(always)]
            fn re(self) -> $t {
                self
            }
            #[inline(always)]
            fn im(self) -> $t {
                0.0
            }
            #[inline(always)]
            fn conj(self) -> Self {
                self
            }
            #[inline(always)]
            fn abs(self) -> $t {
                <$t>::abs(self)
            }
            #[inline(always)]
            fn abs1(self) -> $t {
                <$t>::abs(self)
            }
            #[inline(always)]
            fn scale(self, r: $t) -> Self {
                self * r
            }
            #[inline(always)]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }
        }

        impl RealScalar for $t {
            #[inline(always)]
            fn epsilon() -> Self {
                <$t>::EPSILON
            }
            #[inline(always)]
            fn safe_min() -> Self {
                <$t>::MIN_POSITIVE
            }
            #[inline(always)]
            fn infinity() -> Self {
                <$t>::INFINITY
            }
            #[inline(always)]
            fn nan() -> Self {
                <$t>::NAN
            }
            #[inline(always)]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }
            #[inline(always)]
            fn hypot(self, other: Self) -> Self {
                <$t>::hypot(self, other)
            }
            #[inline(always)]
            fn max(self, other: Self) -> Self {
                <$t>::max(self, other)
            }
            #[inline(always)]
            fn min(self, other: Self) -> Self {
                <$t>::min(self, other)
            }
            #[inline(always)]
            fn copysign(self, sign: Self) -> Self {
                <$t>::copysign(self, sign)
            }
            #[inline(always)]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }
            #[inline(always)]
            fn from_f64(x: f64) -> Self {
                x as $t
            }
            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($r:ty, $name:literal) => {
        impl Scalar for Complex<$r> {
            type Real = $r;
            const IS_COMPLEX: bool = true;
            const NAME: &'static str = $name;

            #[inline(always)]
            fn zero() -> Self {
                Complex::new(0.0, 0.0)
            }
            #[inline(always)]
            fn one() -> Self {
                Complex::new(1.0, 0.0)
            }
            #[inline(always)]
            fn from_real(re: $r) -> Self {
                Complex::new(re, 0.0)
            }
            #[inline(always)]
            fn from_parts(re: $r, im: $r) -> Self {
                Complex::new(re, im)
            }
            #[inline(always)]
            fn re(self) -> $r {
                self.re
            }
            #[inline(always)]
            fn im(self) -> $r {
                self.im
            }
            #[inline(always)]
            fn conj(self) -> Self {
                Complex::new(self.re, -self.im)
            }
            #[inline(always)]
            fn abs(self) -> $r {
                self.norm()
            }
            #[inline(always)]
            fn abs1(self) -> $r {
                self.re.abs() + self.im.abs()
            }
            #[inline(always)]
            fn scale(self, r: $r) -> Self {
                Complex::new(self.re * r, self.im * r)
            }
            #[inline(always)]
            fn is_finite(self) -> bool {
                self.re.is_finite() && self.im.is_finite()
            }
        }
    };
}

impl_real_scalar!(f32, "f32");
impl_real_scalar!(f64, "f64");
impl_complex_scalar!(f32, "c32");
impl_complex_scalar!(f64, "c64");
