//! LAPACK-style option enumerations and column-major indexing.
//!
//! Every matrix in the numla ecosystem is stored column-major with an
//! explicit leading dimension, matching the Fortran LAPACK convention.
//! The option enums carry the character codes LAPACK uses for them.

/// Linear index of element (i, j) in a column-major buffer with leading dimension `ld`.
#[inline(always)]
pub fn index(i: usize, j: usize, ld: usize) -> usize {
    j * ld + i
}

/// Minimum buffer length holding an `m x n` column-major matrix with leading dimension `ld`.
#[inline]
pub fn required_len(m: usize, n: usize, ld: usize) -> usize {
    if m == 0 || n == 0 {
        0
    } else {
        (n - 1) * ld + m
    }
}

/// Transpose operation for matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Transpose {
    /// No transpose.
    #[default]
    NoTrans = b'N',
    /// Transpose.
    Trans = b'T',
    /// Conjugate transpose (same as `Trans` for real types).
    ConjTrans = b'C',
}

/// Triangle specifier (upper/lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Uplo {
    #[default]
    Upper = b'U',
    Lower = b'L',
}

/// Side specifier (left/right multiplication).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Side {
    #[default]
    Left = b'L',
    Right = b'R',
}

/// Diagonal specifier (unit/non-unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Diag {
    #[default]
    NonUnit = b'N',
    Unit = b'U',
}

/// Which vectors a decomposition computes (`jobz` in LAPACK).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Job {
    /// Values only.
    NoVectors = b'N',
    /// The leading `min(m, n)` vectors (reduced SVD).
    Reduced = b'S',
    /// All vectors.
    #[default]
    Full = b'A',
}

macro_rules! impl_char_code {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $ty {
            /// LAPACK character code.
            #[inline]
            pub fn as_char(self) -> char {
                self as u8 as char
            }

            /// Parses a LAPACK character code, case-insensitively.
            pub fn from_char(c: char) -> Option<Self> {
                let c = c.to_ascii_uppercase();
                $(
                    if c == $ty::$variant.as_char() {
                        return Some($ty::$variant);
                    }
                )+
                None
            }
        }
    };
}

impl_char_code!(Transpose { NoTrans, Trans, ConjTrans });
impl_char_code!(Uplo { Upper, Lower });
impl_char_code!(Side { Left, Right });
impl_char_code!(Diag { NonUnit, Unit });
impl_char_code!(Job { NoVectors, Reduced, Full });

impl Uplo {
    /// The opposite triangle.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Uplo::Upper => Uplo::Lower,
            Uplo::Lower => Uplo::Upper,
        }
    }
}

impl Transpose {
    /// Shape of `op(A)` for an `m x n` matrix `A`.
    #[inline]
    pub fn apply_shape(self, m: usize, n: usize) -> (usize, usize) {
        match self {
            Transpose::NoTrans => (m, n),
            Transpose::Trans | Transpose::ConjTrans => (n, m),
        }
    }
}
