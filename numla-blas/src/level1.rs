//! BLAS Level 1: Vector-vector operations.
//!
//! Every routine takes the element count `n` and a stride per vector.
//! Strided access (incx/incy > 1) gathers into contiguous buffers first and
//! scatters results back, so the kernels only ever see packed slices.

use numla_core::{RealScalar, Scalar};

// ============================================================================
// Strided gather helpers
// ============================================================================

#[inline]
fn gather<T: Scalar>(x: &[T], n: usize, inc: usize) -> Vec<T> {
    let mut buf = Vec::with_capacity(n);
    for i in 0..n {
        buf.push(x[i * inc]);
    }
    buf
}

#[inline]
fn scatter<T: Scalar>(buf: &[T], dst: &mut [T], n: usize, inc: usize) {
    for i in 0..n {
        dst[i * inc] = buf[i];
    }
}

/// Runs `f` on packed views of `x`, gathering when strided.
#[inline]
fn with_packed<T: Scalar, R>(x: &[T], n: usize, inc: usize, f: impl FnOnce(&[T]) -> R) -> R {
    if inc == 1 {
        f(&x[..n])
    } else {
        f(&gather(x, n, inc))
    }
}

/// Runs `f` on a packed mutable view of `x`, scattering back when strided.
#[inline]
fn with_packed_mut<T: Scalar>(x: &mut [T], n: usize, inc: usize, f: impl FnOnce(&mut [T])) {
    if inc == 1 {
        f(&mut x[..n]);
    } else {
        let mut buf = gather(x, n, inc);
        f(&mut buf);
        scatter(&buf, x, n, inc);
    }
}

// ============================================================================
// DOT: inner products
// ============================================================================

/// Unconjugated dot product: result = x^T * y
#[inline]
pub fn dot<T: Scalar>(n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> T {
    with_packed(x, n, incx, |x| {
        with_packed(y, n, incy, |y| {
            x.iter().zip(y).fold(T::zero(), |acc, (&a, &b)| acc + a * b)
        })
    })
}

/// Conjugated dot product: result = x^H * y (equal to [`dot`] for real types)
#[inline]
pub fn dotc<T: Scalar>(n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> T {
    with_packed(x, n, incx, |x| {
        with_packed(y, n, incy, |y| {
            x.iter().zip(y).fold(T::zero(), |acc, (&a, &b)| acc + a.conj() * b)
        })
    })
}

// ============================================================================
// AXPY: y = alpha * x + y
// ============================================================================

/// y := alpha * x + y
#[inline]
pub fn axpy<T: Scalar>(n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) {
    if alpha.is_zero() {
        return;
    }
    with_packed(x, n, incx, |x| {
        with_packed_mut(y, n, incy, |y| {
            for (yi, &xi) in y.iter_mut().zip(x) {
                *yi += alpha * xi;
            }
        })
    });
}

// ============================================================================
// SCAL: x = alpha * x
// ============================================================================

/// x := alpha * x
#[inline]
pub fn scal<T: Scalar>(n: usize, alpha: T, x: &mut [T], incx: usize) {
    with_packed_mut(x, n, incx, |x| {
        for xi in x.iter_mut() {
            *xi *= alpha;
        }
    });
}

// ============================================================================
// NRM2: Euclidean norm
// ============================================================================

/// Euclidean norm ||x||_2.
///
/// Accumulates a scaled sum of squares, so entries near the overflow
/// threshold do not overflow and tiny entries do not underflow to zero.
pub fn nrm2<T: Scalar>(n: usize, x: &[T], incx: usize) -> T::Real {
    let zero = T::Real::zero();
    let one = T::Real::one();
    let mut scale = zero;
    let mut ssq = one;

    let mut accumulate = |v: T::Real| {
        if v != zero {
            let a = v.abs();
            if scale < a {
                let r = scale / a;
                ssq = one + ssq * r * r;
                scale = a;
            } else {
                let r = a / scale;
                ssq += r * r;
            }
        }
    };
    for i in 0..n {
        let xi = x[i * incx];
        accumulate(xi.re());
        if T::IS_COMPLEX {
            accumulate(xi.im());
        }
    }
    scale * ssq.sqrt()
}

// ============================================================================
// ASUM: sum of |re| + |im|
// ============================================================================

/// Sum of `abs1` over the vector (plain absolute values for real types).
#[inline]
pub fn asum<T: Scalar>(n: usize, x: &[T], incx: usize) -> T::Real {
    (0..n).fold(T::Real::zero(), |acc, i| acc + x[i * incx].abs1())
}

// ============================================================================
// IAMAX: index of max |re| + |im|
// ============================================================================

/// Index of the first element with the largest `abs1`, `None` when `n == 0`.
pub fn iamax<T: Scalar>(n: usize, x: &[T], incx: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let mut best = 0;
    let mut best_val = x[0].abs1();
    for i in 1..n {
        let v = x[i * incx].abs1();
        if v > best_val {
            best = i;
            best_val = v;
        }
    }
    Some(best)
}

// ============================================================================
// COPY / SWAP
// ============================================================================

/// y := x
#[inline]
pub fn copy<T: Scalar>(n: usize, x: &[T], incx: usize, y: &mut [T], incy: usize) {
    if incx == 1 && incy == 1 {
        y[..n].copy_from_slice(&x[..n]);
    } else {
        for i in 0..n {
            y[i * incy] = x[i * incx];
        }
    }
}

/// x <-> y
#[inline]
pub fn swap<T: Scalar>(n: usize, x: &mut [T], incx: usize, y: &mut [T], incy: usize) {
    if incx == 1 && incy == 1 {
        x[..n].swap_with_slice(&mut y[..n]);
    } else {
        for i in 0..n {
            core::mem::swap(&mut x[i * incx], &mut y[i * incy]);
        }
    }
}

// ============================================================================
// ROTG / ROT: plane rotations
// ============================================================================

/// Constructs a Givens rotation `(c, s)` zeroing `b`:
///
/// ```text
/// [  c  s ] [ a ]   [ r ]
/// [ -s  c ] [ b ] = [ 0 ]
/// ```
///
/// On return `a` holds `r` and `b` holds the reconstruction value `z`
/// (`s` if `|a| > |b|`, `1 / c` if `c != 0`, else `1`). Intermediate values
/// are scaled into the safe range, so `a` and `b` near the overflow or
/// underflow threshold are handled without spurious overflow.
pub fn rotg<R: RealScalar>(a: &mut R, b: &mut R) -> (R, R) {
    let zero = R::zero();
    let one = R::one();
    let safmin = R::safe_min();
    let safmax = one / safmin;

    let anorm = a.abs();
    let bnorm = b.abs();
    if bnorm == zero {
        *b = zero;
        return (one, zero);
    }
    if anorm == zero {
        *a = *b;
        *b = one;
        return (zero, one);
    }

    let scl = safmax.min(safmin.max(anorm.max(bnorm)));
    let sigma = if anorm > bnorm { one.copysign(*a) } else { one.copysign(*b) };
    let (sa, sb) = (*a / scl, *b / scl);
    let r = sigma * (scl * (sa * sa + sb * sb).sqrt());
    let c = *a / r;
    let s = *b / r;
    let z = if anorm > bnorm {
        s
    } else if c != zero {
        one / c
    } else {
        one
    };
    *a = r;
    *b = z;
    (c, s)
}

/// Applies a plane rotation to the pairs `(x_i, y_i)`:
///
/// ```text
/// x_i := c * x_i + s * y_i
/// y_i := c * y_i - conj(s) * x_i
/// ```
pub fn rot<T: Scalar>(n: usize, x: &mut [T], incx: usize, y: &mut [T], incy: usize, c: T::Real, s: T) {
    for i in 0..n {
        let xi = x[i * incx];
        let yi = y[i * incy];
        x[i * incx] = xi.scale(c) + s * yi;
        y[i * incy] = yi.scale(c) - s.conj() * xi;
    }
}
