//! BLAS Level 2: Matrix-vector operations.
//!
//! Matrices are column-major with a leading dimension. Strided vectors are
//! gathered into contiguous buffers, handed to the `faer` kernels as single
//! columns, and scattered back.

use faer::linalg::matmul::matmul;
use faer::linalg::triangular_solve::{
    solve_lower_triangular_in_place_with_conj, solve_unit_lower_triangular_in_place_with_conj,
    solve_unit_upper_triangular_in_place_with_conj, solve_upper_triangular_in_place_with_conj,
};
use faer::traits::ComplexField;
use faer::{Accum, Conj, MatMut, MatRef, Par};
use numla_core::{Diag, Scalar, Transpose, Uplo};

use crate::{mat_mut, mat_ref};

// ============================================================================
// Gather helpers
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

// ============================================================================
// Triangular orientation shared with level 3
// ============================================================================

/// Resolves `op(A)` of a triangular `A` into the view the kernel reads, the
/// conjugation to apply, and the triangle that view occupies.
pub(crate) fn oriented<T>(a: MatRef<'_, T>, uplo: Uplo, trans: Transpose) -> (MatRef<'_, T>, Conj, Uplo) {
    match trans {
        Transpose::NoTrans => (a, Conj::No, uplo),
        Transpose::Trans => (a.transpose(), Conj::No, uplo.flip()),
        Transpose::ConjTrans => (a.transpose(), Conj::Yes, uplo.flip()),
    }
}

/// rhs := conj?(tri)^-1 * rhs
pub(crate) fn solve_oriented<T: ComplexField>(
    tri: MatRef<'_, T>,
    conj: Conj,
    uplo: Uplo,
    diag: Diag,
    rhs: MatMut<'_, T>,
    par: Par,
) {
    match (uplo, diag) {
        (Uplo::Lower, Diag::NonUnit) => solve_lower_triangular_in_place_with_conj(tri, conj, rhs, par),
        (Uplo::Lower, Diag::Unit) => solve_unit_lower_triangular_in_place_with_conj(tri, conj, rhs, par),
        (Uplo::Upper, Diag::NonUnit) => solve_upper_triangular_in_place_with_conj(tri, conj, rhs, par),
        (Uplo::Upper, Diag::Unit) => solve_unit_upper_triangular_in_place_with_conj(tri, conj, rhs, par),
    }
}

// ============================================================================
// GEMV: General matrix-vector multiply
// y := alpha * op(A) * x + beta * y
// ============================================================================

/// y := alpha * op(A) * x + beta * y, with `A` of shape `m x n`.
///
/// `beta == 0` overwrites `y` without reading it, so NaN or garbage in `y`
/// does not propagate.
pub fn gemv<T: Scalar + ComplexField>(
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    x: &[T],
    incx: usize,
    beta: T,
    y: &mut [T],
    incy: usize,
) {
    let (rows, cols) = trans.apply_shape(m, n);
    if rows == 0 {
        return;
    }

    let xbuf = gather(x, cols, incx);
    let mut ybuf = if beta.is_zero() {
        vec![T::zero(); rows]
    } else {
        let mut buf = gather(y, rows, incy);
        if beta != T::one() {
            for v in buf.iter_mut() {
                *v *= beta;
            }
        }
        buf
    };

    if cols > 0 && !alpha.is_zero() {
        let accum = if beta.is_zero() { Accum::Replace } else { Accum::Add };
        let a = mat_ref(a, m, n, lda);
        let xv = mat_ref(&xbuf, cols, 1, cols);
        let yv = mat_mut(&mut ybuf, rows, 1, rows);
        with_op!(trans, a, |lhs| matmul(yv, accum, lhs, xv, alpha, faer::get_global_parallelism()));
    }
    scatter(&ybuf, y, rows, incy);
}

// ============================================================================
// GER / GERC: rank-1 update
// ============================================================================

/// A := alpha * x * y^T + A, with `A` of shape `m x n`.
pub fn ger<T: Scalar + ComplexField>(
    m: usize,
    n: usize,
    alpha: T,
    x: &[T],
    incx: usize,
    y: &[T],
    incy: usize,
    a: &mut [T],
    lda: usize,
) {
    rank1(Transpose::Trans, m, n, alpha, x, incx, y, incy, a, lda);
}

/// A := alpha * x * y^H + A, with `A` of shape `m x n`.
pub fn gerc<T: Scalar + ComplexField>(
    m: usize,
    n: usize,
    alpha: T,
    x: &[T],
    incx: usize,
    y: &[T],
    incy: usize,
    a: &mut [T],
    lda: usize,
) {
    rank1(Transpose::ConjTrans, m, n, alpha, x, incx, y, incy, a, lda);
}

fn rank1<T: Scalar + ComplexField>(
    ytrans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    x: &[T],
    incx: usize,
    y: &[T],
    incy: usize,
    a: &mut [T],
    lda: usize,
) {
    if m == 0 || n == 0 || alpha.is_zero() {
        return;
    }
    let xbuf = gather(x, m, incx);
    let ybuf = gather(y, n, incy);
    let xv = mat_ref(&xbuf, m, 1, m);
    let yv = mat_ref(&ybuf, n, 1, n);
    let dst = mat_mut(a, m, n, lda);
    with_op!(ytrans, yv, |rhs| matmul(dst, Accum::Add, xv, rhs, alpha, faer::get_global_parallelism()));
}

// ============================================================================
// TRSV: Triangular solve
// op(A) * x = b, x overwrites b
// ============================================================================

/// Solves `op(A) * x = b` for triangular `A` of order `n`; `x` overwrites `b`.
///
/// Only the `uplo` triangle of `A` is read; with `Diag::Unit` its diagonal
/// is not read either and taken to be one.
pub fn trsv<T: Scalar + ComplexField>(
    uplo: Uplo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: &[T],
    lda: usize,
    x: &mut [T],
    incx: usize,
) {
    if n == 0 {
        return;
    }
    let mut xbuf = gather(x, n, incx);
    let (tri, conj, uplo) = oriented(mat_ref(a, n, n, lda), uplo, trans);
    solve_oriented(tri, conj, uplo, diag, mat_mut(&mut xbuf, n, 1, n), faer::get_global_parallelism());
    scatter(&xbuf, x, n, incx);
}
