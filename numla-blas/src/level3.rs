//! BLAS Level 3: Matrix-matrix operations.
//!
//! `gemm` hands `op(A)` and `op(B)` to the `faer` multiply as transposed or
//! adjoint views, so no operand is repacked. `trsm` reduces right-side
//! solves to left-side ones on the transposed right-hand side.

use faer::linalg::matmul::matmul;
use faer::traits::ComplexField;
use faer::Accum;
use numla_core::layout::index;
use numla_core::{Diag, Scalar, Side, Transpose, Uplo};

use crate::level2::{oriented, solve_oriented};
use crate::{mat_mut, mat_ref};

/// B := alpha * B over the leading `m x n` block.
fn scale_block<T: Scalar>(m: usize, n: usize, alpha: T, b: &mut [T], ldb: usize) {
    if alpha == T::one() {
        return;
    }
    for j in 0..n {
        let col = &mut b[index(0, j, ldb)..index(0, j, ldb) + m];
        if alpha.is_zero() {
            col.fill(T::zero());
        } else {
            for v in col.iter_mut() {
                *v *= alpha;
            }
        }
    }
}

// ============================================================================
// GEMM: General Matrix Multiply
// C := alpha * op(A) * op(B) + beta * C
// ============================================================================

/// C := alpha * op(A) * op(B) + beta * C, with `op(A)` of shape `m x k`,
/// `op(B)` of shape `k x n` and `C` of shape `m x n`.
///
/// `beta == 0` overwrites `C` without reading it.
pub fn gemm<T: Scalar + ComplexField>(
    transa: Transpose,
    transb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 || alpha.is_zero() {
        scale_block(m, n, beta, c, ldc);
        return;
    }

    // Accum::Replace never reads C, so beta == 0 needs no clearing pass.
    let accum = if beta.is_zero() {
        Accum::Replace
    } else {
        scale_block(m, n, beta, c, ldc);
        Accum::Add
    };

    let (ar, ac) = transa.apply_shape(m, k);
    let (br, bc) = transb.apply_shape(k, n);
    let av = mat_ref(a, ar, ac, lda);
    let bv = mat_ref(b, br, bc, ldb);
    let cv = mat_mut(c, m, n, ldc);
    let par = faer::get_global_parallelism();
    with_op!(transa, av, |lhs| with_op!(transb, bv, |rhs| matmul(cv, accum, lhs, rhs, alpha, par)));
}

// ============================================================================
// TRSM: Triangular solve with multiple right-hand sides
// op(A) * X = alpha * B   (Side::Left)
// X * op(A) = alpha * B   (Side::Right)
// ============================================================================

/// Solves a triangular system with many right-hand sides; `X` overwrites
/// the `m x n` matrix `B`.
///
/// `A` has order `m` for `Side::Left` and `n` for `Side::Right`. Only its
/// `uplo` triangle is read.
pub fn trsm<T: Scalar + ComplexField>(
    side: Side,
    uplo: Uplo,
    transa: Transpose,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    scale_block(m, n, alpha, b, ldb);
    if alpha.is_zero() {
        return;
    }

    let par = faer::get_global_parallelism();
    let rhs = mat_mut(b, m, n, ldb);
    match side {
        Side::Left => {
            let (tri, conj, uplo) = oriented(mat_ref(a, m, m, lda), uplo, transa);
            solve_oriented(tri, conj, uplo, diag, rhs, par);
        }
        Side::Right => {
            // X op(A) = B  <=>  op(A)^T X^T = B^T
            let (tri, conj, uplo) = oriented(mat_ref(a, n, n, lda), uplo, transa);
            solve_oriented(tri.transpose(), conj, uplo.flip(), diag, rhs.transpose_mut(), par);
        }
    }
}
