//! Cholesky factorization of symmetric/Hermitian positive definite matrices.

use faer::dyn_stack::{MemBuffer, MemStack};
use faer::linalg::cholesky::llt::factor::{cholesky_in_place, cholesky_in_place_scratch, LltError};
use faer::linalg::triangular_solve::{
    solve_lower_triangular_in_place_with_conj, solve_upper_triangular_in_place_with_conj,
};
use faer::traits::ComplexField;
use faer::Conj;
use numla_core::layout::{index, required_len};
use numla_core::{Scalar, Uplo};

use crate::config::par;
use crate::workspace::{mat_mut, mat_ref};

/// Copies the `uplo` triangle of `a` into the lower triangle of the dense
/// `n x n` buffer `low`, conjugate-transposing an upper triangle. The strict
/// upper part of `low` is zeroed.
pub(crate) fn gather_lower<T: Scalar>(uplo: Uplo, n: usize, a: &[T], lda: usize, low: &mut [T]) {
    for j in 0..n {
        low[j * n..j * n + j].fill(T::zero());
        for i in j..n {
            low[j * n + i] = match uplo {
                Uplo::Lower => a[index(i, j, lda)],
                Uplo::Upper => a[index(j, i, lda)].conj(),
            };
        }
    }
}

// ============================================================================
// POTRF: A = L * L^H or A = U^H * U
// ============================================================================

pub(crate) fn potrf<T: Scalar + ComplexField>(uplo: Uplo, n: usize, a: &mut [T], lda: usize) -> i32 {
    const ROUTINE: &str = "potrf";
    if lda < n.max(1) {
        reject!(ROUTINE, 4, "lda = {lda} < max(1, n = {n})");
    }
    if a.len() < required_len(n, n, lda) {
        reject!(ROUTINE, 3, "length {} cannot hold {n} x {n} with lda = {lda}", a.len());
    }
    if n == 0 {
        return 0;
    }

    // Factor a private lower copy so the unreferenced triangle is never touched.
    let mut low = vec![T::zero(); n * n];
    gather_lower(uplo, n, a, lda, &mut low);
    let par = par();
    let mut mem = MemBuffer::new(cholesky_in_place_scratch::<T>(n, par, Default::default()));
    let result = cholesky_in_place(
        mat_mut(&mut low, n, n, n),
        Default::default(),
        par,
        MemStack::new(&mut mem),
        Default::default(),
    );
    if let Err(LltError::NonPositivePivot { index: k }) = result {
        return (k + 1).min(n) as i32;
    }

    for j in 0..n {
        for i in j..n {
            let l = low[j * n + i];
            match uplo {
                Uplo::Lower => a[index(i, j, lda)] = l,
                Uplo::Upper => a[index(j, i, lda)] = l.conj(),
            }
        }
    }
    0
}

// ============================================================================
// POTRS: solve A * X = B from the Cholesky factor
// ============================================================================

pub(crate) fn potrs<T: Scalar + ComplexField>(
    uplo: Uplo,
    n: usize,
    nrhs: usize,
    a: &[T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> i32 {
    const ROUTINE: &str = "potrs";
    if lda < n.max(1) {
        reject!(ROUTINE, 5, "lda = {lda} < max(1, n = {n})");
    }
    if a.len() < required_len(n, n, lda) {
        reject!(ROUTINE, 4, "length {} cannot hold {n} x {n} with lda = {lda}", a.len());
    }
    if ldb < n.max(1) {
        reject!(ROUTINE, 7, "ldb = {ldb} < max(1, n = {n})");
    }
    if b.len() < required_len(n, nrhs, ldb) {
        reject!(ROUTINE, 6, "length {} cannot hold {n} x {nrhs} with ldb = {ldb}", b.len());
    }
    if n == 0 || nrhs == 0 {
        return 0;
    }

    let par = par();
    let factor = mat_ref(a, n, n, lda);
    let mut rhs = mat_mut(b, n, nrhs, ldb);
    match uplo {
        Uplo::Lower => {
            // L y = b, then L^H x = y
            solve_lower_triangular_in_place_with_conj(factor, Conj::No, rhs.as_mut(), par);
            solve_upper_triangular_in_place_with_conj(factor.transpose(), Conj::Yes, rhs, par);
        }
        Uplo::Upper => {
            // U^H y = b, then U x = y
            solve_lower_triangular_in_place_with_conj(factor.transpose(), Conj::Yes, rhs.as_mut(), par);
            solve_upper_triangular_in_place_with_conj(factor, Conj::No, rhs, par);
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use crate::Lapack;
    use approx::assert_relative_eq;
    use numla_core::{c64, Uplo};

    #[test]
    fn test_spotrf_cholesky() {
        // A = [[4, 2], [2, 3]] (symmetric positive definite)
        let mut a = vec![4.0f32, 2.0, 2.0, 3.0];
        let info = f32::potrf(Uplo::Lower, 2, &mut a, 2);
        assert_eq!(info, 0);

        // L[0,0] = sqrt(4) = 2
        assert!((a[0] - 2.0).abs() < 1e-6);
        // L[1,0] = 2/2 = 1
        assert!((a[1] - 1.0).abs() < 1e-6);
        // L[1,1] = sqrt(3 - 1) = sqrt(2)
        assert!((a[3] - 2.0f32.sqrt()).abs() < 1e-6);
        // upper triangle untouched
        assert_eq!(a[2], 2.0);
    }

    #[test]
    fn test_spotrf_not_positive_definite() {
        // A = [[1, 2], [2, 1]], not positive definite
        let mut a = vec![1.0f32, 2.0, 2.0, 1.0];
        let info = f32::potrf(Uplo::Lower, 2, &mut a, 2);
        assert!(info > 0, "Should detect non-positive-definite matrix");
    }

    #[test]
    fn test_dpotrf_upper_reads_upper_triangle() {
        // lower triangle holds garbage that must be ignored
        let mut a = vec![4.0f64, 99.0, 2.0, 3.0];
        assert_eq!(f64::potrf(Uplo::Upper, 2, &mut a, 2), 0);
        assert_relative_eq!(a[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(a[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(a[3], 2.0f64.sqrt(), epsilon = 1e-12);
        assert_eq!(a[1], 99.0);
    }

    #[test]
    fn test_spotrf_and_solve() {
        // A = [[4, 2], [2, 3]], SPD
        let mut a = vec![4.0f32, 2.0, 2.0, 3.0];
        let info = f32::potrf(Uplo::Lower, 2, &mut a, 2);
        assert_eq!(info, 0);

        // Solve A*x = [8, 8] using Cholesky
        // Expected: 4x0+2x1=8, 2x0+3x1=8 → x = [1, 2]
        let mut b = vec![8.0f32, 8.0];
        assert_eq!(f32::potrs(Uplo::Lower, 2, 1, &a, 2, &mut b, 2), 0);
        assert!((b[0] - 1.0).abs() < 1e-4, "x[0] = {}", b[0]);
        assert!((b[1] - 2.0).abs() < 1e-4, "x[1] = {}", b[1]);
    }

    #[test]
    fn test_hermitian_upper_solve() {
        // A = [[2, i], [-i, 2]] is Hermitian positive definite
        let mut a = vec![
            c64::new(2.0, 0.0),
            c64::new(0.0, -1.0),
            c64::new(0.0, 1.0),
            c64::new(2.0, 0.0),
        ];
        let a0 = a.clone();
        assert_eq!(c64::potrf(Uplo::Upper, 2, &mut a, 2), 0);

        let x = [c64::new(1.0, 1.0), c64::new(-2.0, 0.5)];
        let mut b = vec![
            a0[0] * x[0] + a0[2] * x[1],
            a0[1] * x[0] + a0[3] * x[1],
        ];
        assert_eq!(c64::potrs(Uplo::Upper, 2, 1, &a, 2, &mut b, 2), 0);
        assert!((b[0] - x[0]).norm() < 1e-12);
        assert!((b[1] - x[1]).norm() < 1e-12);
    }

    #[test]
    fn test_argument_errors() {
        let mut a = vec![1.0f64; 3];
        assert_eq!(f64::potrf(Uplo::Lower, 2, &mut a, 2), -3);
        assert_eq!(f64::potrf(Uplo::Lower, 2, &mut a, 1), -4);
    }
}
