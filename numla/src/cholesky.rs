//! Cholesky factorization of symmetric/Hermitian positive definite matrices.

use numla_core::{check_info, linalg_bail, LinalgResult, Matrix, MatrixRef, Uplo};
use numla_lapack::Lapack;

use crate::{dispatch, require_square};

/// Triangular Cholesky factor: `A = L L^H` for [`Uplo::Lower`], `A = U^H U`
/// for [`Uplo::Upper`]. Only the `uplo` triangle of `a` is read; the other
/// triangle of the result is zero.
///
/// # Errors
/// `ComputationError` when `a` is not positive definite.
pub fn cholesky<T: Lapack>(a: MatrixRef<'_, T>, uplo: Uplo) -> LinalgResult<Matrix<T>> {
    const ORIGIN: &str = "cholesky";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let n = require_square(ORIGIN, "a", a)?;
        let mut factor = a.to_owned();
        let ld = factor.ld();
        let info = T::potrf(uplo, n, factor.as_mut_slice(), ld);
        check_info(ORIGIN, "potrf", info, |k| {
            format!("matrix is not positive definite (leading minor of order {k})")
        })?;
        for j in 0..n {
            let col = factor.col_mut(j);
            let stale = match uplo {
                Uplo::Lower => &mut col[..j],
                Uplo::Upper => &mut col[j + 1..],
            };
            stale.fill(T::zero());
        }
        Ok(factor)
    })
}

/// Solves `A X = B` given the factor returned by [`cholesky`] with the same `uplo`.
pub fn cholesky_solve<T: Lapack>(factor: MatrixRef<'_, T>, uplo: Uplo, b: MatrixRef<'_, T>) -> LinalgResult<Matrix<T>> {
    const ORIGIN: &str = "cholesky_solve";
    dispatch::<T, _>(ORIGIN, factor.shape(), || {
        let n = require_square(ORIGIN, "factor", factor)?;
        if b.nrows() != n {
            linalg_bail!(Value, ORIGIN, "b is {} x {}, but the factor is {n} x {n}", b.nrows(), b.ncols());
        }
        let mut x = b.to_owned();
        let (nrhs, ldx) = (x.ncols(), x.ld());
        let info = T::potrs(uplo, n, nrhs, factor.as_slice(), factor.ld(), x.as_mut_slice(), ldx);
        check_info(ORIGIN, "potrs", info, |i| format!("unexpected status {i}"))?;
        Ok(x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use numla_core::{c64, RealScalar, Status};

    fn spd() -> Matrix<f64> {
        Matrix::from_rows(&[[6.0, 15.0, 55.0], [15.0, 55.0, 225.0], [55.0, 225.0, 979.0]])
    }

    #[test]
    fn test_lower_factor() {
        let a = spd();
        let l = cholesky(a.as_ref(), Uplo::Lower).unwrap();
        let tol = 100.0 * f64::epsilon().sqrt();
        let expected = [
            [2.449_489_742_783_178, 0.0, 0.0],
            [6.123_724_356_957_945, 4.183_300_132_670_377, 0.0],
            [22.453_655_975_512_47, 20.916_500_663_351_89, 6.110_100_926_607_787],
        ];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(l[(i, j)], expected[i][j], epsilon = tol);
            }
        }
    }

    #[test]
    fn test_upper_factor_reconstructs() {
        let a = spd();
        let u = cholesky(a.as_ref(), Uplo::Upper).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|l| u[(l, i)] * u[(l, j)]).sum();
                assert_relative_eq!(v, a[(i, j)], max_relative = 1e-12);
            }
            for j in 0..i {
                assert_eq!(u[(i, j)], 0.0);
            }
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let a = Matrix::from_rows(&[[1.0f64, 2.0], [2.0, 1.0]]);
        let err = cholesky(a.as_ref(), Uplo::Lower).unwrap_err();
        assert_eq!(err.status(), Status::ComputationError);
        assert!(err.message().contains("order 2"), "{}", err.message());
    }

    #[test]
    fn test_solve_with_factor() {
        let a = spd();
        let x0 = Matrix::from_rows(&[[1.0f64, -1.0], [2.0, 0.5], [3.0, 0.0]]);
        let b = Matrix::from_fn(3, 2, |i, j| (0..3).map(|l| a[(i, l)] * x0[(l, j)]).sum());
        for uplo in [Uplo::Lower, Uplo::Upper] {
            let f = cholesky(a.as_ref(), uplo).unwrap();
            let x = cholesky_solve(f.as_ref(), uplo, b.as_ref()).unwrap();
            for j in 0..2 {
                for i in 0..3 {
                    assert_relative_eq!(x[(i, j)], x0[(i, j)], epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_hermitian() {
        // [[4, 2i], [-2i, 5]] = L L^H with L = [[2, 0], [-i, 2]]
        let a = Matrix::from_rows(&[[c64::new(4.0, 0.0), c64::new(0.0, 2.0)], [c64::new(0.0, -2.0), c64::new(5.0, 0.0)]]);
        let l = cholesky(a.as_ref(), Uplo::Lower).unwrap();
        assert!((l[(0, 0)] - c64::new(2.0, 0.0)).norm() < 1e-14);
        assert!((l[(1, 0)] - c64::new(0.0, -1.0)).norm() < 1e-14);
        assert!((l[(1, 1)] - c64::new(2.0, 0.0)).norm() < 1e-14);
        assert_eq!(l[(0, 1)], c64::new(0.0, 0.0));
    }

    #[test]
    fn test_shape_errors() {
        let f = Matrix::<f64>::identity(3);
        let b = Matrix::<f64>::zeros(2, 1);
        let err = cholesky_solve(f.as_ref(), Uplo::Lower, b.as_ref()).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);
        assert!(err.message().contains("2 x 1"));
    }
}
