//! Linear systems and determinants through LU with partial pivoting.

use numla_core::{check_info, linalg_bail, LinalgResult, Matrix, MatrixMut, MatrixRef};
use numla_lapack::Lapack;

use crate::{dispatch, require_square};

fn singular(info: i32) -> String {
    format!("matrix is singular: U[{k}, {k}] is exactly zero", k = info - 1)
}

/// Solves `A x = b` for one right-hand side vector.
///
/// # Errors
/// `ValueError` when `a` is not square, is empty, or `b` does not have one
/// entry per row of `a`. `ComputationError` when `a` is singular.
pub fn solve<T: Lapack>(a: MatrixRef<'_, T>, b: &[T]) -> LinalgResult<Vec<T>> {
    const ORIGIN: &str = "solve";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let n = require_square(ORIGIN, "a", a)?;
        if b.len() != n {
            linalg_bail!(Value, ORIGIN, "b has length {}, but a is {n} x {n}", b.len());
        }
        let mut lu = a.to_owned();
        let mut x = b.to_vec();
        let mut ipiv = vec![0usize; n];
        let info = T::gesv(n, 1, lu.as_mut_slice(), n, &mut ipiv, &mut x, n);
        check_info(ORIGIN, "gesv", info, singular)?;
        Ok(x)
    })
}

/// Solves `A X = B` for a matrix of right-hand sides.
pub fn solve_many<T: Lapack>(a: MatrixRef<'_, T>, b: MatrixRef<'_, T>) -> LinalgResult<Matrix<T>> {
    const ORIGIN: &str = "solve_many";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let n = require_square(ORIGIN, "a", a)?;
        if b.nrows() != n {
            linalg_bail!(Value, ORIGIN, "b is {} x {}, but a is {n} x {n}", b.nrows(), b.ncols());
        }
        let nrhs = b.ncols();
        let mut lu = a.to_owned();
        let mut x = b.to_owned();
        let mut ipiv = vec![0usize; n];
        let info = T::gesv(n, nrhs, lu.as_mut_slice(), n, &mut ipiv, x.as_mut_slice(), n);
        check_info(ORIGIN, "gesv", info, singular)?;
        Ok(x)
    })
}

/// Solves `A X = B` in place: `a` is overwritten with its LU factors and `b`
/// with the solution.
pub fn solve_overwrite<T: Lapack>(mut a: MatrixMut<'_, T>, mut b: MatrixMut<'_, T>) -> LinalgResult<()> {
    const ORIGIN: &str = "solve_overwrite";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let n = require_square(ORIGIN, "a", a.rb())?;
        if b.nrows() != n {
            linalg_bail!(Value, ORIGIN, "b is {} x {}, but a is {n} x {n}", b.nrows(), b.ncols());
        }
        let (lda, ldb, nrhs) = (a.ld(), b.ld(), b.ncols());
        let mut ipiv = vec![0usize; n];
        let info = T::gesv(n, nrhs, a.as_mut_slice(), lda, &mut ipiv, b.as_mut_slice(), ldb);
        check_info(ORIGIN, "gesv", info, singular)
    })
}

/// Determinant from the LU factorization; singular matrices give zero.
pub fn det<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<T> {
    const ORIGIN: &str = "det";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let n = require_square(ORIGIN, "a", a)?;
        let mut lu = a.to_owned();
        let mut ipiv = vec![0usize; n];
        let info = T::getrf(n, n, lu.as_mut_slice(), n, &mut ipiv);
        if info > 0 {
            return Ok(T::zero());
        }
        check_info(ORIGIN, "getrf", info, singular)?;

        let mut det = T::one();
        for (k, &p) in ipiv.iter().enumerate() {
            det *= lu[(k, k)];
            if p != k {
                det = -det;
            }
        }
        Ok(det)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use numla_core::{c64, Status};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_solve_2x2() {
        // [[2, 1], [1, 3]] x = [5, 7] -> x = [1.6, 1.8]
        let a = Matrix::from_rows(&[[2.0f64, 1.0], [1.0, 3.0]]);
        let x = solve(a.as_ref(), &[5.0, 7.0]).unwrap();
        assert_relative_eq!(x[0], 1.6, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.8, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch_cites_both_sizes() {
        let a = Matrix::<f64>::identity(3);
        let err = solve(a.as_ref(), &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);
        assert_eq!(err.origin(), "solve");
        assert!(err.message().contains('4'), "{}", err.message());
        assert!(err.message().contains("3 x 3"), "{}", err.message());
    }

    #[test]
    fn test_singular_is_computation_error() {
        let a = Matrix::from_rows(&[[1.0f64, 1.0], [1.0, 1.0]]);
        let err = solve(a.as_ref(), &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.status(), Status::ComputationError);
    }

    #[test]
    fn test_rejects_non_square_and_empty() {
        let a = Matrix::<f32>::zeros(2, 3);
        assert_eq!(solve(a.as_ref(), &[1.0, 2.0]).unwrap_err().status(), Status::ValueError);
        let e = Matrix::<f32>::zeros(0, 0);
        assert_eq!(solve(e.as_ref(), &[]).unwrap_err().status(), Status::ValueError);
    }

    #[test]
    fn test_solve_many_random() {
        let n = 8;
        let mut rng = StdRng::seed_from_u64(1);
        let a = Matrix::from_fn(n, n, |i, j| rng.gen_range(-1.0..1.0) + if i == j { n as f64 } else { 0.0 });
        let x0 = Matrix::from_fn(n, 3, |i, j| (i + 2 * j) as f64);
        let b = Matrix::from_fn(n, 3, |i, j| (0..n).map(|l| a[(i, l)] * x0[(l, j)]).sum());
        let x = solve_many(a.as_ref(), b.as_ref()).unwrap();
        for j in 0..3 {
            for i in 0..n {
                assert_relative_eq!(x[(i, j)], x0[(i, j)], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_solve_overwrite_on_padded_views() {
        // 2x2 system stored with ld = 3
        let mut a = Matrix::from_col_major_with_ld(vec![4.0f64, 2.0, -1.0, 1.0, 3.0, -1.0], 2, 2, 3);
        let mut b = Matrix::from_col_major(vec![6.0f64, 8.0], 2, 1);
        solve_overwrite(a.as_mut(), b.as_mut()).unwrap();
        // [[4, 1], [2, 3]] x = [6, 8] -> x = [1, 2]
        assert_relative_eq!(b[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(b[(1, 0)], 2.0, epsilon = 1e-12);
        assert_eq!(a.as_slice()[2], -1.0);
    }

    #[test]
    fn test_det() {
        let a = Matrix::from_rows(&[[1.0f64, 2.0], [3.0, 4.0]]);
        assert_relative_eq!(det(a.as_ref()).unwrap(), -2.0, epsilon = 1e-12);

        // one row swap
        let p = Matrix::from_rows(&[[0.0f64, 1.0], [1.0, 0.0]]);
        assert_relative_eq!(det(p.as_ref()).unwrap(), -1.0, epsilon = 1e-12);

        let s = Matrix::from_rows(&[[1.0f64, 1.0], [1.0, 1.0]]);
        assert_eq!(det(s.as_ref()).unwrap(), 0.0);
    }

    #[test]
    fn test_complex_det() {
        // diag(i, 2) -> 2i
        let z = c64::new(0.0, 0.0);
        let a = Matrix::from_rows(&[[c64::new(0.0, 1.0), z], [z, c64::new(2.0, 0.0)]]);
        let d = det(a.as_ref()).unwrap();
        assert!((d - c64::new(0.0, 2.0)).norm() < 1e-12);
    }
}
