//! Matrix inverse through LU, Moore-Penrose pseudo-inverse through the SVD.

use numla_blas::level1::axpy;
use numla_core::{check_info, linalg_bail, Job, LinalgResult, Matrix, MatrixMut, MatrixRef, RealScalar, Scalar};
use numla_lapack::{Lapack, LWORK_QUERY};

use crate::{dispatch, query_workspace, require_square};

fn singular(info: i32) -> String {
    format!("matrix is singular: U[{k}, {k}] is exactly zero", k = info - 1)
}

fn invert_in_place<T: Lapack>(origin: &'static str, mut a: MatrixMut<'_, T>) -> LinalgResult<()> {
    let n = require_square(origin, "a", a.rb())?;
    let lda = a.ld();
    let mut ipiv = vec![0usize; n];
    check_info(origin, "getrf", T::getrf(n, n, a.as_mut_slice(), lda, &mut ipiv), singular)?;

    let mut work = query_workspace(origin, "getri", |w| {
        T::getri(n, a.as_mut_slice(), lda, &ipiv, w, LWORK_QUERY)
    })?;
    let lwork = work.len() as isize;
    let info = T::getri(n, a.as_mut_slice(), lda, &ipiv, &mut work, lwork);
    check_info(origin, "getri", info, singular)
}

/// Inverse of a square matrix.
///
/// # Errors
/// `ValueError` for non-square or empty input, `ComputationError` when the
/// matrix is singular.
pub fn inv<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<Matrix<T>> {
    const ORIGIN: &str = "inv";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let mut out = a.to_owned();
        invert_in_place(ORIGIN, out.as_mut())?;
        Ok(out)
    })
}

/// Replaces `a` with its inverse. On error the contents of `a` are unspecified.
pub fn inv_overwrite<T: Lapack>(a: MatrixMut<'_, T>) -> LinalgResult<()> {
    const ORIGIN: &str = "inv_overwrite";
    dispatch::<T, _>(ORIGIN, a.shape(), || invert_in_place(ORIGIN, a))
}

/// Moore-Penrose pseudo-inverse, of shape `n x m` for an `m x n` input.
///
/// Singular values at or below the cutoff are treated as zero rather than
/// inverted. The cutoff is `max(m, n) * eps * s_max`, or `rtol * s_max` when
/// a relative tolerance is given.
///
/// ```
/// use numla::{pinv, Matrix};
///
/// // diag(2, 1e-20): the tiny singular value is below the cutoff
/// let a = Matrix::<f64>::from_rows(&[[2.0, 0.0], [0.0, 1e-20]]);
/// let p = pinv(a.as_ref(), None).unwrap();
/// assert_eq!(p[(0, 0)], 0.5);
/// assert_eq!(p[(1, 1)], 0.0);
/// ```
pub fn pinv<T: Lapack>(a: MatrixRef<'_, T>, rtol: Option<T::Real>) -> LinalgResult<Matrix<T>> {
    const ORIGIN: &str = "pinv";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let (m, n) = a.shape();
        if let Some(r) = rtol {
            if !r.is_finite() || r < T::Real::zero() {
                linalg_bail!(Value, ORIGIN, "rtol must be finite and nonnegative, got {r}");
            }
        }
        if m == 0 || n == 0 {
            return Ok(Matrix::zeros(n, m));
        }

        let k = m.min(n);
        let mut s = vec![T::Real::zero(); k];
        let mut u = Matrix::<T>::zeros(m, k);
        let mut vt = Matrix::<T>::zeros(k, n);
        let mut work = query_workspace(ORIGIN, "gesdd", |w| {
            T::gesdd(
                Job::Reduced,
                m,
                n,
                a.as_slice(),
                a.ld(),
                &mut s,
                u.as_mut_slice(),
                m,
                vt.as_mut_slice(),
                k,
                w,
                LWORK_QUERY,
            )
        })?;
        let lwork = work.len() as isize;
        let info = T::gesdd(
            Job::Reduced,
            m,
            n,
            a.as_slice(),
            a.ld(),
            &mut s,
            u.as_mut_slice(),
            m,
            vt.as_mut_slice(),
            k,
            &mut work,
            lwork,
        );
        check_info(ORIGIN, "gesdd", info, |_| String::from("singular value decomposition did not converge"))?;

        let smax = s[0];
        let cutoff = match rtol {
            Some(r) => r * smax,
            None => T::Real::from_usize(m.max(n)) * T::Real::epsilon() * smax,
        };

        // X = sum over kept l of v_l * u_l^H / s_l
        let mut x = Matrix::<T>::zeros(n, m);
        let mut v = vec![T::zero(); n];
        for (l, &sl) in s.iter().enumerate().take_while(|&(_, &sl)| sl > cutoff) {
            let inv_s = T::Real::one() / sl;
            for (i, vi) in v.iter_mut().enumerate() {
                *vi = vt[(l, i)].conj();
            }
            for j in 0..m {
                let coef = u[(j, l)].conj().scale(inv_s);
                axpy(n, coef, &v, 1, x.col_mut(j), 1);
            }
        }
        log::debug!("{ORIGIN}: cutoff {cutoff}, singular values {s:?}");
        Ok(x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use numla_core::{c64, Status};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn matmul<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
        Matrix::from_fn(a.nrows(), b.ncols(), |i, j| {
            (0..a.ncols()).fold(T::zero(), |acc, l| acc + a[(i, l)] * b[(l, j)])
        })
    }

    fn max_diff<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> f64 {
        assert_eq!(a.shape(), b.shape());
        let mut d = 0.0f64;
        for j in 0..a.ncols() {
            for i in 0..a.nrows() {
                d = d.max((a[(i, j)] - b[(i, j)]).abs().to_f64());
            }
        }
        d
    }

    #[test]
    fn test_inv_2x2() {
        let a = Matrix::from_rows(&[[4.0f64, 7.0], [2.0, 6.0]]);
        let ai = inv(a.as_ref()).unwrap();
        let expected = Matrix::from_rows(&[[0.6, -0.7], [-0.2, 0.4]]);
        assert!(max_diff(&ai, &expected) < 1e-12);
    }

    #[test]
    fn test_inv_overwrite_complex() {
        let mut rng = StdRng::seed_from_u64(4);
        let n = 5;
        let a = Matrix::from_fn(n, n, |_, _| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
        let mut ai = a.clone();
        inv_overwrite(ai.as_mut()).unwrap();
        assert!(max_diff(&matmul(&a, &ai), &Matrix::identity(n)) < 1e-10);
    }

    #[test]
    fn test_inv_singular() {
        let a = Matrix::from_rows(&[[1.0f32, 2.0], [2.0, 4.0]]);
        assert_eq!(inv(a.as_ref()).unwrap_err().status(), Status::ComputationError);
    }

    #[test]
    fn test_pinv_moore_penrose_conditions() {
        let mut rng = StdRng::seed_from_u64(10);
        for (m, n) in [(5, 3), (3, 5), (4, 4)] {
            let a = Matrix::from_fn(m, n, |_, _| rng.gen_range(-1.0f64..1.0));
            let x = pinv(a.as_ref(), None).unwrap();
            assert_eq!(x.shape(), (n, m));
            assert!(max_diff(&matmul(&matmul(&a, &x), &a), &a) < 1e-10);
            assert!(max_diff(&matmul(&matmul(&x, &a), &x), &x) < 1e-10);
        }
    }

    #[test]
    fn test_pinv_rank_one_is_bounded() {
        // A = x y^T with x = [1, 2, 3], y = [1, 2]: pinv(A) = y x^T / (|x|^2 |y|^2)
        let a = Matrix::from_fn(3, 2, |i, j| ((i + 1) * (j + 1)) as f64);
        let p = pinv(a.as_ref(), None).unwrap();
        let expected = Matrix::from_fn(2, 3, |i, j| ((i + 1) * (j + 1)) as f64 / 70.0);
        assert!(max_diff(&p, &expected) < 1e-12);
        assert!(max_diff(&matmul(&matmul(&a, &p), &a), &a) < 1e-12);
    }

    #[test]
    fn test_pinv_rtol_override() {
        let a = Matrix::from_rows(&[[1.0f64, 0.0], [0.0, 1e-3]]);
        let full = pinv(a.as_ref(), None).unwrap();
        assert_relative_eq!(full[(1, 1)], 1e3, max_relative = 1e-12);
        let cut = pinv(a.as_ref(), Some(1e-2)).unwrap();
        assert_eq!(cut[(1, 1)], 0.0);
        assert_eq!(pinv(a.as_ref(), Some(-1.0)).unwrap_err().status(), Status::ValueError);
    }

    #[test]
    fn test_pinv_empty() {
        let a = Matrix::<f64>::zeros(0, 3);
        assert_eq!(pinv(a.as_ref(), None).unwrap().shape(), (3, 0));
    }
}
