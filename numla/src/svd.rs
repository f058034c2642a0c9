//! Singular value decomposition `A = U * diag(s) * V^H`.

use numla_core::{check_info, linalg_bail, Job, LinalgResult, Matrix, MatrixMut, MatrixRef, Scalar};
use numla_lapack::{Lapack, LWORK_QUERY};

use crate::{dispatch, query_lwork};

/// Factors of an SVD; singular values are nonnegative and nonincreasing.
#[derive(Debug, Clone)]
pub struct Svd<T: Scalar> {
    /// `m x k` (reduced) or `m x m` (full).
    pub u: Matrix<T>,
    pub s: Vec<T::Real>,
    /// `k x n` (reduced) or `n x n` (full); rows are the right singular vectors, conjugated.
    pub vt: Matrix<T>,
}

fn run_gesdd<T: Lapack>(
    origin: &'static str,
    job: Job,
    a: MatrixRef<'_, T>,
    s: &mut [T::Real],
    mut u: MatrixMut<'_, T>,
    mut vt: MatrixMut<'_, T>,
    work: Option<&mut [T]>,
) -> LinalgResult<()> {
    let (m, n) = a.shape();
    let (ldu, ldvt) = (u.ld(), vt.ld());
    let mut gesdd = |work: &mut [T], lwork: isize| {
        T::gesdd(job, m, n, a.as_slice(), a.ld(), s, u.as_mut_slice(), ldu, vt.as_mut_slice(), ldvt, work, lwork)
    };

    let required = query_lwork(origin, "gesdd", |probe| gesdd(probe, LWORK_QUERY))?;
    let mut owned = Vec::new();
    let work = match work {
        Some(w) if w.len() < required => {
            linalg_bail!(Value, origin, "work has length {}, need at least {required}", w.len());
        }
        Some(w) => w,
        None => {
            owned.resize(required, T::zero());
            owned.as_mut_slice()
        }
    };
    let lwork = work.len() as isize;
    let info = gesdd(work, lwork);
    check_info(origin, "gesdd", info, |_| String::from("singular value decomposition did not converge"))
}

/// SVD into caller buffers.
///
/// The factor shapes select the variant: `u` of `m x k` with `vt` of
/// `k x n` gives the reduced decomposition, `m x m` with `n x n` the full
/// one, where `k = min(m, n)`. `s` needs at least `k` entries. A supplied
/// `work` must be at least as long as the kernel's size query reports.
///
/// # Errors
/// `ValueError` for any other factor shape or a short `s` or `work`.
pub fn svd_into<T: Lapack>(
    a: MatrixRef<'_, T>,
    s: &mut [T::Real],
    u: MatrixMut<'_, T>,
    vt: MatrixMut<'_, T>,
    work: Option<&mut [T]>,
) -> LinalgResult<()> {
    const ORIGIN: &str = "svd_into";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let (m, n) = a.shape();
        let k = m.min(n);
        let job = if u.shape() == (m, k) && vt.shape() == (k, n) {
            Job::Reduced
        } else if u.shape() == (m, m) && vt.shape() == (n, n) {
            Job::Full
        } else {
            let ((ur, uc), (vr, vc)) = (u.shape(), vt.shape());
            linalg_bail!(
                Value,
                ORIGIN,
                "u is {ur} x {uc} and vt is {vr} x {vc}; a {m} x {n} matrix needs {m} x {k} and {k} x {n}, \
                 or {m} x {m} and {n} x {n}"
            );
        };
        if s.len() < k {
            linalg_bail!(Value, ORIGIN, "s has length {}, need {k} for a {m} x {n} matrix", s.len());
        }
        run_gesdd(ORIGIN, job, a, s, u, vt, work)
    })
}

/// Singular value decomposition with reduced (`full_matrices == false`) or
/// full factors.
///
/// ```
/// use numla::{svd, Matrix};
///
/// let a = Matrix::<f64>::from_rows(&[[3.0, 0.0], [0.0, -4.0], [0.0, 0.0]]);
/// let f = svd(a.as_ref(), false).unwrap();
/// assert_eq!(f.u.shape(), (3, 2));
/// assert!((f.s[0] - 4.0).abs() < 1e-12 && (f.s[1] - 3.0).abs() < 1e-12);
/// ```
pub fn svd<T: Lapack>(a: MatrixRef<'_, T>, full_matrices: bool) -> LinalgResult<Svd<T>> {
    const ORIGIN: &str = "svd";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let (m, n) = a.shape();
        let k = m.min(n);
        let (job, ucols, vrows) = if full_matrices { (Job::Full, m, n) } else { (Job::Reduced, k, k) };
        let mut s = vec![T::Real::zero(); k];
        let mut u = Matrix::zeros(m, ucols);
        let mut vt = Matrix::zeros(vrows, n);
        run_gesdd(ORIGIN, job, a, &mut s, u.as_mut(), vt.as_mut(), None)?;
        Ok(Svd { u, s, vt })
    })
}

/// Singular values only, nonincreasing.
pub fn svdvals<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<Vec<T::Real>> {
    const ORIGIN: &str = "svdvals";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let (m, n) = a.shape();
        let mut s = vec![T::Real::zero(); m.min(n)];
        let mut u = Matrix::<T>::zeros(m, 0);
        let mut vt = Matrix::<T>::zeros(0, n);
        run_gesdd(ORIGIN, Job::NoVectors, a, &mut s, u.as_mut(), vt.as_mut(), None)?;
        Ok(s)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use numla_core::{c64, RealScalar, Status};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// max |A - U diag(s) Vt| over the leading k columns of U and rows of Vt.
    fn reconstruction_error<T: Scalar>(a: &Matrix<T>, f: &Svd<T>) -> f64 {
        let (m, n) = a.shape();
        let mut err = 0.0f64;
        for j in 0..n {
            for i in 0..m {
                let mut v = T::zero();
                for (l, &sl) in f.s.iter().enumerate() {
                    v += f.u[(i, l)].scale(sl) * f.vt[(l, j)];
                }
                err = err.max((v - a[(i, j)]).abs().to_f64());
            }
        }
        err
    }

    fn orthonormal_columns<T: Scalar>(q: &Matrix<T>) -> bool {
        let (m, c) = q.shape();
        (0..c).all(|i| {
            (0..c).all(|j| {
                let g = (0..m).fold(T::zero(), |acc, l| acc + q[(l, i)].conj() * q[(l, j)]);
                let target = if i == j { T::one() } else { T::zero() };
                (g - target).abs().to_f64() < 1e-12
            })
        })
    }

    #[test]
    fn test_reduced_and_full_reconstruct() {
        let mut rng = StdRng::seed_from_u64(8);
        for (m, n) in [(5, 3), (3, 5), (4, 4)] {
            let a = Matrix::from_fn(m, n, |_, _| rng.gen_range(-1.0f64..1.0));
            for full in [false, true] {
                let f = svd(a.as_ref(), full).unwrap();
                let k = m.min(n);
                let expected = if full { ((m, m), (n, n)) } else { ((m, k), (k, n)) };
                assert_eq!((f.u.shape(), f.vt.shape()), expected);
                assert!(f.s.windows(2).all(|w| w[0] >= w[1]));
                assert!(reconstruction_error(&a, &f) < 1e-12);
                assert!(orthonormal_columns(&f.u));
                assert!(orthonormal_columns(&f.vt.adjoint()));
            }
        }
    }

    #[test]
    fn test_complex_svd() {
        let mut rng = StdRng::seed_from_u64(9);
        let a = Matrix::from_fn(4, 3, |_, _| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
        let f = svd(a.as_ref(), false).unwrap();
        assert!(reconstruction_error(&a, &f) < 1e-12);
        assert!(orthonormal_columns(&f.vt.adjoint()));
    }

    #[test]
    fn test_svdvals_match_svd() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = Matrix::from_fn(6, 4, |_, _| rng.gen_range(-1.0f32..1.0));
        let s = svdvals(a.as_ref()).unwrap();
        let f = svd(a.as_ref(), false).unwrap();
        for (x, y) in s.iter().zip(&f.s) {
            assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_svd_into_caller_buffers() {
        let a = Matrix::from_rows(&[[2.0f64, 0.0], [0.0, 1.0]]);
        let mut s = [0.0; 2];
        let mut u = Matrix::zeros(2, 2);
        let mut vt = Matrix::zeros(2, 2);
        let mut work = vec![0.0; numla_lapack::svd::gesdd_work_len::<f64>(Job::Full, 2, 2).max(1)];
        svd_into(a.as_ref(), &mut s, u.as_mut(), vt.as_mut(), Some(&mut work)).unwrap();
        assert!((s[0] - 2.0).abs() < 1e-14 && (s[1] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_svd_into_rejects_bad_buffers() {
        let a = Matrix::<f64>::zeros(4, 2);
        let mut s = [0.0; 2];

        let mut u = Matrix::zeros(4, 3);
        let mut vt = Matrix::zeros(2, 2);
        let err = svd_into(a.as_ref(), &mut s, u.as_mut(), vt.as_mut(), None).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);
        assert!(err.message().contains("4 x 3"), "{}", err.message());

        let mut u = Matrix::zeros(4, 2);
        let mut short = [0.0; 1];
        let err = svd_into(a.as_ref(), &mut short, u.as_mut(), vt.as_mut(), None).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);

        let mut work = [0.0; 1];
        let err = svd_into(a.as_ref(), &mut s, u.as_mut(), vt.as_mut(), Some(&mut work)).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);
    }

    #[test]
    fn test_empty_svd() {
        let a = Matrix::<f64>::zeros(0, 3);
        let f = svd(a.as_ref(), true).unwrap();
        assert!(f.s.is_empty());
        assert_eq!(f.vt.shape(), (3, 3));
        assert_eq!(f.vt[(2, 2)], 1.0);
    }
}
