//! Householder QR factorization `A = Q * R`.

use numla_core::layout::index;
use numla_core::{check_info, linalg_bail, LinalgResult, Matrix, MatrixMut, MatrixRef, Scalar};
use numla_lapack::Lapack;

use crate::dispatch;

/// Which factors [`qr`] returns for an `m x n` input with `k = min(m, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrMode {
    /// `Q`: m x k, `R`: k x n.
    #[default]
    Reduced,
    /// `Q`: m x m, `R`: m x n.
    Complete,
    /// `R` only, k x n.
    R,
}

/// QR factors; `q` is `None` in [`QrMode::R`].
#[derive(Debug, Clone)]
pub struct Qr<T> {
    pub q: Option<Matrix<T>>,
    pub r: Matrix<T>,
}

fn q_columns(m: usize, n: usize, mode: QrMode) -> usize {
    match mode {
        QrMode::Reduced => m.min(n),
        QrMode::Complete => m,
        QrMode::R => 0,
    }
}

/// Workspace elements [`qr_into`] needs for an `m x n` matrix in `mode`.
///
/// Covers the reflector coefficients, a copy of `A` when `Q` is too narrow
/// to factor in place, and the kernel scratch.
pub fn qr_workspace_len<T: Lapack>(m: usize, n: usize, mode: QrMode) -> usize {
    let k = m.min(n);
    let qcols = q_columns(m, n, mode);
    let copy = if qcols >= n { 0 } else { m * n };
    let kernel = match mode {
        QrMode::R => T::geqrf_lwork(m, n),
        _ => T::geqrf_lwork(m, n).max(T::orgqr_lwork(m, qcols, k)),
    };
    k + copy + kernel
}

/// Copies the upper trapezoid of the factored `src` into `r`, zeroing the rest.
fn extract_r<T: Scalar>(src: &[T], lds: usize, r: &mut MatrixMut<'_, T>) {
    for j in 0..r.ncols() {
        let col = r.col_mut(j);
        for (i, v) in col.iter_mut().enumerate() {
            *v = if i <= j { src[index(i, j, lds)] } else { T::zero() };
        }
    }
}

fn run_qr<T: Lapack>(
    origin: &'static str,
    a: MatrixRef<'_, T>,
    mut q: Option<MatrixMut<'_, T>>,
    mut r: MatrixMut<'_, T>,
    work: Option<&mut [T]>,
) -> LinalgResult<()> {
    let (m, n) = a.shape();
    let k = m.min(n);
    if k == 0 {
        r.fill(T::zero());
        if let Some(q) = q.as_mut() {
            q.fill(T::zero());
            for i in 0..q.nrows().min(q.ncols()) {
                q.set(i, i, T::one());
            }
        }
        return Ok(());
    }

    let qcols = q.as_ref().map_or(0, |q| q.ncols());
    let mode = match (&q, qcols) {
        (None, _) => QrMode::R,
        (Some(_), c) if c == m => QrMode::Complete,
        _ => QrMode::Reduced,
    };
    let required = qr_workspace_len::<T>(m, n, mode);
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

    let factor_in_q = qcols >= n;
    let (tau, rest) = work.split_at_mut(k);
    let (copy, kernel) = rest.split_at_mut(if factor_in_q { 0 } else { m * n });
    let lwork = kernel.len() as isize;
    let on_failure = |i: i32| format!("unexpected status {i}");

    match q {
        Some(mut q) if factor_in_q => {
            let ldq = q.ld();
            q.rb_mut().submatrix_mut(0, 0, m, n).copy_from(a);
            check_info(origin, "geqrf", T::geqrf(m, n, q.as_mut_slice(), ldq, tau, kernel, lwork), on_failure)?;
            extract_r(q.as_slice(), ldq, &mut r);
            let info = T::orgqr(m, qcols, k, q.as_mut_slice(), ldq, tau, kernel, lwork);
            check_info(origin, "orgqr", info, on_failure)
        }
        q => {
            for j in 0..n {
                copy[index(0, j, m)..index(0, j, m) + m].copy_from_slice(a.col(j));
            }
            check_info(origin, "geqrf", T::geqrf(m, n, copy, m, tau, kernel, lwork), on_failure)?;
            extract_r(copy, m, &mut r);
            let Some(mut q) = q else {
                return Ok(());
            };
            let ldq = q.ld();
            for j in 0..qcols {
                q.col_mut(j).copy_from_slice(&copy[index(0, j, m)..index(0, j, m) + m]);
            }
            let info = T::orgqr(m, qcols, k, q.as_mut_slice(), ldq, tau, kernel, lwork);
            check_info(origin, "orgqr", info, on_failure)
        }
    }
}

/// QR factorization into caller buffers.
///
/// The shapes select the variant for an `m x n` input with `k = min(m, n)`:
/// `q` of `m x k` with `r` of `k x n` (reduced), `q` of `m x m` with `r` of
/// `m x n` (complete), or no `q` with `r` of `k x n` or `m x n` (R only).
/// When `q` has at least `n` columns the factorization runs inside it and
/// `a` is not copied. Rows of `r` below its diagonal are zeroed. A supplied
/// `work` needs [`qr_workspace_len`] elements.
pub fn qr_into<T: Lapack>(
    a: MatrixRef<'_, T>,
    q: Option<MatrixMut<'_, T>>,
    r: MatrixMut<'_, T>,
    work: Option<&mut [T]>,
) -> LinalgResult<()> {
    const ORIGIN: &str = "qr_into";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let (m, n) = a.shape();
        let k = m.min(n);
        let (rr, rc) = r.shape();
        let shapes_fit = match &q {
            Some(q) if q.shape() == (m, k) => r.shape() == (k, n),
            Some(q) if q.shape() == (m, m) => r.shape() == (m, n),
            Some(_) => false,
            None => rc == n && (rr == k || rr == m),
        };
        if !shapes_fit {
            let q_shape = q.as_ref().map_or(String::from("absent"), |q| format!("{} x {}", q.nrows(), q.ncols()));
            linalg_bail!(Value, ORIGIN, "q is {q_shape} and r is {rr} x {rc}, which do not fit a {m} x {n} matrix");
        }
        run_qr(ORIGIN, a, q, r, work)
    })
}

/// QR factorization of an `m x n` matrix.
///
/// ```
/// use numla::{qr, Matrix, QrMode};
///
/// let a = Matrix::<f64>::from_rows(&[[3.0, 1.0], [4.0, 2.0], [0.0, 5.0]]);
/// let f = qr(a.as_ref(), QrMode::Reduced).unwrap();
/// let q = f.q.unwrap();
/// assert_eq!((q.shape(), f.r.shape()), ((3, 2), (2, 2)));
/// assert!((f.r[(0, 0)].abs() - 5.0).abs() < 1e-12);
/// assert_eq!(f.r[(1, 0)], 0.0);
/// ```
pub fn qr<T: Lapack>(a: MatrixRef<'_, T>, mode: QrMode) -> LinalgResult<Qr<T>> {
    const ORIGIN: &str = "qr";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let (m, n) = a.shape();
        let k = m.min(n);
        let rrows = if mode == QrMode::Complete { m } else { k };
        let mut r = Matrix::zeros(rrows, n);
        let mut q = if mode == QrMode::R {
            None
        } else {
            Some(Matrix::zeros(m, q_columns(m, n, mode)))
        };
        run_qr(ORIGIN, a, q.as_mut().map(Matrix::as_mut), r.as_mut(), None)?;
        Ok(Qr { q, r })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use numla_core::{c64, RealScalar, Status};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn max_err<T: Scalar>(m: usize, n: usize, f: impl Fn(usize, usize) -> T, expected: impl Fn(usize, usize) -> T) -> f64 {
        let mut err = 0.0f64;
        for j in 0..n {
            for i in 0..m {
                err = err.max((f(i, j) - expected(i, j)).abs().to_f64());
            }
        }
        err
    }

    fn check_factors<T: Scalar>(a: &Matrix<T>, q: &Matrix<T>, r: &Matrix<T>) {
        let (m, n) = a.shape();
        let qc = q.ncols();
        // Q^H Q = I
        let gram = |i: usize, j: usize| (0..m).fold(T::zero(), |acc, l| acc + q[(l, i)].conj() * q[(l, j)]);
        let eye = |i: usize, j: usize| if i == j { T::one() } else { T::zero() };
        assert!(max_err(qc, qc, gram, eye) < 1e-12);
        // Q R = A
        let prod = |i: usize, j: usize| (0..qc).fold(T::zero(), |acc, l| acc + q[(i, l)] * r[(l, j)]);
        assert!(max_err(m, n, prod, |i, j| a[(i, j)]) < 1e-12);
        for j in 0..n {
            for i in j + 1..r.nrows() {
                assert!(r[(i, j)].is_zero(), "r[{i}, {j}] = {}", r[(i, j)]);
            }
        }
    }

    #[test]
    fn test_reduced_and_complete() {
        let mut rng = StdRng::seed_from_u64(12);
        for (m, n) in [(6, 4), (3, 5), (4, 4)] {
            let a = Matrix::from_fn(m, n, |_, _| rng.gen_range(-1.0f64..1.0));
            for mode in [QrMode::Reduced, QrMode::Complete] {
                let f = qr(a.as_ref(), mode).unwrap();
                let q = f.q.expect("q requested");
                let qc = if mode == QrMode::Complete { m } else { m.min(n) };
                assert_eq!(q.shape(), (m, qc));
                assert_eq!(f.r.shape(), (qc, n));
                check_factors(&a, &q, &f.r);
            }
        }
    }

    #[test]
    fn test_complex_qr() {
        let mut rng = StdRng::seed_from_u64(13);
        let a = Matrix::from_fn(5, 3, |_, _| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
        let f = qr(a.as_ref(), QrMode::Reduced).unwrap();
        check_factors(&a, f.q.as_ref().expect("q requested"), &f.r);
    }

    #[test]
    fn test_r_mode_matches_reduced() {
        let mut rng = StdRng::seed_from_u64(14);
        let a = Matrix::from_fn(6, 3, |_, _| rng.gen_range(-1.0f64..1.0));
        let full = qr(a.as_ref(), QrMode::Reduced).unwrap();
        let r_only = qr(a.as_ref(), QrMode::R).unwrap();
        assert!(r_only.q.is_none());
        assert!(max_err(3, 3, |i, j| r_only.r[(i, j)], |i, j| full.r[(i, j)]) < 1e-12);
    }

    #[test]
    fn test_qr_into_with_caller_workspace() {
        let (m, n) = (5, 3);
        let a = Matrix::from_fn(m, n, |i, j| ((i * 7 + j * 3) % 5) as f64 + if i == j { 4.0 } else { 0.0 });
        let mut q = Matrix::zeros(m, n);
        let mut r = Matrix::zeros(n, n);
        let mut work = vec![0.0; qr_workspace_len::<f64>(m, n, QrMode::Reduced)];
        qr_into(a.as_ref(), Some(q.as_mut()), r.as_mut(), Some(&mut work)).unwrap();
        check_factors(&a, &q, &r);

        // R only into an m x n buffer: rows past k are zero
        let mut r_tall = Matrix::from_fn(m, n, |_, _| f64::NAN);
        qr_into(a.as_ref(), None, r_tall.as_mut(), None).unwrap();
        assert!(max_err(n, n, |i, j| r_tall[(i, j)].abs(), |i, j| r[(i, j)].abs()) < 1e-12);
        assert!((n..m).all(|i| (0..n).all(|j| r_tall[(i, j)] == 0.0)));
    }

    #[test]
    fn test_qr_into_rejects_bad_buffers() {
        let a = Matrix::<f64>::zeros(4, 3);
        let mut q = Matrix::zeros(4, 2);
        let mut r = Matrix::zeros(3, 3);
        let err = qr_into(a.as_ref(), Some(q.as_mut()), r.as_mut(), None).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);
        assert!(err.message().contains("4 x 2"), "{}", err.message());

        let mut q = Matrix::zeros(4, 3);
        let mut short = vec![0.0; 2];
        let err = qr_into(a.as_ref(), Some(q.as_mut()), r.as_mut(), Some(&mut short)).unwrap_err();
        assert_eq!(err.status(), Status::ValueError);
    }

    #[test]
    fn test_empty_complete() {
        let a = Matrix::<f64>::zeros(3, 0);
        let f = qr(a.as_ref(), QrMode::Complete).unwrap();
        assert_eq!(f.q.expect("q requested"), Matrix::identity(3));
        assert_eq!(f.r.shape(), (3, 0));
    }
}
