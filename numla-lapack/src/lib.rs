// LAPACK routines keep the standard argument lists, so most take many parameters.
// Numeric kernels use index loops over column-major buffers.
#![allow(clippy::too_many_arguments, clippy::needless_range_loop)]

//! # numla-lapack
//!
//! LAPACK-style kernel routines over raw column-major buffers, backed by
//! the pure-Rust `faer` factorizations.
//!
//! - **LU** (`getrf`, `getrs`, `getri`, `gesv`) with partial pivoting
//! - **Cholesky** (`potrf`, `potrs`)
//! - **QR** (`geqrf`, `orgqr`)
//! - **SVD** (`gesdd`)
//! - **Eigen** (`heevd` for symmetric/Hermitian, `geev` for general)
//!
//! Every routine is a method of [`Lapack`], implemented for `f32`, `f64`,
//! `c32` and `c64`, and returns an `i32` status:
//!
//! - `0`: success
//! - `-i`: the i-th argument is invalid, nothing was computed
//! - `> 0`: numerical failure, described per routine
//!
//! ## Workspace Queries
//!
//! Routines taking `work`/`lwork` answer `lwork == LWORK_QUERY` by writing
//! the required element count into `work[0]`:
//!
//! ```
//! use numla_lapack::{query_len, Lapack, LWORK_QUERY};
//!
//! let (m, n) = (4, 3);
//! let mut a = vec![1.0f64; m * n];
//! let mut tau = vec![0.0; 3];
//! let mut query = [0.0];
//! assert_eq!(f64::geqrf(m, n, &mut a, m, &mut tau, &mut query, LWORK_QUERY), 0);
//!
//! let lwork = query_len(query[0]);
//! let mut work = vec![0.0; lwork];
//! assert_eq!(f64::geqrf(m, n, &mut a, m, &mut tau, &mut work, lwork as isize), 0);
//! ```

use num_complex::Complex;
use numla_core::{Job, Scalar, Transpose, Uplo};

/// Logs a rejected argument and returns its negative position.
macro_rules! reject {
    ($routine:expr, $pos:expr, $($arg:tt)+) => {{
        log::debug!("{}: argument {} invalid: {}", $routine, $pos, format_args!($($arg)+));
        return -($pos as i32);
    }};
}

/// Unwraps a [`workspace::negotiate`] result inside a kernel routine.
macro_rules! negotiate_or_return {
    ($routine:expr, $work:expr, $lwork:expr, $required:expr, $pos:expr) => {
        match $crate::workspace::negotiate($work, $lwork, $required, $pos) {
            Ok($crate::workspace::Workspace::Ready(w)) => w,
            Ok($crate::workspace::Workspace::Queried) => return 0,
            Err(info) => {
                log::debug!(
                    "{}: workspace rejected (lwork = {}, required = {})",
                    $routine,
                    $lwork,
                    $required
                );
                return info;
            }
        }
    };
}

pub mod cholesky;
pub mod config;
pub mod evd;
pub mod lu;
pub mod qr;
pub mod svd;
pub mod workspace;

pub use config::{parallelism, set_parallelism, Parallelism};
pub use workspace::{query_len, LWORK_QUERY};

/// Dense LAPACK kernels for one element type.
///
/// All matrices are column-major; `ld*` arguments are leading dimensions.
pub trait Lapack: Scalar {
    /// LU factorization with partial pivoting: `P * A = L * U`.
    ///
    /// `A` is overwritten with `L` (unit lower, diagonal not stored) and `U`.
    /// `ipiv[k] = p` records that row `k` was swapped with row `p >= k`.
    ///
    /// Returns `k + 1` if `U[k, k]` is exactly zero; the factorization is
    /// still complete, but solving with it would divide by zero.
    fn getrf(m: usize, n: usize, a: &mut [Self], lda: usize, ipiv: &mut [usize]) -> i32;

    /// Solves `op(A) * X = B` with the factors from [`Lapack::getrf`].
    fn getrs(
        trans: Transpose,
        n: usize,
        nrhs: usize,
        a: &[Self],
        lda: usize,
        ipiv: &[usize],
        b: &mut [Self],
        ldb: usize,
    ) -> i32;

    /// Inverse from the factors of [`Lapack::getrf`]; `A` is overwritten with `A^-1`.
    ///
    /// Returns `k + 1` if `U[k, k]` is zero, leaving `A` untouched.
    fn getri(n: usize, a: &mut [Self], lda: usize, ipiv: &[usize], work: &mut [Self], lwork: isize) -> i32;

    /// Solves `A * X = B` for square `A`: [`Lapack::getrf`] then [`Lapack::getrs`].
    fn gesv(n: usize, nrhs: usize, a: &mut [Self], lda: usize, ipiv: &mut [usize], b: &mut [Self], ldb: usize)
        -> i32;

    /// Cholesky factorization of a symmetric/Hermitian positive definite matrix.
    ///
    /// Only the `uplo` triangle is read and overwritten (`A = U^H U` or
    /// `A = L L^H`). Returns `k + 1` if the leading minor of order `k + 1` is
    /// not positive definite.
    fn potrf(uplo: Uplo, n: usize, a: &mut [Self], lda: usize) -> i32;

    /// Solves `A * X = B` with the factor from [`Lapack::potrf`].
    fn potrs(uplo: Uplo, n: usize, nrhs: usize, a: &[Self], lda: usize, b: &mut [Self], ldb: usize) -> i32;

    /// Householder QR factorization.
    ///
    /// On exit `R` is in the upper triangle of `A`, the reflector vectors below
    /// the diagonal, and `tau[..min(m, n)]` holds the reflector coefficients in
    /// the form [`Lapack::orgqr`] consumes.
    fn geqrf(m: usize, n: usize, a: &mut [Self], lda: usize, tau: &mut [Self], work: &mut [Self], lwork: isize)
        -> i32;

    /// Workspace elements [`Lapack::geqrf`] needs; what a size query reports.
    fn geqrf_lwork(m: usize, n: usize) -> usize;

    /// Workspace elements [`Lapack::orgqr`] needs; what a size query reports.
    fn orgqr_lwork(m: usize, n: usize, k: usize) -> usize;

    /// Overwrites the `m x n` matrix `A` (holding `k` reflectors from
    /// [`Lapack::geqrf`]) with the first `n` columns of `Q`. Requires `m >= n >= k`.
    fn orgqr(
        m: usize,
        n: usize,
        k: usize,
        a: &mut [Self],
        lda: usize,
        tau: &[Self],
        work: &mut [Self],
        lwork: isize,
    ) -> i32;

    /// Singular value decomposition `A = U * diag(s) * V^H`.
    ///
    /// `jobz` selects no vectors, the reduced factors (`u`: m x k,
    /// `vt`: k x n) or the full ones (`u`: m x m, `vt`: n x n). Singular values
    /// are nonnegative and nonincreasing. Returns `1` when the iteration does
    /// not converge.
    fn gesdd(
        jobz: Job,
        m: usize,
        n: usize,
        a: &[Self],
        lda: usize,
        s: &mut [Self::Real],
        u: &mut [Self],
        ldu: usize,
        vt: &mut [Self],
        ldvt: usize,
        work: &mut [Self],
        lwork: isize,
    ) -> i32;

    /// Symmetric/Hermitian eigendecomposition reading the `uplo` triangle.
    ///
    /// Eigenvalues land in `w` in ascending order. With `jobz == Job::Full`
    /// `A` is overwritten with orthonormal eigenvectors. Returns `1` when the
    /// iteration does not converge.
    fn heevd(jobz: Job, uplo: Uplo, n: usize, a: &mut [Self], lda: usize, w: &mut [Self::Real], work: &mut [Self], lwork: isize)
        -> i32;

    /// General eigendecomposition with right eigenvectors.
    ///
    /// Eigenvalue `j` is `wr[j] + i * wi[j]`. For real types complex
    /// eigenvalues come in conjugate pairs `j, j + 1` with positive imaginary
    /// part first, and the eigenvector of `j` is `vr[:, j] + i * vr[:, j + 1]`.
    /// For complex types column `j` of `vr` is the eigenvector of eigenvalue
    /// `j`. Returns `1` when the iteration does not converge.
    fn geev(
        jobvr: Job,
        n: usize,
        a: &[Self],
        lda: usize,
        wr: &mut [Self::Real],
        wi: &mut [Self::Real],
        vr: &mut [Self],
        ldvr: usize,
        work: &mut [Self],
        lwork: isize,
    ) -> i32;
}

macro_rules! impl_lapack {
    ($t:ty, geev = $geev:path) => {
        impl Lapack for $t {
            fn getrf(m: usize, n: usize, a: &mut [Self], lda: usize, ipiv: &mut [usize]) -> i32 {
                lu::getrf(m, n, a, lda, ipiv)
            }

            fn getrs(
                trans: Transpose,
                n: usize,
                nrhs: usize,
                a: &[Self],
                lda: usize,
                ipiv: &[usize],
                b: &mut [Self],
                ldb: usize,
            ) -> i32 {
                lu::getrs(trans, n, nrhs, a, lda, ipiv, b, ldb)
            }

            fn getri(n: usize, a: &mut [Self], lda: usize, ipiv: &[usize], work: &mut [Self], lwork: isize) -> i32 {
                lu::getri(n, a, lda, ipiv, work, lwork)
            }

            fn gesv(
                n: usize,
                nrhs: usize,
                a: &mut [Self],
                lda: usize,
                ipiv: &mut [usize],
                b: &mut [Self],
                ldb: usize,
            ) -> i32 {
                lu::gesv(n, nrhs, a, lda, ipiv, b, ldb)
            }

            fn potrf(uplo: Uplo, n: usize, a: &mut [Self], lda: usize) -> i32 {
                cholesky::potrf(uplo, n, a, lda)
            }

            fn potrs(uplo: Uplo, n: usize, nrhs: usize, a: &[Self], lda: usize, b: &mut [Self], ldb: usize) -> i32 {
                cholesky::potrs(uplo, n, nrhs, a, lda, b, ldb)
            }

            fn geqrf(
                m: usize,
                n: usize,
                a: &mut [Self],
                lda: usize,
                tau: &mut [Self],
                work: &mut [Self],
                lwork: isize,
            ) -> i32 {
                qr::geqrf(m, n, a, lda, tau, work, lwork)
            }

            fn geqrf_lwork(m: usize, n: usize) -> usize {
                qr::geqrf_work_len::<Self>(m, n).max(1)
            }

            fn orgqr_lwork(m: usize, n: usize, k: usize) -> usize {
                qr::orgqr_work_len::<Self>(m, n, k).max(1)
            }

            fn orgqr(
                m: usize,
                n: usize,
                k: usize,
                a: &mut [Self],
                lda: usize,
                tau: &[Self],
                work: &mut [Self],
                lwork: isize,
            ) -> i32 {
                qr::orgqr(m, n, k, a, lda, tau, work, lwork)
            }

            fn gesdd(
                jobz: Job,
                m: usize,
                n: usize,
                a: &[Self],
                lda: usize,
                s: &mut [Self::Real],
                u: &mut [Self],
                ldu: usize,
                vt: &mut [Self],
                ldvt: usize,
                work: &mut [Self],
                lwork: isize,
            ) -> i32 {
                svd::gesdd(jobz, m, n, a, lda, s, u, ldu, vt, ldvt, work, lwork)
            }

            fn heevd(
                jobz: Job,
                uplo: Uplo,
                n: usize,
                a: &mut [Self],
                lda: usize,
                w: &mut [Self::Real],
                work: &mut [Self],
                lwork: isize,
            ) -> i32 {
                evd::heevd(jobz, uplo, n, a, lda, w, work, lwork)
            }

            fn geev(
                jobvr: Job,
                n: usize,
                a: &[Self],
                lda: usize,
                wr: &mut [Self::Real],
                wi: &mut [Self::Real],
                vr: &mut [Self],
                ldvr: usize,
                work: &mut [Self],
                lwork: isize,
            ) -> i32 {
                $geev(jobvr, n, a, lda, wr, wi, vr, ldvr, work, lwork)
            }
        }
    };
}

impl_lapack!(f32, geev = evd::geev_real::<f32>);
impl_lapack!(f64, geev = evd::geev_real::<f64>);
impl_lapack!(Complex<f32>, geev = evd::geev_cplx::<f32>);
impl_lapack!(Complex<f64>, geev = evd::geev_cplx::<f64>);
