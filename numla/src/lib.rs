//! # numla
//!
//! Dense linear algebra over `f32`, `f64`, `c32` and `c64` column-major
//! matrices, dispatching to the `numla-lapack` kernels.
//!
//! Every operation validates shapes before any kernel runs and ends in a
//! single [`LinalgResult`]. Inputs are borrowed and copied unless the
//! `*_overwrite` variant is used, which destroys its input in place.
//!
//! ```
//! use numla::{solve, Handle, LinalgState, Matrix, Status};
//!
//! let a = Matrix::<f64>::from_rows(&[[3.0, 1.0], [1.0, 2.0]]);
//! let x = solve(a.as_ref(), &[9.0, 8.0]).or_abort();
//! assert!((x[0] - 2.0).abs() < 1e-12 && (x[1] - 3.0).abs() < 1e-12);
//!
//! // Opting in to the error as a value instead of failing fast.
//! let ones = Matrix::<f64>::from_rows(&[[1.0, 1.0], [1.0, 1.0]]);
//! let mut state = LinalgState::default();
//! assert!(solve(ones.as_ref(), &[1.0, 2.0]).handle("solve", Some(&mut state)).is_none());
//! assert_eq!(state.status(), Status::ComputationError);
//! ```

pub mod cholesky;
pub mod construct;
pub mod eigen;
pub mod inverse;
pub mod qr;
pub mod solve;
pub mod svd;

pub use cholesky::{cholesky, cholesky_solve};
pub use construct::{diag, diag_of, eye};
pub use eigen::{eig, eig_real, eigh, eigh_overwrite, eigvals, eigvals_real, eigvalsh, EigenDecomposition};
pub use inverse::{inv, inv_overwrite, pinv};
pub use qr::{qr, qr_into, qr_workspace_len, Qr, QrMode};
pub use solve::{det, solve, solve_many, solve_overwrite};
pub use svd::{svd, svd_into, svdvals, Svd};

pub use numla_core::{
    c32, c64, Handle, Job, LinalgError, LinalgResult, LinalgState, Matrix, MatrixMut, MatrixRef, RealScalar,
    Scalar, Status, Uplo,
};
pub use numla_lapack::{parallelism, set_parallelism, Lapack, Parallelism};

use numla_core::{check_info, linalg_bail};
use numla_lapack::query_len;

/// Runs one operation: logs the call, and logs a failure before returning it.
pub(crate) fn dispatch<T: Scalar, R>(
    origin: &'static str,
    (m, n): (usize, usize),
    op: impl FnOnce() -> LinalgResult<R>,
) -> LinalgResult<R> {
    log::debug!("{origin}: {m} x {n} {}", T::NAME);
    let result = op();
    if let Err(err) = &result {
        log::warn!("{err}");
    }
    result
}

/// Rejects non-square or empty matrices.
pub(crate) fn require_square<T: Scalar>(origin: &'static str, what: &str, a: MatrixRef<'_, T>) -> LinalgResult<usize> {
    let (m, n) = a.shape();
    if m != n {
        linalg_bail!(Value, origin, "{what} must be square, got {m} x {n}");
    }
    if n == 0 {
        linalg_bail!(Value, origin, "{what} is empty (0 x 0)");
    }
    Ok(n)
}

/// Asks a kernel for its workspace size. `query` receives a one-element
/// probe and must pass [`numla_lapack::LWORK_QUERY`] as `lwork`.
pub(crate) fn query_lwork<T: Lapack>(
    origin: &'static str,
    routine: &str,
    query: impl FnOnce(&mut [T]) -> i32,
) -> LinalgResult<usize> {
    let mut probe = [T::zero()];
    let info = query(&mut probe);
    check_info(origin, routine, info, |i| format!("{routine} workspace query failed with status {i}"))?;
    Ok(query_len(probe[0]))
}

/// [`query_lwork`] followed by the allocation.
pub(crate) fn query_workspace<T: Lapack>(
    origin: &'static str,
    routine: &str,
    query: impl FnOnce(&mut [T]) -> i32,
) -> LinalgResult<Vec<T>> {
    Ok(vec![T::zero(); query_lwork(origin, routine, query)?])
}
