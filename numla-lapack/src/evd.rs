//! Eigendecompositions: symmetric/Hermitian (`heevd`) and general (`geev`).

use faer::linalg::evd::{
    evd_cplx, evd_real, evd_scratch, self_adjoint_evd, self_adjoint_evd_scratch, ComputeEigenvectors,
};
use faer::traits::{ComplexField, RealField};
use faer::diag::DiagMut;
use num_complex::Complex;
use numla_core::layout::{index, required_len};
use numla_core::{Job, RealScalar, Scalar, Uplo};

use crate::cholesky::gather_lower;
use crate::config::par;
use crate::workspace::{elements_for, mat_mut, mat_ref, stack_from};

fn compute_eigenvectors(job: Job) -> ComputeEigenvectors {
    if job == Job::NoVectors {
        ComputeEigenvectors::No
    } else {
        ComputeEigenvectors::Yes
    }
}

/// Workspace elements `heevd` needs for order `n`.
pub fn heevd_work_len<T: Scalar + ComplexField>(jobz: Job, n: usize) -> usize {
    // lower copy, eigenvalues as T, kernel scratch
    n * n
        + n
        + elements_for::<T>(self_adjoint_evd_scratch::<T>(
            n,
            compute_eigenvectors(jobz),
            par(),
            Default::default(),
        ))
}

/// Workspace elements `geev` needs for order `n`.
pub fn geev_work_len<T: Scalar + ComplexField>(jobvr: Job, n: usize) -> usize {
    // complex types stage eigenvalues in the workspace
    let staged = if T::IS_COMPLEX { n } else { 0 };
    staged
        + elements_for::<T>(evd_scratch::<T>(
            n,
            ComputeEigenvectors::No,
            compute_eigenvectors(jobvr),
            par(),
            Default::default(),
        ))
}

// ============================================================================
// HEEVD: A = Q * diag(w) * Q^H
// ============================================================================

pub(crate) fn heevd<T: Scalar + ComplexField>(
    jobz: Job,
    uplo: Uplo,
    n: usize,
    a: &mut [T],
    lda: usize,
    w: &mut [<T as Scalar>::Real],
    work: &mut [T],
    lwork: isize,
) -> i32 {
    const ROUTINE: &str = "heevd";
    if jobz == Job::Reduced {
        reject!(ROUTINE, 1, "jobz must request no vectors or all of them");
    }
    if lda < n.max(1) {
        reject!(ROUTINE, 5, "lda = {lda} < max(1, n = {n})");
    }
    if a.len() < required_len(n, n, lda) {
        reject!(ROUTINE, 4, "length {} cannot hold {n} x {n} with lda = {lda}", a.len());
    }
    if w.len() < n {
        reject!(ROUTINE, 6, "w has length {}, need {n}", w.len());
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, heevd_work_len::<T>(jobz, n), 8);
    if n == 0 {
        return 0;
    }

    let (low, rest) = work.split_at_mut(n * n);
    let (s, scratch) = rest.split_at_mut(n);
    gather_lower(uplo, n, a, lda, low);

    let vectors = if jobz == Job::Full { Some(mat_mut(a, n, n, lda)) } else { None };
    let result = self_adjoint_evd(
        mat_ref(low, n, n, n),
        DiagMut::from_slice_mut(s),
        vectors,
        par(),
        stack_from(scratch),
        Default::default(),
    );
    if result.is_err() {
        log::debug!("{ROUTINE}: tridiagonal iteration did not converge");
        return 1;
    }

    for (dst, src) in w.iter_mut().zip(s.iter()) {
        *dst = src.re();
    }
    0
}

/// Shared argument checks of both `geev` flavours; `0` when all pass.
fn check_geev<T: Scalar>(jobvr: Job, n: usize, a: &[T], lda: usize, vr: &[T], ldvr: usize) -> i32 {
    const ROUTINE: &str = "geev";
    let vcols = if jobvr == Job::Full { n } else { 0 };
    if jobvr == Job::Reduced {
        reject!(ROUTINE, 1, "jobvr must request no vectors or all of them");
    }
    if lda < n.max(1) {
        reject!(ROUTINE, 4, "lda = {lda} < max(1, n = {n})");
    }
    if a.len() < required_len(n, n, lda) {
        reject!(ROUTINE, 3, "length {} cannot hold {n} x {n} with lda = {lda}", a.len());
    }
    if ldvr < 1 || (jobvr == Job::Full && ldvr < n) {
        reject!(ROUTINE, 8, "ldvr = {ldvr} too small for {n} rows");
    }
    if vr.len() < required_len(n, vcols, ldvr) {
        reject!(ROUTINE, 7, "length {} cannot hold {n} x {vcols} with ldvr = {ldvr}", vr.len());
    }
    0
}

// ============================================================================
// GEEV (real): eigenvalues as (wr, wi) pairs
// ============================================================================

pub(crate) fn geev_real<T: RealScalar + RealField>(
    jobvr: Job,
    n: usize,
    a: &[T],
    lda: usize,
    wr: &mut [T],
    wi: &mut [T],
    vr: &mut [T],
    ldvr: usize,
    work: &mut [T],
    lwork: isize,
) -> i32 {
    const ROUTINE: &str = "geev";
    let info = check_geev(jobvr, n, a, lda, vr, ldvr);
    if info != 0 {
        return info;
    }
    if wr.len() < n {
        reject!(ROUTINE, 5, "wr has length {}, need {n}", wr.len());
    }
    if wi.len() < n {
        reject!(ROUTINE, 6, "wi has length {}, need {n}", wi.len());
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, geev_work_len::<T>(jobvr, n), 10);
    if n == 0 {
        return 0;
    }

    let vectors = if jobvr == Job::Full { Some(mat_mut(vr, n, n, ldvr)) } else { None };
    let result = evd_real(
        mat_ref(a, n, n, lda),
        DiagMut::from_slice_mut(&mut wr[..n]),
        DiagMut::from_slice_mut(&mut wi[..n]),
        None,
        vectors,
        par(),
        stack_from(work),
        Default::default(),
    );
    if result.is_err() {
        log::debug!("{ROUTINE}: Schur iteration did not converge");
        return 1;
    }

    // Conjugate pairs: positive imaginary part first. The eigenvector of
    // the swapped eigenvalue is the conjugate, so the imaginary column flips.
    let mut j = 0;
    while j < n {
        if wi[j] == <T as Scalar>::zero() || j + 1 == n {
            j += 1;
            continue;
        }
        if wi[j] < <T as Scalar>::zero() {
            wi[j] = <T as Scalar>::zero() - wi[j];
            wi[j + 1] = <T as Scalar>::zero() - wi[j + 1];
            if jobvr == Job::Full {
                for i in 0..n {
                    let v = &mut vr[index(i, j + 1, ldvr)];
                    *v = <T as Scalar>::zero() - *v;
                }
            }
        }
        j += 2;
    }
    0
}

// ============================================================================
// GEEV (complex)
// ============================================================================

pub(crate) fn geev_cplx<R>(
    jobvr: Job,
    n: usize,
    a: &[Complex<R>],
    lda: usize,
    wr: &mut [R],
    wi: &mut [R],
    vr: &mut [Complex<R>],
    ldvr: usize,
    work: &mut [Complex<R>],
    lwork: isize,
) -> i32
where
    R: RealScalar + RealField,
    Complex<R>: Scalar<Real = R> + ComplexField,
{
    const ROUTINE: &str = "geev";
    let info = check_geev(jobvr, n, a, lda, vr, ldvr);
    if info != 0 {
        return info;
    }
    if wr.len() < n {
        reject!(ROUTINE, 5, "wr has length {}, need {n}", wr.len());
    }
    if wi.len() < n {
        reject!(ROUTINE, 6, "wi has length {}, need {n}", wi.len());
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, geev_work_len::<Complex<R>>(jobvr, n), 10);
    if n == 0 {
        return 0;
    }

    let (s, scratch) = work.split_at_mut(n);
    let vectors = if jobvr == Job::Full { Some(mat_mut(vr, n, n, ldvr)) } else { None };
    let result = evd_cplx(
        mat_ref(a, n, n, lda),
        DiagMut::from_slice_mut(s),
        None,
        vectors,
        par(),
        stack_from(scratch),
        Default::default(),
    );
    if result.is_err() {
        log::debug!("{ROUTINE}: Schur iteration did not converge");
        return 1;
    }

    for (j, lambda) in s.iter().enumerate() {
        wr[j] = lambda.re;
        wi[j] = lambda.im;
    }
    0
}
