//! Singular value decomposition.

use faer::linalg::svd::{svd, svd_scratch, ComputeSvdVectors};
use faer::traits::ComplexField;
use faer::diag::DiagMut;
use numla_core::layout::{index, required_len};
use numla_core::{Job, Scalar};

use crate::config::par;
use crate::workspace::{elements_for, mat_mut, mat_ref, stack_from};

fn compute_vectors(jobz: Job) -> ComputeSvdVectors {
    match jobz {
        Job::NoVectors => ComputeSvdVectors::No,
        Job::Reduced => ComputeSvdVectors::Thin,
        Job::Full => ComputeSvdVectors::Full,
    }
}

/// Columns of `U` (equivalently rows of `V^H`) produced for `jobz`.
fn vector_count(jobz: Job, dim: usize, k: usize) -> usize {
    match jobz {
        Job::NoVectors => 0,
        Job::Reduced => k,
        Job::Full => dim,
    }
}

/// Workspace elements `gesdd` needs for an `m x n` matrix.
pub fn gesdd_work_len<T: Scalar + ComplexField>(jobz: Job, m: usize, n: usize) -> usize {
    let k = m.min(n);
    let jobs = compute_vectors(jobz);
    // singular values as T, V (n x rows of V^H), kernel scratch
    k + n * vector_count(jobz, n, k)
        + elements_for::<T>(svd_scratch::<T>(m, n, jobs, jobs, par(), Default::default()))
}

// ============================================================================
// GESDD: A = U * diag(s) * V^H
// ============================================================================

pub(crate) fn gesdd<T: Scalar + ComplexField>(
    jobz: Job,
    m: usize,
    n: usize,
    a: &[T],
    lda: usize,
    s: &mut [<T as Scalar>::Real],
    u: &mut [T],
    ldu: usize,
    vt: &mut [T],
    ldvt: usize,
    work: &mut [T],
    lwork: isize,
) -> i32 {
    const ROUTINE: &str = "gesdd";
    let k = m.min(n);
    let ucols = vector_count(jobz, m, k);
    let vrows = vector_count(jobz, n, k);
    let wants_vectors = jobz != Job::NoVectors;

    if lda < m.max(1) {
        reject!(ROUTINE, 5, "lda = {lda} < max(1, m = {m})");
    }
    if a.len() < required_len(m, n, lda) {
        reject!(ROUTINE, 4, "length {} cannot hold {m} x {n} with lda = {lda}", a.len());
    }
    if s.len() < k {
        reject!(ROUTINE, 6, "s has length {}, need {k}", s.len());
    }
    if ldu < 1 || (wants_vectors && ldu < m) {
        reject!(ROUTINE, 8, "ldu = {ldu} too small for {m} rows");
    }
    if u.len() < required_len(m, ucols, ldu) {
        reject!(ROUTINE, 7, "length {} cannot hold {m} x {ucols} with ldu = {ldu}", u.len());
    }
    if ldvt < vrows.max(1) {
        reject!(ROUTINE, 10, "ldvt = {ldvt} < max(1, {vrows})");
    }
    if vt.len() < required_len(vrows, n, ldvt) {
        reject!(ROUTINE, 9, "length {} cannot hold {vrows} x {n} with ldvt = {ldvt}", vt.len());
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, gesdd_work_len::<T>(jobz, m, n), 12);

    if k == 0 {
        // Only full factors of an empty matrix have content: identities.
        if jobz == Job::Full {
            set_identity(u, m, ldu);
            set_identity(vt, n, ldvt);
        }
        return 0;
    }

    let (sv, rest) = work.split_at_mut(k);
    let (v, scratch) = rest.split_at_mut(n * vrows);
    let (u_out, v_out) = if wants_vectors {
        (Some(mat_mut(u, m, ucols, ldu)), Some(mat_mut(v, n, vrows, n)))
    } else {
        (None, None)
    };
    let result = svd(
        mat_ref(a, m, n, lda),
        DiagMut::from_slice_mut(sv),
        u_out,
        v_out,
        par(),
        stack_from(scratch),
        Default::default(),
    );
    if result.is_err() {
        log::debug!("{ROUTINE}: singular value iteration did not converge");
        return 1;
    }

    for (dst, src) in s.iter_mut().zip(sv.iter()) {
        *dst = src.re();
    }
    // V^H from V
    for j in 0..n {
        for i in 0..vrows {
            vt[index(i, j, ldvt)] = v[i * n + j].conj();
        }
    }
    0
}

fn set_identity<T: Scalar>(a: &mut [T], n: usize, lda: usize) {
    for j in 0..n {
        for i in 0..n {
            a[index(i, j, lda)] = if i == j { T::one() } else { T::zero() };
        }
    }
}
