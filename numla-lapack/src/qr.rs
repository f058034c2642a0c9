//! Householder QR factorization and explicit formation of Q.
//!
//! Reflectors are applied one at a time (block size 1), so the coefficient
//! block the kernel library produces is a single row and fits LAPACK's
//! `tau` vector of length `min(m, n)`.

use faer::linalg::householder::{
    apply_block_householder_sequence_on_the_left_in_place_scratch,
    apply_block_householder_sequence_on_the_left_in_place_with_conj,
};
use faer::linalg::qr::no_pivoting::factor::{qr_in_place, qr_in_place_scratch};
use faer::traits::ComplexField;
use faer::{Conj, MatMut, MatRef};
use numla_core::layout::{index, required_len};
use numla_core::Scalar;

use crate::config::par;
use crate::workspace::{elements_for, mat_mut, mat_ref, stack_from};

const BLOCKSIZE: usize = 1;

/// Workspace elements `geqrf` needs for an `m x n` matrix.
pub fn geqrf_work_len<T: Scalar + ComplexField>(m: usize, n: usize) -> usize {
    elements_for::<T>(qr_in_place_scratch::<T>(m, n, BLOCKSIZE, par(), Default::default()))
}

/// Workspace elements `orgqr` needs for `k` reflectors of length `m` and `n` output columns.
pub fn orgqr_work_len<T: Scalar + ComplexField>(m: usize, n: usize, k: usize) -> usize {
    m * k + elements_for::<T>(apply_block_householder_sequence_on_the_left_in_place_scratch::<T>(m, BLOCKSIZE, n))
}

// ============================================================================
// GEQRF: A = Q * R
// ============================================================================

pub(crate) fn geqrf<T: Scalar + ComplexField>(
    m: usize,
    n: usize,
    a: &mut [T],
    lda: usize,
    tau: &mut [T],
    work: &mut [T],
    lwork: isize,
) -> i32 {
    const ROUTINE: &str = "geqrf";
    if lda < m.max(1) {
        reject!(ROUTINE, 4, "lda = {lda} < max(1, m = {m})");
    }
    if a.len() < required_len(m, n, lda) {
        reject!(ROUTINE, 3, "length {} cannot hold {m} x {n} with lda = {lda}", a.len());
    }
    let k = m.min(n);
    if tau.len() < k {
        reject!(ROUTINE, 5, "tau has length {}, need {k}", tau.len());
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, geqrf_work_len::<T>(m, n), 7);
    if k == 0 {
        return 0;
    }

    qr_in_place(
        mat_mut(a, m, n, lda),
        MatMut::from_column_major_slice_mut(&mut tau[..k], BLOCKSIZE, k),
        par(),
        stack_from(work),
        Default::default(),
    );
    0
}

// ============================================================================
// ORGQR: form the leading n columns of Q
// ============================================================================

pub(crate) fn orgqr<T: Scalar + ComplexField>(
    m: usize,
    n: usize,
    k: usize,
    a: &mut [T],
    lda: usize,
    tau: &[T],
    work: &mut [T],
    lwork: isize,
) -> i32 {
    const ROUTINE: &str = "orgqr";
    if n > m {
        reject!(ROUTINE, 2, "n = {n} exceeds m = {m}");
    }
    if k > n {
        reject!(ROUTINE, 3, "k = {k} exceeds n = {n}");
    }
    if lda < m.max(1) {
        reject!(ROUTINE, 5, "lda = {lda} < max(1, m = {m})");
    }
    if a.len() < required_len(m, n, lda) {
        reject!(ROUTINE, 4, "length {} cannot hold {m} x {n} with lda = {lda}", a.len());
    }
    if tau.len() < k {
        reject!(ROUTINE, 6, "tau has length {}, need {k}", tau.len());
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, orgqr_work_len::<T>(m, n, k), 8);
    if n == 0 {
        return 0;
    }

    // Unit lower-trapezoidal copy of the reflectors; A is then reset to I.
    let (basis, scratch) = work.split_at_mut(m * k);
    for j in 0..k {
        for i in 0..m {
            basis[j * m + i] = if i < j {
                T::zero()
            } else if i == j {
                T::one()
            } else {
                a[index(i, j, lda)]
            };
        }
    }
    for j in 0..n {
        for i in 0..m {
            a[index(i, j, lda)] = if i == j { T::one() } else { T::zero() };
        }
    }
    if k == 0 {
        return 0;
    }

    apply_block_householder_sequence_on_the_left_in_place_with_conj(
        mat_ref(basis, m, k, m),
        MatRef::from_column_major_slice(&tau[..k], BLOCKSIZE, k),
        Conj::No,
        mat_mut(a, m, n, lda),
        par(),
        stack_from(scratch),
    );
    0
}
