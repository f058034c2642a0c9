//! LU factorization with partial pivoting and the routines built on it.

use faer::dyn_stack::{MemBuffer, MemStack};
use faer::linalg::lu::partial_pivoting::factor::{lu_in_place, lu_in_place_scratch};
use faer::linalg::triangular_solve::{
    solve_lower_triangular_in_place_with_conj, solve_unit_lower_triangular_in_place_with_conj,
    solve_unit_upper_triangular_in_place_with_conj, solve_upper_triangular_in_place_with_conj,
};
use faer::traits::ComplexField;
use faer::Conj;
use numla_core::layout::{index, required_len};
use numla_core::{Scalar, Transpose};

use crate::config::par;
use crate::workspace::{mat_mut, mat_ref};

// ============================================================================
// Pivot bookkeeping
// ============================================================================

/// Converts a row permutation (`perm[i]` = original row placed at position
/// `i`) into the LAPACK sequence of swaps applied in order `k = 0, 1, ...`.
pub(crate) fn transpositions_from_perm(perm: &[usize], ipiv: &mut [usize]) {
    let m = perm.len();
    // cur[p]: original row currently at position p; pos is its inverse
    let mut cur: Vec<usize> = (0..m).collect();
    let mut pos: Vec<usize> = (0..m).collect();
    for k in 0..ipiv.len() {
        let target = perm[k];
        let p = pos[target];
        ipiv[k] = p;
        let displaced = cur[k];
        cur.swap(k, p);
        pos[displaced] = p;
        pos[target] = k;
    }
}

/// Applies the swaps in `ipiv` to the rows of `b`, in order or in reverse.
pub(crate) fn apply_row_swaps<T: Scalar>(b: &mut [T], ncols: usize, ldb: usize, ipiv: &[usize], reverse: bool) {
    let mut swap_row = |k: usize| {
        let p = ipiv[k];
        if p != k {
            for j in 0..ncols {
                b.swap(index(k, j, ldb), index(p, j, ldb));
            }
        }
    };
    if reverse {
        for k in (0..ipiv.len()).rev() {
            swap_row(k);
        }
    } else {
        for k in 0..ipiv.len() {
            swap_row(k);
        }
    }
}

/// One-based index of the first exactly-zero diagonal entry, 0 if none.
fn first_zero_pivot<T: Scalar>(a: &[T], k: usize, lda: usize) -> i32 {
    (0..k)
        .find(|&i| a[index(i, i, lda)].is_zero())
        .map_or(0, |i| i as i32 + 1)
}

// ============================================================================
// GETRF: P * A = L * U
// ============================================================================

pub(crate) fn getrf<T: Scalar + ComplexField>(
    m: usize,
    n: usize,
    a: &mut [T],
    lda: usize,
    ipiv: &mut [usize],
) -> i32 {
    const ROUTINE: &str = "getrf";
    if lda < m.max(1) {
        reject!(ROUTINE, 4, "lda = {lda} < max(1, m = {m})");
    }
    if a.len() < required_len(m, n, lda) {
        reject!(ROUTINE, 3, "length {} cannot hold {m} x {n} with lda = {lda}", a.len());
    }
    let min_mn = m.min(n);
    if ipiv.len() < min_mn {
        reject!(ROUTINE, 5, "ipiv has length {}, need {min_mn}", ipiv.len());
    }
    if min_mn == 0 {
        return 0;
    }

    let par = par();
    let mut perm = vec![0usize; m];
    let mut perm_inv = vec![0usize; m];
    let mut mem = MemBuffer::new(lu_in_place_scratch::<usize, T>(m, n, par, Default::default()));
    let _ = lu_in_place(
        mat_mut(a, m, n, lda),
        &mut perm,
        &mut perm_inv,
        par,
        MemStack::new(&mut mem),
        Default::default(),
    );
    transpositions_from_perm(&perm, &mut ipiv[..min_mn]);

    first_zero_pivot(a, min_mn, lda)
}

// ============================================================================
// GETRS: solve op(A) * X = B from LU factors
// ============================================================================

pub(crate) fn getrs<T: Scalar + ComplexField>(
    trans: Transpose,
    n: usize,
    nrhs: usize,
    a: &[T],
    lda: usize,
    ipiv: &[usize],
    b: &mut [T],
    ldb: usize,
) -> i32 {
    const ROUTINE: &str = "getrs";
    if lda < n.max(1) {
        reject!(ROUTINE, 5, "lda = {lda} < max(1, n = {n})");
    }
    if a.len() < required_len(n, n, lda) {
        reject!(ROUTINE, 4, "length {} cannot hold {n} x {n} with lda = {lda}", a.len());
    }
    if ipiv.len() < n || ipiv[..n].iter().enumerate().any(|(k, &p)| p < k || p >= n) {
        reject!(ROUTINE, 6, "ipiv is not a swap sequence for order {n}");
    }
    if ldb < n.max(1) {
        reject!(ROUTINE, 8, "ldb = {ldb} < max(1, n = {n})");
    }
    if b.len() < required_len(n, nrhs, ldb) {
        reject!(ROUTINE, 7, "length {} cannot hold {n} x {nrhs} with ldb = {ldb}", b.len());
    }
    if n == 0 || nrhs == 0 {
        return 0;
    }

    let par = par();
    let ipiv = &ipiv[..n];
    let lu = mat_ref(a, n, n, lda);

    match trans {
        Transpose::NoTrans => {
            // A = P^T L U, so X = U^-1 L^-1 P B
            apply_row_swaps(b, nrhs, ldb, ipiv, false);
            let mut rhs = mat_mut(b, n, nrhs, ldb);
            solve_unit_lower_triangular_in_place_with_conj(lu, Conj::No, rhs.as_mut(), par);
            solve_upper_triangular_in_place_with_conj(lu, Conj::No, rhs, par);
        }
        Transpose::Trans | Transpose::ConjTrans => {
            // op(A) = op(U) op(L) P, so X = P^T op(L)^-1 op(U)^-1 B
            let conj = if trans == Transpose::ConjTrans && T::IS_COMPLEX {
                Conj::Yes
            } else {
                Conj::No
            };
            let mut rhs = mat_mut(b, n, nrhs, ldb);
            solve_lower_triangular_in_place_with_conj(lu.transpose(), conj, rhs.as_mut(), par);
            solve_unit_upper_triangular_in_place_with_conj(lu.transpose(), conj, rhs, par);
            apply_row_swaps(b, nrhs, ldb, ipiv, true);
        }
    }

    0
}

// ============================================================================
// GETRI: inverse from LU factors
// ============================================================================

pub(crate) fn getri<T: Scalar + ComplexField>(
    n: usize,
    a: &mut [T],
    lda: usize,
    ipiv: &[usize],
    work: &mut [T],
    lwork: isize,
) -> i32 {
    const ROUTINE: &str = "getri";
    if lda < n.max(1) {
        reject!(ROUTINE, 3, "lda = {lda} < max(1, n = {n})");
    }
    if a.len() < required_len(n, n, lda) {
        reject!(ROUTINE, 2, "length {} cannot hold {n} x {n} with lda = {lda}", a.len());
    }
    if ipiv.len() < n || ipiv[..n].iter().enumerate().any(|(k, &p)| p < k || p >= n) {
        reject!(ROUTINE, 4, "ipiv is not a swap sequence for order {n}");
    }
    let work = negotiate_or_return!(ROUTINE, work, lwork, n * n, 6);
    if n == 0 {
        return 0;
    }

    let info = first_zero_pivot(a, n, lda);
    if info > 0 {
        return info;
    }

    // LU factors move to the workspace; A becomes P * I and is solved in place
    let lu_buf = &mut work[..n * n];
    for j in 0..n {
        let src = &a[index(0, j, lda)..index(0, j, lda) + n];
        lu_buf[j * n..(j + 1) * n].copy_from_slice(src);
        for i in 0..n {
            a[index(i, j, lda)] = if i == j { T::one() } else { T::zero() };
        }
    }
    apply_row_swaps(a, n, lda, &ipiv[..n], false);

    let par = par();
    let lu = mat_ref(lu_buf, n, n, n);
    let mut inv = mat_mut(a, n, n, lda);
    solve_unit_lower_triangular_in_place_with_conj(lu, Conj::No, inv.as_mut(), par);
    solve_upper_triangular_in_place_with_conj(lu, Conj::No, inv, par);

    0
}

// ============================================================================
// GESV: factor and solve
// ============================================================================

pub(crate) fn gesv<T: Scalar + ComplexField>(
    n: usize,
    nrhs: usize,
    a: &mut [T],
    lda: usize,
    ipiv: &mut [usize],
    b: &mut [T],
    ldb: usize,
) -> i32 {
    const ROUTINE: &str = "gesv";
    if ldb < n.max(1) {
        reject!(ROUTINE, 7, "ldb = {ldb} < max(1, n = {n})");
    }
    if b.len() < required_len(n, nrhs, ldb) {
        reject!(ROUTINE, 6, "length {} cannot hold {n} x {nrhs} with ldb = {ldb}", b.len());
    }
    // a, lda and ipiv sit at the same positions in both argument lists
    let info = getrf(n, n, a, lda, ipiv);
    if info != 0 {
        return info;
    }
    getrs(Transpose::NoTrans, n, nrhs, a, lda, ipiv, b, ldb)
}
