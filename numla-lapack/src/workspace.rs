//! Workspace negotiation between callers and the factorization kernels.
//!
//! Routines with a `work`/`lwork` pair follow the LAPACK query protocol:
//! `lwork == LWORK_QUERY` writes the required element count into `work[0]`
//! and returns without computing anything. Kernel scratch is carved out of
//! the caller's buffer as raw bytes, so a caller-owned `work` can be reused
//! across calls without reallocating.

use core::mem::{size_of, size_of_val, MaybeUninit};

use faer::dyn_stack::{MemStack, StackReq};
use faer::{MatMut, MatRef};
use numla_core::{RealScalar, Scalar};

/// `lwork` sentinel requesting a size query.
pub const LWORK_QUERY: isize = -1;

/// Number of `T` elements covering the bytes `req` asks for at any alignment.
pub(crate) fn elements_for<T>(req: StackReq) -> usize {
    req.unaligned_bytes_required().div_ceil(size_of::<T>())
}

/// Reinterprets a scalar buffer as kernel scratch memory.
pub(crate) fn stack_from<T: Scalar>(work: &mut [T]) -> &mut MemStack {
    let len = size_of_val(work);
    // SAFETY: `T` is plain data with no invalid bit patterns in use (floats and
    // pairs of floats), the byte view covers exactly the borrowed elements and
    // lives no longer than the borrow of `work`.
    let bytes =
        unsafe { core::slice::from_raw_parts_mut(work.as_mut_ptr().cast::<MaybeUninit<u8>>(), len) };
    MemStack::new(bytes)
}

/// Result of negotiating a `work`/`lwork` pair.
pub(crate) enum Workspace<'a, T> {
    /// Size query answered, nothing else to do.
    Queried,
    /// Buffer large enough for the real call.
    Ready(&'a mut [T]),
}

/// Applies the query protocol for a routine whose `work` argument sits at
/// position `lwork_pos - 1`.
///
/// Returns the negative argument position on a bad `work` or `lwork`.
pub(crate) fn negotiate<T: Scalar>(
    work: &mut [T],
    lwork: isize,
    required: usize,
    lwork_pos: i32,
) -> Result<Workspace<'_, T>, i32> {
    let required = required.max(1);
    if lwork == LWORK_QUERY {
        let Some(first) = work.first_mut() else {
            return Err(-(lwork_pos - 1));
        };
        *first = T::from_real(<T::Real as RealScalar>::from_usize(required));
        return Ok(Workspace::Queried);
    }
    if lwork < required as isize {
        return Err(-lwork_pos);
    }
    let lwork = lwork as usize;
    if work.len() < lwork {
        return Err(-(lwork_pos - 1));
    }
    Ok(Workspace::Ready(&mut work[..lwork]))
}

/// Reads a size written by a query call.
pub fn query_len<T: Scalar>(work0: T) -> usize {
    let len = work0.re().to_f64();
    if len.is_finite() && len > 0.0 {
        len.ceil() as usize
    } else {
        1
    }
}

#[inline]
pub(crate) fn mat_ref<T>(a: &[T], m: usize, n: usize, ld: usize) -> MatRef<'_, T> {
    MatRef::from_column_major_slice_with_stride(a, m, n, ld)
}

#[inline]
pub(crate) fn mat_mut<T>(a: &mut [T], m: usize, n: usize, ld: usize) -> MatMut<'_, T> {
    MatMut::from_column_major_slice_with_stride_mut(a, m, n, ld)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_writes_required_size() {
        let mut work = [0.0f64; 1];
        match negotiate(&mut work, LWORK_QUERY, 42, 6) {
            Ok(Workspace::Queried) => {}
            _ => panic!("expected a size query"),
        }
        assert_eq!(work[0], 42.0);
        assert_eq!(query_len(work[0]), 42);
    }

    #[test]
    fn test_query_without_buffer_rejects_work() {
        let mut work: [f32; 0] = [];
        assert_eq!(negotiate(&mut work, LWORK_QUERY, 3, 6).err(), Some(-5));
    }

    #[test]
    fn test_short_lwork_rejected() {
        let mut work = vec![0.0f64; 10];
        assert_eq!(negotiate(&mut work, 4, 8, 7).err(), Some(-7));
        // lwork claims more than the buffer holds
        assert_eq!(negotiate(&mut work, 12, 8, 7).err(), Some(-6));
        match negotiate(&mut work, 9, 8, 7) {
            Ok(Workspace::Ready(w)) => assert_eq!(w.len(), 9),
            _ => panic!("expected a usable workspace"),
        }
    }

    #[test]
    fn test_complex_query_uses_real_part() {
        let mut work = [numla_core::c64::new(0.0, 0.0)];
        assert!(negotiate(&mut work, LWORK_QUERY, 17, 3).is_ok());
        assert_eq!(query_len(work[0]), 17);
    }
}
