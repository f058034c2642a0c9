//! Thread-parallel column fills.
//!
//! Uses `std::thread::scope`, so closures may borrow from the caller and no
//! pool outlives the call. Small outputs run inline.

use crate::layout::required_len;
use crate::matrix::MatrixMut;

/// Element count below which fills run on the calling thread.
pub const PARALLEL_FILL_THRESHOLD: usize = 1 << 16;

/// Worker count: all available cores, 4 when the platform cannot tell.
#[inline]
pub fn num_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Calls `f(j, column_j)` for every column of `m`.
///
/// Columns are split into one contiguous group per thread once the matrix
/// holds at least [`PARALLEL_FILL_THRESHOLD`] elements.
pub fn for_each_column_mut<T, F>(m: MatrixMut<'_, T>, f: F)
where
    T: crate::Scalar,
    F: Fn(usize, &mut [T]) + Sync,
{
    let (nrows, ncols, ld) = (m.nrows(), m.ncols(), m.ld());
    if nrows == 0 || ncols == 0 {
        return;
    }
    let mut m = m;
    let threads = num_threads();

    if nrows * ncols < PARALLEL_FILL_THRESHOLD || threads <= 1 {
        for j in 0..ncols {
            f(j, m.col_mut(j));
        }
        return;
    }

    let cols_per_thread = ncols.div_ceil(threads);
    let data = &mut m.as_mut_slice()[..required_len(nrows, ncols, ld)];
    let f = &f;

    std::thread::scope(|s| {
        for (chunk_idx, chunk) in data.chunks_mut(cols_per_thread * ld).enumerate() {
            let first = chunk_idx * cols_per_thread;
            s.spawn(move || {
                for (offset, col) in chunk.chunks_mut(ld).enumerate() {
                    let j = first + offset;
                    if j >= ncols {
                        break;
                    }
                    f(j, &mut col[..nrows]);
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_small_fill_visits_every_column() {
        let mut m = Matrix::<f64>::zeros(3, 5);
        for_each_column_mut(m.as_mut(), |j, col| col.fill(j as f64));
        assert_eq!(m[(2, 4)], 4.0);
        assert_eq!(m[(0, 0)], 0.0);
    }

    #[test]
    fn test_large_fill_covers_range() {
        let n = 400;
        let counter = AtomicUsize::new(0);
        let mut m = Matrix::<f32>::zeros(n, n);
        for_each_column_mut(m.as_mut(), |j, col| {
            counter.fetch_add(col.len(), Ordering::Relaxed);
            col[j] = 1.0;
        });
        assert_eq!(counter.load(Ordering::Relaxed), n * n);
        assert_eq!(m, Matrix::identity(n));
    }

    #[test]
    fn test_padded_columns_leave_padding_alone() {
        let data = vec![-1.0f64; 8 * 300];
        let mut m = Matrix::from_col_major_with_ld(data, 6, 300, 8);
        for_each_column_mut(m.as_mut(), |_, col| col.fill(0.0));
        assert_eq!(m.as_slice()[6], -1.0);
        assert_eq!(m.get(5, 299), 0.0);
    }

    #[test]
    fn test_empty_matrix() {
        let counter = AtomicUsize::new(0);
        let mut m = Matrix::<f64>::zeros(0, 5);
        for_each_column_mut(m.as_mut(), |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
