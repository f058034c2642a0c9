//! Identity and diagonal constructors.

use numla_core::parallel::for_each_column_mut;
use numla_core::{Matrix, MatrixRef, Scalar};

/// `m x n` matrix with ones on the main diagonal.
pub fn eye<T: Scalar>(m: usize, n: usize) -> Matrix<T> {
    let mut out = Matrix::zeros(m, n);
    for_each_column_mut(out.as_mut(), |j, col| {
        if let Some(d) = col.get_mut(j) {
            *d = T::one();
        }
    });
    out
}

/// Square matrix with `values` on the diagonal.
pub fn diag<T: Scalar>(values: &[T]) -> Matrix<T> {
    let n = values.len();
    let mut out = Matrix::zeros(n, n);
    for_each_column_mut(out.as_mut(), |j, col| col[j] = values[j]);
    out
}

/// Main diagonal of `a`, `min(m, n)` entries.
pub fn diag_of<T: Scalar>(a: MatrixRef<'_, T>) -> Vec<T> {
    (0..a.nrows().min(a.ncols())).map(|i| a.get(i, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use numla_core::c32;

    #[test]
    fn test_eye_rectangular() {
        let e = eye::<f64>(2, 3);
        assert_eq!(e, Matrix::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]));
        assert_eq!(eye::<f32>(3, 3), Matrix::identity(3));
    }

    #[test]
    fn test_diag_round_trip_large() {
        // large enough to take the threaded path
        let n = 400;
        let values: Vec<c32> = (0..n).map(|i| c32::new(i as f32, -(i as f32))).collect();
        let d = diag(&values);
        assert_eq!(d[(17, 17)], c32::new(17.0, -17.0));
        assert_eq!(d[(17, 18)], c32::new(0.0, 0.0));
        assert_eq!(diag_of(d.as_ref()), values);
    }

    #[test]
    fn test_diag_of_rectangular() {
        let a = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6]].map(|r| r.map(f64::from)));
        assert_eq!(diag_of(a.as_ref()), vec![1.0, 5.0]);
        assert!(diag_of(Matrix::<f64>::zeros(0, 4).as_ref()).is_empty());
    }
}
