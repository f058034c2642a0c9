//! Column-major matrix buffers and borrowed views.
//!
//! Every matrix carries an explicit leading dimension `ld >= nrows`, the
//! distance between the starts of consecutive columns, so padded storage
//! and sub-matrix views share one representation with the kernel layer.

use core::ops::{Index, IndexMut};

use crate::layout::{index, required_len};
use crate::scalar::Scalar;

/// Owned column-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
    ld: usize,
}

/// Borrowed read-only view.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRef<'a, T> {
    data: &'a [T],
    nrows: usize,
    ncols: usize,
    ld: usize,
}

/// Borrowed mutable view.
#[derive(Debug)]
pub struct MatrixMut<'a, T> {
    data: &'a mut [T],
    nrows: usize,
    ncols: usize,
    ld: usize,
}

#[inline]
fn check_storage(len: usize, nrows: usize, ncols: usize, ld: usize) {
    assert!(
        ld >= nrows.max(1),
        "leading dimension {ld} is smaller than the row count {nrows}"
    );
    assert!(
        len >= required_len(nrows, ncols, ld),
        "buffer of length {len} cannot hold a {nrows} x {ncols} matrix with ld = {ld}"
    );
}

impl<T: Scalar> Matrix<T> {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Matrix {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
            ld: nrows.max(1),
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Matrix {
            data,
            nrows,
            ncols,
            ld: nrows.max(1),
        }
    }

    /// Wraps a packed column-major buffer (`ld == nrows`).
    ///
    /// # Panics
    /// If `data.len() != nrows * ncols`.
    pub fn from_col_major(data: Vec<T>, nrows: usize, ncols: usize) -> Self {
        assert_eq!(
            data.len(),
            nrows * ncols,
            "expected {} elements for a {nrows} x {ncols} matrix",
            nrows * ncols
        );
        Matrix {
            data,
            nrows,
            ncols,
            ld: nrows.max(1),
        }
    }

    /// Wraps a column-major buffer with padding between columns.
    pub fn from_col_major_with_ld(data: Vec<T>, nrows: usize, ncols: usize, ld: usize) -> Self {
        check_storage(data.len(), nrows, ncols, ld);
        Matrix {
            data,
            nrows,
            ncols,
            ld,
        }
    }

    /// Builds a matrix from row literals.
    ///
    /// # Panics
    /// If the rows have different lengths.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.as_ref().len());
        assert!(
            rows.iter().all(|r| r.as_ref().len() == ncols),
            "ragged rows"
        );
        Self::from_fn(nrows, ncols, |i, j| rows[i].as_ref()[j])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_ref(&self) -> MatrixRef<'_, T> {
        MatrixRef {
            data: &self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            ld: self.ld,
        }
    }

    pub fn as_mut(&mut self) -> MatrixMut<'_, T> {
        MatrixMut {
            data: &mut self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            ld: self.ld,
        }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.as_ref().get(i, j)
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self[(i, j)] = value;
    }

    pub fn col(&self, j: usize) -> &[T] {
        if self.nrows == 0 {
            return &[];
        }
        let start = j * self.ld;
        &self.data[start..start + self.nrows]
    }

    pub fn col_mut(&mut self, j: usize) -> &mut [T] {
        if self.nrows == 0 {
            return &mut [];
        }
        let start = j * self.ld;
        &mut self.data[start..start + self.nrows]
    }

    pub fn transpose(&self) -> Matrix<T> {
        self.as_ref().transpose()
    }

    pub fn adjoint(&self) -> Matrix<T> {
        self.as_ref().adjoint()
    }
}

impl<T: Scalar> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.nrows && j < self.ncols, "index ({i}, {j}) out of bounds");
        &self.data[index(i, j, self.ld)]
    }
}

impl<T: Scalar> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.nrows && j < self.ncols, "index ({i}, {j}) out of bounds");
        &mut self.data[index(i, j, self.ld)]
    }
}

impl<'a, T: Scalar> MatrixRef<'a, T> {
    /// Views a column-major buffer.
    ///
    /// # Panics
    /// If `ld < max(1, nrows)` or the buffer is too short.
    pub fn new(data: &'a [T], nrows: usize, ncols: usize, ld: usize) -> Self {
        check_storage(data.len(), nrows, ncols, ld);
        MatrixRef {
            data,
            nrows,
            ncols,
            ld,
        }
    }

    /// Views a slice as a single column.
    pub fn from_column(data: &'a [T]) -> Self {
        MatrixRef {
            data,
            nrows: data.len(),
            ncols: 1,
            ld: data.len().max(1),
        }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.ncols == 0
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Underlying storage, starting at element (0, 0).
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.nrows && j < self.ncols, "index ({i}, {j}) out of bounds");
        self.data[index(i, j, self.ld)]
    }

    pub fn col(&self, j: usize) -> &'a [T] {
        if self.nrows == 0 {
            return &[];
        }
        let start = j * self.ld;
        &self.data[start..start + self.nrows]
    }

    /// The `nrows x ncols` block starting at (`row`, `col`), without copying.
    pub fn submatrix(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> MatrixRef<'a, T> {
        assert!(row + nrows <= self.nrows && col + ncols <= self.ncols);
        let start = if nrows == 0 || ncols == 0 {
            0
        } else {
            index(row, col, self.ld)
        };
        MatrixRef {
            data: &self.data[start..],
            nrows,
            ncols,
            ld: self.ld,
        }
    }

    /// Packs the view into a fresh matrix with `ld == nrows`.
    pub fn to_owned(&self) -> Matrix<T> {
        Matrix::from_fn(self.nrows, self.ncols, |i, j| self.get(i, j))
    }

    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.ncols, self.nrows, |i, j| self.get(j, i))
    }

    pub fn adjoint(&self) -> Matrix<T> {
        Matrix::from_fn(self.ncols, self.nrows, |i, j| self.get(j, i).conj())
    }
}

impl<'a, T: Scalar> From<&'a Matrix<T>> for MatrixRef<'a, T> {
    fn from(m: &'a Matrix<T>) -> Self {
        m.as_ref()
    }
}

impl<'a, T: Scalar> MatrixMut<'a, T> {
    /// Views a mutable column-major buffer.
    ///
    /// # Panics
    /// If `ld < max(1, nrows)` or the buffer is too short.
    pub fn new(data: &'a mut [T], nrows: usize, ncols: usize, ld: usize) -> Self {
        check_storage(data.len(), nrows, ncols, ld);
        MatrixMut {
            data,
            nrows,
            ncols,
            ld,
        }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    pub fn rb(&self) -> MatrixRef<'_, T> {
        MatrixRef {
            data: &*self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            ld: self.ld,
        }
    }

    /// Reborrows the view for a shorter lifetime.
    pub fn rb_mut(&mut self) -> MatrixMut<'_, T> {
        MatrixMut {
            data: &mut *self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            ld: self.ld,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.rb().get(i, j)
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.nrows && j < self.ncols, "index ({i}, {j}) out of bounds");
        self.data[index(i, j, self.ld)] = value;
    }

    pub fn col_mut(&mut self, j: usize) -> &mut [T] {
        if self.nrows == 0 {
            return &mut [];
        }
        let start = j * self.ld;
        &mut self.data[start..start + self.nrows]
    }

    pub fn submatrix_mut(self, row: usize, col: usize, nrows: usize, ncols: usize) -> MatrixMut<'a, T> {
        assert!(row + nrows <= self.nrows && col + ncols <= self.ncols);
        let start = if nrows == 0 || ncols == 0 {
            0
        } else {
            index(row, col, self.ld)
        };
        MatrixMut {
            data: &mut self.data[start..],
            nrows,
            ncols,
            ld: self.ld,
        }
    }

    pub fn fill(&mut self, value: T) {
        for j in 0..self.ncols {
            self.col_mut(j).fill(value);
        }
    }

    pub fn copy_from(&mut self, src: MatrixRef<'_, T>) {
        assert_eq!(self.shape(), src.shape(), "copy between mismatched shapes");
        for j in 0..self.ncols {
            self.col_mut(j).copy_from_slice(src.col(j));
        }
    }
}

impl<'a, T: Scalar> From<&'a mut Matrix<T>> for MatrixMut<'a, T> {
    fn from(m: &'a mut Matrix<T>) -> Self {
        m.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_is_column_major() {
        let m = Matrix::<f64>::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m.col(1), &[2.0, 5.0]);
    }

    #[test]
    fn test_padded_storage_and_submatrix() {
        // 2x2 matrix stored with ld = 3, the third row is padding
        let m = Matrix::from_col_major_with_ld(vec![1.0f32, 2.0, -1.0, 3.0, 4.0, -1.0], 2, 2, 3);
        assert_eq!(m.get(1, 1), 4.0);
        assert_eq!(m.as_ref().to_owned().as_slice(), &[1.0, 2.0, 3.0, 4.0]);

        let big = Matrix::<f64>::from_fn(4, 4, |i, j| (10 * i + j) as f64);
        let sub = big.as_ref().submatrix(1, 2, 2, 2);
        assert_eq!(sub.get(0, 0), 12.0);
        assert_eq!(sub.get(1, 1), 23.0);
        assert_eq!(sub.ld(), 4);
    }

    #[test]
    fn test_adjoint_conjugates() {
        use crate::scalar::c64;
        let m = Matrix::from_rows(&[[c64::new(1.0, 2.0), c64::new(0.0, -1.0)]]);
        let h = m.adjoint();
        assert_eq!(h.shape(), (2, 1));
        assert_eq!(h[(0, 0)], c64::new(1.0, -2.0));
        assert_eq!(h[(1, 0)], c64::new(0.0, 1.0));
    }

    #[test]
    fn test_mut_view_fill_and_copy() {
        let mut m = Matrix::<f64>::zeros(3, 3);
        m.as_mut().submatrix_mut(1, 1, 2, 2).fill(7.0);
        assert_eq!(m[(0, 0)], 0.0);
        assert_eq!(m[(2, 2)], 7.0);

        let src = Matrix::<f64>::identity(3);
        m.as_mut().copy_from(src.as_ref());
        assert_eq!(m, Matrix::identity(3));
    }

    #[test]
    #[should_panic(expected = "leading dimension")]
    fn test_rejects_short_leading_dimension() {
        let data = [0.0f64; 6];
        let _ = MatrixRef::new(&data, 3, 2, 2);
    }
}
