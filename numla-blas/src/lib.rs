// BLAS functions keep the reference argument lists, so most take many parameters.
// Numeric kernels use index loops on strided arrays where iterators hurt readability.
#![allow(clippy::too_many_arguments, clippy::needless_range_loop)]

//! # numla-blas
//!
//! BLAS routines on raw column-major buffers, generic over the four element
//! types of `numla-core` (`f32`, `f64`, `c32`, `c64`).
//!
//! ## BLAS Levels
//!
//! - **Level 1** (vector-vector): `dot`, `dotc`, `axpy`, `scal`, `nrm2`,
//!   `asum`, `iamax`, `copy`, `swap`, `rotg`, `rot`
//! - **Level 2** (matrix-vector): `gemv`, `ger`, `gerc`, `trsv`
//! - **Level 3** (matrix-matrix): `gemm`, `trsm`
//!
//! Level 1 is written out directly. Levels 2 and 3 run on the `faer`
//! kernels, so their parallelism follows the global `faer` setting.
//!
//! ## Memory Layout
//!
//! Column-major only: element `(i, j)` of a matrix with leading dimension
//! `ld` sits at `j * ld + i`. Vectors take an element stride (`incx`).
//! Buffers shorter than the dimensions imply cause a panic.
//!
//! ```
//! use numla_blas::level3;
//! use numla_blas::Transpose;
//!
//! let (m, k, n) = (2, 3, 2);
//! let a = vec![1.0f64; m * k];
//! let b = vec![2.0f64; k * n];
//! let mut c = vec![0.0f64; m * n];
//! level3::gemm(Transpose::NoTrans, Transpose::NoTrans, m, n, k, 1.0, &a, m, &b, k, 0.0, &mut c, m);
//! assert_eq!(c, vec![6.0; 4]);
//! ```

use faer::{MatMut, MatRef};

/// Expands `$body` with `$v` bound to `op($mat)` for a runtime [`Transpose`].
///
/// Each arm sees a differently typed view, so the body is instantiated once
/// per operation.
macro_rules! with_op {
    ($trans:expr, $mat:expr, |$v:ident| $body:expr) => {
        match $trans {
            numla_core::Transpose::NoTrans => {
                let $v = $mat;
                $body
            }
            numla_core::Transpose::Trans => {
                let $v = $mat.transpose();
                $body
            }
            numla_core::Transpose::ConjTrans => {
                let $v = $mat.adjoint();
                $body
            }
        }
    };
}

pub mod level1;
pub mod level2;
pub mod level3;

pub use numla_core::layout::{Diag, Side, Transpose, Uplo};

#[inline]
pub(crate) fn mat_ref<T>(a: &[T], m: usize, n: usize, ld: usize) -> MatRef<'_, T> {
    MatRef::from_column_major_slice_with_stride(a, m, n, ld)
}

#[inline]
pub(crate) fn mat_mut<T>(a: &mut [T], m: usize, n: usize, ld: usize) -> MatMut<'_, T> {
    MatMut::from_column_major_slice_with_stride_mut(a, m, n, ld)
}
