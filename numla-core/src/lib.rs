//! # numla-core
//!
//! Shared foundation of the numla workspace:
//!
//! - **scalar**: the `Scalar` / `RealScalar` traits for `f32`, `f64`, `c32`, `c64`
//! - **layout**: LAPACK option enums (`Uplo`, `Transpose`, `Side`, `Diag`, `Job`) and column-major indexing
//! - **matrix**: owned `Matrix` and borrowed `MatrixRef` / `MatrixMut` with explicit leading dimension
//! - **error**: `LinalgError`, `LinalgState` and the `Handle` unwrap-or-abort contract
//! - **parallel**: scoped-thread column fills

pub mod error;
pub mod layout;
pub mod matrix;
pub mod parallel;
pub mod scalar;

pub use error::{check_info, Handle, LinalgError, LinalgResult, LinalgState, Status};
pub use layout::{Diag, Job, Side, Transpose, Uplo};
pub use matrix::{Matrix, MatrixMut, MatrixRef};
pub use scalar::{c32, c64, RealScalar, Scalar};
