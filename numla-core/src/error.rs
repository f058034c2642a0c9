//! Error and state types shared by the kernel and dispatch layers.
//!
//! High-level operations return [`LinalgResult`]. Callers that want the
//! error as a plain value pass a [`LinalgState`] destination to
//! [`Handle::handle`]; callers that do not get fail-fast behaviour: the
//! message is logged and the program panics.

use core::fmt;
use thiserror::Error;

/// Outcome class of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Success,
    /// Caller-supplied shapes or sizes violate a precondition.
    ValueError,
    /// The kernel ran but the operation failed for this input.
    ComputationError,
    /// The kernel rejected arguments the dispatch layer produced.
    InternalError,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::ValueError => "value error",
            Status::ComputationError => "computation error",
            Status::InternalError => "internal error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed linear algebra operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// Shapes, sizes or options rejected before any kernel call.
    #[error("[{origin}] value error: {message}")]
    Value {
        origin: &'static str,
        message: String,
    },

    /// The kernel reported a numerical failure (singular, not positive definite, no convergence).
    #[error("[{origin}] computation error: {message}")]
    Computation {
        origin: &'static str,
        message: String,
    },

    /// The kernel returned a status the dispatch layer does not expect.
    #[error("[{origin}] internal error: {message}")]
    Internal {
        origin: &'static str,
        message: String,
    },
}

/// Result type for linear algebra operations.
pub type LinalgResult<T> = Result<T, LinalgError>;

impl LinalgError {
    pub fn value(origin: &'static str, message: impl Into<String>) -> Self {
        LinalgError::Value {
            origin,
            message: message.into(),
        }
    }

    pub fn computation(origin: &'static str, message: impl Into<String>) -> Self {
        LinalgError::Computation {
            origin,
            message: message.into(),
        }
    }

    pub fn internal(origin: &'static str, message: impl Into<String>) -> Self {
        LinalgError::Internal {
            origin,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            LinalgError::Value { .. } => Status::ValueError,
            LinalgError::Computation { .. } => Status::ComputationError,
            LinalgError::Internal { .. } => Status::InternalError,
        }
    }

    /// Name of the operation that failed.
    pub fn origin(&self) -> &'static str {
        match self {
            LinalgError::Value { origin, .. }
            | LinalgError::Computation { origin, .. }
            | LinalgError::Internal { origin, .. } => origin,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinalgError::Value { message, .. }
            | LinalgError::Computation { message, .. }
            | LinalgError::Internal { message, .. } => message,
        }
    }
}

/// Returns early with a formatted [`LinalgError`].
///
/// ```
/// use numla_core::{linalg_bail, LinalgResult};
///
/// fn check(n: usize, len: usize) -> LinalgResult<()> {
///     if len != n {
///         linalg_bail!(Value, "solve", "b has length {len}, expected {n}");
///     }
///     Ok(())
/// }
/// assert!(check(3, 4).is_err());
/// ```
#[macro_export]
macro_rules! linalg_bail {
    ($kind:ident, $origin:expr, $($arg:tt)+) => {
        return Err($crate::LinalgError::$kind {
            origin: $origin,
            message: format!($($arg)+),
        })
    };
}

/// Maps a kernel status code to a result.
///
/// `0` is success, a negative code names an argument the kernel rejected
/// (a contract violation between the dispatch layer and the kernel), and a
/// positive code is a numerical failure described by `on_failure`.
pub fn check_info(
    origin: &'static str,
    routine: &str,
    info: i32,
    on_failure: impl FnOnce(i32) -> String,
) -> LinalgResult<()> {
    match info {
        0 => Ok(()),
        i if i < 0 => Err(LinalgError::internal(
            origin,
            format!("{routine} rejected argument {}", -i),
        )),
        i => Err(LinalgError::computation(origin, on_failure(i))),
    }
}

/// Immutable record of how an operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinalgState {
    status: Status,
    origin: &'static str,
    message: String,
}

impl LinalgState {
    pub fn success(origin: &'static str) -> Self {
        LinalgState {
            status: Status::Success,
            origin,
            message: String::new(),
        }
    }

    pub fn from_result<T>(origin: &'static str, result: &LinalgResult<T>) -> Self {
        match result {
            Ok(_) => LinalgState::success(origin),
            Err(e) => LinalgState::from(e),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn ok(&self) -> bool {
        self.status == Status::Success
    }

    pub fn error(&self) -> bool {
        !self.ok()
    }
}

impl From<&LinalgError> for LinalgState {
    fn from(e: &LinalgError) -> Self {
        LinalgState {
            status: e.status(),
            origin: e.origin(),
            message: e.message().to_owned(),
        }
    }
}

impl From<LinalgError> for LinalgState {
    fn from(e: LinalgError) -> Self {
        LinalgState::from(&e)
    }
}

impl fmt::Display for LinalgState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "[{}] {}", self.origin, self.status)
        } else {
            write!(f, "[{}] {}: {}", self.origin, self.status, self.message)
        }
    }
}

/// Dual-mode consumption of a [`LinalgResult`].
pub trait Handle<T> {
    /// Writes the outcome of the operation named `origin` into `state` when
    /// one is supplied and returns the value on success. Without a
    /// destination an error is fatal.
    fn handle(self, origin: &'static str, state: Option<&mut LinalgState>) -> Option<T>;

    /// Returns the value or logs the error and panics.
    fn or_abort(self) -> T;
}

impl<T> Handle<T> for LinalgResult<T> {
    fn handle(self, origin: &'static str, state: Option<&mut LinalgState>) -> Option<T> {
        match state {
            Some(dst) => {
                *dst = LinalgState::from_result(origin, &self);
                self.ok()
            }
            None => Some(self.or_abort()),
        }
    }

    #[track_caller]
    fn or_abort(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                log::error!("{e}");
                panic!("{e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(n: usize) -> LinalgResult<usize> {
        if n > 2 {
            linalg_bail!(Value, "scale", "n = {n} exceeds {}", 2);
        }
        Ok(n * 10)
    }

    #[test]
    fn test_error_accessors() {
        let e = LinalgError::computation("solve", "matrix is singular");
        assert_eq!(e.status(), Status::ComputationError);
        assert_eq!(e.origin(), "solve");
        assert_eq!(e.message(), "matrix is singular");
        assert_eq!(e.to_string(), "[solve] computation error: matrix is singular");
    }

    #[test]
    fn test_bail_formats_positional_fields() {
        let e = failing(5).unwrap_err();
        assert_eq!(e.status(), Status::ValueError);
        assert_eq!(e.message(), "n = 5 exceeds 2");
    }

    #[test]
    fn test_handle_with_destination() {
        let mut state = LinalgState::default();
        assert_eq!(failing(5).handle("scale", Some(&mut state)), None);
        assert!(state.error());
        assert_eq!(state.status(), Status::ValueError);
        assert_eq!(state.origin(), "scale");

        assert_eq!(failing(1).handle("scale", Some(&mut state)), Some(10));
        assert!(state.ok());
        assert_eq!(state.origin(), "scale");
    }

    #[test]
    fn test_reused_state_takes_new_origin() {
        let mut state = LinalgState::default();
        assert_eq!(failing(9).handle("scale", Some(&mut state)), None);
        assert_eq!(state.origin(), "scale");

        let next: LinalgResult<f64> = Ok(1.5);
        assert_eq!(next.handle("norm", Some(&mut state)), Some(1.5));
        assert!(state.ok());
        assert_eq!(state.origin(), "norm");
        assert!(state.message().is_empty());
    }

    #[test]
    fn test_handle_without_destination_passes_success() {
        assert_eq!(failing(2).handle("scale", None), Some(20));
    }

    #[test]
    #[should_panic(expected = "n = 7 exceeds 2")]
    fn test_handle_without_destination_aborts() {
        let _ = failing(7).handle("scale", None);
    }

    #[test]
    fn test_check_info_mapping() {
        assert!(check_info("inv", "getrf", 0, |_| unreachable!()).is_ok());

        let e = check_info("inv", "getrf", -4, |_| unreachable!()).unwrap_err();
        assert_eq!(e.status(), Status::InternalError);
        assert_eq!(e.message(), "getrf rejected argument 4");

        let e = check_info("inv", "getrf", 2, |i| format!("U[{0},{0}] is zero", i - 1)).unwrap_err();
        assert_eq!(e.status(), Status::ComputationError);
        assert_eq!(e.message(), "U[1,1] is zero");
    }

    #[test]
    fn test_state_display() {
        let ok = LinalgState::success("eye");
        assert_eq!(ok.to_string(), "[eye] success");
        let bad = LinalgState::from(LinalgError::value("qr", "q must be 3 x 2"));
        assert_eq!(bad.to_string(), "[qr] value error: q must be 3 x 2");
    }
}
