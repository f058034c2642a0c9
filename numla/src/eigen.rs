//! Eigenvalue problems: general (`geev`) and symmetric/Hermitian (`heevd`).

use num_complex::Complex;
use numla_core::{check_info, linalg_bail, Job, LinalgResult, Matrix, MatrixMut, MatrixRef, RealScalar, Scalar, Uplo};
use numla_lapack::{Lapack, LWORK_QUERY};

use crate::{dispatch, query_workspace, require_square};

/// Eigenvalues with their eigenvectors stored column by column: column `j`
/// of `vectors` belongs to `values[j]`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition<E, V = E> {
    pub values: Vec<E>,
    pub vectors: Matrix<V>,
}

fn no_convergence(_: i32) -> String {
    String::from("eigenvalue iteration did not converge")
}

/// Raw `geev` output: real and imaginary parts, plus the vectors when asked.
struct GeneralEigen<T: Scalar> {
    wr: Vec<T::Real>,
    wi: Vec<T::Real>,
    vr: Matrix<T>,
}

fn run_geev<T: Lapack>(origin: &'static str, a: MatrixRef<'_, T>, jobvr: Job) -> LinalgResult<GeneralEigen<T>> {
    let n = require_square(origin, "a", a)?;
    let vcols = if jobvr == Job::Full { n } else { 0 };
    let mut wr = vec![T::Real::zero(); n];
    let mut wi = vec![T::Real::zero(); n];
    let mut vr = Matrix::<T>::zeros(n, vcols);
    let ldvr = vr.ld();

    let mut work = query_workspace(origin, "geev", |w| {
        T::geev(jobvr, n, a.as_slice(), a.ld(), &mut wr, &mut wi, vr.as_mut_slice(), ldvr, w, LWORK_QUERY)
    })?;
    let lwork = work.len() as isize;
    let info = T::geev(jobvr, n, a.as_slice(), a.ld(), &mut wr, &mut wi, vr.as_mut_slice(), ldvr, &mut work, lwork);
    check_info(origin, "geev", info, no_convergence)?;
    Ok(GeneralEigen { wr, wi, vr })
}

fn complex_values<R: RealScalar>(wr: &[R], wi: &[R]) -> Vec<Complex<R>> {
    wr.iter().zip(wi).map(|(&re, &im)| Complex::new(re, im)).collect()
}

/// Fails when an eigenvalue has an imaginary part above
/// `eps * max(1, |lambda|) * n`.
fn require_real_spectrum<R: RealScalar>(origin: &'static str, wr: &[R], wi: &[R]) -> LinalgResult<()> {
    let n = R::from_usize(wr.len());
    let eps = R::epsilon();
    for (&re, &im) in wr.iter().zip(wi) {
        if im.abs() > eps * R::one().max(re.hypot(im)) * n {
            linalg_bail!(Value, origin, "eigenvalue {re} + {im}i is not real");
        }
    }
    Ok(())
}

/// General eigendecomposition `A v = lambda v`.
///
/// Eigenvalues are complex in general. For real input the conjugate pairs
/// the kernel returns as real and imaginary vector parts are reassembled,
/// so each column of `vectors` is a complex eigenvector. Vectors have unit
/// Euclidean norm.
pub fn eig<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<EigenDecomposition<Complex<T::Real>>>
where
    Complex<T::Real>: Scalar<Real = T::Real>,
{
    const ORIGIN: &str = "eig";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let GeneralEigen { wr, wi, vr } = run_geev(ORIGIN, a, Job::Full)?;
        let n = wr.len();
        let mut vectors = Matrix::<Complex<T::Real>>::zeros(n, n);
        let mut j = 0;
        while j < n {
            if !T::IS_COMPLEX && !wi[j].is_zero() && j + 1 < n {
                for i in 0..n {
                    let (re, im) = (vr[(i, j)].re(), vr[(i, j + 1)].re());
                    vectors[(i, j)] = Complex::new(re, im);
                    vectors[(i, j + 1)] = Complex::new(re, -im);
                }
                j += 2;
            } else {
                for i in 0..n {
                    vectors[(i, j)] = vr[(i, j)].to_complex();
                }
                j += 1;
            }
        }
        Ok(EigenDecomposition { values: complex_values(&wr, &wi), vectors })
    })
}

/// Eigenvalues of a general matrix, without vectors.
pub fn eigvals<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<Vec<Complex<T::Real>>> {
    const ORIGIN: &str = "eigvals";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let eigen = run_geev(ORIGIN, a, Job::NoVectors)?;
        Ok(complex_values(&eigen.wr, &eigen.wi))
    })
}

/// [`eig`] for matrices known to have a real spectrum.
///
/// # Errors
/// `ValueError` when some eigenvalue is not real.
pub fn eig_real<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<EigenDecomposition<T::Real, T>> {
    const ORIGIN: &str = "eig_real";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let GeneralEigen { wr, wi, mut vr } = run_geev(ORIGIN, a, Job::Full)?;
        require_real_spectrum(ORIGIN, &wr, &wi)?;
        let n = wr.len();
        if !T::IS_COMPLEX {
            // A tolerated pair keeps the real part of its vector in both columns.
            let mut j = 0;
            while j < n {
                if !wi[j].is_zero() && j + 1 < n {
                    for i in 0..n {
                        vr[(i, j + 1)] = vr[(i, j)];
                    }
                    j += 2;
                } else {
                    j += 1;
                }
            }
        }
        Ok(EigenDecomposition { values: wr, vectors: vr })
    })
}

/// Real eigenvalues of a general matrix; see [`eig_real`].
pub fn eigvals_real<T: Lapack>(a: MatrixRef<'_, T>) -> LinalgResult<Vec<T::Real>> {
    const ORIGIN: &str = "eigvals_real";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let GeneralEigen { wr, wi, .. } = run_geev(ORIGIN, a, Job::NoVectors)?;
        require_real_spectrum(ORIGIN, &wr, &wi)?;
        Ok(wr)
    })
}

fn run_heevd<T: Lapack>(origin: &'static str, jobz: Job, uplo: Uplo, mut a: MatrixMut<'_, T>) -> LinalgResult<Vec<T::Real>> {
    let n = require_square(origin, "a", a.rb())?;
    let lda = a.ld();
    let mut w = vec![T::Real::zero(); n];
    let mut work = query_workspace(origin, "heevd", |q| {
        T::heevd(jobz, uplo, n, a.as_mut_slice(), lda, &mut w, q, LWORK_QUERY)
    })?;
    let lwork = work.len() as isize;
    let info = T::heevd(jobz, uplo, n, a.as_mut_slice(), lda, &mut w, &mut work, lwork);
    check_info(origin, "heevd", info, no_convergence)?;
    Ok(w)
}

/// Symmetric/Hermitian eigendecomposition reading only the `uplo` triangle.
///
/// Eigenvalues are real and ascending; the eigenvectors are orthonormal.
///
/// ```
/// use numla::{eigh, Matrix, Uplo};
///
/// let a = Matrix::<f64>::from_rows(&[[2.0, 1.0], [1.0, 2.0]]);
/// let e = eigh(a.as_ref(), Uplo::Lower).unwrap();
/// assert!((e.values[0] - 1.0).abs() < 1e-12);
/// assert!((e.values[1] - 3.0).abs() < 1e-12);
/// ```
pub fn eigh<T: Lapack>(a: MatrixRef<'_, T>, uplo: Uplo) -> LinalgResult<EigenDecomposition<T::Real, T>> {
    const ORIGIN: &str = "eigh";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let mut vectors = a.to_owned();
        let values = run_heevd(ORIGIN, Job::Full, uplo, vectors.as_mut())?;
        Ok(EigenDecomposition { values, vectors })
    })
}

/// Ascending eigenvalues of a symmetric/Hermitian matrix.
pub fn eigvalsh<T: Lapack>(a: MatrixRef<'_, T>, uplo: Uplo) -> LinalgResult<Vec<T::Real>> {
    const ORIGIN: &str = "eigvalsh";
    dispatch::<T, _>(ORIGIN, a.shape(), || {
        let mut scratch = a.to_owned();
        run_heevd(ORIGIN, Job::NoVectors, uplo, scratch.as_mut())
    })
}

/// [`eigh`] writing the eigenvectors over `a`; returns the eigenvalues.
pub fn eigh_overwrite<T: Lapack>(a: MatrixMut<'_, T>, uplo: Uplo) -> LinalgResult<Vec<T::Real>> {
    const ORIGIN: &str = "eigh_overwrite";
    dispatch::<T, _>(ORIGIN, a.shape(), || run_heevd(ORIGIN, Job::Full, uplo, a))
}
