//! Kernel thread configuration.
//!
//! The factorization kernels read one process-wide setting. Callers change
//! it once at startup; every routine picks it up on its next call. Until
//! then the kernels use the rayon pool with all cores.

use faer::Par;

/// Threads used inside factorization kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Run on the calling thread.
    Sequential,
    /// Run on the rayon pool with this many threads, `0` for all cores.
    Rayon(usize),
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Rayon(0)
    }
}

impl Parallelism {
    fn to_par(self) -> Par {
        match self {
            Parallelism::Sequential => Par::Seq,
            Parallelism::Rayon(n) => Par::rayon(n),
        }
    }
}

/// Sets the parallelism of all subsequent kernel calls.
pub fn set_parallelism(parallelism: Parallelism) {
    log::debug!("kernel parallelism set to {parallelism:?}");
    faer::set_global_parallelism(parallelism.to_par());
}

/// Current kernel parallelism.
pub fn parallelism() -> Parallelism {
    match faer::get_global_parallelism() {
        Par::Seq => Parallelism::Sequential,
        Par::Rayon(n) => Parallelism::Rayon(n.get()),
    }
}

#[inline]
pub(crate) fn par() -> Par {
    faer::get_global_parallelism()
}
