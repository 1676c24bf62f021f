use thiserror::Error;

/// Failures raised by the orbital math kernel and the propagators built on it.
///
/// All variants are deterministic functions of their inputs; retrying with the same
/// arguments yields the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    /// Orbital elements or physical parameters outside the supported domain.
    #[error("invalid orbital input: {0}")]
    Domain(String),
    /// An iterative solver hit its iteration cap before meeting its tolerance.
    #[error("{solver} did not converge after {iterations} iterations (last step {last_step:e})")]
    Convergence {
        solver: &'static str,
        iterations: usize,
        last_step: f64,
    },
    /// The patched-conic triangle (primary, target, spacecraft) does not close.
    #[error("patched-conic geometry unreachable: {0}")]
    GeometryUnreachable(String),
}

impl OrbitError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        OrbitError::Domain(msg.into())
    }
}
