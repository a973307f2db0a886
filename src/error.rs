use thiserror::Error;

/// Errors surfaced by the engine
///
/// Per-tick problems (unavailable sources, failed actuation) are absorbed
/// and logged. Only construction errors reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine was created without something to drive
    #[error("target identity is missing")]
    MissingTargetIdentity,
    /// The target identity does not fit its fixed-size storage
    #[error("target identity is longer than {0} bytes")]
    TargetIdentityTooLong(usize),
}
