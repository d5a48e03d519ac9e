//! Error types for the dice engine.

/// Errors that can occur while building or rolling a dice pool.
#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    /// The operating system entropy source could not be read.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// A uniform draw was requested over an empty range.
    #[error("cannot draw from an empty range")]
    EmptyRange,

    /// A die tag such as "d6" or "plot" was not recognised.
    #[error("unknown die: {0}")]
    UnknownDie(String),

    /// A pool notation such as "3d6 2plot" could not be parsed.
    #[error("invalid pool notation: {0}")]
    InvalidNotation(String),
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
