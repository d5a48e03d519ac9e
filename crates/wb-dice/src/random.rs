//! Cryptographically secure random draws.
//!
//! Every die face comes from a [`RandomSource`]. The production source reads
//! the operating system CSPRNG directly, so rolls cannot be predicted or
//! replayed from outside the process, and a failing entropy source surfaces
//! as an error instead of degrading to a weaker generator.

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{DiceError, DiceResult};

/// A source of uniformly distributed integers.
///
/// Implementations must be safe to share between concurrent sessions.
pub trait RandomSource: Send + Sync {
    /// Return an integer in `[0, n)`.
    fn uniform(&self, n: u32) -> DiceResult<u32>;
}

/// Random source backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl OsRandom {
    /// Create a handle to the OS entropy source.
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandom {
    fn uniform(&self, n: u32) -> DiceResult<u32> {
        if n == 0 {
            return Err(DiceError::EmptyRange);
        }
        // Reject the top partial block of u32 so every residue is equally likely.
        let zone = u32::MAX - u32::MAX % n;
        let mut rng = OsRng;
        loop {
            let value = rng
                .try_next_u32()
                .map_err(|e| DiceError::EntropyUnavailable(e.to_string()))?;
            if value < zone {
                return Ok(value % n);
            }
        }
    }
}

/// Roll a single die face in `[1, faces]`.
pub fn roll_face(source: &dyn RandomSource, faces: u32) -> DiceResult<u32> {
    Ok(source.uniform(faces)? + 1)
}
