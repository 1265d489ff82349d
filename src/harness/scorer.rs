//! Delay-compensated error scoring

use crate::error::{HarnessError, Result};

/// Root-mean-square error between `original[i - delay]` and `recovered[i]`
/// over `i` in `[delay, n)`.
pub fn rmse(original: &[f32], recovered: &[f32], delay: usize) -> Result<f32> {
    if original.len() != recovered.len() {
        return Err(HarnessError::LengthMismatch {
            expected: original.len(),
            actual: recovered.len(),
        });
    }
    let n = recovered.len();
    if delay >= n {
        return Err(HarnessError::InvalidDelay { delay, len: n });
    }

    let sum: f32 = original[..n - delay]
        .iter()
        .zip(&recovered[delay..])
        .map(|(x, z)| (x - z) * (x - z))
        .sum();
    Ok((sum / (n - delay) as f32).sqrt())
}

/// RMS error in dB, `10 log10(rmse)`. An exact match yields `-inf`.
pub fn score(original: &[f32], recovered: &[f32], delay: usize) -> Result<f32> {
    Ok(10.0 * rmse(original, recovered, delay)?.log10())
}
