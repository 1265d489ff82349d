//! Carrier offset and additive noise channel

use num_complex::Complex32;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;
use std::f64::consts::PI;

/// Deterministic carrier rotation followed by complex AWGN.
///
/// Noise is scaled against unit amplitude, not the measured signal power:
/// `nstd = 10^(-snr_db / 20)`, split evenly over I and Q.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelModel {
    /// Carrier frequency offset [cycles/sample]
    pub frequency_offset: f32,
    /// Carrier phase offset [radians]
    pub phase_offset: f32,
    pub snr_db: f32,
}

impl ChannelModel {
    pub fn new(frequency_offset: f32, phase_offset: f32, snr_db: f32) -> Self {
        Self {
            frequency_offset,
            phase_offset,
            snr_db,
        }
    }

    pub fn noise_std(&self) -> f32 {
        10f32.powf(-self.snr_db / 20.0)
    }

    /// Rotation applied to sample `index`.
    pub fn rotation(&self, index: usize) -> Complex32 {
        let phase = 2.0 * PI * self.frequency_offset as f64 * index as f64
            + self.phase_offset as f64;
        Complex32::from_polar(1.0, phase as f32)
    }

    /// Impair `buffer` in place. Two normal variates are drawn per sample
    /// regardless of the SNR, so the random stream does not depend on it.
    pub fn impair<R: Rng>(&self, buffer: &mut [Complex32], rng: &mut R) {
        let nstd = self.noise_std();
        for (i, y) in buffer.iter_mut().enumerate() {
            *y *= self.rotation(i);

            let n_re: f32 = StandardNormal.sample(rng);
            let n_im: f32 = StandardNormal.sample(rng);
            *y += Complex32::new(n_re, n_im) * (nstd * FRAC_1_SQRT_2);
        }
    }
}
