//! Band-limited pseudo-random "audio" source

use crate::dsp::SosFilter;
use crate::error::Result;
use crate::utils::consts::*;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// White Gaussian noise, low-pass filtered and soft-clipped into (-1, 1).
#[derive(Debug, Clone)]
pub struct SignalSource {
    pub order: usize,
    pub cutoff: f64,
    pub ripple_db: f64,
    pub attenuation_db: f64,
}

impl Default for SignalSource {
    fn default() -> Self {
        Self {
            order: AUDIO_FILTER_ORDER,
            cutoff: AUDIO_FILTER_CUTOFF,
            ripple_db: AUDIO_FILTER_RIPPLE_DB,
            attenuation_db: AUDIO_FILTER_ATTENUATION_DB,
        }
    }
}

impl SignalSource {
    /// Draw `n` samples. The filter is built per call, so no state carries
    /// over between calls; one normal variate is consumed per sample.
    pub fn generate<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Vec<f32>> {
        let mut filter = SosFilter::ellip_lowpass(
            self.order,
            self.cutoff,
            self.ripple_db,
            self.attenuation_db,
        )?;

        let signal = (0..n)
            .map(|_| {
                let w: f32 = StandardNormal.sample(rng);
                // clip
                (filter.process(w as f64) as f32).tanh()
            })
            .collect();
        Ok(signal)
    }
}
