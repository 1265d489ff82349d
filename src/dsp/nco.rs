//! Numerically controlled oscillator
//!
//! Phase-continuous carrier used to mix signals up and down. The phase step
//! can be retuned between samples, which is how [`super::CarrierTracker`]
//! follows a received carrier.

use num_complex::Complex32;
use std::f32::consts::PI;

#[derive(Debug, Clone)]
pub struct Nco {
    /// Phase in radians, kept in [-pi, pi)
    phase: f32,
    /// Phase increment in radians/sample
    phase_inc: f32,
}

impl Nco {
    /// Create a new NCO at `freq` cycles/sample.
    pub fn new(freq: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 2.0 * PI * freq,
        }
    }

    /// Frequency in cycles/sample
    pub fn frequency(&self) -> f32 {
        self.phase_inc / (2.0 * PI)
    }

    /// Retune to `step` radians/sample, keeping the current phase.
    pub fn set_phase_step(&mut self, step: f32) {
        self.phase_inc = step;
    }

    pub fn mix_up(&self, x: Complex32) -> Complex32 {
        x * Complex32::from_polar(1.0, self.phase)
    }

    pub fn mix_down(&self, x: Complex32) -> Complex32 {
        x * Complex32::from_polar(1.0, -self.phase)
    }

    /// Advance one sample.
    pub fn step(&mut self) {
        self.phase = wrap(self.phase + self.phase_inc);
    }

    pub fn reset(&mut self, freq: f32) {
        self.phase = 0.0;
        self.phase_inc = 2.0 * PI * freq;
    }
}

/// Wrap an angle into [-pi, pi).
pub(crate) fn wrap(phase: f32) -> f32 {
    (phase + PI).rem_euclid(2.0 * PI) - PI
}
