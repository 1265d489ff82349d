//! Feed-forward carrier recovery
//!
//! Estimates the residual carrier frequency and phase of a complex baseband
//! signal and rotates it back to zero. Order 1 tracks a signal that carries a
//! pilot carrier. Order 2 squares the signal first, which strips the sign of
//! a real message on a suppressed carrier (DSB-SC).
//!
//! Frequency comes from two lagged autocorrelations of `y^q`: a lag-1 term
//! that is unambiguous over the whole range, refined by a lag-`L` term that
//! averages out the message spectrum. Phase comes from the mean of the
//! derotated `r^q`. Both estimates are running means until their gain hits a
//! floor, after which they become exponential averages.
//!
//! Order 2 leaves a 180 degree ambiguity. The first phase estimate is taken
//! in (-pi/2, pi/2] and later estimates stay on the same branch.

use super::nco::{Nco, wrap};
use crate::utils::consts::{CARRIER_FREQ_LAG, CARRIER_FREQ_MIN_GAIN, CARRIER_PHASE_MIN_GAIN};
use num_complex::Complex32;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct CarrierTracker {
    order: i32,
    lag: usize,
    /// Recent `y^q`, newest first
    history: VecDeque<Complex32>,
    coarse: Complex32,
    fine: Complex32,
    carrier: Complex32,
    phase: f32,
    nco: Nco,
    count: usize,
}

/// Running-mean gain for the `k`-th update, floored at `floor`.
fn gain(k: usize, floor: f32) -> f32 {
    (1.0 / k as f32).max(floor)
}

impl CarrierTracker {
    /// Tracker for a signal with a carrier component.
    pub fn with_carrier() -> Self {
        Self::new(1)
    }

    /// Tracker for a real message on a suppressed carrier.
    pub fn squaring() -> Self {
        Self::new(2)
    }

    fn new(order: i32) -> Self {
        Self {
            order,
            lag: CARRIER_FREQ_LAG,
            history: VecDeque::with_capacity(CARRIER_FREQ_LAG + 1),
            coarse: Complex32::new(0.0, 0.0),
            fine: Complex32::new(0.0, 0.0),
            carrier: Complex32::new(0.0, 0.0),
            phase: 0.0,
            nco: Nco::new(0.0),
            count: 0,
        }
    }

    /// Current frequency estimate in cycles/sample
    pub fn frequency(&self) -> f32 {
        self.nco.frequency()
    }

    /// Derotate one sample.
    pub fn process(&mut self, y: Complex32) -> Complex32 {
        let q = self.order as f32;
        let n = self.count;
        let s = y.powi(self.order);

        if let Some(&prev) = self.history.front() {
            let a = gain(n, CARRIER_FREQ_MIN_GAIN);
            self.coarse = self.coarse * (1.0 - a) + s * prev.conj() * a;
            let coarse_step = self.coarse.arg();
            let mut step = coarse_step;

            if let Some(&lagged) = self.history.get(self.lag - 1) {
                let a = gain(n + 1 - self.lag, CARRIER_FREQ_MIN_GAIN);
                self.fine = self.fine * (1.0 - a) + s * lagged.conj() * a;
                let lag = self.lag as f32;
                step = coarse_step + wrap(self.fine.arg() - lag * coarse_step) / lag;
            }

            self.nco.set_phase_step(step / q);
            self.nco.step();
        }

        self.history.push_front(s);
        self.history.truncate(self.lag);

        let r = self.nco.mix_down(y);
        let a = gain(n + 1, CARRIER_PHASE_MIN_GAIN);
        self.carrier = self.carrier * (1.0 - a) + r.powi(self.order) * a;

        let estimate = self.carrier.arg() / q;
        self.phase = if n == 0 {
            estimate
        } else {
            wrap(self.phase + wrap((estimate - self.phase) * q) / q)
        };

        self.count += 1;
        r * Complex32::from_polar(1.0, -self.phase)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.order);
    }
}
