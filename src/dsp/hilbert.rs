//! Hilbert transform, real to analytic signal conversion
//!
//! The output real part is the input delayed by the filter group delay and
//! the imaginary part is the Hilbert-filtered input, so positive frequencies
//! survive and negative frequencies cancel.

use num_complex::Complex32;
use std::collections::VecDeque;
use std::f32::consts::PI;

/// Windowed (Hamming) FIR Hilbert transformer with `4m + 1` taps.
#[derive(Debug, Clone)]
pub struct HilbertTransform {
    /// Odd-distance taps only are non-zero
    taps: Vec<f32>,
    /// Newest sample first
    history: VecDeque<f32>,
    delay: usize,
}

impl HilbertTransform {
    /// `semi_length` m gives `4m + 1` taps and a group delay of `2m` samples.
    pub fn new(semi_length: usize) -> Self {
        let semi_length = semi_length.max(1);
        let num_taps = 4 * semi_length + 1;
        let delay = 2 * semi_length;

        let taps = (0..num_taps)
            .map(|i| {
                let n = i as i64 - delay as i64;
                if n % 2 == 0 {
                    0.0
                } else {
                    let h = 2.0 / (PI * n as f32);
                    let w = 0.54
                        - 0.46 * (2.0 * PI * i as f32 / (num_taps - 1) as f32).cos();
                    h * w
                }
            })
            .collect();

        Self {
            taps,
            history: VecDeque::from(vec![0.0; num_taps]),
            delay,
        }
    }

    pub fn process_sample(&mut self, x: f32) -> Complex32 {
        self.history.pop_back();
        self.history.push_front(x);

        let im: f32 = self
            .taps
            .iter()
            .zip(self.history.iter())
            .map(|(h, s)| h * s)
            .sum();
        Complex32::new(self.history[self.delay], im)
    }

    pub fn group_delay(&self) -> usize {
        self.delay
    }

    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|s| *s = 0.0);
    }
}
