//! IIR filters as cascaded second-order sections
//!
//! Each [`Biquad`] runs in Direct Form II Transposed; the cascade keeps the
//! pole sensitivity of high-order designs manageable.

use crate::dsp::ellip::{AnalogPrototype, ellip_prototype};
use crate::error::{HarnessError, Result};
use num_complex::Complex64;
use std::f64::consts::PI;

/// A single biquad (second-order section) filter.
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Numerator coefficients [b0, b1, b2]
    b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 is normalized to 1)
    a: [f64; 2],
    state: [f64; 2],
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self {
            b,
            a,
            state: [0.0; 2],
        }
    }

    /// Section with the given zero pair and pole pair. Roots are assumed to
    /// be conjugates of each other, or both real.
    pub fn from_roots(zeros: [Complex64; 2], poles: [Complex64; 2]) -> Self {
        let b1 = -(zeros[0] + zeros[1]).re;
        let b2 = (zeros[0] * zeros[1]).re;
        let a1 = -(poles[0] + poles[1]).re;
        let a2 = (poles[0] * poles[1]).re;
        Self::new([1.0, b1, b2], [a1, a2])
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.state[0];
        self.state[0] = self.b[1] * input - self.a[0] * output + self.state[1];
        self.state[1] = self.b[2] * input - self.a[1] * output;
        output
    }

    pub fn reset(&mut self) {
        self.state = [0.0; 2];
    }

    /// Stability triangle: |a2| < 1 and |a1| < 1 + a2
    pub fn is_stable(&self) -> bool {
        let [a1, a2] = self.a;
        a2.abs() < 1.0 && a1.abs() < 1.0 + a2
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let num = self.b[0] + z_inv * (self.b[1] + z_inv * self.b[2]);
        let den = 1.0 + z_inv * (self.a[0] + z_inv * self.a[1]);
        num / den
    }
}

/// Cascade of biquads with an overall gain.
#[derive(Debug, Clone)]
pub struct SosFilter {
    sections: Vec<Biquad>,
    gain: f64,
}

impl SosFilter {
    pub fn new(sections: Vec<Biquad>, gain: f64) -> Self {
        Self { sections, gain }
    }

    /// Design an elliptic low-pass filter.
    ///
    /// # Arguments
    /// * `order` - Filter order
    /// * `fc` - Passband edge, normalized to the sample rate (0 < fc < 0.5)
    /// * `ap_db` - Passband ripple in dB
    /// * `as_db` - Stopband attenuation in dB
    ///
    /// # Example
    /// ```rust,ignore
    /// let lpf = SosFilter::ellip_lowpass(5, 0.2, 1.0, 40.0)?;
    /// ```
    pub fn ellip_lowpass(order: usize, fc: f64, ap_db: f64, as_db: f64) -> Result<Self> {
        if order == 0 {
            return Err(HarnessError::InvalidArgument(
                "filter order must be at least 1".into(),
            ));
        }
        if !(fc > 0.0 && fc < 0.5) {
            return Err(HarnessError::InvalidArgument(format!(
                "filter cutoff {fc} outside (0, 0.5)"
            )));
        }
        if !(ap_db > 0.0 && as_db > ap_db) {
            return Err(HarnessError::InvalidArgument(format!(
                "ripple {ap_db} dB / attenuation {as_db} dB out of range"
            )));
        }

        let ep = (10f64.powf(ap_db / 10.0) - 1.0).sqrt();
        let es = (10f64.powf(as_db / 10.0) - 1.0).sqrt();
        let prototype = ellip_prototype(order, ep, es);

        let mut filter = Self::from_prototype(&prototype, order, fc);
        if !filter.is_stable() {
            return Err(HarnessError::InvalidArgument(format!(
                "elliptic design order={order} fc={fc} has poles outside the unit circle"
            )));
        }

        // odd orders peak at DC, even orders sit in a ripple trough
        let target = if order % 2 == 1 {
            1.0
        } else {
            1.0 / (1.0 + ep * ep).sqrt()
        };
        let dc = filter.frequency_response(0.0).norm();
        filter.gain *= target / dc;

        tracing::debug!(
            "elliptic low-pass: order={} fc={} Ap={}dB As={}dB, {} sections, {:.2}dB at fc",
            order,
            fc,
            ap_db,
            as_db,
            filter.sections.len(),
            filter.magnitude_response_db(fc)
        );
        Ok(filter)
    }

    /// Bilinear transform with pre-warping so the analog 1 rad/s edge lands
    /// on `fc`. Analog zeros at infinity map to z = -1.
    fn from_prototype(prototype: &AnalogPrototype, order: usize, fc: f64) -> Self {
        let warp = (PI * fc).tan();
        let bilinear = |r: Complex64| (1.0 + r * warp) / (1.0 - r * warp);
        let nyquist = Complex64::new(-1.0, 0.0);

        let zeros: Vec<Complex64> = prototype
            .zeros
            .iter()
            .map(|&z| bilinear(z))
            .collect();
        let poles: Vec<Complex64> = prototype
            .poles
            .iter()
            .map(|&p| bilinear(p))
            .collect();

        let mut sections = Vec::with_capacity(order.div_ceil(2));
        let pairs = order / 2;
        for i in 0..pairs {
            let zero_pair = match (zeros.get(2 * i), zeros.get(2 * i + 1)) {
                (Some(&z0), Some(&z1)) => [z0, z1],
                _ => [nyquist, nyquist],
            };
            sections.push(Biquad::from_roots(
                zero_pair,
                [poles[2 * i], poles[2 * i + 1]],
            ));
        }
        if order % 2 == 1 {
            let p = poles[order - 1].re;
            sections.push(Biquad::new([1.0, 1.0, 0.0], [-p, 0.0]));
        }

        Self::new(sections, prototype.gain)
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let mut y = input * self.gain;
        for section in &mut self.sections {
            y = section.process(y);
        }
        y
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(Biquad::is_stable)
    }

    /// Complex response at `freq` cycles/sample.
    pub fn frequency_response(&self, freq: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -2.0 * PI * freq);
        self.sections
            .iter()
            .fold(Complex64::new(self.gain, 0.0), |acc, s| acc * s.response(z_inv))
    }

    pub fn magnitude_response_db(&self, freq: f64) -> f64 {
        20.0 * self.frequency_response(freq).norm().log10()
    }
}
