use super::{AmModem, ModulationType};
use crate::dsp::{CarrierTracker, HilbertTransform, Nco};
use crate::error::{HarnessError, Result};
use crate::utils::consts::HILBERT_SEMI_LENGTH;
use num_complex::Complex32;
use std::fmt;
use tracing::{debug, info};

/// Analog amplitude modulator/demodulator.
///
/// Modulation scales the message by the modulation index, optionally adds a
/// unit carrier and mixes the result up to `carrier_freq`. Single-sideband
/// variants run the message through a Hilbert transformer first, which sets
/// the modem delay to the transformer's group delay.
///
/// Demodulation strategy depends on the variant:
///
/// | variant | carrier    | recovery                                      |
/// |---------|------------|-----------------------------------------------|
/// | DSB     | present    | envelope, `(abs(y) - 1) / m`                  |
/// | DSB     | suppressed | squaring carrier tracker, `re(v) / m`         |
/// | SSB     | present    | carrier tracker, `(re(v) - 1) / m`            |
/// | SSB     | suppressed | none, `re(v) / m`                             |
///
/// The squaring tracker cannot tell `x` from `-x`; the message comes back
/// with the right sign when the channel phase offset is inside
/// (-pi/2, pi/2].
pub struct AmpModem {
    mod_index: f32,
    carrier_freq: f32,
    kind: ModulationType,
    suppressed_carrier: bool,
    hilbert: Option<HilbertTransform>,
    mixer: Nco,
    tracker: Option<CarrierTracker>,
}

impl AmpModem {
    pub fn new(
        mod_index: f32,
        carrier_freq: f32,
        kind: ModulationType,
        suppressed_carrier: bool,
    ) -> Result<Self> {
        if !(mod_index > 0.0 && mod_index.is_finite()) {
            return Err(HarnessError::InvalidArgument(format!(
                "modulation index must be positive, got {mod_index}"
            )));
        }
        if !(carrier_freq.abs() < 0.5) {
            return Err(HarnessError::InvalidArgument(format!(
                "carrier frequency {carrier_freq} outside (-0.5, 0.5)"
            )));
        }

        let hilbert = kind
            .is_single_sideband()
            .then(|| HilbertTransform::new(HILBERT_SEMI_LENGTH));

        let tracker = match (kind.is_single_sideband(), suppressed_carrier) {
            (false, true) => Some(CarrierTracker::squaring()),
            (true, false) => Some(CarrierTracker::with_carrier()),
            _ => None,
        };

        debug!(
            "ampmodem created: type={} m={} fc={} suppressed={}",
            kind, mod_index, carrier_freq, suppressed_carrier
        );

        Ok(Self {
            mod_index,
            carrier_freq,
            kind,
            suppressed_carrier,
            hilbert,
            mixer: Nco::new(carrier_freq),
            tracker,
        })
    }

    /// Return the object to its freshly created state.
    pub fn reset(&mut self) {
        if let Some(hilbert) = self.hilbert.as_mut() {
            hilbert.reset();
        }
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.reset();
        }
        self.mixer.reset(self.carrier_freq);
    }

    fn carrier_level(&self) -> f32 {
        if self.suppressed_carrier { 0.0 } else { 1.0 }
    }
}

impl AmModem for AmpModem {
    fn modulate(&mut self, x: f32) -> Complex32 {
        let x_hat = match (self.kind, self.hilbert.as_mut()) {
            (ModulationType::Usb, Some(hilbert)) => hilbert.process_sample(x),
            // the conjugate keeps only negative frequencies
            (ModulationType::Lsb, Some(hilbert)) => hilbert.process_sample(x).conj(),
            _ => Complex32::new(x, 0.0),
        };

        let baseband = x_hat * self.mod_index + self.carrier_level();
        let y = self.mixer.mix_up(baseband);
        self.mixer.step();
        y
    }

    fn demodulate(&mut self, y: Complex32) -> f32 {
        let m = self.mod_index;

        let z = if self.kind == ModulationType::Dsb && !self.suppressed_carrier {
            (y.norm() - 1.0) / m
        } else {
            let mut v = self.mixer.mix_down(y);
            if let Some(tracker) = self.tracker.as_mut() {
                v = tracker.process(v);
            }
            (v.re - self.carrier_level()) / m
        };

        self.mixer.step();
        z
    }

    fn delay(&self) -> usize {
        self.hilbert
            .as_ref()
            .map_or(0, HilbertTransform::group_delay)
    }

    fn print(&self) {
        for line in self.to_string().lines() {
            info!("{}", line);
        }
    }
}

impl fmt::Display for AmpModem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ampmodem:")?;
        writeln!(f, "    mod. index  :   {:.4}", self.mod_index)?;
        writeln!(f, "    fc          :   {:.4}", self.carrier_freq)?;
        writeln!(f, "    type        :   {}", self.kind.description())?;
        writeln!(
            f,
            "    supp. carr. :   {}",
            if self.suppressed_carrier { "yes" } else { "no" }
        )?;
        write!(f, "    delay       :   {} samples", self.delay())
    }
}

impl Drop for AmpModem {
    fn drop(&mut self) {
        match &self.tracker {
            Some(tracker) => debug!(
                "ampmodem destroyed: type={} carrier offset={:.5}",
                self.kind,
                tracker.frequency()
            ),
            None => debug!("ampmodem destroyed: type={}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn message(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.6 * (0.07 * i as f32).sin() + 0.3 * (0.19 * i as f32).cos())
            .collect()
    }

    fn rotate(y: &[Complex32], cfo: f32, cpo: f32) -> Vec<Complex32> {
        y.iter()
            .enumerate()
            .map(|(i, &s)| s * Complex32::from_polar(1.0, 2.0 * PI * cfo * i as f32 + cpo))
            .collect()
    }

    fn pair(kind: ModulationType, suppressed: bool, fc: f32) -> (AmpModem, AmpModem) {
        (
            AmpModem::new(0.1, fc, kind, suppressed).unwrap(),
            AmpModem::new(0.1, fc, kind, suppressed).unwrap(),
        )
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(AmpModem::new(0.0, 0.0, ModulationType::Dsb, false).is_err());
        assert!(AmpModem::new(f32::NAN, 0.0, ModulationType::Dsb, false).is_err());
        assert!(AmpModem::new(0.1, 0.5, ModulationType::Usb, false).is_err());
    }

    #[test]
    fn test_delay_by_type() {
        let (dsb, _) = pair(ModulationType::Dsb, false, 0.0);
        let (usb, _) = pair(ModulationType::Usb, false, 0.0);
        let (lsb, _) = pair(ModulationType::Lsb, true, 0.0);
        assert_eq!(dsb.delay(), 0);
        assert_eq!(usb.delay(), 18);
        assert_eq!(lsb.delay(), 18);
    }

    #[test]
    fn test_dsb_modulation_adds_carrier() {
        let (mut with_carrier, _) = pair(ModulationType::Dsb, false, 0.0);
        let (mut suppressed, _) = pair(ModulationType::Dsb, true, 0.0);
        assert!((with_carrier.modulate(0.5) - Complex32::new(1.05, 0.0)).norm() < 1e-6);
        assert!((suppressed.modulate(0.5) - Complex32::new(0.05, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_dsb_envelope_ignores_phase_and_frequency_offset() {
        let (mut modulator, mut demodulator) = pair(ModulationType::Dsb, false, 0.0);
        let x = message(256);
        let rotated = rotate(&modulator.modulate_block(&x), 0.02, -PI / 4.0);
        let z = demodulator.demodulate_block(&rotated);

        for (a, b) in x.iter().zip(z.iter()) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn test_dsb_suppressed_tracks_offset_carrier() {
        for (cfo, cpo) in [(0.0, 0.0), (0.02, -PI / 4.0), (-0.03, 1.2)] {
            let (mut modulator, mut demodulator) = pair(ModulationType::Dsb, true, 0.0);
            let x = message(256);
            let y = rotate(&modulator.modulate_block(&x), cfo, cpo);
            let z = demodulator.demodulate_block(&y);
            for (i, (a, b)) in x.iter().zip(z.iter()).enumerate() {
                assert!((a - b).abs() < 1e-3, "cfo {cfo} cpo {cpo} sample {i}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_dsb_suppressed_sign_ambiguity() {
        let (mut modulator, mut demodulator) = pair(ModulationType::Dsb, true, 0.0);
        let x = message(256);
        let y = rotate(&modulator.modulate_block(&x), 0.02, 2.5);
        let z = demodulator.demodulate_block(&y);
        for (a, b) in x.iter().zip(z.iter()) {
            assert!((a + b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn test_ssb_with_carrier_recovers_message() {
        for kind in [ModulationType::Usb, ModulationType::Lsb] {
            for (cfo, cpo) in [(0.0, 0.0), (0.02, -PI / 4.0)] {
                let (mut modulator, mut demodulator) = pair(kind, false, 0.0);
                let delay = demodulator.delay();
                let x = message(256);
                let y = rotate(&modulator.modulate_block(&x), cfo, cpo);
                let z = demodulator.demodulate_block(&y);
                for i in delay..x.len() {
                    let err = (x[i - delay] - z[i]).abs();
                    assert!(err < 0.02, "{kind} cfo {cfo} sample {i}: error {err}");
                }
            }
        }
    }

    #[test]
    fn test_ssb_suppressed_recovers_delayed_message() {
        for kind in [ModulationType::Usb, ModulationType::Lsb] {
            let (mut modulator, mut demodulator) = pair(kind, true, 0.0);
            let delay = demodulator.delay();
            let x = message(256);
            let z = demodulator.demodulate_block(&modulator.modulate_block(&x));
            for i in delay..x.len() {
                assert!((x[i - delay] - z[i]).abs() < 1e-4, "{kind} sample {i}");
            }
        }
    }

    #[test]
    fn test_ssb_keeps_one_sideband() {
        let tone: Vec<f32> = (0..300).map(|i| (2.0 * PI * 0.1 * i as f32).cos()).collect();

        let (mut usb, _) = pair(ModulationType::Usb, true, 0.0);
        let y = usb.modulate_block(&tone);
        let step = (y[201] * y[200].conj()).arg();
        assert!((step - 2.0 * PI * 0.1).abs() < 0.05, "usb step {step}");

        let (mut lsb, _) = pair(ModulationType::Lsb, true, 0.0);
        let y = lsb.modulate_block(&tone);
        let step = (y[201] * y[200].conj()).arg();
        assert!((step + 2.0 * PI * 0.1).abs() < 0.05, "lsb step {step}");
    }

    #[test]
    fn test_carrier_frequency_round_trip() {
        let x = message(128);

        let (mut modulator, mut demodulator) = pair(ModulationType::Dsb, false, 0.125);
        let z = demodulator.demodulate_block(&modulator.modulate_block(&x));
        assert!(x.iter().zip(&z).all(|(a, b)| (a - b).abs() < 1e-4));

        let (mut modulator, mut demodulator) = pair(ModulationType::Usb, true, 0.125);
        let z = demodulator.demodulate_block(&modulator.modulate_block(&x));
        for i in 18..x.len() {
            assert!((x[i - 18] - z[i]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let (mut modem, _) = pair(ModulationType::Usb, false, 0.1);
        let first = modem.modulate(0.3);
        for _ in 0..10 {
            modem.modulate(0.9);
        }
        modem.reset();
        assert_eq!(modem.modulate(0.3), first);

        let y = rotate(&vec![Complex32::new(1.0, 0.2); 40], 0.01, 0.3);
        let (mut demodulator, _) = pair(ModulationType::Dsb, true, 0.0);
        let before = demodulator.demodulate_block(&y);
        demodulator.reset();
        assert_eq!(demodulator.demodulate_block(&y), before);
    }

    #[test]
    fn test_display_describes_configuration() {
        let (modem, _) = pair(ModulationType::Lsb, true, 0.0);
        let text = modem.to_string();
        assert!(text.contains("single side-band (lower)"));
        assert!(text.contains("supp. carr. :   yes"));
        assert!(text.contains("18 samples"));
    }
}
