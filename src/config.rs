use crate::error::{HarnessError, Result};
use crate::modem::{AmpModem, ModulationType};
use crate::utils::consts::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parameters of one measurement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub mod_index: f32,          // modulation index
    pub carrier_freq: f32,       // AM carrier [cycles/sample]
    pub frequency_offset: f32,   // carrier frequency offset [cycles/sample]
    pub phase_offset: f32,       // carrier phase offset [radians]
    pub num_samples: usize,
    pub snr_db: f32,             // relative to unit amplitude
    pub modulation: ModulationType,
    pub suppressed_carrier: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mod_index: DEFAULT_MOD_INDEX,
            carrier_freq: DEFAULT_CARRIER_FREQ,
            frequency_offset: DEFAULT_FREQUENCY_OFFSET,
            phase_offset: DEFAULT_PHASE_OFFSET,
            num_samples: DEFAULT_NUM_SAMPLES,
            snr_db: DEFAULT_SNR_DB,
            modulation: ModulationType::Dsb,
            suppressed_carrier: false,
        }
    }
}

impl RunConfig {
    /// Channel parameters must be finite, except SNR which may be +inf
    /// (no noise). The sample count is checked by the scorer.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency_offset.is_finite() {
            return Err(HarnessError::InvalidArgument(format!(
                "frequency offset must be finite, got {}",
                self.frequency_offset
            )));
        }
        if !self.phase_offset.is_finite() {
            return Err(HarnessError::InvalidArgument(format!(
                "phase offset must be finite, got {}",
                self.phase_offset
            )));
        }
        if self.snr_db.is_nan() || self.snr_db == f32::NEG_INFINITY {
            return Err(HarnessError::InvalidArgument(format!(
                "SNR must be a number or +inf, got {}",
                self.snr_db
            )));
        }
        Ok(())
    }

    /// Create a modem configured for this run.
    pub fn build_modem(&self) -> Result<AmpModem> {
        AmpModem::new(
            self.mod_index,
            self.carrier_freq,
            self.modulation,
            self.suppressed_carrier,
        )
    }
}

/// SNR sweep given as `start:stop:step` (dB), stop inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct SnrSweep {
    pub start: f32,
    pub stop: f32,
    pub step: f32,
}

impl SnrSweep {
    /// Number of SNR points, at most `MAX_SWEEP_POINTS`.
    fn point_count(&self) -> Result<usize> {
        let intervals =
            ((self.stop as f64 - self.start as f64) / self.step as f64 + 1e-3).floor();
        if !(intervals >= 0.0 && intervals < MAX_SWEEP_POINTS as f64) {
            return Err(HarnessError::InvalidArgument(format!(
                "sweep {}:{}:{} exceeds {} points",
                self.start, self.stop, self.step, MAX_SWEEP_POINTS
            )));
        }
        Ok(intervals as usize + 1)
    }

    pub fn values(&self) -> Result<Vec<f32>> {
        let count = self.point_count()?;
        Ok((0..count)
            .map(|i| self.start + i as f32 * self.step)
            .collect())
    }
}

impl FromStr for SnrSweep {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, stop, step] = parts.as_slice() else {
            return Err(HarnessError::InvalidArgument(format!(
                "sweep must be start:stop:step, got {s}"
            )));
        };
        let parse = |v: &str| {
            v.trim().parse::<f32>().map_err(|err| {
                HarnessError::InvalidArgument(format!("sweep value {v:?}: {err}"))
            })
        };
        let sweep = SnrSweep {
            start: parse(*start)?,
            stop: parse(*stop)?,
            step: parse(*step)?,
        };

        let span = sweep.stop - sweep.start;
        if !(sweep.start.is_finite() && sweep.stop.is_finite() && sweep.step.is_finite())
            || sweep.step == 0.0
            || span * sweep.step < 0.0
        {
            return Err(HarnessError::InvalidArgument(format!(
                "sweep {s} does not reach its stop value"
            )));
        }
        sweep.point_count()?;
        Ok(sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.num_samples, 256);
        assert_eq!(config.snr_db, 20.0);
        assert_eq!(config.modulation, ModulationType::Dsb);
        assert!(!config.suppressed_carrier);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut config = RunConfig::default();
        config.phase_offset = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.snr_db = f32::INFINITY;
        assert!(config.validate().is_ok());
        config.snr_db = f32::NEG_INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = RunConfig {
            modulation: ModulationType::Lsb,
            suppressed_carrier: true,
            ..RunConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains("\"modulation\":\"lsb\""));
        let back: RunConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_sweep_values() {
        let sweep: SnrSweep = "0:30:10".parse().unwrap();
        assert_eq!(sweep.values().unwrap(), vec![0.0, 10.0, 20.0, 30.0]);

        let down: SnrSweep = "20:5:-5".parse().unwrap();
        assert_eq!(down.values().unwrap(), vec![20.0, 15.0, 10.0, 5.0]);

        let single: SnrSweep = "12:12:1".parse().unwrap();
        assert_eq!(single.values().unwrap(), vec![12.0]);
    }

    #[test]
    fn test_sweep_point_count_is_capped() {
        for spec in ["0:1e30:1e-30", "-3e38:3e38:1", "0:100:0.01"] {
            match spec.parse::<SnrSweep>() {
                Err(HarnessError::InvalidArgument(msg)) => assert!(msg.contains("points")),
                other => panic!("expected InvalidArgument for {spec}, got {other:?}"),
            }
        }

        let huge = SnrSweep {
            start: 0.0,
            stop: f32::MAX,
            step: f32::MIN_POSITIVE,
        };
        assert!(huge.values().is_err());

        let widest: SnrSweep = "0:999:1".parse().unwrap();
        assert_eq!(widest.values().unwrap().len(), MAX_SWEEP_POINTS);
    }

    #[test]
    fn test_sweep_rejects_bad_specs() {
        for spec in ["0:30", "a:b:c", "0:30:0", "0:30:-5", "0:30:10:1"] {
            assert!(spec.parse::<SnrSweep>().is_err(), "{spec}");
        }
    }
}
