//! Measurement pipeline: generate, modulate, impair, demodulate, score.

pub mod channel;
pub mod report;
pub mod scorer;
pub mod source;

pub use channel::ChannelModel;
pub use report::{JsonSink, OctaveScriptSink, ReportSink, RunSummary, WavSink};
pub use source::SignalSource;

use crate::config::RunConfig;
use crate::error::Result;
use crate::modem::AmModem;
use num_complex::Complex32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

/// One configured measurement.
#[derive(Debug, Clone)]
pub struct Harness {
    config: RunConfig,
    source: SignalSource,
    channel: ChannelModel,
}

/// Everything a run produced. `recovered[i]` estimates `original[i - delay]`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub config: RunConfig,
    pub original: Vec<f32>,
    pub impaired: Vec<Complex32>,
    pub recovered: Vec<f32>,
    pub delay: usize,
    pub rmse_db: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub snr_db: f32,
    pub rmse_db: f32,
}

impl Harness {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let channel = ChannelModel::new(
            config.frequency_offset,
            config.phase_offset,
            config.snr_db,
        );
        Ok(Self {
            config,
            source: SignalSource::default(),
            channel,
        })
    }

    /// Run with two freshly built [`crate::modem::AmpModem`] instances.
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<RunOutcome> {
        let modulator = self.config.build_modem()?;
        let demodulator = self.config.build_modem()?;
        self.run_with(modulator, demodulator, rng)
    }

    /// Run with caller-supplied modems. The modulator describes itself through
    /// [`AmModem::print`]; both are consumed and dropped before the outcome is
    /// returned.
    pub fn run_with<M, D, R>(
        &self,
        mut modulator: M,
        mut demodulator: D,
        rng: &mut R,
    ) -> Result<RunOutcome>
    where
        M: AmModem,
        D: AmModem,
        R: Rng,
    {
        let n = self.config.num_samples;
        modulator.print();

        let original = self.source.generate(n, rng)?;
        let mut impaired = modulator.modulate_block(&original);
        self.channel.impair(&mut impaired, rng);
        let recovered = demodulator.demodulate_block(&impaired);
        let delay = demodulator.delay();

        drop(modulator);
        drop(demodulator);

        let rmse_db = scorer::score(&original, &recovered, delay)?;
        debug!(
            "run: n={} delay={} snr={}dB cfo={} cpo={}",
            n,
            delay,
            self.channel.snr_db,
            self.channel.frequency_offset,
            self.channel.phase_offset
        );
        info!("rms error: {:.4} dB", rmse_db);

        Ok(RunOutcome {
            config: self.config.clone(),
            original,
            impaired,
            recovered,
            delay,
            rmse_db,
        })
    }
}

impl RunOutcome {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            num_samples: self.original.len(),
            delay: self.delay,
            rmse_db: self.rmse_db,
            config: self.config.clone(),
        }
    }

    /// Stream the run through a report sink.
    pub fn export(&self, sink: &mut dyn ReportSink) -> Result<()> {
        sink.begin(&self.summary())?;
        for (i, ((&x, &y), &z)) in self
            .original
            .iter()
            .zip(&self.impaired)
            .zip(&self.recovered)
            .enumerate()
        {
            sink.record(i, x, y, z)?;
        }
        sink.finish()
    }
}

/// Run `config` once per SNR value. Every point starts from the same seed so
/// only the noise level differs between them.
pub fn sweep<F>(
    config: &RunConfig,
    snr_values: &[f32],
    seed: u64,
    mut on_point: F,
) -> Result<Vec<SweepPoint>>
where
    F: FnMut(&SweepPoint),
{
    let mut points = Vec::with_capacity(snr_values.len());
    for &snr_db in snr_values {
        let harness = Harness::new(RunConfig {
            snr_db,
            ..config.clone()
        })?;
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = harness.run_with(
            harness.config.build_modem()?,
            harness.config.build_modem()?,
            &mut rng,
        )?;

        let point = SweepPoint {
            snr_db,
            rmse_db: outcome.rmse_db,
        };
        on_point(&point);
        points.push(point);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modem::ModulationType;

    fn clean_config() -> RunConfig {
        RunConfig {
            frequency_offset: 0.0,
            phase_offset: 0.0,
            snr_db: 120.0,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_harness_rejects_invalid_config() {
        let config = RunConfig {
            frequency_offset: f32::INFINITY,
            ..RunConfig::default()
        };
        assert!(Harness::new(config).is_err());
    }

    #[test]
    fn test_run_outcome_shapes() {
        let harness = Harness::new(clean_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = harness.run(&mut rng).unwrap();

        assert_eq!(outcome.original.len(), 256);
        assert_eq!(outcome.impaired.len(), 256);
        assert_eq!(outcome.recovered.len(), 256);
        assert_eq!(outcome.delay, 0);
        assert!(outcome.rmse_db < -40.0, "rmse {}", outcome.rmse_db);
    }

    #[test]
    fn test_run_with_prints_modulator() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct Recorder {
            printed: Rc<Cell<usize>>,
        }
        impl AmModem for Recorder {
            fn modulate(&mut self, x: f32) -> Complex32 {
                Complex32::new(x, 0.0)
            }
            fn demodulate(&mut self, y: Complex32) -> f32 {
                y.re
            }
            fn delay(&self) -> usize {
                0
            }
            fn print(&self) {
                self.printed.set(self.printed.get() + 1);
            }
        }

        let modulator_prints = Rc::new(Cell::new(0));
        let demodulator_prints = Rc::new(Cell::new(0));
        let harness = Harness::new(clean_config()).unwrap();
        harness
            .run_with(
                Recorder {
                    printed: modulator_prints.clone(),
                },
                Recorder {
                    printed: demodulator_prints.clone(),
                },
                &mut StdRng::seed_from_u64(5),
            )
            .unwrap();
        assert_eq!(modulator_prints.get(), 1);
        assert_eq!(demodulator_prints.get(), 0);
    }

    #[test]
    fn test_export_visits_every_sample() {
        struct Counter {
            begun: bool,
            records: usize,
            finished: bool,
        }
        impl ReportSink for Counter {
            fn begin(&mut self, summary: &RunSummary) -> Result<()> {
                assert_eq!(summary.num_samples, 64);
                self.begun = true;
                Ok(())
            }
            fn record(
                &mut self,
                index: usize,
                _: f32,
                _: Complex32,
                _: f32,
            ) -> Result<()> {
                assert_eq!(index, self.records);
                self.records += 1;
                Ok(())
            }
            fn finish(&mut self) -> Result<()> {
                self.finished = true;
                Ok(())
            }
        }

        let config = RunConfig {
            num_samples: 64,
            ..clean_config()
        };
        let outcome = Harness::new(config)
            .unwrap()
            .run(&mut StdRng::seed_from_u64(1))
            .unwrap();
        let mut counter = Counter {
            begun: false,
            records: 0,
            finished: false,
        };
        outcome.export(&mut counter).unwrap();
        assert!(counter.begun && counter.finished);
        assert_eq!(counter.records, 64);
    }

    #[test]
    fn test_sweep_error_falls_with_snr() {
        let config = RunConfig {
            modulation: ModulationType::Dsb,
            ..RunConfig::default()
        };
        let mut seen = 0;
        let points = sweep(&config, &[0.0, 20.0, 40.0], 42, |_| seen += 1).unwrap();

        assert_eq!(seen, 3);
        assert_eq!(points.len(), 3);
        assert!(points[0].rmse_db > points[1].rmse_db);
        assert!(points[1].rmse_db > points[2].rmse_db);
    }

    #[test]
    fn test_sweep_is_reproducible() {
        let config = RunConfig::default();
        let a = sweep(&config, &[10.0], 3, |_| {}).unwrap();
        let b = sweep(&config, &[10.0], 3, |_| {}).unwrap();
        assert_eq!(a, b);
    }
}
