use std::f32::consts::PI;

/// 日志级别（可被 RUST_LOG 覆盖）
pub const LOG_LEVEL: &str = "info";

/// Default report file name
pub const OUTPUT_FILENAME: &str = "ampmodem_example.m";

// ============================================================================
// Run Parameters
// ============================================================================

/// Modulation index (scales the message before the carrier is added)
pub const DEFAULT_MOD_INDEX: f32 = 0.1;

/// Carrier frequency (cycles/sample), 0 keeps the signal at baseband
pub const DEFAULT_CARRIER_FREQ: f32 = 0.0;

/// Carrier frequency offset (cycles/sample)
pub const DEFAULT_FREQUENCY_OFFSET: f32 = 0.02;

/// Carrier phase offset (radians)
pub const DEFAULT_PHASE_OFFSET: f32 = -PI / 4.0;

/// Number of samples per run
pub const DEFAULT_NUM_SAMPLES: usize = 256;

/// Signal-to-noise ratio (dB), relative to unit amplitude
pub const DEFAULT_SNR_DB: f32 = 20.0;

/// Upper bound on the number of points in one SNR sweep
pub const MAX_SWEEP_POINTS: usize = 1000;

// ============================================================================
// Audio Source Filter
// ============================================================================

pub const AUDIO_FILTER_ORDER: usize = 5;

/// Cutoff, normalized to the sample rate (Nyquist = 0.5)
pub const AUDIO_FILTER_CUTOFF: f64 = 0.2;

/// Passband ripple (dB)
pub const AUDIO_FILTER_RIPPLE_DB: f64 = 1.0;

/// Stopband attenuation (dB)
pub const AUDIO_FILTER_ATTENUATION_DB: f64 = 40.0;

// ============================================================================
// Modem Parameters
// ============================================================================

/// Hilbert transformer semi-length; the real branch is delayed by 2x this
pub const HILBERT_SEMI_LENGTH: usize = 9;

/// Delay of the single-sideband path in samples
pub const SSB_DELAY: usize = 2 * HILBERT_SEMI_LENGTH;

/// Lag of the fine frequency estimator (samples)
pub const CARRIER_FREQ_LAG: usize = 16;

/// Floor of the frequency-estimator averaging gain
pub const CARRIER_FREQ_MIN_GAIN: f32 = 0.005;

/// Floor of the phase-estimator averaging gain
pub const CARRIER_PHASE_MIN_GAIN: f32 = 0.01;

/// Spectrum FFT size used by the plotting script
pub const PLOT_NFFT: usize = 1024;
