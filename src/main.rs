use ammeter_rs::config::{RunConfig, SnrSweep};
use ammeter_rs::harness::{self, Harness, JsonSink, OctaveScriptSink, WavSink};
use ammeter_rs::modem::ModulationType;
use ammeter_rs::ui::{ProgressManager, print_banner, templates};
use ammeter_rs::utils::consts::*;
use ammeter_rs::utils::logging::init_logging;
use ammeter_rs::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Measure the RMS error of an amplitude modem over an impaired channel
#[derive(Parser, Debug)]
#[command(name = "ammeter", version, about)]
struct Cli {
    /// Carrier frequency offset [cycles/sample]
    #[arg(
        short = 'f',
        long,
        default_value_t = DEFAULT_FREQUENCY_OFFSET,
        allow_negative_numbers = true
    )]
    frequency_offset: f32,

    /// Carrier phase offset [radians]
    #[arg(
        short = 'p',
        long,
        default_value_t = DEFAULT_PHASE_OFFSET,
        allow_negative_numbers = true
    )]
    phase_offset: f32,

    /// Number of samples
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_SAMPLES)]
    num_samples: usize,

    /// Signal-to-noise ratio [dB]
    #[arg(
        short = 'S',
        long = "snr",
        default_value_t = DEFAULT_SNR_DB,
        allow_negative_numbers = true
    )]
    snr_db: f32,

    /// AM type: dsb, usb or lsb
    #[arg(short = 't', long = "type", default_value = "dsb")]
    modulation: ModulationType,

    /// Suppress the carrier
    #[arg(short = 's', long)]
    suppress_carrier: bool,

    /// Modulation index
    #[arg(short = 'm', long, default_value_t = DEFAULT_MOD_INDEX)]
    mod_index: f32,

    /// AM carrier frequency [cycles/sample]
    #[arg(long, default_value_t = DEFAULT_CARRIER_FREQ, allow_negative_numbers = true)]
    carrier_freq: f32,

    /// RNG seed; drawn from the OS when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Octave script output
    #[arg(short = 'o', long, default_value = OUTPUT_FILENAME)]
    output: PathBuf,

    /// Also write the run as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Also write original/recovered as a stereo WAV
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Sweep the SNR as start:stop:step [dB] instead of a single run
    #[arg(long, allow_hyphen_values = true)]
    sweep: Option<SnrSweep>,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            mod_index: self.mod_index,
            carrier_freq: self.carrier_freq,
            frequency_offset: self.frequency_offset,
            phase_offset: self.phase_offset,
            num_samples: self.num_samples,
            snr_db: self.snr_db,
            modulation: self.modulation,
            suppressed_carrier: self.suppress_carrier,
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    print_banner();

    if let Err(err) = run(&cli) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.run_config();
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("seed: {}", seed);

    if let Some(range) = &cli.sweep {
        return run_sweep(&config, range, seed);
    }

    let harness = Harness::new(config)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = harness.run(&mut rng)?;

    println!("rms error : {:12.8} dB", outcome.rmse_db);

    let mut octave = OctaveScriptSink::create(&cli.output)?;
    outcome.export(&mut octave)?;
    println!("results written to {}", cli.output.display());

    if let Some(path) = &cli.json {
        outcome.export(&mut JsonSink::create(path)?)?;
        info!("json written to {}", path.display());
    }
    if let Some(path) = &cli.wav {
        outcome.export(&mut WavSink::create(path)?)?;
        info!("wav written to {}", path.display());
    }
    Ok(())
}

/// The bar is cosmetic, so a failed update is logged and the sweep goes on.
fn log_progress(result: std::result::Result<(), String>) {
    if let Err(err) = result {
        debug!("progress bar: {}", err);
    }
}

fn run_sweep(config: &RunConfig, range: &SnrSweep, seed: u64) -> Result<()> {
    let snr_values = range.values()?;
    let progress = ProgressManager::new();
    progress
        .create_bar("sweep", snr_values.len() as u64, templates::SWEEP, "")
        .map_err(ammeter_rs::HarnessError::InvalidArgument)?;

    let points = harness::sweep(config, &snr_values, seed, |point| {
        log_progress(progress.set_message("sweep", &format!("{:.1} dB", point.snr_db)));
        log_progress(progress.inc("sweep", 1));
    })?;
    log_progress(progress.finish("sweep", "done"));
    progress.clear_all();

    println!("{:>10} {:>14}", "snr [dB]", "rms error [dB]");
    for point in &points {
        println!("{:>10.2} {:>14.8}", point.snr_db, point.rmse_db);
    }
    Ok(())
}
