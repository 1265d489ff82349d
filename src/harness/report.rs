//! Report sinks for a finished run
//!
//! A sink is fed the run summary once, then one `(index, original, impaired,
//! recovered)` tuple per sample, then `finish`.

use crate::config::RunConfig;
use crate::error::Result;
use crate::utils::consts::PLOT_NFFT;
use num_complex::Complex32;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

/// Nominal rate written into WAV headers; the samples are unitless.
pub const WAV_SAMPLE_RATE: u32 = 8000;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub num_samples: usize,
    pub delay: usize,
    pub rmse_db: f32,
    pub config: RunConfig,
}

pub trait ReportSink {
    fn begin(&mut self, summary: &RunSummary) -> Result<()>;

    fn record(
        &mut self,
        index: usize,
        original: f32,
        impaired: Complex32,
        recovered: f32,
    ) -> Result<()>;

    fn finish(&mut self) -> Result<()>;
}

/// Format like C's `%.<precision>e`: signed exponent, at least two digits.
fn c_exp(value: f32, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let text = format!("{value:.precision$e}");
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => text,
    }
}

/// Octave/MATLAB script with the three sequences and a plot of the
/// time-aligned signals and the channel spectrum.
pub struct OctaveScriptSink<W: Write> {
    writer: W,
    name: String,
}

impl OctaveScriptSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(BufWriter::new(File::create(path)?), name))
    }
}

impl<W: Write> OctaveScriptSink<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for OctaveScriptSink<W> {
    fn begin(&mut self, summary: &RunSummary) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w, "% {} : auto-generated file", self.name)?;
        writeln!(w, "clear all")?;
        writeln!(w, "close all")?;
        writeln!(w, "n={};", summary.num_samples)?;
        writeln!(w, "delay={};", summary.delay)?;
        Ok(())
    }

    fn record(
        &mut self,
        index: usize,
        original: f32,
        impaired: Complex32,
        recovered: f32,
    ) -> Result<()> {
        let w = &mut self.writer;
        let i = index + 1;
        writeln!(w, "x({:3}) = {:>12};", i, c_exp(original, 4))?;
        writeln!(
            w,
            "y({:3}) = {:>12} + j*{:>12};",
            i,
            c_exp(impaired.re, 4),
            c_exp(impaired.im, 4)
        )?;
        writeln!(w, "z({:3}) = {:>12};", i, c_exp(recovered, 4))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w, "t=0:(n-1);")?;
        writeln!(w, "figure('position',[100 100 800 600]);")?;
        writeln!(w, "subplot(2,1,1);")?;
        writeln!(w, "  plot(t,x,t-delay,z);")?;
        writeln!(w, "  axis([-delay n -1.2 1.2]);")?;
        writeln!(w, "  xlabel('time');")?;
        writeln!(w, "  ylabel('signal');")?;
        writeln!(w, "  legend('original','demodulated');")?;
        writeln!(w, "  grid on;")?;
        // spectrum
        writeln!(w, "subplot(2,1,2);")?;
        writeln!(w, "  nfft={};", PLOT_NFFT)?;
        writeln!(w, "  f=[0:(nfft-1)]/nfft - 0.5;")?;
        writeln!(w, "  Y = 20*log10(abs(fftshift(fft(y,nfft))));")?;
        writeln!(w, "  Y = Y - max(Y);")?;
        writeln!(w, "  plot(f,Y);")?;
        writeln!(w, "  axis([-0.5 0.5 -60 10]);")?;
        writeln!(w, "  grid on;")?;
        w.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
struct JsonReport {
    summary: Option<RunSummary>,
    original: Vec<f32>,
    impaired: Vec<[f32; 2]>,
    recovered: Vec<f32>,
}

/// Whole run as one JSON document, written on `finish`.
pub struct JsonSink<W: Write> {
    writer: W,
    report: JsonReport,
}

impl JsonSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            report: JsonReport::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn begin(&mut self, summary: &RunSummary) -> Result<()> {
        self.report = JsonReport {
            summary: Some(summary.clone()),
            original: Vec::with_capacity(summary.num_samples),
            impaired: Vec::with_capacity(summary.num_samples),
            recovered: Vec::with_capacity(summary.num_samples),
        };
        Ok(())
    }

    fn record(
        &mut self,
        _index: usize,
        original: f32,
        impaired: Complex32,
        recovered: f32,
    ) -> Result<()> {
        self.report.original.push(original);
        self.report.impaired.push([impaired.re, impaired.im]);
        self.report.recovered.push(recovered);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.report)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Stereo 16-bit WAV: original on the left, recovered on the right.
pub struct WavSink<W: Write + Seek> {
    writer: Option<hound::WavWriter<W>>,
}

impl WavSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write + Seek> WavSink<W> {
    pub fn new(writer: W) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: WAV_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        Ok(Self {
            writer: Some(hound::WavWriter::new(writer, spec)?),
        })
    }

    fn to_pcm(sample: f32) -> i16 {
        (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
    }
}

impl<W: Write + Seek> ReportSink for WavSink<W> {
    fn begin(&mut self, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }

    fn record(
        &mut self,
        _index: usize,
        original: f32,
        _impaired: Complex32,
        recovered: f32,
    ) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_sample(Self::to_pcm(original))?;
            writer.write_sample(Self::to_pcm(recovered))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}
