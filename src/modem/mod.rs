//! Amplitude modem contract and the built-in implementation

pub mod ampmodem;

pub use ampmodem::AmpModem;

use crate::error::{HarnessError, Result};
use num_complex::Complex32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AM variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulationType {
    /// Double sideband
    Dsb,
    /// Upper single sideband
    Usb,
    /// Lower single sideband
    Lsb,
}

impl ModulationType {
    pub fn description(&self) -> &'static str {
        match self {
            ModulationType::Dsb => "double side-band",
            ModulationType::Usb => "single side-band (upper)",
            ModulationType::Lsb => "single side-band (lower)",
        }
    }

    pub fn is_single_sideband(&self) -> bool {
        !matches!(self, ModulationType::Dsb)
    }
}

impl FromStr for ModulationType {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dsb" => Ok(ModulationType::Dsb),
            "usb" => Ok(ModulationType::Usb),
            "lsb" => Ok(ModulationType::Lsb),
            other => Err(HarnessError::InvalidArgument(format!(
                "invalid AM type: {other}"
            ))),
        }
    }
}

impl fmt::Display for ModulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ModulationType::Dsb => "dsb",
            ModulationType::Usb => "usb",
            ModulationType::Lsb => "lsb",
        };
        f.write_str(token)
    }
}

/// Stateful sample-by-sample amplitude modem.
///
/// One instance is used as the modulator and a second, identically
/// configured instance as the demodulator. Resources are released on drop.
pub trait AmModem {
    /// Map one real message sample to one complex channel sample.
    fn modulate(&mut self, x: f32) -> Complex32;

    /// Recover one message sample from one complex channel sample.
    fn demodulate(&mut self, y: Complex32) -> f32;

    /// End-to-end delay, in samples, between a message sample entering
    /// `modulate` and its estimate leaving `demodulate`.
    fn delay(&self) -> usize;

    /// Log a description of the modem configuration. Silent by default.
    fn print(&self) {}

    fn modulate_block(&mut self, x: &[f32]) -> Vec<Complex32> {
        x.iter().map(|&s| self.modulate(s)).collect()
    }

    fn demodulate_block(&mut self, y: &[Complex32]) -> Vec<f32> {
        y.iter().map(|&s| self.demodulate(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modulation_type() {
        assert_eq!("dsb".parse::<ModulationType>().unwrap(), ModulationType::Dsb);
        assert_eq!("usb".parse::<ModulationType>().unwrap(), ModulationType::Usb);
        assert_eq!("lsb".parse::<ModulationType>().unwrap(), ModulationType::Lsb);
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        for token in ["foo", "DSB", "", "ssb"] {
            match token.parse::<ModulationType>() {
                Err(HarnessError::InvalidArgument(msg)) => assert!(msg.contains(token)),
                other => panic!("expected InvalidArgument for {token:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_default_print_is_silent() {
        struct Identity;
        impl AmModem for Identity {
            fn modulate(&mut self, x: f32) -> Complex32 {
                Complex32::new(x, 0.0)
            }
            fn demodulate(&mut self, y: Complex32) -> f32 {
                y.re
            }
            fn delay(&self) -> usize {
                0
            }
        }

        let mut modem = Identity;
        modem.print();
        let y = modem.modulate_block(&[0.5, -0.25]);
        assert_eq!(modem.demodulate_block(&y), [0.5, -0.25]);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in [ModulationType::Dsb, ModulationType::Usb, ModulationType::Lsb] {
            assert_eq!(kind.to_string().parse::<ModulationType>().unwrap(), kind);
        }
    }
}
