pub mod config;
pub mod dsp;
pub mod error;
pub mod harness;
pub mod modem;
pub mod ui;
pub mod utils;

pub use error::{HarnessError, Result};
