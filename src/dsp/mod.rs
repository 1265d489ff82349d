pub mod carrier;
pub mod ellip;
pub mod hilbert;
pub mod iir;
pub mod nco;

pub use carrier::CarrierTracker;
pub use hilbert::HilbertTransform;
pub use iir::{Biquad, SosFilter};
pub use nco::Nco;
