//! Sample reporters
//!
//! - [`StdoutReporter`] - print each sample (plain ratio or JSON line)
//! - [`StatsdReporter`] - forward the ratio as a DogStatsD gauge over UDP

pub mod statsd;
pub mod stdout;

pub use statsd::StatsdReporter;
pub use stdout::{OutputFormat, StdoutReporter};

use crate::domain::{ReportError, Sample};

/// Receives one sample per interval
pub trait Reporter {
    /// # Errors
    /// Returns an error if the sample could not be emitted
    fn report(&mut self, sample: &Sample) -> Result<(), ReportError>;
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, sample: &Sample) -> Result<(), ReportError> {
        (**self).report(sample)
    }
}
