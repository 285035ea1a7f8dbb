//! Print samples to stdout

use clap::ValueEnum;
use std::io::{self, Write};

use super::Reporter;
use crate::domain::{ReportError, Sample};

/// Line format for printed samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Hit ratio only, e.g. `81.05`
    #[default]
    Plain,
    /// One JSON object per line with the full breakdown
    Json,
}

pub struct StdoutReporter<W: Write = io::Stdout> {
    out: W,
    format: OutputFormat,
}

impl StdoutReporter {
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self::with_writer(io::stdout(), format)
    }
}

impl<W: Write> StdoutReporter<W> {
    pub fn with_writer(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for StdoutReporter<W> {
    fn report(&mut self, sample: &Sample) -> Result<(), ReportError> {
        match self.format {
            OutputFormat::Plain => writeln!(self.out, "{:.2}", sample.hit_ratio)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, sample)?;
                self.out.write_all(b"\n")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratio::compute_ratio;

    #[test]
    fn test_plain_output() {
        let mut reporter = StdoutReporter::with_writer(Vec::new(), OutputFormat::Plain);
        reporter.report(&compute_ratio(20, 100, 5, 2)).unwrap();
        reporter.report(&compute_ratio(0, 0, 0, 0)).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "81.05\n0.00\n");
    }

    #[test]
    fn test_json_output() {
        let mut reporter = StdoutReporter::with_writer(Vec::new(), OutputFormat::Json);
        reporter.report(&compute_ratio(20, 100, 5, 2)).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(parsed["hits"], 77);
        assert_eq!(parsed["misses"], 18);
        assert_eq!(parsed["total"], 95);
        assert!((parsed["hit_ratio"].as_f64().unwrap() - 81.052_631).abs() < 1e-3);
    }
}
