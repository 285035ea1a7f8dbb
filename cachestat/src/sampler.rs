//! Periodic sampling loop
//!
//! Each cycle waits one interval, drains the counters, derives a sample and
//! hands it to the reporter. The interval is measured from the end of one
//! wait to the start of the next, so drain/compute/report latency adds a
//! small drift per cycle over long runs.
//!
//! Shutdown is observed during the wait. A cancelled interval is discarded:
//! its counts are never drained or reported.

use log::{debug, info};
use std::future::Future;
use std::time::Duration;

use crate::counters::CounterSource;
use crate::domain::SamplerError;
use crate::ratio::sample_from_table;
use crate::report::Reporter;

pub struct Sampler<S, R> {
    interval: Duration,
    source: S,
    reporter: R,
    samples: u64,
}

impl<S: CounterSource, R: Reporter> Sampler<S, R> {
    pub fn new(interval: Duration, source: S, reporter: R) -> Self {
        Self { interval, source, reporter, samples: 0 }
    }

    /// Number of samples reported so far
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Sample until `shutdown` resolves
    ///
    /// # Errors
    /// Returns the first counter read or report failure; the loop does not
    /// continue past it.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), SamplerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Sampling every {}s", self.interval.as_secs_f64());

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Sampler stopped after {} samples", self.samples);
                    return Ok(());
                }
                () = tokio::time::sleep(self.interval) => {}
            }

            self.tick()?;
        }
    }

    /// Drain, compute and report one sample
    fn tick(&mut self) -> Result<(), SamplerError> {
        let table = self.source.snapshot_and_clear()?;
        let sample = sample_from_table(&table);
        debug!(
            "{table} => total={} hits={} misses={} ratio={:.2}",
            sample.total, sample.hits, sample.misses, sample.hit_ratio
        );

        self.reporter.report(&sample)?;
        self.samples += 1;
        Ok(())
    }

    pub fn into_parts(self) -> (S, R) {
        (self.source, self.reporter)
    }
}
