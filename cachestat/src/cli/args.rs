//! CLI argument definitions

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::ExecutionMode;
use crate::lifecycle::DEFAULT_PID_FILE;
use crate::report::statsd::{DEFAULT_METRIC_NAME, DEFAULT_STATSD_HOST, DEFAULT_STATSD_PORT};
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "cachestat",
    version,
    about = "Continuously report the page-cache hit ratio using eBPF",
    after_help = "\
EXAMPLES:
    sudo cachestat                                   Print the hit ratio every 5s
    sudo cachestat --interval-seconds 1 --format json
    sudo cachestat --daemon --send-metrics --log-file /var/log/cachestat.log"
)]
pub struct Args {
    /// Seconds between samples
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_seconds: u64,

    /// Detach from the terminal and run in the background
    #[arg(long)]
    pub daemon: bool,

    /// Forward each sample to a DogStatsD collector instead of printing it
    #[arg(long, visible_alias = "send-metrics-to-dogstatsd")]
    pub send_metrics: bool,

    /// Collector host for --send-metrics
    #[arg(long, default_value = DEFAULT_STATSD_HOST)]
    pub statsd_host: String,

    /// Collector port for --send-metrics
    #[arg(long, default_value_t = DEFAULT_STATSD_PORT)]
    pub statsd_port: u16,

    /// Gauge name for --send-metrics
    #[arg(long, default_value = DEFAULT_METRIC_NAME)]
    pub metric_name: String,

    /// Output format for printed samples
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// PID file locked while running as a daemon
    #[arg(long, value_name = "FILE", default_value = DEFAULT_PID_FILE)]
    pub pid_file: PathBuf,

    /// Log verbosity (RUST_LOG overrides per module)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        if self.daemon {
            ExecutionMode::Daemon
        } else {
            ExecutionMode::Foreground
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["cachestat"]).unwrap();
        assert_eq!(args.interval(), Duration::from_secs(5));
        assert_eq!(args.mode(), ExecutionMode::Foreground);
        assert!(!args.send_metrics);
        assert_eq!(args.statsd_port, 8125);
        assert_eq!(args.format, OutputFormat::Plain);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Args::try_parse_from(["cachestat", "--interval-seconds", "0"]).is_err());
    }

    #[test]
    fn test_dogstatsd_alias() {
        let args = Args::try_parse_from(["cachestat", "--send-metrics-to-dogstatsd", "--daemon"])
            .unwrap();
        assert!(args.send_metrics);
        assert_eq!(args.mode(), ExecutionMode::Daemon);
    }

    #[test]
    fn test_log_level_mapping() {
        let args = Args::try_parse_from(["cachestat", "--log-level", "debug"]).unwrap();
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }
}
