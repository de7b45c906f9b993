use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rdt_lab_abstract::{ChannelConfig, DEFAULT_EXCHANGE_TIMEOUT_MS};
use rdt_lab_core::SenderProcess;
use rdt_lab_simulator::{Session, SessionReport, scenario_runner};

#[derive(Parser, Debug)]
#[command(author, version, about = "Alternating-bit (RDT 2.2) protocol simulator")]
struct Args {
    /// Load a scenario from disk. The scenario carries its own channel config.
    #[arg(
        long,
        conflicts_with_all = [
            "input",
            "corrupt_rate",
            "seed",
            "bounded",
            "timeout_ms",
            "min_latency",
            "max_latency",
        ]
    )]
    scenario: Option<PathBuf>,

    /// Text to send, one unit per character.
    #[arg(long, default_value = "Hello, RDT!")]
    input: String,

    /// Probability that a packet is corrupted in either direction.
    #[arg(long, default_value_t = 0.0)]
    corrupt_rate: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Use the bounded-wait sender with the default reply deadline.
    #[arg(long, default_value_t = false)]
    bounded: bool,

    /// Reply deadline in ms. Implies --bounded.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long, default_value_t = 0)]
    min_latency: u64,
    #[arg(long, default_value_t = 0)]
    max_latency: u64,

    /// Write a JSON trace of the finished session.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

impl Args {
    fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            corrupt_rate: self.corrupt_rate,
            min_latency: self.min_latency,
            max_latency: self.max_latency,
            seed: self.seed,
            exchange_timeout_ms: self
                .timeout_ms
                .or(self.bounded.then_some(DEFAULT_EXCHANGE_TIMEOUT_MS)),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    info!("rdt-lab-sim starting…");

    let report = match &args.scenario {
        Some(path) => {
            let scenario_path = path
                .to_str()
                .context("Scenario path contains invalid UTF-8")?;
            scenario_runner::run_scenario(scenario_path)?
        }
        None => run_input(&args)?,
    };

    log_summary(&report);

    if let Some(trace_path) = &args.trace_out {
        write_trace(trace_path, &report)?;
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_input(args: &Args) -> Result<SessionReport> {
    let process = SenderProcess::new(args.input.chars());
    let mut session = Session::new(args.channel_config(), process)?;
    scenario_runner::block_on_session(&mut session)?;
    info!("Session complete.");
    Ok(session.export_report())
}

fn log_summary(report: &SessionReport) {
    info!(
        "Delivered {:?} | packets sent: {} | retransmissions: {} | timeouts: {}",
        report.delivered,
        report.sender.packets_sent,
        report.sender.retransmissions,
        report.sender.timeouts
    );
}

fn write_trace(path: &Path, report: &SessionReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize session trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_channel_config() {
        let args = Args::try_parse_from([
            "rdt-lab-sim",
            "--input",
            "AB",
            "--corrupt-rate",
            "0.25",
            "--seed",
            "3",
            "--timeout-ms",
            "500",
            "--max-latency",
            "800",
        ])
        .unwrap();

        let config = args.channel_config();
        assert_eq!(config.corrupt_rate, 0.25);
        assert_eq!(config.seed, 3);
        assert_eq!(config.exchange_timeout_ms, Some(500));
        assert_eq!(config.min_latency, 0);
        assert_eq!(config.max_latency, 800);
    }

    #[test]
    fn bounded_flag_uses_default_deadline() {
        let args = Args::try_parse_from(["rdt-lab-sim", "--bounded"]).unwrap();
        assert_eq!(
            args.channel_config().exchange_timeout_ms,
            Some(DEFAULT_EXCHANGE_TIMEOUT_MS)
        );

        let args = Args::try_parse_from(["rdt-lab-sim"]).unwrap();
        assert_eq!(args.channel_config().exchange_timeout_ms, None);
    }

    #[test]
    fn scenario_and_input_conflict() {
        let parsed = Args::try_parse_from([
            "rdt-lab-sim",
            "--scenario",
            "scenarios/clean_transfer.toml",
            "--input",
            "x",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn scenario_rejects_channel_flags() {
        let flags: [&[&str]; 6] = [
            &["--seed", "3"],
            &["--corrupt-rate", "0.5"],
            &["--bounded"],
            &["--timeout-ms", "200"],
            &["--min-latency", "1"],
            &["--max-latency", "9"],
        ];
        for extra in flags {
            let mut argv = vec!["rdt-lab-sim", "--scenario", "scenarios/clean_transfer.toml"];
            argv.extend_from_slice(extra);
            assert!(Args::try_parse_from(argv).is_err(), "{extra:?}");
        }

        let args =
            Args::try_parse_from(["rdt-lab-sim", "--scenario", "scenarios/clean_transfer.toml"])
                .unwrap();
        assert!(args.scenario.is_some());
    }

    #[test]
    fn input_run_delivers_everything() {
        let args = Args::try_parse_from(["rdt-lab-sim", "--corrupt-rate", "0.4", "--seed", "11"])
            .unwrap();
        let report = run_input(&args).unwrap();
        assert_eq!(report.delivered, "Hello, RDT!");
    }
}
