use anyhow::{Context, Result, bail};
use rdt_lab_abstract::{ChannelConfig, TestAction, TestAssertion, TestScenario};
use rdt_lab_core::SenderProcess;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::session::Session;
use crate::trace::SessionReport;

pub fn load_scenario(path: &Path) -> Result<TestScenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    parse_scenario(&content)
        .with_context(|| format!("Failed to parse scenario file {}", path.display()))
}

pub fn parse_scenario(content: &str) -> Result<TestScenario> {
    Ok(toml::from_str(content)?)
}

/// Build a session with the scenario's config, input and deterministic faults.
pub fn build_session(scenario: &TestScenario) -> Result<Session> {
    let mut config = ChannelConfig::default();
    scenario.config.apply_to(&mut config);

    let process = SenderProcess::new(scenario.outgoing_units());
    let mut session = Session::new(config, process)
        .with_context(|| format!("Invalid config in scenario '{}'", scenario.name))?;
    configure_actions(&mut session, &scenario.actions);
    Ok(session)
}

fn configure_actions(session: &mut Session, actions: &[TestAction]) {
    let channel = session.channel_mut();
    for action in actions {
        match action {
            TestAction::AppSend { .. } => {}
            TestAction::CorruptNextData { seq } => channel.add_corrupt_data_once(*seq),
            TestAction::CorruptNextAck { ack } => channel.add_corrupt_ack_once(*ack),
            TestAction::DelayNextAck { ack, ms } => channel.add_delay_ack_once(*ack, *ms),
        }
    }
}

/// Drive a session to completion on a current-thread runtime.
pub fn block_on_session(session: &mut Session) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(session.run_configured())
}

pub fn run_scenario(path: &str) -> Result<SessionReport> {
    let scenario = load_scenario(Path::new(path))?;
    run_loaded(&scenario)
}

pub fn run_loaded(scenario: &TestScenario) -> Result<SessionReport> {
    info!("Running scenario '{}': {}", scenario.name, scenario.description);
    let mut session = build_session(scenario)?;
    block_on_session(&mut session)?;
    finish(scenario, &session)
}

/// Same as [`run_loaded`] for callers already inside a runtime.
pub async fn run_loaded_async(scenario: &TestScenario) -> Result<SessionReport> {
    info!("Running scenario '{}': {}", scenario.name, scenario.description);
    let mut session = build_session(scenario)?;
    session.run_configured().await?;
    finish(scenario, &session)
}

fn finish(scenario: &TestScenario, session: &Session) -> Result<SessionReport> {
    let report = session.export_report();
    check_assertions(&scenario.name, &scenario.assertions, &report)?;
    info!("Scenario '{}' passed", scenario.name);
    Ok(report)
}

pub fn check_assertions(
    name: &str,
    assertions: &[TestAssertion],
    report: &SessionReport,
) -> Result<()> {
    let mut failures = Vec::new();
    for assertion in assertions {
        match assertion {
            TestAssertion::DataDelivered { data } => {
                if report.delivered != *data {
                    failures.push(format!(
                        "expected delivered data {:?}, got {:?}",
                        data, report.delivered
                    ));
                }
            }
            TestAssertion::SenderPacketCount { min, max } => {
                check_range(
                    "sender packet count",
                    report.sender.packets_sent,
                    *min,
                    *max,
                    &mut failures,
                );
            }
            TestAssertion::RetransmissionCount { min, max } => {
                check_range(
                    "retransmission count",
                    report.sender.retransmissions,
                    *min,
                    *max,
                    &mut failures,
                );
            }
            TestAssertion::SequencesAligned => {
                if report.sender_seq != report.receiver_seq {
                    failures.push(format!(
                        "sender expects seq {} but receiver expects {}",
                        report.sender_seq, report.receiver_seq
                    ));
                }
            }
        }
    }

    if !failures.is_empty() {
        bail!("Scenario '{}' failed:\n  {}", name, failures.join("\n  "));
    }
    Ok(())
}

fn check_range(what: &str, value: u32, min: u32, max: Option<u32>, failures: &mut Vec<String>) {
    if value < min {
        failures.push(format!("{what} {value} is below minimum {min}"));
    }
    if let Some(max) = max
        && value > max
    {
        failures.push(format!("{what} {value} is above maximum {max}"));
    }
}
