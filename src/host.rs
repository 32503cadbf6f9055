//! Host toolchain integration.
//!
//! The bridge leans on the host Ruby environment for two things it cannot
//! know by itself: which compiler version is installed, and where a Bundler
//! or Rails application keeps its transpilable code. Both are answered by
//! short-lived subprocesses; nothing here is cached, callers decide how long
//! answers stay valid.

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Load paths and gem-declared stubs reported by the host application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostReport {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    #[serde(default)]
    pub stubs: Vec<String>,
}

/// Query the version of the host `opal` executable.
pub fn opal_version(config: &BridgeConfig) -> Result<String> {
    let stdout = capture_stdout("opal -v", &mut bundler_command(config, "opal", &["-v"]))?;
    parse_version(&stdout).ok_or_else(|| {
        BridgeError::host("opal -v", format!("unrecognized version output {stdout:?}"))
    })
}

/// Ask the host application where its transpilable code lives.
///
/// Runs a one-line reporter script through `rails runner` when a Rails
/// environment is configured, otherwise through plain `ruby`, under Bundler
/// either way. The script prints a single JSON line naming the load paths
/// and the stubs gems have declared; extra requires from the configuration
/// are evaluated first so gems that register paths on load get the chance.
pub fn discover(config: &BridgeConfig) -> Result<HostReport> {
    let script = report_script(&config.extra_requires);
    let (label, mut command) = match &config.rails_env {
        Some(rails_env) => {
            let mut command = bundler_command(config, "rails", &["runner", &script]);
            command.env("RAILS_ENV", rails_env);
            ("rails runner", command)
        }
        None => ("ruby -e", bundler_command(config, "ruby", &["-e", &script])),
    };
    let stdout = capture_stdout(label, &mut command)?;
    let report = parse_report(&stdout).ok_or_else(|| {
        BridgeError::host(label, format!("unrecognized report output {stdout:?}"))
    })?;
    debug!(
        "host reported {} load paths and {} stubs",
        report.paths.len(),
        report.stubs.len()
    );
    Ok(report)
}

/// Build a host command, prefixed with `bundle exec` unless this process
/// already runs inside Bundler.
pub(crate) fn bundler_command(config: &BridgeConfig, program: &str, args: &[&str]) -> Command {
    if config.in_bundler {
        let mut command = Command::new(program);
        command.args(args);
        command
    } else {
        let mut command = Command::new("bundle");
        command.arg("exec").arg(program).args(args);
        command
    }
}

/// Run `command` to completion and return its stdout, mapping every failure
/// mode to a [`BridgeError::Host`] that names the command.
pub(crate) fn capture_stdout(label: &str, command: &mut Command) -> Result<String> {
    debug!("running {label}");
    let output = command
        .output()
        .map_err(|err| BridgeError::host(label, err.to_string()))?;
    if !output.status.success() {
        let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if detail.is_empty() {
            detail = format!("exited with {}", output.status);
        }
        return Err(BridgeError::host(label, detail));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract the bare version from `opal -v` output such as `Opal v0.10.0`
/// or the unprefixed `Opal 1.8.2` newer releases print.
fn parse_version(output: &str) -> Option<String> {
    let rest = output.trim().strip_prefix("Opal ")?;
    let version = rest.strip_prefix('v').unwrap_or(rest).trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

/// The application may log while booting, so the report is read from the
/// last non-empty stdout line.
fn parse_report(stdout: &str) -> Option<HostReport> {
    let line = stdout.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str(line.trim()).ok()
}

fn report_script(extra_requires: &[String]) -> String {
    let mut script = String::from("require \"json\"; require \"opal\"; ");
    for name in extra_requires {
        script.push_str("require \"");
        script.push_str(name);
        script.push_str("\"; ");
    }
    script.push_str("puts({ paths: Opal.paths, stubs: Opal::Config.stubbed_files.to_a }.to_json)");
    script
}
