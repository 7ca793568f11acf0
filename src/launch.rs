//! Launching dispatch decisions.
//!
//! The launcher is the only place a decision leaves the process: either as a
//! JSON line for another program to act on, or as an Android VIEW intent sent
//! through `adb`.

use std::io::{self, Write};
use std::process::Command;

use crate::adb;
use crate::model::DispatchDecision;

const VIEW_ACTION: &str = "android.intent.action.VIEW";

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("no handler for {locator}: {detail}")]
    NoHandler { locator: String, detail: String },

    #[error("failed to write decision: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize decision: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opens a decision's locator.
pub trait Launcher {
    fn launch(&mut self, decision: &DispatchDecision) -> Result<(), LaunchError>;
}

/// Writes each decision as one line of JSON.
pub struct PrintLauncher<W> {
    out: W,
}

impl<W: Write> PrintLauncher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Launcher for PrintLauncher<W> {
    fn launch(&mut self, decision: &DispatchDecision) -> Result<(), LaunchError> {
        let json = serde_json::to_string(decision)?;
        writeln!(self.out, "{json}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Sends a VIEW intent to a connected Android device.
pub struct AdbLauncher {
    adb: String,
    serial: Option<String>,
}

impl AdbLauncher {
    pub fn new(adb: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            adb: adb.into(),
            serial,
        }
    }

    fn args(&self, decision: &DispatchDecision) -> Vec<String> {
        let mut command = vec!["am", "start", "-a", VIEW_ACTION, "-d", decision.locator.as_str()];

        if let Some(target) = &decision.target {
            command.extend(["-p", target.as_str()]);
        }

        adb::shell_args(self.serial.as_deref(), &command)
    }
}

impl Launcher for AdbLauncher {
    fn launch(&mut self, decision: &DispatchDecision) -> Result<(), LaunchError> {
        let output = Command::new(&self.adb)
            .args(self.args(decision))
            .output()
            .map_err(|source| LaunchError::Spawn {
                program: self.adb.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        interpret_am_start(&decision.locator, output.status.success(), &stdout, &stderr)?;

        tracing::info!(locator = %decision.locator, target = decision.target.as_deref(), "launched");
        Ok(())
    }
}

/// `am start` exits 0 even when no activity resolves; it reports that on stdout.
fn interpret_am_start(
    locator: &str,
    success: bool,
    stdout: &str,
    stderr: &str,
) -> Result<(), LaunchError> {
    if success && !stdout.contains("Error:") {
        return Ok(());
    }

    let detail = if stderr.trim().is_empty() { stdout } else { stderr };
    Err(LaunchError::NoHandler {
        locator: locator.to_string(),
        detail: detail.trim().to_string(),
    })
}
