//! Installed-app detection.
//!
//! A [`PackageRegistry`] answers lookups and may fail. The [`InstalledChecker`]
//! folds every failure into "not installed", so routing degrades to a generic
//! open instead of erroring.

use std::collections::HashSet;
use std::process::Command;

use crate::adb;

/// Why a lookup did not confirm a package.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("package not found: {0}")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("unexpected registry output for {identifier}: {output}")]
    Unexpected { identifier: String, output: String },
}

/// Something that knows which packages exist on a device.
pub trait PackageRegistry {
    /// `Ok(())` when `identifier` is installed.
    fn lookup(&self, identifier: &str) -> Result<(), LookupError>;
}

/// A fixed set of installed packages.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    installed: HashSet<String>,
}

impl StaticRegistry {
    pub fn new<I, S>(installed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            installed: installed.into_iter().map(Into::into).collect(),
        }
    }
}

impl PackageRegistry for StaticRegistry {
    fn lookup(&self, identifier: &str) -> Result<(), LookupError> {
        if self.installed.contains(identifier) {
            Ok(())
        } else {
            Err(LookupError::NotFound(identifier.to_string()))
        }
    }
}

/// Asks a connected Android device via `adb shell pm path`.
#[derive(Debug, Clone)]
pub struct AdbRegistry {
    adb: String,
    serial: Option<String>,
}

impl AdbRegistry {
    pub fn new(adb: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            adb: adb.into(),
            serial,
        }
    }
}

impl PackageRegistry for AdbRegistry {
    fn lookup(&self, identifier: &str) -> Result<(), LookupError> {
        let args = adb::shell_args(self.serial.as_deref(), &["pm", "path", identifier]);

        let output = Command::new(&self.adb)
            .args(&args)
            .output()
            .map_err(|source| LookupError::Spawn {
                program: self.adb.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        interpret_pm_path(identifier, output.status.success(), &stdout)
    }
}

/// `pm path` prints `package:/data/app/...` for installed packages and
/// exits non-zero otherwise.
fn interpret_pm_path(identifier: &str, success: bool, stdout: &str) -> Result<(), LookupError> {
    if !success {
        return Err(LookupError::NotFound(identifier.to_string()));
    }

    if stdout.lines().any(|l| l.trim_start().starts_with("package:")) {
        Ok(())
    } else {
        Err(LookupError::Unexpected {
            identifier: identifier.to_string(),
            output: stdout.trim().to_string(),
        })
    }
}

/// Answers "is this app present?" without ever failing the caller.
pub struct InstalledChecker {
    registry: Box<dyn PackageRegistry>,
}

impl InstalledChecker {
    pub fn new(registry: impl PackageRegistry + 'static) -> Self {
        Self {
            registry: Box::new(registry),
        }
    }

    pub fn is_installed(&self, identifier: &str) -> bool {
        match self.registry.lookup(identifier) {
            Ok(()) => true,
            Err(LookupError::NotFound(_)) => false,
            Err(e) => {
                tracing::debug!(identifier, error = %e, "package lookup failed; treating as absent");
                false
            }
        }
    }
}
