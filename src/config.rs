//! qrdispatch configuration.
//!
//! Loaded from `~/.qrdispatch/config.toml` unless `--config` points elsewhere.
//! Every key is optional; a missing file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::launch::{AdbLauncher, Launcher, PrintLauncher};
use crate::model::{Family, RoutingTable};
use crate::registry::{AdbRegistry, InstalledChecker, StaticRegistry};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid family in {path}: {reason}")]
    Family { path: PathBuf, reason: String },
}

/// Where installed-package answers come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryKind {
    /// The `installed` list.
    #[default]
    Static,
    /// `adb shell pm path` on a connected device.
    Adb,
}

/// What happens to a decision once it is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LauncherKind {
    /// Print it as JSON on stdout.
    #[default]
    Print,
    /// Send a VIEW intent with `adb shell am start`.
    Adb,
}

/// qrdispatch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub registry: RegistryKind,
    pub launcher: LauncherKind,

    /// Packages the static registry reports as installed.
    pub installed: Vec<String>,

    /// The `adb` executable.
    pub adb_path: String,

    /// Passed to `adb -s` when set.
    pub device_serial: Option<String>,

    /// Replaces the built-in routing table when non-empty.
    #[serde(rename = "family")]
    pub families: Vec<Family>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryKind::default(),
            launcher: LauncherKind::default(),
            installed: Vec::new(),
            adb_path: "adb".to_string(),
            device_serial: None,
            families: Vec::new(),
        }
    }
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path.map(Path::to_path_buf).or_else(Self::path) {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no home directory; using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        for family in &config.families {
            if let Err(reason) = validate_family(family) {
                return Err(ConfigError::Family {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }

        Ok(config)
    }

    /// The config file path: `~/.qrdispatch/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".qrdispatch").join("config.toml"))
    }

    /// The routing table in effect.
    pub fn routing_table(&self) -> RoutingTable {
        if self.families.is_empty() {
            RoutingTable::default()
        } else {
            RoutingTable::new(self.families.clone())
        }
    }

    /// Build the installed-app checker.
    ///
    /// An explicit `installed` list (from the command line) always forces
    /// the static registry.
    pub fn checker(&self, installed: Option<&[String]>) -> InstalledChecker {
        if let Some(installed) = installed {
            return InstalledChecker::new(StaticRegistry::new(installed.iter().cloned()));
        }

        match self.registry {
            RegistryKind::Static => {
                InstalledChecker::new(StaticRegistry::new(self.installed.iter().cloned()))
            }
            RegistryKind::Adb => InstalledChecker::new(AdbRegistry::new(
                self.adb_path.clone(),
                self.device_serial.clone(),
            )),
        }
    }

    pub fn launcher(&self) -> Box<dyn Launcher> {
        match self.launcher {
            LauncherKind::Print => Box::new(PrintLauncher::new(io::stdout())),
            LauncherKind::Adb => Box::new(AdbLauncher::new(
                self.adb_path.clone(),
                self.device_serial.clone(),
            )),
        }
    }
}

fn validate_family(family: &Family) -> Result<(), String> {
    if family.name.trim().is_empty() {
        return Err("family name is empty".to_string());
    }
    if family.primary.trim().is_empty() {
        return Err(format!("family '{}' has an empty primary", family.name));
    }
    if family.schemes.is_empty() && family.domains.is_empty() {
        return Err(format!(
            "family '{}' has no schemes or domains and can never match",
            family.name
        ));
    }
    Ok(())
}
