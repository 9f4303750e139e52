//! Run configuration
//!
//! Paths are resolved with the precedence: command-line flag, then the TOML
//! file given with `--config`, then the built-in defaults under `referenced/`.

mod inputs;

pub use inputs::{ABOUT_FILE, DEFAULT_INPUT_DIR, InputOverrides, InputPaths};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Output file of a full dereference run by default
pub const DEFAULT_OUTPUT: &str = "moalmanac-draft.dereferenced.json";

/// Contents of a TOML configuration file
///
/// ```toml
/// output = "moalmanac-draft.dereferenced.json"
///
/// [inputs]
/// about = "referenced/about.json"
/// therapy_groups = "referenced/therapy_groups.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub inputs: InputOverrides,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub inputs: InputPaths,
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            inputs: InputPaths::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Config {
    /// Resolve the configuration from the optional config file and CLI flags
    pub fn load(
        config_path: Option<&Path>,
        cli_inputs: &InputOverrides,
        cli_output: Option<PathBuf>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                ConfigFile::load(path)?
            }
            None => ConfigFile::default(),
        };
        Ok(Self::merge(file, cli_inputs, cli_output))
    }

    /// Layer the config file and CLI flags over the defaults
    pub fn merge(file: ConfigFile, cli_inputs: &InputOverrides, cli_output: Option<PathBuf>) -> Self {
        let mut config = Config::default();

        config.inputs.apply(&file.inputs);
        config.inputs.apply(cli_inputs);

        if let Some(output) = cli_output.or(file.output) {
            config.output = output;
        }

        log::debug!("Resolved configuration: {:?}", config);
        config
    }
}
