use quarto_syntax::{ParseOptions, TripleDelimiter};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserSettings,
}

/// The `[parser]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    pub triple_delimiter: TripleDelimiterSetting,
    /// `false` makes every reparse a full parse.
    pub incremental: bool,
    /// Stop parsing between blocks once this many milliseconds have passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_budget_ms: Option<u64>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            triple_delimiter: TripleDelimiterSetting::default(),
            incremental: true,
            time_budget_ms: None,
        }
    }
}

/// How `***a***` nests, as spelled in the config file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripleDelimiterSetting {
    #[default]
    StrongInside,
    EmphasisInside,
}

impl From<TripleDelimiterSetting> for TripleDelimiter {
    fn from(setting: TripleDelimiterSetting) -> Self {
        match setting {
            TripleDelimiterSetting::StrongInside => TripleDelimiter::StrongInside,
            TripleDelimiterSetting::EmphasisInside => TripleDelimiter::EmphasisInside,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        // Expand shell variables and tilde in the requested path
        let config_path = Self::expand_path(config_path.as_ref())
            .unwrap_or_else(|| config_path.as_ref().to_path_buf());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/quarto-syntax");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Parser options for these settings.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_triple_delimiter(self.parser.triple_delimiter.into())
            .with_incremental(self.parser.incremental)
    }

    /// An abort check for `parse_with`/`reparse_with` that stops the parse
    /// once the time budget, counted from this call, has run out.
    pub fn abort_check(&self) -> impl FnMut(usize) -> ControlFlow<()> + use<> {
        let deadline = self
            .parser
            .time_budget_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        move |_offset| match deadline {
            Some(deadline) if Instant::now() >= deadline => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
