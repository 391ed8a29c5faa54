use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::auth::Token;
use crate::error::PulseError;
use crate::providers::azure::Mode;

const CANDIDATES: [&str; 4] = [
    "pipeline-pulse.toml",
    "pipeline-pulse.json",
    "pipeline-pulse.yaml",
    "pipeline-pulse.yml",
];

/// Configuration file structure for pipeline-pulse.
///
/// Holds the HTTP server settings and the list of monitored pipelines.
/// Loaded once at startup; [`Config::resolve_pipelines`] turns the raw
/// pipeline entries into immutable, validated [`PipelineConfig`] values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub pipelines: Vec<PipelineSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address the dashboard feed binds to
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of most recent results requested per pipeline
    #[serde(default = "default_count")]
    pub count: u32,

    /// Timeout for each outbound provider request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// One monitored pipeline as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineSettings {
    /// Organization URL (e.g., "https://dev.azure.com/myorg")
    pub base_url: String,

    pub project: String,

    /// Build or release definition id
    pub definition_id: u64,

    /// Personal access token
    pub token: Option<String>,

    /// Environment variable holding the token, used when `token` is absent
    pub token_env: Option<String>,

    pub mode: Mode,

    /// Display name overriding the provider's definition name
    pub name: Option<String>,

    /// Per-pipeline override of `server.count`
    pub count: Option<u32>,
}

/// Validated, immutable configuration of one monitored pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: Url,
    pub project: String,
    pub definition_id: u64,
    pub token: Token,
    pub mode: Mode,
    pub name: Option<String>,
    pub count: u32,
}

impl PipelineConfig {
    /// Name used when nothing better is known, e.g. for a failed fetch.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.project, self.definition_id))
    }

    pub fn empty_placeholder(&self) -> String {
        format!(
            "No recent builds for {}.{}",
            self.project, self.definition_id
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            count: default_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_count() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipeline-pulse.{toml,json,yaml,yml}
    /// 3. `<user config dir>/pipeline-pulse/config.toml`
    ///
    /// A missing file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let found = std::env::current_dir()
            .ok()
            .and_then(|dir| find_config_in(&dir))
            .or_else(user_config_path);

        match found {
            Some(path) => Self::load_from_path(&path),
            None => anyhow::bail!(
                "No configuration file found (looked for {} and the user config directory)",
                CANDIDATES.join(", ")
            ),
        }
    }

    /// Load configuration from a specific file path.
    ///
    /// Files without a recognized extension are tried as each format in turn.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        match ConfigFormat::from_path(path) {
            Some(format) => format.parse(&contents).with_context(|| {
                format!("Failed to parse {} config: {}", format.name(), path.display())
            }),
            None => ConfigFormat::ALL
                .iter()
                .find_map(|format| format.parse(&contents).ok())
                .with_context(|| {
                    format!(
                        "Config file is not valid TOML, JSON or YAML: {}",
                        path.display()
                    )
                }),
        }
    }

    /// Validate every pipeline entry, reading `token-env` variables from the process environment.
    pub fn resolve_pipelines(&self) -> crate::error::Result<Vec<PipelineConfig>> {
        self.resolve_pipelines_with(|name| std::env::var(name).ok())
    }

    /// Validate every pipeline entry, looking up `token-env` variables through `lookup`.
    pub fn resolve_pipelines_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> crate::error::Result<Vec<PipelineConfig>> {
        if self.server.count == 0 {
            return Err(PulseError::Config("server.count must be positive".into()));
        }
        if self.server.timeout_secs == 0 {
            return Err(PulseError::Config(
                "server.timeout-secs must be positive".into(),
            ));
        }
        if self.pipelines.is_empty() {
            return Err(PulseError::Config("No pipelines configured".into()));
        }

        self.pipelines
            .iter()
            .enumerate()
            .map(|(index, settings)| {
                settings
                    .resolve(self.server.count, &lookup)
                    .map_err(|e| PulseError::Config(format!("pipelines[{index}]: {e}")))
            })
            .collect()
    }
}

impl PipelineSettings {
    fn resolve(
        &self,
        default_count: u32,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<PipelineConfig, String> {
        let base_url =
            Url::parse(&self.base_url).map_err(|e| format!("invalid base-url: {e}"))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(format!("base-url must be an http(s) URL: {}", self.base_url));
        }

        let project = self.project.trim();
        if project.is_empty() {
            return Err("project must not be empty".into());
        }

        let token = match (&self.token, &self.token_env) {
            (Some(token), _) => token.clone(),
            (None, Some(var)) => {
                lookup(var).ok_or_else(|| format!("environment variable {var} is not set"))?
            }
            (None, None) => return Err("either token or token-env is required".into()),
        };
        if token.is_empty() {
            return Err("token must not be empty".into());
        }

        let count = self.count.unwrap_or(default_count);
        if count == 0 {
            return Err("count must be positive".into());
        }

        Ok(PipelineConfig {
            base_url,
            project: project.to_string(),
            definition_id: self.definition_id,
            token: Token::from(token),
            mode: self.mode,
            name: self.name.clone().filter(|name| !name.trim().is_empty()),
            count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    const ALL: [Self; 3] = [Self::Toml, Self::Json, Self::Yaml];

    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    fn parse(self, contents: &str) -> Result<Config> {
        let config = match self {
            Self::Toml => toml::from_str(contents)?,
            Self::Json => serde_json::from_str(contents)?,
            Self::Yaml => serde_yaml::from_str(contents)?,
        };
        Ok(config)
    }
}

fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.exists())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("pipeline-pulse").join("config.toml"))
        .filter(|path| path.exists())
}
