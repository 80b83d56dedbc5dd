//! Client configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizdrop_core::normalize::{IdSource, IndexedIds, RandomIds};
use quizdrop_core::traits::FormApi;

use crate::http::HttpFormApi;

/// Where the form API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without the trailing `/forms`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// How bare option payloads receive their ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `opt-{position}`; stable across reloads of the same form.
    #[default]
    Indexed,
    /// Random UUIDs.
    Random,
}

impl IdStrategy {
    pub fn id_source(self) -> Box<dyn IdSource> {
        match self {
            IdStrategy::Indexed => Box::new(IndexedIds),
            IdStrategy::Random => Box::new(RandomIds),
        }
    }
}

/// Top-level quizdrop configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizdropConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl QuizdropConfig {
    /// Resolve `${VAR}` references and apply the `QUIZDROP_API_URL` override.
    fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
        self.api.base_url = resolve_env_vars(&self.api.base_url)
            .trim_end_matches('/')
            .to_string();
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizdrop.toml` in the current directory
/// 2. `~/.config/quizdrop/config.toml`
///
/// Environment variable override: `QUIZDROP_API_URL`.
pub fn load_config() -> Result<QuizdropConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdropConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdrop.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizdropConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizdropConfig::default(),
    };

    config.apply_env(std::env::var("QUIZDROP_API_URL").ok());
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdrop"))
}

/// Create the API client described by the configuration.
pub fn create_api(config: &ApiConfig) -> Result<Box<dyn FormApi>> {
    Ok(Box::new(HttpFormApi::new(
        &config.base_url,
        config.timeout_secs,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZDROP_TEST_HOST", "forms.example");
        assert_eq!(resolve_env_vars("${_QUIZDROP_TEST_HOST}"), "forms.example");
        assert_eq!(
            resolve_env_vars("https://${_QUIZDROP_TEST_HOST}/api"),
            "https://forms.example/api"
        );
        std::env::remove_var("_QUIZDROP_TEST_HOST");
    }

    #[test]
    fn default_config() {
        let config = QuizdropConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.id_strategy, IdStrategy::Indexed);
    }

    #[test]
    fn parse_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizdrop.toml");
        std::fs::write(
            &path,
            r#"
id_strategy = "random"

[api]
base_url = "https://quiz.example/"
"#,
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.id_strategy, IdStrategy::Random);
        assert_eq!(config.api.timeout_secs, 30);
        if std::env::var("QUIZDROP_API_URL").is_err() {
            assert_eq!(config.api.base_url, "https://quiz.example");
        }
    }

    #[test]
    fn env_url_overrides_file() {
        let mut config = QuizdropConfig::default();
        config.apply_env(Some("http://127.0.0.1:9000/".into()));
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");

        config.apply_env(None);
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizdrop.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
