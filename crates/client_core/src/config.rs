use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "analyzer.toml";
pub const DEFAULT_ANALYSIS_URL: &str = "http://127.0.0.1:5000/upload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub analysis_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            analysis_url: DEFAULT_ANALYSIS_URL.into(),
        }
    }
}

impl ClientSettings {
    /// Parses the configured endpoint, accepting only absolute http(s) URLs.
    pub fn analysis_endpoint(&self) -> anyhow::Result<Url> {
        let raw = self.analysis_url.trim();
        if raw.is_empty() {
            bail!("analysis url is empty");
        }
        let url = Url::parse(raw).with_context(|| format!("invalid analysis url '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("analysis url '{raw}' must use http or https");
        }
        Ok(url)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    analysis_url: Option<String>,
}

/// Defaults, then `analyzer.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    settings_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(settings_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.analysis_url {
                    settings.analysis_url = v;
                }
            }
            Err(err) => tracing::warn!(
                path = %settings_path.display(),
                "ignoring unreadable settings file: {err}"
            ),
        }
    }

    if let Some(v) = env("ANALYSIS_URL") {
        settings.analysis_url = v;
    }
    if let Some(v) = env("APP__ANALYSIS_URL") {
        settings.analysis_url = v;
    }

    settings
}
