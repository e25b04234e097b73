use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::view::Filter;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKLIST_CONFIG_PATH";

/// ANSI codes for the rendered board. Empty codes mean plain output.
#[derive(Debug, Clone)]
pub struct Palette {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
    pub overdue: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn paint(&self, code: &str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", code, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("ember") => Palette {
            high: "\x1b[38;5;196m",
            medium: "\x1b[38;5;214m",
            low: "\x1b[38;5;109m",
            overdue: "\x1b[38;5;203m",
            reset: "\x1b[0m",
        },
        Some("tide") => Palette {
            high: "\x1b[38;5;39m",
            medium: "\x1b[38;5;73m",
            low: "\x1b[38;5;146m",
            overdue: "\x1b[38;5;168m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            high: "",
            medium: "",
            low: "",
            overdue: "",
            reset: "",
        },
    }
}

/// Lowercases and strips non-alphanumerics so "Ember" and " ember "
/// name the same palette. Returns `None` for effectively empty input.
pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    match cleaned.as_str() {
        "plain" | "mono" | "none" => Some("default".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    /// The filter a bare `list` renders with; `today` when unset.
    #[serde(default)]
    pub default_filter: Option<Filter>,
}

/// A config load that never blocks a command: on any failure the defaults
/// are returned together with the error for the caller to log.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::io("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("tasklist")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::io("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tasklist")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::corrupt_store(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

#[cfg(test)]
mod tests {
    use super::{
        Config, canonical_theme_name, load_config_from_path, load_config_with_fallback_from_path,
        palette_for_theme,
    };
    use crate::view::Filter;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_config_falls_back_to_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn malformed_config_falls_back_to_defaults_with_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_some());
    }

    #[test]
    fn valid_config_reads_theme_and_default_filter() {
        let path = temp_path("valid-config.json");
        fs::write(&path, r#"{"theme": "ember", "default_filter": "overdue"}"#).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme.as_deref(), Some("ember"));
        assert_eq!(loaded.default_filter, Some(Filter::Overdue));
    }

    #[test]
    fn canonical_theme_name_normalizes_variants() {
        assert_eq!(canonical_theme_name("Ember"), Some("ember".into()));
        assert_eq!(canonical_theme_name(" Tide "), Some("tide".into()));
        assert_eq!(canonical_theme_name("Plain"), Some("default".into()));
        assert_eq!(canonical_theme_name("  "), None);
    }

    #[test]
    fn palette_for_theme_returns_palette() {
        let plain = palette_for_theme(None);
        assert!(plain.high.is_empty());
        assert_eq!(plain.paint(plain.high, "High"), "High");

        let ember = palette_for_theme(Some("ember"));
        assert_eq!(ember.high, "\x1b[38;5;196m");
        assert_eq!(
            ember.paint(ember.high, "High"),
            "\x1b[38;5;196mHigh\x1b[0m"
        );

        let unknown = palette_for_theme(Some("oceanic"));
        assert!(unknown.high.is_empty());
    }
}
