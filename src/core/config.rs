//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.nook/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::{DEFAULT_TEMPERATURE, ModelInfo, clamp_temperature};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NookConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub narrow_width: Option<u16>,
    pub composer_max_lines: Option<u16>,
    pub default_temperature: Option<f32>,
    pub default_model: Option<String>,
    pub workspace_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpeechConfig {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub lang: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

/// Terminals narrower than this count as narrow viewports.
pub const DEFAULT_NARROW_WIDTH: u16 = 80;
pub const DEFAULT_COMPOSER_MAX_LINES: u16 = 8;
pub const DEFAULT_SPEECH_LANG: &str = "en-US";
const DEFAULT_WORKSPACE_FILE: &str = "workspace.json";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub narrow_width: u16,
    pub composer_max_lines: u16,
    pub default_temperature: f32,
    pub default_model: Option<String>,
    pub workspace_file: PathBuf,
    pub speech_command: Option<String>,
    pub speech_args: Vec<String>,
    pub speech_lang: String,
    pub models: Vec<ModelInfo>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.nook`.
pub fn nook_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".nook"))
}

/// Returns the path to `~/.nook/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    nook_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.nook/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `NookConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<NookConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(NookConfig::default());
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<NookConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(NookConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: NookConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Nook Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# narrow_width = 80                  # Below this many columns the composer drops focus after send
# composer_max_lines = 8             # Composer grows up to this many lines, then scrolls
# default_temperature = 1.0          # 0.0 (precise) to 1.0 (creative)
# default_model = "llama3:8b"        # Or set NOOK_DEFAULT_MODEL
# workspace_file = "workspace.json"  # Relative to ~/.nook/, or set NOOK_WORKSPACE_FILE

# [speech]
# command = "whisper-stream"         # Prints one transcript line per utterance; or set NOOK_SPEECH_COMMAND
# args = ["--language", "{lang}"]
# lang = "en-US"

# [[models]]
# name = "llama3:8b"
# size = 4661224676                  # Bytes
# modified_at = "2024-05-01T12:00:00Z"

# [[models]]
# name = "mistral:7b"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_model` and `cli_workspace` are from CLI flags (None = not specified).
pub fn resolve(
    config: &NookConfig,
    cli_model: Option<&str>,
    cli_workspace: Option<&Path>,
) -> ResolvedConfig {
    // Model: CLI → env → config
    let default_model = cli_model
        .map(|s| s.to_string())
        .or_else(|| std::env::var("NOOK_DEFAULT_MODEL").ok())
        .or_else(|| config.general.default_model.clone());

    // Workspace file: CLI → env → config → default; relative paths live under ~/.nook/
    let workspace_file = cli_workspace
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("NOOK_WORKSPACE_FILE").ok().map(PathBuf::from))
        .or_else(|| config.general.workspace_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_FILE));
    let workspace_file = if workspace_file.is_relative() && cli_workspace.is_none() {
        nook_dir().map(|d| d.join(&workspace_file)).unwrap_or(workspace_file)
    } else {
        workspace_file
    };

    // Speech command: env → config
    let speech_command = std::env::var("NOOK_SPEECH_COMMAND")
        .ok()
        .or_else(|| config.speech.command.clone());

    let default_temperature = match config.general.default_temperature {
        Some(t) => {
            let clamped = clamp_temperature(t);
            if clamped != t {
                warn!("default_temperature {} out of range, using {}", t, clamped);
            }
            clamped
        }
        None => DEFAULT_TEMPERATURE,
    };

    ResolvedConfig {
        narrow_width: config.general.narrow_width.unwrap_or(DEFAULT_NARROW_WIDTH),
        composer_max_lines: config
            .general
            .composer_max_lines
            .unwrap_or(DEFAULT_COMPOSER_MAX_LINES)
            .max(1),
        default_temperature,
        default_model,
        workspace_file,
        speech_command,
        speech_args: config.speech.args.clone().unwrap_or_default(),
        speech_lang: config
            .speech
            .lang
            .clone()
            .unwrap_or_else(|| DEFAULT_SPEECH_LANG.to_string()),
        models: config.models.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = NookConfig::default();
        assert!(config.models.is_empty());
        assert!(config.general.narrow_width.is_none());
        assert!(config.speech.command.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&NookConfig::default(), None, None);
        assert_eq!(resolved.narrow_width, DEFAULT_NARROW_WIDTH);
        assert_eq!(resolved.composer_max_lines, DEFAULT_COMPOSER_MAX_LINES);
        assert_eq!(resolved.default_temperature, DEFAULT_TEMPERATURE);
        assert_eq!(resolved.speech_lang, DEFAULT_SPEECH_LANG);
        assert!(resolved.speech_args.is_empty());
        assert!(resolved.workspace_file.ends_with("workspace.json"));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = NookConfig {
            general: GeneralConfig {
                narrow_width: Some(100),
                composer_max_lines: Some(3),
                default_temperature: Some(0.3),
                ..Default::default()
            },
            speech: SpeechConfig {
                args: Some(vec!["-l".to_string(), "{lang}".to_string()]),
                lang: Some("fr-FR".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, None, None);
        assert_eq!(resolved.narrow_width, 100);
        assert_eq!(resolved.composer_max_lines, 3);
        assert_eq!(resolved.default_temperature, 0.3);
        assert_eq!(resolved.speech_args.len(), 2);
        assert_eq!(resolved.speech_lang, "fr-FR");
    }

    #[test]
    fn test_out_of_range_temperature_is_clamped() {
        let config = NookConfig {
            general: GeneralConfig {
                default_temperature: Some(2.5),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, None, None).default_temperature, 1.0);
    }

    #[test]
    fn test_zero_max_lines_is_raised_to_one() {
        let config = NookConfig {
            general: GeneralConfig {
                composer_max_lines: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, None, None).composer_max_lines, 1);
    }

    #[test]
    fn test_cli_wins() {
        let config = NookConfig {
            general: GeneralConfig {
                default_model: Some("from-config".to_string()),
                workspace_file: Some("other.json".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("from-cli"), Some(Path::new("ws.json")));
        assert_eq!(resolved.default_model.as_deref(), Some("from-cli"));
        assert_eq!(resolved.workspace_file, PathBuf::from("ws.json"));
    }

    #[test]
    fn test_toml_parses_all_sections() {
        let toml_str = r#"
[general]
narrow_width = 72
composer_max_lines = 6
default_temperature = 0.7
default_model = "llama3:8b"

[speech]
command = "whisper-stream"
args = ["--language", "{lang}"]
lang = "de-DE"

[[models]]
name = "llama3:8b"
size = 4661224676
modified_at = "2024-05-01T12:00:00Z"

[[models]]
name = "mistral:7b"
"#;
        let config: NookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.narrow_width, Some(72));
        assert_eq!(config.general.default_model.as_deref(), Some("llama3:8b"));
        assert_eq!(config.speech.command.as_deref(), Some("whisper-stream"));
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].size, 4_661_224_676);
        assert!(config.models[0].modified_at.is_some());
        assert_eq!(config.models[1].size, 0);
        assert!(config.models[1].modified_at.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[general]
default_model = "my-model"
"#;
        let config: NookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.default_model.as_deref(), Some("my-model"));
        assert!(config.general.narrow_width.is_none());
        assert!(config.speech.lang.is_none());
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nook").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.models.is_empty());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Nook Configuration"));
        // Everything is commented out, so it parses back to defaults
        let reparsed: NookConfig = toml::from_str(&written).unwrap();
        assert!(reparsed.general.default_model.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\nnarrow_width = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
