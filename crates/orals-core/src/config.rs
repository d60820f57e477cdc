//! Grader configuration (`config.toml`)
//!
//! Looked up at `--config`, else `$ORALS_CONFIG_DIR/config.toml`, else
//! `<config dir>/orals/config.toml`. A missing file means defaults.
//! `ORALS_FEEDBACK_API`, `ORALS_API_KEY` and `ORALS_DATA_DIR` override the
//! matching fields after loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::concepts::DetectorConfig;
use crate::error::{OralsError, Result};
use crate::grade::ThresholdTable;
use crate::heuristic::BlendStrategy;
use crate::llm::EndpointConfig;
use crate::progress::PROGRESS_FILE;
use crate::session::{FeedbackMode, Grader};

const CONFIG_DIR: &str = "orals";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "ORALS_CONFIG_DIR";
const FEEDBACK_API_ENV_VAR: &str = "ORALS_FEEDBACK_API";
const API_KEY_ENV_VAR: &str = "ORALS_API_KEY";
const DATA_DIR_ENV_VAR: &str = "ORALS_DATA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub mode: FeedbackMode,
    /// Named letter table: "classic" or "aligned"
    #[serde(default = "default_preset")]
    pub thresholds: String,
    #[serde(default)]
    pub blend: BlendStrategy,
    /// Custom letter table, used instead of the preset when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_table: Option<ThresholdTable>,
    #[serde(default)]
    pub detectors: DetectorConfig,
}

fn default_preset() -> String {
    "classic".to_string()
}

impl Default for GradingConfig {
    fn default() -> Self {
        GradingConfig {
            mode: FeedbackMode::default(),
            thresholds: default_preset(),
            blend: BlendStrategy::default(),
            threshold_table: None,
            detectors: DetectorConfig::default(),
        }
    }
}

impl GradingConfig {
    pub fn threshold_table(&self) -> Result<ThresholdTable> {
        if let Some(table) = &self.threshold_table {
            return Ok(table.clone());
        }
        ThresholdTable::preset(&self.thresholds).ok_or_else(|| {
            OralsError::unsupported("threshold preset", &self.thresholds, "classic, aligned")
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Whole-request timeout; none unless set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl LlmConfig {
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            url: self.endpoint.clone().unwrap_or_default(),
            api_key: self.api_key.clone(),
            timeout: self.timeout_seconds.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the progress log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Explicit progress log path, wins over `data_dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_file: Option<PathBuf>,
    /// Case library file or directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cases: Option<PathBuf>,
}

impl StorageConfig {
    /// Progress log path: explicit file, else `data_dir`, else the platform data dir
    pub fn progress_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.progress_file {
            return Ok(file.clone());
        }
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .ok_or_else(|| {
                    OralsError::Other("unable to determine data directory".to_string())
                })?
                .join(CONFIG_DIR),
        };
        Ok(dir.join(PROGRESS_FILE))
    }
}

impl GraderConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    OralsError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };
        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Read a config file; a missing file gives defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| OralsError::io_operation("read config", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| OralsError::io_operation("parse config", path.display(), e))
    }

    /// Discover, load and apply environment overrides
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        let mut config = Self::load(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(FEEDBACK_API_ENV_VAR) {
            self.llm.endpoint = Some(url);
        }
        if let Some(key) = get(API_KEY_ENV_VAR) {
            self.llm.api_key = Some(key);
        }
        if let Some(dir) = get(DATA_DIR_ENV_VAR) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| OralsError::io_operation("create directory", dir.display(), e))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| OralsError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| OralsError::io_operation("write config", path.display(), e))
    }

    pub fn grader(&self) -> Result<Grader> {
        Ok(Grader {
            mode: self.grading.mode,
            blend: self.grading.blend,
            detectors: self.grading.detectors,
            thresholds: self.grading.threshold_table()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Letter;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GraderConfig::default();
        assert_eq!(config.grading.mode, FeedbackMode::Heuristic);
        assert_eq!(config.grading.thresholds, "classic");
        assert_eq!(config.llm.endpoint_config().timeout, None);
        assert!(!config.llm.endpoint_config().is_configured());
        assert_eq!(config.grader().unwrap().thresholds, ThresholdTable::classic());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = GraderConfig::load(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, GraderConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = GraderConfig::default();
        config.grading.mode = FeedbackMode::Hybrid;
        config.grading.blend = BlendStrategy::provisional();
        config.grading.thresholds = "aligned".to_string();
        config.llm.endpoint = Some("http://localhost:8000/api/feedback".to_string());
        config.llm.timeout_seconds = Some(30);
        config.save(&path).unwrap();

        let loaded = GraderConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.llm.endpoint_config().timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_partial_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[grading]
mode = "llm"

[grading.detectors]
cooccurrence_window = 120

[grading.blend]
strategy = "weighted"
unigram = 0.5
bigram = 0.25
rubric = 0.25
"#,
        )
        .unwrap();

        let config = GraderConfig::load(&path).unwrap();
        assert_eq!(config.grading.mode, FeedbackMode::Llm);
        assert_eq!(config.grading.detectors.cooccurrence_window, 120);
        assert_eq!(config.grading.detectors.negation_window, 40);
        assert_eq!(config.grading.blend.name(), "weighted");
        assert_eq!(config.grading.thresholds, "classic");
    }

    #[test]
    fn test_custom_threshold_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[grading.threshold_table]
strict_similarity = false

[[grading.threshold_table.bands]]
letter = "A"
rubric_frac = 0.9
similarity = 0.9
"#,
        )
        .unwrap();

        let grader = GraderConfig::load(&path).unwrap().grader().unwrap();
        assert_eq!(grader.thresholds.letter_for(0.85, 0.85), Letter::F);
        assert_eq!(grader.thresholds.letter_for(0.9, 0.0), Letter::A);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let mut config = GraderConfig::default();
        config.grading.thresholds = "lenient".to_string();
        assert!(config.grader().is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[grading\nmode=").unwrap();
        assert!(GraderConfig::load(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ORALS_FEEDBACK_API", "https://example.test/feedback"),
            ("ORALS_API_KEY", ""),
            ("ORALS_DATA_DIR", "/tmp/orals-data"),
        ]
        .into_iter()
        .collect();

        let mut config = GraderConfig::default();
        config.llm.api_key = Some("from-file".to_string());
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(
            config.llm.endpoint.as_deref(),
            Some("https://example.test/feedback")
        );
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
        assert_eq!(
            config.storage.progress_path().unwrap(),
            PathBuf::from("/tmp/orals-data").join(PROGRESS_FILE)
        );
    }

    #[test]
    fn test_progress_file_wins() {
        let storage = StorageConfig {
            data_dir: Some(PathBuf::from("/data")),
            progress_file: Some(PathBuf::from("/elsewhere/log.json")),
            cases: None,
        };
        assert_eq!(
            storage.progress_path().unwrap(),
            PathBuf::from("/elsewhere/log.json")
        );
    }
}
