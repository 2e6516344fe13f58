//! Project configuration (`jobtrack.toml`)
//!
//! Every component receives a [`TrackerConfig`] at construction instead of
//! reading process-wide paths, so tests can point a whole tracker at a
//! temporary directory.

use crate::error::{TrackError, TrackResult};
use crate::models::Stage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "jobtrack.toml";

/// Stage directories, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDirs {
    #[serde(default = "default_drafted_dir")]
    pub drafted: String,
    #[serde(default = "default_ready_dir")]
    pub ready: String,
    #[serde(default = "default_applied_dir")]
    pub applied: String,
    #[serde(default = "default_skipped_dir")]
    pub skipped: String,
}

fn default_drafted_dir() -> String {
    "Resume/Drafts".to_string()
}

fn default_ready_dir() -> String {
    "Resume/To_Apply".to_string()
}

fn default_applied_dir() -> String {
    "Resume/Applied".to_string()
}

fn default_skipped_dir() -> String {
    "Resume/Skipped".to_string()
}

impl Default for StageDirs {
    fn default() -> Self {
        Self {
            drafted: default_drafted_dir(),
            ready: default_ready_dir(),
            applied: default_applied_dir(),
            skipped: default_skipped_dir(),
        }
    }
}

impl StageDirs {
    pub fn get(&self, stage: Stage) -> &str {
        match stage {
            Stage::Drafted => &self.drafted,
            Stage::Ready => &self.ready,
            Stage::Applied => &self.applied,
            Stage::Skipped => &self.skipped,
        }
    }
}

/// Request surface settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Project root every other path is relative to (not serialized)
    #[serde(skip)]
    pub root: PathBuf,

    /// Ledger CSV file
    #[serde(default = "default_ledger")]
    pub ledger: String,

    /// Dashboard document holding the embedded ledger snapshot
    #[serde(default = "default_dashboard")]
    pub dashboard: String,

    /// Prefix in front of the identity in artifact file names
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Extension of the final document (ready, applied and skipped stages)
    #[serde(default = "default_document_extension")]
    pub document_extension: String,

    /// Extension of drafts kept in the drafted stage directory
    #[serde(default = "default_draft_extension")]
    pub draft_extension: String,

    #[serde(default)]
    pub stages: StageDirs,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_ledger() -> String {
    "job_applications.csv".to_string()
}

fn default_dashboard() -> String {
    "job_dashboard.html".to_string()
}

fn default_file_prefix() -> String {
    "resume_".to_string()
}

fn default_document_extension() -> String {
    "pdf".to_string()
}

fn default_draft_extension() -> String {
    "html".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ledger: default_ledger(),
            dashboard: default_dashboard(),
            file_prefix: default_file_prefix(),
            document_extension: default_document_extension(),
            draft_extension: default_draft_extension(),
            stages: StageDirs::default(),
            server: ServerConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Default configuration rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load `jobtrack.toml` from the project root; a missing file yields defaults
    pub fn load(root: &Path) -> TrackResult<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::with_root(root));
        }

        let content = std::fs::read_to_string(&config_path)?;
        let mut config: TrackerConfig = toml::from_str(&content)
            .map_err(|e| TrackError::Config(format!("{}: {}", config_path.display(), e)))?;
        config.root = root.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Save config to `jobtrack.toml`
    pub fn save(&self) -> TrackResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TrackError::Config(e.to_string()))?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.root.join(CONFIG_FILE), content)?;
        Ok(())
    }

    /// Stage directories must be distinct, otherwise a file's location would
    /// not determine its stage
    pub fn validate(&self) -> TrackResult<()> {
        for (i, a) in Stage::ALL.iter().enumerate() {
            for b in &Stage::ALL[i + 1..] {
                if normalize_dir(self.stages.get(*a)) == normalize_dir(self.stages.get(*b)) {
                    return Err(TrackError::Config(format!(
                        "stages '{}' and '{}' share directory '{}'",
                        a.name(),
                        b.name(),
                        self.stages.get(*a)
                    )));
                }
            }
        }
        if self.document_extension.trim_start_matches('.').is_empty() {
            return Err(TrackError::Config("document_extension is empty".to_string()));
        }
        if self.draft_extension.trim_start_matches('.').is_empty() {
            return Err(TrackError::Config("draft_extension is empty".to_string()));
        }
        Ok(())
    }

    /// File extension of artifacts in `stage`, without the leading dot
    pub fn extension(&self, stage: Stage) -> &str {
        let extension = match stage {
            Stage::Drafted => &self.draft_extension,
            _ => &self.document_extension,
        };
        extension.trim_start_matches('.')
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(&self.ledger)
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.root.join(&self.dashboard)
    }

    /// Stage directory relative to the root, forward slashes, no trailing slash
    pub fn stage_dir_relative(&self, stage: Stage) -> String {
        normalize_dir(self.stages.get(stage))
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(self.stage_dir_relative(stage))
    }
}

fn normalize_dir(dir: &str) -> String {
    dir.replace('\\', "/").trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::load(temp.path()).unwrap();
        assert_eq!(config.root, temp.path());
        assert_eq!(config.ledger, "job_applications.csv");
        assert_eq!(config.stage_dir_relative(Stage::Ready), "Resume/To_Apply");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_partial_config_overrides() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            "ledger = \"apps.csv\"\n\n[stages]\napplied = \"Out/Sent/\"\n",
        )
        .unwrap();

        let config = TrackerConfig::load(temp.path()).unwrap();
        assert_eq!(config.ledger_path(), temp.path().join("apps.csv"));
        assert_eq!(config.stage_dir_relative(Stage::Applied), "Out/Sent");
        assert_eq!(config.stage_dir_relative(Stage::Skipped), "Resume/Skipped");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let mut config = TrackerConfig::with_root(temp.path());
        config.server.port = 9100;
        config.save().unwrap();

        let loaded = TrackerConfig::load(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_drafts_use_their_own_extension() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::load(temp.path()).unwrap();
        assert_eq!(config.extension(Stage::Drafted), "html");
        assert_eq!(config.extension(Stage::Ready), "pdf");

        std::fs::write(temp.path().join(CONFIG_FILE), "draft_extension = \"\"\n").unwrap();
        assert!(matches!(
            TrackerConfig::load(temp.path()),
            Err(TrackError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_shared_stage_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            "[stages]\napplied = \"Resume/To_Apply\"\n",
        )
        .unwrap();

        let err = TrackerConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, TrackError::Config(_)));
    }
}
