//! Artifact Locator
//!
//! Maps artifact identities to files inside stage directories and relocates
//! them. Paths read back from the ledger may carry `../` prefixes or Windows
//! separators, so everything here works on base names.

use crate::config::TrackerConfig;
use crate::error::TrackResult;
use crate::models::Stage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Result of a relocation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file now lives in the destination directory
    Moved,
    /// No file at the source location; nothing was touched
    NotFound,
}

/// Normalize a human label into an identity: lowercase, whitespace and `_`
/// become `-`, anything outside `[a-z0-9.-]` is dropped
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '.')
        .collect()
}

/// Last path segment, splitting on both `/` and `\`
pub fn file_basename(path: &str) -> &str {
    path.trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}

/// Strip a trailing `.ext` when it looks like a file extension (letters only)
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            stem
        }
        _ => name,
    }
}

/// Identity encoded in a stored path: base name without extension and prefix
pub fn identity_from_path(path: &str, prefix: &str) -> Option<String> {
    let stem = strip_extension(file_basename(path));
    let identity = stem.strip_prefix(prefix).unwrap_or(stem);
    if identity.is_empty() {
        None
    } else {
        Some(identity.to_string())
    }
}

/// Resolves and relocates artifact files under the configured stage directories
pub struct ArtifactLocator<'a> {
    config: &'a TrackerConfig,
}

impl<'a> ArtifactLocator<'a> {
    pub fn new(config: &'a TrackerConfig) -> Self {
        Self { config }
    }

    /// Turn a caller-supplied reference into an identity. File names and paths
    /// are decoded as stored; bare labels are normalized.
    pub fn identity_for_reference(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        let looks_like_file = reference.contains(['/', '\\'])
            || reference.starts_with(self.config.file_prefix.as_str())
            || strip_extension(reference) != reference;

        let identity = if looks_like_file {
            identity_from_path(reference, &self.config.file_prefix)?
        } else {
            normalize_label(reference)
        };

        if identity.is_empty() {
            None
        } else {
            Some(identity)
        }
    }

    /// File name of an artifact while it sits in `stage`
    pub fn file_name(&self, identity: &str, stage: Stage) -> String {
        format!(
            "{}{}.{}",
            self.config.file_prefix,
            identity,
            self.config.extension(stage)
        )
    }

    /// Absolute location of an artifact in a stage; same inputs, same path
    pub fn resolve(&self, identity: &str, stage: Stage) -> PathBuf {
        self.config.stage_dir(stage).join(self.file_name(identity, stage))
    }

    /// Ledger form of [`resolve`](Self::resolve): relative to the root, forward slashes
    pub fn relative_path(&self, identity: &str, stage: Stage) -> String {
        format!(
            "{}/{}",
            self.config.stage_dir_relative(stage),
            self.file_name(identity, stage)
        )
    }

    /// Stage directory currently holding the artifact, if any
    pub fn locate(&self, identity: &str) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| self.resolve(identity, *stage).is_file())
    }

    /// Another stage directory holding the artifact in the file kind `stage`
    /// expects; a draft never stands in for a final document
    pub fn locate_like(&self, identity: &str, stage: Stage) -> Option<Stage> {
        let extension = self.config.extension(stage);
        Stage::ALL
            .into_iter()
            .filter(|other| *other != stage && self.config.extension(*other) == extension)
            .find(|other| self.resolve(identity, *other).is_file())
    }

    /// Relocate an artifact between stage directories. A missing source is
    /// reported as [`MoveOutcome::NotFound`], not as an error.
    pub fn move_artifact(&self, identity: &str, from: Stage, to: Stage) -> TrackResult<MoveOutcome> {
        let src = self.resolve(identity, from);
        if from == to {
            return Ok(if src.is_file() {
                MoveOutcome::Moved
            } else {
                MoveOutcome::NotFound
            });
        }
        self.move_path(&src, identity, to)
    }

    /// Relocate an arbitrary file into the canonical location for `to`
    pub fn move_path(&self, src: &Path, identity: &str, to: Stage) -> TrackResult<MoveOutcome> {
        if !src.is_file() {
            tracing::debug!(path = %src.display(), "source file absent");
            return Ok(MoveOutcome::NotFound);
        }
        let extension = self.config.extension(to);
        if !src
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(extension))
        {
            tracing::debug!(path = %src.display(), stage = %to, "not a {} file, left in place", extension);
            return Ok(MoveOutcome::NotFound);
        }

        let dst = self.resolve(identity, to);
        if src == dst {
            return Ok(MoveOutcome::Moved);
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        if dst.exists() {
            tracing::warn!(path = %dst.display(), "destination already exists, replacing it");
        }

        match fs::rename(src, &dst) {
            Ok(()) => {
                tracing::debug!(from = %src.display(), to = %dst.display(), "moved artifact");
                Ok(MoveOutcome::Moved)
            }
            Err(e) if e.kind() == ErrorKind::NotFound && !src.exists() => {
                Ok(MoveOutcome::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Artifact files of the stage's kind present in its directory, as
    /// `(identity, path)` pairs
    pub fn stage_files(&self, stage: Stage) -> Vec<(String, PathBuf)> {
        let dir = self.config.stage_dir(stage);
        let extension = self.config.extension(stage);

        let mut files: Vec<(String, PathBuf)> = walkdir::WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case(extension))
            })
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                identity_from_path(&name, &self.config.file_prefix)
                    .map(|identity| (identity, e.into_path()))
            })
            .collect();

        files.sort();
        files
    }
}
