// Run manifest: what was annotated, from which input, and how it went
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Hex SHA-256 of raw input bytes
pub fn fingerprint(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Annotated,
    /// Input could not be decoded
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-form per-table summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<serde_json::Value>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub entries: Vec<ManifestEntry>,
}

impl Default for RunManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl RunManifest {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            entries: Vec::new(),
        }
    }

    pub fn record_annotated<R: Serialize>(
        &mut self,
        input: &Path,
        table_name: &str,
        sha256: &str,
        report: &R,
    ) {
        self.entries.push(ManifestEntry {
            input: input.to_path_buf(),
            table_name: Some(table_name.to_string()),
            sha256: Some(sha256.to_string()),
            status: EntryStatus::Annotated,
            error: None,
            report: serde_json::to_value(report).ok(),
            finished_at: Utc::now(),
        });
    }

    pub fn record_failed(&mut self, input: &Path, table_name: &str, sha256: &str, error: &str) {
        self.entries.push(ManifestEntry {
            input: input.to_path_buf(),
            table_name: Some(table_name.to_string()),
            sha256: Some(sha256.to_string()),
            status: EntryStatus::Failed,
            error: Some(error.to_string()),
            report: None,
            finished_at: Utc::now(),
        });
    }

    pub fn record_skipped(&mut self, input: &Path, error: &str) {
        self.entries.push(ManifestEntry {
            input: input.to_path_buf(),
            table_name: None,
            sha256: None,
            status: EntryStatus::Skipped,
            error: Some(error.to_string()),
            report: None,
            finished_at: Utc::now(),
        });
    }

    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Write `manifest.json` into `dir`, replacing any previous one
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(MANIFEST_FILE);
        let data = serde_json::to_vec_pretty(self)?;
        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(&data))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let data = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut manifest = RunManifest::new();
        manifest.record_annotated(Path::new("in/a.json"), "a", "00", &json!({"annotated_cells": 2}));
        manifest.record_failed(Path::new("in/b.json"), "b", "11", "empty table");
        manifest.record_skipped(Path::new("in/c.json"), "bad json");
        manifest.finish();

        manifest.write(dir.path()).unwrap();
        let loaded = RunManifest::load(dir.path()).unwrap();

        assert_eq!(loaded.entries.len(), 3);
        assert_eq!(loaded.count(EntryStatus::Annotated), 1);
        assert_eq!(loaded.count(EntryStatus::Failed), 1);
        assert_eq!(loaded.count(EntryStatus::Skipped), 1);
        assert_eq!(loaded.entries[0].report, Some(json!({"annotated_cells": 2})));
        assert!(loaded.finished_at.is_some());
    }
}
