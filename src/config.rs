// Run settings: a JSON file with serde defaults, then CLI overrides
use anyhow::{Context, Result};
use semtab_annotate::AnnotatorConfig;
use semtab_lookup::LookupConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print stage files
    pub pretty: bool,
    /// Write a per-table `explain.json` with per-heuristic scores
    pub explain: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            explain: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub lookup: LookupConfig,
    pub annotator: AnnotatorConfig,
    pub output: OutputConfig,
    /// Regex detectors for literal values the NER model leaves unlabeled
    pub literal_patterns: bool,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.lookup.validate().context("Invalid lookup settings")?;
        self.annotator.validate().context("Invalid annotator settings")?;
        Ok(())
    }
}
