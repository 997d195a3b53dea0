// Stage persistence: one JSON file per pipeline stage per table
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use semtab_core::{SinkError, Stage, StageSink, Table};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const TABLE_FILE: &str = "table.json";

/// Writes intermediate and final table state under `<root>/<table>/`.
///
/// Stage files are named `<NN>_<stage>.json` so a directory listing reads in
/// pipeline order.
pub struct StageStore {
    root: PathBuf,
    pretty: bool,
}

impl StageStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create output directory {}", root.display()))?;
        Ok(Self { root, pretty: true })
    }

    /// Compact JSON instead of pretty-printed
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one table
    pub fn table_dir(&self, table_name: &str) -> PathBuf {
        self.root.join(sanitize(table_name))
    }

    pub fn stage_path(&self, table_name: &str, stage: Stage) -> PathBuf {
        self.table_dir(table_name)
            .join(format!("{:02}_{}.json", stage.ordinal(), stage.name()))
    }

    /// Render and write the view of one stage
    pub fn write_stage(&self, table: &Table, stage: Stage) -> Result<PathBuf> {
        let view = stage
            .render(table)
            .with_context(|| format!("Failed to render stage {}", stage))?;
        let path = self.stage_path(table.table_name(), stage);
        self.write_file(&path, &view)?;
        debug!(table = table.table_name(), %stage, path = %path.display(), "Stage written");
        Ok(path)
    }

    /// Full table state, reloadable with [`StageStore::load_table`]
    pub fn write_table(&self, table: &Table) -> Result<PathBuf> {
        let path = self.table_dir(table.table_name()).join(TABLE_FILE);
        self.write_file(&path, table)?;
        Ok(path)
    }

    /// Any serializable companion document, e.g. a score breakdown
    pub fn write_document<T: Serialize>(&self, table_name: &str, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.table_dir(table_name).join(format!("{}.json", sanitize(name)));
        self.write_file(&path, value)?;
        Ok(path)
    }

    pub fn load_table(&self, table_name: &str) -> Result<Option<Table>> {
        let path = self.table_dir(table_name).join(TABLE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let table: Table = serde_json::from_slice(&data)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        Ok(Some(table))
    }

    /// Stages already written for a table, in pipeline order
    pub fn written_stages(&self, table_name: &str) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.stage_path(table_name, *stage).exists())
            .collect()
    }

    pub fn write_file<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("Path {} has no parent directory", path.display()))?;
        fs::create_dir_all(parent)?;

        let data = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };

        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(&data))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

impl StageSink for StageStore {
    fn persist(&self, table: &Table, stage: Stage) -> std::result::Result<(), SinkError> {
        self.write_stage(table, stage)?;
        if stage == Stage::ColumnsAnnotated {
            self.write_table(table)?;
        }
        Ok(())
    }
}

/// File-system safe form of a table or document name
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "table".to_string()
    } else {
        cleaned
    }
}
