// Batch input loading
//
// A batch is a directory of `*.json` record files, or a single file. Each file
// holds a JSON array of row objects. Files that fail to decode are reported
// and skipped; the rest of the batch still loads.
use crate::manifest::fingerprint;
use crate::StorageError;
use anyhow::{Context, Result};
use semtab_core::Record;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One decoded input file
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    /// File stem
    pub table_name: String,
    /// SHA-256 of the raw file contents
    pub sha256: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone)]
pub struct DecodeFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct Batch {
    pub tables: Vec<LoadedTable>,
    pub failures: Vec<DecodeFailure>,
}

/// Input files of a batch, sorted by path
pub fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(StorageError::InputNotFound(input.to_path_buf()).into());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)
        .with_context(|| format!("Failed to list {}", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Decode a record file: a JSON array of objects
pub fn decode_records(path: &Path, data: &[u8]) -> std::result::Result<Vec<Record>, StorageError> {
    let value: Value = serde_json::from_slice(data).map_err(|e| StorageError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Value::Array(rows) = value else {
        return Err(StorageError::Decode {
            path: path.to_path_buf(),
            reason: "expected a JSON array of row objects".to_string(),
        });
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(map) => Ok(map.into_iter().collect::<Record>()),
            other => Err(StorageError::Decode {
                path: path.to_path_buf(),
                reason: format!("row {} is not an object: {}", index, other),
            }),
        })
        .collect()
}

pub fn load_table(path: &Path) -> Result<LoadedTable> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records = decode_records(path, &data)?;
    let table_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();

    Ok(LoadedTable {
        path: path.to_path_buf(),
        table_name,
        sha256: fingerprint(&data),
        records,
    })
}

/// Load every input, collecting per-file failures instead of stopping
pub fn load_batch(input: &Path) -> Result<Batch> {
    let mut batch = Batch::default();
    for path in discover_inputs(input)? {
        match load_table(&path) {
            Ok(table) => {
                debug!(path = %path.display(), rows = table.records.len(), "Input loaded");
                batch.tables.push(table);
            }
            Err(e) => {
                warn!(path = %path.display(), err = %e, "Skipping undecodable input");
                batch.failures.push(DecodeFailure {
                    path,
                    error: format!("{:#}", e),
                });
            }
        }
    }
    Ok(batch)
}
