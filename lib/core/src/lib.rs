//! # semtab Core
//!
//! Core data model for semantic table annotation.
//!
//! - [`Table`] - rectangular, fixed-shape set of columns
//! - [`Column`] - header, cells, column type, candidate classes, annotation
//! - [`Cell`] - source/cleared value, labels, candidate entities, annotation
//! - [`Candidate`] - knowledge-graph resource with per-heuristic scores
//!
//! Mutable annotation fields are write-once: each pipeline stage sets the
//! fields it owns and later stages only read them.
//!
//! ## Example
//!
//! ```rust
//! use semtab_core::{Table, Record, ColumnType};
//! use serde_json::json;
//!
//! let rows: Vec<Record> = vec![
//!     serde_json::from_value(json!({"Name": "Paris", "Age": "5"})).unwrap(),
//!     serde_json::from_value(json!({"Name": "Lyon", "Age": "3"})).unwrap(),
//! ];
//! let mut table = Table::from_records("cities", &rows).unwrap();
//! assert_eq!(table.rows_number(), 2);
//!
//! table.columns_mut()[0].classify(ColumnType::Categorical).unwrap();
//! table.set_subject_column(0).unwrap();
//! assert_eq!(table.subject_column_index(), Some(0));
//! ```

pub mod error;
pub mod label;
pub mod clean;
pub mod candidate;
pub mod cell;
pub mod column;
pub mod table;
pub mod views;
pub mod stage;

pub use error::{Error, Result};
pub use label::{Label, LabelSet};
pub use candidate::{
    Candidate, CandidateClass, CandidateEntity, ClassScoreKind, ClassScores, EntityScoreKind,
    EntityScores, ScoreSheet,
};
pub use cell::Cell;
pub use column::{Column, ColumnType};
pub use table::{ClearedRecord, Record, Table};
pub use stage::{SinkError, Stage, StageSink};
