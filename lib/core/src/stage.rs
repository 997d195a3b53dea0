//! Pipeline stages and the sink that persists them

use crate::{Result, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Checkpoints of the annotation pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Cleaned,
    Labeled,
    Classified,
    SubjectIdentified,
    CandidatesFound,
    EntitiesRanked,
    CellsAnnotated,
    ClassesRanked,
    ColumnsAnnotated,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Cleaned,
        Stage::Labeled,
        Stage::Classified,
        Stage::SubjectIdentified,
        Stage::CandidatesFound,
        Stage::EntitiesRanked,
        Stage::CellsAnnotated,
        Stage::ClassesRanked,
        Stage::ColumnsAnnotated,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Cleaned => "cleaned",
            Stage::Labeled => "labeled",
            Stage::Classified => "classified",
            Stage::SubjectIdentified => "subject_identified",
            Stage::CandidatesFound => "candidates_found",
            Stage::EntitiesRanked => "entities_ranked",
            Stage::CellsAnnotated => "cells_annotated",
            Stage::ClassesRanked => "classes_ranked",
            Stage::ColumnsAnnotated => "columns_annotated",
        }
    }

    /// Position in the pipeline, starting at 1
    pub fn ordinal(&self) -> usize {
        *self as usize + 1
    }

    /// Render the view belonging to this stage
    pub fn render(&self, table: &Table) -> Result<Value> {
        let value = match self {
            Stage::Cleaned => serde_json::to_value(table.cleared_records())?,
            Stage::Labeled => serde_json::to_value(table.labels_view())?,
            Stage::Classified | Stage::SubjectIdentified => {
                serde_json::to_value(table.column_types_view())?
            }
            Stage::CandidatesFound => serde_json::to_value(table.candidate_uris_view())?,
            Stage::EntitiesRanked => serde_json::to_value(table.entity_scores_view())?,
            Stage::CellsAnnotated => serde_json::to_value(table.cell_annotations_view())?,
            Stage::ClassesRanked => serde_json::to_value(table.class_scores_view())?,
            Stage::ColumnsAnnotated => serde_json::to_value(table.column_annotations_view())?,
        };
        Ok(value)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the table after each completed stage
pub trait StageSink: Send + Sync {
    fn persist(&self, table: &Table, stage: Stage) -> std::result::Result<(), SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Cleaned.ordinal(), 1);
        assert_eq!(Stage::ColumnsAnnotated.ordinal(), 9);
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }
}
