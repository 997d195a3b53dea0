//! Serialization views
//!
//! Pure projections of a table's current annotation state, one per pipeline
//! stage. None of these mutate the table.

use crate::{
    CandidateClass, CandidateEntity, ClearedRecord, ColumnType, LabelSet, Table,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnLabels<'a> {
    pub header: &'a str,
    pub labels: Vec<Option<&'a LabelSet>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnTypeEntry<'a> {
    pub index: usize,
    pub header: &'a str,
    pub column_type: Option<ColumnType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnCandidateUris<'a> {
    pub header: &'a str,
    /// Candidate URIs per row; `None` where no lookup happened
    pub cells: Vec<Option<Vec<&'a str>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellEntityScores<'a> {
    pub row: usize,
    pub mention: &'a str,
    pub candidates: &'a [CandidateEntity],
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnEntityScores<'a> {
    pub header: &'a str,
    pub cells: Vec<CellEntityScores<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnCellAnnotations<'a> {
    pub header: &'a str,
    pub annotations: Vec<Option<&'a str>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnClassScores<'a> {
    pub header: &'a str,
    pub candidates: &'a [CandidateClass],
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnAnnotation<'a> {
    pub index: usize,
    pub header: &'a str,
    pub column_type: Option<ColumnType>,
    pub annotation: Option<&'a str>,
}

impl Table {
    /// Rows of cleared values, keyed by header in column order
    pub fn cleared_records(&self) -> Vec<ClearedRecord> {
        (0..self.rows_number())
            .map(|row| {
                self.columns()
                    .iter()
                    .map(|column| {
                        let value = column.cells()[row].cleared_value().map(str::to_string);
                        (column.header_name().to_string(), value)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn labels_view(&self) -> Vec<ColumnLabels<'_>> {
        self.columns()
            .iter()
            .map(|column| ColumnLabels {
                header: column.header_name(),
                labels: column.cells().iter().map(|c| c.label()).collect(),
            })
            .collect()
    }

    pub fn column_types_view(&self) -> Vec<ColumnTypeEntry<'_>> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(index, column)| ColumnTypeEntry {
                index,
                header: column.header_name(),
                column_type: column.column_type(),
            })
            .collect()
    }

    pub fn candidate_uris_view(&self) -> Vec<ColumnCandidateUris<'_>> {
        self.columns()
            .iter()
            .filter(|column| column.is_categorical())
            .map(|column| ColumnCandidateUris {
                header: column.header_name(),
                cells: column
                    .cells()
                    .iter()
                    .map(|cell| {
                        cell.candidate_entities()
                            .map(|cands| cands.iter().map(|c| c.uri.as_str()).collect())
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn entity_scores_view(&self) -> Vec<ColumnEntityScores<'_>> {
        self.columns()
            .iter()
            .filter(|column| column.is_categorical())
            .map(|column| ColumnEntityScores {
                header: column.header_name(),
                cells: column
                    .cells()
                    .iter()
                    .enumerate()
                    .filter_map(|(row, cell)| {
                        Some(CellEntityScores {
                            row,
                            mention: cell.cleared_value()?,
                            candidates: cell.candidate_entities()?,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn cell_annotations_view(&self) -> Vec<ColumnCellAnnotations<'_>> {
        self.columns()
            .iter()
            .filter(|column| column.is_categorical())
            .map(|column| ColumnCellAnnotations {
                header: column.header_name(),
                annotations: column.cells().iter().map(|c| c.annotation()).collect(),
            })
            .collect()
    }

    pub fn class_scores_view(&self) -> Vec<ColumnClassScores<'_>> {
        self.columns()
            .iter()
            .filter_map(|column| {
                Some(ColumnClassScores {
                    header: column.header_name(),
                    candidates: column.candidate_classes()?,
                })
            })
            .collect()
    }

    pub fn column_annotations_view(&self) -> Vec<ColumnAnnotation<'_>> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(index, column)| ColumnAnnotation {
                index,
                header: column.header_name(),
                column_type: column.column_type(),
                annotation: column.annotation(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Candidate, Label, Record};
    use serde_json::json;

    fn table() -> Table {
        let rows: Vec<Record> = vec![
            serde_json::from_value(json!({"City": " Paris ", "Pop": "2100000"})).unwrap(),
            serde_json::from_value(json!({"City": "", "Pop": null})).unwrap(),
        ];
        Table::from_records("t", &rows).unwrap()
    }

    #[test]
    fn test_cleared_records_round_trip() {
        let table = table();
        let records = table.cleared_records();
        assert_eq!(records[0]["City"], Some("Paris".to_string()));
        assert_eq!(records[1]["City"], None);

        let reloaded = Table::from_cleared_records("t", &records).unwrap();
        for (a, b) in table.columns().iter().zip(reloaded.columns()) {
            assert_eq!(a.header_name(), b.header_name());
            for (x, y) in a.cells().iter().zip(b.cells()) {
                assert_eq!(x.cleared_value(), y.cleared_value());
            }
        }
    }

    #[test]
    fn test_views_follow_state() {
        let mut table = table();
        table.cell_mut(0, 0).unwrap().set_label(LabelSet::single(Label::Gpe)).unwrap();
        table.columns_mut()[0].classify(ColumnType::Categorical).unwrap();
        table.columns_mut()[1].classify(ColumnType::Literal).unwrap();
        table
            .cell_mut(0, 0)
            .unwrap()
            .set_candidate_entities(vec![Candidate::new("ex:Paris", "Paris", "")])
            .unwrap();

        let labels = serde_json::to_value(table.labels_view()).unwrap();
        assert_eq!(labels[0]["labels"][0], json!(["GPE"]));
        assert!(labels[0]["labels"][1].is_null());

        let types = serde_json::to_value(table.column_types_view()).unwrap();
        assert_eq!(types[1]["column_type"], "LITERAL");

        let uris = table.candidate_uris_view();
        assert_eq!(uris.len(), 1);
        assert_eq!(uris[0].cells[0], Some(vec!["ex:Paris"]));
        assert_eq!(uris[0].cells[1], None);

        let scores = table.entity_scores_view();
        assert_eq!(scores[0].cells.len(), 1);
        assert_eq!(scores[0].cells[0].mention, "Paris");
    }
}
