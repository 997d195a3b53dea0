//! Subject column identification
//!
//! Every categorical column is scored on five features:
//!
//! - `ucf`: distinct cleared values / rows
//! - `awn`: mean words per non-empty cell, rescaled to `threshold / awn` when
//!   above the threshold
//! - `ecf`: empty cells / rows
//! - `cfa`: cells containing an acronym / rows
//! - `hpn`: 1 when the header is a preposition
//!
//! and damped by `sqrt(dfc + 1)`, where `dfc` counts the categorical columns
//! to its left. The strictly greatest score wins, so the leftmost column
//! keeps ties.

use crate::{AnnotateError, Result};
use ahash::AHashSet;
use rayon::prelude::*;
use regex::Regex;
use semtab_core::{Column, Error, Table};
use semtab_similarity::{first_max_index, SubjectWeights};
use serde::Serialize;
use tracing::{info, warn};

const PREPOSITIONS: &[&str] = &[
    "aboard", "about", "above", "across", "after", "against", "along", "amid", "among", "around",
    "as", "at", "before", "behind", "below", "beneath", "beside", "besides", "between", "beyond",
    "but", "by", "concerning", "despite", "down", "during", "except", "for", "from", "in",
    "inside", "into", "like", "near", "of", "off", "on", "onto", "opposite", "out", "outside",
    "over", "past", "per", "regarding", "since", "than", "through", "throughout", "till", "to",
    "toward", "towards", "under", "underneath", "unlike", "until", "up", "upon", "versus", "via",
    "with", "within", "without",
];

/// Raw feature values of one categorical column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubjectFeatures {
    pub ucf: f64,
    pub awn: f64,
    pub ecf: f64,
    pub cfa: f64,
    pub hpn: f64,
    pub dfc: usize,
}

impl SubjectFeatures {
    pub fn score(&self, weights: &SubjectWeights) -> f64 {
        let positive = weights.ucf * self.ucf + weights.awn * self.awn;
        let negative = weights.ecf * self.ecf + weights.cfa * self.cfa + weights.hpn * self.hpn;
        (positive - negative) / ((self.dfc + 1) as f64).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnScore {
    pub column: usize,
    pub header: String,
    pub features: SubjectFeatures,
    pub score: f64,
}

/// Result of subject identification; never an error on its own
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubjectOutcome {
    /// Column chosen by the caller
    Forced { column: usize },
    /// Subject left over from an earlier run
    Kept { column: usize },
    Identified {
        column: usize,
        score: f64,
        candidates: Vec<ColumnScore>,
    },
    NoCategoricalColumns,
}

impl SubjectOutcome {
    pub fn column(&self) -> Option<usize> {
        match self {
            SubjectOutcome::Forced { column }
            | SubjectOutcome::Kept { column }
            | SubjectOutcome::Identified { column, .. } => Some(*column),
            SubjectOutcome::NoCategoricalColumns => None,
        }
    }
}

pub struct SubjectIdentifier {
    weights: SubjectWeights,
    awn_threshold: f64,
    acronym: Regex,
}

impl SubjectIdentifier {
    pub fn new(weights: SubjectWeights, awn_threshold: f64) -> Result<Self> {
        weights.validate()?;
        if !awn_threshold.is_finite() || awn_threshold <= 0.0 {
            return Err(AnnotateError::InvalidConfig(
                "awn_threshold must be positive".to_string(),
            ));
        }
        let acronym = Regex::new(r"[A-Z][A-Z.]+")
            .map_err(|e| AnnotateError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            weights,
            awn_threshold,
            acronym,
        })
    }

    /// Pick the subject column, or force `override_index` when given.
    ///
    /// An out-of-range override is a bounds error.
    pub fn identify(&self, table: &mut Table, override_index: Option<usize>) -> Result<SubjectOutcome> {
        if let Some(index) = override_index {
            if index >= table.columns_number() {
                return Err(Error::ColumnOutOfBounds {
                    index,
                    len: table.columns_number(),
                }
                .into());
            }
            table.force_subject_column(index)?;
            info!(table = table.table_name(), column = index, "Subject column forced");
            return Ok(SubjectOutcome::Forced { column: index });
        }

        let candidates = self.score_columns(table);
        let Some(best) = first_max_index(candidates.iter().map(|c| c.score)) else {
            warn!(table = table.table_name(), "No categorical column, no subject assigned");
            return Ok(SubjectOutcome::NoCategoricalColumns);
        };

        let column = candidates[best].column;
        let score = candidates[best].score;
        table.set_subject_column(column)?;
        info!(
            table = table.table_name(),
            column,
            header = %candidates[best].header,
            score,
            "Subject column identified"
        );
        Ok(SubjectOutcome::Identified {
            column,
            score,
            candidates,
        })
    }

    /// Scores of every categorical column, left to right
    pub fn score_columns(&self, table: &Table) -> Vec<ColumnScore> {
        let rows = table.rows_number();
        let categorical: Vec<(usize, &Column)> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_categorical())
            .collect();

        categorical
            .par_iter()
            .enumerate()
            .map(|(dfc, (index, column))| {
                let features = self.features(column, rows, dfc);
                ColumnScore {
                    column: *index,
                    header: column.header_name().to_string(),
                    features,
                    score: features.score(&self.weights),
                }
            })
            .collect()
    }

    pub fn features(&self, column: &Column, rows: usize, dfc: usize) -> SubjectFeatures {
        let values: Vec<&str> = column.cells().iter().filter_map(|c| c.cleared_value()).collect();
        let fraction = |count: usize| {
            if rows == 0 {
                0.0
            } else {
                count as f64 / rows as f64
            }
        };

        let distinct: AHashSet<&str> = values.iter().copied().collect();
        let empty = rows.saturating_sub(values.len());
        let acronyms = values.iter().filter(|v| self.acronym.is_match(v)).count();

        let awn = if values.is_empty() {
            0.0
        } else {
            let words: usize = values.iter().map(|v| v.split_whitespace().count()).sum();
            let mean = words as f64 / values.len() as f64;
            if mean > self.awn_threshold {
                self.awn_threshold / mean
            } else {
                mean
            }
        };

        SubjectFeatures {
            ucf: fraction(distinct.len()),
            awn,
            ecf: fraction(empty),
            cfa: fraction(acronyms),
            hpn: if is_preposition(column.header_name()) { 1.0 } else { 0.0 },
            dfc,
        }
    }
}

pub fn is_preposition(header: &str) -> bool {
    let header = header.trim().to_lowercase();
    PREPOSITIONS.contains(&header.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semtab_core::{Cell, ColumnType};

    fn column(header: &str, values: &[Option<&str>], column_type: ColumnType) -> Column {
        let cells = values
            .iter()
            .map(|v| Cell::from_cleared(v.map(str::to_string)))
            .collect();
        let mut column = Column::new(header, cells);
        column.classify(column_type).unwrap();
        column
    }

    fn identifier() -> SubjectIdentifier {
        SubjectIdentifier::new(SubjectWeights::default(), 10.0).unwrap()
    }

    #[test]
    fn test_features() {
        let col = column(
            "Name",
            &[Some("Paris"), Some("Paris"), Some("New York NY"), None],
            ColumnType::Categorical,
        );
        let f = identifier().features(&col, 4, 0);
        assert_eq!(f.ucf, 0.5);
        assert!((f.awn - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(f.ecf, 0.25);
        assert_eq!(f.cfa, 0.25);
        assert_eq!(f.hpn, 0.0);
    }

    #[test]
    fn test_verbose_column_penalized() {
        let text = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty";
        let col = column("Notes", &[Some(text)], ColumnType::Categorical);
        let f = identifier().features(&col, 1, 0);
        assert_eq!(f.awn, 0.5);
    }

    #[test]
    fn test_zero_rows() {
        let col = column("Name", &[], ColumnType::Categorical);
        let f = identifier().features(&col, 0, 0);
        assert_eq!(f.ucf, 0.0);
        assert_eq!(f.ecf, 0.0);
        assert_eq!(f.awn, 0.0);
    }

    #[test]
    fn test_preposition_header() {
        assert!(is_preposition(" Of "));
        assert!(is_preposition("FROM"));
        assert!(!is_preposition("Name"));
    }

    #[test]
    fn test_score_formula() {
        let f = SubjectFeatures {
            ucf: 1.0,
            awn: 1.0,
            ecf: 0.0,
            cfa: 0.0,
            hpn: 0.0,
            dfc: 3,
        };
        assert_eq!(f.score(&SubjectWeights::default()), 1.5);
    }

    #[test]
    fn test_identical_columns_leftmost_wins() {
        let values = [Some("Paris"), Some("Lyon")];
        let mut table = Table::new(
            "t",
            vec![
                column("Age", &[Some("5"), Some("3")], ColumnType::Literal),
                column("A", &values, ColumnType::Categorical),
                column("B", &values, ColumnType::Categorical),
            ],
        )
        .unwrap();

        let outcome = identifier().identify(&mut table, None).unwrap();
        // B has the same features but sits further right
        assert_eq!(outcome.column(), Some(1));
        assert_eq!(table.subject_column_index(), Some(1));
        assert_eq!(table.column(2).unwrap().column_type(), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_repeated_runs_agree() {
        let build = || {
            Table::new(
                "t",
                vec![
                    column("X", &[Some("a b"), Some("c")], ColumnType::Categorical),
                    column("Y", &[Some("a"), Some("a")], ColumnType::Categorical),
                ],
            )
            .unwrap()
        };
        let first = identifier().identify(&mut build(), None).unwrap().column();
        for _ in 0..5 {
            assert_eq!(identifier().identify(&mut build(), None).unwrap().column(), first);
        }
    }

    #[test]
    fn test_no_categorical_columns() {
        let mut table = Table::new(
            "t",
            vec![column("Age", &[Some("5")], ColumnType::Literal)],
        )
        .unwrap();
        let outcome = identifier().identify(&mut table, None).unwrap();
        assert!(matches!(outcome, SubjectOutcome::NoCategoricalColumns));
        assert_eq!(table.subject_column_index(), None);
    }

    #[test]
    fn test_override_forces_any_column() {
        let mut table = Table::new(
            "t",
            vec![
                column("Name", &[Some("Paris")], ColumnType::Categorical),
                column("Age", &[Some("5")], ColumnType::Literal),
                column("Country", &[Some("France")], ColumnType::Categorical),
            ],
        )
        .unwrap();
        let outcome = identifier().identify(&mut table, Some(1)).unwrap();
        assert!(matches!(outcome, SubjectOutcome::Forced { column: 1 }));
        assert_eq!(table.subject_column_index(), Some(1));
    }

    #[test]
    fn test_override_out_of_range() {
        let mut table = Table::new(
            "t",
            vec![column("Name", &[Some("Paris")], ColumnType::Categorical)],
        )
        .unwrap();
        let err = identifier().identify(&mut table, Some(3)).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::Core(Error::ColumnOutOfBounds { index: 3, len: 1 })
        ));
    }
}
