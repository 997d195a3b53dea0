use crate::{CandidateClass, Cell, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a column in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// Holds named entities
    Categorical,
    /// Holds literal values (numbers, dates, ...)
    Literal,
    /// The single categorical column the table is about
    Subject,
}

impl ColumnType {
    /// Categorical and subject columns are annotated with entities
    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnType::Categorical | ColumnType::Subject)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Categorical => write!(f, "CATEGORICAL"),
            ColumnType::Literal => write!(f, "LITERAL"),
            ColumnType::Subject => write!(f, "SUBJECT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    header_name: String,
    cells: Vec<Cell>,
    #[serde(default)]
    column_type: Option<ColumnType>,
    #[serde(default)]
    candidate_classes: Option<Vec<CandidateClass>>,
    #[serde(default)]
    annotation: Option<String>,
}

impl Column {
    #[inline]
    #[must_use]
    pub fn new(header_name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            header_name: header_name.into(),
            cells,
            column_type: None,
            candidate_classes: None,
            annotation: None,
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable access to cells; the slice keeps the row count fixed
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, row: usize) -> Result<&Cell> {
        let len = self.cells.len();
        self.cells.get(row).ok_or(Error::RowOutOfBounds { index: row, len })
    }

    pub fn cell_mut(&mut self, row: usize) -> Result<&mut Cell> {
        let len = self.cells.len();
        self.cells.get_mut(row).ok_or(Error::RowOutOfBounds { index: row, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }

    #[inline]
    pub fn is_categorical(&self) -> bool {
        self.column_type.is_some_and(|t| t.is_categorical())
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        self.column_type == Some(ColumnType::Literal)
    }

    /// Assign CATEGORICAL or LITERAL.
    ///
    /// Re-classifying with the same outcome is a no-op; a subject column stays
    /// subject.
    pub fn classify(&mut self, column_type: ColumnType) -> Result<()> {
        match (self.column_type, column_type) {
            (None, _) => self.column_type = Some(column_type),
            (Some(current), requested) if current == requested => {}
            (Some(ColumnType::Subject), _) => {}
            (Some(current), requested) => {
                return Err(Error::ColumnTypeConflict {
                    column: self.header_name.clone(),
                    current: current.to_string(),
                    requested: requested.to_string(),
                })
            }
        }
        Ok(())
    }

    /// CATEGORICAL → SUBJECT. A literal column is never promoted.
    pub(crate) fn promote_to_subject(&mut self) -> Result<()> {
        match self.column_type {
            Some(ColumnType::Categorical) | Some(ColumnType::Subject) => {
                self.column_type = Some(ColumnType::Subject);
                Ok(())
            }
            _ => Err(Error::LiteralSubject(self.header_name.clone())),
        }
    }

    pub(crate) fn force_subject(&mut self) {
        self.column_type = Some(ColumnType::Subject);
    }

    pub(crate) fn demote_subject(&mut self) {
        if self.column_type == Some(ColumnType::Subject) {
            self.column_type = Some(ColumnType::Categorical);
        }
    }

    pub fn candidate_classes(&self) -> Option<&[CandidateClass]> {
        self.candidate_classes.as_deref()
    }

    pub fn candidate_classes_mut(&mut self) -> Option<&mut Vec<CandidateClass>> {
        self.candidate_classes.as_mut()
    }

    pub fn set_candidate_classes(&mut self, candidates: Vec<CandidateClass>) -> Result<()> {
        if self.candidate_classes.is_some() {
            return Err(Error::CandidatesAlreadySet);
        }
        self.candidate_classes = Some(candidates);
        Ok(())
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn set_annotation(&mut self, uri: impl Into<String>) -> Result<()> {
        if let Some(existing) = &self.annotation {
            return Err(Error::AnnotationAlreadySet(existing.clone()));
        }
        self.annotation = Some(uri.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Column {
        Column::new("Name", vec![Cell::new(Some("Paris".into())), Cell::new(None)])
    }

    #[test]
    fn test_classify_idempotent() {
        let mut col = column();
        col.classify(ColumnType::Categorical).unwrap();
        col.classify(ColumnType::Categorical).unwrap();
        assert_eq!(col.column_type(), Some(ColumnType::Categorical));
        assert!(col.classify(ColumnType::Literal).is_err());
    }

    #[test]
    fn test_subject_survives_reclassification() {
        let mut col = column();
        col.classify(ColumnType::Categorical).unwrap();
        col.promote_to_subject().unwrap();
        col.classify(ColumnType::Categorical).unwrap();
        assert_eq!(col.column_type(), Some(ColumnType::Subject));
    }

    #[test]
    fn test_literal_never_promoted() {
        let mut col = column();
        col.classify(ColumnType::Literal).unwrap();
        assert!(matches!(col.promote_to_subject(), Err(Error::LiteralSubject(_))));
        col.force_subject();
        assert_eq!(col.column_type(), Some(ColumnType::Subject));
    }

    #[test]
    fn test_row_bounds() {
        let col = column();
        assert!(col.cell(1).is_ok());
        assert_eq!(col.cell(2).unwrap_err(), Error::RowOutOfBounds { index: 2, len: 2 });
    }
}
