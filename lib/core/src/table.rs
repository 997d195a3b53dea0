use crate::{Cell, Column, ColumnType, Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw input row: column name → value, in header order
pub type Record = IndexMap<String, Value>;

/// A cleared output row: column name → cleared value
pub type ClearedRecord = IndexMap<String, Option<String>>;

/// A rectangular table of columns of cells.
///
/// Shape is fixed at construction: columns cannot be added or removed and
/// every column has exactly `rows_number` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr")]
pub struct Table {
    table_name: String,
    columns: Vec<Column>,
    rows_number: usize,
    columns_number: usize,
}

#[derive(Deserialize)]
struct TableRepr {
    table_name: String,
    columns: Vec<Column>,
}

impl TryFrom<TableRepr> for Table {
    type Error = Error;

    fn try_from(repr: TableRepr) -> Result<Self> {
        Table::new(repr.table_name, repr.columns)
    }
}

impl Table {
    /// Build a table from columns, checking that it is rectangular
    pub fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::MissingHeader { column: 0 });
        }
        let rows_number = columns.first().map(Column::len).unwrap_or(0);

        for (index, column) in columns.iter().enumerate() {
            if column.header_name().trim().is_empty() {
                return Err(Error::MissingHeader { column: index });
            }
            if column.len() != rows_number {
                return Err(Error::ColumnLength {
                    column: column.header_name().to_string(),
                    expected: rows_number,
                    actual: column.len(),
                });
            }
        }

        Ok(Self {
            table_name: table_name.into(),
            columns_number: columns.len(),
            rows_number,
            columns,
        })
    }

    /// Build a table from raw row records, cleaning every value.
    ///
    /// One column per distinct key in first-seen order, one cell per row.
    /// Fails if the record set is empty, a header is blank, or a row lacks
    /// a key another row has.
    pub fn from_records(table_name: impl Into<String>, records: &[Record]) -> Result<Self> {
        Self::build(table_name, records, |value| {
            Cell::new(crate::clean::source_text(value))
        })
    }

    /// Build a table from already-cleared records without re-cleaning
    pub fn from_cleared_records(
        table_name: impl Into<String>,
        records: &[ClearedRecord],
    ) -> Result<Self> {
        Self::build(table_name, records, |value| Cell::from_cleared(value.clone()))
    }

    fn build<V>(
        table_name: impl Into<String>,
        records: &[IndexMap<String, V>],
        make_cell: impl Fn(&V) -> Cell,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyTable);
        }

        let mut headers: Vec<&str> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
        }

        let mut columns = Vec::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                return Err(Error::MissingHeader { column: index });
            }
            let mut cells = Vec::with_capacity(records.len());
            for (row, record) in records.iter().enumerate() {
                let value = record.get(*header).ok_or_else(|| Error::NonRectangular {
                    row,
                    column: header.to_string(),
                })?;
                cells.push(make_cell(value));
            }
            columns.push(Column::new(*header, cells));
        }

        Self::new(table_name, columns)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[inline]
    pub fn rows_number(&self) -> usize {
        self.rows_number
    }

    #[inline]
    pub fn columns_number(&self) -> usize {
        self.columns_number
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to columns; the slice keeps the column count fixed
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns.get(index).ok_or(Error::ColumnOutOfBounds {
            index,
            len: self.columns_number,
        })
    }

    pub fn column_mut(&mut self, index: usize) -> Result<&mut Column> {
        let len = self.columns_number;
        self.columns
            .get_mut(index)
            .ok_or(Error::ColumnOutOfBounds { index, len })
    }

    pub fn cell(&self, row: usize, column: usize) -> Result<&Cell> {
        self.column(column)?.cell(row)
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Result<&mut Cell> {
        self.column_mut(column)?.cell_mut(row)
    }

    /// Cells of one row, left to right
    pub fn row(&self, row: usize) -> Result<Vec<&Cell>> {
        self.columns.iter().map(|column| column.cell(row)).collect()
    }

    pub fn subject_column_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.column_type() == Some(ColumnType::Subject))
    }

    /// Make a categorical column the subject. Any previous subject reverts to
    /// categorical so at most one subject exists.
    pub fn set_subject_column(&mut self, index: usize) -> Result<()> {
        self.column(index)?;
        if !self.columns[index].is_categorical() {
            return Err(Error::LiteralSubject(
                self.columns[index].header_name().to_string(),
            ));
        }
        self.clear_other_subjects(index);
        self.columns[index].promote_to_subject()
    }

    /// Make any column the subject, whatever its current type
    pub fn force_subject_column(&mut self, index: usize) -> Result<()> {
        self.column(index)?;
        self.clear_other_subjects(index);
        self.columns[index].force_subject();
        Ok(())
    }

    fn clear_other_subjects(&mut self, keep: usize) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            if i != keep {
                column.demote_subject();
            }
        }
    }
}
