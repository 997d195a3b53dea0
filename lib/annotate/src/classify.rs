//! Column classification from per-cell labels

use crate::Result;
use rayon::prelude::*;
use semtab_core::{Column, ColumnType, Table};
use tracing::debug;

/// Named-entity and literal votes of one column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub named_entity: usize,
    pub literal: usize,
}

impl LabelCounts {
    /// A cell votes once per side when any of its labels belongs to it
    pub fn of(column: &Column) -> Self {
        column
            .cells()
            .iter()
            .filter_map(|cell| cell.label())
            .fold(Self::default(), |mut counts, labels| {
                if labels.has_named_entity() {
                    counts.named_entity += 1;
                }
                if labels.has_literal() {
                    counts.literal += 1;
                }
                counts
            })
    }

    /// CATEGORICAL when named entities are at least as frequent as literals,
    /// LITERAL otherwise or when there are no named entities at all
    pub fn column_type(&self) -> ColumnType {
        if self.named_entity > 0 && self.named_entity >= self.literal {
            ColumnType::Categorical
        } else {
            ColumnType::Literal
        }
    }
}

/// Assign CATEGORICAL or LITERAL to every column.
///
/// Columns that already carry the same type, or are the subject, are left
/// alone, so classifying twice is a no-op.
pub fn classify_columns(table: &mut Table) -> Result<()> {
    let decisions: Vec<(LabelCounts, ColumnType)> = table
        .columns()
        .par_iter()
        .map(|column| {
            let counts = LabelCounts::of(column);
            (counts, counts.column_type())
        })
        .collect();

    for (column, (counts, column_type)) in table.columns_mut().iter_mut().zip(decisions) {
        column.classify(column_type)?;
        debug!(
            column = column.header_name(),
            named_entity = counts.named_entity,
            literal = counts.literal,
            column_type = %column_type,
            "Classified column"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semtab_core::{Cell, Label, LabelSet};

    fn column(labels: &[Option<LabelSet>]) -> Column {
        let cells = labels
            .iter()
            .map(|labels| {
                let mut cell = Cell::new(Some("x".to_string()));
                if let Some(labels) = labels {
                    cell.set_label(labels.clone()).unwrap();
                }
                cell
            })
            .collect();
        Column::new("c", cells)
    }

    fn one(label: Label) -> Option<LabelSet> {
        Some(LabelSet::single(label))
    }

    #[test]
    fn test_majority_named_entity_is_categorical() {
        let col = column(&[one(Label::Gpe), one(Label::Gpe), one(Label::Cardinal)]);
        assert_eq!(LabelCounts::of(&col).column_type(), ColumnType::Categorical);
    }

    #[test]
    fn test_tie_is_categorical() {
        let col = column(&[one(Label::Person), one(Label::Date)]);
        assert_eq!(
            LabelCounts::of(&col),
            LabelCounts { named_entity: 1, literal: 1 }
        );
        assert_eq!(LabelCounts::of(&col).column_type(), ColumnType::Categorical);
    }

    #[test]
    fn test_no_named_entity_is_literal() {
        let col = column(&[one(Label::Empty), None, one(Label::Empty)]);
        assert_eq!(LabelCounts::of(&col).column_type(), ColumnType::Literal);
    }

    #[test]
    fn test_set_valued_label_votes_both_sides() {
        let both: LabelSet = [Label::Org, Label::Cardinal, Label::Money].into_iter().collect();
        let col = column(&[Some(both), one(Label::Cardinal)]);
        assert_eq!(
            LabelCounts::of(&col),
            LabelCounts { named_entity: 1, literal: 2 }
        );
        assert_eq!(LabelCounts::of(&col).column_type(), ColumnType::Literal);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut table = Table::new(
            "t",
            vec![
                column(&[one(Label::Gpe), one(Label::Loc)]),
                column(&[one(Label::Cardinal), one(Label::Cardinal)]),
            ],
        )
        .unwrap();

        classify_columns(&mut table).unwrap();
        let first: Vec<_> = table.columns().iter().map(|c| c.column_type()).collect();
        classify_columns(&mut table).unwrap();
        let second: Vec<_> = table.columns().iter().map(|c| c.column_type()).collect();

        assert_eq!(first, vec![Some(ColumnType::Categorical), Some(ColumnType::Literal)]);
        assert_eq!(first, second);
    }
}
