use crate::mapping::{datatype_uri, XML_SCHEMA};
use crate::Result;
use indexmap::IndexMap;
use semtab_core::{Column, Label, Table};
use semtab_similarity::first_max_index;
use tracing::debug;

/// Most frequent datatype of a literal column's cells.
///
/// Every cell votes. A labeled cell uses its first literal label (or its first
/// label if none is literal); unlabeled, EMPTY and unmapped cells vote
/// `xsd:string`. Ties go to the datatype seen first.
pub fn column_datatype(column: &Column) -> String {
    let mut votes: IndexMap<String, usize> = IndexMap::new();
    for cell in column.cells() {
        let label = cell.label().and_then(|labels| {
            labels
                .iter()
                .find(|l| l.is_literal())
                .or_else(|| labels.primary())
        });
        let datatype = datatype_uri(label.unwrap_or(&Label::Empty));
        *votes.entry(datatype).or_insert(0) += 1;
    }

    first_max_index(votes.values().map(|count| *count as f64))
        .and_then(|index| votes.get_index(index))
        .map(|(uri, _)| uri.clone())
        .unwrap_or_else(|| format!("{}string", XML_SCHEMA))
}

/// Annotate every LITERAL column that has no annotation yet with its datatype
pub fn annotate_literal_columns(table: &mut Table) -> Result<usize> {
    let mut annotated = 0;
    for column in table.columns_mut().iter_mut() {
        if !column.is_literal() || column.annotation().is_some() {
            continue;
        }
        let datatype = column_datatype(column);
        debug!(column = column.header_name(), datatype = %datatype, "Literal column annotated");
        column.set_annotation(datatype)?;
        annotated += 1;
    }
    Ok(annotated)
}
