//! Score breakdowns for annotated tables

use semtab_core::Table;
use semtab_similarity::{ClassWeights, EntityWeights, ExplainedCandidate, RankingStats};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CellExplanation {
    pub column: usize,
    pub row: usize,
    pub mention: Option<String>,
    pub annotation: Option<String>,
    pub stats: RankingStats,
    pub candidates: Vec<ExplainedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnExplanation {
    pub column: usize,
    pub header: String,
    pub annotation: Option<String>,
    pub stats: RankingStats,
    pub candidates: Vec<ExplainedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableExplanation {
    pub table_name: String,
    pub cells: Vec<CellExplanation>,
    pub columns: Vec<ColumnExplanation>,
}

/// Per-heuristic contributions for every cell with candidates and every
/// column with candidate classes
pub fn explain_table(
    table: &Table,
    entity_weights: &EntityWeights,
    class_weights: &ClassWeights,
) -> TableExplanation {
    let mut cells = Vec::new();
    let mut columns = Vec::new();

    for (column_index, column) in table.columns().iter().enumerate() {
        for (row, cell) in column.cells().iter().enumerate() {
            let Some(candidates) = cell.candidate_entities() else {
                continue;
            };
            cells.push(CellExplanation {
                column: column_index,
                row,
                mention: cell.cleared_value().map(str::to_string),
                annotation: cell.annotation().map(str::to_string),
                stats: RankingStats::compute(candidates, entity_weights),
                candidates: ExplainedCandidate::from_list(candidates, entity_weights),
            });
        }

        if let Some(candidates) = column.candidate_classes() {
            columns.push(ColumnExplanation {
                column: column_index,
                header: column.header_name().to_string(),
                annotation: column.annotation().map(str::to_string),
                stats: RankingStats::compute(candidates, class_weights),
                candidates: ExplainedCandidate::from_list(candidates, class_weights),
            });
        }
    }

    TableExplanation {
        table_name: table.table_name().to_string(),
        cells,
        columns,
    }
}
