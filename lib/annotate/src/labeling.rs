use crate::Result;
use futures::stream::{self, StreamExt};
use indexmap::{IndexMap, IndexSet};
use semtab_core::{LabelSet, Table};
use semtab_lookup::NerLabeler;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelingStats {
    pub labeled: usize,
    /// Cells the labeler had no opinion on
    pub unlabeled: usize,
    pub failures: usize,
}

/// Label every cell that has no label yet.
///
/// Each distinct cleared value of a column is sent to the labeler once.
/// Empty cells are sent as `""`. A failed or silent labeler leaves the cell
/// unlabeled.
pub async fn label_cells(
    table: &mut Table,
    labeler: &dyn NerLabeler,
    concurrency: usize,
) -> Result<LabelingStats> {
    let mut stats = LabelingStats::default();

    for column_index in 0..table.columns_number() {
        let pending: Vec<String> = {
            let column = table.column(column_index)?;
            let mut distinct = IndexSet::new();
            for cell in column.cells().iter().filter(|c| c.label().is_none()) {
                distinct.insert(cell.cleared_value().unwrap_or_default().to_string());
            }
            distinct.into_iter().collect()
        };
        if pending.is_empty() {
            continue;
        }

        let answers: Vec<(String, Option<LabelSet>, bool)> = stream::iter(pending)
            .map(|text| async move {
                match labeler.label_span(&text).await {
                    Ok(labels) => (text, labels, false),
                    Err(e) => {
                        warn!(text = %text, err = %e, "Labeling failed");
                        (text, None, true)
                    }
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let mut resolved: IndexMap<String, Option<LabelSet>> = IndexMap::new();
        for (text, labels, failed) in answers {
            if failed {
                stats.failures += 1;
            }
            resolved.insert(text, labels);
        }

        let column = table.column_mut(column_index)?;
        for cell in column.cells_mut().iter_mut().filter(|c| c.label().is_none()) {
            let text = cell.cleared_value().unwrap_or_default();
            match resolved.get(text).cloned().flatten() {
                Some(labels) if !labels.is_empty() => {
                    cell.set_label(labels)?;
                    stats.labeled += 1;
                }
                _ => stats.unlabeled += 1,
            }
        }
        debug!(column = column.header_name(), "Labeled column");
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semtab_core::{Label, Record};
    use semtab_lookup::LookupError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLabeler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NerLabeler for CountingLabeler {
        async fn label_span(&self, text: &str) -> semtab_lookup::Result<Option<LabelSet>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text {
                "" => Ok(Some(LabelSet::single(Label::Empty))),
                "boom" => Err(LookupError::Network("down".into())),
                t if t.chars().all(|c| c.is_ascii_digit()) => Ok(Some(LabelSet::single(Label::Cardinal))),
                "???" => Ok(None),
                _ => Ok(Some(LabelSet::single(Label::Gpe))),
            }
        }
    }

    fn table() -> Table {
        let records: Vec<Record> = [
            json!({"City": "Paris", "Pop": "2100000"}),
            json!({"City": "Paris", "Pop": null}),
            json!({"City": "boom", "Pop": "???"}),
        ]
        .into_iter()
        .map(|row| serde_json::from_value(row).unwrap())
        .collect();
        Table::from_records("cities", &records).unwrap()
    }

    #[tokio::test]
    async fn test_distinct_values_labeled_once() {
        let mut table = table();
        let labeler = CountingLabeler { calls: AtomicUsize::new(0) };
        let stats = label_cells(&mut table, &labeler, 2).await.unwrap();

        // Paris, boom, 2100000, "", ???
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 5);
        assert_eq!(stats, LabelingStats { labeled: 4, unlabeled: 2, failures: 1 });

        assert_eq!(table.cell(1, 0).unwrap().label(), Some(&LabelSet::single(Label::Gpe)));
        assert_eq!(table.cell(1, 1).unwrap().label(), Some(&LabelSet::single(Label::Empty)));
        assert!(table.cell(2, 0).unwrap().label().is_none());
        assert!(table.cell(2, 1).unwrap().label().is_none());
    }

    #[tokio::test]
    async fn test_existing_labels_kept() {
        let mut table = table();
        let labeler = CountingLabeler { calls: AtomicUsize::new(0) };
        label_cells(&mut table, &labeler, 1).await.unwrap();
        let again = label_cells(&mut table, &labeler, 1).await.unwrap();
        // only the two unlabeled values are retried
        assert_eq!(again.labeled, 0);
        assert_eq!(again.unlabeled, 2);
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 7);
    }
}
