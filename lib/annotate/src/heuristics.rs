//! Pluggable ranking heuristics
//!
//! Each heuristic scores a whole candidate list at once, so that it can
//! normalize across candidates, and returns one score per candidate in
//! input order. Heuristics never see each other's scores.

use crate::mapping::ner_classes;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use semtab_core::{CandidateClass, CandidateEntity, ClassScoreKind, EntityScoreKind, LabelSet};
use semtab_lookup::GraphQuery;
use semtab_similarity::uri_similarities;
use std::sync::Arc;
use tracing::warn;

/// What an entity heuristic knows about the cell being annotated
#[derive(Debug, Clone)]
pub struct CellContext<'a> {
    pub column: usize,
    pub row: usize,
    pub header: &'a str,
    pub mention: &'a str,
    pub labels: Option<&'a LabelSet>,
    /// Cleared values of the whole row, this cell included
    pub row_values: &'a [Option<String>],
}

#[async_trait]
pub trait EntityHeuristic: Send + Sync {
    fn kind(&self) -> EntityScoreKind;

    async fn score(&self, cell: &CellContext<'_>, candidates: &[CandidateEntity]) -> Vec<f64>;
}

/// What a class heuristic knows about the column being annotated
#[derive(Debug, Clone)]
pub struct ColumnContext<'a> {
    pub column: usize,
    pub header: &'a str,
    /// Entity annotations of the column's cells
    pub cell_annotations: &'a [Option<String>],
}

#[async_trait]
pub trait ClassHeuristic: Send + Sync {
    fn kind(&self) -> ClassScoreKind;

    async fn score(&self, column: &ColumnContext<'_>, candidates: &[CandidateClass]) -> Vec<f64>;
}

/// Normalized edit distance between the mention and each candidate's URI
/// display name
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSimilarity;

#[async_trait]
impl EntityHeuristic for StringSimilarity {
    fn kind(&self) -> EntityScoreKind {
        EntityScoreKind::StringSimilarity
    }

    async fn score(&self, cell: &CellContext<'_>, candidates: &[CandidateEntity]) -> Vec<f64> {
        let uris: Vec<&str> = candidates.iter().map(|c| c.uri.as_str()).collect();
        uri_similarities(cell.mention, &uris)
    }
}

/// 1 when the candidate reaches one of the classes expected for the cell's
/// named-entity labels, 0 otherwise or when the graph cannot answer
pub struct NerSimilarity {
    graph: Arc<dyn GraphQuery>,
    concurrency: usize,
}

impl NerSimilarity {
    pub fn new(graph: Arc<dyn GraphQuery>) -> Self {
        Self {
            graph,
            concurrency: 4,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[async_trait]
impl EntityHeuristic for NerSimilarity {
    fn kind(&self) -> EntityScoreKind {
        EntityScoreKind::NerBasedSimilarity
    }

    async fn score(&self, cell: &CellContext<'_>, candidates: &[CandidateEntity]) -> Vec<f64> {
        let classes = cell.labels.map(ner_classes).unwrap_or_default();
        if classes.is_empty() {
            return vec![0.0; candidates.len()];
        }

        let classes = &classes;
        let graph = &self.graph;
        let lookups: Vec<_> = candidates
            .iter()
            .map(|candidate| async move {
                match graph.distance_to_class(&candidate.uri, classes).await {
                    Ok(distance) if distance > 0 => 1.0,
                    Ok(_) => 0.0,
                    Err(e) => {
                        warn!(uri = %candidate.uri, err = %e, "Class distance unavailable");
                        0.0
                    }
                }
            })
            .collect();

        stream::iter(lookups)
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Header similarity of candidate classes, same normalization as
/// [`StringSimilarity`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingSimilarity;

#[async_trait]
impl ClassHeuristic for HeadingSimilarity {
    fn kind(&self) -> ClassScoreKind {
        ClassScoreKind::HeadingSimilarity
    }

    async fn score(&self, column: &ColumnContext<'_>, candidates: &[CandidateClass]) -> Vec<f64> {
        let uris: Vec<&str> = candidates.iter().map(|c| c.uri.as_str()).collect();
        uri_similarities(column.header, &uris)
    }
}

/// Scores every candidate 0.
///
/// Stands in for heuristics without a real implementation yet; its weight
/// still takes part in aggregation.
#[derive(Debug, Clone, Copy)]
pub struct Neutral<K> {
    kind: K,
}

impl<K> Neutral<K> {
    pub fn new(kind: K) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl EntityHeuristic for Neutral<EntityScoreKind> {
    fn kind(&self) -> EntityScoreKind {
        self.kind
    }

    async fn score(&self, _cell: &CellContext<'_>, candidates: &[CandidateEntity]) -> Vec<f64> {
        vec![0.0; candidates.len()]
    }
}

#[async_trait]
impl ClassHeuristic for Neutral<ClassScoreKind> {
    fn kind(&self) -> ClassScoreKind {
        self.kind
    }

    async fn score(&self, _column: &ColumnContext<'_>, candidates: &[CandidateClass]) -> Vec<f64> {
        vec![0.0; candidates.len()]
    }
}

/// Heuristics installed when nothing else is configured: string and NER
/// similarity, neutral heading, embeddings and context
pub fn default_entity_heuristics(graph: Arc<dyn GraphQuery>) -> Vec<Arc<dyn EntityHeuristic>> {
    vec![
        Arc::new(StringSimilarity),
        Arc::new(NerSimilarity::new(graph)),
        Arc::new(Neutral::new(EntityScoreKind::HeadingBasedSimilarity)),
        Arc::new(Neutral::new(EntityScoreKind::EntityEmbeddingsBasedSimilarity)),
        Arc::new(Neutral::new(EntityScoreKind::ContextBasedSimilarity)),
    ]
}

/// Heading similarity plus a neutral column-type prediction. Majority voting
/// is computed while gathering candidates.
pub fn default_class_heuristics() -> Vec<Arc<dyn ClassHeuristic>> {
    vec![
        Arc::new(HeadingSimilarity),
        Arc::new(Neutral::new(ClassScoreKind::ColumnTypePrediction)),
    ]
}
