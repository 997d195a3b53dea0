//! Entity candidate ranking
//!
//! Three passes over the categorical and subject columns of a table:
//!
//! 1. [`EntityRanker::find_candidates`] looks every distinct cleared value of
//!    a column up once, across all search sources, and hands each cell a copy
//!    of its value's merged list.
//! 2. [`EntityRanker::rank`] runs every heuristic on each cell's candidates,
//!    records the scores and aggregates them.
//! 3. [`EntityRanker::annotate`] picks the best candidate per cell.

use crate::heuristics::{default_entity_heuristics, CellContext, EntityHeuristic};
use crate::{AnnotateError, Result};
use ahash::AHashMap;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use indexmap::{IndexMap, IndexSet};
use semtab_core::{CandidateEntity, EntityScoreKind, LabelSet, Table};
use semtab_lookup::{EntitySearch, GraphQuery};
use semtab_similarity::{aggregate, select_best, EntityWeights};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FindStats {
    /// Distinct values sent to the search sources
    pub distinct_values: usize,
    /// Failed calls, one per source and value
    pub failed_lookups: usize,
    /// Values every source failed on; their cells stay without candidates
    pub unresolved_values: usize,
    pub cells_populated: usize,
}

struct RankJob {
    column: usize,
    row: usize,
    header: String,
    mention: String,
    labels: Option<LabelSet>,
    row_values: Vec<Option<String>>,
    candidates: Vec<CandidateEntity>,
}

type HeuristicScores = Vec<(EntityScoreKind, Vec<f64>)>;

pub struct EntityRanker {
    searches: Vec<Arc<dyn EntitySearch>>,
    heuristics: Vec<Arc<dyn EntityHeuristic>>,
    weights: EntityWeights,
    concurrency: usize,
}

impl EntityRanker {
    /// Sources are merged in the given order; the first one to return a URI
    /// decides its label and comment.
    pub fn new(
        searches: Vec<Arc<dyn EntitySearch>>,
        graph: Arc<dyn GraphQuery>,
        weights: EntityWeights,
    ) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            searches,
            heuristics: default_entity_heuristics(graph),
            weights,
            concurrency: 4,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Install a heuristic, replacing the one of the same kind
    pub fn with_heuristic(mut self, heuristic: Arc<dyn EntityHeuristic>) -> Self {
        let kind = heuristic.kind();
        match self.heuristics.iter().position(|h| h.kind() == kind) {
            Some(index) => self.heuristics[index] = heuristic,
            None => self.heuristics.push(heuristic),
        }
        self
    }

    pub fn weights(&self) -> &EntityWeights {
        &self.weights
    }

    fn target_columns(table: &Table) -> Vec<usize> {
        table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_categorical())
            .map(|(index, _)| index)
            .collect()
    }

    /// Merged candidates for one value and the number of failed sources
    async fn lookup(&self, value: &str) -> (Vec<CandidateEntity>, usize) {
        let mut merged: IndexMap<String, CandidateEntity> = IndexMap::new();
        let mut failures = 0;

        for search in &self.searches {
            match search.search_entities(value).await {
                Ok(hits) => {
                    for hit in hits {
                        merged
                            .entry(hit.uri.clone())
                            .or_insert_with(|| CandidateEntity::new(hit.uri, hit.label, hit.comment));
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(source = search.name(), value, err = %e, "Entity lookup failed");
                }
            }
        }
        (merged.into_values().collect(), failures)
    }

    /// Populate candidates for every cell that has a cleared value and none
    /// yet. Values already resolved in the same column are not looked up
    /// again.
    pub async fn find_candidates(&self, table: &mut Table) -> Result<FindStats> {
        let mut stats = FindStats::default();

        for column_index in Self::target_columns(table) {
            let (mut memo, pending) = {
                let column = table.column(column_index)?;
                let mut memo: AHashMap<String, Vec<CandidateEntity>> = AHashMap::new();
                for cell in column.cells() {
                    if let (Some(value), Some(candidates)) =
                        (cell.cleared_value(), cell.candidate_entities())
                    {
                        memo.entry(value.to_string())
                            .or_insert_with(|| unscored(candidates));
                    }
                }

                let mut pending = IndexSet::new();
                for cell in column.cells().iter().filter(|c| !c.has_candidates()) {
                    if let Some(value) = cell.cleared_value() {
                        if !memo.contains_key(value) {
                            pending.insert(value.to_string());
                        }
                    }
                }
                (memo, pending)
            };

            stats.distinct_values += pending.len();
            let fetched: Vec<(String, Vec<CandidateEntity>, usize)> = stream::iter(pending)
                .map(|value| async move {
                    let (candidates, failures) = self.lookup(&value).await;
                    (value, candidates, failures)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

            for (value, candidates, failures) in fetched {
                stats.failed_lookups += failures;
                if failures > 0 && failures == self.searches.len() {
                    stats.unresolved_values += 1;
                    continue;
                }
                memo.insert(value, candidates);
            }

            let column = table.column_mut(column_index)?;
            for cell in column.cells_mut().iter_mut().filter(|c| !c.has_candidates()) {
                let Some(candidates) = cell.cleared_value().and_then(|value| memo.get(value)) else {
                    continue;
                };
                let candidates = candidates.clone();
                cell.set_candidate_entities(candidates)?;
                stats.cells_populated += 1;
            }
            debug!(column = column.header_name(), "Candidates found");
        }
        Ok(stats)
    }

    /// Score every candidate that is missing a heuristic, then aggregate.
    ///
    /// Returns the number of cells that were scored.
    pub async fn rank(&self, table: &mut Table) -> Result<usize> {
        let targets = Self::target_columns(table);
        let jobs = self.rank_jobs(table, &targets)?;

        let scored: Vec<(RankJob, Result<HeuristicScores>)> = stream::iter(jobs)
            .map(|job| async move {
                let scores = self.score_cell(&job).await;
                (job, scores)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        // nothing is recorded unless every cell scored cleanly
        let scored: Vec<(RankJob, HeuristicScores)> = scored
            .into_iter()
            .map(|(job, scores)| scores.map(|scores| (job, scores)))
            .collect::<Result<_>>()?;

        let ranked = scored.len();
        for (job, scores) in scored {
            let cell = table.cell_mut(job.row, job.column)?;
            let Some(candidates) = cell.candidate_entities_mut() else {
                continue;
            };
            for (kind, values) in scores {
                for (candidate, value) in candidates.iter_mut().zip(values) {
                    if !candidate.is_scored(kind) {
                        candidate.record(kind, value)?;
                    }
                }
            }
        }

        for column_index in targets {
            let column = table.column_mut(column_index)?;
            for cell in column.cells_mut().iter_mut() {
                if let Some(candidates) = cell.candidate_entities_mut() {
                    aggregate(candidates, &self.weights)?;
                }
            }
        }
        Ok(ranked)
    }

    fn rank_jobs(&self, table: &Table, targets: &[usize]) -> Result<Vec<RankJob>> {
        let mut jobs = Vec::new();
        for &column_index in targets {
            let column = table.column(column_index)?;
            for (row, cell) in column.cells().iter().enumerate() {
                let Some(candidates) = cell.candidate_entities() else {
                    continue;
                };
                if candidates.iter().all(|c| c.is_complete()) {
                    continue;
                }
                let row_values = table
                    .row(row)?
                    .into_iter()
                    .map(|c| c.cleared_value().map(str::to_string))
                    .collect();
                jobs.push(RankJob {
                    column: column_index,
                    row,
                    header: column.header_name().to_string(),
                    mention: cell.cleared_value().unwrap_or_default().to_string(),
                    labels: cell.label().cloned(),
                    row_values,
                    candidates: candidates.to_vec(),
                });
            }
        }
        Ok(jobs)
    }

    /// Heuristics run independently of each other on the same input
    async fn score_cell(&self, job: &RankJob) -> Result<HeuristicScores> {
        let context = CellContext {
            column: job.column,
            row: job.row,
            header: &job.header,
            mention: &job.mention,
            labels: job.labels.as_ref(),
            row_values: &job.row_values,
        };
        let context = &context;

        let pending = self
            .heuristics
            .iter()
            .filter(|h| job.candidates.iter().any(|c| !c.is_scored(h.kind())))
            .map(|heuristic| async move {
                (heuristic.kind(), heuristic.score(context, &job.candidates).await)
            });

        let mut results = Vec::new();
        for (kind, scores) in join_all(pending).await {
            if scores.len() != job.candidates.len() {
                return Err(AnnotateError::HeuristicOutput {
                    heuristic: kind.to_string(),
                    expected: job.candidates.len(),
                    actual: scores.len(),
                });
            }
            results.push((kind, scores));
        }
        Ok(results)
    }

    /// Annotate each unannotated cell with its best candidate. Cells without
    /// candidates stay unannotated.
    pub fn annotate(&self, table: &mut Table) -> Result<usize> {
        let mut annotated = 0;
        for column_index in Self::target_columns(table) {
            let column = table.column_mut(column_index)?;
            for cell in column.cells_mut().iter_mut() {
                if cell.annotation().is_some() {
                    continue;
                }
                let best = cell
                    .candidate_entities()
                    .and_then(select_best)
                    .map(|candidate| candidate.uri.clone());
                if let Some(uri) = best {
                    cell.set_annotation(uri)?;
                    annotated += 1;
                }
            }
        }
        Ok(annotated)
    }
}

/// Copy of a candidate list with its scores dropped
fn unscored(candidates: &[CandidateEntity]) -> Vec<CandidateEntity> {
    candidates
        .iter()
        .map(|c| CandidateEntity::new(c.uri.clone(), c.label.clone(), c.comment.clone()))
        .collect()
}
