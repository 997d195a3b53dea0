//! Class candidate ranking for categorical columns

use crate::heuristics::{default_class_heuristics, ClassHeuristic, ColumnContext};
use crate::{AnnotateError, Result};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use indexmap::{IndexMap, IndexSet};
use semtab_core::{CandidateClass, ClassScoreKind, Table};
use semtab_lookup::{ClassInfo, GraphQuery};
use semtab_similarity::{aggregate, select_best, sort_by_final_score, sort_by_score, ClassWeights};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassStats {
    pub columns_ranked: usize,
    pub candidates: usize,
    pub failed_lookups: usize,
}

pub struct ClassRanker {
    graph: Arc<dyn GraphQuery>,
    heuristics: Vec<Arc<dyn ClassHeuristic>>,
    weights: ClassWeights,
    concurrency: usize,
}

impl ClassRanker {
    pub fn new(graph: Arc<dyn GraphQuery>, weights: ClassWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            graph,
            heuristics: default_class_heuristics(),
            weights,
            concurrency: 4,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Install a heuristic, replacing the one of the same kind
    pub fn with_heuristic(mut self, heuristic: Arc<dyn ClassHeuristic>) -> Self {
        let kind = heuristic.kind();
        match self.heuristics.iter().position(|h| h.kind() == kind) {
            Some(index) => self.heuristics[index] = heuristic,
            None => self.heuristics.push(heuristic),
        }
        self
    }

    pub fn weights(&self) -> &ClassWeights {
        &self.weights
    }

    /// Gather, score, aggregate and sort candidate classes for every
    /// categorical column that has none yet
    pub async fn rank(&self, table: &mut Table) -> Result<ClassStats> {
        let mut stats = ClassStats::default();

        for column_index in 0..table.columns_number() {
            let (header, annotations) = {
                let column = table.column(column_index)?;
                if !column.is_categorical() || column.candidate_classes().is_some() {
                    continue;
                }
                let annotations: Vec<Option<String>> = column
                    .cells()
                    .iter()
                    .map(|cell| cell.annotation().map(str::to_string))
                    .collect();
                (column.header_name().to_string(), annotations)
            };

            let mut candidates = self.majority_candidates(&annotations, &mut stats).await?;

            match self.graph.candidate_classes(&header).await {
                Ok(hits) => {
                    let known: IndexSet<String> = candidates.iter().map(|c| c.uri.clone()).collect();
                    let mut added: IndexSet<String> = IndexSet::new();
                    for hit in hits {
                        if known.contains(&hit.uri) || !added.insert(hit.uri.clone()) {
                            continue;
                        }
                        let mut candidate = CandidateClass::new(hit.uri, hit.label, hit.comment);
                        candidate.record(ClassScoreKind::MajorityVoting, 0.0)?;
                        candidates.push(candidate);
                    }
                }
                Err(e) => {
                    stats.failed_lookups += 1;
                    warn!(header = %header, err = %e, "Class lookup by header failed");
                }
            }

            let context = ColumnContext {
                column: column_index,
                header: &header,
                cell_annotations: &annotations,
            };
            self.score(&context, &mut candidates).await?;

            sort_by_score(&mut candidates, ClassScoreKind::HeadingSimilarity);
            aggregate(&mut candidates, &self.weights)?;
            sort_by_final_score(&mut candidates);

            debug!(header = %header, candidates = candidates.len(), "Classes ranked");
            stats.columns_ranked += 1;
            stats.candidates += candidates.len();
            table.column_mut(column_index)?.set_candidate_classes(candidates)?;
        }
        Ok(stats)
    }

    /// One candidate per class of the annotated entities, scored by how many
    /// cells vote for it relative to the most voted class
    async fn majority_candidates(
        &self,
        annotations: &[Option<String>],
        stats: &mut ClassStats,
    ) -> Result<Vec<CandidateClass>> {
        let entities: IndexSet<&str> = annotations.iter().flatten().map(String::as_str).collect();

        let fetched: Vec<(&str, Option<ClassInfo>)> = stream::iter(entities)
            .map(|uri| async move {
                match self.graph.classes_for_entity(uri).await {
                    Ok(classes) => (uri, Some(classes)),
                    Err(e) => {
                        warn!(uri, err = %e, "Entity classes unavailable");
                        (uri, None)
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut classes_of: IndexMap<&str, ClassInfo> = IndexMap::new();
        for (uri, classes) in fetched {
            match classes {
                Some(classes) => {
                    classes_of.insert(uri, classes);
                }
                None => stats.failed_lookups += 1,
            }
        }

        let mut votes: IndexMap<String, (usize, String, String)> = IndexMap::new();
        for uri in annotations.iter().flatten() {
            let Some(classes) = classes_of.get(uri.as_str()) else {
                continue;
            };
            for (class, (label, comment)) in classes {
                votes
                    .entry(class.clone())
                    .or_insert_with(|| (0, label.clone(), comment.clone()))
                    .0 += 1;
            }
        }

        let max = votes.values().map(|(count, _, _)| *count).max().unwrap_or(0);
        votes
            .into_iter()
            .map(|(uri, (count, label, comment))| {
                let mut candidate = CandidateClass::new(uri, label, comment);
                let score = if max == 0 { 0.0 } else { count as f64 / max as f64 };
                candidate.record(ClassScoreKind::MajorityVoting, score)?;
                Ok(candidate)
            })
            .collect()
    }

    async fn score(&self, context: &ColumnContext<'_>, candidates: &mut [CandidateClass]) -> Result<()> {
        let snapshot: &[CandidateClass] = candidates;
        let pending = self
            .heuristics
            .iter()
            .filter(|h| snapshot.iter().any(|c| !c.is_scored(h.kind())))
            .map(|heuristic| async move {
                (heuristic.kind(), heuristic.score(context, snapshot).await)
            });
        let results = join_all(pending).await;

        for (kind, scores) in results {
            if scores.len() != candidates.len() {
                return Err(AnnotateError::HeuristicOutput {
                    heuristic: kind.to_string(),
                    expected: candidates.len(),
                    actual: scores.len(),
                });
            }
            for (candidate, value) in candidates.iter_mut().zip(scores) {
                if !candidate.is_scored(kind) {
                    candidate.record(kind, value)?;
                }
            }
        }
        Ok(())
    }

    /// Annotate each ranked column with its best class
    pub fn annotate(&self, table: &mut Table) -> Result<usize> {
        let mut annotated = 0;
        for column in table.columns_mut().iter_mut() {
            if !column.is_categorical() || column.annotation().is_some() {
                continue;
            }
            let best = column
                .candidate_classes()
                .and_then(select_best)
                .map(|candidate| candidate.uri.clone());
            if let Some(uri) = best {
                column.set_annotation(uri)?;
                annotated += 1;
            }
        }
        Ok(annotated)
    }
}
