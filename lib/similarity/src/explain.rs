//! Explainability for ranked candidates
//!
//! Breaks a candidate's final score into per-heuristic weighted
//! contributions, and summarizes a ranked list.

use crate::weights::HeuristicWeights;
use indexmap::IndexMap;
use semtab_core::{Candidate, ScoreSheet};
use serde::Serialize;

/// A candidate with its weighted per-heuristic contributions
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedCandidate {
    pub uri: String,
    pub final_score: Option<f64>,
    /// Heuristic name → score × weight
    pub explain: IndexMap<String, f64>,
}

impl ExplainedCandidate {
    pub fn from_candidate<S, W>(candidate: &Candidate<S>, weights: &W) -> Self
    where
        S: ScoreSheet,
        W: HeuristicWeights<S>,
    {
        let explain = S::KINDS
            .iter()
            .map(|kind| (kind.to_string(), candidate.score(*kind) * weights.weight(*kind)))
            .collect();
        Self {
            uri: candidate.uri.clone(),
            final_score: candidate.final_score(),
            explain,
        }
    }

    pub fn from_list<S, W>(candidates: &[Candidate<S>], weights: &W) -> Vec<Self>
    where
        S: ScoreSheet,
        W: HeuristicWeights<S>,
    {
        candidates
            .iter()
            .map(|c| Self::from_candidate(c, weights))
            .collect()
    }
}

/// Summary statistics for one ranked candidate list
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankingStats {
    pub candidates_count: usize,
    pub avg_score: f64,
    pub best_score: f64,
    pub best_uri: Option<String>,
    /// Heuristic that contributed most to the best candidate
    pub top_contributing_heuristic: Option<String>,
}

impl RankingStats {
    pub fn compute<S, W>(candidates: &[Candidate<S>], weights: &W) -> Self
    where
        S: ScoreSheet,
        W: HeuristicWeights<S>,
    {
        let scored: Vec<f64> = candidates.iter().filter_map(|c| c.final_score()).collect();
        let best = crate::aggregate::select_best(candidates);

        let Some(best) = best else {
            return Self {
                candidates_count: candidates.len(),
                avg_score: 0.0,
                best_score: 0.0,
                best_uri: None,
                top_contributing_heuristic: None,
            };
        };

        let explained = ExplainedCandidate::from_candidate(best, weights);
        let top_contributing_heuristic = explained
            .explain
            .iter()
            .fold(None::<(&String, f64)>, |top, (name, value)| match top {
                Some((_, current)) if *value <= current => top,
                _ => Some((name, *value)),
            })
            .map(|(name, _)| name.clone());

        Self {
            candidates_count: candidates.len(),
            avg_score: scored.iter().sum::<f64>() / scored.len() as f64,
            best_score: best.final_score().unwrap_or(0.0),
            best_uri: Some(best.uri.clone()),
            top_contributing_heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::weights::ClassWeights;
    use semtab_core::{CandidateClass, ClassScoreKind};

    fn class(uri: &str, majority: f64, heading: f64) -> CandidateClass {
        let mut candidate = CandidateClass::new(uri, "", "");
        candidate.record(ClassScoreKind::MajorityVoting, majority).unwrap();
        candidate.record(ClassScoreKind::HeadingSimilarity, heading).unwrap();
        candidate.record(ClassScoreKind::ColumnTypePrediction, 0.0).unwrap();
        candidate
    }

    #[test]
    fn test_explained_contributions() {
        let weights = ClassWeights::default();
        let mut candidates = vec![class("City", 1.0, 0.25)];
        aggregate(&mut candidates, &weights).unwrap();

        let explained = ExplainedCandidate::from_candidate(&candidates[0], &weights);
        assert_eq!(explained.final_score, Some(1.25));
        assert_eq!(explained.explain["majority_voting_score"], 1.0);
        assert_eq!(explained.explain["heading_similarity"], 0.25);
        assert_eq!(explained.explain.len(), 3);
    }

    #[test]
    fn test_ranking_stats() {
        let weights = ClassWeights::default();
        let mut candidates = vec![class("City", 1.0, 0.5), class("Place", 0.5, 0.0)];
        aggregate(&mut candidates, &weights).unwrap();

        let stats = RankingStats::compute(&candidates, &weights);
        assert_eq!(stats.candidates_count, 2);
        assert_eq!(stats.best_score, 1.5);
        assert_eq!(stats.avg_score, 1.0);
        assert_eq!(stats.best_uri.as_deref(), Some("City"));
        assert_eq!(stats.top_contributing_heuristic.as_deref(), Some("majority_voting_score"));
    }

    #[test]
    fn test_empty_stats() {
        let empty: Vec<CandidateClass> = Vec::new();
        let stats = RankingStats::compute(&empty, &ClassWeights::default());
        assert_eq!(stats.candidates_count, 0);
        assert_eq!(stats.best_uri, None);
    }
}
