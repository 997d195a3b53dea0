//! Weighted aggregation and selection
//!
//! Once every heuristic has scored a candidate, its final score is the
//! weighted sum of those scores. Selection scans candidates in insertion
//! order with a strict `>` comparison, so the earliest maximum wins.

use crate::weights::HeuristicWeights;
use ordered_float::OrderedFloat;
use semtab_core::{Candidate, Error, Result, ScoreSheet};
use std::cmp::Reverse;

/// `Σ score_i × weight_i` over every heuristic of the sheet
pub fn weighted_sum<S, W>(candidate: &Candidate<S>, weights: &W) -> f64
where
    S: ScoreSheet,
    W: HeuristicWeights<S>,
{
    S::KINDS
        .iter()
        .map(|kind| candidate.score(*kind) * weights.weight(*kind))
        .sum()
}

/// Compute and store the final score of every candidate.
///
/// Fails without touching any candidate if one of them is missing a
/// heuristic score. Re-running with unchanged scores stores the same values.
pub fn aggregate<S, W>(candidates: &mut [Candidate<S>], weights: &W) -> Result<()>
where
    S: ScoreSheet,
    W: HeuristicWeights<S>,
{
    for candidate in candidates.iter() {
        if let Some(missing) = candidate.missing_score() {
            return Err(Error::IncompleteScores {
                uri: candidate.uri.clone(),
                missing: missing.to_string(),
            });
        }
    }

    for candidate in candidates.iter_mut() {
        let total = weighted_sum(candidate, weights);
        candidate.set_final_score(total)?;
    }
    Ok(())
}

/// Index of the first maximum, `None` for an empty input.
///
/// NaN never wins against a number.
pub fn first_max_index<I>(scores: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, score) in scores.into_iter().enumerate() {
        match best {
            None if !score.is_nan() => best = Some((index, score)),
            Some((_, top)) if score > top => best = Some((index, score)),
            _ => {}
        }
    }
    best.map(|(index, _)| index)
}

/// Candidate with the greatest final score, earliest one on ties.
///
/// Candidates without a final score are not eligible.
pub fn select_best<S: ScoreSheet>(candidates: &[Candidate<S>]) -> Option<&Candidate<S>> {
    let index = first_max_index(
        candidates
            .iter()
            .map(|c| c.final_score().unwrap_or(f64::NAN)),
    )?;
    candidates.get(index)
}

/// Stable sort, highest final score first
pub fn sort_by_final_score<S: ScoreSheet>(candidates: &mut [Candidate<S>]) {
    candidates.sort_by_key(|c| Reverse(OrderedFloat(c.final_score().unwrap_or(f64::NEG_INFINITY))));
}

/// Stable sort, highest score for one heuristic first
pub fn sort_by_score<S: ScoreSheet>(candidates: &mut [Candidate<S>], kind: S::Kind) {
    candidates.sort_by_key(|c| Reverse(OrderedFloat(c.score(kind))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::{ClassWeights, EntityWeights};
    use semtab_core::{
        CandidateClass, CandidateEntity, ClassScoreKind, EntityScoreKind, EntityScores,
    };

    fn entity(uri: &str, string_similarity: f64) -> CandidateEntity {
        let mut candidate = CandidateEntity::new(uri, "", "");
        candidate
            .record(EntityScoreKind::StringSimilarity, string_similarity)
            .unwrap();
        for kind in &EntityScores::KINDS[1..] {
            candidate.record(*kind, 0.0).unwrap();
        }
        candidate
    }

    #[test]
    fn test_final_score_equals_single_heuristic() {
        let mut candidates = vec![entity("a", 0.9), entity("b", 0.5), entity("c", 0.2)];
        aggregate(&mut candidates, &EntityWeights::default()).unwrap();

        let finals: Vec<f64> = candidates.iter().map(|c| c.final_score().unwrap()).collect();
        assert_eq!(finals, vec![0.9, 0.5, 0.2]);
        assert_eq!(select_best(&candidates).unwrap().uri, "a");
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut candidates = vec![entity("a", 0.4)];
        let weights = EntityWeights::default();
        aggregate(&mut candidates, &weights).unwrap();
        aggregate(&mut candidates, &weights).unwrap();
        assert_eq!(candidates[0].final_score(), Some(0.4));
    }

    #[test]
    fn test_aggregate_refuses_incomplete() {
        let mut candidates = vec![entity("a", 0.4), CandidateEntity::new("b", "", "")];
        let err = aggregate(&mut candidates, &EntityWeights::default()).unwrap_err();
        assert!(matches!(err, Error::IncompleteScores { ref uri, .. } if uri == "b"));
        assert_eq!(candidates[0].final_score(), None);
    }

    #[test]
    fn test_weights_apply() {
        let mut candidate = CandidateClass::new("c", "", "");
        candidate.record(ClassScoreKind::MajorityVoting, 1.0).unwrap();
        candidate.record(ClassScoreKind::HeadingSimilarity, 0.5).unwrap();
        candidate.record(ClassScoreKind::ColumnTypePrediction, 0.0).unwrap();

        let weights = ClassWeights {
            heading_similarity: 2.0,
            ..Default::default()
        };
        assert_eq!(weighted_sum(&candidate, &weights), 2.0);
    }

    #[test]
    fn test_monotone_in_each_heuristic() {
        let weights = EntityWeights::default();
        let low = entity("a", 0.3);
        let high = entity("a", 0.7);
        assert!(weighted_sum(&high, &weights) >= weighted_sum(&low, &weights));
    }

    #[test]
    fn test_first_max_wins_ties() {
        assert_eq!(first_max_index([0.5, 0.9, 0.9, 0.1]), Some(1));
        assert_eq!(first_max_index([f64::NAN, 0.2, 0.2]), Some(1));
        assert_eq!(first_max_index(Vec::<f64>::new()), None);

        let mut candidates = vec![entity("a", 0.6), entity("b", 0.6)];
        aggregate(&mut candidates, &EntityWeights::default()).unwrap();
        assert_eq!(select_best(&candidates).unwrap().uri, "a");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut candidates = vec![entity("a", 0.2), entity("b", 0.8), entity("c", 0.8)];
        aggregate(&mut candidates, &EntityWeights::default()).unwrap();
        sort_by_final_score(&mut candidates);
        let order: Vec<&str> = candidates.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }
}
