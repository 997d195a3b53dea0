//! Candidate entities and classes with their per-heuristic scores
//!
//! Each heuristic writes its score into the candidate exactly once; the final
//! score can only be stored after every heuristic slot has been filled.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// A fixed set of named score slots filled by independent heuristics
pub trait ScoreSheet: Default + Clone + fmt::Debug {
    type Kind: Copy + Eq + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Every heuristic kind, in aggregation order
    const KINDS: &'static [Self::Kind];

    fn get(&self, kind: Self::Kind) -> Option<f64>;

    fn slot_mut(&mut self, kind: Self::Kind) -> &mut Option<f64>;
}

/// Heuristics scoring a candidate entity for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityScoreKind {
    StringSimilarity,
    NerBasedSimilarity,
    HeadingBasedSimilarity,
    EntityEmbeddingsBasedSimilarity,
    ContextBasedSimilarity,
}

impl EntityScoreKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityScoreKind::StringSimilarity => "string_similarity",
            EntityScoreKind::NerBasedSimilarity => "ner_based_similarity",
            EntityScoreKind::HeadingBasedSimilarity => "heading_based_similarity",
            EntityScoreKind::EntityEmbeddingsBasedSimilarity => {
                "entity_embeddings_based_similarity"
            }
            EntityScoreKind::ContextBasedSimilarity => "context_based_similarity",
        }
    }
}

impl fmt::Display for EntityScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Heuristics scoring a candidate class for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassScoreKind {
    MajorityVoting,
    HeadingSimilarity,
    ColumnTypePrediction,
}

impl ClassScoreKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClassScoreKind::MajorityVoting => "majority_voting_score",
            ClassScoreKind::HeadingSimilarity => "heading_similarity",
            ClassScoreKind::ColumnTypePrediction => "column_type_prediction_score",
        }
    }
}

impl fmt::Display for ClassScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Heuristic scores of a candidate entity; `None` until the heuristic runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityScores {
    #[serde(default)]
    pub string_similarity: Option<f64>,
    #[serde(default)]
    pub ner_based_similarity: Option<f64>,
    #[serde(default)]
    pub heading_based_similarity: Option<f64>,
    #[serde(default)]
    pub entity_embeddings_based_similarity: Option<f64>,
    #[serde(default)]
    pub context_based_similarity: Option<f64>,
}

impl ScoreSheet for EntityScores {
    type Kind = EntityScoreKind;

    const KINDS: &'static [EntityScoreKind] = &[
        EntityScoreKind::StringSimilarity,
        EntityScoreKind::NerBasedSimilarity,
        EntityScoreKind::HeadingBasedSimilarity,
        EntityScoreKind::EntityEmbeddingsBasedSimilarity,
        EntityScoreKind::ContextBasedSimilarity,
    ];

    fn get(&self, kind: EntityScoreKind) -> Option<f64> {
        match kind {
            EntityScoreKind::StringSimilarity => self.string_similarity,
            EntityScoreKind::NerBasedSimilarity => self.ner_based_similarity,
            EntityScoreKind::HeadingBasedSimilarity => self.heading_based_similarity,
            EntityScoreKind::EntityEmbeddingsBasedSimilarity => {
                self.entity_embeddings_based_similarity
            }
            EntityScoreKind::ContextBasedSimilarity => self.context_based_similarity,
        }
    }

    fn slot_mut(&mut self, kind: EntityScoreKind) -> &mut Option<f64> {
        match kind {
            EntityScoreKind::StringSimilarity => &mut self.string_similarity,
            EntityScoreKind::NerBasedSimilarity => &mut self.ner_based_similarity,
            EntityScoreKind::HeadingBasedSimilarity => &mut self.heading_based_similarity,
            EntityScoreKind::EntityEmbeddingsBasedSimilarity => {
                &mut self.entity_embeddings_based_similarity
            }
            EntityScoreKind::ContextBasedSimilarity => &mut self.context_based_similarity,
        }
    }
}

/// Heuristic scores of a candidate class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    #[serde(default)]
    pub majority_voting_score: Option<f64>,
    #[serde(default)]
    pub heading_similarity: Option<f64>,
    #[serde(default)]
    pub column_type_prediction_score: Option<f64>,
}

impl ScoreSheet for ClassScores {
    type Kind = ClassScoreKind;

    const KINDS: &'static [ClassScoreKind] = &[
        ClassScoreKind::MajorityVoting,
        ClassScoreKind::HeadingSimilarity,
        ClassScoreKind::ColumnTypePrediction,
    ];

    fn get(&self, kind: ClassScoreKind) -> Option<f64> {
        match kind {
            ClassScoreKind::MajorityVoting => self.majority_voting_score,
            ClassScoreKind::HeadingSimilarity => self.heading_similarity,
            ClassScoreKind::ColumnTypePrediction => self.column_type_prediction_score,
        }
    }

    fn slot_mut(&mut self, kind: ClassScoreKind) -> &mut Option<f64> {
        match kind {
            ClassScoreKind::MajorityVoting => &mut self.majority_voting_score,
            ClassScoreKind::HeadingSimilarity => &mut self.heading_similarity,
            ClassScoreKind::ColumnTypePrediction => &mut self.column_type_prediction_score,
        }
    }
}

/// A knowledge-graph resource proposed for a cell or a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: DeserializeOwned"))]
pub struct Candidate<S: ScoreSheet> {
    /// Resource URI, unique within one candidate list
    pub uri: String,
    /// Human-readable label from the source that found it first
    #[serde(default)]
    pub label: String,
    /// Short description, may be empty
    #[serde(default)]
    pub comment: String,
    /// One write-once slot per heuristic
    #[serde(flatten)]
    scores: S,
    /// Weighted sum, set once every heuristic has run
    #[serde(default)]
    final_score: Option<f64>,
}

pub type CandidateEntity = Candidate<EntityScores>;
pub type CandidateClass = Candidate<ClassScores>;

impl<S: ScoreSheet> Candidate<S> {
    #[inline]
    #[must_use]
    pub fn new(uri: impl Into<String>, label: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
            comment: comment.into(),
            scores: S::default(),
            final_score: None,
        }
    }

    /// Score for a heuristic, neutral (0) until computed
    #[inline]
    pub fn score(&self, kind: S::Kind) -> f64 {
        self.scores.get(kind).unwrap_or(0.0)
    }

    #[inline]
    pub fn is_scored(&self, kind: S::Kind) -> bool {
        self.scores.get(kind).is_some()
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }

    /// Store a heuristic score. Re-recording the identical value is a no-op.
    pub fn record(&mut self, kind: S::Kind, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidScore {
                uri: self.uri.clone(),
                heuristic: kind.to_string(),
            });
        }
        let uri = &self.uri;
        let slot = self.scores.slot_mut(kind);
        match *slot {
            Some(existing) if existing == value => Ok(()),
            Some(_) => Err(Error::ScoreAlreadyRecorded {
                uri: uri.clone(),
                heuristic: kind.to_string(),
            }),
            None => {
                *slot = Some(value);
                Ok(())
            }
        }
    }

    /// First heuristic that has not produced a score yet
    pub fn missing_score(&self) -> Option<S::Kind> {
        S::KINDS.iter().copied().find(|kind| !self.is_scored(*kind))
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.missing_score().is_none()
    }

    #[inline]
    pub fn final_score(&self) -> Option<f64> {
        self.final_score
    }

    /// Store the aggregated score; refused until every heuristic has run
    pub fn set_final_score(&mut self, value: f64) -> Result<()> {
        if let Some(missing) = self.missing_score() {
            return Err(Error::IncompleteScores {
                uri: self.uri.clone(),
                missing: missing.to_string(),
            });
        }
        self.final_score = Some(value);
        Ok(())
    }
}
