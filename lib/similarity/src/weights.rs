//! Heuristic weights
//!
//! Each ranking engine combines its heuristics as a weighted sum. Weights are
//! declared per heuristic, default to 1.0, and must be finite and
//! non-negative so that raising one heuristic score never lowers the final
//! score.

use semtab_core::{ClassScoreKind, ClassScores, EntityScoreKind, EntityScores, ScoreSheet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight lookup for one kind of score sheet
pub trait HeuristicWeights<S: ScoreSheet> {
    fn weight(&self, kind: S::Kind) -> f64;
}

/// Weights of the five entity heuristics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityWeights {
    #[serde(default = "default_weight")]
    pub string_similarity: f64,
    #[serde(default = "default_weight")]
    pub ner_based_similarity: f64,
    #[serde(default = "default_weight")]
    pub heading_based_similarity: f64,
    #[serde(default = "default_weight")]
    pub entity_embeddings_based_similarity: f64,
    #[serde(default = "default_weight")]
    pub context_based_similarity: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for EntityWeights {
    fn default() -> Self {
        Self {
            string_similarity: 1.0,
            ner_based_similarity: 1.0,
            heading_based_similarity: 1.0,
            entity_embeddings_based_similarity: 1.0,
            context_based_similarity: 1.0,
        }
    }
}

impl HeuristicWeights<EntityScores> for EntityWeights {
    fn weight(&self, kind: EntityScoreKind) -> f64 {
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
}

impl EntityWeights {
    pub fn validate(&self) -> Result<(), WeightError> {
        check_all(EntityScores::KINDS.iter().map(|k| (k.name(), self.weight(*k))))
    }

    /// Copy with some weights replaced, keyed by heuristic name
    pub fn with_overrides(&self, overrides: &HashMap<String, f64>) -> Result<Self, WeightError> {
        let mut weights = self.clone();
        for (name, value) in overrides {
            let slot = match name.as_str() {
                "string_similarity" => &mut weights.string_similarity,
                "ner_based_similarity" => &mut weights.ner_based_similarity,
                "heading_based_similarity" => &mut weights.heading_based_similarity,
                "entity_embeddings_based_similarity" => {
                    &mut weights.entity_embeddings_based_similarity
                }
                "context_based_similarity" => &mut weights.context_based_similarity,
                other => return Err(WeightError::UnknownHeuristic(other.to_string())),
            };
            *slot = *value;
        }
        weights.validate()?;
        Ok(weights)
    }
}

/// Weights of the three class heuristics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassWeights {
    #[serde(default = "default_weight")]
    pub majority_voting_score: f64,
    #[serde(default = "default_weight")]
    pub heading_similarity: f64,
    #[serde(default = "default_weight")]
    pub column_type_prediction_score: f64,
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self {
            majority_voting_score: 1.0,
            heading_similarity: 1.0,
            column_type_prediction_score: 1.0,
        }
    }
}

impl HeuristicWeights<ClassScores> for ClassWeights {
    fn weight(&self, kind: ClassScoreKind) -> f64 {
        match kind {
            ClassScoreKind::MajorityVoting => self.majority_voting_score,
            ClassScoreKind::HeadingSimilarity => self.heading_similarity,
            ClassScoreKind::ColumnTypePrediction => self.column_type_prediction_score,
        }
    }
}

impl ClassWeights {
    pub fn validate(&self) -> Result<(), WeightError> {
        check_all(ClassScores::KINDS.iter().map(|k| (k.name(), self.weight(*k))))
    }

    pub fn with_overrides(&self, overrides: &HashMap<String, f64>) -> Result<Self, WeightError> {
        let mut weights = self.clone();
        for (name, value) in overrides {
            let slot = match name.as_str() {
                "majority_voting_score" => &mut weights.majority_voting_score,
                "heading_similarity" => &mut weights.heading_similarity,
                "column_type_prediction_score" => &mut weights.column_type_prediction_score,
                other => return Err(WeightError::UnknownHeuristic(other.to_string())),
            };
            *slot = *value;
        }
        weights.validate()?;
        Ok(weights)
    }
}

/// Weights of the subject column heuristics
///
/// Score = `((ucf·W_ucf + awn·W_awn) - (ecf·W_ecf + cfa·W_cfa + hpn·W_hpn)) / sqrt(dfc + 1)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectWeights {
    /// Unique content fraction
    #[serde(default = "default_ucf")]
    pub ucf: f64,
    /// Average word number
    #[serde(default = "default_weight")]
    pub awn: f64,
    /// Empty cell fraction
    #[serde(default = "default_weight")]
    pub ecf: f64,
    /// Acronym cell fraction
    #[serde(default = "default_weight")]
    pub cfa: f64,
    /// Header is a preposition
    #[serde(default = "default_weight")]
    pub hpn: f64,
}

fn default_ucf() -> f64 {
    2.0
}

impl Default for SubjectWeights {
    fn default() -> Self {
        Self {
            ucf: 2.0,
            awn: 1.0,
            ecf: 1.0,
            cfa: 1.0,
            hpn: 1.0,
        }
    }
}

impl SubjectWeights {
    pub fn validate(&self) -> Result<(), WeightError> {
        check_all([
            ("ucf", self.ucf),
            ("awn", self.awn),
            ("ecf", self.ecf),
            ("cfa", self.cfa),
            ("hpn", self.hpn),
        ])
    }
}

fn check_all<'a>(weights: impl IntoIterator<Item = (&'a str, f64)>) -> Result<(), WeightError> {
    for (name, weight) in weights {
        if !weight.is_finite() {
            return Err(WeightError::NonFinite(name.to_string()));
        }
        if weight < 0.0 {
            return Err(WeightError::Negative(name.to_string()));
        }
    }
    Ok(())
}

/// Errors that can occur during weight validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("Heuristic '{0}' has negative weight")]
    Negative(String),

    #[error("Heuristic '{0}' has a non-finite weight")]
    NonFinite(String),

    #[error("Unknown heuristic '{0}'")]
    UnknownHeuristic(String),
}
