use crate::{AnnotateError, Result};
use semtab_similarity::{ClassWeights, EntityWeights, SubjectWeights};
use serde::{Deserialize, Serialize};

/// Average word count above which a column is treated as verbose
pub const DEFAULT_AWN_THRESHOLD: f64 = 10.0;

/// Tuning for the annotation pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Feature weights for subject column detection
    pub subject_weights: SubjectWeights,
    /// Heuristic weights for cell-entity ranking
    pub entity_weights: EntityWeights,
    /// Heuristic weights for column-class ranking
    pub class_weights: ClassWeights,
    /// Average words per cell above which the word-count feature is rescaled
    pub awn_threshold: f64,
    /// Force this column to be the subject, skipping detection
    pub subject_column: Option<usize>,
    /// Concurrent labeling and lookup requests within a column
    pub concurrency: usize,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            subject_weights: SubjectWeights::default(),
            entity_weights: EntityWeights::default(),
            class_weights: ClassWeights::default(),
            awn_threshold: DEFAULT_AWN_THRESHOLD,
            subject_column: None,
            concurrency: 4,
        }
    }
}

impl AnnotatorConfig {
    pub fn validate(&self) -> Result<()> {
        self.subject_weights.validate()?;
        self.entity_weights.validate()?;
        self.class_weights.validate()?;
        if !self.awn_threshold.is_finite() || self.awn_threshold <= 0.0 {
            return Err(AnnotateError::InvalidConfig(
                "awn_threshold must be positive".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(AnnotateError::InvalidConfig(
                "concurrency must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
