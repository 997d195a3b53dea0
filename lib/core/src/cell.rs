use crate::clean::clear_value;
use crate::{CandidateEntity, Error, LabelSet, Result};
use serde::{Deserialize, Serialize};

/// One table entry: its value and the annotation state derived from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    source_value: Option<String>,
    #[serde(default)]
    cleared_value: Option<String>,
    #[serde(default)]
    label: Option<LabelSet>,
    #[serde(default)]
    candidate_entities: Option<Vec<CandidateEntity>>,
    #[serde(default)]
    annotation: Option<String>,
}

impl Cell {
    /// Create a cell from a raw value, cleaning it
    #[inline]
    #[must_use]
    pub fn new(source_value: Option<String>) -> Self {
        let cleared_value = source_value.as_deref().and_then(clear_value);
        Self {
            source_value,
            cleared_value,
            ..Default::default()
        }
    }

    /// Create a cell from an already-cleared value. Empty strings become `None`.
    #[inline]
    #[must_use]
    pub fn from_cleared(value: Option<String>) -> Self {
        let value = value.filter(|v| !v.is_empty());
        Self {
            source_value: value.clone(),
            cleared_value: value,
            ..Default::default()
        }
    }

    pub fn source_value(&self) -> Option<&str> {
        self.source_value.as_deref()
    }

    pub fn cleared_value(&self) -> Option<&str> {
        self.cleared_value.as_deref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cleared_value.is_none()
    }

    pub fn label(&self) -> Option<&LabelSet> {
        self.label.as_ref()
    }

    pub fn set_label(&mut self, label: LabelSet) -> Result<()> {
        if self.label.is_some() {
            return Err(Error::LabelAlreadySet);
        }
        self.label = Some(label);
        Ok(())
    }

    pub fn candidate_entities(&self) -> Option<&[CandidateEntity]> {
        self.candidate_entities.as_deref()
    }

    /// Scores may be recorded through this; the list itself keeps its shape
    pub fn candidate_entities_mut(&mut self) -> Option<&mut [CandidateEntity]> {
        self.candidate_entities.as_deref_mut()
    }

    #[inline]
    pub fn has_candidates(&self) -> bool {
        self.candidate_entities.is_some()
    }

    pub fn set_candidate_entities(&mut self, candidates: Vec<CandidateEntity>) -> Result<()> {
        if self.candidate_entities.is_some() {
            return Err(Error::CandidatesAlreadySet);
        }
        self.candidate_entities = Some(candidates);
        Ok(())
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn set_annotation(&mut self, uri: impl Into<String>) -> Result<()> {
        if let Some(existing) = &self.annotation {
            return Err(Error::AnnotationAlreadySet(existing.clone()));
        }
        self.annotation = Some(uri.into());
        Ok(())
    }
}
