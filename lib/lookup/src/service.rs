//! Collaborator seams used by the annotation pipeline
//!
//! Production code talks to HTTP services through these traits. Tests plug in
//! in-memory fakes.

use crate::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use semtab_core::LabelSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One candidate returned by a lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupHit {
    pub uri: String,
    pub label: String,
    #[serde(default)]
    pub comment: String,
}

impl LookupHit {
    pub fn new(uri: impl Into<String>, label: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
            comment: comment.into(),
        }
    }
}

/// Label and comment of a knowledge-graph class, keyed by class URI
pub type ClassInfo = IndexMap<String, (String, String)>;

/// Full-text entity search
#[async_trait]
pub trait EntitySearch: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn search_entities(&self, query: &str) -> Result<Vec<LookupHit>>;
}

/// Structural queries against the knowledge graph
#[async_trait]
pub trait GraphQuery: Send + Sync {
    /// Number of intermediate classes linking the entity's types to any of
    /// `classes`. Zero means unreachable.
    async fn distance_to_class(&self, entity_uri: &str, classes: &[String]) -> Result<u32>;

    /// Direct classes of an entity, in endpoint order
    async fn classes_for_entity(&self, entity_uri: &str) -> Result<ClassInfo>;

    /// Classes whose label matches `query`
    async fn candidate_classes(&self, query: &str) -> Result<Vec<LookupHit>>;
}

/// Named-entity tagging of a single cell value
#[async_trait]
pub trait NerLabeler: Send + Sync {
    /// `None` when the labeler has no opinion
    async fn label_span(&self, text: &str) -> Result<Option<LabelSet>>;
}

#[async_trait]
impl<T: EntitySearch + ?Sized> EntitySearch for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn search_entities(&self, query: &str) -> Result<Vec<LookupHit>> {
        (**self).search_entities(query).await
    }
}

#[async_trait]
impl<T: GraphQuery + ?Sized> GraphQuery for Arc<T> {
    async fn distance_to_class(&self, entity_uri: &str, classes: &[String]) -> Result<u32> {
        (**self).distance_to_class(entity_uri, classes).await
    }

    async fn classes_for_entity(&self, entity_uri: &str) -> Result<ClassInfo> {
        (**self).classes_for_entity(entity_uri).await
    }

    async fn candidate_classes(&self, query: &str) -> Result<Vec<LookupHit>> {
        (**self).candidate_classes(query).await
    }
}

#[async_trait]
impl<T: NerLabeler + ?Sized> NerLabeler for Arc<T> {
    async fn label_span(&self, text: &str) -> Result<Option<LabelSet>> {
        (**self).label_span(text).await
    }
}
