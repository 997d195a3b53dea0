use crate::{ClassInfo, GraphQuery, LookupHit, Result};
use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Memoizing wrapper around a [`GraphQuery`].
///
/// Successful answers are cached for the lifetime of the wrapper; errors are
/// never cached so a later call can retry.
pub struct CachedGraph<G> {
    inner: G,
    distances: RwLock<AHashMap<(String, Vec<String>), u32>>,
    entity_classes: RwLock<AHashMap<String, ClassInfo>>,
    class_candidates: RwLock<AHashMap<String, Vec<LookupHit>>>,
}

impl<G: GraphQuery> CachedGraph<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            distances: RwLock::new(AHashMap::new()),
            entity_classes: RwLock::new(AHashMap::new()),
            class_candidates: RwLock::new(AHashMap::new()),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Number of cached entries across all query kinds
    pub fn cached_entries(&self) -> usize {
        self.distances.read().len()
            + self.entity_classes.read().len()
            + self.class_candidates.read().len()
    }

    pub fn clear(&self) {
        self.distances.write().clear();
        self.entity_classes.write().clear();
        self.class_candidates.write().clear();
    }
}

#[async_trait]
impl<G: GraphQuery> GraphQuery for CachedGraph<G> {
    async fn distance_to_class(&self, entity_uri: &str, classes: &[String]) -> Result<u32> {
        let key = (entity_uri.to_string(), classes.to_vec());
        let cached = self.distances.read().get(&key).copied();
        if let Some(distance) = cached {
            return Ok(distance);
        }
        let distance = self.inner.distance_to_class(entity_uri, classes).await?;
        self.distances.write().insert(key, distance);
        Ok(distance)
    }

    async fn classes_for_entity(&self, entity_uri: &str) -> Result<ClassInfo> {
        let cached = self.entity_classes.read().get(entity_uri).cloned();
        if let Some(classes) = cached {
            return Ok(classes);
        }
        let classes = self.inner.classes_for_entity(entity_uri).await?;
        self.entity_classes
            .write()
            .insert(entity_uri.to_string(), classes.clone());
        Ok(classes)
    }

    async fn candidate_classes(&self, query: &str) -> Result<Vec<LookupHit>> {
        let cached = self.class_candidates.read().get(query).cloned();
        if let Some(hits) = cached {
            return Ok(hits);
        }
        let hits = self.inner.candidate_classes(query).await?;
        self.class_candidates
            .write()
            .insert(query.to_string(), hits.clone());
        Ok(hits)
    }
}
