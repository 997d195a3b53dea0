use crate::{LookupError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on hits requested from a search service
pub const MAX_RESULTS_CAP: usize = 100;

/// Endpoints and limits for the lookup collaborators.
///
/// Passed to each client at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// Full-text entity search endpoint
    pub search_url: String,
    /// SPARQL endpoint
    pub graph_url: String,
    /// NER model endpoint, if any
    pub ner_url: Option<String>,
    /// Only classes under this namespace count for majority voting
    pub class_namespace: Option<String>,
    /// Hits kept per search, clamped to 1..=100
    pub max_results: usize,
    /// Timeout of a single attempt, in milliseconds
    pub request_timeout_ms: u64,
    /// Requests in flight at once per client
    pub concurrency: usize,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            search_url: "https://lookup.dbpedia.org/api/search".to_string(),
            graph_url: "https://dbpedia.org/sparql".to_string(),
            ner_url: None,
            class_namespace: Some("http://dbpedia.org/ontology/".to_string()),
            max_results: MAX_RESULTS_CAP,
            request_timeout_ms: 30_000,
            concurrency: 4,
            retry: RetryConfig::default(),
        }
    }
}

impl LookupConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `max_results` clamped to `1..=100`
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS_CAP)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search_url.trim().is_empty() {
            return Err(LookupError::InvalidConfig("search_url is empty".to_string()));
        }
        if self.graph_url.trim().is_empty() {
            return Err(LookupError::InvalidConfig("graph_url is empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(LookupError::InvalidConfig(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(LookupError::InvalidConfig("concurrency must be positive".to_string()));
        }
        self.retry.validate()
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Wait before the first retry
    pub initial_backoff_ms: u64,
    /// Upper bound on any wait, jitter included
    pub max_backoff_ms: u64,
    /// Growth factor between consecutive waits, at least 1
    pub backoff_multiplier: f64,
    /// Add up to 25% random jitter to each backoff
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No retries, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(LookupError::InvalidConfig(
                "backoff_multiplier must be >= 1".to_string(),
            ));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(LookupError::InvalidConfig(
                "initial_backoff_ms exceeds max_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Backoff before retry number `attempt` (0-based)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let max = self.max_backoff_ms as f64;
        let base = (self.initial_backoff_ms as f64
            * self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32))
        .min(max);

        let millis = if self.jitter {
            (base * (1.0 + rand::random::<f64>() * 0.25)).min(max)
        } else {
            base
        };
        Duration::from_millis(millis as u64)
    }
}
