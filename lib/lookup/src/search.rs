//! Full-text entity search over a DBpedia-Lookup style service

use crate::http::HttpBackend;
use crate::{EntitySearch, LookupConfig, LookupError, LookupHit, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

/// Every field arrives as an array; only the first element is used
#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    resource: Vec<String>,
    #[serde(default)]
    label: Vec<String>,
    #[serde(default)]
    comment: Vec<String>,
}

pub struct SearchClient {
    backend: HttpBackend,
    url: String,
    max_results: usize,
    markup: Regex,
}

impl SearchClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            backend: HttpBackend::new(config)?,
            url: config.search_url.clone(),
            max_results: config.effective_max_results(),
            markup: Regex::new(r"</?[A-Za-z][^>]*>")
                .map_err(|e| LookupError::InvalidConfig(e.to_string()))?,
        })
    }

    fn hits_from_docs(&self, docs: Vec<SearchDoc>) -> Vec<LookupHit> {
        let mut hits: Vec<LookupHit> = docs
            .into_iter()
            .filter_map(|doc| {
                let uri = doc.resource.into_iter().next()?;
                let label = doc.label.into_iter().next().unwrap_or_default();
                let comment = doc.comment.into_iter().next().unwrap_or_default();
                Some(LookupHit::new(
                    uri,
                    strip_markup(&self.markup, &label),
                    strip_markup(&self.markup, &comment),
                ))
            })
            .collect();

        // stable: equal lengths keep service order
        hits.sort_by_key(|hit| hit.label.chars().count());
        hits.truncate(self.max_results);
        hits
    }
}

#[async_trait]
impl EntitySearch for SearchClient {
    fn name(&self) -> &str {
        "lookup"
    }

    async fn search_entities(&self, query: &str) -> Result<Vec<LookupHit>> {
        let max_results = self.max_results.to_string();
        let params = [
            ("query", query),
            ("format", "JSON"),
            ("maxResults", max_results.as_str()),
        ];
        let response: SearchResponse = self
            .backend
            .get_json("lookup search", &self.url, &params)
            .await?;

        let hits = self.hits_from_docs(response.docs);
        debug!(query, hits = hits.len(), "Lookup search completed");
        Ok(hits)
    }
}

fn strip_markup(markup: &Regex, text: &str) -> String {
    markup.replace_all(text, "").trim().to_string()
}
