//! Cell labelers: a remote NER model plus the rule-based fallback

use crate::http::HttpBackend;
use crate::{LookupConfig, LookupError, NerLabeler, Result};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use semtab_core::{Label, LabelSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

/// Either `{"labels": [...]}`, `{"label": "..."}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NerResponse {
    Many { labels: Vec<String> },
    One { label: Option<String> },
    Bare(Vec<String>),
}

impl NerResponse {
    fn into_label_set(self) -> Option<LabelSet> {
        let raw = match self {
            NerResponse::Many { labels } | NerResponse::Bare(labels) => labels,
            NerResponse::One { label } => label.into_iter().collect(),
        };
        let set: LabelSet = raw
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(Label::from)
            .collect();
        (!set.is_empty()).then_some(set)
    }
}

/// NER model served over HTTP
pub struct RemoteNer {
    backend: HttpBackend,
    url: String,
}

impl RemoteNer {
    pub fn new(url: impl Into<String>, config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            backend: HttpBackend::new(config)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NerLabeler for RemoteNer {
    async fn label_span(&self, text: &str) -> Result<Option<LabelSet>> {
        let response: NerResponse = self
            .backend
            .post_json("ner", &self.url, &NerRequest { text })
            .await?;
        Ok(response.into_label_set())
    }
}

/// Regex detectors for literal shapes, tried in order; first match wins
pub struct PatternLabeler {
    detectors: Vec<(Label, Regex)>,
}

impl PatternLabeler {
    pub fn new() -> Result<Self> {
        let patterns: [(Label, &str); 10] = [
            (Label::Url, r"^(https?://|www\.)\S+$"),
            (Label::Email, r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$"),
            (
                Label::Date,
                r"^(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/.]\d{1,2}[/.]\d{2,4}|\d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{4}|(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})$",
            ),
            (Label::Time, r"^\d{1,2}:\d{2}(:\d{2})?\s?([ap]\.?m\.?)?$"),
            (Label::Percent, r"^[-+]?\d+([.,]\d+)?\s?(%|percent)$"),
            (
                Label::Money,
                r"^([$€£¥]\s?\d[\d,]*(\.\d+)?|\d[\d,]*(\.\d+)?\s?(usd|eur|gbp|jpy|[$€£¥]))$",
            ),
            (Label::Ordinal, r"^\d+(st|nd|rd|th)$"),
            (Label::Cardinal, r"^[-+]?(\d{1,3}(,\d{3})+|\d+)(\.\d+)?$"),
            (Label::Phone, r"^\+?\(?\d{1,4}\)?([\s.-]\(?\d{2,4}\)?){2,5}$"),
            (Label::Boolean, r"^(true|false|yes|no)$"),
        ];

        let detectors = patterns
            .into_iter()
            .map(|(label, pattern)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (label, re))
                    .map_err(|e| LookupError::InvalidConfig(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { detectors })
    }

    pub fn detect(&self, text: &str) -> Option<Label> {
        let text = text.trim();
        self.detectors
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(label, _)| label.clone())
    }
}

#[async_trait]
impl NerLabeler for PatternLabeler {
    async fn label_span(&self, text: &str) -> Result<Option<LabelSet>> {
        Ok(self.detect(text).map(LabelSet::single))
    }
}

/// Wraps an optional primary labeler with the mandatory fallback rules:
/// blank text is EMPTY, bare numerals are CARDINAL, then optional patterns.
///
/// Failures of the primary are logged and treated as "no opinion".
pub struct FallbackLabeler {
    primary: Option<Arc<dyn NerLabeler>>,
    patterns: Option<PatternLabeler>,
    numeric: Regex,
}

impl FallbackLabeler {
    pub fn new(primary: Option<Arc<dyn NerLabeler>>) -> Result<Self> {
        Ok(Self {
            primary,
            patterns: None,
            numeric: Regex::new(r"^[-+]?\d+([.,]\d+)*$")
                .map_err(|e| LookupError::InvalidConfig(e.to_string()))?,
        })
    }

    pub fn with_patterns(mut self) -> Result<Self> {
        self.patterns = Some(PatternLabeler::new()?);
        Ok(self)
    }
}

#[async_trait]
impl NerLabeler for FallbackLabeler {
    async fn label_span(&self, text: &str) -> Result<Option<LabelSet>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Some(LabelSet::single(Label::Empty)));
        }

        if let Some(primary) = &self.primary {
            match primary.label_span(trimmed).await {
                Ok(Some(labels)) if !labels.is_empty() => return Ok(Some(labels)),
                Ok(_) => {}
                Err(e) => warn!(text = trimmed, err = %e, "Primary labeler failed, using fallback"),
            }
        }

        if self.numeric.is_match(trimmed) {
            return Ok(Some(LabelSet::single(Label::Cardinal)));
        }

        match &self.patterns {
            Some(patterns) => patterns.label_span(trimmed).await,
            None => Ok(None),
        }
    }
}
