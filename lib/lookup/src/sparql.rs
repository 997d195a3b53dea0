//! Knowledge-graph queries over a SPARQL 1.1 endpoint

use crate::http::HttpBackend;
use crate::{ClassInfo, EntitySearch, GraphQuery, LookupConfig, LookupError, LookupHit, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const RESULTS_FORMAT: &str = "application/sparql-results+json";

const PREFIXES: &str = "PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
PREFIX owl: <http://www.w3.org/2002/07/owl#>\n";

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

type Bindings = Vec<HashMap<String, SparqlTerm>>;

fn binding<'a>(row: &'a HashMap<String, SparqlTerm>, var: &str) -> Option<&'a str> {
    row.get(var).map(|term| term.value.as_str())
}

pub struct GraphClient {
    backend: HttpBackend,
    url: String,
    max_results: usize,
    class_namespace: Option<String>,
}

impl GraphClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            backend: HttpBackend::new(config)?,
            url: config.graph_url.clone(),
            max_results: config.effective_max_results(),
            class_namespace: config.class_namespace.clone(),
        })
    }

    async fn select(&self, operation: &str, query: &str) -> Result<Bindings> {
        let form = [("query", query), ("format", RESULTS_FORMAT)];
        let response: SparqlResponse = self
            .backend
            .post_form(operation, &self.url, RESULTS_FORMAT, &form)
            .await?;
        debug!(operation, rows = response.results.bindings.len(), "SPARQL query completed");
        Ok(response.results.bindings)
    }

    fn hits(bindings: &Bindings) -> Vec<LookupHit> {
        let mut seen = std::collections::HashSet::new();
        bindings
            .iter()
            .filter_map(|row| {
                let uri = binding(row, "uri")?;
                if !seen.insert(uri.to_string()) {
                    return None;
                }
                Some(LookupHit::new(
                    uri,
                    binding(row, "label").unwrap_or_default(),
                    binding(row, "comment").unwrap_or_default(),
                ))
            })
            .collect()
    }
}

#[async_trait]
impl GraphQuery for GraphClient {
    async fn distance_to_class(&self, entity_uri: &str, classes: &[String]) -> Result<u32> {
        if classes.is_empty() {
            return Ok(0);
        }
        let query = distance_query(entity_uri, classes)?;
        let bindings = self.select("distance to class", &query).await?;
        let distance = bindings
            .first()
            .and_then(|row| binding(row, "distance"))
            .map(|value| {
                value
                    .parse::<u32>()
                    .map_err(|_| LookupError::Decode(format!("distance is not a count: {}", value)))
            })
            .transpose()?
            .unwrap_or(0);
        Ok(distance)
    }

    async fn classes_for_entity(&self, entity_uri: &str) -> Result<ClassInfo> {
        let query = classes_query(entity_uri, self.class_namespace.as_deref())?;
        let bindings = self.select("classes for entity", &query).await?;

        let mut classes = ClassInfo::new();
        for row in &bindings {
            let Some(class) = binding(row, "class") else {
                continue;
            };
            classes.entry(class.to_string()).or_insert_with(|| {
                (
                    binding(row, "label").unwrap_or_default().to_string(),
                    binding(row, "comment").unwrap_or_default().to_string(),
                )
            });
        }
        Ok(classes)
    }

    async fn candidate_classes(&self, query: &str) -> Result<Vec<LookupHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let sparql = candidate_classes_query(query, self.max_results);
        let bindings = self.select("candidate classes", &sparql).await?;
        Ok(Self::hits(&bindings))
    }
}

/// Exact-label entity search, for endpoints without a full-text service
#[async_trait]
impl EntitySearch for GraphClient {
    fn name(&self) -> &str {
        "sparql"
    }

    async fn search_entities(&self, query: &str) -> Result<Vec<LookupHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let sparql = label_search_query(query, self.max_results);
        let bindings = self.select("label search", &sparql).await?;
        Ok(Self::hits(&bindings))
    }
}

fn distance_query(entity_uri: &str, classes: &[String]) -> Result<String> {
    let entity = iri(entity_uri)?;
    let targets = classes.iter().map(|c| iri(c)).collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "{PREFIXES}SELECT (COUNT(DISTINCT ?mid) AS ?distance) WHERE {{\n  \
         VALUES ?target {{ {} }}\n  \
         {entity} rdf:type/rdfs:subClassOf* ?mid .\n  \
         ?mid rdfs:subClassOf* ?target .\n}}",
        targets.join(" ")
    ))
}

fn classes_query(entity_uri: &str, namespace: Option<&str>) -> Result<String> {
    let entity = iri(entity_uri)?;
    let filter = namespace
        .map(|ns| format!("  FILTER(STRSTARTS(STR(?class), {}))\n", literal(ns)))
        .unwrap_or_default();
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?class ?label ?comment WHERE {{\n  \
         {entity} rdf:type ?class .\n{filter}  \
         OPTIONAL {{ ?class rdfs:label ?label . FILTER(LANGMATCHES(LANG(?label), \"en\")) }}\n  \
         OPTIONAL {{ ?class rdfs:comment ?comment . FILTER(LANGMATCHES(LANG(?comment), \"en\")) }}\n}}"
    ))
}

fn candidate_classes_query(text: &str, limit: usize) -> String {
    format!(
        "{PREFIXES}SELECT DISTINCT ?uri ?label ?comment WHERE {{\n  \
         ?uri a owl:Class ; rdfs:label ?label .\n  \
         FILTER(LANGMATCHES(LANG(?label), \"en\") && CONTAINS(LCASE(STR(?label)), LCASE({})))\n  \
         OPTIONAL {{ ?uri rdfs:comment ?comment . FILTER(LANGMATCHES(LANG(?comment), \"en\")) }}\n}}\n\
         ORDER BY STRLEN(STR(?label))\nLIMIT {limit}",
        literal(text)
    )
}

fn label_search_query(text: &str, limit: usize) -> String {
    let value = literal(text);
    format!(
        "{PREFIXES}SELECT DISTINCT ?uri ?label ?comment WHERE {{\n  \
         VALUES ?label {{ {value}@en {value} }}\n  \
         ?uri rdfs:label ?label .\n  \
         OPTIONAL {{ ?uri rdfs:comment ?comment . FILTER(LANGMATCHES(LANG(?comment), \"en\")) }}\n}}\n\
         LIMIT {limit}"
    )
}

/// `<uri>` after rejecting characters SPARQL forbids inside IRI references
fn iri(uri: &str) -> Result<String> {
    let invalid = uri.is_empty()
        || uri
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "<>\"{}|^`\\".contains(c));
    if invalid {
        return Err(LookupError::InvalidUri(uri.to_string()));
    }
    Ok(format!("<{}>", uri))
}

/// Double-quoted string literal with escapes
fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_escaping() {
        assert_eq!(literal(r#"say "hi"\"#), r#""say \"hi\"\\""#);
        assert_eq!(literal("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn test_iri_rejects_unsafe_characters() {
        assert_eq!(iri("http://dbpedia.org/resource/Paris").unwrap(), "<http://dbpedia.org/resource/Paris>");
        assert!(matches!(iri("http://x.org/a b"), Err(LookupError::InvalidUri(_))));
        assert!(matches!(iri("http://x.org/a>"), Err(LookupError::InvalidUri(_))));
        assert!(matches!(iri(""), Err(LookupError::InvalidUri(_))));
    }

    #[test]
    fn test_distance_query_lists_every_target() {
        let classes = vec![
            "http://dbpedia.org/ontology/City".to_string(),
            "http://dbpedia.org/ontology/Country".to_string(),
        ];
        let query = distance_query("http://dbpedia.org/resource/Paris", &classes).unwrap();
        assert!(query.contains("VALUES ?target { <http://dbpedia.org/ontology/City> <http://dbpedia.org/ontology/Country> }"));
        assert!(query.contains("<http://dbpedia.org/resource/Paris> rdf:type/rdfs:subClassOf* ?mid"));
    }

    #[test]
    fn test_classes_query_namespace_filter() {
        let query = classes_query("http://dbpedia.org/resource/Paris", Some("http://dbpedia.org/ontology/")).unwrap();
        assert!(query.contains("STRSTARTS(STR(?class), \"http://dbpedia.org/ontology/\")"));
        let query = classes_query("http://dbpedia.org/resource/Paris", None).unwrap();
        assert!(!query.contains("STRSTARTS"));
    }

    #[test]
    fn test_bindings_to_hits_dedup() {
        let body = r#"{"head": {"vars": ["uri", "label"]}, "results": {"bindings": [
            {"uri": {"type": "uri", "value": "http://dbpedia.org/ontology/City"}, "label": {"type": "literal", "value": "city"}},
            {"uri": {"type": "uri", "value": "http://dbpedia.org/ontology/City"}, "label": {"type": "literal", "value": "ville"}},
            {"label": {"type": "literal", "value": "orphan"}}
        ]}}"#;
        let response: SparqlResponse = serde_json::from_str(body).unwrap();
        let hits = GraphClient::hits(&response.results.bindings);
        assert_eq!(hits, vec![LookupHit::new("http://dbpedia.org/ontology/City", "city", "")]);
    }
}
