//! # semtab
//!
//! Semantic annotation of tables against a knowledge graph.
//!
//! Given a table as a list of row records, semtab labels every cell with named
//! entity / literal tags, classifies columns as categorical or literal, picks
//! the subject column, links cells to knowledge-graph entities and columns to
//! ontology classes, and assigns XML Schema datatypes to literal columns.
//!
//! ## Quick Start
//!
//! ```bash
//! semtab --input tables/ --output annotated/ --log-level debug
//! ```
//!
//! ```rust,no_run
//! use semtab::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(records: Vec<Record>) -> anyhow::Result<()> {
//! let lookup = LookupConfig::default();
//! let graph = Arc::new(GraphClient::new(&lookup)?);
//! let collaborators = Collaborators {
//!     labeler: Arc::new(FallbackLabeler::new(None)?),
//!     searches: vec![
//!         Arc::new(SearchClient::new(&lookup)?) as Arc<dyn EntitySearch>,
//!         graph.clone() as Arc<dyn EntitySearch>,
//!     ],
//!     graph: Arc::new(CachedGraph::new(graph)),
//! };
//!
//! let annotator = Annotator::new(AnnotatorConfig::default(), collaborators)?;
//! let (_table, report) = annotator.annotate_records("cities", &records).await?;
//! println!("{} cells annotated", report.annotated_cells);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `semtab-core` - Table, column, cell and candidate model, value cleaning, stage views
//! - `semtab-similarity` - Edit distance, heuristic weights, score aggregation
//! - `semtab-lookup` - Lookup service, SPARQL and NER clients with bounded retry
//! - `semtab-annotate` - Column classification, subject detection, entity and class ranking
//! - `semtab-storage` - Stage snapshots, batch loading, run manifest

pub mod config;
pub mod runner;

pub use semtab_core::{
    Cell, Column, ColumnType, Error, Label, LabelSet, Record, Result, Stage, StageSink, Table,
};
pub use semtab_annotate::{AnnotateError, AnnotationReport, Annotator, AnnotatorConfig, Collaborators};
pub use semtab_lookup::{
    CachedGraph, EntitySearch, FallbackLabeler, GraphClient, GraphQuery, LookupConfig, NerLabeler,
    SearchClient,
};
pub use semtab_storage::{RunManifest, StageStore};

pub use config::Settings;
pub use runner::{http_collaborators, BatchRunner};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnnotateError, AnnotationReport, Annotator, AnnotatorConfig, BatchRunner, CachedGraph,
        Cell, Collaborators, Column, ColumnType, EntitySearch, FallbackLabeler, GraphClient,
        GraphQuery, Label, LabelSet, LookupConfig, NerLabeler, Record, RunManifest, SearchClient,
        Settings, Stage, StageStore, Table,
    };
}
