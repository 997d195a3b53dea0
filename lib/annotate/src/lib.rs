//! # semtab Annotate
//!
//! The annotation engines and the pipeline that sequences them:
//!
//! - **Labeling**: NER labels per distinct cell value
//! - **Classification**: CATEGORICAL or LITERAL per column
//! - **Subject**: the single most thematic categorical column
//! - **Entities**: candidate lookup, heuristic ranking and cell annotation
//! - **Classes**: majority voting and heading similarity per column
//! - **Literals**: XML Schema datatype per literal column
//!
//! Collaborators are injected as trait objects, see [`Collaborators`].

pub mod class;
pub mod classify;
pub mod config;
pub mod entity;
pub mod error;
pub mod explain;
pub mod heuristics;
pub mod labeling;
pub mod literal;
pub mod mapping;
pub mod pipeline;
pub mod subject;

pub use class::{ClassRanker, ClassStats};
pub use classify::{classify_columns, LabelCounts};
pub use config::{AnnotatorConfig, DEFAULT_AWN_THRESHOLD};
pub use entity::{EntityRanker, FindStats};
pub use error::{AnnotateError, Result};
pub use explain::{explain_table, CellExplanation, ColumnExplanation, TableExplanation};
pub use heuristics::{
    CellContext, ClassHeuristic, ColumnContext, EntityHeuristic, HeadingSimilarity, NerSimilarity,
    Neutral, StringSimilarity,
};
pub use labeling::{label_cells, LabelingStats};
pub use literal::{annotate_literal_columns, column_datatype};
pub use pipeline::{AnnotationReport, Annotator, Collaborators};
pub use subject::{ColumnScore, SubjectFeatures, SubjectIdentifier, SubjectOutcome};
