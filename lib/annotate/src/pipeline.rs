//! Stage orchestration
//!
//! Stages run to completion in a fixed order over the whole table. After
//! each one the optional [`StageSink`] receives the table so intermediate
//! state can be persisted.

use crate::class::{ClassRanker, ClassStats};
use crate::classify::classify_columns;
use crate::entity::{EntityRanker, FindStats};
use crate::explain::{explain_table, TableExplanation};
use crate::heuristics::{ClassHeuristic, EntityHeuristic, NerSimilarity};
use crate::labeling::{label_cells, LabelingStats};
use crate::literal::annotate_literal_columns;
use crate::subject::{SubjectIdentifier, SubjectOutcome};
use crate::{AnnotateError, AnnotatorConfig, Result};
use semtab_core::{Record, Stage, StageSink, Table};
use semtab_lookup::{EntitySearch, GraphQuery, NerLabeler};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// External services the pipeline depends on
#[derive(Clone)]
pub struct Collaborators {
    pub labeler: Arc<dyn NerLabeler>,
    /// Merged in order when looking up entities
    pub searches: Vec<Arc<dyn EntitySearch>>,
    pub graph: Arc<dyn GraphQuery>,
}

/// What happened to one table
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationReport {
    pub table_name: String,
    pub rows: usize,
    pub columns: usize,
    pub labeling: LabelingStats,
    pub subject: SubjectOutcome,
    pub candidates: FindStats,
    pub ranked_cells: usize,
    pub annotated_cells: usize,
    pub classes: ClassStats,
    pub annotated_columns: usize,
    pub literal_columns: usize,
    pub elapsed_ms: u64,
}

pub struct Annotator {
    config: AnnotatorConfig,
    labeler: Arc<dyn NerLabeler>,
    subject: SubjectIdentifier,
    entities: EntityRanker,
    classes: ClassRanker,
    sink: Option<Arc<dyn StageSink>>,
}

impl Annotator {
    pub fn new(config: AnnotatorConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let concurrency = config.concurrency;

        let subject = SubjectIdentifier::new(config.subject_weights.clone(), config.awn_threshold)?;
        let ner = NerSimilarity::new(collaborators.graph.clone()).with_concurrency(concurrency);
        let entities = EntityRanker::new(
            collaborators.searches,
            collaborators.graph.clone(),
            config.entity_weights.clone(),
        )?
        .with_heuristic(Arc::new(ner))
        .with_concurrency(concurrency);
        let classes = ClassRanker::new(collaborators.graph, config.class_weights.clone())?
            .with_concurrency(concurrency);

        Ok(Self {
            config,
            labeler: collaborators.labeler,
            subject,
            entities,
            classes,
            sink: None,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn StageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_entity_heuristic(mut self, heuristic: Arc<dyn EntityHeuristic>) -> Self {
        self.entities = self.entities.with_heuristic(heuristic);
        self
    }

    pub fn with_class_heuristic(mut self, heuristic: Arc<dyn ClassHeuristic>) -> Self {
        self.classes = self.classes.with_heuristic(heuristic);
        self
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Build a table from raw records and annotate it.
    ///
    /// Malformed input fails before any stage runs.
    pub async fn annotate_records(
        &self,
        table_name: &str,
        records: &[Record],
    ) -> Result<(Table, AnnotationReport)> {
        let mut table = Table::from_records(table_name, records)?;
        let report = self.annotate(&mut table).await?;
        Ok((table, report))
    }

    /// Run every stage on a table. Stages that already ran on it leave their
    /// results untouched.
    pub async fn annotate(&self, table: &mut Table) -> Result<AnnotationReport> {
        let started = Instant::now();
        let concurrency = self.config.concurrency;
        self.persist(table, Stage::Cleaned)?;

        let labeling = label_cells(table, self.labeler.as_ref(), concurrency).await?;
        debug!(table = table.table_name(), ?labeling, "Cells labeled");
        self.persist(table, Stage::Labeled)?;

        classify_columns(table)?;
        self.persist(table, Stage::Classified)?;

        let subject = match table.subject_column_index() {
            Some(column) if self.config.subject_column.is_none() => {
                SubjectOutcome::Kept { column }
            }
            _ => self.subject.identify(table, self.config.subject_column)?,
        };
        self.persist(table, Stage::SubjectIdentified)?;

        let candidates = self.entities.find_candidates(table).await?;
        debug!(table = table.table_name(), ?candidates, "Entity candidates found");
        self.persist(table, Stage::CandidatesFound)?;

        let ranked_cells = self.entities.rank(table).await?;
        self.persist(table, Stage::EntitiesRanked)?;

        let annotated_cells = self.entities.annotate(table)?;
        self.persist(table, Stage::CellsAnnotated)?;

        let classes = self.classes.rank(table).await?;
        self.persist(table, Stage::ClassesRanked)?;

        let annotated_columns = self.classes.annotate(table)?;
        let literal_columns = annotate_literal_columns(table)?;
        self.persist(table, Stage::ColumnsAnnotated)?;

        let report = AnnotationReport {
            table_name: table.table_name().to_string(),
            rows: table.rows_number(),
            columns: table.columns_number(),
            labeling,
            subject,
            candidates,
            ranked_cells,
            annotated_cells,
            classes,
            annotated_columns,
            literal_columns,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            table = %report.table_name,
            subject = ?report.subject.column(),
            annotated_cells,
            annotated_columns,
            literal_columns,
            elapsed_ms = report.elapsed_ms,
            "Table annotated"
        );
        Ok(report)
    }

    pub fn explain(&self, table: &Table) -> TableExplanation {
        explain_table(table, &self.config.entity_weights, &self.config.class_weights)
    }

    fn persist(&self, table: &Table, stage: Stage) -> Result<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        sink.persist(table, stage).map_err(|e| AnnotateError::Sink {
            stage,
            message: e.to_string(),
        })
    }
}
