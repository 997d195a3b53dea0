// Batch driver: wire collaborators from settings and annotate every input
use crate::config::Settings;
use anyhow::Result;
use semtab_annotate::{Annotator, Collaborators};
use semtab_core::StageSink;
use semtab_lookup::{
    CachedGraph, EntitySearch, FallbackLabeler, GraphClient, NerLabeler, RemoteNer, SearchClient,
};
use semtab_storage::{Batch, EntryStatus, RunManifest, StageStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP-backed collaborators.
///
/// The SPARQL client serves both as graph oracle (behind a per-run cache) and
/// as a second entity search after the full-text lookup service.
pub fn http_collaborators(settings: &Settings) -> Result<Collaborators> {
    let lookup = &settings.lookup;

    let primary: Option<Arc<dyn NerLabeler>> = match &lookup.ner_url {
        Some(url) => Some(Arc::new(RemoteNer::new(url.clone(), lookup)?) as Arc<dyn NerLabeler>),
        None => None,
    };
    let mut labeler = FallbackLabeler::new(primary)?;
    if settings.literal_patterns {
        labeler = labeler.with_patterns()?;
    }

    let graph_client = Arc::new(GraphClient::new(lookup)?);
    let searches: Vec<Arc<dyn EntitySearch>> = vec![
        Arc::new(SearchClient::new(lookup)?) as Arc<dyn EntitySearch>,
        graph_client.clone() as Arc<dyn EntitySearch>,
    ];

    Ok(Collaborators {
        labeler: Arc::new(labeler),
        searches,
        graph: Arc::new(CachedGraph::new(graph_client)),
    })
}

pub struct BatchRunner {
    annotator: Annotator,
    store: Arc<StageStore>,
    explain: bool,
}

impl BatchRunner {
    pub fn new(settings: &Settings, collaborators: Collaborators, output: &Path) -> Result<Self> {
        let mut store = StageStore::new(output)?;
        if !settings.output.pretty {
            store = store.compact();
        }
        let store = Arc::new(store);
        let annotator = Annotator::new(settings.annotator.clone(), collaborators)?
            .with_sink(store.clone() as Arc<dyn StageSink>);

        Ok(Self {
            annotator,
            store,
            explain: settings.output.explain,
        })
    }

    pub fn store(&self) -> &StageStore {
        &self.store
    }

    /// Annotate each loaded table in order. A table that fails is recorded and
    /// the batch moves on.
    pub async fn run(&self, batch: Batch) -> Result<RunManifest> {
        let mut manifest = RunManifest::new();

        for failure in &batch.failures {
            println!("SKIP {}: {}", failure.path.display(), failure.error);
            manifest.record_skipped(&failure.path, &failure.error);
        }

        for input in &batch.tables {
            let outcome = self
                .annotator
                .annotate_records(&input.table_name, &input.records)
                .await;

            match outcome {
                Ok((table, report)) => {
                    if self.explain {
                        let explanation = self.annotator.explain(&table);
                        if let Err(e) = self.store.write_document(&input.table_name, "explain", &explanation) {
                            warn!(table = %input.table_name, err = %e, "Failed to write explanation");
                        }
                    }
                    println!(
                        "OK   {}: {} of {} cells, {} columns annotated ({} ms)",
                        input.path.display(),
                        report.annotated_cells,
                        report.rows * report.columns,
                        report.annotated_columns + report.literal_columns,
                        report.elapsed_ms
                    );
                    manifest.record_annotated(&input.path, &input.table_name, &input.sha256, &report);
                }
                Err(e) => {
                    println!("FAIL {}: {}", input.path.display(), e);
                    manifest.record_failed(&input.path, &input.table_name, &input.sha256, &e.to_string());
                }
            }
        }

        manifest.finish();
        manifest.write(self.store.root())?;
        info!(
            annotated = manifest.count(EntryStatus::Annotated),
            failed = manifest.count(EntryStatus::Failed),
            skipped = manifest.count(EntryStatus::Skipped),
            "Batch finished"
        );
        Ok(manifest)
    }
}
