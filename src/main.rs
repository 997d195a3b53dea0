use clap::Parser;
use semtab::config::Settings;
use semtab::runner::{http_collaborators, BatchRunner};
use semtab_storage::load_batch;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Annotate tables with knowledge-graph entities and ontology classes
#[derive(Parser, Debug)]
#[command(name = "semtab")]
#[command(about = "Semantic table annotation", long_about = None)]
struct Args {
    /// Record file, or a directory of `*.json` record files
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for stage files and the run manifest
    #[arg(short, long, default_value = "./annotated")]
    output: PathBuf,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force this column index to be the subject column
    #[arg(long)]
    subject_column: Option<usize>,

    /// Full-text entity lookup endpoint
    #[arg(long)]
    search_url: Option<String>,

    /// SPARQL endpoint
    #[arg(long)]
    graph_url: Option<String>,

    /// NER model endpoint
    #[arg(long)]
    ner_url: Option<String>,

    /// Concurrent lookups within a column
    #[arg(long)]
    concurrency: Option<usize>,

    /// Detect dates, money, emails and similar literals by pattern
    #[arg(long)]
    patterns: bool,

    /// Write per-heuristic score breakdowns
    #[arg(long)]
    explain: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(index) = self.subject_column {
            settings.annotator.subject_column = Some(index);
        }
        if let Some(url) = &self.search_url {
            settings.lookup.search_url = url.clone();
        }
        if let Some(url) = &self.graph_url {
            settings.lookup.graph_url = url.clone();
        }
        if let Some(url) = &self.ner_url {
            settings.lookup.ner_url = Some(url.clone());
        }
        if let Some(concurrency) = self.concurrency {
            settings.lookup.concurrency = concurrency;
            settings.annotator.concurrency = concurrency;
        }
        settings.literal_patterns |= self.patterns;
        settings.output.explain |= self.explain;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting semtab v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    info!("Input: {:?}", args.input);
    info!("Output directory: {:?}", args.output);
    info!("Search endpoint: {}", settings.lookup.search_url);
    info!("Graph endpoint: {}", settings.lookup.graph_url);

    let collaborators = http_collaborators(&settings)?;
    let runner = BatchRunner::new(&settings, collaborators, &args.output)?;
    let batch = load_batch(&args.input)?;
    info!("{} tables loaded, {} inputs undecodable", batch.tables.len(), batch.failures.len());

    let manifest = runner.run(batch).await?;
    info!("Manifest written with {} entries", manifest.entries.len());
    Ok(())
}
