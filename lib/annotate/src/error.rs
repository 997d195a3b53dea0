use semtab_core::Stage;
use semtab_lookup::LookupError;
use semtab_similarity::WeightError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotateError>;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Core(#[from] semtab_core::Error),

    #[error("Invalid weights: {0}")]
    Weights(#[from] WeightError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Heuristic {heuristic} returned {actual} scores for {expected} candidates")]
    HeuristicOutput {
        heuristic: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to persist stage {stage}: {message}")]
    Sink { stage: Stage, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
