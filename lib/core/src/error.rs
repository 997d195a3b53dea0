use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Record set is empty: no header can be derived")]
    EmptyTable,

    #[error("Missing header name for column {column}")]
    MissingHeader { column: usize },

    #[error("Table is not rectangular: row {row} has no value for column '{column}'")]
    NonRectangular { row: usize, column: String },

    #[error("Column '{column}' has {actual} cells, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column index {index} out of bounds (table has {len} columns)")]
    ColumnOutOfBounds { index: usize, len: usize },

    #[error("Row index {index} out of bounds (table has {len} rows)")]
    RowOutOfBounds { index: usize, len: usize },

    #[error("Label already set for cell")]
    LabelAlreadySet,

    #[error("Candidate list already set")]
    CandidatesAlreadySet,

    #[error("Annotation already set: {0}")]
    AnnotationAlreadySet(String),

    #[error("Column '{column}' already typed {current}, cannot retype as {requested}")]
    ColumnTypeConflict {
        column: String,
        current: String,
        requested: String,
    },

    #[error("Literal column '{0}' cannot become the subject column")]
    LiteralSubject(String),

    #[error("Score '{heuristic}' already recorded for {uri}")]
    ScoreAlreadyRecorded { uri: String, heuristic: String },

    #[error("Score '{heuristic}' for {uri} is not finite")]
    InvalidScore { uri: String, heuristic: String },

    #[error("Cannot aggregate {uri}: heuristic '{missing}' has not run")]
    IncompleteScores { uri: String, missing: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
