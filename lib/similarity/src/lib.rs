//! # semtab Similarity
//!
//! Scoring building blocks shared by the entity and class ranking engines.
//!
//! - **Distance**: normalized edit distance against URI display names
//! - **Weights**: per-heuristic weights with validation
//! - **Aggregation**: weighted sum, first-max-wins selection, stable sorting
//! - **Explain**: per-heuristic contribution breakdown
//!
//! ## Example
//!
//! ```rust
//! use semtab_core::{CandidateEntity, EntityScoreKind, EntityScores, ScoreSheet};
//! use semtab_similarity::{aggregate, select_best, uri_similarities, EntityWeights};
//!
//! let uris = ["http://dbpedia.org/resource/Paris", "http://dbpedia.org/resource/Parish"];
//! let scores = uri_similarities("Paris", &uris);
//!
//! let mut candidates: Vec<CandidateEntity> = uris
//!     .iter()
//!     .zip(scores)
//!     .map(|(uri, score)| {
//!         let mut c = CandidateEntity::new(*uri, "", "");
//!         c.record(EntityScoreKind::StringSimilarity, score).unwrap();
//!         for kind in &EntityScores::KINDS[1..] {
//!             c.record(*kind, 0.0).unwrap();
//!         }
//!         c
//!     })
//!     .collect();
//!
//! aggregate(&mut candidates, &EntityWeights::default()).unwrap();
//! assert_eq!(select_best(&candidates).unwrap().uri, uris[0]);
//! ```

pub mod distance;
pub mod weights;
pub mod aggregate;
pub mod explain;

pub use distance::{display_name, edit_distance, normalized_similarities, uri_similarities};
pub use weights::{ClassWeights, EntityWeights, HeuristicWeights, SubjectWeights, WeightError};
pub use aggregate::{
    aggregate, first_max_index, select_best, sort_by_final_score, sort_by_score, weighted_sum,
};
pub use explain::{ExplainedCandidate, RankingStats};
