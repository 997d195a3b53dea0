//! Knowledge-graph collaborators for semantic table annotation
//!
//! The pipeline only sees three traits: [`EntitySearch`] for full-text
//! candidate lookup, [`GraphQuery`] for structural questions about entities
//! and classes, and [`NerLabeler`] for tagging cell values. HTTP
//! implementations share a bounded retry policy configured through
//! [`LookupConfig`].
//!
//! ```no_run
//! use semtab_lookup::{EntitySearch, LookupConfig, SearchClient};
//!
//! # async fn run() -> semtab_lookup::Result<()> {
//! let search = SearchClient::new(&LookupConfig::default())?;
//! for hit in search.search_entities("Paris").await? {
//!     println!("{} {}", hit.uri, hit.label);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod http;
pub mod ner;
pub mod retry;
pub mod search;
pub mod service;
pub mod sparql;

pub use cache::CachedGraph;
pub use config::{LookupConfig, RetryConfig, MAX_RESULTS_CAP};
pub use error::{LookupError, Result};
pub use ner::{FallbackLabeler, PatternLabeler, RemoteNer};
pub use retry::with_retry;
pub use search::SearchClient;
pub use service::{ClassInfo, EntitySearch, GraphQuery, LookupHit, NerLabeler};
pub use sparql::GraphClient;
