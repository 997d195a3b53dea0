pub mod batch;
pub mod error;
pub mod manifest;
pub mod store;

pub use batch::{decode_records, discover_inputs, load_batch, load_table, Batch, DecodeFailure, LoadedTable};
pub use error::StorageError;
pub use manifest::{fingerprint, EntryStatus, ManifestEntry, RunManifest, MANIFEST_FILE};
pub use store::{sanitize, StageStore};
