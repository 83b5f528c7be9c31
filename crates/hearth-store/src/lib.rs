//! Hearth Store - external record store and artifact storage clients.
//!
//! The record store owns property rows; enrichment only reads `id, address`
//! and writes paired `<domain>_data` / `<domain>_collection_status` columns
//! by row id. Artifact storage holds screenshots and generated reports under
//! collision-resistant names. Both services sit behind capability traits so
//! workers can be exercised against in-memory fakes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod artifacts;
pub mod error;
pub mod records;

pub use artifacts::{artifact_name, ArtifactStorage, RestArtifactStorage};
pub use error::{Result, StoreError};
pub use records::{apply_to_rows, FieldUpdate, RecordStore, RestRecordStore};
