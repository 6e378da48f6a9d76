//! Persistence adapters for the user and project repository ports.
//!
//! - [`InMemoryStore`]: process-local records behind one lock; the default
//!   when no remote store is configured.
//! - [`DocumentStore`]: remote document database reached over HTTPS.
//!
//! Adapters translate between stored documents and domain types only; no
//! business rules live here beyond the completion status re-check each one
//! performs before committing.

mod document;
mod memory;

pub use document::{
    DEFAULT_NAMESPACE, DEFAULT_TIMEOUT, DocumentStore, DocumentStoreConfig,
    DocumentStoreConfigError,
};
pub use memory::InMemoryStore;
