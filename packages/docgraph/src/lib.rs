//! # docgraph
//!
//! Resolves graph queries over a document store of typed kinds. Linked and
//! child records are fetched through per-request batching loaders, list
//! fields are paged with opaque cursors, and every query is depth-checked
//! before any resolver runs.

pub mod error;
pub mod executor;
pub mod loader;
pub mod schema;
pub mod store;
pub mod testing;
pub mod validation;

pub use error::*;
pub use executor::*;

pub(self) mod self_prelude {
    pub use anyhow::anyhow;
    pub use async_trait::async_trait;
    pub use extension_trait::extension_trait;
}
