pub mod batch_key;
pub mod children;
pub mod record;
pub mod registry;

pub(self) mod self_prelude {
    pub use super::super::self_prelude::*;
    pub use crate::store::{
        Permission, Projection, Record, RecordId, Requester, Store, StoreError,
    };
    pub use async_graphql::dataloader::{DataLoader, HashMapCache, Loader};
    pub use std::collections::HashMap;
    pub use std::sync::Arc;
    pub use tokio::sync::Mutex;
    pub use tracing::debug;
}

pub use batch_key::*;
pub use children::*;
pub use record::*;
pub use registry::*;

/// Loader errors are shared by every key of the failed batch.
pub type LoaderError = std::sync::Arc<crate::store::StoreError>;

pub type LoaderResult<T> = Result<T, LoaderError>;
