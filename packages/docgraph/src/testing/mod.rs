//! In-memory store, oracles and fixtures for tests and the demo binary.

pub mod fixtures;
pub mod kinds;
pub mod oracle;
pub mod store;

pub mod self_prelude {
    pub use super::super::self_prelude::*;
    pub use crate::store::*;
    pub use indexmap::IndexMap;
    pub use serde_json::{json, Value};
    pub use std::collections::{HashMap, HashSet};
    pub use std::sync::Arc;
    pub use tokio::sync::Mutex;
}

pub use fixtures::*;
pub use kinds::*;
pub use oracle::*;
pub use store::*;

pub mod prelude {
    pub use super::*;
}
