pub mod connection;
pub mod cursor;
pub mod node;
pub mod paging;
pub mod prefetch;
pub mod projection;
pub mod resolver;
pub mod resolver_context;
pub mod schema_builder;
pub mod strategy;

pub(self) mod self_prelude {
    pub use super::super::self_prelude::*;
    pub use crate::error::{ResolveError, ResolveResult};
    pub use crate::loader::{Loaded, LoaderRegistry};
    pub use crate::store::{self, FieldDef, FieldType, Kind, KindMap, Projection, Record};
    pub use async_graphql::dynamic::*;
    pub use async_graphql::ErrorExtensions;
    pub use std::sync::Arc;
}

pub use connection::*;
pub use cursor::*;
pub use node::*;
pub use paging::*;
pub use prefetch::*;
pub use projection::*;
pub use resolver::*;
pub use resolver_context::*;
pub use schema_builder::*;
pub use strategy::*;

/// Name of the interface every kind type implements.
pub const BASE_DOC_TYPE: &str = "BaseDocType";
