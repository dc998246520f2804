pub mod kind;
pub mod query;
pub mod record;
#[allow(clippy::module_inception)]
pub mod store;

pub(self) mod self_prelude {
    pub use super::super::self_prelude::*;
    pub use indexmap::IndexMap;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Map, Value};
    pub use std::fmt;
    pub use std::str::FromStr;
}

pub use kind::*;
pub use query::*;
pub use record::*;
pub use store::*;
