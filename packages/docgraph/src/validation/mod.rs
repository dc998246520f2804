//! Checks run on the parsed document before anything is resolved.

pub mod depth;
pub mod paging;

pub(self) mod self_prelude {
    pub use super::{ValidationError, ValidationResult};
    pub use async_graphql_parser::types::{
        ExecutableDocument, FragmentDefinition, Selection, SelectionSet,
    };
    pub use async_graphql_parser::Positioned;
    pub use async_graphql_value::Name;
    pub use std::collections::{HashMap, HashSet};
}

use self::self_prelude::*;
use crate::error::codes;
use crate::schema::{CursorError, PagingError};
use async_graphql::Variables;
use thiserror::Error;

pub use depth::*;
pub use paging::*;

pub type ValidationResult<T> = core::result::Result<T, ValidationError>;

/// A query rejected before execution. Such a query produces no data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Query is nested {depth} levels deep, the limit is {limit}")]
    DepthExceeded { depth: usize, limit: usize },
    #[error("Introspection is disabled")]
    IntrospectionDisabled,
    #[error("Invalid paging arguments on `{field}`: {source}")]
    Paging { field: String, source: PagingError },
    #[error("Invalid cursor on `{field}`: {source}")]
    Cursor { field: String, source: CursorError },
    #[error("Invalid argument `{argument}` on `{field}`: {reason}")]
    Argument {
        field: String,
        argument: String,
        reason: String,
    },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DepthExceeded { .. } | Self::IntrospectionDisabled => {
                codes::GRAPHQL_VALIDATION_FAILED
            }
            Self::Paging { .. } | Self::Cursor { .. } | Self::Argument { .. } => {
                codes::BAD_USER_INPUT
            }
        }
    }
}

/// Names of the introspection entry points.
pub const INTROSPECTION_FIELDS: [&str; 2] = ["__schema", "__type"];

/// Per-schema query guard.
#[derive(Clone, Debug)]
pub struct QueryGuard {
    depth_limit: usize,
    enable_introspection: bool,
    connection_fields: HashSet<String>,
}

impl QueryGuard {
    pub fn new(depth_limit: usize, enable_introspection: bool) -> Self {
        Self {
            depth_limit,
            enable_introspection,
            connection_fields: HashSet::new(),
        }
    }

    /// Root fields whose paging arguments are checked up front.
    pub fn with_connection_fields(
        mut self,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.connection_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    pub fn check(
        &self,
        document: &ExecutableDocument,
        variables: &Variables,
    ) -> ValidationResult<()> {
        for (_, operation) in document.operations.iter() {
            let selection_set = &operation.node.selection_set.node;

            let depth = DepthCounter::new(&document.fragments, self.enable_introspection)
                .count(selection_set)?;
            if depth > self.depth_limit {
                return Err(ValidationError::DepthExceeded {
                    depth,
                    limit: self.depth_limit,
                });
            }

            check_root_paging(
                selection_set,
                &document.fragments,
                &self.connection_fields,
                variables,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_graphql_parser::parse_query;

    fn check(guard: &QueryGuard, query: &str) -> ValidationResult<()> {
        let document = parse_query(query).unwrap();
        guard.check(&document, &Variables::default())
    }

    #[test]
    fn test_guard_rejects_queries_past_the_limit() {
        let guard = QueryGuard::new(2, false);

        assert!(check(&guard, "{ a { b } }").is_ok());
        assert_matches!(
            check(&guard, "{ a { b { c } } }"),
            Err(ValidationError::DepthExceeded { depth: 3, limit: 2 })
        );
    }

    #[test]
    fn test_guard_checks_every_operation() {
        let guard = QueryGuard::new(2, false);
        let query = "query Flat { a } query Deep { a { b { c } } }";

        assert_matches!(
            check(&guard, query),
            Err(ValidationError::DepthExceeded { .. })
        );
    }

    #[test]
    fn test_guard_rejects_introspection_when_disabled() {
        let query = "{ __schema { types { name } } }";

        assert_matches!(
            check(&QueryGuard::new(10, false), query),
            Err(ValidationError::IntrospectionDisabled)
        );
        assert!(check(&QueryGuard::new(1, true), query).is_ok());
    }

    #[test]
    fn test_codes_split_limits_from_bad_input() {
        let err = ValidationError::DepthExceeded { depth: 3, limit: 2 };
        assert_eq!(err.code(), codes::GRAPHQL_VALIDATION_FAILED);

        let err = ValidationError::Paging {
            field: "Users".into(),
            source: PagingError::NoForwardOrBackward,
        };
        assert_eq!(err.code(), codes::BAD_USER_INPUT);
    }
}
