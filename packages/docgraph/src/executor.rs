//! The execution driver: one query in, `{ data, errors }` out.

use crate::error::{codes, status_hint, FieldError, FieldErrors};
use crate::loader::LoaderRegistry;
use crate::schema::{plan_root_batches, DocSchemaBuilder};
use crate::store::{
    AllowAll, KindMap, NoopPublisher, Permission, Publisher, Requester, Store, Translator,
    Untranslated,
};
use crate::validation::QueryGuard;
use async_graphql::{dynamic::Schema, ServerError, Variables};
use async_graphql_parser::parse_query;
use docgraph_lib::config::DocgraphConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Error building dynamic schema: {0:?}")]
    DynamicSchemaBuildError(#[from] async_graphql::dynamic::SchemaError),
}

pub type ExecutorResult<T> = core::result::Result<T, ExecutorError>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub code: String,
    pub http_status_hint: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    pub extensions: ErrorDetails,
}

impl ResponseError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: ErrorDetails {
                code: code.to_string(),
                http_status_hint: status_hint(code),
            },
        }
    }

    pub fn code(&self) -> &str {
        &self.extensions.code
    }

    fn from_field_error(field_error: FieldError) -> Self {
        let FieldError { path, error } = field_error;
        Self {
            message: error.to_string(),
            path,
            extensions: ErrorDetails {
                code: error.code().to_string(),
                http_status_hint: error.http_status_hint(),
            },
        }
    }

    fn from_server_error(error: ServerError) -> Self {
        let json = serde_json::to_value(&error).unwrap_or(Value::Null);
        let path = json
            .get("path")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        // Errors raised by the query runtime itself carry no code.
        let code = json
            .pointer("/extensions/code")
            .and_then(Value::as_str)
            .unwrap_or(if path.is_empty() {
                codes::GRAPHQL_VALIDATION_FAILED
            } else {
                codes::INTERNAL_SERVER_ERROR
            })
            .to_string();
        let http_status_hint = json
            .pointer("/extensions/httpStatusHint")
            .and_then(Value::as_u64)
            .and_then(|hint| u16::try_from(hint).ok())
            .unwrap_or_else(|| status_hint(&code));

        Self {
            message: error.message,
            path,
            extensions: ErrorDetails {
                code,
                http_status_hint,
            },
        }
    }
}

/// Result of one query. `data` holds whatever resolved, `null` when the
/// query was rejected before execution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl Response {
    pub fn rejected(code: &str, message: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            errors: vec![ResponseError::new(code, message)],
        }
    }

    /// Field errors come first, then errors raised by the query runtime.
    fn from_graphql(response: async_graphql::Response, field_errors: Vec<FieldError>) -> Self {
        let data = response.data.into_json().unwrap_or(Value::Null);
        let errors = field_errors
            .into_iter()
            .map(ResponseError::from_field_error)
            .chain(
                response
                    .errors
                    .into_iter()
                    .map(ResponseError::from_server_error),
            )
            .collect();
        Self { data, errors }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Highest hint across errors, at least 400 when there are any.
    pub fn http_status_hint(&self) -> u16 {
        self.errors
            .iter()
            .map(|error| error.extensions.http_status_hint)
            .max()
            .map_or(200, |hint| hint.max(400))
    }
}

pub struct ExecutorBuilder {
    kinds: KindMap,
    store: Arc<dyn Store>,
    permission: Arc<dyn Permission>,
    translator: Arc<dyn Translator>,
    publisher: Arc<dyn Publisher>,
    config: DocgraphConfig,
}

impl ExecutorBuilder {
    pub fn permission(mut self, permission: Arc<dyn Permission>) -> Self {
        self.permission = permission;
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn config(mut self, config: DocgraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ExecutorResult<Executor> {
        let kinds = Arc::new(self.kinds);

        let mut builder = DocSchemaBuilder::new(kinds.clone(), self.translator);
        if !self.config.graphql.enable_introspection {
            builder = builder.disable_introspection();
        }
        let schema = builder.finish()?;

        let guard = QueryGuard::new(
            self.config.graphql.depth_limit,
            self.config.graphql.enable_introspection,
        )
        .with_connection_fields(
            kinds
                .iter()
                .filter(|kind| !kind.is_child)
                .map(|kind| kind.plural_type_name()),
        );

        Ok(Executor {
            schema,
            guard,
            kinds,
            store: self.store,
            permission: self.permission,
            publisher: self.publisher,
            config: self.config,
        })
    }
}

/// Runs queries against one schema. Each query gets its own loaders.
pub struct Executor {
    schema: Schema,
    guard: QueryGuard,
    kinds: Arc<KindMap>,
    store: Arc<dyn Store>,
    permission: Arc<dyn Permission>,
    publisher: Arc<dyn Publisher>,
    config: DocgraphConfig,
}

impl Executor {
    pub fn builder(kinds: KindMap, store: Arc<dyn Store>) -> ExecutorBuilder {
        ExecutorBuilder {
            kinds,
            store,
            permission: Arc::new(AllowAll),
            translator: Arc::new(Untranslated),
            publisher: Arc::new(NoopPublisher),
            config: DocgraphConfig::default(),
        }
    }

    pub fn kinds(&self) -> &KindMap {
        &self.kinds
    }

    pub async fn resolve(&self, query: &str, variables: Value, requester: Requester) -> Response {
        let variables = Variables::from_json(variables);

        let document = match parse_query(query) {
            Ok(document) => document,
            Err(e) => {
                warn!(%e, "Rejected query that does not parse.");
                return Response::rejected(codes::GRAPHQL_PARSE_FAILED, e.to_string());
            }
        };

        if let Err(e) = self.guard.check(&document, &variables) {
            warn!(%e, "Rejected query before execution.");
            return Response::rejected(e.code(), e.to_string());
        }

        let user = requester.user.clone();
        let planned = plan_root_batches(&self.kinds, &document, &variables);
        let registry = LoaderRegistry::new(
            self.store.clone(),
            self.permission.clone(),
            requester,
            self.config.loader.clone(),
        )
        .with_planned(planned);
        let field_errors = Arc::new(FieldErrors::default());

        let request = async_graphql::Request::new(query)
            .variables(variables)
            .data(registry)
            .data(field_errors.clone());
        let executed = self.schema.execute(request).await;
        let response = Response::from_graphql(executed, field_errors.take().await);

        info!(
            %user,
            errors = response.errors.len(),
            "Resolved query."
        );

        response
    }

    /// Tell subscribers that a record changed.
    pub fn notify_change(&self, kind: &str, id: &str) {
        self.publisher.notify_change(kind, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_hint_takes_the_worst_error() {
        let mut response = Response::default();
        assert_eq!(response.http_status_hint(), 200);

        response
            .errors
            .push(ResponseError::new(codes::PERMISSION_DENIED, "denied"));
        response
            .errors
            .push(ResponseError::new(codes::STORE_ERROR, "down"));
        assert_eq!(response.http_status_hint(), 500);
    }

    #[test]
    fn test_uncoded_errors_are_classified_by_path() {
        let validation = ServerError::new("Unknown field", None);
        let error = ResponseError::from_server_error(validation);
        assert_eq!(error.code(), codes::GRAPHQL_VALIDATION_FAILED);
        assert_eq!(error.extensions.http_status_hint, 400);
    }
}
