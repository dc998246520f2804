use crate::schema::{CursorError, PagingError};
use crate::store::StoreError;
use async_graphql::ErrorExtensions;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub type ResolveResult<T> = core::result::Result<T, ResolveError>;

/// Machine-readable codes carried in `extensions.code` of every error.
pub mod codes {
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
    pub const STORE_ERROR: &str = "STORE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const GRAPHQL_VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";
    pub const GRAPHQL_PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";
}

/// Errors raised while resolving a single field.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No permission to read {kind}{}", .id.as_deref().map(|id| format!(" {id}")).unwrap_or_default())]
    PermissionDenied { kind: String, id: Option<String> },
    #[error("Invalid paging arguments: {0}")]
    Paging(#[from] PagingError),
    #[error("Invalid cursor: {0}")]
    Cursor(#[from] CursorError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("Store error: {0}")]
    Store(Arc<StoreError>),
    #[error("Missing {0} in request context")]
    MissingContext(&'static str),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for ResolveError {
    fn from(e: StoreError) -> Self {
        Self::Store(Arc::new(e))
    }
}

impl From<Arc<StoreError>> for ResolveError {
    fn from(e: Arc<StoreError>) -> Self {
        Self::Store(e)
    }
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => codes::PERMISSION_DENIED,
            Self::Paging(_) | Self::Cursor(_) | Self::InvalidArgument(_) => {
                codes::BAD_USER_INPUT
            }
            Self::Store(_) => codes::STORE_ERROR,
            Self::UnknownKind(_) | Self::MissingContext(_) | Self::Other(_) => {
                codes::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn http_status_hint(&self) -> u16 {
        status_hint(self.code())
    }
}

/// HTTP status a transport would answer with for `code`.
pub fn status_hint(code: &str) -> u16 {
    match code {
        codes::PERMISSION_DENIED => 403,
        codes::BAD_USER_INPUT
        | codes::GRAPHQL_VALIDATION_FAILED
        | codes::GRAPHQL_PARSE_FAILED => 400,
        _ => 500,
    }
}

impl ErrorExtensions for ResolveError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            e.set("httpStatusHint", self.http_status_hint() as i32);
        })
    }
}

/// An error raised by a nullable field, which resolved to null instead.
#[derive(Debug)]
pub struct FieldError {
    pub path: Vec<Value>,
    pub error: ResolveError,
}

/// Field errors collected over one request.
///
/// A failing nullable field records its error here and reads as null, so its
/// siblings keep resolving.
#[derive(Debug, Default)]
pub struct FieldErrors(Mutex<Vec<FieldError>>);

impl FieldErrors {
    pub async fn push(&self, path: Vec<Value>, error: ResolveError) {
        self.0.lock().await.push(FieldError { path, error });
    }

    /// Recorded errors, ordered by response path.
    pub async fn take(&self) -> Vec<FieldError> {
        let mut errors = std::mem::take(&mut *self.0.lock().await);
        errors.sort_by_key(|error| error.path.iter().map(Value::to_string).collect::<Vec<_>>());
        errors
    }
}
