use super::query::*;
use super::record::*;
use super::self_prelude::*;

pub type StoreResult<T> = anyhow::Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("Field {1} is not queryable on kind {0}")]
    UnknownField(String, String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Read access to the backing record store.
///
/// Implementations apply projections, filters and ordering themselves. The
/// engine only decides which ids, fields and bounds to ask for.
#[async_trait]
pub trait Store: Send + Sync {
    /// Records of `kind` for the given ids, projected to `fields`. Ids that do
    /// not exist are silently omitted.
    async fn fetch_by_ids(
        &self,
        kind: &str,
        ids: &[RecordId],
        fields: &Projection,
    ) -> StoreResult<Vec<Record>>;

    /// All rows of `child_kind` stored under `parent_field` of the given
    /// parents, ordered by position. Every row carries its `parent` id.
    async fn fetch_children(
        &self,
        child_kind: &str,
        parent_kind: &str,
        parent_field: &str,
        parent_ids: &[RecordId],
        fields: &Projection,
    ) -> StoreResult<Vec<Record>>;

    /// Records of `kind` matching every filter, ordered by `sort`. Rows carry
    /// their identity fields and the sort key.
    async fn query(
        &self,
        kind: &str,
        filters: &[Filter],
        sort: &Sort,
        limit: usize,
        offset: Option<usize>,
    ) -> StoreResult<Vec<Record>>;

    /// Number of records of `kind` matching every filter.
    async fn count(&self, kind: &str, filters: &[Filter]) -> StoreResult<u64>;
}

/// The identity a request runs as.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requester {
    pub user: String,
    pub locale: String,
}

impl Requester {
    pub fn new(user: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            locale: locale.into(),
        }
    }
}

impl Default for Requester {
    fn default() -> Self {
        Self::new(
            docgraph_lib::defaults::REQUESTER,
            docgraph_lib::defaults::LOCALE,
        )
    }
}

/// Read-permission oracle. With `id` unset the check is for the kind as a
/// whole, as done before listing it.
#[async_trait]
pub trait Permission: Send + Sync {
    async fn check(&self, kind: &str, id: Option<&str>, requester: &Requester) -> bool;
}

/// Grants every read.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl Permission for AllowAll {
    async fn check(&self, _kind: &str, _id: Option<&str>, _requester: &Requester) -> bool {
        true
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error("No {locale} translation for {text:?}")]
    Missing { text: String, locale: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn lookup(&self, text: &str, locale: &str) -> Result<String, TranslateError>;
}

/// Returns every text untranslated.
#[derive(Clone, Copy, Debug, Default)]
pub struct Untranslated;

#[async_trait]
impl Translator for Untranslated {
    async fn lookup(&self, text: &str, _locale: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

/// Change notifications for live queries. Delivery is not awaited.
pub trait Publisher: Send + Sync {
    fn notify_change(&self, kind: &str, id: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn notify_change(&self, _kind: &str, _id: &str) {}
}
