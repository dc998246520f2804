use super::batch_key::*;
use super::children::*;
use super::record::*;
use super::self_prelude::*;
use super::LoaderResult;
use docgraph_lib::config::LoaderConfig;
use tokio::sync::OnceCell;

/// One batch key is one dispatch, however many keys it collects.
const UNBOUNDED_BATCH: usize = usize::MAX;

pub type RecordDataLoader = DataLoader<RecordLoader, HashMapCache>;
pub type ChildDataLoader = DataLoader<ChildCollectionLoader, HashMapCache>;

/// A loader handed out by the registry.
#[derive(Clone)]
pub enum BatchLoader {
    Record(Arc<RecordDataLoader>),
    Children(Arc<ChildDataLoader>),
}

/// Ids one batch key is known to need before execution starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedBatch {
    pub kind: String,
    pub projection: Projection,
    pub ids: Vec<RecordId>,
}

/// Per-request map from batch key to loader.
///
/// Created by the executor for one request and dropped with it, so nothing
/// loaded here outlives the request.
pub struct LoaderRegistry {
    store: Arc<dyn Store>,
    permission: Arc<dyn Permission>,
    requester: Requester,
    config: LoaderConfig,
    loaders: Mutex<HashMap<BatchKey, BatchLoader>>,
    planned: Vec<PlannedBatch>,
    planned_loaded: OnceCell<()>,
}

impl LoaderRegistry {
    pub fn new(
        store: Arc<dyn Store>,
        permission: Arc<dyn Permission>,
        requester: Requester,
        config: LoaderConfig,
    ) -> Self {
        Self {
            store,
            permission,
            requester,
            config,
            loaders: Mutex::new(HashMap::new()),
            planned: Vec::new(),
            planned_loaded: OnceCell::new(),
        }
    }

    /// Batches to dispatch together on the first call to
    /// [`LoaderRegistry::load_planned`].
    pub fn with_planned(mut self, planned: Vec<PlannedBatch>) -> Self {
        self.planned = planned;
        self
    }

    /// Dispatch the planned batches, once per request. Later loads of the
    /// same keys are served from the loaders' caches. A failed batch is left
    /// to the individual loads, which report the error on their fields.
    pub async fn load_planned(&self) {
        self.planned_loaded
            .get_or_init(|| async {
                for batch in &self.planned {
                    if let Err(e) = self
                        .load_records(&batch.kind, &batch.ids, false, batch.projection.clone())
                        .await
                    {
                        debug!(kind = %batch.kind, %e, "Planned batch failed.");
                    }
                }
            })
            .await;
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn permission(&self) -> &Arc<dyn Permission> {
        &self.permission
    }

    /// Loader for `key`, created on first use. Equal keys get the same loader.
    pub async fn get_loader(&self, key: &BatchKey) -> BatchLoader {
        let mut loaders = self.loaders.lock().await;
        if let Some(loader) = loaders.get(key) {
            return loader.clone();
        }

        let loader = match &key.loader {
            LoaderKind::Record { kind } => {
                let loader = RecordLoader::new(
                    kind,
                    &key.projection,
                    key.requester.clone(),
                    self.store.clone(),
                    self.permission.clone(),
                );
                BatchLoader::Record(Arc::new(
                    DataLoader::with_cache(loader, tokio::spawn, HashMapCache::new())
                        .delay(self.config.batch_delay())
                        .max_batch_size(UNBOUNDED_BATCH),
                ))
            }
            LoaderKind::Children {
                child_kind,
                parent_kind,
                parent_field,
            } => {
                let loader = ChildCollectionLoader::new(
                    child_kind,
                    parent_kind,
                    parent_field,
                    &key.projection,
                    self.store.clone(),
                );
                BatchLoader::Children(Arc::new(
                    DataLoader::with_cache(loader, tokio::spawn, HashMapCache::new())
                        .delay(self.config.batch_delay())
                        .max_batch_size(UNBOUNDED_BATCH),
                ))
            }
        };

        debug!(?key, "Created loader.");
        loaders.insert(key.clone(), loader.clone());
        loader
    }

    /// Number of distinct batch keys seen so far.
    pub async fn len(&self) -> usize {
        self.loaders.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Load one record of `kind`. `None` means the record does not exist.
    pub async fn load_record(
        &self,
        kind: &str,
        id: &str,
        authorized: bool,
        projection: Projection,
    ) -> LoaderResult<Option<Loaded>> {
        let key = BatchKey::record(kind, projection, &self.requester);
        match self.get_loader(&key).await {
            BatchLoader::Record(loader) => {
                loader.load_one(RecordKey::new(id, authorized)).await
            }
            BatchLoader::Children(_) => Ok(None),
        }
    }

    /// Load many records of `kind`, in the order of `ids`.
    pub async fn load_records(
        &self,
        kind: &str,
        ids: &[RecordId],
        authorized: bool,
        projection: Projection,
    ) -> LoaderResult<Vec<Option<Loaded>>> {
        let key = BatchKey::record(kind, projection, &self.requester);
        let BatchLoader::Record(loader) = self.get_loader(&key).await else {
            return Ok(vec![None; ids.len()]);
        };
        let keys = ids
            .iter()
            .map(|id| RecordKey::new(id.clone(), authorized))
            .collect::<Vec<_>>();
        let mut loaded = loader.load_many(keys.iter().cloned()).await?;
        Ok(keys.iter().map(|key| loaded.remove(key)).collect())
    }

    /// Child rows of `parent_id` under one table field. Never `None`: a
    /// parent without rows yields an empty list.
    #[allow(clippy::too_many_arguments)]
    pub async fn load_children(
        &self,
        child_kind: &str,
        parent_kind: &str,
        parent_field: &str,
        path: &str,
        parent_id: &str,
        projection: Projection,
    ) -> LoaderResult<Vec<Arc<Record>>> {
        let key = BatchKey::children(
            child_kind,
            parent_kind,
            parent_field,
            path,
            projection,
            &self.requester,
        );
        match self.get_loader(&key).await {
            BatchLoader::Children(loader) => Ok(loader
                .load_one(parent_id.to_string())
                .await?
                .unwrap_or_default()),
            BatchLoader::Record(_) => Ok(Vec::new()),
        }
    }
}
