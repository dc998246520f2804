use super::self_prelude::*;
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub id: RecordId,
    /// Set when a trusted producer already proved read access.
    pub authorized: bool,
}

impl RecordKey {
    pub fn new(id: impl Into<RecordId>, authorized: bool) -> Self {
        Self {
            id: id.into(),
            authorized,
        }
    }
}

/// Outcome of loading one key. Missing records have no entry at all.
#[derive(Clone, Debug)]
pub enum Loaded {
    Record(Arc<Record>),
    Denied,
}

/// Batches lookups of one kind by id, all projected the same way.
pub struct RecordLoader {
    kind: String,
    projection: Projection,
    requester: Requester,
    store: Arc<dyn Store>,
    permission: Arc<dyn Permission>,
}

impl RecordLoader {
    pub fn new(
        kind: impl Into<String>,
        projection: &Projection,
        requester: Requester,
        store: Arc<dyn Store>,
        permission: Arc<dyn Permission>,
    ) -> Self {
        Self {
            kind: kind.into(),
            projection: projection.union(&Projection::identity()),
            requester,
            store,
            permission,
        }
    }
}

#[async_trait]
impl Loader<RecordKey> for RecordLoader {
    type Value = Loaded;
    type Error = Arc<StoreError>;

    async fn load(
        &self,
        keys: &[RecordKey],
    ) -> Result<HashMap<RecordKey, Self::Value>, Self::Error> {
        let mut loaded = HashMap::with_capacity(keys.len());
        let mut allowed = Vec::with_capacity(keys.len());
        let mut ids = Vec::with_capacity(keys.len());
        let mut seen = HashSet::with_capacity(keys.len());

        for key in keys {
            let permitted = key.authorized
                || self
                    .permission
                    .check(&self.kind, Some(key.id.as_str()), &self.requester)
                    .await;

            if !permitted {
                loaded.insert(key.clone(), Loaded::Denied);
                continue;
            }

            if seen.insert(key.id.as_str()) {
                ids.push(key.id.clone());
            }
            allowed.push(key);
        }

        if ids.is_empty() {
            return Ok(loaded);
        }

        debug!(
            kind = %self.kind,
            ids = ids.len(),
            denied = loaded.len(),
            projection = %self.projection,
            "Dispatching record batch."
        );

        let records = self
            .store
            .fetch_by_ids(&self.kind, &ids, &self.projection)
            .await
            .map_err(Arc::new)?;

        let by_id = records
            .into_iter()
            .map(|record| (record.id.clone(), Arc::new(record)))
            .collect::<HashMap<_, _>>();

        for key in allowed {
            if let Some(record) = by_id.get(&key.id) {
                loaded.insert(key.clone(), Loaded::Record(record.clone()));
            }
        }

        Ok(loaded)
    }
}
