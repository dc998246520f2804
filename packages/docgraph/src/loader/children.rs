use super::self_prelude::*;

/// Batches the rows of one table field across many parents.
pub struct ChildCollectionLoader {
    child_kind: String,
    parent_kind: String,
    parent_field: String,
    projection: Projection,
    store: Arc<dyn Store>,
}

impl ChildCollectionLoader {
    pub fn new(
        child_kind: impl Into<String>,
        parent_kind: impl Into<String>,
        parent_field: impl Into<String>,
        projection: &Projection,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            child_kind: child_kind.into(),
            parent_kind: parent_kind.into(),
            parent_field: parent_field.into(),
            projection: projection
                .union(&Projection::identity())
                .with("parent"),
            store,
        }
    }
}

#[async_trait]
impl Loader<RecordId> for ChildCollectionLoader {
    type Value = Vec<Arc<Record>>;
    type Error = Arc<StoreError>;

    async fn load(
        &self,
        keys: &[RecordId],
    ) -> Result<HashMap<RecordId, Self::Value>, Self::Error> {
        debug!(
            child_kind = %self.child_kind,
            parent_field = %self.parent_field,
            parents = keys.len(),
            projection = %self.projection,
            "Dispatching child collection batch."
        );

        let rows = self
            .store
            .fetch_children(
                &self.child_kind,
                &self.parent_kind,
                &self.parent_field,
                keys,
                &self.projection,
            )
            .await
            .map_err(Arc::new)?;

        let mut grouped: HashMap<RecordId, Self::Value> =
            keys.iter().map(|key| (key.clone(), Vec::new())).collect();

        for row in rows {
            let Some(parent) = row.get_str("parent").map(ToString::to_string) else {
                continue;
            };
            if let Some(children) = grouped.get_mut(&parent) {
                children.push(Arc::new(row));
            }
        }

        Ok(grouped)
    }
}
