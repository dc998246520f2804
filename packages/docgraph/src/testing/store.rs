use super::self_prelude::*;
use std::cmp::Ordering;

/// One call made against a [`MemoryStore`].
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCall {
    FetchByIds {
        kind: String,
        ids: Vec<RecordId>,
        fields: Projection,
    },
    FetchChildren {
        child_kind: String,
        parent_field: String,
        parent_ids: Vec<RecordId>,
        fields: Projection,
    },
    Query {
        kind: String,
        filters: Vec<Filter>,
        sort: Sort,
        limit: usize,
    },
    Count {
        kind: String,
    },
}

impl StoreCall {
    pub fn kind(&self) -> &str {
        match self {
            Self::FetchByIds { kind, .. }
            | Self::Query { kind, .. }
            | Self::Count { kind } => kind,
            Self::FetchChildren { child_kind, .. } => child_kind,
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::FetchByIds { .. } | Self::FetchChildren { .. })
    }
}

/// A record store held in memory.
///
/// Child rows are ordinary records of their child kind carrying `parent`,
/// `parenttype`, `parentfield` and `idx`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: IndexMap<String, IndexMap<RecordId, Record>>,
    failing: HashSet<String>,
    embed_children: bool,
    calls: Mutex<Vec<StoreCall>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: Record) {
        self.records
            .entry(record.kind.clone())
            .or_default()
            .insert(record.id.clone(), record);
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        for record in records {
            self.insert(record);
        }
        self
    }

    /// Every call touching `kind` fails.
    pub fn fail_kind(mut self, kind: impl Into<String>) -> Self {
        self.failing.insert(kind.into());
        self
    }

    /// Return child rows inside their parents' table fields.
    pub fn embed_children(mut self, embed: bool) -> Self {
        self.embed_children = embed;
        self
    }

    pub fn get(&self, kind: &str, id: &str) -> Option<&Record> {
        self.records.get(kind)?.get(id)
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    pub async fn fetches(&self) -> Vec<StoreCall> {
        self.calls()
            .await
            .into_iter()
            .filter(StoreCall::is_fetch)
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    async fn record_call(&self, call: StoreCall) -> StoreResult<()> {
        let kind = call.kind().to_string();
        self.calls.lock().await.push(call);
        if self.failing.contains(&kind) {
            return Err(StoreError::Other(anyhow!("{kind} is unavailable")));
        }
        Ok(())
    }

    fn rows(&self, kind: &str) -> impl Iterator<Item = &Record> {
        self.records.get(kind).into_iter().flat_map(|rows| rows.values())
    }

    fn children_of<'a>(
        &'a self,
        parent_kind: &'a str,
        parent_id: &'a str,
    ) -> impl Iterator<Item = &'a Record> {
        self.records
            .values()
            .flat_map(|rows| rows.values())
            .filter(move |row| {
                row.get_str("parenttype") == Some(parent_kind)
                    && row.get_str("parent") == Some(parent_id)
            })
    }

    fn embed(&self, record: &mut Record) {
        let (kind, id) = (record.kind.clone(), record.id.clone());
        let mut tables: IndexMap<String, Vec<&Record>> = IndexMap::new();
        for row in self.children_of(&kind, &id) {
            if let Some(field) = row.get_str("parentfield") {
                tables.entry(field.to_string()).or_default().push(row);
            }
        }
        for (field, mut rows) in tables {
            rows.sort_by(|a, b| by_idx(a, b));
            let rows = rows
                .into_iter()
                .filter_map(|row| serde_json::to_value(row).ok())
                .collect::<Vec<_>>();
            record.fields.insert(field, Value::Array(rows));
        }
    }
}

fn by_idx(a: &Record, b: &Record) -> Ordering {
    compare_values(
        &a.get("idx").unwrap_or(Value::Null),
        &b.get("idx").unwrap_or(Value::Null),
    )
    .then_with(|| a.id.cmp(&b.id))
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// SQL `LIKE` with `%` and `_`, ignoring case.
pub fn like(value: &str, pattern: &str) -> bool {
    let value = value.to_lowercase().chars().collect::<Vec<_>>();
    let pattern = pattern.to_lowercase().chars().collect::<Vec<_>>();

    // matches[j]: whether value[..i] matches pattern[..j]
    let mut matches = vec![false; pattern.len() + 1];
    matches[0] = true;
    for j in 1..=pattern.len() {
        matches[j] = matches[j - 1] && pattern[j - 1] == '%';
    }

    for c in value {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matches[j],
                '_' => matches[j - 1],
                p => matches[j - 1] && p == c,
            };
        }
        matches = next;
    }
    matches[pattern.len()]
}

fn accepts(record: &Record, filter: &Filter) -> bool {
    let stored = record.get(&filter.field).unwrap_or(Value::Null);
    match filter.operator {
        FilterOperator::Like => like(&text(&stored), &text(&filter.value)),
        FilterOperator::NotLike => !like(&text(&stored), &text(&filter.value)),
        operator => operator.accepts(compare_values(&stored, &filter.value)),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_by_ids(
        &self,
        kind: &str,
        ids: &[RecordId],
        fields: &Projection,
    ) -> StoreResult<Vec<Record>> {
        self.record_call(StoreCall::FetchByIds {
            kind: kind.to_string(),
            ids: ids.to_vec(),
            fields: fields.clone(),
        })
        .await?;

        Ok(ids
            .iter()
            .filter_map(|id| self.get(kind, id))
            .map(|record| {
                let mut projected = record.project(fields);
                if self.embed_children {
                    self.embed(&mut projected);
                }
                projected
            })
            .collect())
    }

    async fn fetch_children(
        &self,
        child_kind: &str,
        parent_kind: &str,
        parent_field: &str,
        parent_ids: &[RecordId],
        fields: &Projection,
    ) -> StoreResult<Vec<Record>> {
        self.record_call(StoreCall::FetchChildren {
            child_kind: child_kind.to_string(),
            parent_field: parent_field.to_string(),
            parent_ids: parent_ids.to_vec(),
            fields: fields.clone(),
        })
        .await?;

        let mut rows = self
            .rows(child_kind)
            .filter(|row| {
                row.get_str("parenttype") == Some(parent_kind)
                    && row.get_str("parentfield") == Some(parent_field)
                    && row
                        .get_str("parent")
                        .map_or(false, |parent| parent_ids.iter().any(|id| id == parent))
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| by_idx(a, b));

        Ok(rows.into_iter().map(|row| row.project(fields)).collect())
    }

    async fn query(
        &self,
        kind: &str,
        filters: &[Filter],
        sort: &Sort,
        limit: usize,
        offset: Option<usize>,
    ) -> StoreResult<Vec<Record>> {
        self.record_call(StoreCall::Query {
            kind: kind.to_string(),
            filters: filters.to_vec(),
            sort: sort.clone(),
            limit,
        })
        .await?;

        let mut rows = self
            .rows(kind)
            .filter(|row| filters.iter().all(|filter| accepts(row, filter)))
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            let ordering = compare_values(
                &a.get(&sort.field).unwrap_or(Value::Null),
                &b.get(&sort.field).unwrap_or(Value::Null),
            )
            .then_with(|| a.id.cmp(&b.id));
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let projection = Projection::identity().with(&sort.field);
        Ok(rows
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit)
            .map(|row| row.project(&projection))
            .collect())
    }

    async fn count(&self, kind: &str, filters: &[Filter]) -> StoreResult<u64> {
        self.record_call(StoreCall::Count {
            kind: kind.to_string(),
        })
        .await?;

        Ok(self
            .rows(kind)
            .filter(|row| filters.iter().all(|filter| accepts(row, filter)))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        MemoryStore::new().with_records([
            Record::new("Note", "n1").with("title", "Alpha").with("modified", 1),
            Record::new("Note", "n2").with("title", "beta").with("modified", 2),
            Record::new("Note", "n3").with("title", "Gamma").with("modified", 3),
        ])
    }

    #[test]
    fn test_like_matches_wildcards_case_insensitively() {
        assert!(like("Alpha", "al%"));
        assert!(like("Alpha", "_LPHA"));
        assert!(like("Alpha", "%"));
        assert!(!like("Alpha", "al_"));
        assert!(!like("", "_"));
    }

    #[tokio::test]
    async fn test_query_sorts_filters_and_projects() {
        let store = store();
        let rows = store
            .query(
                "Note",
                &[Filter::new("title", FilterOperator::NotLike, "beta")],
                &Sort::default(),
                10,
                None,
            )
            .await
            .unwrap();

        let ids = rows.iter().map(|row| row.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["n3", "n1"]);
        assert!(!rows[0].has("title"));
        assert_eq!(rows[0].get("modified"), Some(json!(3)));
    }

    #[tokio::test]
    async fn test_failing_kinds_still_record_the_call() {
        let store = store().fail_kind("Note");
        let result = store.count("Note", &[]).await;

        assert!(matches!(result, Err(StoreError::Other(_))));
        assert_eq!(
            store.calls().await,
            vec![StoreCall::Count {
                kind: "Note".to_string()
            }]
        );
    }
}
