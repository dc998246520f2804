use super::self_prelude::*;

/// Permission oracle with fixed deny lists. Every check is recorded.
#[derive(Debug, Default)]
pub struct StaticPermission {
    denied_kinds: HashSet<String>,
    denied_records: HashSet<(String, String)>,
    checks: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticPermission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny the kind as a whole and every record of it.
    pub fn deny_kind(mut self, kind: impl Into<String>) -> Self {
        self.denied_kinds.insert(kind.into());
        self
    }

    pub fn deny_record(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.denied_records.insert((kind.into(), id.into()));
        self
    }

    pub async fn checks(&self) -> Vec<(String, Option<String>)> {
        self.checks.lock().await.clone()
    }

    pub async fn check_count(&self) -> usize {
        self.checks.lock().await.len()
    }
}

#[async_trait]
impl Permission for StaticPermission {
    async fn check(&self, kind: &str, id: Option<&str>, _requester: &Requester) -> bool {
        self.checks
            .lock()
            .await
            .push((kind.to_string(), id.map(ToString::to_string)));

        if self.denied_kinds.contains(kind) {
            return false;
        }
        match id {
            Some(id) => !self
                .denied_records
                .contains(&(kind.to_string(), id.to_string())),
            None => true,
        }
    }
}

/// Translations keyed by locale and source text.
#[derive(Clone, Debug, Default)]
pub struct MapTranslator {
    translations: HashMap<(String, String), String>,
}

impl MapTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        locale: impl Into<String>,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        self.translations
            .insert((locale.into(), text.into()), translated.into());
        self
    }
}

#[async_trait]
impl Translator for MapTranslator {
    async fn lookup(&self, text: &str, locale: &str) -> Result<String, TranslateError> {
        self.translations
            .get(&(locale.to_string(), text.to_string()))
            .cloned()
            .ok_or_else(|| TranslateError::Missing {
                text: text.to_string(),
                locale: locale.to_string(),
            })
    }
}

/// Keeps every change notification in order.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    changes: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<(String, String)> {
        self.changes
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }
}

impl Publisher for RecordingPublisher {
    fn notify_change(&self, kind: &str, id: &str) {
        if let Ok(mut changes) = self.changes.lock() {
            changes.push((kind.to_string(), id.to_string()));
        }
    }
}
