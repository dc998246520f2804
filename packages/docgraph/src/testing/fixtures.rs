use super::self_prelude::*;
use super::store::*;
use serde::Deserialize;
use std::path::Path;

/// A fixture file: kind definitions plus the records to serve.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Fixture {
    pub kinds: Vec<Kind>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Fixture {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    pub fn into_parts(self) -> KindResult<(KindMap, MemoryStore)> {
        let kinds = KindMap::build(self.kinds)?;
        Ok((kinds, MemoryStore::new().with_records(self.records)))
    }
}

fn stamp(day: u32) -> String {
    format!("2024-01-{day:02} 10:00:00")
}

fn doc(kind: &str, id: &str, day: u32) -> Record {
    Record::new(kind, id)
        .with("owner", "alice")
        .with("modified_by", "alice")
        .with("creation", stamp(day))
        .with("modified", stamp(day))
        .with("docstatus", 0)
}

fn user(id: &str, full_name: &str, language: &str, day: u32) -> Record {
    doc("User", id, day)
        .with("full_name", full_name)
        .with("email", format!("{id}@example.com"))
        .with("language", language)
}

fn has_role(id: &str, parent: &str, role: &str, idx: i64) -> Record {
    doc("Has Role", id, 1)
        .with("parent", parent)
        .with("parenttype", "User")
        .with("parentfield", "roles")
        .with("idx", idx)
        .with("role", role)
}

/// Records matching [`fixture_kinds`](crate::testing::fixture_kinds).
pub fn fixture_records() -> Vec<Record> {
    vec![
        user("alice", "Alice Archer", "en", 1),
        user("bob", "Bob Baker", "de", 2),
        user("carol", "Carol Cooper", "en", 3),
        user("dave", "Dave Dyer", "en", 4),
        user("erin", "Erin Evans", "de", 5),
        has_role("HR-0001", "alice", "System Manager", 1),
        has_role("HR-0002", "alice", "Blogger", 2),
        has_role("HR-0003", "bob", "Guest", 1),
        has_role("HR-0004", "carol", "Blogger", 1),
        has_role("HR-0005", "erin", "Guest", 1),
        doc("Role", "System Manager", 1).with("role_name", "System Manager"),
        doc("Role", "Blogger", 1).with("role_name", "Blogger"),
        doc("Role", "Guest", 1).with("role_name", "Guest"),
        doc("Language", "en", 1).with("language_name", "English"),
        doc("Language", "de", 1).with("language_name", "Deutsch"),
        doc("Note", "note-1", 1)
            .with("title", "Welcome")
            .with("content", "Hello"),
        doc("Note", "note-2", 2)
            .with("title", "Agenda")
            .with("content", "Meeting"),
        doc("Note", "note-3", 3).with("title", "Draft").with("content", ""),
        doc("ToDo", "todo-1", 1)
            .with("description", "Review the welcome note")
            .with("status", "Open")
            .with("priority", 2)
            .with("reference_type", "Note")
            .with("reference_name", "note-1"),
        doc("ToDo", "todo-2", 2)
            .with("description", "Onboard Bob")
            .with("status", "Closed")
            .with("priority", 1)
            .with("reference_type", "User")
            .with("reference_name", "bob"),
        doc("ToDo", "todo-3", 3)
            .with("description", "Dangling reference")
            .with("status", "Open")
            .with("priority", 3)
            .with("reference_type", "Ghost")
            .with("reference_name", "boo"),
    ]
}

pub fn new_test_store() -> MemoryStore {
    MemoryStore::new().with_records(fixture_records())
}
