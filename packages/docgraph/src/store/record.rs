use super::query::*;
use super::self_prelude::*;

pub type RecordId = String;

/// One record of a kind, projected to the fields a fetch asked for.
///
/// The primary key is exposed under the field name `name` and the kind
/// under `doctype`, whether or not they were projected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: String,
    #[serde(rename = "name")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(kind: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        match field {
            "name" => Some(Value::String(self.id.clone())),
            "doctype" => Some(Value::String(self.kind.clone())),
            _ => self.fields.get(field).cloned(),
        }
    }

    /// String value of a field, with empty strings treated as absent.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => Some(self.id.as_str()),
            "doctype" => Some(self.kind.as_str()),
            _ => self.fields.get(field).and_then(Value::as_str),
        };
        value.filter(|s| !s.is_empty())
    }

    pub fn has(&self, field: &str) -> bool {
        matches!(field, "name" | "doctype") || self.fields.contains_key(field)
    }

    /// Whether every field of `projection` was fetched for this record.
    pub fn covers(&self, projection: &Projection) -> bool {
        projection.iter().all(|field| self.has(field))
    }

    pub fn project(&self, projection: &Projection) -> Record {
        let fields = self
            .fields
            .iter()
            .filter(|(field, _)| projection.contains(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        Record {
            kind: self.kind.clone(),
            id: self.id.clone(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_fields_are_always_present() {
        let record = Record::new("User", "admin").with("full_name", "Administrator");

        assert_eq!(record.get("name"), Some(json!("admin")));
        assert_eq!(record.get("doctype"), Some(json!("User")));
        assert!(record.covers(&Projection::from_iter(["name", "full_name"])));
        assert!(!record.covers(&Projection::from_iter(["email"])));
    }

    #[test]
    fn test_empty_links_read_as_absent() {
        let record = Record::new("ToDo", "T-1").with("owner", "");
        assert_eq!(record.get_str("owner"), None);
    }

    #[test]
    fn test_deserializes_flat_fixture_rows() {
        let record: Record = serde_json::from_value(json!({
            "kind": "Role",
            "name": "System Manager",
            "desk_access": 1,
        }))
        .unwrap();

        assert_eq!(record.id, "System Manager");
        assert_eq!(record.get("desk_access"), Some(json!(1)));
    }
}
