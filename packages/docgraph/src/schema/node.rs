use super::self_prelude::*;

/// A record flowing through resolution, tagged with whether read access to
/// it has been proven.
///
/// Only the engine constructs these. Nothing a client sends can set
/// `authorized`.
#[derive(Clone, Debug)]
pub struct ResolvedRecord {
    pub record: Arc<Record>,
    pub authorized: bool,
}

impl ResolvedRecord {
    pub fn authorized(record: Arc<Record>) -> Self {
        Self {
            record,
            authorized: true,
        }
    }

    pub fn type_name(&self) -> String {
        store::type_name(&self.record.kind)
    }

    /// Value of a field typed as the record's own object type.
    pub fn into_field_value<'a>(self) -> FieldValue<'a> {
        FieldValue::owned_any(self)
    }

    /// Value of a field typed as the shared interface. The concrete type
    /// travels with it so `__typename` and the object's fields resolve.
    pub fn into_interface_value<'a>(self) -> FieldValue<'a> {
        let type_name = self.type_name();
        FieldValue::owned_any(self).with_type(type_name)
    }
}

/// A record row embedded in its parent, such as a pre-fetched table field.
pub fn embedded_rows(child_kind: &str, value: &serde_json::Value) -> Option<Vec<Record>> {
    let rows = value.as_array()?;
    Some(
        rows.iter()
            .filter_map(|row| {
                let fields = row.as_object()?;
                let id = fields.get("name")?.as_str()?.to_string();
                let mut record = Record::new(child_kind, id);
                for (field, value) in fields {
                    if field != "name" && field != "kind" {
                        record.fields.insert(field.clone(), value.clone());
                    }
                }
                Some(record)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_rows_skip_rows_without_a_name() {
        let rows = embedded_rows(
            "Has Role",
            &json!([
                {"name": "HR-1", "role": "Admin", "parent": "admin"},
                {"role": "Orphan"},
            ]),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "Has Role");
        assert_eq!(rows[0].get_str("role"), Some("Admin"));
    }

    #[test]
    fn test_non_list_values_are_not_embedded_rows() {
        assert!(embedded_rows("Has Role", &json!(null)).is_none());
    }
}
