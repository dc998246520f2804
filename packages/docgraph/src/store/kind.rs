use super::self_prelude::*;

/// Storage type of a field, as declared in kind metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Int,
    Float,
    Boolean,
    /// Holds the id of a record of `target`.
    Link { target: String },
    /// Holds the id of a record whose kind is stored in `kind_field`.
    DynamicLink { kind_field: String },
    /// Ordered rows of `child_kind` embedded under the record.
    Table { child_kind: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub field_type: FieldType,
    #[serde(default)]
    pub translatable: bool,
    /// Indexed or unique, and therefore offered as a sort key.
    #[serde(default)]
    pub sortable: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            translatable: false,
            sortable: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn link(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::Link {
                target: target.into(),
            },
        )
    }

    pub fn dynamic_link(name: impl Into<String>, kind_field: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::DynamicLink {
                kind_field: kind_field.into(),
            },
        )
    }

    pub fn table(name: impl Into<String>, child_kind: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::Table {
                child_kind: child_kind.into(),
            },
        )
    }

    pub fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn is_link(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::Link { .. } | FieldType::DynamicLink { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    pub name: String,
    #[serde(default)]
    pub is_child: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl Kind {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_child: false,
            fields: Vec::new(),
        }
    }

    pub fn child(name: impl Into<String>) -> Self {
        Self {
            is_child: true,
            ..Self::new(name)
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Object type name: the kind name without spaces or punctuation.
    pub fn type_name(&self) -> String {
        type_name(&self.name)
    }

    /// Name of the root connection field listing records of this kind.
    pub fn plural_type_name(&self) -> String {
        let singular = self.type_name();
        let lower = singular.to_ascii_lowercase();
        if lower.ends_with('s')
            || lower.ends_with('x')
            || lower.ends_with("ch")
            || lower.ends_with("sh")
        {
            format!("{singular}es")
        } else if lower.ends_with('y')
            && !matches!(
                lower.chars().rev().nth(1),
                Some('a' | 'e' | 'i' | 'o' | 'u')
            )
        {
            format!("{}ies", &singular[..singular.len() - 1])
        } else {
            format!("{singular}s")
        }
    }

    /// Fields offered as sort keys, in enum order.
    pub fn sort_fields(&self) -> Vec<&str> {
        let mut fields = vec!["name", "creation", "modified"];
        for field in &self.fields {
            if field.sortable && !fields.contains(&field.name.as_str()) {
                fields.push(field.name.as_str());
            }
        }
        fields
    }
}

pub fn type_name(kind: &str) -> String {
    kind.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Fields every kind carries in addition to its declared ones.
pub fn default_fields(has_user: bool) -> Vec<FieldDef> {
    let user_link = |name: &str| {
        if has_user {
            FieldDef::link(name, "User")
        } else {
            FieldDef::text(name)
        }
    };
    vec![
        FieldDef::text("doctype"),
        FieldDef::text("name"),
        user_link("owner"),
        FieldDef::text("creation"),
        FieldDef::text("modified"),
        user_link("modified_by"),
        FieldDef::dynamic_link("parent", "parenttype"),
        FieldDef::text("parentfield"),
        FieldDef::text("parenttype"),
        FieldDef::int("idx"),
        FieldDef::int("docstatus"),
    ]
}

pub type KindResult<T> = Result<T, KindError>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum KindError {
    #[error("Kind {0:?} is declared twice")]
    Duplicate(String),
    #[error("Field {kind}.{field} points at unknown kind {target:?}")]
    UnknownTarget {
        kind: String,
        field: String,
        target: String,
    },
    #[error("Field {kind}.{field} reads its kind from missing field {kind_field:?}")]
    UnknownKindField {
        kind: String,
        field: String,
        kind_field: String,
    },
    #[error("Field {kind}.{field} must be a child kind, {target:?} is not")]
    NotAChild {
        kind: String,
        field: String,
        target: String,
    },
    #[error("Kinds {0:?} and {1:?} map to the same type name")]
    TypeNameClash(String, String),
}

/// The static kind metadata the engine consumes.
#[derive(Clone, Debug, Default)]
pub struct KindMap {
    kinds: IndexMap<String, Kind>,
}

impl KindMap {
    /// Build the map, adding the default fields to every kind and checking
    /// that links and tables point at declared kinds.
    pub fn build(kinds: impl IntoIterator<Item = Kind>) -> KindResult<Self> {
        let mut declared = IndexMap::new();
        for kind in kinds {
            if declared.contains_key(&kind.name) {
                return Err(KindError::Duplicate(kind.name));
            }
            declared.insert(kind.name.clone(), kind);
        }

        let has_user = declared.contains_key("User");
        let mut type_names: IndexMap<String, String> = IndexMap::new();
        let mut map = IndexMap::new();

        for (name, kind) in declared.iter() {
            if let Some(other) = type_names.insert(kind.type_name(), name.clone()) {
                return Err(KindError::TypeNameClash(other, name.clone()));
            }

            // Declared fields never replace a default field.
            let mut fields = default_fields(has_user);
            let declared_fields = kind
                .fields
                .iter()
                .filter(|field| !fields.iter().any(|default| default.name == field.name))
                .cloned()
                .collect::<Vec<_>>();
            fields.extend(declared_fields);

            for field in &fields {
                match &field.field_type {
                    FieldType::Link { target } if !declared.contains_key(target) => {
                        return Err(KindError::UnknownTarget {
                            kind: name.clone(),
                            field: field.name.clone(),
                            target: target.clone(),
                        });
                    }
                    FieldType::Table { child_kind } => match declared.get(child_kind) {
                        None => {
                            return Err(KindError::UnknownTarget {
                                kind: name.clone(),
                                field: field.name.clone(),
                                target: child_kind.clone(),
                            })
                        }
                        Some(child) if !child.is_child => {
                            return Err(KindError::NotAChild {
                                kind: name.clone(),
                                field: field.name.clone(),
                                target: child_kind.clone(),
                            })
                        }
                        Some(_) => {}
                    },
                    FieldType::DynamicLink { kind_field }
                        if !fields.iter().any(|f| &f.name == kind_field) =>
                    {
                        return Err(KindError::UnknownKindField {
                            kind: name.clone(),
                            field: field.name.clone(),
                            kind_field: kind_field.clone(),
                        });
                    }
                    _ => {}
                }
            }

            map.insert(
                name.clone(),
                Kind {
                    name: name.clone(),
                    is_child: kind.is_child,
                    fields,
                },
            );
        }

        Ok(Self { kinds: map })
    }

    pub fn get(&self, name: &str) -> Option<&Kind> {
        self.kinds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kind> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_build_adds_default_fields() {
        let kinds = KindMap::build([
            Kind::new("User").field(FieldDef::text("full_name")),
            Kind::new("ToDo").field(FieldDef::text("description")),
        ])
        .unwrap();

        let todo = kinds.get("ToDo").unwrap();
        assert_eq!(
            todo.get_field("owner").map(|f| &f.field_type),
            Some(&FieldType::Link {
                target: "User".to_string()
            })
        );
        assert_matches!(
            todo.get_field("parent").map(|f| &f.field_type),
            Some(FieldType::DynamicLink { .. })
        );
        assert!(todo.get_field("description").is_some());
    }

    #[test]
    fn test_owner_is_plain_text_without_a_user_kind() {
        let kinds = KindMap::build([Kind::new("Note")]).unwrap();
        assert_eq!(
            kinds.get("Note").unwrap().get_field("owner").unwrap().field_type,
            FieldType::Text
        );
    }

    #[test]
    fn test_build_rejects_dangling_links() {
        let err = KindMap::build([Kind::new("Note").field(FieldDef::link("author", "Person"))])
            .unwrap_err();
        assert_matches!(err, KindError::UnknownTarget { target, .. } if target == "Person");
    }

    #[test]
    fn test_tables_must_point_at_child_kinds() {
        let err = KindMap::build([
            Kind::new("Role"),
            Kind::new("User").field(FieldDef::table("roles", "Role")),
        ])
        .unwrap_err();
        assert_matches!(err, KindError::NotAChild { .. });
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Kind::new("Has Role").type_name(), "HasRole");
        assert_eq!(Kind::new("User").plural_type_name(), "Users");
        assert_eq!(Kind::new("Address").plural_type_name(), "Addresses");
        assert_eq!(Kind::new("Company").plural_type_name(), "Companies");
        assert_eq!(Kind::new("ToDo").plural_type_name(), "ToDos");
    }
}
