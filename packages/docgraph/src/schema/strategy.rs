use super::self_prelude::*;
use super::BASE_DOC_TYPE;

pub const SHADOW_SUFFIX: &str = "__name";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Int,
    Float,
    Boolean,
}

impl ScalarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => TypeRef::STRING,
            Self::Int => TypeRef::INT,
            Self::Float => TypeRef::FLOAT,
            Self::Boolean => TypeRef::BOOLEAN,
        }
    }
}

/// How one field of a kind type is resolved. Chosen once per field when the
/// schema is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Read straight from the record.
    Scalar { field: String, scalar: ScalarKind },
    /// Load the record of `target` whose id is stored in `field`.
    Link { field: String, target: String },
    /// Like `Link`, with the target kind read from `kind_field`.
    DynamicLink { field: String, kind_field: String },
    /// The raw id stored in a link field, without loading the target.
    ShadowName { field: String },
    /// Rows of a table field.
    ChildCollection {
        child_kind: String,
        parent_kind: String,
        parent_field: String,
    },
    /// Text passed through the requester's locale.
    Translatable { field: String },
}

impl FieldStrategy {
    pub fn for_field(kind: &Kind, field: &FieldDef) -> Self {
        let name = field.name.clone();
        match &field.field_type {
            FieldType::Text if field.translatable => Self::Translatable { field: name },
            FieldType::Text => Self::Scalar {
                field: name,
                scalar: ScalarKind::Text,
            },
            FieldType::Int => Self::Scalar {
                field: name,
                scalar: ScalarKind::Int,
            },
            FieldType::Float => Self::Scalar {
                field: name,
                scalar: ScalarKind::Float,
            },
            FieldType::Boolean => Self::Scalar {
                field: name,
                scalar: ScalarKind::Boolean,
            },
            FieldType::Link { target } => Self::Link {
                field: name,
                target: target.clone(),
            },
            FieldType::DynamicLink { kind_field } => Self::DynamicLink {
                field: name,
                kind_field: kind_field.clone(),
            },
            FieldType::Table { child_kind } => Self::ChildCollection {
                child_kind: child_kind.clone(),
                parent_kind: kind.name.clone(),
                parent_field: name,
            },
        }
    }

    /// Strategy behind a field name of a kind type, shadow fields included.
    pub fn lookup(kind: &Kind, name: &str) -> Option<Self> {
        if let Some(field) = kind.get_field(name) {
            return Some(Self::for_field(kind, field));
        }
        let source = name.strip_suffix(SHADOW_SUFFIX)?;
        kind.get_field(source)
            .filter(|field| field.is_link())
            .map(|field| Self::ShadowName {
                field: field.name.clone(),
            })
    }

    /// All strategies of a kind, keyed by the field name they serve.
    pub fn for_kind(kind: &Kind) -> Vec<(String, Self)> {
        let mut strategies = Vec::with_capacity(kind.fields.len());
        for field in &kind.fields {
            strategies.push((field.name.clone(), Self::for_field(kind, field)));
            if field.is_link() {
                strategies.push((
                    format!("{}{SHADOW_SUFFIX}", field.name),
                    Self::ShadowName {
                        field: field.name.clone(),
                    },
                ));
            }
        }
        strategies
    }

    /// Stored fields a record must carry for this strategy to resolve.
    pub fn source_fields(&self) -> Vec<&str> {
        match self {
            Self::Scalar { field, .. }
            | Self::Link { field, .. }
            | Self::ShadowName { field }
            | Self::Translatable { field } => vec![field.as_str()],
            Self::DynamicLink { field, kind_field } => {
                vec![field.as_str(), kind_field.as_str()]
            }
            Self::ChildCollection { .. } => vec!["name"],
        }
    }

    /// Whether the field may read as null. Every field but the identity
    /// scalars is nullable, so a failure stays on the field that raised it.
    pub fn is_nullable(&self) -> bool {
        !matches!(self, Self::Scalar { field, .. } if field == "name" || field == "doctype")
    }

    pub fn type_ref(&self, kinds: &KindMap) -> TypeRef {
        match self {
            Self::Scalar { scalar, .. } => {
                if self.is_nullable() {
                    TypeRef::named(scalar.type_name())
                } else {
                    TypeRef::named_nn(scalar.type_name())
                }
            }
            Self::ShadowName { .. } | Self::Translatable { .. } => {
                TypeRef::named(TypeRef::STRING)
            }
            Self::Link { target, .. } => {
                let type_name = kinds
                    .get(target)
                    .map(Kind::type_name)
                    .unwrap_or_else(|| store::type_name(target));
                TypeRef::named(type_name)
            }
            Self::DynamicLink { .. } => TypeRef::named(BASE_DOC_TYPE),
            Self::ChildCollection { child_kind, .. } => {
                TypeRef::named_nn_list(store::type_name(child_kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_kinds;

    #[test]
    fn test_lookup_resolves_shadow_fields_of_links_only() {
        let kinds = fixture_kinds();
        let has_role = kinds.get("Has Role").unwrap();

        assert_eq!(
            FieldStrategy::lookup(has_role, "role__name"),
            Some(FieldStrategy::ShadowName {
                field: "role".to_string()
            })
        );
        assert_eq!(FieldStrategy::lookup(has_role, "idx__name"), None);
    }

    #[test]
    fn test_table_fields_become_child_collections() {
        let kinds = fixture_kinds();
        let user = kinds.get("User").unwrap();

        assert_eq!(
            FieldStrategy::lookup(user, "roles"),
            Some(FieldStrategy::ChildCollection {
                child_kind: "Has Role".to_string(),
                parent_kind: "User".to_string(),
                parent_field: "roles".to_string(),
            })
        );
    }

    #[test]
    fn test_only_identity_scalars_are_non_null() {
        let kinds = fixture_kinds();
        let user = kinds.get("User").unwrap();

        assert!(!FieldStrategy::lookup(user, "name").unwrap().is_nullable());
        assert!(!FieldStrategy::lookup(user, "doctype").unwrap().is_nullable());
        assert!(FieldStrategy::lookup(user, "full_name").unwrap().is_nullable());
        assert!(FieldStrategy::lookup(user, "roles").unwrap().is_nullable());
        assert!(FieldStrategy::lookup(user, "language").unwrap().is_nullable());
    }

    #[test]
    fn test_dynamic_links_need_their_kind_field() {
        let kinds = fixture_kinds();
        let note = kinds.get("Note").unwrap();
        let parent = FieldStrategy::lookup(note, "parent").unwrap();

        assert_eq!(parent.source_fields(), vec!["parent", "parenttype"]);
    }
}
