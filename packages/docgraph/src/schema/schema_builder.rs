use super::connection::*;
use super::resolver::*;
use super::self_prelude::*;
use super::strategy::*;
use super::BASE_DOC_TYPE;
use crate::store::{default_fields, Translator};
use async_graphql::dynamic::SchemaError;

pub const QUERY_ROOT: &str = "Query";

/// Assembles the dynamic schema for a kind map.
///
/// Every kind becomes an object implementing [`BASE_DOC_TYPE`] and gets a
/// `<Type>(name)` root field. Kinds that are not child kinds also get a
/// paged `<Plural>` root field.
pub struct DocSchemaBuilder {
    schema: SchemaBuilder,
    query: Object,
}

impl DocSchemaBuilder {
    pub fn new(kinds: Arc<KindMap>, translator: Arc<dyn Translator>) -> Self {
        let (sort_direction, filter_operator, filter_input) = connection_input_types();
        let mut schema = Schema::build(QUERY_ROOT, None, None)
            .register(Object::new_page_info::<DocResolver>())
            .register(sort_direction)
            .register(filter_operator)
            .register(filter_input)
            .register(base_doc_type(&kinds));

        let mut query = Object::new(QUERY_ROOT);

        for kind in kinds.iter() {
            let type_name = kind.type_name();
            schema = schema.register(kind_object(kind, &kinds));

            let kind_name = kind.name.clone();
            query = query.field(
                Field::new(type_name.clone(), TypeRef::named(&type_name), move |ctx| {
                    DocResolver::resolve_single(ctx, kind_name.clone())
                })
                .argument(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING))),
            );

            if kind.is_child {
                continue;
            }

            let (sort_field, sorting_input) = sorting_types(kind);
            schema = schema
                .register(sort_field)
                .register(sorting_input)
                .register(Object::new_connection::<DocResolver>(&type_name))
                .register(Object::new_connection_edge::<DocResolver>(&type_name));

            let kind_name = kind.name.clone();
            query = query.field(
                Field::new(
                    kind.plural_type_name(),
                    TypeRef::named(TypeRef::connection(&type_name)),
                    move |ctx| DocResolver::resolve_connection(ctx, kind_name.clone()),
                )
                .connection_arguments(&type_name),
            );
        }

        schema = schema.data(DocResolver::new(kinds, translator));

        Self { schema, query }
    }

    pub fn disable_introspection(mut self) -> Self {
        self.schema = self.schema.disable_introspection();
        self
    }

    pub fn finish(self) -> Result<Schema, SchemaError> {
        self.schema.register(self.query).finish()
    }
}

/// Shared fields of all kinds.
fn base_doc_type(kinds: &KindMap) -> Interface {
    let base = Kind {
        fields: default_fields(kinds.contains("User")),
        ..Kind::new(BASE_DOC_TYPE)
    };

    FieldStrategy::for_kind(&base)
        .into_iter()
        .fold(Interface::new(BASE_DOC_TYPE), |interface, (name, strategy)| {
            interface.field(InterfaceField::new(name, strategy.type_ref(kinds)))
        })
}

fn kind_object(kind: &Kind, kinds: &KindMap) -> Object {
    let mut object = Object::new(kind.type_name()).implement(BASE_DOC_TYPE);
    for (name, strategy) in FieldStrategy::for_kind(kind) {
        let type_ref = strategy.type_ref(kinds);
        let strategy = Arc::new(strategy);
        object = object.field(Field::new(name, type_ref, move |ctx| {
            DocResolver::resolve_field(ctx, strategy.clone())
        }));
    }
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Untranslated;
    use crate::testing::fixture_kinds;

    #[test]
    fn test_schema_exposes_root_fields_per_kind() {
        let schema = DocSchemaBuilder::new(Arc::new(fixture_kinds()), Arc::new(Untranslated))
            .finish()
            .unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("interface BaseDocType"));
        assert!(sdl.contains("type User implements BaseDocType"));
        assert!(sdl.contains("Users("));
        assert!(sdl.contains("type HasRole implements BaseDocType"));
        assert!(!sdl.contains("HasRoles("));
        assert!(sdl.contains("role__name: String"));
        assert!(sdl.contains("roles: [HasRole!]"));
        assert!(!sdl.contains("roles: [HasRole!]!"));
    }
}
