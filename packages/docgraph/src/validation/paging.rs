use super::self_prelude::*;
use crate::schema::{decode_cursor, Paging, PagingArgs};
use async_graphql::Variables;
use async_graphql_parser::types::Field;
use async_graphql_value::{ConstValue, Value};

/// Reject malformed paging on root connection fields before anything is
/// fetched. Fragments at the root are followed.
pub fn check_root_paging(
    selection_set: &SelectionSet,
    fragments: &HashMap<Name, Positioned<FragmentDefinition>>,
    connection_fields: &HashSet<String>,
    variables: &Variables,
) -> ValidationResult<()> {
    let mut visited = HashSet::new();
    walk(
        selection_set,
        fragments,
        connection_fields,
        variables,
        &mut visited,
    )
}

fn walk<'a>(
    selection_set: &'a SelectionSet,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    connection_fields: &HashSet<String>,
    variables: &Variables,
    visited: &mut HashSet<&'a str>,
) -> ValidationResult<()> {
    for selection in &selection_set.items {
        match &selection.node {
            Selection::Field(field) => {
                if connection_fields.contains(field.node.name.node.as_str()) {
                    check_field(&field.node, variables)?;
                }
            }
            Selection::InlineFragment(fragment) => walk(
                &fragment.node.selection_set.node,
                fragments,
                connection_fields,
                variables,
                visited,
            )?,
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if !visited.insert(name) {
                    continue;
                }
                if let Some(definition) = fragments.get(name) {
                    walk(
                        &definition.node.selection_set.node,
                        fragments,
                        connection_fields,
                        variables,
                        visited,
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn check_field(field: &Field, variables: &Variables) -> ValidationResult<()> {
    let field_name = field.name.node.as_str();
    let invalid = |argument: &str, reason: &str| ValidationError::Argument {
        field: field_name.to_string(),
        argument: argument.to_string(),
        reason: reason.to_string(),
    };

    let mut args = PagingArgs::default();
    for (name, value) in &field.arguments {
        let argument = name.node.as_str();
        let value = resolve_value(&value.node, variables);
        match (argument, value) {
            (_, ConstValue::Null) => {}
            ("first" | "last", ConstValue::Number(n)) => {
                let n = n
                    .as_i64()
                    .ok_or_else(|| invalid(argument, "must be an integer"))?;
                if argument == "first" {
                    args.first = Some(n);
                } else {
                    args.last = Some(n);
                }
            }
            ("first" | "last", _) => return Err(invalid(argument, "must be an integer")),
            ("before" | "after", ConstValue::String(cursor)) => {
                if argument == "before" {
                    args.before = Some(cursor);
                } else {
                    args.after = Some(cursor);
                }
            }
            ("before" | "after", _) => return Err(invalid(argument, "must be a string")),
            _ => {}
        }
    }

    let paging = Paging::try_from(args).map_err(|source| ValidationError::Paging {
        field: field_name.to_string(),
        source,
    })?;

    if let Some(cursor) = &paging.cursor {
        decode_cursor(cursor).map_err(|source| ValidationError::Cursor {
            field: field_name.to_string(),
            source,
        })?;
    }

    Ok(())
}

/// Unbound variables read as null and are reported by the schema validation.
pub(crate) fn resolve_value(value: &Value, variables: &Variables) -> ConstValue {
    value
        .clone()
        .into_const_with(|name| variables.get(&name).cloned().ok_or(()))
        .unwrap_or(ConstValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PagingError;
    use assert_matches::assert_matches;
    use async_graphql_parser::parse_query;

    fn check(query: &str, variables: serde_json::Value) -> ValidationResult<()> {
        let document = parse_query(query).unwrap();
        let (_, operation) = document.operations.iter().next().unwrap();
        let fields = HashSet::from(["Users".to_string()]);
        check_root_paging(
            &operation.node.selection_set.node,
            &document.fragments,
            &fields,
            &Variables::from_json(variables),
        )
    }

    #[test]
    fn test_paging_needs_a_direction() {
        assert_matches!(
            check("{ Users { totalCount } }", serde_json::json!({})),
            Err(ValidationError::Paging {
                source: PagingError::NoForwardOrBackward,
                ..
            })
        );
    }

    #[test]
    fn test_paging_reads_variables() {
        let query = "query ($n: Int) { Users(first: $n) { totalCount } }";

        assert!(check(query, serde_json::json!({ "n": 2 })).is_ok());
        assert_matches!(
            check(query, serde_json::json!({ "n": 0 })),
            Err(ValidationError::Paging {
                source: PagingError::FirstNotPositive,
                ..
            })
        );
    }

    #[test]
    fn test_paging_rejects_undecodable_cursors() {
        assert_matches!(
            check(
                r#"{ Users(first: 1, after: "%%%") { totalCount } }"#,
                serde_json::json!({})
            ),
            Err(ValidationError::Cursor { .. })
        );
    }

    #[test]
    fn test_paging_follows_root_fragments() {
        let query = r#"
            query { ...Root }
            fragment Root on Query { Users(first: 1, before: "WyJhIl0=") { totalCount } }
        "#;
        assert_matches!(
            check(query, serde_json::json!({})),
            Err(ValidationError::Paging {
                source: PagingError::FirstWithBefore,
                ..
            })
        );
    }
}
