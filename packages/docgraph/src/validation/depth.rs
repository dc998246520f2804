use super::self_prelude::*;
use super::INTROSPECTION_FIELDS;

enum Computation {
    InProgress,
    Done(usize),
}

/// Measures how deep the fields of a selection set nest, with fragment
/// spreads expanded in place.
pub struct DepthCounter<'a> {
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    enable_introspection: bool,
    cache: HashMap<&'a str, Computation>,
}

impl<'a> DepthCounter<'a> {
    pub fn new(
        fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
        enable_introspection: bool,
    ) -> Self {
        Self {
            fragments,
            enable_introspection,
            cache: HashMap::new(),
        }
    }

    /// `{ a }` has depth 1, `{ a { b } }` depth 2.
    pub fn count(&mut self, selection_set: &SelectionSet) -> ValidationResult<usize> {
        let mut depth = 0;
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let name = field.node.name.node.as_str();
                    if INTROSPECTION_FIELDS.contains(&name) {
                        if !self.enable_introspection {
                            return Err(ValidationError::IntrospectionDisabled);
                        }
                        continue;
                    }
                    let nested = self.count(&field.node.selection_set.node)?;
                    depth = depth.max(1 + nested);
                }
                Selection::InlineFragment(fragment) => {
                    let nested = self.count(&fragment.node.selection_set.node)?;
                    depth = depth.max(nested);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    let nested = match self.cache.get(name) {
                        Some(Computation::Done(nested)) => *nested,
                        // A fragment cycle. The schema validation rejects it.
                        Some(Computation::InProgress) => 0,
                        None => match self.fragments.get_key_value(name) {
                            Some((key, definition)) => {
                                self.cache.insert(key.as_str(), Computation::InProgress);
                                let nested = self.count(&definition.node.selection_set.node)?;
                                self.cache.insert(key.as_str(), Computation::Done(nested));
                                nested
                            }
                            // Undefined fragment. Also left to the schema validation.
                            None => 0,
                        },
                    };
                    depth = depth.max(nested);
                }
            }
        }
        Ok(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql_parser::parse_query;

    fn depth_of(query: &str) -> usize {
        let document = parse_query(query).unwrap();
        let (_, operation) = document.operations.iter().next().unwrap();
        DepthCounter::new(&document.fragments, false)
            .count(&operation.node.selection_set.node)
            .unwrap()
    }

    #[test]
    fn test_depth_counts_nested_fields() {
        assert_eq!(depth_of("{ a }"), 1);
        assert_eq!(depth_of("{ a { b { c } } d }"), 3);
    }

    #[test]
    fn test_depth_expands_fragments() {
        let query = r#"
            query {
                Users(first: 1) { ...Page }
            }
            fragment Page on UserCountableConnection {
                edges { node { ... on User { roles { role { name } } } } }
            }
        "#;
        assert_eq!(depth_of(query), 6);
    }

    #[test]
    fn test_repeated_fragments_are_measured_once() {
        let query = r#"
            { a { ...F } b { c { ...F } } }
            fragment F on T { x { y } }
        "#;
        assert_eq!(depth_of(query), 4);
    }
}
