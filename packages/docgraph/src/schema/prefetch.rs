//! Root record fields planned from the parsed document, so that sibling
//! `<Kind>(name)` fields with one shape share a single fetch.

use super::self_prelude::*;
use super::strategy::*;
use crate::loader::PlannedBatch;
use crate::validation::paging::resolve_value;
use async_graphql::Variables;
use async_graphql_parser::types::{
    ExecutableDocument, Field, FragmentDefinition, OperationType, Selection, SelectionSet,
};
use async_graphql_parser::Positioned;
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

type Fragments = HashMap<Name, Positioned<FragmentDefinition>>;

/// Plan the root single-record loads of `document`.
///
/// Only a lone query operation is planned. Root fields carrying directives,
/// or whose selection does, are left to load on their own.
pub fn plan_root_batches(
    kinds: &KindMap,
    document: &ExecutableDocument,
    variables: &Variables,
) -> Vec<PlannedBatch> {
    let mut operations = document.operations.iter();
    let (Some((_, operation)), None) = (operations.next(), operations.next()) else {
        return Vec::new();
    };
    if operation.node.ty != OperationType::Query {
        return Vec::new();
    }

    let roots = kinds
        .iter()
        .map(|kind| (kind.type_name(), kind))
        .collect::<HashMap<_, _>>();

    let mut planner = Planner {
        roots,
        fragments: &document.fragments,
        variables,
        batches: IndexMap::new(),
    };
    planner.walk(&operation.node.selection_set.node, &mut HashSet::new());

    planner
        .batches
        .into_iter()
        .map(|((kind, projection), ids)| PlannedBatch {
            kind,
            projection,
            ids,
        })
        .collect()
}

struct Planner<'a> {
    roots: HashMap<String, &'a Kind>,
    fragments: &'a Fragments,
    variables: &'a Variables,
    batches: IndexMap<(String, Projection), Vec<String>>,
}

impl<'a> Planner<'a> {
    fn walk(&mut self, selection_set: &'a SelectionSet, visited: &mut HashSet<&'a str>) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => self.plan_field(&field.node),
                Selection::InlineFragment(fragment) => {
                    if fragment.node.directives.is_empty() {
                        self.walk(&fragment.node.selection_set.node, visited);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    if !spread.node.directives.is_empty() || !visited.insert(name) {
                        continue;
                    }
                    let fragments = self.fragments;
                    if let Some(definition) = fragments.get(name) {
                        self.walk(&definition.node.selection_set.node, visited);
                    }
                }
            }
        }
    }

    fn plan_field(&mut self, field: &Field) {
        if !field.directives.is_empty() {
            return;
        }
        let Some(kind) = self.roots.get(field.name.node.as_str()).copied() else {
            return;
        };
        let id = field
            .arguments
            .iter()
            .find(|(name, _)| name.node.as_str() == "name")
            .map(|(_, value)| resolve_value(&value.node, self.variables));
        let Some(ConstValue::String(id)) = id else {
            return;
        };
        let Some(projection) = selection_projection(kind, &field.selection_set.node, self.fragments)
        else {
            return;
        };

        let ids = self
            .batches
            .entry((kind.name.clone(), projection))
            .or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

/// Stored fields of `kind` needed by `selection_set`, matching what
/// [`projection_for`](super::projection_for) computes once the field runs.
/// `None` when a directive could make the two differ.
pub fn selection_projection(
    kind: &Kind,
    selection_set: &SelectionSet,
    fragments: &Fragments,
) -> Option<Projection> {
    let mut projection = Projection::identity();
    collect(kind, selection_set, fragments, &mut projection, &mut HashSet::new())?;
    Some(projection)
}

fn collect<'a>(
    kind: &Kind,
    selection_set: &'a SelectionSet,
    fragments: &'a Fragments,
    projection: &mut Projection,
    visited: &mut HashSet<&'a str>,
) -> Option<()> {
    for selection in &selection_set.items {
        match &selection.node {
            Selection::Field(field) => {
                if !field.node.directives.is_empty() {
                    return None;
                }
                let name = field.node.name.node.as_str();
                if name.starts_with("__") {
                    continue;
                }
                if let Some(strategy) = FieldStrategy::lookup(kind, name) {
                    for source in strategy.source_fields() {
                        projection.insert(source);
                    }
                }
            }
            Selection::InlineFragment(fragment) => {
                if !fragment.node.directives.is_empty() {
                    return None;
                }
                collect(kind, &fragment.node.selection_set.node, fragments, projection, visited)?;
            }
            Selection::FragmentSpread(spread) => {
                if !spread.node.directives.is_empty() {
                    return None;
                }
                let name = spread.node.fragment_name.node.as_str();
                if !visited.insert(name) {
                    continue;
                }
                if let Some(definition) = fragments.get(name) {
                    collect(kind, &definition.node.selection_set.node, fragments, projection, visited)?;
                }
            }
        }
    }
    Some(())
}
