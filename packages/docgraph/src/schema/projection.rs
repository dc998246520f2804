use super::self_prelude::*;
use super::strategy::*;
use async_graphql::SelectionField;

/// Stored fields of `kind` needed to resolve the selection under `field`.
///
/// Fragments are flattened by the selection iterator, so fields requested
/// through `... on X` for another kind are simply not found and skipped.
pub fn projection_for(kind: &Kind, field: &SelectionField<'_>) -> Projection {
    let mut projection = Projection::identity();
    for selected in field.selection_set() {
        let name = selected.name();
        if name.starts_with("__") {
            continue;
        }
        if let Some(strategy) = FieldStrategy::lookup(kind, name) {
            for source in strategy.source_fields() {
                projection.insert(source);
            }
        }
    }
    projection
}
