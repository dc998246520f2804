use super::self_prelude::*;

/// What a loader fetches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    /// Records of one kind by id.
    Record { kind: String },
    /// Child rows of one table field, by parent id.
    Children {
        child_kind: String,
        parent_kind: String,
        parent_field: String,
    },
}

/// Identity of one logical batch within a request.
///
/// Loads with equal keys share a loader and therefore a dispatch. Loads
/// that differ in any component never do.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub loader: LoaderKind,
    pub projection: Projection,
    /// Query position the loader serves, without list indices.
    pub path: Option<String>,
    pub requester: Requester,
}

impl BatchKey {
    pub fn record(
        kind: impl Into<String>,
        projection: Projection,
        requester: &Requester,
    ) -> Self {
        Self {
            loader: LoaderKind::Record { kind: kind.into() },
            projection,
            path: None,
            requester: requester.clone(),
        }
    }

    pub fn children(
        child_kind: impl Into<String>,
        parent_kind: impl Into<String>,
        parent_field: impl Into<String>,
        path: impl Into<String>,
        projection: Projection,
        requester: &Requester,
    ) -> Self {
        Self {
            loader: LoaderKind::Children {
                child_kind: child_kind.into(),
                parent_kind: parent_kind.into(),
                parent_field: parent_field.into(),
            },
            projection,
            path: Some(path.into()),
            requester: requester.clone(),
        }
    }
}
