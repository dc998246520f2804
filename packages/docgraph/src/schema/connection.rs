//! Countable connections: paged, filtered, sorted lists of one kind.
//! See: https://relay.dev/graphql/connections.htm

use super::cursor::*;
use super::paging::*;
use super::self_prelude::*;
use crate::store::{Filter, FilterOperator, Sort, SortDirection, Store};
use serde_json::Value;

#[extension_trait]
pub impl ConnectionTypeRef for TypeRef {
    const PAGE_INFO: &'static str = "PageInfo";
    const SORT_DIRECTION: &'static str = "SortDirection";
    const DB_FILTER_INPUT: &'static str = "DBFilterInput";
    const DB_FILTER_OPERATOR: &'static str = "DBFilterOperator";

    fn connection(type_name: impl Into<String>) -> String {
        format!("{}CountableConnection", type_name.into())
    }
    fn connection_edge(type_name: impl Into<String>) -> String {
        format!("{}CountableEdge", type_name.into())
    }
    fn sort_field(type_name: impl Into<String>) -> String {
        format!("{}SortField", type_name.into())
    }
    fn sorting_input(type_name: impl Into<String>) -> String {
        format!("{}SortingInput", type_name.into())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub cursor: Cursor,
    /// Identity fields and the sort key. Pre-authorized.
    pub node: Arc<Record>,
}

#[derive(Clone, Debug)]
pub struct Connection {
    pub kind: String,
    pub total_count: u64,
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
}

/// Fetch one page of `kind`.
///
/// The total is counted before the cursor bound is added. Backward pages are
/// fetched in reverse order and flipped back. One row past the page size is
/// fetched to tell whether another page follows.
pub async fn fetch_page(
    store: &dyn Store,
    kind: &str,
    mut filters: Vec<Filter>,
    sort: &Sort,
    paging: &Paging,
) -> ResolveResult<Connection> {
    let cursor_value = paging.cursor.as_deref().map(decode_cursor).transpose()?;

    let total_count = store.count(kind, &filters).await?;

    let fetch_direction = match paging.direction {
        PagingDirection::Forward => sort.direction,
        PagingDirection::Backward => sort.direction.reverse(),
    };

    let has_previous_page = cursor_value.is_some();
    if let Some(value) = cursor_value {
        let operator = match fetch_direction {
            SortDirection::Asc => FilterOperator::Gt,
            SortDirection::Desc => FilterOperator::Lt,
        };
        filters.push(Filter::new(&sort.field, operator, value));
    }

    let fetch_sort = Sort::new(&sort.field, fetch_direction);
    let mut rows = store
        .query(kind, &filters, &fetch_sort, paging.count + 1, None)
        .await?;

    let has_next_page = rows.len() > paging.count;
    rows.truncate(paging.count);
    if paging.direction == PagingDirection::Backward {
        rows.reverse();
    }

    let edges = rows
        .into_iter()
        .map(|row| Edge {
            cursor: encode_cursor(&row.get(&sort.field).unwrap_or(Value::Null)),
            node: Arc::new(row),
        })
        .collect::<Vec<_>>();

    let page_info = PageInfo {
        has_next_page,
        has_previous_page,
        start_cursor: edges.first().map(|edge| edge.cursor.clone()),
        end_cursor: edges.last().map(|edge| edge.cursor.clone()),
    };

    Ok(Connection {
        kind: kind.to_string(),
        total_count,
        edges,
        page_info,
    })
}

#[extension_trait]
pub impl ConnectionObject for Object {
    fn new_connection<Resolver: ConnectionResolver>(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(TypeRef::connection(&type_name))
            .field(Field::new(
                "totalCount",
                TypeRef::named_nn(TypeRef::INT),
                Resolver::resolve_total_count,
            ))
            .field(Field::new(
                "edges",
                TypeRef::named_nn_list_nn(TypeRef::connection_edge(&type_name)),
                Resolver::resolve_edges,
            ))
            .field(Field::new(
                "pageInfo",
                TypeRef::named_nn(TypeRef::PAGE_INFO),
                Resolver::resolve_page_info,
            ))
    }

    fn new_connection_edge<Resolver: ConnectionEdgeResolver>(
        type_name: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        Self::new(TypeRef::connection_edge(&type_name))
            .field(Field::new(
                "cursor",
                TypeRef::named_nn(TypeRef::STRING),
                Resolver::resolve_cursor,
            ))
            .field(Field::new(
                "node",
                TypeRef::named_nn(type_name),
                Resolver::resolve_node,
            ))
    }

    fn new_page_info<Resolver: PageInfoResolver>() -> Self {
        Self::new(TypeRef::PAGE_INFO)
            .field(Field::new(
                "hasNextPage",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                Resolver::resolve_has_next_page,
            ))
            .field(Field::new(
                "hasPreviousPage",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                Resolver::resolve_has_previous_page,
            ))
            .field(Field::new(
                "startCursor",
                TypeRef::named(TypeRef::STRING),
                Resolver::resolve_start_cursor,
            ))
            .field(Field::new(
                "endCursor",
                TypeRef::named(TypeRef::STRING),
                Resolver::resolve_end_cursor,
            ))
    }
}

#[extension_trait]
pub impl ConnectionField for Field {
    /// Arguments of a root connection field over `type_name`.
    fn connection_arguments(self, type_name: &str) -> Self {
        self.argument(InputValue::new(
            "filter",
            TypeRef::named_nn_list(TypeRef::DB_FILTER_INPUT),
        ))
        .argument(InputValue::new(
            "sortBy",
            TypeRef::named(TypeRef::sorting_input(type_name)),
        ))
        .argument(InputValue::new("before", TypeRef::named(TypeRef::STRING)))
        .argument(InputValue::new("after", TypeRef::named(TypeRef::STRING)))
        .argument(InputValue::new("first", TypeRef::named(TypeRef::INT)))
        .argument(InputValue::new("last", TypeRef::named(TypeRef::INT)))
    }
}

/// Input and enum types shared by every connection.
pub fn connection_input_types() -> (Enum, Enum, InputObject) {
    let direction = Enum::new(TypeRef::SORT_DIRECTION)
        .item(EnumItem::new(SortDirection::Asc.name()))
        .item(EnumItem::new(SortDirection::Desc.name()));

    let operator = FilterOperator::ALL
        .iter()
        .fold(Enum::new(TypeRef::DB_FILTER_OPERATOR), |e, op| {
            e.item(EnumItem::new(op.name()))
        });

    let filter = InputObject::new(TypeRef::DB_FILTER_INPUT)
        .field(InputValue::new("fieldname", TypeRef::named_nn(TypeRef::STRING)))
        .field(InputValue::new(
            "operator",
            TypeRef::named_nn(TypeRef::DB_FILTER_OPERATOR),
        ))
        .field(InputValue::new("value", TypeRef::named_nn(TypeRef::STRING)));

    (direction, operator, filter)
}

/// `<Kind>SortField` and `<Kind>SortingInput` for one listable kind.
pub fn sorting_types(kind: &Kind) -> (Enum, InputObject) {
    let type_name = kind.type_name();
    let sort_field = kind
        .sort_fields()
        .into_iter()
        .fold(Enum::new(TypeRef::sort_field(&type_name)), |e, field| {
            e.item(EnumItem::new(field.to_ascii_uppercase()))
        });

    let sorting_input = InputObject::new(TypeRef::sorting_input(&type_name))
        .field(InputValue::new(
            "direction",
            TypeRef::named_nn(TypeRef::SORT_DIRECTION),
        ))
        .field(InputValue::new(
            "field",
            TypeRef::named_nn(TypeRef::sort_field(&type_name)),
        ));

    (sort_field, sorting_input)
}

pub trait ConnectionResolver: Send + Sync + 'static {
    fn resolve_total_count(ctx: ResolverContext) -> FieldFuture;
    fn resolve_edges(ctx: ResolverContext) -> FieldFuture;
    fn resolve_page_info(ctx: ResolverContext) -> FieldFuture;
}

pub trait ConnectionEdgeResolver: Send + Sync + 'static {
    fn resolve_cursor(ctx: ResolverContext) -> FieldFuture;
    fn resolve_node(ctx: ResolverContext) -> FieldFuture;
}

pub trait PageInfoResolver: Send + Sync + 'static {
    fn resolve_has_next_page(ctx: ResolverContext) -> FieldFuture;
    fn resolve_has_previous_page(ctx: ResolverContext) -> FieldFuture;
    fn resolve_start_cursor(ctx: ResolverContext) -> FieldFuture;
    fn resolve_end_cursor(ctx: ResolverContext) -> FieldFuture;
}
