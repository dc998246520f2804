use super::connection::*;
use super::node::*;
use super::projection::*;
use super::resolver_context::*;
use super::self_prelude::*;
use super::strategy::*;
use crate::store::Translator;
use serde_json::Value as Json;
use tracing::{debug, warn};

/// Schema-wide resolver state: the kind map and the translation lookup.
///
/// Request-scoped state (requester, loaders, store access) lives in the
/// [`LoaderRegistry`] attached to each request.
pub struct DocResolver {
    kinds: Arc<KindMap>,
    translator: Arc<dyn Translator>,
}

impl DocResolver {
    pub fn new(kinds: Arc<KindMap>, translator: Arc<dyn Translator>) -> Self {
        Self { kinds, translator }
    }

    pub fn kinds(&self) -> &KindMap {
        &self.kinds
    }

    pub fn kind(&self, name: &str) -> ResolveResult<&Kind> {
        self.kinds
            .get(name)
            .ok_or_else(|| ResolveError::UnknownKind(name.to_string()))
    }

    /// Resolve one field of a kind type by its strategy.
    pub fn resolve_field(ctx: ResolverContext<'_>, strategy: Arc<FieldStrategy>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = Self::dispatch(&ctx, &strategy).await;
            if strategy.is_nullable() {
                null_on_error(&ctx, result).await
            } else {
                result.map_err(|e| e.extend())
            }
        })
    }

    /// Root `<Kind>(name)` field.
    pub fn resolve_single(ctx: ResolverContext<'_>, kind: String) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = Self::single(&ctx, &kind).await;
            null_on_error(&ctx, result).await
        })
    }

    /// Root `<Plural>(...)` connection field.
    pub fn resolve_connection(ctx: ResolverContext<'_>, kind: String) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = Self::connection(&ctx, &kind).await;
            null_on_error(&ctx, result).await
        })
    }

    async fn dispatch<'a>(
        ctx: &ResolverContext<'a>,
        strategy: &FieldStrategy,
    ) -> ResolveResult<Option<FieldValue<'a>>> {
        let parent = ctx.parent_record()?;
        let record = &parent.record;

        match strategy {
            FieldStrategy::Scalar { field, scalar } => Ok(
                coerce_scalar(record.get(field), *scalar).map(FieldValue::value)
            ),
            FieldStrategy::ShadowName { field } => Ok(record
                .get_str(field)
                .map(|id| FieldValue::value(id.to_string()))),
            FieldStrategy::Translatable { field } => {
                let text = match record.get(field) {
                    Some(Json::String(text)) => text,
                    Some(Json::Null) | None => return Ok(None),
                    Some(other) => other.to_string(),
                };
                if text.is_empty() {
                    return Ok(Some(FieldValue::value(text)));
                }
                let locale = &ctx.requester()?.locale;
                let translated = match ctx.resolver()?.translator.lookup(&text, locale).await {
                    Ok(translated) => translated,
                    Err(e) => {
                        warn!(%e, field = %field, "Falling back to untranslated text.");
                        text
                    }
                };
                Ok(Some(FieldValue::value(translated)))
            }
            FieldStrategy::Link { field, target } => match record.get_str(field) {
                Some(id) => Ok(Self::load_link(ctx, target, id)
                    .await?
                    .map(ResolvedRecord::into_field_value)),
                None => Ok(None),
            },
            FieldStrategy::DynamicLink { field, kind_field } => {
                let (Some(target), Some(id)) = (record.get_str(kind_field), record.get_str(field))
                else {
                    return Ok(None);
                };
                if !ctx.resolver()?.kinds.contains(target) {
                    debug!(%target, "Dynamic link points at an unknown kind.");
                    return Ok(None);
                }
                Ok(Self::load_link(ctx, target, id)
                    .await?
                    .map(ResolvedRecord::into_interface_value))
            }
            FieldStrategy::ChildCollection {
                child_kind,
                parent_kind,
                parent_field,
            } => {
                // Rows embedded by whoever produced the parent are served as-is.
                if let Some(rows) = record
                    .fields
                    .get(parent_field)
                    .and_then(|value| embedded_rows(child_kind, value))
                {
                    return Ok(Some(FieldValue::list(rows.into_iter().map(|row| {
                        ResolvedRecord::authorized(Arc::new(row)).into_field_value()
                    }))));
                }

                let kind = ctx.resolver()?.kind(child_kind)?;
                let projection = projection_for(kind, &ctx.field());
                let rows = ctx
                    .registry()?
                    .load_children(
                        child_kind,
                        parent_kind,
                        parent_field,
                        &ctx.path_key(),
                        &record.id,
                        projection,
                    )
                    .await?;

                Ok(Some(FieldValue::list(rows.into_iter().map(|row| {
                    ResolvedRecord::authorized(row).into_field_value()
                }))))
            }
        }
    }

    /// A link that cannot be followed, missing or not readable, is null.
    async fn load_link(
        ctx: &ResolverContext<'_>,
        target: &str,
        id: &str,
    ) -> ResolveResult<Option<ResolvedRecord>> {
        let kind = ctx.resolver()?.kind(target)?;
        let projection = projection_for(kind, &ctx.field());
        match ctx
            .registry()?
            .load_record(target, id, false, projection)
            .await?
        {
            Some(Loaded::Record(record)) => Ok(Some(ResolvedRecord::authorized(record))),
            Some(Loaded::Denied) => {
                debug!(%target, %id, "Link target is not readable.");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn single<'a>(
        ctx: &ResolverContext<'a>,
        kind_name: &str,
    ) -> ResolveResult<Option<FieldValue<'a>>> {
        let id = ctx.get_arg_string_nn("name")?;
        let kind = ctx.resolver()?.kind(kind_name)?;
        let projection = projection_for(kind, &ctx.field());

        let registry = ctx.registry()?;
        registry.load_planned().await;
        match registry
            .load_record(kind_name, &id, false, projection)
            .await?
        {
            Some(Loaded::Record(record)) => {
                Ok(Some(ResolvedRecord::authorized(record).into_field_value()))
            }
            Some(Loaded::Denied) => Err(ResolveError::PermissionDenied {
                kind: kind_name.to_string(),
                id: Some(id),
            }),
            None => Ok(None),
        }
    }

    async fn connection<'a>(
        ctx: &ResolverContext<'a>,
        kind_name: &str,
    ) -> ResolveResult<Option<FieldValue<'a>>> {
        let kind = ctx.resolver()?.kind(kind_name)?;
        let paging = ctx.get_paging()?;
        let sort = ctx.get_sort()?;
        let filters = ctx.get_filters(kind)?;

        let registry = ctx.registry()?;
        if !registry
            .permission()
            .check(kind_name, None, registry.requester())
            .await
        {
            return Err(ResolveError::PermissionDenied {
                kind: kind_name.to_string(),
                id: None,
            });
        }

        let connection =
            fetch_page(registry.store().as_ref(), kind_name, filters, &sort, &paging)
                .await?;

        debug!(
            kind = %kind_name,
            total = connection.total_count,
            edges = connection.edges.len(),
            "Resolved connection page."
        );

        Ok(Some(FieldValue::owned_any(connection)))
    }

    /// The listing row, topped up with any field it lacks. A failed top-up
    /// is reported on the node and the row is served as listed.
    async fn edge_node<'a>(ctx: &ResolverContext<'a>) -> ResolveResult<Option<FieldValue<'a>>> {
        let edge = ctx.parent::<Edge>()?;
        let row = &edge.node;
        let kind = ctx.resolver()?.kind(&row.kind)?;
        let projection = projection_for(kind, &ctx.field());

        if row.covers(&projection) {
            return Ok(Some(ResolvedRecord::authorized(row.clone()).into_field_value()));
        }

        // Rows from a permitted listing need no second check.
        let record = match ctx
            .registry()?
            .load_record(&row.kind, &row.id, true, projection)
            .await
        {
            Ok(Some(Loaded::Record(record))) => record,
            Ok(_) => row.clone(),
            Err(error) => {
                ctx.field_errors()?
                    .push(ctx.response_path(), ResolveError::from(error))
                    .await;
                row.clone()
            }
        };
        Ok(Some(ResolvedRecord::authorized(record).into_field_value()))
    }
}

/// Settle a nullable field: an error is recorded against the field's path
/// and the field reads as null.
async fn null_on_error<'a>(
    ctx: &ResolverContext<'a>,
    result: ResolveResult<Option<FieldValue<'a>>>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let error = match result {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };
    match ctx.field_errors() {
        Ok(errors) => {
            debug!(%error, code = error.code(), "Field resolved to null.");
            errors.push(ctx.response_path(), error).await;
            Ok(None)
        }
        Err(_) => Err(error.extend()),
    }
}

/// Convert a stored value to the declared scalar type. Values that cannot
/// be converted read as null.
pub fn coerce_scalar(value: Option<Json>, scalar: ScalarKind) -> Option<async_graphql::Value> {
    let json = match (scalar, value?) {
        (_, Json::Null) => return None,
        (ScalarKind::Text, Json::String(s)) => Json::String(s),
        (ScalarKind::Text, other) => Json::String(other.to_string()),
        (ScalarKind::Int, Json::Number(n)) => {
            Json::from(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?)
        }
        (ScalarKind::Int, Json::String(s)) => Json::from(s.trim().parse::<i64>().ok()?),
        (ScalarKind::Int, Json::Bool(b)) => Json::from(b as i64),
        (ScalarKind::Float, Json::Number(n)) => Json::from(n.as_f64()?),
        (ScalarKind::Float, Json::String(s)) => Json::from(s.trim().parse::<f64>().ok()?),
        (ScalarKind::Boolean, Json::Bool(b)) => Json::Bool(b),
        (ScalarKind::Boolean, Json::Number(n)) => Json::Bool(n.as_f64()? != 0.0),
        (ScalarKind::Boolean, Json::String(s)) => {
            Json::Bool(matches!(s.trim(), "1" | "true" | "True"))
        }
        _ => return None,
    };
    async_graphql::Value::from_json(json).ok()
}

impl ConnectionResolver for DocResolver {
    fn resolve_total_count(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let connection = ctx.parent::<Connection>().map_err(|e| e.extend())?;
            Ok(Some(FieldValue::value(connection.total_count)))
        })
    }
    fn resolve_edges(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let connection = ctx.parent::<Connection>().map_err(|e| e.extend())?;
            let edges = connection
                .edges
                .iter()
                .map(|edge| FieldValue::owned_any(edge.clone()))
                .collect::<Vec<_>>();
            Ok(Some(FieldValue::list(edges)))
        })
    }
    fn resolve_page_info(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let connection = ctx.parent::<Connection>().map_err(|e| e.extend())?;
            Ok(Some(FieldValue::owned_any(connection.page_info.clone())))
        })
    }
}

impl ConnectionEdgeResolver for DocResolver {
    fn resolve_cursor(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let edge = ctx.parent::<Edge>().map_err(|e| e.extend())?;
            Ok(Some(FieldValue::value(edge.cursor.clone())))
        })
    }
    fn resolve_node(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move { Self::edge_node(&ctx).await.map_err(|e| e.extend()) })
    }
}

impl PageInfoResolver for DocResolver {
    fn resolve_has_next_page(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let page_info = ctx.parent::<PageInfo>().map_err(|e| e.extend())?;
            Ok(Some(FieldValue::value(page_info.has_next_page)))
        })
    }
    fn resolve_has_previous_page(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let page_info = ctx.parent::<PageInfo>().map_err(|e| e.extend())?;
            Ok(Some(FieldValue::value(page_info.has_previous_page)))
        })
    }
    fn resolve_start_cursor(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let page_info = ctx.parent::<PageInfo>().map_err(|e| e.extend())?;
            Ok(page_info.start_cursor.clone().map(FieldValue::value))
        })
    }
    fn resolve_end_cursor(ctx: ResolverContext) -> FieldFuture {
        FieldFuture::new(async move {
            let page_info = ctx.parent::<PageInfo>().map_err(|e| e.extend())?;
            Ok(page_info.end_cursor.clone().map(FieldValue::value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_scalar_follows_declared_type() {
        assert_eq!(
            coerce_scalar(Some(json!("12")), ScalarKind::Int),
            Some(async_graphql::Value::from(12))
        );
        assert_eq!(
            coerce_scalar(Some(json!(1)), ScalarKind::Boolean),
            Some(async_graphql::Value::from(true))
        );
        assert_eq!(
            coerce_scalar(Some(json!(7)), ScalarKind::Text),
            Some(async_graphql::Value::from("7"))
        );
        assert_eq!(coerce_scalar(Some(json!("abc")), ScalarKind::Float), None);
        assert_eq!(coerce_scalar(None, ScalarKind::Text), None);
    }
}
