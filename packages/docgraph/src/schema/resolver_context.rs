use super::node::*;
use super::paging::*;
use super::resolver::*;
use super::self_prelude::*;
use crate::error::FieldErrors;
use crate::store::{Filter, FilterOperator, Requester, Sort, SortDirection};
use async_graphql::{QueryPathNode, QueryPathSegment};
use serde_json::Value as Json;
use std::str::FromStr;

type Result<T> = ResolveResult<T>;

#[extension_trait]
pub impl<'a> DocResolverContext<'a> for ResolverContext<'a> {
    fn resolver(&self) -> Result<&'a DocResolver> {
        self.ctx
            .data::<DocResolver>()
            .map_err(|_| ResolveError::MissingContext("resolver"))
    }
    fn registry(&self) -> Result<&'a LoaderRegistry> {
        self.ctx
            .data::<LoaderRegistry>()
            .map_err(|_| ResolveError::MissingContext("loader registry"))
    }
    fn field_errors(&self) -> Result<&'a FieldErrors> {
        self.ctx
            .data::<Arc<FieldErrors>>()
            .map(|errors| errors.as_ref())
            .map_err(|_| ResolveError::MissingContext("field errors"))
    }
    fn requester(&self) -> Result<&'a Requester> {
        Ok(self.registry()?.requester())
    }
    fn parent<T: 'static>(&self) -> Result<&T> {
        self.parent_value.try_downcast_ref::<T>().map_err(|_| {
            ResolveError::Other(anyhow!(
                "failed to downcast parent value to {}",
                std::any::type_name::<T>()
            ))
        })
    }
    fn parent_record(&self) -> Result<&ResolvedRecord> {
        self.parent::<ResolvedRecord>()
    }

    /// Position of the field in the query, without list indices.
    fn path_key(&self) -> String {
        let mut segments = Vec::new();
        let mut node: Option<&QueryPathNode> = self.ctx.path_node.as_ref();
        while let Some(current) = node {
            if let QueryPathSegment::Name(name) = &current.segment {
                segments.push(name.to_string());
            }
            node = current.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Response path of the field, list indices included.
    fn response_path(&self) -> Vec<Json> {
        let mut path = Vec::new();
        let mut node: Option<&QueryPathNode> = self.ctx.path_node.as_ref();
        while let Some(current) = node {
            path.push(match &current.segment {
                QueryPathSegment::Name(name) => Json::from(*name),
                QueryPathSegment::Index(index) => Json::from(*index),
            });
            node = current.parent;
        }
        path.reverse();
        path
    }

    // Argument getter methods
    fn get_arg(&self, name: &str) -> Option<ValueAccessor> {
        self.args.get(name).filter(|arg| !arg.is_null())
    }
    fn get_arg_i64(&self, name: &str) -> Result<Option<i64>> {
        self.get_arg(name)
            .map(|arg| {
                arg.i64().map_err(|_| {
                    ResolveError::InvalidArgument(format!("`{name}` must be an integer"))
                })
            })
            .transpose()
    }
    fn get_arg_string(&self, name: &str) -> Result<Option<String>> {
        self.get_arg(name)
            .map(|arg| {
                arg.string().map(ToString::to_string).map_err(|_| {
                    ResolveError::InvalidArgument(format!("`{name}` must be a string"))
                })
            })
            .transpose()
    }
    fn get_arg_string_nn(&self, name: &str) -> Result<String> {
        self.get_arg_string(name)?
            .ok_or_else(|| ResolveError::InvalidArgument(format!("`{name}` is required")))
    }
    fn get_paging(&self) -> Result<Paging> {
        let args = PagingArgs {
            first: self.get_arg_i64("first")?,
            last: self.get_arg_i64("last")?,
            before: self.get_arg_string("before")?,
            after: self.get_arg_string("after")?,
        };
        Ok(Paging::try_from(args)?)
    }
    fn get_sort(&self) -> Result<Sort> {
        let Some(sort_by) = self.get_arg("sortBy") else {
            return Ok(Sort::default());
        };
        let sort_by = sort_by
            .object()
            .map_err(|_| ResolveError::InvalidArgument("`sortBy` must be an object".into()))?;

        let field = sort_by
            .get("field")
            .and_then(|field| field.enum_name().ok().map(str::to_ascii_lowercase))
            .ok_or_else(|| ResolveError::InvalidArgument("`sortBy.field` is required".into()))?;

        let direction = match sort_by.get("direction").filter(|d| !d.is_null()) {
            Some(direction) => {
                let name = direction.enum_name().map_err(|_| {
                    ResolveError::InvalidArgument("`sortBy.direction` must be ASC or DESC".into())
                })?;
                SortDirection::from_str(name)
                    .map_err(|e| ResolveError::InvalidArgument(e.to_string()))?
            }
            None => SortDirection::Desc,
        };

        Ok(Sort::new(field, direction))
    }
    fn get_filters(&self, kind: &Kind) -> Result<Vec<Filter>> {
        let Some(filter) = self.get_arg("filter") else {
            return Ok(Vec::new());
        };
        let list = filter
            .list()
            .map_err(|_| ResolveError::InvalidArgument("`filter` must be a list".into()))?;

        let mut filters = Vec::with_capacity(list.len());
        for item in list.iter() {
            let item = item.object().map_err(|_| {
                ResolveError::InvalidArgument("`filter` entries must be objects".into())
            })?;
            let field = item
                .get("fieldname")
                .and_then(|v| v.string().ok().map(str::to_string))
                .ok_or_else(|| {
                    ResolveError::InvalidArgument("`filter.fieldname` is required".into())
                })?;
            let operator = item
                .get("operator")
                .and_then(|v| v.enum_name().ok().map(str::to_string))
                .ok_or_else(|| {
                    ResolveError::InvalidArgument("`filter.operator` is required".into())
                })?;
            let value = item
                .get("value")
                .and_then(|v| v.string().ok().map(str::to_string))
                .ok_or_else(|| {
                    ResolveError::InvalidArgument("`filter.value` is required".into())
                })?;

            let queryable = kind
                .get_field(&field)
                .map(|def| !matches!(def.field_type, FieldType::Table { .. }))
                .unwrap_or(false);
            if !queryable {
                return Err(ResolveError::InvalidArgument(format!(
                    "`{field}` is not a filterable field of {}",
                    kind.name
                )));
            }

            let operator = FilterOperator::from_str(&operator)
                .map_err(|e| ResolveError::InvalidArgument(e.to_string()))?;
            filters.push(Filter::new(field, operator, value));
        }
        Ok(filters)
    }
}
