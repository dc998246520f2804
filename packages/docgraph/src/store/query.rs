use super::self_prelude::*;
use std::{cmp::Ordering, collections::BTreeSet};

/// The set of stored fields a fetch must return.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Projection(BTreeSet<String>);

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection carrying only the primary key.
    pub fn identity() -> Self {
        Self::from_iter(["name"])
    }

    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        self.0.insert(field.into())
    }

    pub fn with(mut self, field: impl Into<String>) -> Self {
        self.insert(field);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn union(&self, other: &Projection) -> Projection {
        Projection(self.0.union(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().collect::<Vec<_>>().join(", "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Like,
    NotLike,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown filter operator: {0}")]
pub struct UnknownOperator(pub String);

impl FilterOperator {
    pub const ALL: [FilterOperator; 8] = [
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Lt,
        FilterOperator::Gt,
        FilterOperator::Lte,
        FilterOperator::Gte,
        FilterOperator::Like,
        FilterOperator::NotLike,
    ];

    /// Name of the operator in the query language.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Neq => "NEQ",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Lte => "LTE",
            Self::Gte => "GTE",
            Self::Like => "LIKE",
            Self::NotLike => "NOT_LIKE",
        }
    }

    /// Whether `ordering` of `stored` against the filter value passes.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Neq => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
            Self::Lte => ordering != Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Like | Self::NotLike => false,
        }
    }
}

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Like => "like",
            Self::NotLike => "not like",
        };
        write!(f, "{symbol}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(UnknownOperator(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::new("modified", SortDirection::Desc)
    }
}

/// Order two stored values the way a store compares a column to a literal.
///
/// Numbers compare numerically, including numeric strings against numbers.
/// Nulls sort first. Anything else falls back to comparing text.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn as_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::String(l), Value::String(r)) => l.cmp(r),
        _ => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            _ => as_text(left).cmp(&as_text(right)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_names_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(op.name().parse::<FilterOperator>(), Ok(op));
        }
        assert!("BETWEEN".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_compare_values_mixes_numbers_and_numeric_strings() {
        assert_eq!(compare_values(&json!(10), &json!("9")), Ordering::Greater);
        assert_eq!(compare_values(&json!("10"), &json!("9")), Ordering::Less);
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
    }

    #[test]
    fn test_projection_union_is_sorted_and_deduplicated() {
        let a = Projection::from_iter(["name", "role"]);
        let b = Projection::from_iter(["parent", "name"]);
        assert_eq!(
            a.union(&b).iter().collect::<Vec<_>>(),
            vec!["name", "parent", "role"]
        );
    }
}
