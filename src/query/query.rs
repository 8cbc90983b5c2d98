// {
//   "source-table": 2,
//   "aggregation": [["count"], ["sum", ["field", 5, null]]],
//   "breakout": [["field", 3, {"temporal-unit": "month"}]],
//   "filter": ["and", [">", ["field", 4, null], 10], ["not-null", ["field", 6, null]]],
//   "order-by": [["desc", ["aggregation", 0]]],
//   "limit": 100,
//   "expressions": {"profit": ["-", ["field", 5, null], ["field", 7, null]]}
// }

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::{AggregationClause, FieldRef, FilterClause, OrderBy, QueryError};

pub const AGGREGATION_KEY: &str = "aggregation";
pub const BREAKOUT_KEY: &str = "breakout";
pub const FILTER_KEY: &str = "filter";
pub const ORDER_BY_KEY: &str = "order-by";
pub const LIMIT_KEY: &str = "limit";
pub const EXPRESSIONS_KEY: &str = "expressions";

/// An analytics query as the query builder holds it.
///
/// Clause lists keep `None` entries because the editor can leave half-built
/// slots behind. Keys this crate does not interpret live in `extra` and are
/// written back untouched.
#[derive(Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Query {
    pub aggregation: Option<Vec<Option<AggregationClause>>>,
    pub breakout: Option<Vec<Option<FieldRef>>>,
    pub filter: Option<FilterClause>,
    pub order_by: Option<Vec<OrderBy>>,
    pub limit: Option<Value>,
    pub expressions: Option<IndexMap<String, Value>>,
    pub extra: IndexMap<String, Value>,
}

fn list_of<T>(value: &Value, parse: impl Fn(&Value) -> T) -> Vec<Option<T>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| (!item.is_null()).then(|| parse(item)))
            .collect(),
        other => vec![Some(parse(other))],
    }
}

fn list_value<T>(items: &[Option<T>]) -> Value
where
    for<'a> Value: From<&'a T>,
{
    Value::Array(
        items
            .iter()
            .map(|item| item.as_ref().map_or(Value::Null, Value::from))
            .collect(),
    )
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let value: Value = serde_json::from_str(text)?;
        Query::try_from(value)
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut query = Query::default();

        for (key, value) in map {
            match key.as_str() {
                AGGREGATION_KEY => query.aggregation = Self::parse_aggregations(&value),
                BREAKOUT_KEY => query.breakout = (!value.is_null()).then(|| list_of(&value, |item| FieldRef::from(item))),
                FILTER_KEY => query.filter = (!value.is_null()).then(|| FilterClause::from(&value)),
                ORDER_BY_KEY => query.order_by = Self::parse_order_by(&value),
                LIMIT_KEY => query.limit = Some(value),
                EXPRESSIONS_KEY => match value {
                    Value::Object(expressions) => query.expressions = Some(expressions.into_iter().collect()),
                    Value::Null => {}
                    other => {
                        query.extra.insert(key, other);
                    }
                },
                _ => {
                    query.extra.insert(key, value);
                }
            }
        }

        query
    }

    fn parse_aggregations(value: &Value) -> Option<Vec<Option<AggregationClause>>> {
        match value {
            Value::Null => None,
            // legacy single clause: "aggregation": ["count"]
            Value::Array(items) if matches!(items.first(), Some(Value::String(_))) => {
                Some(vec![Some(AggregationClause::from(value))])
            }
            other => Some(list_of(other, |item| AggregationClause::from(item))),
        }
    }

    fn parse_order_by(value: &Value) -> Option<Vec<OrderBy>> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(items.iter().map(OrderBy::from).collect()),
            other => Some(vec![OrderBy::from(other)]),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();

        if let Some(aggregation) = &self.aggregation {
            map.insert(AGGREGATION_KEY.to_string(), list_value(aggregation));
        }
        if let Some(breakout) = &self.breakout {
            map.insert(BREAKOUT_KEY.to_string(), list_value(breakout));
        }
        if let Some(filter) = &self.filter {
            map.insert(FILTER_KEY.to_string(), Value::from(filter));
        }
        if let Some(order_by) = &self.order_by {
            map.insert(ORDER_BY_KEY.to_string(), Value::Array(order_by.iter().map(Value::from).collect()));
        }
        if let Some(limit) = &self.limit {
            map.insert(LIMIT_KEY.to_string(), limit.clone());
        }
        if let Some(expressions) = &self.expressions {
            let expressions = expressions.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            map.insert(EXPRESSIONS_KEY.to_string(), Value::Object(expressions));
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }

        Value::Object(map)
    }
}

impl TryFrom<Value> for Query {
    type Error = QueryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Query::from_map(map)),
            Value::Null => QueryError::NotAnObject("null".to_string()).err(),
            Value::Bool(_) => QueryError::NotAnObject("boolean".to_string()).err(),
            Value::Number(_) => QueryError::NotAnObject("number".to_string()).err(),
            Value::String(_) => QueryError::NotAnObject("string".to_string()).err(),
            Value::Array(_) => QueryError::NotAnObject("array".to_string()).err(),
        }
    }
}

impl TryFrom<&str> for Query {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Query::parse(value)
    }
}

impl From<&Query> for Value {
    fn from(query: &Query) -> Self {
        query.to_value()
    }
}

impl From<Query> for Value {
    fn from(query: Query) -> Self {
        query.to_value()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({})", self)
    }
}
