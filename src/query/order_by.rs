use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::FieldRef;

/// Sort direction. Anything other than `"asc"` or `"desc"` is carried
/// through untouched as `Other`; only a `null` direction counts as missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Direction {
    Ascending,
    Descending,
    Other(Value),
}

impl Direction {
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s == "asc" => Some(Direction::Ascending),
            Value::String(s) if s == "desc" => Some(Direction::Descending),
            other => Some(Direction::Other(other.clone())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Direction::Ascending => Value::from("asc"),
            Direction::Descending => Value::from("desc"),
            Direction::Other(value) => value.clone(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => f.write_str("asc"),
            Direction::Descending => f.write_str("desc"),
            Direction::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One `[direction, field]` pair of the `order-by` clause.
///
/// Either half may be missing while the user is still building the sort.
/// Elements past the second are ignored and not written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct OrderBy {
    pub direction: Option<Direction>,
    pub field: Option<FieldRef>,
}

impl OrderBy {
    pub fn new(direction: Direction, field: FieldRef) -> Self {
        Self { direction: Some(direction), field: Some(field) }
    }

    pub fn asc(field: FieldRef) -> Self {
        Self::new(Direction::Ascending, field)
    }

    pub fn desc(field: FieldRef) -> Self {
        Self::new(Direction::Descending, field)
    }
}

impl From<&Value> for OrderBy {
    fn from(value: &Value) -> Self {
        match value.as_array().map(Vec::as_slice) {
            Some([direction, field, ..]) => Self {
                direction: Direction::parse(direction),
                field: (!field.is_null()).then(|| FieldRef::from(field)),
            },
            _ => Self { direction: None, field: None },
        }
    }
}

impl From<Value> for OrderBy {
    fn from(value: Value) -> Self {
        OrderBy::from(&value)
    }
}

impl From<&OrderBy> for Value {
    fn from(order_by: &OrderBy) -> Self {
        Value::Array(vec![
            order_by.direction.as_ref().map_or(Value::Null, Direction::to_value),
            order_by.field.as_ref().map_or(Value::Null, Value::from),
        ])
    }
}

impl From<OrderBy> for Value {
    fn from(order_by: OrderBy) -> Self {
        Value::from(&order_by)
    }
}
