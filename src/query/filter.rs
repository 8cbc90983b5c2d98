use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const AND_OPERATOR: &str = "and";

/// A single filter condition such as `["=", ["field", 1, null], 5]`.
///
/// A condition whose first element is not an operator name keeps every
/// element in `args` and has no operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Condition {
    pub operator: Option<String>,
    pub args: Vec<Value>,
}

impl Condition {
    pub fn new(operator: &str, args: Vec<Value>) -> Self {
        Self { operator: Some(operator.to_string()), args }
    }

    /// Every element, operator included, is present.
    pub fn is_complete(&self) -> bool {
        self.operator.is_some() && self.args.iter().all(|arg| !arg.is_null())
    }
}

impl From<&Value> for Condition {
    fn from(value: &Value) -> Self {
        match value {
            Value::Array(items) => match items.as_slice() {
                [Value::String(operator), args @ ..] => Self {
                    operator: Some(operator.clone()),
                    args: args.to_vec(),
                },
                _ => Self { operator: None, args: items.clone() },
            },
            other => Self { operator: None, args: vec![other.clone()] },
        }
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::from(&value)
    }
}

impl From<&Condition> for Value {
    fn from(condition: &Condition) -> Self {
        let mut items = Vec::with_capacity(condition.args.len() + 1);
        if let Some(operator) = &condition.operator {
            items.push(Value::from(operator.as_str()));
        }
        items.extend(condition.args.iter().cloned());
        Value::Array(items)
    }
}

impl From<Condition> for Value {
    fn from(condition: Condition) -> Self {
        Value::from(&condition)
    }
}

/// The `filter` clause: one condition, or a top-level conjunction of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FilterClause {
    And(Vec<Condition>),
    Condition(Condition),
}

impl FilterClause {
    pub fn conditions(&self) -> Vec<Condition> {
        match self {
            FilterClause::And(conditions) => conditions.clone(),
            FilterClause::Condition(condition) => vec![condition.clone()],
        }
    }
}

impl From<&Value> for FilterClause {
    fn from(value: &Value) -> Self {
        match value.as_array().map(Vec::as_slice) {
            Some([Value::String(operator), children @ ..]) if operator == AND_OPERATOR => {
                FilterClause::And(children.iter().map(Condition::from).collect())
            }
            _ => FilterClause::Condition(Condition::from(value)),
        }
    }
}

impl From<Value> for FilterClause {
    fn from(value: Value) -> Self {
        FilterClause::from(&value)
    }
}

impl From<&FilterClause> for Value {
    fn from(clause: &FilterClause) -> Self {
        match clause {
            FilterClause::And(conditions) => {
                let mut items = Vec::with_capacity(conditions.len() + 1);
                items.push(Value::from(AND_OPERATOR));
                items.extend(conditions.iter().map(Value::from));
                Value::Array(items)
            }
            FilterClause::Condition(condition) => Value::from(condition),
        }
    }
}

impl From<FilterClause> for Value {
    fn from(clause: FilterClause) -> Self {
        Value::from(&clause)
    }
}
