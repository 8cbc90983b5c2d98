use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker clause older queries use to mean "no aggregation".
pub const ROWS_AGGREGATION: &str = "rows";

/// One entry of the `aggregation` list.
///
/// The arguments are opaque here; only the operator matters when deciding
/// whether a sort on the aggregation's result is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AggregationClause {
    /// `["count"]`, `["sum", ["field", 1, null]]`, ...
    Operator { name: String, args: Vec<Value> },
    /// Anything without a leading operator name, e.g. `[]` or `[null]`.
    Incomplete(Value),
}

impl AggregationClause {
    pub fn new(name: &str, args: Vec<Value>) -> Self {
        AggregationClause::Operator { name: name.to_string(), args }
    }

    pub fn operator(&self) -> Option<&str> {
        match self {
            AggregationClause::Operator { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn is_rows(&self) -> bool {
        self.operator() == Some(ROWS_AGGREGATION)
    }
}

impl From<&Value> for AggregationClause {
    fn from(value: &Value) -> Self {
        match value.as_array().map(Vec::as_slice) {
            Some([Value::String(name), args @ ..]) => AggregationClause::Operator {
                name: name.clone(),
                args: args.to_vec(),
            },
            _ => AggregationClause::Incomplete(value.clone()),
        }
    }
}

impl From<Value> for AggregationClause {
    fn from(value: Value) -> Self {
        AggregationClause::from(&value)
    }
}

impl From<&AggregationClause> for Value {
    fn from(clause: &AggregationClause) -> Self {
        match clause {
            AggregationClause::Operator { name, args } => {
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push(Value::from(name.as_str()));
                values.extend(args.iter().cloned());
                Value::Array(values)
            }
            AggregationClause::Incomplete(value) => value.clone(),
        }
    }
}

impl From<AggregationClause> for Value {
    fn from(clause: AggregationClause) -> Self {
        Value::from(&clause)
    }
}
