use std::{collections::HashSet, fmt};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type FieldOptions = Map<String, Value>;

/// Units accepted by the legacy `datetime-field` wrapper.
pub static TEMPORAL_UNITS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "default",
        "millisecond",
        "second",
        "second-of-minute",
        "minute",
        "minute-of-hour",
        "hour",
        "hour-of-day",
        "day",
        "day-of-week",
        "day-of-month",
        "day-of-year",
        "week",
        "week-of-year",
        "month",
        "month-of-year",
        "quarter",
        "quarter-of-year",
        "year",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq)]
pub enum FieldId {
    Id(i64),
    Name(String),
}

/// A reference to a column, an expression or an aggregation result.
///
/// Parsing is lenient: any JSON shape that is not a recognised reference is
/// kept verbatim as [`FieldRef::Unknown`] so half-built editor state survives
/// a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldRef {
    /// `["field", 1, {...}]` or `["field", "name", {...}]`
    Field { id: FieldId, options: Option<FieldOptions> },
    /// `["expression", "name", {...}?]`
    Expression { name: String, options: Option<FieldOptions> },
    /// `["aggregation", 0, {...}?]`
    Aggregation { index: usize, options: Option<FieldOptions> },
    /// Legacy `["field-id", 1]`
    FieldId(i64),
    /// Legacy `["field-literal", "name", "type/Text"]`
    FieldLiteral { name: String, base_type: Value },
    /// Legacy `["fk->", source, target]`
    ForeignKey { source: Box<FieldRef>, target: Box<FieldRef> },
    /// Legacy `["datetime-field", field, unit]`
    DateTimeField { field: Box<FieldRef>, unit: Value },
    /// Legacy `["joined-field", alias, field]`
    JoinedField { alias: String, field: Box<FieldRef> },
    /// Legacy `["binning-strategy", field, strategy, args...]`
    BinningStrategy { field: Box<FieldRef>, strategy: Value, args: Vec<Value> },
    Unknown(Value),
}

/// The column or result a reference ultimately points at, ignoring
/// temporal units, binning, joins and fk traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldTarget<'a> {
    Id(i64),
    Name(&'a str),
    Expression(&'a str),
    Aggregation(usize),
}

impl FieldRef {
    pub fn field(id: i64) -> Self {
        FieldRef::Field { id: FieldId::Id(id), options: None }
    }

    pub fn field_with(id: i64, options: Value) -> Self {
        match options {
            Value::Object(map) => FieldRef::Field { id: FieldId::Id(id), options: Some(map) },
            _ => FieldRef::field(id),
        }
    }

    pub fn aggregation(index: usize) -> Self {
        FieldRef::Aggregation { index, options: None }
    }

    pub fn target(&self) -> Option<FieldTarget<'_>> {
        match self {
            FieldRef::Field { id: FieldId::Id(id), .. } => Some(FieldTarget::Id(*id)),
            FieldRef::Field { id: FieldId::Name(name), .. } => Some(FieldTarget::Name(name)),
            FieldRef::Expression { name, .. } => Some(FieldTarget::Expression(name)),
            FieldRef::Aggregation { index, .. } => Some(FieldTarget::Aggregation(*index)),
            FieldRef::FieldId(id) => Some(FieldTarget::Id(*id)),
            FieldRef::FieldLiteral { name, .. } => Some(FieldTarget::Name(name)),
            FieldRef::ForeignKey { target, .. } => target.target(),
            FieldRef::DateTimeField { field, .. } => field.target(),
            FieldRef::JoinedField { field, .. } => field.target(),
            FieldRef::BinningStrategy { field, .. } => field.target(),
            FieldRef::Unknown(_) => None,
        }
    }

    fn parse_options(value: Option<&Value>) -> Result<Option<FieldOptions>, ()> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(_) => Err(()),
        }
    }

    fn parse_tagged(tag: &str, rest: &[Value]) -> Result<FieldRef, ()> {
        match (tag, rest) {
            ("field", [id, tail @ ..]) if tail.len() <= 1 => {
                let id = match id {
                    Value::Number(n) => FieldId::Id(n.as_i64().ok_or(())?),
                    Value::String(s) => FieldId::Name(s.clone()),
                    _ => return Err(()),
                };
                Ok(FieldRef::Field { id, options: Self::parse_options(tail.first())? })
            }
            ("expression", [Value::String(name), tail @ ..]) if tail.len() <= 1 => Ok(FieldRef::Expression {
                name: name.clone(),
                options: Self::parse_options(tail.first())?,
            }),
            ("aggregation", [Value::Number(index), tail @ ..]) if tail.len() <= 1 => {
                let index = usize::try_from(index.as_u64().ok_or(())?).map_err(|_| ())?;
                Ok(FieldRef::Aggregation { index, options: Self::parse_options(tail.first())? })
            }
            ("field-id", [Value::Number(id)]) => Ok(FieldRef::FieldId(id.as_i64().ok_or(())?)),
            ("field-literal", [Value::String(name), base_type]) => Ok(FieldRef::FieldLiteral {
                name: name.clone(),
                base_type: base_type.clone(),
            }),
            ("fk->", [source, target]) => Ok(FieldRef::ForeignKey {
                source: Box::new(FieldRef::from(source)),
                target: Box::new(FieldRef::from(target)),
            }),
            ("datetime-field", [field, unit]) => Ok(FieldRef::DateTimeField {
                field: Box::new(FieldRef::from(field)),
                unit: unit.clone(),
            }),
            ("joined-field", [Value::String(alias), field]) => Ok(FieldRef::JoinedField {
                alias: alias.clone(),
                field: Box::new(FieldRef::from(field)),
            }),
            ("binning-strategy", [field, strategy, args @ ..]) => Ok(FieldRef::BinningStrategy {
                field: Box::new(FieldRef::from(field)),
                strategy: strategy.clone(),
                args: args.to_vec(),
            }),
            _ => Err(()),
        }
    }
}

impl From<&Value> for FieldRef {
    fn from(value: &Value) -> Self {
        let parsed = match value.as_array().map(Vec::as_slice) {
            Some([Value::String(tag), rest @ ..]) => FieldRef::parse_tagged(tag, rest),
            _ => Err(()),
        };
        parsed.unwrap_or_else(|_| FieldRef::Unknown(value.clone()))
    }
}

impl From<Value> for FieldRef {
    fn from(value: Value) -> Self {
        FieldRef::from(&value)
    }
}

fn options_value(options: &Option<FieldOptions>) -> Value {
    options.clone().map(Value::Object).unwrap_or(Value::Null)
}

impl From<&FieldRef> for Value {
    fn from(field: &FieldRef) -> Self {
        match field {
            FieldRef::Field { id, options } => {
                let id = match id {
                    FieldId::Id(id) => Value::from(*id),
                    FieldId::Name(name) => Value::from(name.as_str()),
                };
                Value::Array(vec!["field".into(), id, options_value(options)])
            }
            FieldRef::Expression { name, options } => {
                let mut clause = vec!["expression".into(), Value::from(name.as_str())];
                if options.is_some() {
                    clause.push(options_value(options));
                }
                Value::Array(clause)
            }
            FieldRef::Aggregation { index, options } => {
                let mut clause = vec!["aggregation".into(), Value::from(*index)];
                if options.is_some() {
                    clause.push(options_value(options));
                }
                Value::Array(clause)
            }
            FieldRef::FieldId(id) => Value::Array(vec!["field-id".into(), Value::from(*id)]),
            FieldRef::FieldLiteral { name, base_type } => {
                Value::Array(vec!["field-literal".into(), Value::from(name.as_str()), base_type.clone()])
            }
            FieldRef::ForeignKey { source, target } => {
                Value::Array(vec!["fk->".into(), Value::from(source.as_ref()), Value::from(target.as_ref())])
            }
            FieldRef::DateTimeField { field, unit } => {
                Value::Array(vec!["datetime-field".into(), Value::from(field.as_ref()), unit.clone()])
            }
            FieldRef::JoinedField { alias, field } => {
                Value::Array(vec!["joined-field".into(), Value::from(alias.as_str()), Value::from(field.as_ref())])
            }
            FieldRef::BinningStrategy { field, strategy, args } => {
                let mut clause = vec!["binning-strategy".into(), Value::from(field.as_ref()), strategy.clone()];
                clause.extend(args.iter().cloned());
                Value::Array(clause)
            }
            FieldRef::Unknown(value) => value.clone(),
        }
    }
}

impl From<FieldRef> for Value {
    fn from(field: FieldRef) -> Self {
        Value::from(&field)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::from(self))
    }
}
