use crate::query::{FieldId, FieldRef, TEMPORAL_UNITS};

/// Structural checks and comparisons over [`FieldRef`]s.
pub struct FieldRefs;

impl FieldRefs {
    /// Whether a reference is complete enough to sort or group by.
    pub fn is_valid_field(field: Option<&FieldRef>) -> bool {
        field.is_some_and(Self::is_valid)
    }

    fn is_valid(field: &FieldRef) -> bool {
        match field {
            FieldRef::Field { id: FieldId::Id(_), .. } => true,
            FieldRef::Field { id: FieldId::Name(name), .. } => !name.is_empty(),
            FieldRef::Expression { name, .. } => !name.is_empty(),
            FieldRef::Aggregation { .. } => true,
            FieldRef::FieldId(_) => true,
            FieldRef::FieldLiteral { name, base_type } => !name.is_empty() && base_type.is_string(),
            FieldRef::ForeignKey { source, target } => {
                Self::is_valid(source) && Self::is_valid(target)
            }
            FieldRef::DateTimeField { field, unit } => {
                Self::is_valid(field)
                    && unit.as_str().is_some_and(|unit| TEMPORAL_UNITS.contains(unit))
            }
            FieldRef::JoinedField { alias, field } => !alias.is_empty() && Self::is_valid(field),
            FieldRef::BinningStrategy { field, strategy, .. } => strategy.is_string() && Self::is_valid(field),
            FieldRef::Unknown(_) => false,
        }
    }

    /// Whether the reference names an aggregation result by index.
    pub fn is_aggregate_field(field: &FieldRef) -> bool {
        matches!(field, FieldRef::Aggregation { .. })
    }

    pub fn aggregate_index(field: &FieldRef) -> Option<usize> {
        match field {
            FieldRef::Aggregation { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// `exact` compares the whole reference. Otherwise two references match
    /// when they point at the same column, whatever unit, binning, join or
    /// fk path they carry.
    pub fn is_same_field(a: &FieldRef, b: &FieldRef, exact: bool) -> bool {
        if exact {
            return a == b;
        }
        match (a.target(), b.target()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
