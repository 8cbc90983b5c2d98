use crate::query::{AggregationClause, Condition, FieldRef, FilterClause, Query};

/// Read-only accessors that pull the usable pieces out of a [`Query`].
pub struct Clauses;

impl Clauses {
    /// Aggregations that name an operator, without the legacy `["rows"]`
    /// marker. Empty slots and operator-less clauses are skipped.
    pub fn aggregations(query: &Query) -> Vec<AggregationClause> {
        query
            .aggregation
            .iter()
            .flatten()
            .flatten()
            .filter(|clause| clause.operator().is_some() && !clause.is_rows())
            .cloned()
            .collect()
    }

    pub fn breakouts(query: &Query) -> Vec<FieldRef> {
        query.breakout.iter().flatten().flatten().cloned().collect()
    }

    pub fn filters(query: &Query) -> Vec<Condition> {
        query.filter.as_ref().map(FilterClause::conditions).unwrap_or_default()
    }

    /// Rebuilds a filter from its conditions: nothing, the lone condition,
    /// or an `and` over all of them.
    pub fn filter_clause(mut conditions: Vec<Condition>) -> Option<FilterClause> {
        match conditions.len() {
            0 => None,
            1 => conditions.pop().map(FilterClause::Condition),
            _ => Some(FilterClause::And(conditions)),
        }
    }

    /// A query without aggregations returns raw rows.
    pub fn is_bare_rows(query: &Query) -> bool {
        Self::aggregations(query).is_empty()
    }
}
