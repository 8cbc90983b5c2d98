use serde_json::Value;
use tracing::{trace, warn};

use crate::{
    cleaner::CleanerConfig,
    helpers::{Clauses, FieldRefs},
    query::{Condition, FieldRef, OrderBy, Query, QueryError},
};

/// Strips half-finished clauses from a query before it is run.
///
/// The editor lets users hit "run" with incomplete pieces on screen, so the
/// cleaner drops what cannot be executed instead of rejecting the query.
#[derive(Debug, Clone, Default)]
pub struct QueryCleaner {
    config: CleanerConfig,
}

impl QueryCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean `query` and hand it back. Steps run in clause order; the
    /// `order-by` repair reads the already cleaned breakouts.
    pub fn clean(&self, mut query: Query) -> Query {
        let aggregations = Clauses::aggregations(&query);
        query.aggregation = (!aggregations.is_empty()).then(|| aggregations.into_iter().map(Some).collect());

        let breakouts = Clauses::breakouts(&query);
        query.breakout = (!breakouts.is_empty()).then(|| breakouts.into_iter().map(Some).collect());

        let filters: Vec<Condition> = Clauses::filters(&query)
            .into_iter()
            .filter(Condition::is_complete)
            .collect();
        query.filter = Clauses::filter_clause(filters);

        if let Some(order_by) = query.order_by.take() {
            let sortable: Vec<OrderBy> = order_by
                .into_iter()
                .filter_map(|order_by| Self::clean_order_by(&query, order_by))
                .collect();
            query.order_by = (!sortable.is_empty()).then_some(sortable);
        }

        query.limit = self.clean_limit(query.limit.take());

        if let Some(expressions) = query.expressions.as_mut() {
            expressions.shift_remove("");
        }

        trace!(
            aggregation = query.aggregation.is_some(),
            breakout = query.breakout.is_some(),
            filter = query.filter.is_some(),
            order_by = query.order_by.is_some(),
            limit = query.limit.is_some(),
            "query cleaned"
        );

        query
    }

    fn clean_order_by(query: &Query, order_by: OrderBy) -> Option<OrderBy> {
        let (Some(direction), Some(field)) = (order_by.direction.as_ref(), order_by.field.as_ref()) else {
            return None;
        };
        if !FieldRefs::is_valid_field(Some(field)) {
            return None;
        }

        if let Some(index) = FieldRefs::aggregate_index(field) {
            return Self::can_sort_by_aggregate_field(query, index).then_some(order_by);
        }

        if Self::has_valid_breakout(query) {
            let breakouts = query.breakout.iter().flatten().flatten();

            if breakouts.clone().any(|breakout| FieldRefs::is_same_field(breakout, field, true)) {
                return Some(order_by);
            }

            // The executor wants the sort to carry the breakout's unit or fk
            // path, so borrow the breakout's reference.
            let matches: Vec<&FieldRef> = breakouts
                .filter(|breakout| FieldRefs::is_same_field(breakout, field, false))
                .collect();

            return match matches.as_slice() {
                [] => None,
                [first, rest @ ..] => {
                    // with several candidates the first one wins, which may not be the intended slot
                    if !rest.is_empty() {
                        let candidates: Vec<String> = matches.iter().map(ToString::to_string).collect();
                        warn!(
                            field = %field,
                            matches = ?candidates,
                            "Sort clause matches more than one breakout field"
                        );
                    }
                    Some(OrderBy::new(direction.clone(), (*first).clone()))
                }
            };
        }

        Clauses::is_bare_rows(query).then_some(order_by)
    }

    fn has_valid_breakout(query: &Query) -> bool {
        matches!(query.breakout.as_deref(), Some([Some(_), ..]))
    }

    /// Sorting by an aggregation only makes sense in a grouped query, and
    /// only when the aggregation at `index` has an operator.
    fn can_sort_by_aggregate_field(query: &Query, index: usize) -> bool {
        if !Self::has_valid_breakout(query) {
            return false;
        }
        Clauses::aggregations(query)
            .get(index)
            .is_some_and(|aggregation| aggregation.operator().is_some())
    }

    fn clean_limit(&self, limit: Option<Value>) -> Option<Value> {
        let Some(Value::Number(limit)) = limit else {
            return None;
        };

        match self.config.row_limit_cap {
            Some(cap) if limit.as_f64().is_some_and(|limit| limit > cap as f64) => Some(Value::from(cap)),
            _ => Some(Value::Number(limit)),
        }
    }
}

impl Query {
    /// Clean with the default configuration.
    pub fn clean(self) -> Self {
        QueryCleaner::default().clean(self)
    }
}

/// Clean an optional query. `None` passes through unchanged.
pub fn clean_query(query: Option<Query>) -> Option<Query> {
    query.map(Query::clean)
}

/// Clean a query held as JSON. `null` passes through unchanged; any other
/// non-object value is an error.
pub fn clean_query_value(value: Value) -> Result<Value, QueryError> {
    if value.is_null() {
        return Ok(value);
    }
    let query = Query::try_from(value)?;
    Ok(Value::from(query.clean()))
}
