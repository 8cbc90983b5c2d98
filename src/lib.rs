pub mod query;
pub use query::{AggregationClause, Condition, Direction, FieldId, FieldRef, FilterClause, OrderBy, Query, QueryError};

pub mod helpers;
pub use helpers::{Clauses, FieldRefs};

pub mod cleaner;
pub use cleaner::{clean_query, clean_query_value, CleanerConfig, QueryCleaner, HARD_ROW_LIMIT};
