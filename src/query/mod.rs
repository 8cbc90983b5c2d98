pub mod query_error;
pub use query_error::*;

pub mod field_ref;
pub use field_ref::*;

pub mod aggregation;
pub use aggregation::*;

pub mod filter;
pub use filter::*;

pub mod order_by;
pub use order_by::*;

pub mod query;
pub use query::*;
