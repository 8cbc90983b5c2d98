pub mod field_refs;
pub use field_refs::*;

pub mod clauses;
pub use clauses::*;
