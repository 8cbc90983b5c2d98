pub mod config;
pub use config::*;

pub mod query_cleaner;
pub use query_cleaner::*;

#[cfg(test)]
mod _tests;
