/// The backend never returns more rows than this, whatever the query asks for.
pub const HARD_ROW_LIMIT: u64 = 2000;

/// Cleaner configuration.
///
/// - `row_limit_cap` lowers any numeric `limit` above it to the cap. `None`
///   leaves numeric limits as they are.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanerConfig {
    /// Upper bound applied to numeric limits
    pub row_limit_cap: Option<u64>,
}

impl CleanerConfig {
    /// Create default configuration: no limit cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: cap limits at [`HARD_ROW_LIMIT`].
    pub fn capped() -> Self {
        Self::with_row_limit_cap(HARD_ROW_LIMIT)
    }

    pub fn with_row_limit_cap(cap: u64) -> Self {
        Self { row_limit_cap: Some(cap) }
    }
}
