//! Load statistics

/// Counters for one entity type's load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Files discovered
    pub files: usize,
    /// Files that could not be read or parsed at all
    pub failed_files: usize,
    /// Records that parsed and passed validation
    pub parsed: usize,
    /// Records dropped as malformed
    pub skipped: usize,
    /// Rows actually written
    pub inserted: usize,
    /// Rows ignored because their key already existed
    pub duplicates: usize,
    /// Batches rolled back
    pub failed_batches: usize,
}

impl LoadReport {
    /// True when nothing was attempted
    pub fn is_empty(&self) -> bool {
        *self == LoadReport::default()
    }
}
