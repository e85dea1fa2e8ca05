//! Collection bookkeeping

use serde::Serialize;

/// Counters for one collection pass
///
/// `listed == duplicates_skipped + with_data + missing + skipped` holds at
/// the end of every pass that was not aborted by a sink error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    /// Resources returned by the listing, repeats included
    pub listed: usize,

    /// Repeated resource ids that were not visited again
    pub duplicates_skipped: usize,

    /// Resources whose detail was fetched
    pub with_data: usize,

    /// Resources the remote side had no data for
    pub missing: usize,

    /// Resources dropped after a failed detail fetch
    pub skipped: usize,
}

impl CollectionStats {
    /// Resources actually visited
    pub fn visited(&self) -> usize {
        self.with_data + self.missing + self.skipped
    }

    /// Whether every visited resource was skipped
    pub fn all_skipped(&self) -> bool {
        self.skipped > 0 && self.with_data == 0 && self.missing == 0
    }
}
