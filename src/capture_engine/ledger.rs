//! Dedup ledger of captured page identifiers
//!
//! One ledger is owned by one run. It only ever grows during the run and
//! is replaced wholesale when a new run starts. Write-completion tasks
//! insert concurrently with the loop's reads, so the ledger is backed by
//! a lock-free set rather than a mutex-wrapped one.

use dashmap::DashSet;

/// Set of already-captured page identifiers (0-based stacking hints)
#[derive(Debug, Default)]
pub struct CaptureLedger {
    captured: DashSet<u32>,
}

impl CaptureLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership test for a page identifier
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.captured.contains(&id)
    }

    /// Record a captured identifier
    ///
    /// Returns `true` if the identifier was newly inserted, `false` if it
    /// was already present. At-most-once insertion per identifier falls
    /// out of set semantics, even under concurrent completions.
    pub fn insert(&self, id: u32) -> bool {
        self.captured.insert(id)
    }

    /// Number of distinct captured identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.captured.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// Captured pages as ascending 1-based display numbers
    #[must_use]
    pub fn captured_display_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.captured.iter().map(|id| *id + 1).collect();
        ids.sort_unstable();
        ids
    }

    /// Pages of `[1, total]` not yet captured, ascending display numbers
    #[must_use]
    pub fn missing_display_ids(&self, total: u32) -> Vec<u32> {
        (0..total)
            .filter(|id| !self.captured.contains(id))
            .map(|id| id + 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_at_most_once() {
        let ledger = CaptureLedger::new();
        assert!(ledger.insert(3));
        assert!(!ledger.insert(3));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn display_ids_are_one_based_and_sorted() {
        let ledger = CaptureLedger::new();
        for id in [4, 0, 2] {
            ledger.insert(id);
        }
        assert_eq!(ledger.captured_display_ids(), vec![1, 3, 5]);
    }

    #[test]
    fn missing_complements_captured() {
        let ledger = CaptureLedger::new();
        ledger.insert(1);
        ledger.insert(3);
        assert_eq!(ledger.missing_display_ids(5), vec![1, 3, 5]);
    }

    #[test]
    fn missing_is_empty_when_full() {
        let ledger = CaptureLedger::new();
        for id in 0..4 {
            ledger.insert(id);
        }
        assert!(ledger.missing_display_ids(4).is_empty());
    }
}
