//! Property tests for the ledger / completion-evaluation pair

use proptest::prelude::*;
use tilegrab::capture_engine::{CaptureLedger, CompletionStatus};

proptest! {
    /// Captured and missing display ids always partition [1, total].
    #[test]
    fn captured_and_missing_partition_the_page_range(
        total in 1u32..64,
        inserts in proptest::collection::vec(0u32..64, 0..128),
    ) {
        let ledger = CaptureLedger::new();
        for id in inserts.iter().filter(|id| **id < total) {
            ledger.insert(*id);
        }

        let status = CompletionStatus::evaluate(&ledger, total);

        let mut union: Vec<u32> = status
            .captured
            .iter()
            .chain(status.missing.iter())
            .copied()
            .collect();
        union.sort_unstable();
        union.dedup();
        let expected: Vec<u32> = (1..=total).collect();
        prop_assert_eq!(union, expected);

        // Disjoint: nothing is both captured and missing.
        prop_assert!(status.captured.iter().all(|id| !status.missing.contains(id)));
    }

    /// Set semantics: re-inserting never grows the ledger, and the ledger
    /// never shrinks as more identifiers arrive.
    #[test]
    fn ledger_grows_monotonically_without_duplicates(
        inserts in proptest::collection::vec(0u32..32, 0..96),
    ) {
        let ledger = CaptureLedger::new();
        let mut previous_len = 0;

        for id in &inserts {
            let was_new = ledger.insert(*id);
            let len = ledger.len();
            if was_new {
                prop_assert_eq!(len, previous_len + 1);
            } else {
                prop_assert_eq!(len, previous_len);
            }
            prop_assert!(ledger.contains(*id));
            previous_len = len;
        }

        let display = ledger.captured_display_ids();
        let mut deduped = display.clone();
        deduped.dedup();
        prop_assert_eq!(display, deduped);
    }

    /// Completion requires exactly the full range - nothing less.
    #[test]
    fn complete_iff_every_identifier_present(total in 1u32..48, drop_one in 0u32..48) {
        let ledger = CaptureLedger::new();
        for id in 0..total {
            ledger.insert(id);
        }
        prop_assert!(CompletionStatus::evaluate(&ledger, total).complete);

        let partial = CaptureLedger::new();
        let dropped = drop_one % total;
        for id in (0..total).filter(|id| *id != dropped) {
            partial.insert(id);
        }
        let status = CompletionStatus::evaluate(&partial, total);
        prop_assert!(!status.complete);
        prop_assert_eq!(status.missing, vec![dropped + 1]);
    }
}
