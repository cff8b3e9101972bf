//! Aggregate presence store.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::pidf::PresenceReport;

/// Latest known status per reporter, collected between forwarding cycles.
///
/// Writers upsert under the lock; the forwarder takes the whole map in
/// one swap. An update therefore lands in exactly one snapshot: either
/// the batch being drained or the next one, never both, never neither.
#[derive(Debug, Default)]
pub struct AggregateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl AggregateStore {
    pub fn new() -> AggregateStore {
        AggregateStore::default()
    }

    /// Records a report, replacing any previous status for the reporter.
    pub fn insert(&self, report: PresenceReport) {
        self.entries.lock().insert(report.reporter, report.status);
    }

    /// Removes and returns everything collected so far, leaving the
    /// store empty in the same atomic step.
    pub fn drain(&self) -> HashMap<String, String> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Current status for a reporter, if one is pending.
    pub fn get(&self, reporter: &str) -> Option<String> {
        self.entries.lock().get(reporter).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn report(reporter: &str, status: &str) -> PresenceReport {
        PresenceReport {
            reporter: reporter.to_string(),
            status: status.to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn insert_upserts_per_reporter() {
        let store = AggregateStore::new();
        store.insert(report("alice@open-ims.test", "open"));
        store.insert(report("bob@open-ims.test", "open"));
        store.insert(report("alice@open-ims.test", "closed"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("alice@open-ims.test").as_deref(), Some("closed"));
        assert_eq!(store.get("bob@open-ims.test").as_deref(), Some("open"));
    }

    #[test]
    fn drain_empties_the_store() {
        let store = AggregateStore::new();
        store.insert(report("alice@open-ims.test", "open"));

        let batch = store.drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.get("alice@open-ims.test").map(String::as_str), Some("open"));
        assert!(store.is_empty());
        assert!(store.drain().is_empty());
    }

    #[test]
    fn updates_after_a_drain_are_kept_for_the_next_one() {
        let store = AggregateStore::new();
        store.insert(report("alice@open-ims.test", "open"));
        store.drain();
        store.insert(report("alice@open-ims.test", "closed"));

        let batch = store.drain();
        assert_eq!(batch.get("alice@open-ims.test").map(String::as_str), Some("closed"));
    }

    #[test]
    fn concurrent_drains_see_each_update_exactly_once() {
        let store = Arc::new(AggregateStore::new());
        let total = 500usize;

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..total {
                    store.insert(report(&format!("user{i}@open-ims.test"), "open"));
                }
            })
        };

        let mut batches = Vec::new();
        for _ in 0..100 {
            batches.push(store.drain());
            std::thread::yield_now();
        }
        writer.join().unwrap();
        batches.push(store.drain());

        let mut seen: HashMap<String, String> = HashMap::new();
        for batch in batches {
            for (reporter, status) in batch {
                assert!(
                    seen.insert(reporter.clone(), status).is_none(),
                    "{reporter} appeared in two batches"
                );
            }
        }
        assert_eq!(seen.len(), total);
    }

    proptest! {
        // The store must behave exactly like a map replay of the same
        // update sequence, whatever the interleaving of reporters.
        #[test]
        fn replays_like_a_map(updates in proptest::collection::vec((0usize..5, "[a-z]{1,8}"), 0..40)) {
            let store = AggregateStore::new();
            let mut model = HashMap::new();
            for (who, status) in updates {
                let reporter = format!("user{who}@open-ims.test");
                store.insert(report(&reporter, &status));
                model.insert(reporter, status);
            }
            prop_assert_eq!(store.drain(), model);
        }
    }
}
