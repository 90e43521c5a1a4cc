//! Property tests for the notification store.
//!
//! Generates random operation sequences and verifies the store's
//! structural invariants hold after every prefix: unique ids, newest-first
//! insertion, a counter that never underflows, and idempotent
//! acknowledgements.

use std::collections::HashSet;

use proptest::prelude::*;
use tidings_core::NotificationStore;
use tidings_proto::{Notification, NotificationKind};

/// Operations the feed can drive the store through.
#[derive(Debug, Clone)]
enum Op {
    Prepend { id: u8, is_read: bool },
    MarkRead { id: u8 },
    MarkAllRead,
    SetCount { count: u32 },
    RemoveLocal { id: u8 },
    Snapshot { ids: Vec<u8>, count: u32 },
}

fn notification(id: u8, is_read: bool) -> Notification {
    Notification {
        id: format!("n{id}"),
        kind: NotificationKind::System,
        title: String::new(),
        message: String::new(),
        sender: None,
        community: None,
        post: None,
        redirect_url: None,
        is_read,
        created_at: "2026-08-01T00:00:00Z".into(),
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<u8>(), any::<bool>()).prop_map(|(id, is_read)| Op::Prepend { id, is_read }),
        3 => any::<u8>().prop_map(|id| Op::MarkRead { id }),
        1 => Just(Op::MarkAllRead),
        1 => (0u32..100).prop_map(|count| Op::SetCount { count }),
        2 => any::<u8>().prop_map(|id| Op::RemoveLocal { id }),
        1 => (prop::collection::vec(any::<u8>(), 0..8), 0u32..100)
            .prop_map(|(ids, count)| Op::Snapshot { ids, count }),
    ]
}

fn apply(store: &mut NotificationStore, op: &Op) {
    match op {
        Op::Prepend { id, is_read } => store.prepend(notification(*id, *is_read)),
        Op::MarkRead { id } => store.mark_read(&format!("n{id}")),
        Op::MarkAllRead => store.mark_all_read(),
        Op::SetCount { count } => store.set_unread_count(*count),
        Op::RemoveLocal { id } => store.remove_local(&format!("n{id}")),
        Op::Snapshot { ids, count } => {
            // Deliberately unfiltered: the store must dedupe repeated
            // ids itself.
            let list = ids.iter().map(|id| notification(*id, false)).collect();
            store.apply_snapshot(list, *count);
        },
    }
}

proptest! {
    /// Ids stay unique through any operation sequence.
    #[test]
    fn ids_stay_unique(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = NotificationStore::new();
        for op in &ops {
            apply(&mut store, op);
            let mut seen = HashSet::new();
            for n in store.notifications() {
                prop_assert!(seen.insert(n.id.clone()), "duplicate id {} in list", n.id);
            }
        }
    }

    /// The counter matches a signed reference model clamped at zero and
    /// never underflows (the store runs with overflow checks on).
    #[test]
    fn counter_matches_clamped_model(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = NotificationStore::new();
        // Reference model: list of (id, is_read), counter as a signed
        // value clamped at zero on every mutation.
        let mut model: Vec<(String, bool)> = Vec::new();
        let mut model_count: i64 = 0;

        for op in &ops {
            apply(&mut store, op);
            match op {
                Op::Prepend { id, is_read } => {
                    let key = format!("n{id}");
                    if let Some(slot) = model.iter_mut().find(|(k, _)| *k == key) {
                        slot.1 = *is_read;
                    } else {
                        model.insert(0, (key, *is_read));
                        model_count += 1;
                    }
                },
                Op::MarkRead { id } => {
                    let key = format!("n{id}");
                    if let Some(slot) = model.iter_mut().find(|(k, _)| *k == key) {
                        if !slot.1 {
                            slot.1 = true;
                            model_count = (model_count - 1).max(0);
                        }
                    }
                },
                Op::MarkAllRead => {
                    for slot in &mut model {
                        slot.1 = true;
                    }
                    model_count = 0;
                },
                Op::SetCount { count } => model_count = i64::from(*count),
                Op::RemoveLocal { id } => {
                    let key = format!("n{id}");
                    model.retain(|(k, _)| *k != key);
                },
                Op::Snapshot { ids, count } => {
                    // The store keeps the first occurrence's position and
                    // the last occurrence's payload; with uniform payloads
                    // here, keep-first positions suffice.
                    let mut seen = HashSet::new();
                    model = ids
                        .iter()
                        .filter(|id| seen.insert(**id))
                        .map(|id| (format!("n{id}"), false))
                        .collect();
                    model_count = i64::from(*count);
                },
            }

            prop_assert!(model_count >= 0);
            prop_assert_eq!(i64::from(store.unread_count()), model_count);
            let store_ids: Vec<&str> =
                store.notifications().iter().map(|n| n.id.as_str()).collect();
            let model_ids: Vec<&str> = model.iter().map(|(k, _)| k.as_str()).collect();
            prop_assert_eq!(store_ids, model_ids);
        }
    }

    /// Replaying a mark-read ack leaves the counter where the first one
    /// put it.
    #[test]
    fn duplicate_acks_are_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..40),
        id in any::<u8>(),
    ) {
        let mut store = NotificationStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        store.mark_read(&format!("n{id}"));
        let after_first = store.unread_count();
        let list_after_first = store.notifications().to_vec();

        store.mark_read(&format!("n{id}"));
        prop_assert_eq!(store.unread_count(), after_first);
        prop_assert_eq!(store.notifications(), &list_after_first[..]);
    }

    /// A snapshot wins over any accumulated local divergence.
    #[test]
    fn snapshot_overrides_divergence(
        ops in prop::collection::vec(op_strategy(), 0..40),
        count in 0u32..50,
    ) {
        let mut store = NotificationStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        store.apply_snapshot(vec![notification(200, false), notification(201, true)], count);

        prop_assert_eq!(store.len(), 2);
        prop_assert_eq!(store.unread_count(), count);
        prop_assert_eq!(store.notifications()[0].id.as_str(), "n200");
        prop_assert_eq!(store.notifications()[1].id.as_str(), "n201");
    }

    /// Local dismiss never moves the counter.
    #[test]
    fn dismiss_preserves_counter(
        ops in prop::collection::vec(op_strategy(), 0..40),
        id in any::<u8>(),
    ) {
        let mut store = NotificationStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        let before = store.unread_count();
        store.remove_local(&format!("n{id}"));
        prop_assert_eq!(store.unread_count(), before);
    }
}
