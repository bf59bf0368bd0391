use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hostexec::dispatch::Step;
use hostexec_test_utils::builders::recording_dispatcher;
use proptest::prelude::*;

proptest! {
    /// Every resumable task that stays pending for `k` passes is advanced
    /// exactly `k + 1` times, and the dispatcher ends up empty and detached.
    #[test]
    fn resumable_tasks_are_advanced_k_plus_one_times(
        pending in proptest::collection::vec(0..8usize, 1..12),
        one_shots in 0..10usize,
    ) {
        let (dispatcher, tick) = recording_dispatcher();
        let counters: Vec<Arc<AtomicUsize>> =
            pending.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();

        for (k, counter) in pending.iter().copied().zip(counters.iter().cloned()) {
            let mut left = k;
            dispatcher.push_task(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                if left == 0 {
                    Step::Done
                } else {
                    left -= 1;
                    Step::Pending
                }
            });
        }

        let once_runs = Arc::new(AtomicUsize::new(0));
        for _ in 0..one_shots {
            let r = once_runs.clone();
            dispatcher.push(move || {
                r.fetch_add(1, Ordering::SeqCst);
            });
        }

        let max_k = pending.iter().copied().max().unwrap_or(0);
        for _ in 0..=max_k {
            dispatcher.drain();
        }

        for (k, counter) in pending.iter().zip(counters.iter()) {
            prop_assert_eq!(counter.load(Ordering::SeqCst), k + 1);
        }
        prop_assert_eq!(once_runs.load(Ordering::SeqCst), one_shots);
        prop_assert!(dispatcher.is_empty());
        prop_assert!(!dispatcher.is_attached());
        prop_assert_eq!(tick.attaches(), 1);
        prop_assert_eq!(tick.detaches(), 1);
    }

    /// A drain pass never executes more entries than were queued when it
    /// started.
    #[test]
    fn drain_is_bounded_by_the_snapshot(initial in 0..20usize) {
        let (dispatcher, _tick) = recording_dispatcher();

        for _ in 0..initial {
            let d = dispatcher.clone();
            dispatcher.push(move || d.push(|| {}));
        }

        prop_assert_eq!(dispatcher.drain(), initial);
        prop_assert_eq!(dispatcher.len(), initial);
        prop_assert_eq!(dispatcher.drain(), initial);
        prop_assert!(dispatcher.is_empty());
    }
}
