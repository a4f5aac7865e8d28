//! Dated quota readings and the retention-bounded history that holds them.
//!
//! All operations here are pure: they take a `History` by reference and
//! return a new one, so callers can hold on to the previous value until the
//! new one has been persisted.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Largest `remaining` value accepted anywhere. Both backends can store it.
pub const MAX_REMAINING: u64 = i64::MAX as u64;

/// One dated reading of remaining quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub remaining: u64,
}

impl Snapshot {
    pub fn new(date: NaiveDate, remaining: u64) -> Self {
        Snapshot { date, remaining }
    }
}

/// What to do when a new reading is higher than the reading dated before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefillPolicy {
    /// Keep history; the delta engine reports zero for that transition.
    #[default]
    Clamp,
    /// Drop everything before the refill and start the series over.
    Wipe,
}

/// Date-keyed collection of snapshots. Iteration is always chronological.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: BTreeMap<NaiveDate, u64>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn from_snapshots(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        History {
            entries: snapshots.into_iter().map(|s| (s.date, s.remaining)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<u64> {
        self.entries.get(&date).copied()
    }

    /// Snapshots in ascending date order.
    pub fn snapshots(&self) -> impl DoubleEndedIterator<Item = Snapshot> + ExactSizeIterator + '_ {
        self.entries
            .iter()
            .map(|(&date, &remaining)| Snapshot { date, remaining })
    }

    pub fn oldest(&self) -> Option<Snapshot> {
        self.snapshots().next()
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.snapshots().next_back()
    }
}

/// Insert or replace the entry for `snapshot.date`. The latest reading for a
/// day wins.
pub fn upsert(history: &History, snapshot: Snapshot) -> History {
    let mut next = history.clone();
    next.entries.insert(snapshot.date, snapshot.remaining);
    next
}

/// Keep only the most recent `retention_days` calendar days.
///
/// The cutoff is counted back from the newest entry, not from today, so a
/// job that stops running for a while does not lose its history on restart.
/// `retention_days <= 0` disables retention.
pub fn apply_retention(history: &History, retention_days: i64) -> History {
    if retention_days <= 0 {
        return history.clone();
    }
    let Some(newest) = history.latest() else {
        return history.clone();
    };

    // a window of N days ending at `newest` starts N-1 days earlier
    let span = u64::try_from(retention_days - 1).unwrap_or(0);
    let Some(cutoff) = newest.date.checked_sub_days(Days::new(span)) else {
        return history.clone();
    };

    History {
        entries: history.entries.range(cutoff..).map(|(&d, &r)| (d, r)).collect(),
    }
}

/// Applies the refill policy for an incoming reading, before it is upserted.
///
/// Under `Wipe`, a reading above its chronological predecessor discards the
/// entries dated before it. Entries on or after its date are kept, so a
/// backdated reading never removes newer history.
pub fn reset_on_refill(history: &History, incoming: &Snapshot, policy: RefillPolicy) -> History {
    match policy {
        RefillPolicy::Clamp => history.clone(),
        RefillPolicy::Wipe => {
            let previous = history
                .entries
                .range(..incoming.date)
                .next_back()
                .map(|(&date, &remaining)| Snapshot::new(date, remaining));

            match previous {
                Some(previous) if incoming.remaining > previous.remaining => {
                    let kept: BTreeMap<NaiveDate, u64> = history
                        .entries
                        .range(incoming.date..)
                        .map(|(&d, &r)| (d, r))
                        .collect();
                    tracing::warn!(
                        previous = previous.remaining,
                        current = incoming.remaining,
                        date = %incoming.date,
                        "quota increased, discarding {} earlier snapshots",
                        history.len() - kept.len()
                    );
                    History { entries: kept }
                }
                _ => history.clone(),
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn history(pairs: &[(&str, u64)]) -> History {
        History::from_snapshots(pairs.iter().map(|(d, r)| Snapshot::new(day(d), *r)))
    }

    #[test]
    fn upsert_replaces_same_day() {
        let h = history(&[("2024-01-01", 100)]);
        let next = upsert(&h, Snapshot::new(day("2024-01-01"), 90));
        assert_eq!(next.len(), 1);
        assert_eq!(next.get(day("2024-01-01")), Some(90));
        // original value untouched
        assert_eq!(h.get(day("2024-01-01")), Some(100));
    }

    #[test]
    fn snapshots_sorted_regardless_of_insert_order() {
        let h = history(&[("2024-01-03", 1), ("2024-01-01", 3), ("2024-01-02", 2)]);
        let dates: Vec<_> = h.snapshots().map(|s| s.date).collect();
        assert_eq!(dates, vec![day("2024-01-01"), day("2024-01-02"), day("2024-01-03")]);
        assert_eq!(h.latest().map(|s| s.remaining), Some(1));
        assert_eq!(h.oldest().map(|s| s.remaining), Some(3));
    }

    #[test]
    fn retention_keeps_newest_days() {
        let mut h = History::new();
        for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            h = upsert(&h, Snapshot::new(day(d), 10));
            h = apply_retention(&h, 2);
        }
        let dates: Vec<_> = h.snapshots().map(|s| s.date).collect();
        assert_eq!(dates, vec![day("2024-01-02"), day("2024-01-03")]);
    }

    #[test]
    fn retention_counts_calendar_days_not_entries() {
        let h = history(&[("2024-01-01", 5), ("2024-01-10", 4)]);
        let kept = apply_retention(&h, 5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.oldest().map(|s| s.date), Some(day("2024-01-10")));
    }

    #[test]
    fn retention_disabled_for_non_positive() {
        let h = history(&[("2024-01-01", 5), ("2024-03-01", 4)]);
        assert_eq!(apply_retention(&h, 0), h);
        assert_eq!(apply_retention(&h, -3), h);
    }

    #[test]
    fn retention_on_empty_history() {
        assert!(apply_retention(&History::new(), 30).is_empty());
    }

    #[test]
    fn clamp_policy_never_wipes() {
        let h = history(&[("2024-01-01", 10)]);
        let incoming = Snapshot::new(day("2024-01-02"), 500);
        assert_eq!(reset_on_refill(&h, &incoming, RefillPolicy::Clamp), h);
    }

    #[test]
    fn wipe_policy_clears_on_increase_only() {
        let h = history(&[("2024-01-01", 100), ("2024-01-02", 10)]);

        let refill = Snapshot::new(day("2024-01-03"), 500);
        assert!(reset_on_refill(&h, &refill, RefillPolicy::Wipe).is_empty());

        let usage = Snapshot::new(day("2024-01-03"), 5);
        assert_eq!(reset_on_refill(&h, &usage, RefillPolicy::Wipe), h);

        let equal = Snapshot::new(day("2024-01-03"), 10);
        assert_eq!(reset_on_refill(&h, &equal, RefillPolicy::Wipe), h);
    }

    #[test]
    fn wipe_policy_keeps_newer_entries_for_backdated_reading() {
        let h = history(&[("2024-01-02", 100), ("2024-01-03", 80)]);

        // no earlier entry to compare against
        let before_all = Snapshot::new(day("2024-01-01"), 120);
        assert_eq!(reset_on_refill(&h, &before_all, RefillPolicy::Wipe), h);

        // rises over 01-02 but lands before 01-03
        let h = history(&[("2024-01-01", 100), ("2024-01-02", 50), ("2024-01-04", 40)]);
        let between = Snapshot::new(day("2024-01-03"), 300);
        let kept = reset_on_refill(&h, &between, RefillPolicy::Wipe);
        assert_eq!(kept, history(&[("2024-01-04", 40)]));
    }

    #[test]
    fn wipe_policy_compares_against_predecessor_not_same_day() {
        let h = history(&[("2024-01-01", 100), ("2024-01-02", 10)]);
        // replacing 01-02 with a value above 01-01 is a refill relative to 01-01
        let kept = reset_on_refill(&h, &Snapshot::new(day("2024-01-02"), 150), RefillPolicy::Wipe);
        assert_eq!(kept, history(&[("2024-01-02", 10)]));
        // replacing 01-02 with a value still below 01-01 is plain usage
        let kept = reset_on_refill(&h, &Snapshot::new(day("2024-01-02"), 60), RefillPolicy::Wipe);
        assert_eq!(kept, h);
    }

    fn arb_history() -> impl Strategy<Value = History> {
        prop::collection::vec((0u64..400, 0u64..10_000), 0..60).prop_map(|pairs| {
            let base = day("2024-01-01");
            History::from_snapshots(pairs.into_iter().map(|(offset, remaining)| {
                Snapshot::new(base + Days::new(offset), remaining)
            }))
        })
    }

    proptest! {
        #[test]
        fn retention_is_bounded(h in arb_history(), n in 1i64..60) {
            let kept = apply_retention(&h, n);
            prop_assert!(kept.len() <= n as usize);
        }

        #[test]
        fn retention_never_drops_entries_inside_window(h in arb_history(), n in 1i64..60) {
            let kept = apply_retention(&h, n);
            if let Some(newest) = h.latest() {
                let cutoff = newest.date - Days::new((n - 1) as u64);
                for s in h.snapshots().filter(|s| s.date >= cutoff) {
                    prop_assert_eq!(kept.get(s.date), Some(s.remaining));
                }
                prop_assert!(kept.snapshots().all(|s| s.date >= cutoff));
            }
        }
    }
}
