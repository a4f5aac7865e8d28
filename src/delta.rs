//! Per-period consumption derived from consecutive snapshots.
//!
//! - N snapshots yield N-1 usage points, one per adjacent pair
//! - a rise in remaining quota is a refill, reported as zero consumption
//! - consumption is never negative

use chrono::NaiveDate;
use serde::Serialize;

use crate::history::{History, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsagePoint {
    pub date: NaiveDate,
    pub consumed: u64,
}

/// How remaining quota moved between two consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Consumed(u64),
    Unchanged,
    Refill { added: u64 },
}

impl Transition {
    pub fn between(prev: &Snapshot, curr: &Snapshot) -> Self {
        match curr.remaining.cmp(&prev.remaining) {
            std::cmp::Ordering::Less => Transition::Consumed(prev.remaining - curr.remaining),
            std::cmp::Ordering::Equal => Transition::Unchanged,
            std::cmp::Ordering::Greater => Transition::Refill {
                added: curr.remaining - prev.remaining,
            },
        }
    }

    /// Consumption under the clamp-to-zero policy.
    pub fn consumed(&self) -> u64 {
        match self {
            Transition::Consumed(n) => *n,
            Transition::Unchanged | Transition::Refill { .. } => 0,
        }
    }
}

/// One usage point per adjacent pair of snapshots, in ascending date order.
pub fn derive(history: &History) -> Vec<UsagePoint> {
    let snapshots: Vec<Snapshot> = history.snapshots().collect();

    snapshots
        .windows(2)
        .map(|pair| {
            let transition = Transition::between(&pair[0], &pair[1]);
            if let Transition::Refill { added } = transition {
                tracing::debug!(date = %pair[1].date, added, "refill detected, consumption clamped to 0");
            }
            UsagePoint {
                date: pair[1].date,
                consumed: transition.consumed(),
            }
        })
        .collect()
}

/// Per-snapshot transitions, `None` for the oldest entry which has no
/// predecessor. Same order as `History::snapshots`.
pub fn transitions(history: &History) -> Vec<(Snapshot, Option<Transition>)> {
    let mut prev: Option<Snapshot> = None;
    history
        .snapshots()
        .map(|curr| {
            let transition = prev.map(|p| Transition::between(&p, &curr));
            prev = Some(curr);
            (curr, transition)
        })
        .collect()
}

/// The most recent `k` points.
pub fn window(points: &[UsagePoint], k: usize) -> &[UsagePoint] {
    &points[points.len().saturating_sub(k)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::day;
    use proptest::prelude::*;

    fn history(pairs: &[(&str, u64)]) -> History {
        History::from_snapshots(pairs.iter().map(|(d, r)| Snapshot::new(day(d), *r)))
    }

    #[test]
    fn consumption_between_days() {
        let points = derive(&history(&[
            ("2024-01-01", 100),
            ("2024-01-02", 80),
            ("2024-01-03", 80),
        ]));
        assert_eq!(
            points,
            vec![
                UsagePoint { date: day("2024-01-02"), consumed: 20 },
                UsagePoint { date: day("2024-01-03"), consumed: 0 },
            ]
        );
    }

    #[test]
    fn refill_clamped_to_zero() {
        let points = derive(&history(&[("2024-01-01", 10), ("2024-01-02", 500)]));
        assert_eq!(points, vec![UsagePoint { date: day("2024-01-02"), consumed: 0 }]);
    }

    #[test]
    fn usage_after_refill_counts_from_new_level() {
        let points = derive(&history(&[
            ("2024-01-01", 10),
            ("2024-01-02", 500),
            ("2024-01-03", 450),
        ]));
        let consumed: Vec<u64> = points.iter().map(|p| p.consumed).collect();
        assert_eq!(consumed, vec![0, 50]);
    }

    #[test]
    fn degenerate_histories() {
        assert!(derive(&History::new()).is_empty());
        assert!(derive(&history(&[("2024-01-01", 10)])).is_empty());
    }

    #[test]
    fn order_follows_dates_not_insertion() {
        let points = derive(&history(&[("2024-01-03", 70), ("2024-01-01", 100), ("2024-01-02", 90)]));
        let consumed: Vec<u64> = points.iter().map(|p| p.consumed).collect();
        assert_eq!(consumed, vec![10, 20]);
    }

    #[test]
    fn transitions_mark_oldest_as_boundary() {
        let rows = transitions(&history(&[("2024-01-01", 10), ("2024-01-02", 30), ("2024-01-03", 30)]));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].1, None);
        assert_eq!(rows[1].1, Some(Transition::Refill { added: 20 }));
        assert_eq!(rows[2].1, Some(Transition::Unchanged));
    }

    #[test]
    fn window_takes_most_recent() {
        let points = derive(&history(&[
            ("2024-01-01", 100),
            ("2024-01-02", 90),
            ("2024-01-03", 70),
            ("2024-01-04", 40),
        ]));
        let recent = window(&points, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, day("2024-01-03"));
        assert_eq!(recent[1].consumed, 30);

        assert_eq!(window(&points, 50).len(), 3);
        assert!(window(&points, 0).is_empty());
    }

    proptest! {
        #[test]
        fn two_snapshot_clamp_law(r1 in 0u64..1_000_000, r2 in 0u64..1_000_000) {
            let points = derive(&history(&[("2024-01-01", r1), ("2024-01-02", r2)]));
            prop_assert_eq!(points.len(), 1);
            let expected = if r2 <= r1 { r1 - r2 } else { 0 };
            prop_assert_eq!(points[0].consumed, expected);
        }

        #[test]
        fn one_point_per_transition(values in prop::collection::vec(0u64..u64::MAX, 0..40)) {
            let base = day("2024-01-01");
            let h = History::from_snapshots(values.iter().enumerate().map(|(i, r)| {
                Snapshot::new(base + chrono::Days::new(i as u64), *r)
            }));
            let points = derive(&h);
            prop_assert_eq!(points.len(), values.len().saturating_sub(1));
            for (i, p) in points.iter().enumerate() {
                prop_assert_eq!(p.consumed, values[i].saturating_sub(values[i + 1]));
            }
        }
    }
}
