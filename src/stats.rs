//! Summary statistics for the report.
//!
//! Both values are `None` whenever they cannot be computed without dividing
//! by zero; the report prints those as `N/A`.

use std::fmt;

use serde::Serialize;

use crate::delta::UsagePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Rounded mean consumption per period.
    pub average: Option<u64>,
    /// Rounded `latest_remaining / average`.
    pub days_remaining: Option<u64>,
}

impl Summary {
    pub fn compute(points: &[UsagePoint], latest_remaining: Option<u64>) -> Self {
        let total: u128 = points.iter().map(|p| u128::from(p.consumed)).sum();
        let average = div_round(total, points.len() as u128);

        // an average of zero means nothing is being used, no forecast
        let days_remaining = match (average, latest_remaining) {
            (Some(avg), Some(remaining)) => div_round(u128::from(remaining), u128::from(avg)),
            _ => None,
        };

        Summary { average, days_remaining }
    }
}

/// `round(n / d)` with halves rounded up, `None` for `d == 0`.
fn div_round(n: u128, d: u128) -> Option<u64> {
    if d == 0 {
        return None;
    }
    u64::try_from((n + d / 2) / d).ok()
}

/// Renders an optional statistic, `N/A` when absent.
pub struct OrNa(pub Option<u64>);

impl fmt::Display for OrNa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("N/A"),
        }
    }
}
