//! Axis scales.
//!
//! The time scale maps calendar days linearly onto the plot width. The value
//! scale maps `[0, ceiling]` onto `[height, 0]` where the ceiling is the
//! largest value times the headroom factor, rounded up to a whole tick step.

use chrono::NaiveDate;

/// Domain ceiling used when every value is zero.
pub const MIN_CEILING: f64 = 1.0;

pub struct TimeScale {
    start: NaiveDate,
    span_days: i64,
    range: f64,
}

impl TimeScale {
    pub fn new(dates: &[NaiveDate], range: f64) -> Self {
        let start = dates.iter().min().copied().unwrap_or_default();
        let end = dates.iter().max().copied().unwrap_or(start);
        TimeScale {
            start,
            span_days: (end - start).num_days(),
            range,
        }
    }

    pub fn map(&self, date: NaiveDate) -> f64 {
        // a single day has no extent to spread over
        if self.span_days == 0 {
            return self.range / 2.0;
        }
        (date - self.start).num_days() as f64 / self.span_days as f64 * self.range
    }
}

/// A tick step of `factor * 10^exponent`, kept symbolic so multiples of
/// fractional steps come out exact (3 * 0.2 is 0.6, not 0.6000000000000001).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    factor: u64,
    exponent: i32,
}

impl Step {
    /// Step giving roughly `count` ticks over `[0, stop]`, snapped to 1, 2 or
    /// 5 times a power of ten.
    pub fn for_extent(stop: f64, count: usize) -> Self {
        let raw = stop / count.max(1) as f64;
        let mut exponent = raw.log10().floor() as i32;
        let error = raw / 10f64.powi(exponent);

        let mut factor = if error >= 50f64.sqrt() {
            10
        } else if error >= 10f64.sqrt() {
            5
        } else if error >= 2f64.sqrt() {
            2
        } else {
            1
        };
        if factor == 10 {
            factor = 1;
            exponent += 1;
        }

        Step { factor, exponent }
    }

    pub fn multiple(self, k: u64) -> f64 {
        let n = (k * self.factor) as f64;
        if self.exponent >= 0 {
            n * 10f64.powi(self.exponent)
        } else {
            n / 10f64.powi(-self.exponent)
        }
    }

    pub fn value(self) -> f64 {
        self.multiple(1)
    }

    /// Smallest `k >= 1` with `multiple(k) >= stop`.
    fn steps_to(self, stop: f64) -> u64 {
        ((stop / self.value()) - 1e-9).ceil().max(1.0) as u64
    }

    /// Decimal places needed to print multiples of this step.
    pub fn decimals(self) -> usize {
        usize::try_from(-self.exponent).unwrap_or(0)
    }
}

pub struct ValueScale {
    ceiling: f64,
    step: Step,
    steps: u64,
    height: f64,
}

impl ValueScale {
    pub fn new(max_value: u64, headroom: f64, tick_count: usize, height: f64) -> Self {
        let mut stop = max_value as f64 * headroom;
        if stop <= 0.0 || !stop.is_finite() {
            stop = MIN_CEILING;
        }

        // same fixpoint iteration as d3's nice(): re-derive the step from
        // the rounded ceiling until it stops changing
        let mut step = Step::for_extent(stop, tick_count);
        let mut steps = step.steps_to(stop);
        for _ in 0..10 {
            let ceiling = step.multiple(steps);
            let next = Step::for_extent(ceiling, tick_count);
            if next == step {
                break;
            }
            step = next;
            steps = step.steps_to(ceiling);
        }

        ValueScale {
            ceiling: step.multiple(steps),
            step,
            steps,
            height,
        }
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn map(&self, value: f64) -> f64 {
        self.height - value / self.ceiling * self.height
    }

    pub fn ticks(&self) -> Vec<f64> {
        (0..=self.steps).map(|k| self.step.multiple(k)).collect()
    }
}

/// One tick per date while the series is short, every n-th date beyond
/// `max_ticks`.
pub fn date_ticks(dates: &[NaiveDate], max_ticks: usize) -> Vec<NaiveDate> {
    let max_ticks = max_ticks.max(1);
    let stride = dates.len().div_ceil(max_ticks).max(1);
    dates.iter().copied().step_by(stride).collect()
}
