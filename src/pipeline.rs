//! One pass of the job: record a reading, then regenerate the artifacts.
//!
//! Ordering matters for crash safety:
//! 1. load stored history (fails loudly on corrupt state)
//! 2. build the new history in memory (refill policy, upsert, retention)
//! 3. persist it in full
//! 4. derive usage, compose chart and report in memory
//! 5. write chart, then report
//!
//! Nothing is written before step 3 succeeds.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::chart::{self, ChartText};
use crate::config::Config;
use crate::delta;
use crate::error::{Error, Result};
use crate::history::{self, History, Snapshot, MAX_REMAINING};
use crate::report::{self, markdown::ReportText};
use crate::stats::Summary;
use crate::store::HistoryStore;
use crate::util::{relative_link, write_atomic};

/// Rendered chart and report, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub chart_svg: String,
    pub report: String,
    pub summary: Summary,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub entries: usize,
    pub summary: Summary,
    pub chart_file: PathBuf,
    pub report_file: PathBuf,
}

/// Today's date in UTC, the key a scheduled run files its reading under.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// The history that results from recording `snapshot` on top of `current`.
pub fn next_history(current: &History, snapshot: Snapshot, config: &Config) -> History {
    let kept = history::reset_on_refill(current, &snapshot, config.refill_policy);
    let updated = history::upsert(&kept, snapshot);
    history::apply_retention(&updated, config.retention_days)
}

/// Load, update and persist. Returns the persisted history.
pub fn ingest(store: &mut dyn HistoryStore, snapshot: Snapshot, config: &Config) -> Result<History> {
    if snapshot.remaining > MAX_REMAINING {
        return Err(Error::InvalidSnapshot(format!(
            "remaining {} on {} exceeds {MAX_REMAINING}",
            snapshot.remaining, snapshot.date
        )));
    }
    let current = store.load()?;
    let history = next_history(&current, snapshot, config);

    let dropped = current.snapshots().filter(|s| history.get(s.date).is_none()).count();
    tracing::info!(
        date = %snapshot.date,
        remaining = snapshot.remaining,
        entries = history.len(),
        backend = store.name(),
        "recording snapshot"
    );
    if dropped > 0 {
        tracing::debug!(dropped, "snapshots dropped by retention or refill policy");
    }

    store.persist(&history)?;
    Ok(history)
}

/// Compose chart and report for a history. Pure.
pub fn build_artifacts(history: &History, config: &Config) -> Artifacts {
    let points = chart::series(history, config.chart_series, config.chart_window_days);
    let chart_svg = chart::render(
        &points,
        &config.chart,
        &ChartText {
            title: config.chart_title(),
            unit_label: config.unit_label.clone(),
        },
    );

    let usage = delta::derive(history);
    let summary = Summary::compute(&usage, history.latest().map(|s| s.remaining));
    tracing::debug!(
        periods = usage.len(),
        average = ?summary.average,
        days_remaining = ?summary.days_remaining,
        "derived usage"
    );

    let report = report::markdown::compose(
        history,
        &summary,
        &ReportText {
            title: config.report_title.clone(),
            unit_label: config.unit_label.clone(),
            chart_link: relative_link(&config.report_file, &config.chart_file),
        },
    );

    Artifacts { chart_svg, report, summary }
}

pub fn write_artifacts(artifacts: &Artifacts, config: &Config) -> Result<()> {
    write_atomic(&config.chart_file, artifacts.chart_svg.as_bytes())?;
    report::write(&config.report_file, &artifacts.report, config.report_mode)?;
    tracing::info!(
        chart = %config.chart_file.display(),
        report = %config.report_file.display(),
        "artifacts written"
    );
    Ok(())
}

/// Regenerate artifacts from whatever is stored.
pub fn render(store: &dyn HistoryStore, config: &Config) -> Result<RunSummary> {
    let history = store.load()?;
    publish(&history, config)
}

/// Record a reading and regenerate artifacts.
pub fn record(store: &mut dyn HistoryStore, snapshot: Snapshot, config: &Config) -> Result<RunSummary> {
    let history = ingest(store, snapshot, config)?;
    publish(&history, config)
}

fn publish(history: &History, config: &Config) -> Result<RunSummary> {
    let artifacts = build_artifacts(history, config);
    write_artifacts(&artifacts, config)?;
    Ok(RunSummary {
        entries: history.len(),
        summary: artifacts.summary,
        chart_file: config.chart_file.clone(),
        report_file: config.report_file.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{day, RefillPolicy};
    use crate::store::sqlite::SqliteStore;

    #[test]
    fn next_history_applies_retention() {
        let config = Config { retention_days: 2, ..Config::default() };
        let mut h = History::new();
        for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            h = next_history(&h, Snapshot::new(day(d), 10), &config);
        }
        assert_eq!(h.len(), 2);
        assert_eq!(h.oldest().map(|s| s.date), Some(day("2024-01-02")));
    }

    #[test]
    fn next_history_wipe_policy() {
        let config = Config { refill_policy: RefillPolicy::Wipe, ..Config::default() };
        let h = History::from_snapshots([
            Snapshot::new(day("2024-01-01"), 50),
            Snapshot::new(day("2024-01-02"), 10),
        ]);
        let next = next_history(&h, Snapshot::new(day("2024-01-03"), 500), &config);
        assert_eq!(next.len(), 1);
        assert_eq!(next.latest(), Some(Snapshot::new(day("2024-01-03"), 500)));
    }

    #[test]
    fn next_history_wipe_keeps_newer_entries_for_backdated_reading() {
        let config = Config { refill_policy: RefillPolicy::Wipe, ..Config::default() };
        let h = History::from_snapshots([
            Snapshot::new(day("2024-01-02"), 100),
            Snapshot::new(day("2024-01-03"), 80),
        ]);
        let next = next_history(&h, Snapshot::new(day("2024-01-01"), 120), &config);
        let dates: Vec<_> = next.snapshots().map(|s| s.date).collect();
        assert_eq!(dates, vec![day("2024-01-01"), day("2024-01-02"), day("2024-01-03")]);
    }

    #[test]
    fn ingest_persists_through_store() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let config = Config::default();
        ingest(&mut store, Snapshot::new(day("2024-01-01"), 100), &config).unwrap();
        ingest(&mut store, Snapshot::new(day("2024-01-02"), 80), &config).unwrap();
        ingest(&mut store, Snapshot::new(day("2024-01-02"), 75), &config).unwrap();

        let stored = store.load().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.get(day("2024-01-02")), Some(75));
    }

    #[test]
    fn ingest_rejects_unstorable_reading_before_loading() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let config = Config::default();
        ingest(&mut store, Snapshot::new(day("2024-01-01"), 100), &config).unwrap();

        let err = ingest(&mut store, Snapshot::new(day("2024-01-02"), MAX_REMAINING + 1), &config)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn artifacts_link_chart_relative_to_report() {
        let config = Config {
            chart_file: PathBuf::from("docs/img/chart.svg"),
            report_file: PathBuf::from("docs/USAGE.md"),
            ..Config::default()
        };
        let h = History::from_snapshots([Snapshot::new(day("2024-01-01"), 5)]);
        let artifacts = build_artifacts(&h, &config);
        assert!(artifacts.report.contains("![Usage trend](./img/chart.svg)"));
        assert!(artifacts.chart_svg.contains("Usage over the last 14 days"));
    }
}
