//! Per-shift derived metrics.
//!
//! Every aggregate and alert is built from [`ShiftMetrics`]: a raw
//! [`ShiftRecord`] that passed validation, falls inside the requested
//! range and received a status.  Evaluation validates the whole input
//! before producing anything, so a batch either evaluates completely or
//! fails on its first malformed record.

use crate::compliance::{ComplianceScorer, ShiftDeviation, WeightedScorer};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{DateRange, ShiftRecord, ShiftStatus};
use crate::status::classify;
use chrono::NaiveDate;
use tracing::debug;

/// A classified shift with every derived figure the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftMetrics<'a> {
    pub record: &'a ShiftRecord,
    pub status: ShiftStatus,
    pub scheduled_hours: f64,
    pub actual_hours: f64,
    pub break_hours: f64,
    pub scheduled_break_hours: f64,
    pub overtime_hours: f64,
    pub late_minutes: f64,
    pub early_out_minutes: f64,
    pub compliance: f64,
}

impl<'a> ShiftMetrics<'a> {
    pub fn employee_id(&self) -> &'a str {
        &self.record.employee_id
    }

    pub fn business_date(&self) -> NaiveDate {
        self.record.business_date
    }

    pub fn worked(&self) -> bool {
        self.actual_hours > 0.0
    }
}

/// Validate every record, stopping at the first failure.
pub fn validate_all(records: &[ShiftRecord]) -> Result<()> {
    records.iter().try_for_each(ShiftRecord::validate)
}

/// Derive metrics for one already-validated record.  `None` when the
/// record is not classified.
pub fn evaluate_shift<'a>(
    record: &'a ShiftRecord,
    config: &EngineConfig,
    as_of: NaiveDate,
    scorer: &dyn ComplianceScorer,
) -> Option<ShiftMetrics<'a>> {
    let status = classify(record, config, as_of)?;
    let deviation = ShiftDeviation::of(record);
    let scheduled_break_hours = record
        .scheduled_break_hours
        .unwrap_or_else(|| config.break_allotment_for(deviation.scheduled_hours));
    Some(ShiftMetrics {
        record,
        status,
        scheduled_hours: deviation.scheduled_hours,
        actual_hours: deviation.actual_hours,
        break_hours: record.break_hours(),
        scheduled_break_hours,
        overtime_hours: record.overtime_hours(),
        late_minutes: deviation.late_minutes,
        early_out_minutes: deviation.early_out_minutes,
        compliance: scorer.score(status, &deviation),
    })
}

/// Validate `records` and evaluate those dated inside `range`, scoring
/// compliance with the configured [`WeightedScorer`].
pub fn evaluate<'a>(
    records: &'a [ShiftRecord],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Vec<ShiftMetrics<'a>>> {
    evaluate_with(records, range, config, as_of, &WeightedScorer::from_config(config))
}

/// Like [`evaluate`] with a caller-supplied scorer.
pub fn evaluate_with<'a>(
    records: &'a [ShiftRecord],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
    scorer: &dyn ComplianceScorer,
) -> Result<Vec<ShiftMetrics<'a>>> {
    validate_all(records)?;
    let evaluated: Vec<ShiftMetrics<'a>> = records
        .iter()
        .filter(|r| range.contains(r.business_date))
        .filter_map(|r| evaluate_shift(r, config, as_of, scorer))
        .collect();
    debug!(
        records = records.len(),
        evaluated = evaluated.len(),
        scorer = scorer.name(),
        "evaluated shifts"
    );
    Ok(evaluated)
}
