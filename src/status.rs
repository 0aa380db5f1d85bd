//! Shift status classification.
//!
//! A shift gets exactly one status.  The rules are checked in a fixed
//! order and the first match wins:
//!
//! 1. nothing scheduled and nothing worked: not classified
//! 2. scheduled, no hours and no clock sessions: `missed`
//! 3. nothing scheduled but hours worked: `unscheduled`
//! 4. last session still open after the business date: `no-clock-out`
//! 5. first clock-in beyond the late tolerance: `late`
//! 6. last clock-out before the early tolerance: `early-out`
//! 7. otherwise: `on-time`

use crate::config::EngineConfig;
use crate::models::{ShiftRecord, ShiftStatus};
use chrono::{Duration, NaiveDate};

/// Classify `record` as seen on `as_of`.  Shifts dated before `as_of`
/// have fully elapsed.
///
/// Returns `None` for records that carry neither a schedule nor any
/// work; those take no part in aggregates or alerts.
pub fn classify(record: &ShiftRecord, config: &EngineConfig, as_of: NaiveDate) -> Option<ShiftStatus> {
    let scheduled = record.scheduled_hours();
    let actual = record.actual_hours();
    if scheduled == 0.0 && actual == 0.0 {
        return None;
    }
    if scheduled > 0.0 && actual == 0.0 && record.clock_sessions.is_empty() {
        return Some(ShiftStatus::Missed);
    }
    if scheduled == 0.0 && actual > 0.0 {
        return Some(ShiftStatus::Unscheduled);
    }
    if record.has_open_session() && record.business_date < as_of {
        return Some(ShiftStatus::NoClockOut);
    }
    if let (Some(start), Some(clock_in)) = (record.scheduled_start, record.first_clock_in()) {
        if clock_in > start + Duration::minutes(config.late_tolerance_minutes()) {
            return Some(ShiftStatus::Late);
        }
    }
    if let (Some(end), Some(clock_out)) = (record.scheduled_end, record.last_clock_out()) {
        if clock_out < end - Duration::minutes(config.early_tolerance_minutes()) {
            return Some(ShiftStatus::EarlyOut);
        }
    }
    Some(ShiftStatus::OnTime)
}

/// Minutes between the scheduled start and the first clock-in, floored
/// at zero.  Ignores the tolerance.
pub fn late_minutes(record: &ShiftRecord) -> f64 {
    match (record.scheduled_start, record.first_clock_in()) {
        (Some(start), Some(clock_in)) if clock_in > start => (clock_in - start).num_seconds() as f64 / 60.0,
        _ => 0.0,
    }
}

/// Minutes between the last clock-out and the scheduled end, floored at
/// zero.  An open last session counts as zero.
pub fn early_out_minutes(record: &ShiftRecord) -> f64 {
    match (record.scheduled_end, record.last_clock_out()) {
        (Some(end), Some(clock_out)) if clock_out < end => (end - clock_out).num_seconds() as f64 / 60.0,
        _ => 0.0,
    }
}
