//! Data models for the ShiftPulse engine.
//!
//! The `models` module defines the serialisable records the engine
//! consumes (employees, shifts with their clock and break sessions,
//! attendance marks) and the plain value structures it produces
//! (summaries, trend points, per-employee statistics and alerts).
//! Everything here derives `Serialize` and `Deserialize` so results can
//! cross an HTTP or IPC boundary unchanged.
//!
//! All timestamps are local-naive: the engine assumes a single site
//! clock and never converts between time zones.

use crate::error::{EngineError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference data for a member of staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Identifier used by shift and attendance records.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Job title, e.g. `"Line Cook"`.  Purely informational.
    #[serde(default)]
    pub role: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Upper-case first letters of the first and last name.
    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// One clock-in/clock-out pair.  An open session has no `clock_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSession {
    pub clock_in: NaiveDateTime,
    #[serde(default)]
    pub clock_out: Option<NaiveDateTime>,
}

impl ClockSession {
    /// Worked hours for a closed session; `None` while still open.
    pub fn duration_hours(&self) -> Option<f64> {
        self.clock_out.map(|out| hours_between(self.clock_in, out))
    }
}

/// A recorded break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakSession {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_hours: f64,
}

/// One scheduled and/or worked shift for one employee on one business
/// date, as supplied by the upstream data source.
///
/// Only raw facts live here.  Status, overtime and compliance are
/// always derived by the engine (see [`crate::metrics`]) and are never
/// read from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Identifier of the shift; used to build stable alert ids.
    pub id: String,
    pub employee_id: String,
    /// The calendar date the shift is attributed to, even when the
    /// clock times cross midnight.
    pub business_date: NaiveDate,
    #[serde(default)]
    pub scheduled_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub scheduled_end: Option<NaiveDateTime>,
    /// Explicit scheduled hours.  When absent they are derived from the
    /// scheduled window.
    #[serde(default)]
    pub scheduled_hours: Option<f64>,
    /// Explicit worked hours.  When absent they are derived from the
    /// closed clock sessions minus breaks.
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub clock_sessions: Vec<ClockSession>,
    #[serde(default)]
    pub break_sessions: Vec<BreakSession>,
    /// Break allotment for this shift.  When absent the configured
    /// per-length policy applies.
    #[serde(default)]
    pub scheduled_break_hours: Option<f64>,
}

impl ShiftRecord {
    pub fn scheduled_hours(&self) -> f64 {
        if let Some(hours) = self.scheduled_hours {
            return hours;
        }
        match (self.scheduled_start, self.scheduled_end) {
            (Some(start), Some(end)) => hours_between(start, end),
            _ => 0.0,
        }
    }

    pub fn actual_hours(&self) -> f64 {
        if let Some(hours) = self.actual_hours {
            return hours;
        }
        let clocked: f64 = self
            .clock_sessions
            .iter()
            .filter_map(ClockSession::duration_hours)
            .sum();
        (clocked - self.break_hours()).max(0.0)
    }

    pub fn break_hours(&self) -> f64 {
        self.break_sessions.iter().map(|b| b.duration_hours).sum()
    }

    pub fn overtime_hours(&self) -> f64 {
        (self.actual_hours() - self.scheduled_hours()).max(0.0)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_hours() > 0.0
    }

    pub fn is_split(&self) -> bool {
        self.clock_sessions.len() > 1
    }

    pub fn first_clock_in(&self) -> Option<NaiveDateTime> {
        self.clock_sessions.first().map(|s| s.clock_in)
    }

    /// Clock-out of the last session; `None` if there are no sessions
    /// or the last one is still open.
    pub fn last_clock_out(&self) -> Option<NaiveDateTime> {
        self.clock_sessions.last().and_then(|s| s.clock_out)
    }

    pub fn has_open_session(&self) -> bool {
        self.clock_sessions
            .last()
            .map_or(false, |s| s.clock_out.is_none())
    }

    /// Checks the record's shape.  The first offending field is
    /// reported; nothing is coerced.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::record(&self.id, "id", "must not be empty"));
        }
        if self.employee_id.trim().is_empty() {
            return Err(EngineError::record(&self.id, "employee_id", "must not be empty"));
        }
        check_hours(&self.id, "scheduled_hours", self.scheduled_hours)?;
        check_hours(&self.id, "actual_hours", self.actual_hours)?;
        check_hours(&self.id, "scheduled_break_hours", self.scheduled_break_hours)?;
        if let Some(actual) = self.actual_hours {
            if actual > 0.0 && self.clock_sessions.is_empty() {
                return Err(EngineError::record(
                    &self.id,
                    "actual_hours",
                    format!("is {actual} but no clock sessions were recorded"),
                ));
            }
        }
        if self.scheduled_hours.is_none() {
            match (self.scheduled_start, self.scheduled_end) {
                (Some(_), None) => {
                    return Err(EngineError::record(
                        &self.id,
                        "scheduled_end",
                        "is missing while scheduled_start is set",
                    ));
                }
                (None, Some(_)) => {
                    return Err(EngineError::record(
                        &self.id,
                        "scheduled_end",
                        "is set without a scheduled_start",
                    ));
                }
                _ => {}
            }
        }
        if let (Some(start), Some(end)) = (self.scheduled_start, self.scheduled_end) {
            if end < start {
                return Err(EngineError::record(
                    &self.id,
                    "scheduled_end",
                    format!("{end} is before scheduled_start {start}"),
                ));
            }
        }

        let last = self.clock_sessions.len().saturating_sub(1);
        let mut previous_in: Option<NaiveDateTime> = None;
        for (idx, session) in self.clock_sessions.iter().enumerate() {
            match session.clock_out {
                Some(out) if out < session.clock_in => {
                    return Err(EngineError::record(
                        &self.id,
                        "clock_sessions",
                        format!("session {idx} clocks out at {out} before clocking in at {}", session.clock_in),
                    ));
                }
                None if idx != last => {
                    return Err(EngineError::record(
                        &self.id,
                        "clock_sessions",
                        format!("session {idx} has no clock-out but is not the last session"),
                    ));
                }
                _ => {}
            }
            if previous_in.map_or(false, |prev| session.clock_in < prev) {
                return Err(EngineError::record(
                    &self.id,
                    "clock_sessions",
                    format!("session {idx} is out of chronological order"),
                ));
            }
            previous_in = Some(session.clock_in);
        }

        for (idx, brk) in self.break_sessions.iter().enumerate() {
            if !brk.duration_hours.is_finite() || brk.duration_hours < 0.0 {
                return Err(EngineError::record(
                    &self.id,
                    "break_sessions",
                    format!("break {idx} has invalid duration {}", brk.duration_hours),
                ));
            }
            if brk.end < brk.start {
                return Err(EngineError::record(
                    &self.id,
                    "break_sessions",
                    format!("break {idx} ends at {} before it starts at {}", brk.end, brk.start),
                ));
            }
        }
        Ok(())
    }
}

fn check_hours(record_id: &str, field: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(hours) if !hours.is_finite() => {
            Err(EngineError::record(record_id, field, "must be a finite number"))
        }
        Some(hours) if hours < 0.0 => {
            Err(EngineError::record(record_id, field, format!("must not be negative (got {hours})")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

/// Terminal classification of a single shift.  See
/// [`crate::status::classify`] for the precedence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftStatus {
    OnTime,
    Late,
    EarlyOut,
    Missed,
    Unscheduled,
    NoClockOut,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::OnTime => "on-time",
            ShiftStatus::Late => "late",
            ShiftStatus::EarlyOut => "early-out",
            ShiftStatus::Missed => "missed",
            ShiftStatus::Unscheduled => "unscheduled",
            ShiftStatus::NoClockOut => "no-clock-out",
        }
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// The closed set of policy breaches the detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "Late Clock-in")]
    LateClockIn,
    #[serde(rename = "Early Clock-out")]
    EarlyClockOut,
    #[serde(rename = "Missed Shift")]
    MissedShift,
    #[serde(rename = "Missing Clock-out")]
    MissingClockOut,
    #[serde(rename = "Excessive Break")]
    ExcessiveBreak,
    #[serde(rename = "Short Break")]
    ShortBreak,
    #[serde(rename = "No Break Taken")]
    NoBreakTaken,
    #[serde(rename = "Unscheduled Shift")]
    UnscheduledShift,
    #[serde(rename = "Excessive Overtime")]
    ExcessiveOvertime,
    #[serde(rename = "Split Shift")]
    SplitShift,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::LateClockIn => "Late Clock-in",
            AlertKind::EarlyClockOut => "Early Clock-out",
            AlertKind::MissedShift => "Missed Shift",
            AlertKind::MissingClockOut => "Missing Clock-out",
            AlertKind::ExcessiveBreak => "Excessive Break",
            AlertKind::ShortBreak => "Short Break",
            AlertKind::NoBreakTaken => "No Break Taken",
            AlertKind::UnscheduledShift => "Unscheduled Shift",
            AlertKind::ExcessiveOvertime => "Excessive Overtime",
            AlertKind::SplitShift => "Split Shift",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::MissedShift | AlertKind::MissingClockOut => Severity::High,
            AlertKind::LateClockIn
            | AlertKind::EarlyClockOut
            | AlertKind::NoBreakTaken
            | AlertKind::ExcessiveOvertime => Severity::Medium,
            AlertKind::ExcessiveBreak
            | AlertKind::ShortBreak
            | AlertKind::UnscheduledShift
            | AlertKind::SplitShift => Severity::Low,
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            AlertKind::LateClockIn => "Review scheduling or address tardiness pattern",
            AlertKind::EarlyClockOut => "Verify with employee, adjust schedule if needed",
            AlertKind::MissedShift => "Contact employee immediately, arrange coverage",
            AlertKind::MissingClockOut => "Contact employee, manually adjust timecard",
            AlertKind::ExcessiveBreak => "Remind employee of break policy",
            AlertKind::ShortBreak => "Make sure the employee is able to take a full break",
            AlertKind::NoBreakTaken => "Ensure compliance with labor law break requirements",
            AlertKind::UnscheduledShift => "Update schedule to reflect actual working pattern",
            AlertKind::ExcessiveOvertime => "Review staffing levels, redistribute workload",
            AlertKind::SplitShift => "Confirm the split was planned and breaks were recorded",
        }
    }

    /// Short prefix used in alert ids.
    pub(crate) fn slug(&self) -> &'static str {
        match self {
            AlertKind::LateClockIn => "late",
            AlertKind::EarlyClockOut => "early",
            AlertKind::MissedShift => "missed",
            AlertKind::MissingClockOut => "noclockout",
            AlertKind::ExcessiveBreak => "longbreak",
            AlertKind::ShortBreak => "shortbreak",
            AlertKind::NoBreakTaken => "nobreak",
            AlertKind::UnscheduledShift => "unscheduled",
            AlertKind::ExcessiveOvertime => "ot",
            AlertKind::SplitShift => "split",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A detected policy breach.  Generated fresh on every call; dedupe or
/// persistence is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// `<kind>-<shift id>`, stable across repeated runs.
    pub id: String,
    pub employee_id: String,
    pub business_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

/// Inclusive calendar range.  A range whose end precedes its start is
/// empty, not invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Headline KPIs across every employee in a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_employees: usize,
    pub total_shifts: usize,
    pub total_actual_hours: f64,
    pub total_scheduled_hours: f64,
    pub total_break_hours: f64,
    pub total_scheduled_break_hours: f64,
    pub total_overtime_hours: f64,
    /// `total_actual_hours - total_scheduled_hours`.
    pub variance: f64,
    pub missed_count: usize,
    pub late_count: usize,
    pub early_out_count: usize,
    pub no_clock_out_count: usize,
    pub unscheduled_count: usize,
    /// Actual over scheduled hours as a whole percentage.  Absent when
    /// nothing was scheduled.
    pub schedule_adherence: Option<u32>,
}

/// Hours for one calendar day, zero-filled when nothing happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    pub scheduled_hours: f64,
    pub actual_hours: f64,
    pub break_hours: f64,
    pub overtime_hours: f64,
}

/// Aggregates for one employee over a range.  Recomputed on every
/// query.
///
/// Hour totals are rounded to one decimal place.  Averages that would
/// divide by zero are `None` rather than `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeStats {
    pub employee_id: String,
    /// Full name when the employee is known, otherwise the id.
    pub display_name: String,
    pub shift_count: usize,
    pub total_scheduled: f64,
    pub total_actual: f64,
    pub total_break: f64,
    pub total_scheduled_break: f64,
    pub total_overtime: f64,
    pub late_count: usize,
    pub missed_count: usize,
    pub early_out_count: usize,
    /// Mean per-shift compliance score, rounded.
    pub avg_compliance: Option<u8>,
    /// Share of shifts that were not missed, as a whole percentage.
    pub attendance: Option<u8>,
    /// Mean break hours over worked shifts.
    pub avg_break: Option<f64>,
    /// Mean worked hours over worked shifts.
    pub avg_shift_length: Option<f64>,
}

/// Average break for one employee over the shifts where a break was
/// actually taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakAverage {
    pub employee_id: String,
    pub display_name: String,
    pub breaks_taken: usize,
    pub avg_break_hours: f64,
    pub avg_break_minutes: f64,
}

/// Manually recorded attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// One attendance mark for an employee on a business date.  At most
/// one exists per `(employee_id, business_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub business_date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A single entry in a bulk attendance submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub employee_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOutcome {
    pub created: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

/// Input to [`crate::engine::run_dashboard`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInput {
    /// Reference data used for display names.  Unknown ids are shown
    /// as-is.
    #[serde(default)]
    pub employees: Vec<Employee>,
    pub shifts: Vec<ShiftRecord>,
    pub range: DateRange,
    /// The day the dashboard is computed for.  Shifts dated before it
    /// have fully elapsed.
    pub as_of: NaiveDate,
}

/// Everything the dashboard shows for one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub as_of: NaiveDate,
    pub summary: Summary,
    pub daily_trend: Vec<DailyTrendPoint>,
    pub employee_stats: Vec<EmployeeStats>,
    pub alerts: Vec<Alert>,
}
