//! Attendance marking.
//!
//! Attendance is recorded by a manager per employee and business date,
//! independently of punches.  The functions here never mutate their
//! input: a bulk submission returns a fresh collection along with how
//! many marks were created or updated.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::metrics::evaluate;
use crate::models::{
    AttendanceMark, AttendanceRecord, AttendanceStatus, AttendanceSummary, DateRange,
    MarkOutcome, ShiftRecord, ShiftStatus,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

/// Apply `marks` for `business_date` on top of `existing`.
///
/// A mark replaces the status and notes of an existing record for the
/// same employee and date, otherwise it creates one.
pub fn mark_attendance(
    existing: &[AttendanceRecord],
    business_date: NaiveDate,
    marks: &[AttendanceMark],
) -> Result<(Vec<AttendanceRecord>, MarkOutcome)> {
    for (idx, mark) in marks.iter().enumerate() {
        if mark.employee_id.trim().is_empty() {
            return Err(EngineError::record(
                &format!("attendance mark {idx}"),
                "employee_id",
                "must not be empty",
            ));
        }
    }

    let mut records = existing.to_vec();
    let mut outcome = MarkOutcome::default();
    for mark in marks {
        let found = records
            .iter_mut()
            .find(|r| r.employee_id == mark.employee_id && r.business_date == business_date);
        match found {
            Some(record) => {
                record.status = mark.status;
                record.notes = mark.notes.clone();
                outcome.updated += 1;
            }
            None => {
                records.push(AttendanceRecord {
                    employee_id: mark.employee_id.clone(),
                    business_date,
                    status: mark.status,
                    notes: mark.notes.clone(),
                });
                outcome.created += 1;
            }
        }
    }
    info!(
        %business_date,
        created = outcome.created,
        updated = outcome.updated,
        "attendance marked"
    );
    Ok((records, outcome))
}

/// Counts per status for marks dated inside `range`.
pub fn summarize_attendance(records: &[AttendanceRecord], range: DateRange) -> AttendanceSummary {
    records
        .iter()
        .filter(|r| range.contains(r.business_date))
        .fold(AttendanceSummary::default(), |mut acc, r| {
            acc.total += 1;
            match r.status {
                AttendanceStatus::Present => acc.present += 1,
                AttendanceStatus::Absent => acc.absent += 1,
                AttendanceStatus::Late => acc.late += 1,
            }
            acc
        })
}

/// Default marks for `business_date` derived from the shifts worked
/// that day, one per employee in id order.
///
/// An employee whose every shift was missed is `Absent`; one with any
/// late shift is `Late`; everyone else is `Present`.
pub fn suggest_attendance(
    records: &[ShiftRecord],
    business_date: NaiveDate,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Vec<AttendanceMark>> {
    let day = DateRange::new(business_date, business_date);
    let metrics = evaluate(records, day, config, as_of)?;

    let mut by_employee: BTreeMap<&str, Vec<ShiftStatus>> = BTreeMap::new();
    for m in &metrics {
        by_employee.entry(m.employee_id()).or_default().push(m.status);
    }

    Ok(by_employee
        .into_iter()
        .map(|(employee_id, statuses)| {
            let status = if statuses.iter().all(|s| *s == ShiftStatus::Missed) {
                AttendanceStatus::Absent
            } else if statuses.contains(&ShiftStatus::Late) {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            };
            AttendanceMark {
                employee_id: employee_id.to_string(),
                status,
                notes: None,
            }
        })
        .collect())
}
