//! Policy violation detection.
//!
//! Each rule looks at one evaluated shift on its own, so a shift can
//! raise any number of alerts.  The combined list is ranked by severity
//! (high first) and then by business date (most recent first), and only
//! then truncated to the configured cap.

use crate::aggregate::{directory, display_name};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::metrics::{evaluate, ShiftMetrics};
use crate::models::{Alert, AlertKind, DateRange, Employee, ShiftRecord, ShiftStatus};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Scan `records` for violations and return the ranked, capped alerts.
///
/// The caller is expected to pass only the shifts it cares about; no
/// date filtering happens here.
pub fn detect_alerts(
    records: &[ShiftRecord],
    employees: &[Employee],
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Vec<Alert>> {
    let everything = DateRange::new(NaiveDate::MIN, NaiveDate::MAX);
    let metrics = evaluate(records, everything, config, as_of)?;
    Ok(alerts_from_metrics(&metrics, &directory(employees), config, as_of))
}

pub fn alerts_from_metrics(
    metrics: &[ShiftMetrics<'_>],
    directory: &HashMap<&str, &Employee>,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Vec<Alert> {
    let alerts: Vec<Alert> = metrics
        .iter()
        .flat_map(|m| {
            let name = display_name(directory, m.employee_id());
            alerts_for_shift(m, &name, config, as_of)
        })
        .collect();
    let generated = alerts.len();
    let ranked = rank_alerts(alerts, config.alert_cap());
    debug!(generated, kept = ranked.len(), "detected alerts");
    ranked
}

/// Every alert one shift raises, in rule order.
pub fn alerts_for_shift(
    m: &ShiftMetrics<'_>,
    name: &str,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Vec<Alert> {
    let date = m.business_date();
    let mut found: Vec<(AlertKind, String)> = Vec::new();

    match m.status {
        ShiftStatus::Late => found.push((
            AlertKind::LateClockIn,
            format!("{name} clocked in {:.0} min late on {date}", m.late_minutes),
        )),
        ShiftStatus::EarlyOut => found.push((
            AlertKind::EarlyClockOut,
            format!("{name} clocked out {:.0} min early on {date}", m.early_out_minutes),
        )),
        ShiftStatus::Missed => found.push((
            AlertKind::MissedShift,
            format!(
                "{name} missed their scheduled {:.1}h shift on {date}",
                m.scheduled_hours
            ),
        )),
        ShiftStatus::OnTime | ShiftStatus::Unscheduled | ShiftStatus::NoClockOut => {}
    }

    if m.record.has_open_session() && date < as_of {
        found.push((
            AlertKind::MissingClockOut,
            format!("{name} has no clock-out recorded for {date}"),
        ));
    }

    if m.break_hours > config.policy_max_break_hours() {
        found.push((
            AlertKind::ExcessiveBreak,
            format!(
                "{name} took {:.0}min break (exceeds {:.0}min policy)",
                m.break_hours * 60.0,
                config.policy_max_break_hours() * 60.0
            ),
        ));
    } else if m.break_hours > 0.0 && m.break_hours < config.policy_min_break_hours() {
        found.push((
            AlertKind::ShortBreak,
            format!("{name} took only {:.0}min break on {date}", m.break_hours * 60.0),
        ));
    }

    if m.actual_hours > 0.0
        && m.break_hours == 0.0
        && m.scheduled_hours >= config.no_break_min_scheduled_hours()
    {
        found.push((
            AlertKind::NoBreakTaken,
            format!("{name} worked {:.1}h without a break", m.actual_hours),
        ));
    }

    if m.scheduled_hours == 0.0 && m.actual_hours > 0.0 {
        found.push((
            AlertKind::UnscheduledShift,
            format!(
                "{name} worked {:.1}h on {date} without a scheduled shift",
                m.actual_hours
            ),
        ));
    }

    if m.overtime_hours > config.overtime_alert_threshold_hours() {
        found.push((
            AlertKind::ExcessiveOvertime,
            format!("{name} worked {:.1}h overtime on {date}", m.overtime_hours),
        ));
    }

    if m.record.is_split() {
        found.push((
            AlertKind::SplitShift,
            format!(
                "{name} clocked {} separate sessions on {date}",
                m.record.clock_sessions.len()
            ),
        ));
    }

    found
        .into_iter()
        .map(|(kind, message)| Alert {
            id: format!("{}-{}", kind.slug(), m.record.id),
            employee_id: m.employee_id().to_string(),
            business_date: date,
            kind,
            severity: kind.severity(),
            message,
            suggestion: kind.suggestion().to_string(),
        })
        .collect()
}

/// Sort by severity descending, then business date descending, then
/// keep the first `cap`.  The sort is stable, so equal alerts keep
/// their generation order.
pub fn rank_alerts(mut alerts: Vec<Alert>, cap: usize) -> Vec<Alert> {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.business_date.cmp(&a.business_date))
    });
    alerts.truncate(cap);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::models::{BreakSession, ClockSession, Severity};
    use chrono::NaiveDateTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn shift(id: &str, day: u32) -> ShiftRecord {
        ShiftRecord {
            id: id.into(),
            employee_id: "e1".into(),
            business_date: date(day),
            scheduled_start: Some(at(day, 6, 0)),
            scheduled_end: Some(at(day, 14, 0)),
            scheduled_hours: None,
            actual_hours: None,
            clock_sessions: vec![ClockSession {
                clock_in: at(day, 6, 0),
                clock_out: Some(at(day, 14, 30)),
            }],
            break_sessions: vec![BreakSession {
                start: at(day, 10, 0),
                end: at(day, 10, 30),
                duration_hours: 0.5,
            }],
            scheduled_break_hours: None,
        }
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    fn alert(id: &str, severity: Severity, day: u32) -> Alert {
        Alert {
            id: id.into(),
            employee_id: "e1".into(),
            business_date: date(day),
            kind: AlertKind::SplitShift,
            severity,
            message: String::new(),
            suggestion: String::new(),
        }
    }

    #[test]
    fn test_clean_shift_raises_nothing() {
        let alerts = detect_alerts(&[shift("s1", 3)], &[], &EngineConfig::default(), date(10)).unwrap();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_late_and_missed() {
        let mut late = shift("s1", 3);
        late.clock_sessions[0].clock_in = at(3, 6, 20);
        let mut missed = shift("s2", 4);
        missed.clock_sessions.clear();
        missed.break_sessions.clear();
        let employees = vec![Employee {
            id: "e1".into(),
            first_name: "Marcus".into(),
            last_name: "Chen".into(),
            role: None,
        }];
        let alerts = detect_alerts(&[late, missed], &employees, &EngineConfig::default(), date(10)).unwrap();
        assert_eq!(kinds(&alerts), vec![AlertKind::MissedShift, AlertKind::LateClockIn]);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].id, "missed-s2");
        assert_eq!(alerts[1].severity, Severity::Medium);
        assert_eq!(alerts[1].message, "Marcus Chen clocked in 20 min late on 2026-02-03");
    }

    #[test]
    fn test_missing_clock_out_only_after_date_elapsed() {
        let mut open = shift("s1", 3);
        open.clock_sessions[0].clock_out = None;
        open.break_sessions.clear();
        let config = EngineConfig::default();
        let later = detect_alerts(std::slice::from_ref(&open), &[], &config, date(4)).unwrap();
        assert_eq!(kinds(&later), vec![AlertKind::MissingClockOut]);
        let same_day = detect_alerts(&[open], &[], &config, date(3)).unwrap();
        assert!(same_day.is_empty());
    }

    #[test]
    fn test_break_rules() {
        let config = EngineConfig::default();

        let mut long = shift("long", 3);
        long.break_sessions[0].duration_hours = 1.0;
        let mut short = shift("short", 3);
        short.break_sessions[0].duration_hours = 0.1;
        let mut none = shift("none", 3);
        none.break_sessions.clear();

        let alerts = detect_alerts(&[long, short, none], &[], &config, date(10)).unwrap();
        assert_eq!(
            kinds(&alerts),
            vec![AlertKind::NoBreakTaken, AlertKind::ExcessiveBreak, AlertKind::ShortBreak]
        );
    }

    #[test]
    fn test_overtime_unscheduled_and_split() {
        let mut overtime = shift("ot", 3);
        overtime.clock_sessions[0].clock_out = Some(at(3, 16, 0));
        let mut unscheduled = shift("un", 4);
        unscheduled.scheduled_start = None;
        unscheduled.scheduled_end = None;
        let mut split = shift("sp", 5);
        split.clock_sessions = vec![
            ClockSession { clock_in: at(5, 6, 0), clock_out: Some(at(5, 10, 0)) },
            ClockSession { clock_in: at(5, 11, 0), clock_out: Some(at(5, 14, 0)) },
        ];

        let alerts = detect_alerts(&[overtime, unscheduled, split], &[], &EngineConfig::default(), date(10)).unwrap();
        // Unscheduled work is all overtime, too.
        assert_eq!(
            kinds(&alerts),
            vec![
                AlertKind::ExcessiveOvertime,
                AlertKind::ExcessiveOvertime,
                AlertKind::SplitShift,
                AlertKind::UnscheduledShift,
            ]
        );
        assert_eq!(alerts[0].business_date, date(4));
    }

    #[test]
    fn test_rank_orders_by_severity_then_date() {
        let alerts = vec![
            alert("a", Severity::Low, 9),
            alert("b", Severity::High, 2),
            alert("c", Severity::Medium, 5),
            alert("d", Severity::High, 7),
        ];
        let ranked = rank_alerts(alerts, 50);
        let ids: Vec<&str> = ranked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_cap_applies_after_sorting() {
        let mut alerts: Vec<Alert> = (1..=20).map(|d| alert(&format!("low{d}"), Severity::Low, d)).collect();
        alerts.push(alert("high", Severity::High, 1));
        let ranked = rank_alerts(alerts, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].id, "high");
        assert_eq!(ranked[1].id, "low20");
    }

    #[test]
    fn test_configured_cap() {
        let config = EngineConfig::new(EngineSettings {
            alert_cap: 1,
            ..EngineSettings::default()
        })
        .unwrap();
        let mut missed = shift("m", 3);
        missed.clock_sessions.clear();
        missed.break_sessions.clear();
        let mut late = shift("l", 4);
        late.clock_sessions[0].clock_in = at(4, 7, 0);
        let alerts = detect_alerts(&[late, missed], &[], &config, date(10)).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MissedShift);
    }
}
