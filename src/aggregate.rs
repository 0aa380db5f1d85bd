//! Aggregation of shift metrics into dashboard figures.
//!
//! All functions here are pure: they take the raw records plus a range
//! and return fresh values.  The `*_from_metrics` variants exist so
//! [`crate::engine`] can evaluate a batch once and feed every aggregate
//! from the same evaluation.
//!
//! Per-employee statistics are computed in parallel with [`rayon`].
//! Groups are collected in `employee_id` order first and each group is
//! summed sequentially, so the output is identical to a sequential run.

use crate::compliance::average_score;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::metrics::{evaluate, ShiftMetrics};
use crate::models::{
    BreakAverage, DailyTrendPoint, DateRange, Employee, EmployeeStats, ShiftRecord, ShiftStatus,
    Summary,
};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn percentage(part: usize, whole: usize) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    Some(((part as f64 / whole as f64) * 100.0).round() as u8)
}

/// Lookup from employee id to reference data.
pub(crate) fn directory(employees: &[Employee]) -> HashMap<&str, &Employee> {
    employees.iter().map(|e| (e.id.as_str(), e)).collect()
}

pub(crate) fn display_name(directory: &HashMap<&str, &Employee>, employee_id: &str) -> String {
    directory
        .get(employee_id)
        .map(|e| e.full_name())
        .unwrap_or_else(|| employee_id.to_string())
}

fn group_by_employee<'m, 'a>(
    metrics: &'m [ShiftMetrics<'a>],
) -> Vec<(&'a str, Vec<&'m ShiftMetrics<'a>>)> {
    let mut groups: BTreeMap<&'a str, Vec<&'m ShiftMetrics<'a>>> = BTreeMap::new();
    for m in metrics {
        groups.entry(m.employee_id()).or_default().push(m);
    }
    groups.into_iter().collect()
}

// --- Summary ---

/// Headline KPIs for `range`.
pub fn summarize(
    records: &[ShiftRecord],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Summary> {
    let metrics = evaluate(records, range, config, as_of)?;
    let stats = employee_stats_from_metrics(&metrics, &HashMap::new());
    Ok(summary_from(&metrics, &stats))
}

/// Build the summary from an evaluation and the per-employee statistics
/// derived from it.  Hour totals are the sums of the per-employee
/// totals, so both views always agree.
pub fn summary_from(metrics: &[ShiftMetrics<'_>], stats: &[EmployeeStats]) -> Summary {
    let total = |f: fn(&EmployeeStats) -> f64| round_to(stats.iter().map(f).sum(), 1);
    let count = |status: ShiftStatus| metrics.iter().filter(|m| m.status == status).count();

    let total_actual_hours = total(|s| s.total_actual);
    let total_scheduled_hours = total(|s| s.total_scheduled);
    let schedule_adherence = if total_scheduled_hours > 0.0 {
        Some((total_actual_hours / total_scheduled_hours * 100.0).round() as u32)
    } else {
        None
    };

    Summary {
        total_employees: stats.len(),
        total_shifts: metrics.len(),
        total_actual_hours,
        total_scheduled_hours,
        total_break_hours: total(|s| s.total_break),
        total_scheduled_break_hours: total(|s| s.total_scheduled_break),
        total_overtime_hours: total(|s| s.total_overtime),
        variance: round_to(total_actual_hours - total_scheduled_hours, 1),
        missed_count: count(ShiftStatus::Missed),
        late_count: count(ShiftStatus::Late),
        early_out_count: count(ShiftStatus::EarlyOut),
        no_clock_out_count: count(ShiftStatus::NoClockOut),
        unscheduled_count: count(ShiftStatus::Unscheduled),
        schedule_adherence,
    }
}

// --- Daily trend ---

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DayTotals {
    scheduled: f64,
    actual: f64,
    breaks: f64,
    overtime: f64,
}

/// One [`DailyTrendPoint`] per calendar date of a range, ascending,
/// zero-filled for dates without shifts.
///
/// Points are produced on demand.  Clone the iterator to walk the same
/// series again.
#[derive(Debug, Clone)]
pub struct DailyTrend {
    totals: BTreeMap<NaiveDate, DayTotals>,
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DailyTrend {
    pub fn from_metrics<'m, 'a: 'm, I>(metrics: I, range: DateRange) -> Self
    where
        I: IntoIterator<Item = &'m ShiftMetrics<'a>>,
    {
        let mut totals: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
        for m in metrics {
            if !range.contains(m.business_date()) {
                continue;
            }
            let day = totals.entry(m.business_date()).or_default();
            day.scheduled += m.scheduled_hours;
            day.actual += m.actual_hours;
            day.breaks += m.break_hours;
            day.overtime += m.overtime_hours;
        }
        Self {
            totals,
            next: (!range.is_empty()).then_some(range.start),
            end: range.end,
        }
    }
}

impl Iterator for DailyTrend {
    type Item = DailyTrendPoint;

    fn next(&mut self) -> Option<DailyTrendPoint> {
        let date = self.next.filter(|d| *d <= self.end)?;
        self.next = date.succ_opt();
        let day = self.totals.get(&date).copied().unwrap_or_default();
        Some(DailyTrendPoint {
            date,
            scheduled_hours: round_to(day.scheduled, 1),
            actual_hours: round_to(day.actual, 1),
            break_hours: round_to(day.breaks, 1),
            overtime_hours: round_to(day.overtime, 1),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(d) if d <= self.end => (self.end - d).num_days() as usize + 1,
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DailyTrend {}

/// Daily hours across all employees.
pub fn daily_trend(
    records: &[ShiftRecord],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<DailyTrend> {
    let metrics = evaluate(records, range, config, as_of)?;
    Ok(DailyTrend::from_metrics(&metrics, range))
}

/// Daily hours for a single employee.
pub fn employee_trend(
    records: &[ShiftRecord],
    employee_id: &str,
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<DailyTrend> {
    let metrics = evaluate(records, range, config, as_of)?;
    Ok(DailyTrend::from_metrics(
        metrics.iter().filter(|m| m.employee_id() == employee_id),
        range,
    ))
}

// --- Per-employee statistics ---

/// Statistics for each employee with at least one classified shift in
/// `range`, ordered by `employee_id`.
pub fn employee_stats(
    records: &[ShiftRecord],
    employees: &[Employee],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Vec<EmployeeStats>> {
    let metrics = evaluate(records, range, config, as_of)?;
    Ok(employee_stats_from_metrics(&metrics, &directory(employees)))
}

pub fn employee_stats_from_metrics(
    metrics: &[ShiftMetrics<'_>],
    directory: &HashMap<&str, &Employee>,
) -> Vec<EmployeeStats> {
    group_by_employee(metrics)
        .into_par_iter()
        .map(|(employee_id, shifts)| stats_for(employee_id, &shifts, directory))
        .collect()
}

fn stats_for(
    employee_id: &str,
    shifts: &[&ShiftMetrics<'_>],
    directory: &HashMap<&str, &Employee>,
) -> EmployeeStats {
    let sum = |f: fn(&ShiftMetrics<'_>) -> f64| shifts.iter().map(|m| f(m)).sum::<f64>();
    let count = |status: ShiftStatus| shifts.iter().filter(|m| m.status == status).count();

    let worked: Vec<&&ShiftMetrics<'_>> = shifts.iter().filter(|m| m.worked()).collect();
    let (avg_break, avg_shift_length) = if worked.is_empty() {
        (None, None)
    } else {
        let n = worked.len() as f64;
        let breaks: f64 = worked.iter().map(|m| m.break_hours).sum();
        let hours: f64 = worked.iter().map(|m| m.actual_hours).sum();
        (Some(round_to(breaks / n, 2)), Some(round_to(hours / n, 1)))
    };

    let missed_count = count(ShiftStatus::Missed);
    EmployeeStats {
        employee_id: employee_id.to_string(),
        display_name: display_name(directory, employee_id),
        shift_count: shifts.len(),
        total_scheduled: round_to(sum(|m| m.scheduled_hours), 1),
        total_actual: round_to(sum(|m| m.actual_hours), 1),
        total_break: round_to(sum(|m| m.break_hours), 1),
        total_scheduled_break: round_to(sum(|m| m.scheduled_break_hours), 1),
        total_overtime: round_to(sum(|m| m.overtime_hours), 1),
        late_count: count(ShiftStatus::Late),
        missed_count,
        early_out_count: count(ShiftStatus::EarlyOut),
        avg_compliance: average_score(shifts.iter().map(|m| m.compliance)),
        attendance: percentage(shifts.len() - missed_count, shifts.len()),
        avg_break,
        avg_shift_length,
    }
}

/// Mean compliance for one employee in `range`.  `None` means there
/// were no shifts to score, which is not the same as scoring 0.
pub fn employee_compliance(
    records: &[ShiftRecord],
    employee_id: &str,
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Option<u8>> {
    let metrics = evaluate(records, range, config, as_of)?;
    Ok(average_score(
        metrics
            .iter()
            .filter(|m| m.employee_id() == employee_id)
            .map(|m| m.compliance),
    ))
}

// --- Break analytics ---

fn took_break(m: &ShiftMetrics<'_>) -> bool {
    m.worked() && m.break_hours > 0.0
}

/// Average break per employee over shifts where a break was taken,
/// longest average first.
pub fn break_averages(
    records: &[ShiftRecord],
    employees: &[Employee],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Vec<BreakAverage>> {
    let metrics = evaluate(records, range, config, as_of)?;
    let directory = directory(employees);
    let mut averages: Vec<BreakAverage> = group_by_employee(&metrics)
        .into_iter()
        .filter_map(|(employee_id, shifts)| {
            let taken: Vec<f64> = shifts
                .iter()
                .filter(|m| took_break(m))
                .map(|m| m.break_hours)
                .collect();
            if taken.is_empty() {
                return None;
            }
            let avg = taken.iter().sum::<f64>() / taken.len() as f64;
            Some(BreakAverage {
                employee_id: employee_id.to_string(),
                display_name: display_name(&directory, employee_id),
                breaks_taken: taken.len(),
                avg_break_hours: round_to(avg, 2),
                avg_break_minutes: (avg * 60.0).round(),
            })
        })
        .collect();
    averages.sort_by(|a, b| {
        b.avg_break_hours
            .total_cmp(&a.avg_break_hours)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });
    Ok(averages)
}

/// Average break in whole minutes across every shift where a break was
/// taken, or `None` if nobody took one.
pub fn average_break_minutes(
    records: &[ShiftRecord],
    range: DateRange,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<Option<f64>> {
    let metrics = evaluate(records, range, config, as_of)?;
    let taken: Vec<f64> = metrics
        .iter()
        .filter(|m| took_break(m))
        .map(|m| m.break_hours)
        .collect();
    if taken.is_empty() {
        return Ok(None);
    }
    Ok(Some((taken.iter().sum::<f64>() / taken.len() as f64 * 60.0).round()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreakSession, ClockSession};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn shift(id: &str, employee: &str, day: u32, worked: Option<(u32, u32)>, break_min: i64) -> ShiftRecord {
        let d = date(day);
        let clock_sessions = worked
            .map(|(from, to)| {
                vec![ClockSession {
                    clock_in: d.and_hms_opt(from, 0, 0).unwrap(),
                    clock_out: d.and_hms_opt(to, 0, 0),
                }]
            })
            .unwrap_or_default();
        let break_sessions = if break_min > 0 {
            let start = d.and_hms_opt(10, 0, 0).unwrap();
            vec![BreakSession {
                start,
                end: start + chrono::Duration::minutes(break_min),
                duration_hours: break_min as f64 / 60.0,
            }]
        } else {
            Vec::new()
        };
        ShiftRecord {
            id: id.into(),
            employee_id: employee.into(),
            business_date: d,
            scheduled_start: d.and_hms_opt(6, 0, 0),
            scheduled_end: d.and_hms_opt(14, 0, 0),
            scheduled_hours: None,
            actual_hours: None,
            clock_sessions,
            break_sessions,
            scheduled_break_hours: None,
        }
    }

    fn sample() -> Vec<ShiftRecord> {
        vec![
            shift("a1", "e1", 2, Some((6, 14)), 30),
            shift("a2", "e1", 3, Some((6, 16)), 0),
            shift("a3", "e1", 4, None, 0),
            shift("b1", "e2", 2, Some((6, 14)), 45),
            shift("b2", "e2", 9, Some((6, 14)), 30),
        ]
    }

    fn range() -> DateRange {
        DateRange::new(date(1), date(5))
    }

    #[test]
    fn test_summary_counts_and_totals() {
        let summary = summarize(&sample(), range(), &EngineConfig::default(), date(10)).unwrap();
        assert_eq!(summary.total_employees, 2);
        assert_eq!(summary.total_shifts, 4);
        assert_eq!(summary.total_scheduled_hours, 32.0);
        // 7.5 + 10 + 0 + 7.25
        assert_eq!(summary.total_actual_hours, 24.8);
        assert_eq!(summary.variance, -7.2);
        assert_eq!(summary.missed_count, 1);
        assert_eq!(summary.total_overtime_hours, 2.0);
        assert_eq!(summary.schedule_adherence, Some(78));
    }

    #[test]
    fn test_out_of_range_records_contribute_nothing() {
        let config = EngineConfig::default();
        let base = summarize(&sample(), range(), &config, date(10)).unwrap();
        let mut more = sample();
        more.push(shift("x", "e3", 20, Some((6, 20)), 0));
        let with_extra = summarize(&more, range(), &config, date(10)).unwrap();
        assert_eq!(base, with_extra);
    }

    #[test]
    fn test_empty_input_is_zeroed() {
        let summary = summarize(&[], range(), &EngineConfig::default(), date(10)).unwrap();
        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.total_actual_hours, 0.0);
        assert_eq!(summary.schedule_adherence, None);
    }

    #[test]
    fn test_daily_trend_zero_fills() {
        let trend = daily_trend(&sample(), range(), &EngineConfig::default(), date(10)).unwrap();
        assert_eq!(trend.len(), 5);
        let points: Vec<DailyTrendPoint> = trend.clone().collect();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, date(1));
        assert_eq!(points[0].actual_hours, 0.0);
        assert_eq!(points[1].date, date(2));
        assert_eq!(points[1].scheduled_hours, 16.0);
        assert_eq!(points[1].actual_hours, 14.8);
        assert_eq!(points[2].overtime_hours, 2.0);
        assert_eq!(points[4].date, date(5));
        // Walking a clone again yields the same series.
        assert_eq!(trend.collect::<Vec<_>>(), points);
    }

    #[test]
    fn test_daily_trend_inverted_range_is_empty() {
        let inverted = DateRange::new(date(5), date(1));
        let trend = daily_trend(&sample(), inverted, &EngineConfig::default(), date(10)).unwrap();
        assert_eq!(trend.count(), 0);
    }

    #[test]
    fn test_employee_trend() {
        let trend: Vec<_> = employee_trend(&sample(), "e2", range(), &EngineConfig::default(), date(10))
            .unwrap()
            .collect();
        assert_eq!(trend.len(), 5);
        assert_eq!(trend[1].actual_hours, 7.3);
        assert_eq!(trend[2].actual_hours, 0.0);
    }

    #[test]
    fn test_employee_stats() {
        let employees = vec![Employee {
            id: "e1".into(),
            first_name: "Scarlett".into(),
            last_name: "Acuna".into(),
            role: None,
        }];
        let stats = employee_stats(&sample(), &employees, range(), &EngineConfig::default(), date(10)).unwrap();
        assert_eq!(stats.len(), 2);
        let e1 = &stats[0];
        assert_eq!(e1.display_name, "Scarlett Acuna");
        assert_eq!(e1.shift_count, 3);
        assert_eq!(e1.total_actual, 17.5);
        assert_eq!(e1.total_overtime, 2.0);
        assert_eq!(e1.missed_count, 1);
        assert_eq!(e1.attendance, Some(67));
        assert_eq!(e1.avg_break, Some(0.25));
        assert_eq!(e1.avg_shift_length, Some(8.8));
        assert_eq!(stats[1].display_name, "e2");
        assert_eq!(stats[1].shift_count, 1);
    }

    #[test]
    fn test_summary_matches_employee_totals() {
        let config = EngineConfig::default();
        let summary = summarize(&sample(), range(), &config, date(10)).unwrap();
        let stats = employee_stats(&sample(), &[], range(), &config, date(10)).unwrap();
        let actual: f64 = stats.iter().map(|s| s.total_actual).sum();
        assert!((summary.total_actual_hours - actual).abs() < 1e-9);
    }

    #[test]
    fn test_employee_compliance_no_data() {
        let config = EngineConfig::default();
        let none = employee_compliance(&sample(), "nobody", range(), &config, date(10)).unwrap();
        assert_eq!(none, None);
        assert_ne!(none, Some(0));
        let e1 = employee_compliance(&sample(), "e1", range(), &config, date(10)).unwrap();
        assert!(e1.is_some());
    }

    #[test]
    fn test_break_averages() {
        let config = EngineConfig::default();
        let averages = break_averages(&sample(), &[], range(), &config, date(10)).unwrap();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].employee_id, "e2");
        assert_eq!(averages[0].avg_break_minutes, 45.0);
        assert_eq!(averages[1].avg_break_minutes, 30.0);
        let overall = average_break_minutes(&sample(), range(), &config, date(10)).unwrap();
        assert_eq!(overall, Some(38.0));
        let none = average_break_minutes(&[], range(), &config, date(10)).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_idempotent() {
        let config = EngineConfig::default();
        let a = employee_stats(&sample(), &[], range(), &config, date(10)).unwrap();
        let b = employee_stats(&sample(), &[], range(), &config, date(10)).unwrap();
        assert_eq!(a, b);
    }
}
