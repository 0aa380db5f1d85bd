//! Dashboard computation.
//!
//! The `engine` module turns a [`DashboardInput`] into a
//! [`DashboardReport`].  The input is validated and evaluated once; the
//! summary, trend, per-employee statistics and alerts are all derived
//! from that single evaluation, so the figures are always consistent
//! with each other.  Either the whole report is produced or an error is
//! returned; there is no partial result.

use crate::aggregate::{directory, employee_stats_from_metrics, summary_from, DailyTrend};
use crate::config::EngineConfig;
use crate::detector::alerts_from_metrics;
use crate::error::Result;
use crate::metrics::evaluate;
use crate::models::{DashboardInput, DashboardReport};
use tracing::info;

/// Compute every dashboard figure for `input.range` as of
/// `input.as_of`.
pub fn run_dashboard(input: &DashboardInput, config: &EngineConfig) -> Result<DashboardReport> {
    let metrics = evaluate(&input.shifts, input.range, config, input.as_of)?;
    let directory = directory(&input.employees);

    let employee_stats = employee_stats_from_metrics(&metrics, &directory);
    let summary = summary_from(&metrics, &employee_stats);
    let daily_trend: Vec<_> = DailyTrend::from_metrics(&metrics, input.range).collect();
    let alerts = alerts_from_metrics(&metrics, &directory, config, input.as_of);

    info!(
        start = %input.range.start,
        end = %input.range.end,
        shifts = summary.total_shifts,
        employees = summary.total_employees,
        alerts = alerts.len(),
        "dashboard computed"
    );

    Ok(DashboardReport {
        range: input.range,
        as_of: input.as_of,
        summary,
        daily_trend,
        employee_stats,
        alerts,
    })
}
