//! Reproducible sample data.
//!
//! Generates a restaurant's worth of shifts from a seed: morning and
//! evening shifts with occasional late arrivals, early departures,
//! overtime, skipped breaks, split sessions, forgotten clock-outs and
//! missed shifts.  The same seed always yields the same records, so the
//! data is safe to use in tests and demos.

use crate::models::{BreakSession, ClockSession, Employee, ShiftRecord};
use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STAFF: [(&str, &str, &str, &str); 12] = [
    ("e1", "Scarlett", "Acuna", "Line Cook"),
    ("e2", "Marcus", "Chen", "Server"),
    ("e3", "Priya", "Patel", "Sous Chef"),
    ("e4", "David", "Okafor", "Bartender"),
    ("e5", "Emma", "Rodriguez", "Host"),
    ("e6", "James", "Wilson", "Line Cook"),
    ("e7", "Sofia", "Martinez", "Server"),
    ("e8", "Liam", "Novak", "Dishwasher"),
    ("e9", "Aria", "Kim", "Pastry Chef"),
    ("e10", "Noah", "Thompson", "Manager"),
    ("e11", "Zara", "Hughes", "Server"),
    ("e12", "Carlos", "Rivera", "Prep Cook"),
];

/// Start hour and length of the two shift templates.
const TEMPLATES: [(u32, i64); 2] = [(6, 8), (14, 8)];

pub fn sample_employees() -> Vec<Employee> {
    STAFF
        .iter()
        .map(|(id, first, last, role)| Employee {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            role: Some(role.to_string()),
        })
        .collect()
}

/// Shifts for every employee over the `days` days ending on
/// `end_date`, oldest first.
pub fn generate_shifts(seed: u64, employees: &[Employee], end_date: NaiveDate, days: u64) -> Vec<ShiftRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dates: Vec<NaiveDate> = (0..days)
        .rev()
        .filter_map(|back| end_date.checked_sub_days(Days::new(back)))
        .collect();

    let mut shifts = Vec::new();
    for employee in employees {
        for &date in &dates {
            let id = format!("s{}", shifts.len());
            if let Some(shift) = generate_one(&mut rng, id, &employee.id, date) {
                shifts.push(shift);
            }
        }
    }
    shifts
}

fn generate_one(rng: &mut StdRng, id: String, employee_id: &str, date: NaiveDate) -> Option<ShiftRecord> {
    let (start_hour, length) = TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
    let start = date.and_hms_opt(start_hour, 0, 0)?;
    let end = start + Duration::hours(length);

    let mut shift = ShiftRecord {
        id,
        employee_id: employee_id.to_string(),
        business_date: date,
        scheduled_start: Some(start),
        scheduled_end: Some(end),
        scheduled_hours: None,
        actual_hours: None,
        clock_sessions: Vec::new(),
        break_sessions: Vec::new(),
        scheduled_break_hours: None,
    };

    // Roughly one day in five is off; some of those were scheduled.
    if rng.gen_bool(0.2) {
        return rng.gen_bool(0.3).then_some(shift);
    }

    let late = if rng.gen_bool(0.15) { rng.gen_range(5..35) } else { 0 };
    let early = if rng.gen_bool(0.1) { rng.gen_range(10..55) } else { 0 };
    let overtime = if rng.gen_bool(0.2) { rng.gen_range(15..105) } else { 0 };
    let clock_in = start + Duration::minutes(late);
    let clock_out = end - Duration::minutes(early) + Duration::minutes(overtime);

    if rng.gen_bool(0.85) {
        let minutes = rng.gen_range(15..60);
        let break_start = start + Duration::hours(4);
        shift.break_sessions.push(BreakSession {
            start: break_start,
            end: break_start + Duration::minutes(minutes),
            duration_hours: minutes as f64 / 60.0,
        });
    }

    let mut sessions = if rng.gen_bool(0.08) {
        vec![
            session(clock_in, Some(start + Duration::hours(4))),
            session(start + Duration::hours(5), Some(clock_out)),
        ]
    } else {
        vec![session(clock_in, Some(clock_out))]
    };
    if rng.gen_bool(0.03) {
        if let Some(last) = sessions.last_mut() {
            last.clock_out = None;
        }
    }
    shift.clock_sessions = sessions;

    if rng.gen_bool(0.05) {
        shift.scheduled_start = None;
        shift.scheduled_end = None;
    }
    Some(shift)
}

fn session(clock_in: NaiveDateTime, clock_out: Option<NaiveDateTime>) -> ClockSession {
    ClockSession { clock_in, clock_out }
}
