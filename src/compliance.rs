//! Compliance scoring.
//!
//! A compliance score is a 0–100 measure of how closely a shift
//! followed its schedule.  Scoring sits behind the [`ComplianceScorer`]
//! trait so a site can plug in its own formula; the engine ships
//! [`WeightedScorer`], which penalises hour deviation, late minutes and
//! early-out minutes with configurable weights.
//!
//! Compliance is a different metric from attendance (present/absent
//! ratio) and from schedule adherence (actual/scheduled hours).  The
//! three are never merged.

use crate::config::{ComplianceWeights, EngineConfig};
use crate::models::{ShiftRecord, ShiftStatus};
use crate::status;

/// The timing facts a scorer works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftDeviation {
    pub scheduled_hours: f64,
    pub actual_hours: f64,
    pub late_minutes: f64,
    pub early_out_minutes: f64,
}

impl ShiftDeviation {
    pub fn of(record: &ShiftRecord) -> Self {
        Self {
            scheduled_hours: record.scheduled_hours(),
            actual_hours: record.actual_hours(),
            late_minutes: status::late_minutes(record),
            early_out_minutes: status::early_out_minutes(record),
        }
    }
}

/// Scores a single classified shift.
///
/// Scorers must be thread-safe (`Send + Sync`) because per-employee
/// statistics are computed in parallel.
pub trait ComplianceScorer: Send + Sync {
    /// Short identifier, used in logs.
    fn name(&self) -> &str;
    /// Returns a score in `0.0..=100.0`.
    fn score(&self, status: ShiftStatus, deviation: &ShiftDeviation) -> f64;
}

/// `100 − |actual − scheduled|·hours − late·late_min − early·early_min`,
/// clamped to `0..=100`.  A missed shift always scores 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedScorer {
    pub weights: ComplianceWeights,
}

impl WeightedScorer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            weights: config.compliance_weights(),
        }
    }
}

impl ComplianceScorer for WeightedScorer {
    fn name(&self) -> &str {
        "weighted"
    }

    fn score(&self, status: ShiftStatus, deviation: &ShiftDeviation) -> f64 {
        if status == ShiftStatus::Missed {
            return 0.0;
        }
        let w = &self.weights;
        let raw = 100.0
            - (deviation.actual_hours - deviation.scheduled_hours).abs() * w.hours
            - deviation.late_minutes * w.late
            - deviation.early_out_minutes * w.early;
        raw.clamp(0.0, 100.0)
    }
}

/// Mean of per-shift scores rounded to a whole number, or `None` when
/// there are no scores to average.
pub fn average_score<I>(scores: I) -> Option<u8>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));
    if count == 0 {
        return None;
    }
    Some((sum / count as f64).round().clamp(0.0, 100.0) as u8)
}
