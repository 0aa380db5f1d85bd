//! Engine configuration.
//!
//! [`EngineSettings`] is the plain, serialisable shape with the
//! documented defaults.  [`EngineConfig`] is the validated form every
//! engine function takes; it can only be obtained through
//! [`EngineConfig::new`] (or deserialisation, which goes through the
//! same checks), so a bad tolerance or cap is rejected once, up front,
//! instead of part-way through a batch.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Weights applied by the compliance formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceWeights {
    /// Points lost per hour of deviation from the schedule.
    pub hours: f64,
    /// Points lost per minute of late arrival.
    pub late: f64,
    /// Points lost per minute of early departure.
    pub early: f64,
}

impl Default for ComplianceWeights {
    fn default() -> Self {
        Self {
            hours: 8.0,
            late: 0.5,
            early: 0.3,
        }
    }
}

/// Break allotted to shifts of at least `min_shift_hours` scheduled
/// hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakAllotment {
    pub min_shift_hours: f64,
    pub break_hours: f64,
}

/// Raw configuration values.  Every field has a default, so a partial
/// JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub late_tolerance_minutes: i64,
    pub early_tolerance_minutes: i64,
    pub policy_max_break_hours: f64,
    pub policy_min_break_hours: f64,
    pub no_break_min_scheduled_hours: f64,
    pub overtime_alert_threshold_hours: f64,
    pub compliance_weights: ComplianceWeights,
    pub alert_cap: usize,
    pub break_allotments: Vec<BreakAllotment>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            late_tolerance_minutes: 10,
            early_tolerance_minutes: 15,
            policy_max_break_hours: 0.75,
            policy_min_break_hours: 0.15,
            no_break_min_scheduled_hours: 6.0,
            overtime_alert_threshold_hours: 1.0,
            compliance_weights: ComplianceWeights::default(),
            alert_cap: 50,
            break_allotments: vec![BreakAllotment {
                min_shift_hours: 6.0,
                break_hours: 0.5,
            }],
        }
    }
}

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EngineSettings", into = "EngineSettings")]
pub struct EngineConfig {
    settings: EngineSettings,
}

impl EngineConfig {
    pub fn new(mut settings: EngineSettings) -> Result<Self> {
        if settings.late_tolerance_minutes < 0 {
            return Err(EngineError::config("late_tolerance_minutes", "must not be negative"));
        }
        if settings.early_tolerance_minutes < 0 {
            return Err(EngineError::config("early_tolerance_minutes", "must not be negative"));
        }
        check_non_negative("policy_max_break_hours", settings.policy_max_break_hours)?;
        check_non_negative("policy_min_break_hours", settings.policy_min_break_hours)?;
        check_non_negative("no_break_min_scheduled_hours", settings.no_break_min_scheduled_hours)?;
        check_non_negative(
            "overtime_alert_threshold_hours",
            settings.overtime_alert_threshold_hours,
        )?;
        check_non_negative("compliance_weights.hours", settings.compliance_weights.hours)?;
        check_non_negative("compliance_weights.late", settings.compliance_weights.late)?;
        check_non_negative("compliance_weights.early", settings.compliance_weights.early)?;
        if settings.policy_min_break_hours > settings.policy_max_break_hours {
            return Err(EngineError::config(
                "policy_min_break_hours",
                "must not exceed policy_max_break_hours",
            ));
        }
        if settings.alert_cap == 0 {
            return Err(EngineError::config("alert_cap", "must be greater than zero"));
        }
        for allotment in &settings.break_allotments {
            check_non_negative("break_allotments.min_shift_hours", allotment.min_shift_hours)?;
            check_non_negative("break_allotments.break_hours", allotment.break_hours)?;
        }
        // Longest qualifying threshold wins, so keep them descending.
        settings
            .break_allotments
            .sort_by(|a, b| b.min_shift_hours.total_cmp(&a.min_shift_hours));
        Ok(Self { settings })
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&data)?;
        let config = Self::new(settings)?;
        info!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn late_tolerance_minutes(&self) -> i64 {
        self.settings.late_tolerance_minutes
    }

    pub fn early_tolerance_minutes(&self) -> i64 {
        self.settings.early_tolerance_minutes
    }

    pub fn policy_max_break_hours(&self) -> f64 {
        self.settings.policy_max_break_hours
    }

    pub fn policy_min_break_hours(&self) -> f64 {
        self.settings.policy_min_break_hours
    }

    pub fn no_break_min_scheduled_hours(&self) -> f64 {
        self.settings.no_break_min_scheduled_hours
    }

    pub fn overtime_alert_threshold_hours(&self) -> f64 {
        self.settings.overtime_alert_threshold_hours
    }

    pub fn compliance_weights(&self) -> ComplianceWeights {
        self.settings.compliance_weights
    }

    pub fn alert_cap(&self) -> usize {
        self.settings.alert_cap
    }

    /// Break allotment the policy grants a shift of `scheduled_hours`.
    pub fn break_allotment_for(&self, scheduled_hours: f64) -> f64 {
        self.settings
            .break_allotments
            .iter()
            .find(|a| scheduled_hours >= a.min_shift_hours)
            .map_or(0.0, |a| a.break_hours)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
        }
    }
}

impl TryFrom<EngineSettings> for EngineConfig {
    type Error = EngineError;

    fn try_from(settings: EngineSettings) -> Result<Self> {
        Self::new(settings)
    }
}

impl From<EngineConfig> for EngineSettings {
    fn from(config: EngineConfig) -> Self {
        config.settings
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::config(
            field,
            format!("must be a non-negative number (got {value})"),
        ));
    }
    Ok(())
}
