use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Timing of one breathing-preparation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub inhale_secs: f64,
    /// Optional hold between inhale and exhale.
    #[serde(default)]
    pub hold_secs: Option<f64>,
    pub exhale_secs: f64,
    pub cycles: u32,
}

impl PatternConfig {
    /// Build a validated config: every duration must be positive and finite,
    /// and there must be at least one cycle.
    pub fn new(
        inhale_secs: f64,
        exhale_secs: f64,
        hold_secs: Option<f64>,
        cycles: u32,
    ) -> Result<Self, ValidationError> {
        check_duration("inhale_secs", inhale_secs)?;
        check_duration("exhale_secs", exhale_secs)?;
        if let Some(hold) = hold_secs {
            check_duration("hold_secs", hold)?;
        }
        if cycles == 0 {
            return Err(ValidationError::NoCycles);
        }
        Ok(Self {
            inhale_secs,
            hold_secs,
            exhale_secs,
            cycles,
        })
    }

    /// Seconds in one inhale/[hold]/exhale cycle.
    pub fn cycle_secs(&self) -> f64 {
        self.inhale_secs + self.hold_secs.unwrap_or(0.0) + self.exhale_secs
    }

    /// Seconds for the whole preparation sequence.
    pub fn total_secs(&self) -> f64 {
        self.cycle_secs() * self.cycles as f64
    }
}

fn check_duration(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidDuration {
            field: field.to_string(),
            value,
        })
    }
}

const STANDARD: PatternConfig = PatternConfig {
    inhale_secs: 4.0,
    hold_secs: None,
    exhale_secs: 6.0,
    cycles: 3,
};

const BOX: PatternConfig = PatternConfig {
    inhale_secs: 4.0,
    hold_secs: Some(4.0),
    exhale_secs: 4.0,
    cycles: 4,
};

const MULTI_HOLD: PatternConfig = PatternConfig {
    inhale_secs: 4.0,
    hold_secs: Some(7.0),
    exhale_secs: 8.0,
    cycles: 3,
};

/// The fixed set of breathing patterns a session can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternVariant {
    #[default]
    Standard,
    Box,
    MultiHold,
}

impl PatternVariant {
    pub const ALL: [PatternVariant; 3] = [
        PatternVariant::Standard,
        PatternVariant::Box,
        PatternVariant::MultiHold,
    ];

    pub fn config(self) -> PatternConfig {
        match self {
            PatternVariant::Standard => STANDARD,
            PatternVariant::Box => BOX,
            PatternVariant::MultiHold => MULTI_HOLD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternVariant::Standard => "standard",
            PatternVariant::Box => "box",
            PatternVariant::MultiHold => "multi-hold",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PatternVariant::Standard => "Standard",
            PatternVariant::Box => "Box Breathing",
            PatternVariant::MultiHold => "Multi-Hold",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PatternVariant::Standard => "Slow inhale, longer exhale to settle the heart rate",
            PatternVariant::Box => "Equal inhale, hold and exhale for steady focus",
            PatternVariant::MultiHold => "Long holds between breaths to build CO2 tolerance",
        }
    }
}

impl fmt::Display for PatternVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternVariant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(PatternVariant::Standard),
            "box" => Ok(PatternVariant::Box),
            "multi-hold" | "multihold" | "multi_hold" => Ok(PatternVariant::MultiHold),
            other => Err(ValidationError::UnknownVariant(other.to_string())),
        }
    }
}
