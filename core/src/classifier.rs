//! Risk tier classification.
//!
//! Tiers are half-open and contiguous:
//!   Low    = (-∞, medium_min)
//!   Medium = [medium_min, high_min)
//!   High   = [high_min, ∞)
//! Every score lands in exactly one tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MEDIUM_TIER_MIN: f64 = 34.0;
pub const DEFAULT_HIGH_TIER_MIN: f64 = 67.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    /// One-line account handling stance for the tier.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Low => "Maintain good standing",
            Self::Medium => "Enhanced monitoring",
            Self::High => "Intensive review",
        }
    }

    /// Account actions recommended for customers in this tier.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Self::Low => &[
                "Continue monitoring regular payment behavior",
                "Consider for credit limit increase",
                "Eligible for premium product offerings",
                "Reward loyalty with benefits program",
            ],
            Self::Medium => &[
                "Send payment reminders before due dates",
                "Monitor credit utilization closely",
                "Offer financial literacy resources",
                "Consider payment plan options if needed",
            ],
            Self::High => &[
                "Immediate collections team review required",
                "Freeze or reduce credit limit",
                "Require collateral for new transactions",
                "Implement strict payment monitoring",
                "Consider account suspension if delinquent",
            ],
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown risk tier '{other}'")),
        }
    }
}

/// Lower bounds of the Medium and High tiers. Inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub medium_min: f64,
    pub high_min: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium_min: DEFAULT_MEDIUM_TIER_MIN,
            high_min: DEFAULT_HIGH_TIER_MIN,
        }
    }
}

impl TierThresholds {
    pub fn new(medium_min: f64, high_min: f64) -> Self {
        Self {
            medium_min,
            high_min,
        }
    }

    pub fn classify(&self, total_score: f64) -> RiskTier {
        if total_score >= self.high_min {
            RiskTier::High
        } else if total_score >= self.medium_min {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Boundaries must satisfy `0 <= medium_min < high_min`, both finite.
    pub fn validate(&self) -> Result<(), String> {
        if !self.medium_min.is_finite() || !self.high_min.is_finite() {
            return Err(format!(
                "tiers: boundaries must be finite, got medium_min={} high_min={}",
                self.medium_min, self.high_min
            ));
        }
        if self.medium_min < 0.0 {
            return Err(format!(
                "tiers.medium_min: must be non-negative, got {}",
                self.medium_min
            ));
        }
        if self.medium_min >= self.high_min {
            return Err(format!(
                "tiers: medium_min ({}) must be below high_min ({})",
                self.medium_min, self.high_min
            ));
        }
        Ok(())
    }
}
