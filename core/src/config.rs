//! Scoring policy: band tables, factor weights and tier boundaries.
//!
//! A `ScoringConfig` is immutable once handed to the engine.
//! Several policies (e.g. regional variants) can be loaded side by side;
//! nothing here is global or mutable.

use crate::{
    classifier::TierThresholds,
    customer::PaymentStatus,
    error::{RiskError, RiskResult},
    factor::Factor,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Default policy ───────────────────────────────────────────────────────────

pub const DEFAULT_POLICY_ID: &str = "card-risk-v1";

pub const WEIGHT_CREDIT_UTILIZATION: f64 = 0.25;
pub const WEIGHT_LATE_PAYMENTS: f64 = 0.30;
pub const WEIGHT_INCOME_LEVEL: f64 = 0.15;
pub const WEIGHT_PAYMENT_STATUS: f64 = 0.20;
pub const WEIGHT_MISSED_PAYMENTS: f64 = 0.10;

/// Allowed drift of the weight sum away from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// (lower bound, points). Lower bounds are inclusive.
const UTILIZATION_BANDS: [(f64, f64); 3] = [(0.0, 5.0), (0.30, 15.0), (0.60, 25.0)];
const LATE_PAYMENT_BANDS: [(f64, f64); 3] = [(0.0, 5.0), (1.0, 20.0), (3.0, 30.0)];
const INCOME_BANDS: [(f64, f64); 3] = [(0.0, 15.0), (5_000_000.0, 10.0), (10_000_000.0, 3.0)];
const MISSED_PAYMENT_BANDS: [(f64, f64); 3] = [(0.0, 2.0), (1.0, 7.0), (3.0, 10.0)];

// ── Band tables ──────────────────────────────────────────────────────────────

/// One threshold band: every value `>= from` (up to the next band) earns `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub from: f64,
    pub points: f64,
}

/// Ordered, contiguous bands covering `[0, ∞)`.
/// The last band is open-ended and absorbs everything above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(from, points)| Band { from, points })
                .collect(),
        )
    }

    /// Points for `value`: the last band whose lower bound is `<= value`.
    pub fn points_for(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .rev()
            .find(|band| value >= band.from)
            .or_else(|| self.bands.first())
            .map(|band| band.points)
            .unwrap_or(0.0)
    }

    pub fn max_points(&self) -> f64 {
        self.bands.iter().map(|b| b.points).fold(0.0, f64::max)
    }

    fn validate(&self, name: &str, errors: &mut Vec<String>) {
        let Some(first) = self.bands.first() else {
            errors.push(format!("{name}: band table is empty"));
            return;
        };
        if first.from != 0.0 {
            errors.push(format!(
                "{name}: first band must start at 0, starts at {}",
                first.from
            ));
        }
        for (i, band) in self.bands.iter().enumerate() {
            if !band.from.is_finite() {
                errors.push(format!("{name}[{i}].from: must be finite"));
            }
            if !band.points.is_finite() || band.points < 0.0 {
                errors.push(format!(
                    "{name}[{i}].points: must be finite and non-negative, got {}",
                    band.points
                ));
            }
        }
        for (i, pair) in self.bands.windows(2).enumerate() {
            if pair[1].from <= pair[0].from {
                errors.push(format!(
                    "{name}[{}].from: bands must strictly ascend ({} after {})",
                    i + 1,
                    pair[1].from,
                    pair[0].from
                ));
            }
        }
    }
}

/// Points awarded per payment status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusPoints {
    pub current: f64,
    pub late: f64,
    pub delinquent: f64,
}

impl PaymentStatusPoints {
    pub fn points_for(&self, status: PaymentStatus) -> f64 {
        match status {
            PaymentStatus::Current => self.current,
            PaymentStatus::Late => self.late,
            PaymentStatus::Delinquent => self.delinquent,
        }
    }

    pub fn max_points(&self) -> f64 {
        self.current.max(self.late).max(self.delinquent)
    }
}

impl Default for PaymentStatusPoints {
    fn default() -> Self {
        Self {
            current: 5.0,
            late: 15.0,
            delinquent: 20.0,
        }
    }
}

/// Per-factor weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub credit_utilization: f64,
    pub late_payments: f64,
    pub income_level: f64,
    pub payment_status: f64,
    pub missed_payments: f64,
}

impl FactorWeights {
    pub fn for_factor(&self, factor: Factor) -> f64 {
        match factor {
            Factor::CreditUtilization => self.credit_utilization,
            Factor::LatePayments => self.late_payments,
            Factor::IncomeLevel => self.income_level,
            Factor::PaymentStatus => self.payment_status,
            Factor::MissedPayments => self.missed_payments,
        }
    }

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.for_factor(*f)).sum()
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            credit_utilization: WEIGHT_CREDIT_UTILIZATION,
            late_payments: WEIGHT_LATE_PAYMENTS,
            income_level: WEIGHT_INCOME_LEVEL,
            payment_status: WEIGHT_PAYMENT_STATUS,
            missed_payments: WEIGHT_MISSED_PAYMENTS,
        }
    }
}

// ── Policy ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub policy_id: String,
    pub weights: FactorWeights,
    pub credit_utilization_bands: BandTable,
    pub late_payment_bands: BandTable,
    pub income_bands: BandTable,
    #[serde(default)]
    pub payment_status_points: PaymentStatusPoints,
    pub missed_payment_bands: BandTable,
    #[serde(default)]
    pub tiers: TierThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            policy_id: DEFAULT_POLICY_ID.into(),
            weights: FactorWeights::default(),
            credit_utilization_bands: BandTable::from_pairs(&UTILIZATION_BANDS),
            late_payment_bands: BandTable::from_pairs(&LATE_PAYMENT_BANDS),
            income_bands: BandTable::from_pairs(&INCOME_BANDS),
            payment_status_points: PaymentStatusPoints::default(),
            missed_payment_bands: BandTable::from_pairs(&MISSED_PAYMENT_BANDS),
            tiers: TierThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Load a policy from a JSON file.
    /// Validation happens when the engine is built, not here.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: ScoringConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Same policy with different tier boundaries.
    pub fn with_tiers(mut self, tiers: TierThresholds) -> Self {
        self.tiers = tiers;
        self
    }

    /// Points cap for a single factor under this policy.
    pub fn max_points(&self, factor: Factor) -> f64 {
        match factor {
            Factor::CreditUtilization => self.credit_utilization_bands.max_points(),
            Factor::LatePayments => self.late_payment_bands.max_points(),
            Factor::IncomeLevel => self.income_bands.max_points(),
            Factor::PaymentStatus => self.payment_status_points.max_points(),
            Factor::MissedPayments => self.missed_payment_bands.max_points(),
        }
    }

    /// Highest total score any customer can reach under this policy.
    pub fn max_achievable_score(&self) -> f64 {
        Factor::ALL
            .iter()
            .map(|f| self.max_points(*f) * self.weights.for_factor(*f))
            .sum()
    }

    /// Check the whole policy and report every problem at once.
    pub fn validate(&self) -> RiskResult<()> {
        let mut errors = Vec::new();

        if self.policy_id.trim().is_empty() {
            errors.push("policy_id: must not be empty".to_string());
        }

        for factor in Factor::ALL {
            let w = self.weights.for_factor(factor);
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                errors.push(format!(
                    "weights.{}: must be within [0, 1], got {w}",
                    factor.key()
                ));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("weights: must sum to 1.0, sum to {sum}"));
        }

        self.credit_utilization_bands
            .validate("credit_utilization_bands", &mut errors);
        self.late_payment_bands
            .validate("late_payment_bands", &mut errors);
        self.income_bands.validate("income_bands", &mut errors);
        self.missed_payment_bands
            .validate("missed_payment_bands", &mut errors);

        for status in PaymentStatus::ALL {
            let p = self.payment_status_points.points_for(status);
            if !p.is_finite() || p < 0.0 {
                errors.push(format!(
                    "payment_status_points.{}: must be finite and non-negative, got {p}",
                    status.as_str().to_ascii_lowercase()
                ));
            }
        }

        if let Err(e) = self.tiers.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RiskError::Configuration(errors.join("; ")))
        }
    }
}
