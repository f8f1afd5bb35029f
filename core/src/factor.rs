//! The five factor scorers.
//!
//! Each scorer reads one attribute of a `CustomerRecord` and maps it to a
//! fixed point value through its band table. Scorers are total over the
//! validated input domain and hold no state between calls.

use crate::{
    config::{BandTable, PaymentStatusPoints, ScoringConfig},
    customer::{CustomerRecord, PaymentStatus},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring factors, in the fixed order results are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    CreditUtilization,
    LatePayments,
    IncomeLevel,
    PaymentStatus,
    MissedPayments,
}

impl Factor {
    /// NEVER reorder: `ScoringResult::factor_scores` follows this order.
    pub const ALL: [Factor; 5] = [
        Self::CreditUtilization,
        Self::LatePayments,
        Self::IncomeLevel,
        Self::PaymentStatus,
        Self::MissedPayments,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::CreditUtilization => "credit_utilization",
            Self::LatePayments => "late_payments",
            Self::IncomeLevel => "income_level",
            Self::PaymentStatus => "payment_status",
            Self::MissedPayments => "missed_payments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditUtilization => "Credit utilization",
            Self::LatePayments => "Late payment count",
            Self::IncomeLevel => "Income level",
            Self::PaymentStatus => "Payment status",
            Self::MissedPayments => "Missed payments (6m)",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The raw attribute a factor was scored from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    Amount(f64),
    Status(PaymentStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub raw_value: FactorValue,
    pub points: f64,
    pub weight: f64,
}

impl FactorScore {
    /// This factor's share of the total score.
    pub fn contribution(&self) -> f64 {
        self.points * self.weight
    }
}

/// The contract every factor scorer fulfills.
pub trait FactorScorer: Send + Sync {
    fn factor(&self) -> Factor;

    /// Score one validated record. Never fails.
    fn score(&self, record: &CustomerRecord) -> FactorScore;
}

/// Scorer for any numeric attribute with a lower-closed band table.
pub struct BandScorer {
    factor: Factor,
    bands: BandTable,
    weight: f64,
    extract: fn(&CustomerRecord) -> f64,
}

impl BandScorer {
    pub fn new(
        factor: Factor,
        bands: BandTable,
        weight: f64,
        extract: fn(&CustomerRecord) -> f64,
    ) -> Self {
        Self {
            factor,
            bands,
            weight,
            extract,
        }
    }

    pub fn points_for(&self, value: f64) -> f64 {
        self.bands.points_for(value)
    }
}

impl FactorScorer for BandScorer {
    fn factor(&self) -> Factor {
        self.factor
    }

    fn score(&self, record: &CustomerRecord) -> FactorScore {
        let value = (self.extract)(record);
        FactorScore {
            factor: self.factor,
            raw_value: FactorValue::Amount(value),
            points: self.points_for(value),
            weight: self.weight,
        }
    }
}

pub struct PaymentStatusScorer {
    points: PaymentStatusPoints,
    weight: f64,
}

impl PaymentStatusScorer {
    pub fn new(points: PaymentStatusPoints, weight: f64) -> Self {
        Self { points, weight }
    }
}

impl FactorScorer for PaymentStatusScorer {
    fn factor(&self) -> Factor {
        Factor::PaymentStatus
    }

    fn score(&self, record: &CustomerRecord) -> FactorScore {
        FactorScore {
            factor: Factor::PaymentStatus,
            raw_value: FactorValue::Status(record.payment_status),
            points: self.points.points_for(record.payment_status),
            weight: self.weight,
        }
    }
}

/// Build one scorer per factor, in `Factor::ALL` order.
pub fn scorers_for(config: &ScoringConfig) -> Vec<Box<dyn FactorScorer>> {
    Factor::ALL
        .into_iter()
        .map(|factor| scorer_for(config, factor))
        .collect()
}

fn scorer_for(config: &ScoringConfig, factor: Factor) -> Box<dyn FactorScorer> {
    let weight = config.weights.for_factor(factor);
    match factor {
        Factor::CreditUtilization => Box::new(BandScorer::new(
            factor,
            config.credit_utilization_bands.clone(),
            weight,
            |r| r.credit_utilization,
        )),
        Factor::LatePayments => Box::new(BandScorer::new(
            factor,
            config.late_payment_bands.clone(),
            weight,
            |r| f64::from(r.late_payment_count),
        )),
        Factor::IncomeLevel => Box::new(BandScorer::new(
            factor,
            config.income_bands.clone(),
            weight,
            |r| r.income_level,
        )),
        Factor::PaymentStatus => Box::new(PaymentStatusScorer::new(
            config.payment_status_points,
            weight,
        )),
        Factor::MissedPayments => Box::new(BandScorer::new(
            factor,
            config.missed_payment_bands.clone(),
            weight,
            |r| f64::from(r.missed_payments_6m),
        )),
    }
}
