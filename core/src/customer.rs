//! Customer input records.
//!
//! RULE: the engine only ever sees a `CustomerRecord`.
//! Anything that could still be missing or free-text lives in
//! `population::RawCustomer` and is resolved by the cleaning step.

use crate::{
    error::{RiskError, RiskResult},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Current repayment standing of the card account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Current,
    Late,
    Delinquent,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [Self::Current, Self::Late, Self::Delinquent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Late => "Late",
            Self::Delinquent => "Delinquent",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment status '{0}' (expected Current, Late or Delinquent)")]
pub struct UnknownPaymentStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPaymentStatus(s.to_string()))
    }
}

/// One validated customer, ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    /// Balance over limit, as a ratio. 0.45 means 45%. May exceed 1.0.
    pub credit_utilization: f64,
    pub late_payment_count: u32,
    pub income_level: f64,
    pub payment_status: PaymentStatus,
    /// Missed payments over the trailing six months.
    pub missed_payments_6m: u32,
}

impl CustomerRecord {
    /// Reject values outside the scoring domain.
    /// Counts are unsigned, so only the real-valued fields need checking.
    pub fn validate(&self) -> RiskResult<()> {
        if self.customer_id.trim().is_empty() {
            return Err(RiskError::invalid(
                &self.customer_id,
                "customer_id",
                "must not be empty",
            ));
        }
        check_amount(&self.customer_id, "credit_utilization", self.credit_utilization)?;
        check_amount(&self.customer_id, "income_level", self.income_level)?;
        Ok(())
    }
}

fn check_amount(customer_id: &str, field: &'static str, value: f64) -> RiskResult<()> {
    if !value.is_finite() {
        return Err(RiskError::invalid(
            customer_id,
            field,
            format!("must be a finite number, got {value}"),
        ));
    }
    if value < 0.0 {
        return Err(RiskError::invalid(
            customer_id,
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}
