//! Synthetic card portfolio generation and data cleaning.
//!
//! Generation deliberately injects data-quality problems (missing incomes,
//! utilization outliers) so the cleaning step has something to fix.
//! Output of `clean_population` is what the engine scores.

use crate::{
    customer::{CustomerRecord, PaymentStatus},
    error::{RiskError, RiskResult},
    rng::{PopulationRng, StreamSlot},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};

const INCOME_LEVELS: [f64; 6] = [
    3_000_000.0,
    5_000_000.0,
    7_500_000.0,
    10_000_000.0,
    15_000_000.0,
    20_000_000.0,
];
const INCOME_WEIGHTS: [f64; 6] = [0.20, 0.25, 0.20, 0.15, 0.12, 0.08];

const CREDIT_LIMITS: [f64; 5] = [
    5_000_000.0,
    10_000_000.0,
    15_000_000.0,
    25_000_000.0,
    50_000_000.0,
];
const CREDIT_LIMIT_WEIGHTS: [f64; 5] = [0.30, 0.30, 0.20, 0.15, 0.05];

const STATUS_LABELS: [&str; 3] = ["Current", "Late", "Delinquent"];
const STATUS_WEIGHTS: [f64; 3] = [0.75, 0.20, 0.05];

const LATE_PAYMENT_LAMBDA: f64 = 0.5;
const MISSED_PAYMENT_LAMBDA: f64 = 0.3;

pub const MISSING_INCOME_SHARE: f64 = 0.05;
pub const UTILIZATION_OUTLIERS: usize = 10;
const OUTLIER_RANGE: (f64, f64) = (1.5, 2.0);

/// Utilization above this is treated as a data error and capped.
pub const UTILIZATION_CAP: f64 = 1.0;

/// A customer row as it arrives from the source system, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCustomer {
    pub customer_id: CustomerId,
    pub income: Option<f64>,
    pub credit_limit: f64,
    pub credit_utilization: f64,
    pub late_payment_count: u32,
    pub payment_status: String,
    pub missed_payments_6m: u32,
}

/// What the cleaning step changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub incomes_filled: usize,
    pub utilization_capped: usize,
    /// Set only when at least one income was imputed.
    pub median_income: Option<f64>,
}

/// Spending and affordability figures derived for one customer.
///
/// Spending comes from the raw utilization, before any capping.
/// The ratios are `None` when the customer's income is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub credit_limit: f64,
    pub avg_monthly_spending: f64,
    /// Monthly spending as a percentage of income.
    pub debt_to_income: Option<f64>,
    pub credit_limit_to_income: Option<f64>,
}

/// Generate `n` synthetic customers. Same seed, same portfolio.
pub fn generate_population(seed: u64, n: usize) -> Vec<RawCustomer> {
    let mut profile = PopulationRng::new(seed, StreamSlot::Profile);
    let mut behavior = PopulationRng::new(seed, StreamSlot::Behavior);
    let mut quality = PopulationRng::new(seed, StreamSlot::DataQuality);
    let mut credit = PopulationRng::new(seed, StreamSlot::Credit);

    let mut customers: Vec<RawCustomer> = (0..n)
        .map(|i| {
            let income = INCOME_LEVELS[profile.weighted_index(&INCOME_WEIGHTS)];
            let payment_status = STATUS_LABELS[behavior.weighted_index(&STATUS_WEIGHTS)];
            RawCustomer {
                customer_id: format!("CUST{:05}", i + 1),
                income: Some(income),
                credit_limit: CREDIT_LIMITS[credit.weighted_index(&CREDIT_LIMIT_WEIGHTS)],
                credit_utilization: behavior.beta_int(2, 5),
                late_payment_count: behavior.poisson(LATE_PAYMENT_LAMBDA),
                payment_status: payment_status.to_string(),
                missed_payments_6m: behavior.poisson(MISSED_PAYMENT_LAMBDA),
            }
        })
        .collect();

    let missing = (n as f64 * MISSING_INCOME_SHARE) as usize;
    for idx in distinct_indices(&mut quality, n, missing) {
        customers[idx].income = None;
    }
    for idx in distinct_indices(&mut quality, n, UTILIZATION_OUTLIERS.min(n)) {
        customers[idx].credit_utilization = quality.uniform(OUTLIER_RANGE.0, OUTLIER_RANGE.1);
    }

    log::info!(
        "Generated {n} customers (seed {seed}, {missing} missing incomes, {} outliers)",
        UTILIZATION_OUTLIERS.min(n)
    );
    customers
}

/// `count` distinct indices in [0, n), via a partial Fisher-Yates shuffle.
fn distinct_indices(rng: &mut PopulationRng, n: usize, count: usize) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..count {
        let j = i + rng.next_u64_below((n - i) as u64) as usize;
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}

/// Turn raw rows into validated records.
///
/// - Missing incomes are filled with the median of present incomes.
/// - Utilization above `UTILIZATION_CAP` is capped.
/// - Payment status must be one of the known categories.
pub fn clean_population(raw: &[RawCustomer]) -> RiskResult<(Vec<CustomerRecord>, CleaningReport)> {
    let mut report = CleaningReport::default();
    let needs_fill = raw.iter().any(|c| c.income.is_none());

    let fill_income = if needs_fill {
        let mut present: Vec<f64> = raw.iter().filter_map(|c| c.income).collect();
        let median_income = median(&mut present).ok_or_else(|| {
            RiskError::invalid("*", "income", "is missing for every customer, cannot impute")
        })?;
        report.median_income = Some(median_income);
        median_income
    } else {
        0.0
    };

    let mut records = Vec::with_capacity(raw.len());
    for c in raw {
        let income_level = match c.income {
            Some(v) => v,
            None => {
                report.incomes_filled += 1;
                fill_income
            }
        };

        let credit_utilization = if c.credit_utilization > UTILIZATION_CAP {
            report.utilization_capped += 1;
            UTILIZATION_CAP
        } else {
            c.credit_utilization
        };

        let payment_status: PaymentStatus = c
            .payment_status
            .parse()
            .map_err(|e: crate::customer::UnknownPaymentStatus| {
                RiskError::invalid(&c.customer_id, "payment_status", e.to_string())
            })?;

        let record = CustomerRecord {
            customer_id: c.customer_id.clone(),
            credit_utilization,
            late_payment_count: c.late_payment_count,
            income_level,
            payment_status,
            missed_payments_6m: c.missed_payments_6m,
        };
        record.validate()?;
        records.push(record);
    }

    log::info!(
        "Cleaned {} customers: {} incomes filled, {} utilization values capped",
        records.len(),
        report.incomes_filled,
        report.utilization_capped
    );
    Ok((records, report))
}

/// Derive spending and affordability figures for cleaned `records`.
/// `raw` must be the rows `records` were cleaned from, in the same order.
pub fn derive_profiles(
    raw: &[RawCustomer],
    records: &[CustomerRecord],
) -> RiskResult<Vec<CustomerProfile>> {
    if raw.len() != records.len() {
        return Err(RiskError::BatchMismatch {
            records: records.len(),
            results: raw.len(),
        });
    }

    raw.iter()
        .zip(records)
        .map(|(c, record)| {
            if c.customer_id != record.customer_id {
                return Err(RiskError::invalid(
                    &record.customer_id,
                    "customer_id",
                    format!("does not match raw row '{}'", c.customer_id),
                ));
            }
            if !c.credit_limit.is_finite() || c.credit_limit < 0.0 {
                return Err(RiskError::invalid(
                    &c.customer_id,
                    "credit_limit",
                    format!("must be a non-negative amount, got {}", c.credit_limit),
                ));
            }

            let avg_monthly_spending = (c.credit_limit * c.credit_utilization).floor();
            let income = record.income_level;
            let (debt_to_income, credit_limit_to_income) = if income > 0.0 {
                (
                    Some(avg_monthly_spending / income * 100.0),
                    Some(c.credit_limit / income),
                )
            } else {
                (None, None)
            };

            Ok(CustomerProfile {
                customer_id: record.customer_id.clone(),
                credit_limit: c.credit_limit,
                avg_monthly_spending,
                debt_to_income,
                credit_limit_to_income,
            })
        })
        .collect()
}

/// Median of `values`; mean of the middle pair for even lengths.
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
