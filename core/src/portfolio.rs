//! Portfolio-level summary of a scored batch.

use crate::{
    classifier::RiskTier,
    customer::CustomerRecord,
    engine::ScoringResult,
    error::{RiskError, RiskResult},
    population::{median, CustomerProfile},
};
use serde::{Deserialize, Serialize};

/// Low-tier share above this is healthy.
pub const LOW_SHARE_GOOD_PCT: f64 = 60.0;
/// High-tier share above this needs attention.
pub const HIGH_SHARE_ALERT_PCT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiFlag {
    Good,
    Monitor,
    Alert,
    Normal,
}

impl KpiFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Monitor => "Monitor",
            Self::Alert => "Alert",
            Self::Normal => "Normal",
        }
    }
}

/// Headline indicators for the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioKpis {
    pub avg_score: f64,
    pub avg_utilization: f64,
    pub low_pct: f64,
    pub high_pct: f64,
    /// `Good` when `low_pct > LOW_SHARE_GOOD_PCT`, else `Monitor`.
    pub low_flag: KpiFlag,
    /// `Alert` when `high_pct > HIGH_SHARE_ALERT_PCT`, else `Normal`.
    pub high_flag: KpiFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub tier: RiskTier,
    pub count: usize,
    pub share_pct: f64,
    pub avg_score: f64,
    pub avg_income: f64,
    pub avg_utilization: f64,
    pub avg_late_payments: f64,
    /// Present only when the summary was built with profiles.
    pub avg_monthly_spending: Option<f64>,
    pub avg_debt_to_income: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub customers: usize,
    pub min_score: f64,
    pub max_score: f64,
    pub mean_score: f64,
    pub median_score: f64,
    pub kpis: PortfolioKpis,
    /// Always one entry per tier, Low to High, including empty tiers.
    pub tiers: Vec<TierStats>,
}

impl PortfolioSummary {
    /// Summarize `results`, which must be the scores of `records` in order.
    pub fn build(records: &[CustomerRecord], results: &[ScoringResult]) -> RiskResult<Self> {
        Self::summarize(records, results, None)
    }

    /// Like `build`, adding spending figures from `profiles` (same order).
    pub fn build_with_profiles(
        records: &[CustomerRecord],
        results: &[ScoringResult],
        profiles: &[CustomerProfile],
    ) -> RiskResult<Self> {
        if profiles.len() != records.len() {
            return Err(RiskError::BatchMismatch {
                records: records.len(),
                results: profiles.len(),
            });
        }
        Self::summarize(records, results, Some(profiles))
    }

    fn summarize(
        records: &[CustomerRecord],
        results: &[ScoringResult],
        profiles: Option<&[CustomerProfile]>,
    ) -> RiskResult<Self> {
        if records.len() != results.len() {
            return Err(RiskError::BatchMismatch {
                records: records.len(),
                results: results.len(),
            });
        }

        let n = results.len();
        let mut scores: Vec<f64> = results.iter().map(|r| r.total_score).collect();
        let mean_score = mean(scores.iter().copied());
        let min_score = scores.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max_score = scores.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let median_score = median(&mut scores).unwrap_or(0.0);

        let tiers: Vec<TierStats> = RiskTier::ALL
            .into_iter()
            .map(|tier| {
                let members: Vec<usize> = (0..n).filter(|&i| results[i].tier == tier).collect();
                let count = members.len();
                let over = |f: &dyn Fn(usize) -> f64| mean(members.iter().map(|&i| f(i)));
                TierStats {
                    tier,
                    count,
                    share_pct: percent(count, n),
                    avg_score: over(&|i| results[i].total_score),
                    avg_income: over(&|i| records[i].income_level),
                    avg_utilization: over(&|i| records[i].credit_utilization),
                    avg_late_payments: over(&|i| f64::from(records[i].late_payment_count)),
                    avg_monthly_spending: profiles
                        .map(|p| over(&|i| p[i].avg_monthly_spending)),
                    avg_debt_to_income: profiles
                        .map(|p| mean(members.iter().filter_map(|&i| p[i].debt_to_income))),
                }
            })
            .collect();

        let low_pct = percent(count_in(results, RiskTier::Low), n);
        let high_pct = percent(count_in(results, RiskTier::High), n);
        let kpis = PortfolioKpis {
            avg_score: mean_score,
            avg_utilization: mean(records.iter().map(|c| c.credit_utilization)),
            low_pct,
            high_pct,
            low_flag: if low_pct > LOW_SHARE_GOOD_PCT {
                KpiFlag::Good
            } else {
                KpiFlag::Monitor
            },
            high_flag: if high_pct > HIGH_SHARE_ALERT_PCT {
                KpiFlag::Alert
            } else {
                KpiFlag::Normal
            },
        };

        Ok(Self {
            customers: n,
            min_score,
            max_score,
            mean_score,
            median_score,
            kpis,
            tiers,
        })
    }

    pub fn tier(&self, tier: RiskTier) -> Option<&TierStats> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

/// The `n` highest-scoring results, optionally within one tier.
/// Ties keep batch order.
pub fn top_risk(
    results: &[ScoringResult],
    tier: Option<RiskTier>,
    n: usize,
) -> Vec<&ScoringResult> {
    let mut ranked: Vec<&ScoringResult> = results
        .iter()
        .filter(|r| tier.map_or(true, |t| r.tier == t))
        .collect();
    ranked.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    ranked.truncate(n);
    ranked
}

fn count_in(results: &[ScoringResult], tier: RiskTier) -> usize {
    results.iter().filter(|r| r.tier == tier).count()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
