//! The scoring engine: the heart of the workspace.
//!
//! PIPELINE (fixed, never reordered):
//!   1. Validate the record
//!   2. Score the five factors in `Factor::ALL` order
//!   3. Aggregate the weighted total
//!   4. Classify the total into a tier
//!
//! RULES:
//!   - The engine holds only its immutable policy and scorers.
//!   - A record never influences another record's result.
//!   - A failed record yields no partial result.

use crate::{
    aggregator::weighted_total,
    classifier::RiskTier,
    config::ScoringConfig,
    customer::CustomerRecord,
    error::{RiskError, RiskResult},
    factor::{scorers_for, FactorScore, FactorScorer},
    types::CustomerId,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of scoring one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub customer_id: CustomerId,
    pub total_score: f64,
    pub tier: RiskTier,
    pub factor_scores: Vec<FactorScore>,
}

pub struct ScoringEngine {
    config: ScoringConfig,
    scorers: Vec<Box<dyn FactorScorer>>,
}

impl ScoringEngine {
    /// Build an engine for `config`. Fails on any configuration error.
    pub fn new(config: ScoringConfig) -> RiskResult<Self> {
        config.validate()?;

        let max_score = config.max_achievable_score();
        if max_score < config.tiers.medium_min {
            log::warn!(
                "Policy '{}': max achievable score {max_score} is below medium_min {}; every customer will be Low",
                config.policy_id,
                config.tiers.medium_min
            );
        } else if max_score < config.tiers.high_min {
            log::warn!(
                "Policy '{}': max achievable score {max_score} is below high_min {}; High tier is unreachable",
                config.policy_id,
                config.tiers.high_min
            );
        }

        let scorers = scorers_for(&config);
        let factors: Vec<&str> = scorers.iter().map(|s| s.factor().key()).collect();
        log::info!(
            "Scoring engine ready: policy '{}', factors [{}], tiers medium>={} high>={}",
            config.policy_id,
            factors.join(", "),
            config.tiers.medium_min,
            config.tiers.high_min
        );
        Ok(Self { config, scorers })
    }

    /// Engine over the built-in default policy.
    pub fn with_defaults() -> RiskResult<Self> {
        Self::new(ScoringConfig::default())
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one customer.
    pub fn score(&self, record: &CustomerRecord) -> RiskResult<ScoringResult> {
        record.validate()?;

        let factor_scores: Vec<FactorScore> =
            self.scorers.iter().map(|s| s.score(record)).collect();
        let total_score = weighted_total(&factor_scores);
        let tier = self.config.tiers.classify(total_score);

        log::debug!(
            "{}: total {total_score} -> {}",
            record.customer_id,
            tier.as_str()
        );

        Ok(ScoringResult {
            customer_id: record.customer_id.clone(),
            total_score,
            tier,
            factor_scores,
        })
    }

    /// Score a batch in input order. Stops at the first invalid record.
    pub fn score_all(&self, records: &[CustomerRecord]) -> RiskResult<Vec<ScoringResult>> {
        let results = records
            .iter()
            .enumerate()
            .map(|(i, r)| self.score(r).map_err(|e| at_position(e, i)))
            .collect::<RiskResult<Vec<_>>>()?;
        log::info!("Scored {} customers", results.len());
        Ok(results)
    }

    /// Score a batch, keeping every record's own outcome.
    pub fn score_each(&self, records: &[CustomerRecord]) -> Vec<RiskResult<ScoringResult>> {
        records.iter().map(|r| self.score(r)).collect()
    }

    /// Same output as `score_all`, computed on a pool of `workers` threads.
    /// With several invalid records, which one is reported is unspecified.
    pub fn score_all_parallel(
        &self,
        records: &[CustomerRecord],
        workers: usize,
    ) -> RiskResult<Vec<ScoringResult>> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| anyhow::anyhow!("Cannot build scoring pool: {e}"))?;

        let results = pool.install(|| {
            records
                .par_iter()
                .enumerate()
                .map(|(i, r)| self.score(r).map_err(|e| at_position(e, i)))
                .collect::<RiskResult<Vec<_>>>()
        })?;

        log::info!("Scored {} customers on {workers} workers", results.len());
        Ok(results)
    }
}

fn at_position(err: RiskError, position: usize) -> RiskError {
    match err {
        RiskError::InvalidInput {
            customer_id,
            field,
            reason,
        } => RiskError::InvalidInput {
            customer_id,
            field,
            reason: format!("{reason} (batch position {position})"),
        },
        other => other,
    }
}
