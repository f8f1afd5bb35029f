//! Credit-card customer risk scoring.
//!
//! `ScoringEngine` turns a validated `CustomerRecord` into a `ScoringResult`:
//! five banded factor scores, their weighted total, and a risk tier.
//! Everything else in this crate (population generation, cleaning,
//! persistence, portfolio summaries) sits around that one operation.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod customer;
pub mod engine;
pub mod error;
pub mod factor;
pub mod population;
pub mod portfolio;
pub mod rng;
pub mod store;
pub mod types;

pub use classifier::{RiskTier, TierThresholds};
pub use config::ScoringConfig;
pub use customer::{CustomerRecord, PaymentStatus};
pub use engine::{ScoringEngine, ScoringResult};
pub use error::{RiskError, RiskResult};
pub use factor::{Factor, FactorScore};
