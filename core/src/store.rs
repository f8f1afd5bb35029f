//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never touches it; callers persist results after scoring.

use crate::{
    classifier::RiskTier,
    config::ScoringConfig,
    engine::ScoringResult,
    error::{RiskError, RiskResult},
    factor::FactorScore,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

pub struct ScoreStore {
    conn: Connection,
}

impl ScoreStore {
    /// Open (or create) the scoring database at `path`.
    pub fn open(path: &str) -> RiskResult<Self> {
        let conn = Connection::open(path)?;
        // SQLite answers with the mode it actually chose; :memory: stays "memory".
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") && !mode.eq_ignore_ascii_case("memory") {
            log::warn!("{path}: WAL unavailable, journal mode is '{mode}'");
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RiskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    pub fn journal_mode(&self) -> RiskResult<String> {
        let mode = self
            .conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))?;
        Ok(mode)
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RiskResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_scoring.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: Option<u64>,
        config: &ScoringConfig,
        version: &str,
    ) -> RiskResult<()> {
        let policy_json = serde_json::to_string(config)?;
        self.conn.execute(
            "INSERT INTO scoring_run (run_id, seed, policy_id, policy_json, version, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                seed.map(|s| s as i64),
                &config.policy_id,
                policy_json,
                version,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Policy a run was scored under.
    pub fn run_policy(&self, run_id: &str) -> RiskResult<Option<ScoringConfig>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT policy_json FROM scoring_run WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| serde_json::from_str(&j).map_err(RiskError::from))
            .transpose()
    }

    // ── Results ────────────────────────────────────────────────

    /// Persist a scored batch in one transaction, keeping batch order.
    pub fn insert_results(&self, run_id: &str, results: &[ScoringResult]) -> RiskResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO scoring_result (run_id, seq, customer_id, total_score, tier, factor_scores)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (seq, r) in results.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    seq as i64,
                    &r.customer_id,
                    r.total_score,
                    r.tier.as_str(),
                    serde_json::to_string(&r.factor_scores)?,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("Stored {} results for run {run_id}", results.len());
        Ok(())
    }

    /// All results of a run, in the order they were scored.
    pub fn results_for_run(&self, run_id: &str) -> RiskResult<Vec<ScoringResult>> {
        self.query_results(
            "SELECT customer_id, total_score, tier, factor_scores
             FROM scoring_result WHERE run_id = ?1
             ORDER BY seq ASC",
            params![run_id],
        )
    }

    /// One customer's result within a run.
    pub fn result_for_customer(
        &self,
        run_id: &str,
        customer_id: &str,
    ) -> RiskResult<Option<ScoringResult>> {
        let found = self.query_results(
            "SELECT customer_id, total_score, tier, factor_scores
             FROM scoring_result WHERE run_id = ?1 AND customer_id = ?2",
            params![run_id, customer_id],
        )?;
        Ok(found.into_iter().next())
    }

    /// Highest-scoring results of a run, optionally within one tier.
    /// Ties keep scoring order.
    pub fn top_results(
        &self,
        run_id: &str,
        tier: Option<RiskTier>,
        limit: usize,
    ) -> RiskResult<Vec<ScoringResult>> {
        self.query_results(
            "SELECT customer_id, total_score, tier, factor_scores
             FROM scoring_result
             WHERE run_id = ?1 AND (?2 IS NULL OR tier = ?2)
             ORDER BY total_score DESC, seq ASC
             LIMIT ?3",
            params![run_id, tier.map(|t| t.as_str()), limit as i64],
        )
    }

    fn query_results(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RiskResult<Vec<ScoringResult>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(customer_id, total_score, tier, factors)| {
                let factor_scores: Vec<FactorScore> = serde_json::from_str(&factors)?;
                Ok(ScoringResult {
                    customer_id,
                    total_score,
                    tier: parse_tier(&tier)?,
                    factor_scores,
                })
            })
            .collect()
    }

    pub fn result_count(&self, run_id: &str) -> RiskResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM scoring_result WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Customers per tier for a run. Tiers with no customers are omitted.
    pub fn tier_counts(&self, run_id: &str) -> RiskResult<BTreeMap<RiskTier, i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT tier, COUNT(*) FROM scoring_result
             WHERE run_id = ?1 GROUP BY tier",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(tier, count)| Ok((parse_tier(&tier)?, count)))
            .collect()
    }
}

fn parse_tier(s: &str) -> RiskResult<RiskTier> {
    s.parse()
        .map_err(|e: String| RiskError::Other(anyhow::anyhow!(e)))
}
