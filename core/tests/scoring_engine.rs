//! End-to-end behaviour of the scoring engine.

use cardrisk_core::{
    classifier::{RiskTier, TierThresholds},
    config::ScoringConfig,
    customer::{CustomerRecord, PaymentStatus},
    engine::ScoringEngine,
    error::RiskError,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn record(
    id: &str,
    util: f64,
    late: u32,
    income: f64,
    status: PaymentStatus,
    missed: u32,
) -> CustomerRecord {
    CustomerRecord {
        customer_id: id.into(),
        credit_utilization: util,
        late_payment_count: late,
        income_level: income,
        payment_status: status,
        missed_payments_6m: missed,
    }
}

fn sample_batch() -> Vec<CustomerRecord> {
    vec![
        record("CUST00001", 0.75, 3, 2_000_000.0, PaymentStatus::Delinquent, 3),
        record("CUST00002", 0.10, 0, 20_000_000.0, PaymentStatus::Current, 0),
        record("CUST00003", 0.45, 1, 7_500_000.0, PaymentStatus::Late, 2),
        record("CUST00004", 0.30, 2, 5_000_000.0, PaymentStatus::Current, 1),
        record("CUST00005", 1.20, 0, 4_999_999.0, PaymentStatus::Late, 0),
        record("CUST00006", 0.05, 5, 10_000_000.0, PaymentStatus::Delinquent, 4),
        record("CUST00007", 0.59, 0, 3_000_000.0, PaymentStatus::Current, 0),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The worst possible customer under the default policy tops out at 22.5,
/// which is still Low against the 34/67 boundaries.
#[test]
fn worst_case_customer_scores_22_5_and_stays_low() {
    init_logging();
    let engine = ScoringEngine::with_defaults().unwrap();
    let r = record("CUST00001", 0.75, 3, 2_000_000.0, PaymentStatus::Delinquent, 3);

    let result = engine.score(&r).unwrap();

    let points: Vec<f64> = result.factor_scores.iter().map(|f| f.points).collect();
    assert_eq!(points, vec![25.0, 30.0, 15.0, 20.0, 10.0]);
    assert!(
        (result.total_score - 22.5).abs() < 1e-9,
        "expected 22.5, got {}",
        result.total_score
    );
    assert_eq!(result.tier, RiskTier::Low);
    assert_eq!(result.customer_id, "CUST00001");
    assert!((engine.config().max_achievable_score() - 22.5).abs() < 1e-9);
}

#[test]
fn total_equals_weighted_sum_of_factors() {
    let engine = ScoringEngine::with_defaults().unwrap();
    for r in sample_batch() {
        let result = engine.score(&r).unwrap();
        let expected = result
            .factor_scores
            .iter()
            .fold(0.0, |acc, f| acc + f.points * f.weight);
        assert_eq!(
            result.total_score.to_bits(),
            expected.to_bits(),
            "{}: total {} != weighted sum {expected}",
            r.customer_id,
            result.total_score
        );
        let weight_sum: f64 = result.factor_scores.iter().map(|f| f.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
    }
}

#[test]
fn best_case_customer() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let r = record("CUST00002", 0.10, 0, 20_000_000.0, PaymentStatus::Current, 0);
    let result = engine.score(&r).unwrap();
    // 5×.25 + 5×.30 + 3×.15 + 5×.20 + 2×.10
    assert!((result.total_score - 4.4).abs() < 1e-9, "got {}", result.total_score);
    assert_eq!(result.tier, RiskTier::Low);
}

#[test]
fn lowered_thresholds_reach_every_tier() {
    let config = ScoringConfig::default().with_tiers(TierThresholds::new(10.0, 18.0));
    let engine = ScoringEngine::new(config).unwrap();
    let results = engine.score_all(&sample_batch()).unwrap();
    let tiers: Vec<RiskTier> = results.iter().map(|r| r.tier).collect();
    assert!(tiers.contains(&RiskTier::Low));
    assert!(tiers.contains(&RiskTier::Medium));
    assert!(tiers.contains(&RiskTier::High));
}

#[test]
fn score_all_preserves_order_and_matches_single_scoring() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let batch = sample_batch();

    let all = engine.score_all(&batch).unwrap();
    assert_eq!(all.len(), batch.len());
    for (r, result) in batch.iter().zip(&all) {
        assert_eq!(result.customer_id, r.customer_id);
        assert_eq!(result, &engine.score(r).unwrap());
    }

    // Reversing the input reverses the output and changes nothing else.
    let mut reversed = batch.clone();
    reversed.reverse();
    let mut rev_results = engine.score_all(&reversed).unwrap();
    rev_results.reverse();
    assert_eq!(rev_results, all);
}

#[test]
fn record_outcome_is_independent_of_its_neighbours() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let target = record("CUST00003", 0.45, 1, 7_500_000.0, PaymentStatus::Late, 2);
    let alone = engine.score(&target).unwrap();

    let mut crowd = sample_batch();
    crowd.insert(0, record("CUSTX", 2.0, 99, 0.0, PaymentStatus::Delinquent, 99));
    let results = engine.score_all(&crowd).unwrap();
    let in_crowd = results.iter().find(|r| r.customer_id == "CUST00003").unwrap();
    assert_eq!(in_crowd, &alone);
}

#[test]
fn parallel_scoring_matches_sequential() {
    init_logging();
    let engine = ScoringEngine::with_defaults().unwrap();
    let batch: Vec<CustomerRecord> = (0..97)
        .map(|i| {
            record(
                &format!("CUST{i:05}"),
                (i % 13) as f64 / 10.0,
                i % 5,
                (i as f64) * 250_000.0,
                PaymentStatus::ALL[(i % 3) as usize],
                i % 4,
            )
        })
        .collect();

    let sequential = engine.score_all(&batch).unwrap();
    for workers in [0, 1, 2, 4, 16, 200] {
        let parallel = engine.score_all_parallel(&batch, workers).unwrap();
        assert_eq!(parallel, sequential, "mismatch with {workers} workers");
    }
}

#[test]
fn scoring_is_bit_identical_across_calls() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let other = ScoringEngine::with_defaults().unwrap();
    for r in sample_batch() {
        let a = engine.score(&r).unwrap();
        let b = engine.score(&r).unwrap();
        let c = other.score(&r).unwrap();
        assert_eq!(a.total_score.to_bits(), b.total_score.to_bits());
        assert_eq!(a.total_score.to_bits(), c.total_score.to_bits());
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}

#[test]
fn unknown_payment_status_is_rejected() {
    let err = "Unknown".parse::<PaymentStatus>().unwrap_err();
    assert!(err.to_string().contains("Unknown"));
    assert_eq!("late".parse::<PaymentStatus>().unwrap(), PaymentStatus::Late);
    assert_eq!(" Delinquent ".parse::<PaymentStatus>().unwrap(), PaymentStatus::Delinquent);
}

#[test]
fn unknown_payment_status_in_json_input_is_rejected() {
    let json = r#"{
        "customer_id": "CUST00009",
        "credit_utilization": 0.4,
        "late_payment_count": 1,
        "income_level": 6000000.0,
        "payment_status": "Unknown",
        "missed_payments_6m": 0
    }"#;
    assert!(serde_json::from_str::<CustomerRecord>(json).is_err());

    let missing_field = r#"{ "customer_id": "CUST00009", "credit_utilization": 0.4 }"#;
    assert!(serde_json::from_str::<CustomerRecord>(missing_field).is_err());
}

#[test]
fn invalid_amounts_fail_without_partial_result() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let bad = [
        record("CUST00010", -0.1, 0, 1_000.0, PaymentStatus::Current, 0),
        record("CUST00011", f64::NAN, 0, 1_000.0, PaymentStatus::Current, 0),
        record("CUST00012", 0.2, 0, -5.0, PaymentStatus::Current, 0),
        record("CUST00013", 0.2, 0, f64::INFINITY, PaymentStatus::Current, 0),
        record("  ", 0.2, 0, 1_000.0, PaymentStatus::Current, 0),
    ];
    for r in &bad {
        match engine.score(r) {
            Err(RiskError::InvalidInput { .. }) => {}
            other => panic!("{:?} should be invalid input, got {other:?}", r.customer_id),
        }
    }
}

#[test]
fn score_all_fails_on_first_invalid_record_with_position() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let mut batch = sample_batch();
    batch[4].income_level = -1.0;

    match engine.score_all(&batch) {
        Err(RiskError::InvalidInput { customer_id, field, reason }) => {
            assert_eq!(customer_id, "CUST00005");
            assert_eq!(field, "income_level");
            assert!(reason.contains("batch position 4"), "reason: {reason}");
        }
        other => panic!("expected invalid input, got {other:?}"),
    }

    match engine.score_all_parallel(&batch, 3) {
        Err(RiskError::InvalidInput { reason, .. }) => {
            assert!(reason.contains("batch position 4"), "reason: {reason}");
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn score_each_keeps_per_record_outcomes() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let mut batch = sample_batch();
    batch[1].credit_utilization = -3.0;

    let outcomes = engine.score_each(&batch);
    assert_eq!(outcomes.len(), batch.len());
    assert!(outcomes[1].is_err());
    for (i, outcome) in outcomes.iter().enumerate().filter(|(i, _)| *i != 1) {
        let result = outcome.as_ref().unwrap();
        assert_eq!(result.customer_id, batch[i].customer_id);
    }
}

#[test]
fn empty_batch_scores_to_empty() {
    let engine = ScoringEngine::with_defaults().unwrap();
    assert!(engine.score_all(&[]).unwrap().is_empty());
    assert!(engine.score_all_parallel(&[], 8).unwrap().is_empty());
}
