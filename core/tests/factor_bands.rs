//! Band boundaries for every factor, checked through the public engine.
//! Lower bounds are inclusive: the boundary value itself earns the higher band.

use cardrisk_core::{
    customer::{CustomerRecord, PaymentStatus},
    engine::ScoringEngine,
    factor::{Factor, FactorValue},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn baseline() -> CustomerRecord {
    CustomerRecord {
        customer_id: "CUST00001".into(),
        credit_utilization: 0.10,
        late_payment_count: 0,
        income_level: 12_000_000.0,
        payment_status: PaymentStatus::Current,
        missed_payments_6m: 0,
    }
}

fn points(record: &CustomerRecord, factor: Factor) -> f64 {
    let engine = ScoringEngine::with_defaults().unwrap();
    let result = engine.score(record).unwrap();
    result
        .factor_scores
        .iter()
        .find(|f| f.factor == factor)
        .map(|f| f.points)
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn credit_utilization_bands() {
    let cases = [
        (0.0, 5.0),
        (0.2999, 5.0),
        (0.30, 15.0),
        (0.5999, 15.0),
        (0.60, 25.0),
        (1.0, 25.0),
        (1.75, 25.0),
    ];
    for (ratio, expected) in cases {
        let record = CustomerRecord {
            credit_utilization: ratio,
            ..baseline()
        };
        assert_eq!(
            points(&record, Factor::CreditUtilization),
            expected,
            "utilization {ratio} should score {expected}"
        );
    }
}

#[test]
fn late_payment_bands() {
    let cases = [(0, 5.0), (1, 20.0), (2, 20.0), (3, 30.0), (40, 30.0)];
    for (count, expected) in cases {
        let record = CustomerRecord {
            late_payment_count: count,
            ..baseline()
        };
        assert_eq!(
            points(&record, Factor::LatePayments),
            expected,
            "{count} late payments should score {expected}"
        );
    }
}

#[test]
fn income_bands() {
    let cases = [
        (0.0, 15.0),
        (4_999_999.0, 15.0),
        (5_000_000.0, 10.0),
        (7_500_000.0, 10.0),
        (9_999_999.0, 10.0),
        (10_000_000.0, 3.0),
        (50_000_000.0, 3.0),
    ];
    for (income, expected) in cases {
        let record = CustomerRecord {
            income_level: income,
            ..baseline()
        };
        assert_eq!(
            points(&record, Factor::IncomeLevel),
            expected,
            "income {income} should score {expected}"
        );
    }
}

#[test]
fn payment_status_points() {
    let cases = [
        (PaymentStatus::Current, 5.0),
        (PaymentStatus::Late, 15.0),
        (PaymentStatus::Delinquent, 20.0),
    ];
    for (status, expected) in cases {
        let record = CustomerRecord {
            payment_status: status,
            ..baseline()
        };
        assert_eq!(
            points(&record, Factor::PaymentStatus),
            expected,
            "{status} should score {expected}"
        );
    }
}

#[test]
fn missed_payment_bands() {
    let cases = [(0, 2.0), (1, 7.0), (2, 7.0), (3, 10.0), (12, 10.0)];
    for (count, expected) in cases {
        let record = CustomerRecord {
            missed_payments_6m: count,
            ..baseline()
        };
        assert_eq!(
            points(&record, Factor::MissedPayments),
            expected,
            "{count} missed payments should score {expected}"
        );
    }
}

/// Factor scores come back in fixed order, carrying their raw value and weight.
#[test]
fn factor_scores_are_ordered_and_carry_inputs() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let record = CustomerRecord {
        payment_status: PaymentStatus::Late,
        late_payment_count: 2,
        ..baseline()
    };
    let result = engine.score(&record).unwrap();

    let order: Vec<Factor> = result.factor_scores.iter().map(|f| f.factor).collect();
    assert_eq!(order, Factor::ALL.to_vec());

    let weights: Vec<f64> = result.factor_scores.iter().map(|f| f.weight).collect();
    assert_eq!(weights, vec![0.25, 0.30, 0.15, 0.20, 0.10]);

    assert_eq!(result.factor_scores[0].raw_value, FactorValue::Amount(0.10));
    assert_eq!(result.factor_scores[1].raw_value, FactorValue::Amount(2.0));
    assert_eq!(
        result.factor_scores[3].raw_value,
        FactorValue::Status(PaymentStatus::Late)
    );
}

/// Points never exceed the factor's own cap.
#[test]
fn points_stay_within_factor_bounds() {
    let engine = ScoringEngine::with_defaults().unwrap();
    let caps = [25.0, 30.0, 15.0, 20.0, 10.0];
    for util in [0.0, 0.45, 3.0] {
        for late in [0, 2, 9] {
            for status in PaymentStatus::ALL {
                let record = CustomerRecord {
                    credit_utilization: util,
                    late_payment_count: late,
                    payment_status: status,
                    missed_payments_6m: late,
                    income_level: 1_000.0,
                    ..baseline()
                };
                let result = engine.score(&record).unwrap();
                for (score, cap) in result.factor_scores.iter().zip(caps) {
                    assert!(
                        score.points >= 0.0 && score.points <= cap,
                        "{} scored {} above cap {cap}",
                        score.factor,
                        score.points
                    );
                    assert_eq!(engine.config().max_points(score.factor), cap);
                }
            }
        }
    }
}
