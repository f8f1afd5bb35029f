//! score-runner: headless batch scoring for synthetic card portfolios.
//!
//! Usage:
//!   score-runner --seed 42 --customers 1000 --db scores.db
//!   score-runner --config data/scoring_policy.json --medium-min 10 --high-min 18
//!   score-runner --seed 7 --customers 50 --json

use anyhow::{Context, Result};
use cardrisk_core::{
    classifier::RiskTier,
    config::ScoringConfig,
    engine::{ScoringEngine, ScoringResult},
    population::{
        clean_population, derive_profiles, generate_population, CleaningReport, CustomerProfile,
    },
    portfolio::PortfolioSummary,
    store::ScoreStore,
};
use std::env;

const TOP_N: usize = 10;

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    policy_id: &'a str,
    summary: &'a PortfolioSummary,
    results: &'a [ScoringResult],
    profiles: &'a [CustomerProfile],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64)?;
    let customers = parse_arg(&args, "--customers", 1000usize)?;
    let workers = parse_arg(&args, "--workers", 1usize)?;
    let json_mode = args.iter().any(|a| a == "--json");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");

    let mut config = match string_arg(&args, "--config") {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };
    if let Some(v) = optional_arg::<f64>(&args, "--medium-min")? {
        config.tiers.medium_min = v;
    }
    if let Some(v) = optional_arg::<f64>(&args, "--high-min")? {
        config.tiers.high_min = v;
    }

    if !json_mode {
        println!("Card Risk Scoring: score-runner");
        println!("  seed:       {seed}");
        println!("  customers:  {customers}");
        println!("  policy:     {}", config.policy_id);
        println!("  db:         {db}");
        println!();
    }

    let engine = ScoringEngine::new(config)?;

    let raw = generate_population(seed, customers);
    let (records, cleaning) = clean_population(&raw)?;
    let profiles = derive_profiles(&raw, &records)?;
    let results = engine.score_all_parallel(&records, workers)?;
    let summary = PortfolioSummary::build_with_profiles(&records, &results, &profiles)?;

    let store = ScoreStore::open(db)?;
    store.migrate()?;
    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, Some(seed), engine.config(), env!("CARGO_PKG_VERSION"))?;
    store.insert_results(&run_id, &results)?;
    log::info!("Persisted run {run_id} to {db}");

    if json_mode {
        let report = JsonReport {
            run_id: &run_id,
            policy_id: &engine.config().policy_id,
            summary: &summary,
            results: &results,
            profiles: &profiles,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&engine, &store, &run_id, &cleaning, &summary)?;
    }

    Ok(())
}

fn print_summary(
    engine: &ScoringEngine,
    store: &ScoreStore,
    run_id: &str,
    cleaning: &CleaningReport,
    summary: &PortfolioSummary,
) -> Result<()> {
    let stored = store.result_count(run_id)?;
    let tier_counts = store.tier_counts(run_id)?;

    println!("=== CLEANING ===");
    match cleaning.median_income {
        Some(median) => println!(
            "  incomes filled:     {} (median {median:.0})",
            cleaning.incomes_filled
        ),
        None => println!("  incomes filled:     0"),
    }
    println!("  utilization capped: {}", cleaning.utilization_capped);
    println!();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {run_id}");
    println!("  customers:     {}", summary.customers);
    println!("  stored:        {stored}");
    println!(
        "  score range:   {:.2} - {:.2} (policy max {:.2})",
        summary.min_score,
        summary.max_score,
        engine.config().max_achievable_score()
    );
    println!("  mean score:    {:.2}", summary.mean_score);
    println!("  median score:  {:.2}", summary.median_score);
    println!();

    let kpis = &summary.kpis;
    println!("=== KPIs ===");
    println!("  avg risk score:  {:.2}", kpis.avg_score);
    println!("  avg utilization: {:.1}%", kpis.avg_utilization * 100.0);
    println!("  low risk:        {:.1}% ({})", kpis.low_pct, kpis.low_flag.as_str());
    println!("  high risk:       {:.1}% ({})", kpis.high_pct, kpis.high_flag.as_str());
    println!();

    println!("=== RISK TIERS ===");
    for tier in RiskTier::ALL {
        let Some(stats) = summary.tier(tier) else {
            continue;
        };
        let persisted = tier_counts.get(&tier).copied().unwrap_or(0);
        println!(
            "  {:<12} | {:>5} customers ({:>5.1}%) | stored {:>5} | Avg score: {:.2} | Avg income: {:.0} | Avg util: {:.1}% | Avg late: {:.2}",
            tier.label(),
            stats.count,
            stats.share_pct,
            persisted,
            stats.avg_score,
            stats.avg_income,
            stats.avg_utilization * 100.0,
            stats.avg_late_payments
        );
        if let Some(spending) = stats.avg_monthly_spending {
            println!("  {:<12} | Avg monthly spending: {spending:.0}", tier.label());
        }
    }
    println!();

    println!("=== TOP {TOP_N} HIGHEST RISK ===");
    print_top(&store.top_results(run_id, None, TOP_N)?);
    for tier in RiskTier::ALL {
        let top = store.top_results(run_id, Some(tier), TOP_N)?;
        if top.is_empty() {
            continue;
        }
        println!("  -- {} --", tier.label());
        print_top(&top);
    }
    println!();

    println!("=== RECOMMENDATIONS ===");
    for tier in RiskTier::ALL {
        println!("  {}: {}", tier.label(), tier.headline());
        for action in tier.recommendations() {
            println!("    - {action}");
        }
    }
    Ok(())
}

fn print_top(results: &[ScoringResult]) {
    for r in results {
        println!(
            "    {:<10} {:>6.2}  {}",
            r.customer_id,
            r.total_score,
            r.tier.label()
        );
    }
}

fn parse_arg<T>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(optional_arg(args, flag)?.unwrap_or(default))
}

/// `None` when `flag` is absent; an error when its value does not parse.
fn optional_arg<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    string_arg(args, flag)
        .map(|v| {
            v.parse()
                .with_context(|| format!("invalid value '{v}' for {flag}"))
        })
        .transpose()
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
