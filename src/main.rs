use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ipo_calc::config::Config;
use ipo_calc::data::{candidates_from_joined, IpoRest};
use ipo_calc::engine::{
    compare_strategies, evaluate_plans, quick_forecast, ComparatorAssumptions, EngineError, Plan,
    PlannerConfig, PlannerFinancing, TierOutcome,
};

const CONFIG_PATH: &str = "config.toml";

fn usage() -> ! {
    eprintln!(
        "usage:\n  \
         ipo-calc list [--watch]\n  \
         ipo-calc show <code> [shares-applied] [sell-price]\n  \
         ipo-calc plan <plans.toml>\n  \
         ipo-calc forecast <capital> <fee-rate-pct>"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::load(Path::new(CONFIG_PATH)) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err:#}; falling back to defaults");
            default_config()
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut args = args.iter().map(String::as_str);
    match args.next() {
        Some("list") => {
            let watch = matches!(args.next(), Some("--watch"));
            list_stocks(&config, watch).await
        }
        Some("show") => {
            let code = args.next().unwrap_or_else(|| usage());
            let shares_applied = args.next().map(parse_arg).transpose()?;
            let sell_price = args.next().map(parse_arg).transpose()?;
            show_stock(&config, code, shares_applied, sell_price).await
        }
        Some("plan") => {
            let path = args.next().unwrap_or_else(|| usage());
            run_plans(&config, Path::new(path))
        }
        Some("forecast") => {
            let capital: f64 = parse_arg(args.next().unwrap_or_else(|| usage()))?;
            let fee_rate_pct: f64 = parse_arg(args.next().unwrap_or_else(|| usage()))?;
            let forecast = quick_forecast(capital, fee_rate_pct / 100.0)?;
            println!("break-even uplift: {:.2}%", forecast.break_even_uplift_pct);
            println!("fee cost:          {:.2}", forecast.fee_cost);
            println!("expected return:   {:.2}", forecast.expected_return);
            Ok(())
        }
        _ => usage(),
    }
}

fn parse_arg(raw: &str) -> Result<f64> {
    raw.parse()
        .with_context(|| format!("not a number: {raw:?}"))
}

fn default_config() -> Config {
    toml::from_str(
        r#"
        [api]
        base_url = "http://localhost:3000"
        "#,
    )
    .expect("default config must parse")
}

async fn list_stocks(config: &Config, watch: bool) -> Result<()> {
    let rest = IpoRest::new(&config.api.base_url, config.api.request_timeout_ms);
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
        config.poll.stock_refresh_interval_s.max(1),
    ));
    loop {
        ticker.tick().await;
        let stocks = rest.get_stocks().await?;
        info!(count = stocks.len(), "fetched stock list");
        println!("{:<8} {:<20} {:>10} {:>10} {:>12}", "code", "name", "price", "lot", "deadline");
        for stock in &stocks {
            println!(
                "{:<8} {:<20} {:>10} {:>10} {:>12}",
                stock.code,
                stock.name,
                stock
                    .effective_issue_price()
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
                stock
                    .board_lot
                    .map_or_else(|| "-".to_string(), |l| format!("{l:.0}")),
                stock
                    .subscription_deadline
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
            );
        }
        if !watch {
            return Ok(());
        }
    }
}

async fn show_stock(
    config: &Config,
    code: &str,
    shares_applied: Option<f64>,
    sell_price: Option<f64>,
) -> Result<()> {
    let rest = IpoRest::new(&config.api.base_url, config.api.request_timeout_ms);
    let details = rest
        .get_tier_details(code)
        .await?
        .with_context(|| format!("stock {code} not found"))?;

    let issue_price = details
        .stock
        .effective_issue_price()
        .with_context(|| format!("stock {code} has no issue price yet"))?;
    let sell_price = sell_price.unwrap_or(issue_price);

    let candidates = candidates_from_joined(&details.tiers);
    let unpublished = candidates.iter().filter(|c| !c.stats.is_published()).count();
    if unpublished > 0 {
        warn!(
            count = unpublished,
            "tiers without published allocation results"
        );
    }

    let assumptions = ComparatorAssumptions {
        multiple: config.financing.multiple()?,
        annual_rate: config.financing.annual_rate(),
        holding_days: config.financing.holding_days,
        ..ComparatorAssumptions::default()
    };
    let comparison = compare_strategies(
        &candidates,
        issue_price,
        sell_price,
        shares_applied,
        config.matching.shares_epsilon,
        &assumptions,
    )?;

    println!(
        "{} ({}) - issue {:.2}, assumed sell {:.2}",
        details.stock.name, details.stock.code, issue_price, sell_price
    );
    println!(
        "{:<14} {:>10} {:>10} {:>12} {:>9} {:>12} {:>10}",
        "tier", "applied", "allocated", "net", "rate%", "expected", "break-even"
    );
    for row in &comparison.rows {
        let marker = if row.is_actual { " *" } else { "" };
        match &row.outcome {
            TierOutcome::Ready { allocated, result } => println!(
                "{:<14} {:>10.0} {:>10.0} {:>12.2} {:>9.2} {:>12.2} {:>10}{marker}",
                row.label,
                row.shares_applied,
                allocated,
                result.net_profit,
                result.return_rate,
                result.expected_value.unwrap_or_default(),
                result
                    .break_even_price
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.3}")),
            ),
            TierOutcome::Unavailable => println!(
                "{:<14} {:>10.0} {:>10} {:>12} {:>9} {:>12} {:>10}{marker}",
                row.label, row.shares_applied, "-", "-", "-", "unpublished", "-"
            ),
        }
    }
    if let Some(best) = comparison.best_expected_value {
        println!("best expected value: {}", comparison.rows[best].label);
    }
    if let Some(best) = comparison.best_return_rate {
        println!("best return rate:    {}", comparison.rows[best].label);
    }
    if let Some(best) = comparison.best_net_profit {
        println!("best net profit:     {}", comparison.rows[best].label);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct PlanFile {
    own_capital: f64,
    #[serde(default)]
    use_financing: bool,
    #[serde(rename = "plan", default)]
    plans: Vec<Plan>,
}

fn run_plans(config: &Config, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    let file: PlanFile = toml::from_str(&content).with_context(|| "Failed to parse plan TOML")?;

    let planner_config = PlannerConfig {
        financing: file.use_financing.then_some(PlannerFinancing {
            multiple: config.financing.multiple()?,
            annual_rate: config.financing.annual_rate(),
            holding_days: config.financing.holding_days,
        }),
    };

    match evaluate_plans(&file.plans, file.own_capital, &planner_config) {
        Ok(evaluation) => {
            println!(
                "{:<16} {:>14} {:>12} {:>12} {:>8} {:>7}",
                "plan", "capital used", "interest", "net", "rate%", "valid"
            );
            for result in &evaluation.results {
                println!(
                    "{:<16} {:>14.2} {:>12.2} {:>12.2} {:>8.2} {:>7}",
                    result.name,
                    result.capital_used,
                    result.financing_cost,
                    result.net_profit,
                    result.return_rate,
                    result.is_valid,
                );
            }
            println!("best plan: {}", evaluation.results[evaluation.best].name);
            Ok(())
        }
        Err(EngineError::NoValidPlan(rejections)) => {
            for rejection in &rejections {
                warn!(plan = %rejection.plan, reason = ?rejection.reason, "plan rejected");
            }
            anyhow::bail!("no plan satisfies the capital constraints")
        }
        Err(err) => Err(err.into()),
    }
}
