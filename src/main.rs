use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wastenot::config::AppConfig;
use wastenot::errors::PlannerError;
use wastenot::feasibility::recipe_book;
use wastenot::ledger::InventoryLedger;
use wastenot::model::{MealSlot, SchedulePlan};
use wastenot::request::{PlanningReport, PlanningRequest};
use wastenot::scheduler::GreedyMealScheduler;
use wastenot::solver::{build_request, into_plan, SolverClient};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

    // Logs go to stderr, the report goes to stdout
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Ask the external solver for an alternative plan
async fn solve_externally(
    url: &str,
    request: &PlanningRequest,
    ledger: &InventoryLedger,
    slots: &[MealSlot],
    days: u32,
    today: NaiveDate,
) -> Result<SchedulePlan, PlannerError> {
    let payload = build_request(ledger, &request.recipes, slots, days, today)?;
    let response = SolverClient::new(url).solve(&payload).await?;
    into_plan(&response, &request.recipes, ledger)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the log filter reads RUST_LOG
    let config = AppConfig::from_env().context("Invalid planner configuration")?;
    init_logging();

    let path = env::args()
        .nth(1)
        .context("Usage: wastenot <request.json>")?;

    info!("Loading planning request from: {}", path);
    let request = PlanningRequest::from_path(&path)
        .with_context(|| format!("Failed to read planning request '{}'", path))?;

    let ledger = request.ledger();
    let book = recipe_book(&request.recipes, &ledger);

    let scheduler = GreedyMealScheduler::new(config.planner.clone());
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = scheduler.schedule(
        ledger.clone(),
        &request.recipes,
        &request.schedule_request(),
        &mut rng,
    );

    if outcome.plan.is_empty() {
        warn!("Insufficient inventory to plan a single full day");
    } else {
        info!(days = outcome.plan.len(), "Greedy plan ready");
    }

    let solver_plan = match &config.solver_url {
        Some(url) => {
            let today = request.today.unwrap_or_else(|| Local::now().date_naive());
            let slots = if request.meals.is_empty() {
                config.planner.default_meal_slots.clone()
            } else {
                request.meals.clone()
            };
            let days = request.days.unwrap_or(config.planner.dynamic_day_cap);

            let solved = solve_externally(url, &request, &ledger, &slots, days, today).await;

            match solved {
                Ok(plan) => Some(plan),
                Err(e) => {
                    warn!(error = %e, "Solver plan unavailable, keeping the greedy plan only");
                    None
                }
            }
        }
        None => None,
    };

    let report = PlanningReport {
        recipe_book: book,
        remaining: outcome.ledger.aggregate(),
        plan: outcome.plan,
        solver_plan,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize planning report")?
    );

    Ok(())
}
