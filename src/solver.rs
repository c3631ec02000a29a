//! # External Solver Interface
//!
//! Talks to the optimal (ILP) meal-plan solver service. The planning core does
//! not depend on it; this module only translates in both directions:
//!
//! - [`build_request`] turns a ledger and a recipe catalog into the solver's
//!   request payload, with the same validation the service applies.
//! - [`into_plan`] turns the solver's schedule back into a [`SchedulePlan`]
//!   whose meals carry usage records, so marking a meal eaten works the same
//!   whichever engine produced the plan.
//! - [`SolverClient`] posts requests to the service over HTTP.

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::errors::PlannerError;
use crate::feasibility::{is_cookable, match_recipe};
use crate::ledger::InventoryLedger;
use crate::model::{MealSlot, PlanSource, Recipe, ScheduleDay, ScheduledMeal, SchedulePlan};
use crate::units::convert;

/// Longest plan the solver accepts
pub const MAX_SOLVER_DAYS: u32 = 7;

/// Inventory entry as the solver sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverInventoryItem {
    pub qty: f64,
    /// Higher for stock expiring sooner
    pub expiry_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
}

/// Recipe as the solver sees it: amounts in the unit of the inventory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverRecipe {
    /// Index into the catalog the request was built from
    pub id: usize,
    pub title: String,
    pub ingredients: BTreeMap<String, f64>,
}

/// Payload for `POST /solve`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverRequest {
    pub inventory: BTreeMap<String, SolverInventoryItem>,
    pub recipes: Vec<SolverRecipe>,
    pub days: u32,
    pub meals: Vec<MealSlot>,
}

/// One meal in the solver's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverMeal {
    #[serde(rename = "type")]
    pub meal_type: String,
    #[serde(rename = "recipeId")]
    pub recipe_id: usize,
}

/// One day in the solver's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverDay {
    /// `"Day N"`
    pub day: String,
    pub meals: Vec<SolverMeal>,
}

/// Response of `POST /solve`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    /// `Optimal`, `Feasible`, `Infeasible` or `Error`
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub schedule: Vec<SolverDay>,
}

impl SolverResponse {
    /// Whether the schedule can be used
    pub fn is_solved(&self) -> bool {
        matches!(self.status.as_str(), "Optimal" | "Feasible")
    }
}

/// Weight of an item by days left: 7 for tomorrow down to 1 for a week or more
pub fn expiry_weight(days_until_expiry: Option<i64>) -> f64 {
    match days_until_expiry {
        Some(days) => (8 - days.clamp(1, 7)) as f64,
        None => 1.0,
    }
}

/// Build the solver payload from a ledger and a catalog
///
/// Only recipes that are cookable right now are sent; their ids are indexes
/// into `recipes`.
pub fn build_request(
    ledger: &InventoryLedger,
    recipes: &[Recipe],
    meals: &[MealSlot],
    days: u32,
    today: NaiveDate,
) -> Result<SolverRequest, PlannerError> {
    if days < 1 || days > MAX_SOLVER_DAYS {
        return Err(PlannerError::InvalidRequest(format!(
            "days must be between 1 and {MAX_SOLVER_DAYS}, got {days}"
        )));
    }
    if meals.is_empty() {
        return Err(PlannerError::InvalidRequest("no meal slots requested".to_string()));
    }
    if ledger.is_empty() {
        return Err(PlannerError::InvalidRequest("inventory is empty".to_string()));
    }

    let summaries = ledger.aggregate();
    let inventory: BTreeMap<String, SolverInventoryItem> = summaries
        .iter()
        .map(|summary| {
            let days_left = summary
                .earliest_expiry
                .map(|expiry| (expiry - today).num_days());
            (
                summary.name.clone(),
                SolverInventoryItem {
                    qty: summary.total.value,
                    expiry_weight: expiry_weight(days_left),
                    days_until_expiry: days_left,
                },
            )
        })
        .collect();

    let mut solver_recipes = Vec::new();
    for (id, recipe) in recipes.iter().enumerate() {
        if !is_cookable(recipe, ledger) {
            debug!(recipe = %recipe.title, "Leaving uncookable recipe out of solver request");
            continue;
        }

        let mut ingredients: BTreeMap<String, f64> = BTreeMap::new();
        for requirement in recipe.requirements() {
            let Some(required) = requirement.amount else {
                continue;
            };
            let Some(first) = ledger.matching_lots(&requirement.name).first().copied() else {
                continue;
            };
            let Some(summary) = summaries
                .iter()
                .find(|s| s.name.to_lowercase() == first.name.to_lowercase())
            else {
                continue;
            };
            let amount = convert(required.value, &required.unit, &summary.total.unit);
            *ingredients.entry(summary.name.clone()).or_insert(0.0) += amount;
        }

        solver_recipes.push(SolverRecipe {
            id,
            title: recipe.title.clone(),
            ingredients,
        });
    }

    if solver_recipes.is_empty() {
        return Err(PlannerError::InvalidRequest(
            "no recipe can be cooked from the current inventory".to_string(),
        ));
    }

    Ok(SolverRequest {
        inventory,
        recipes: solver_recipes,
        days,
        meals: meals.to_vec(),
    })
}

/// Turn a solver schedule into a plan with usage records
///
/// Usage is recomputed meal by meal against a working copy of `ledger`, in
/// plan order, so each meal names the lots it would actually draw from.
pub fn into_plan(
    response: &SolverResponse,
    recipes: &[Recipe],
    ledger: &InventoryLedger,
) -> Result<SchedulePlan, PlannerError> {
    if !response.is_solved() {
        return Err(PlannerError::Solver(match &response.message {
            Some(message) => format!("{}: {}", response.status, message),
            None => response.status.clone(),
        }));
    }

    let mut working = ledger.clone();
    let mut plan = SchedulePlan::new(PlanSource::Solver);

    for (index, solver_day) in response.schedule.iter().enumerate() {
        let day = parse_day_number(&solver_day.day).unwrap_or(index as u32 + 1);
        let mut meals = Vec::with_capacity(solver_day.meals.len());

        for solver_meal in &solver_day.meals {
            let slot: MealSlot = solver_meal
                .meal_type
                .parse()
                .map_err(PlannerError::Solver)?;
            let recipe = recipes.get(solver_meal.recipe_id).ok_or_else(|| {
                PlannerError::Solver(format!("unknown recipe id {}", solver_meal.recipe_id))
            })?;

            let matched = match_recipe(recipe, &working);
            if !matched.is_complete() {
                warn!(day, recipe = %recipe.title, "Solver planned a meal the inventory cannot fully cover");
            }
            working.deduct(&matched.usage);
            meals.push(ScheduledMeal {
                slot,
                recipe: recipe.clone(),
                usage: matched.usage,
            });
        }

        plan.days.push(ScheduleDay { day, meals });
    }

    Ok(plan)
}

fn parse_day_number(label: &str) -> Option<u32> {
    label.trim().strip_prefix("Day")?.trim().parse().ok()
}

/// HTTP client for the solver service
#[derive(Debug, Clone)]
pub struct SolverClient {
    base_url: String,
    http: Client,
}

impl SolverClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Ask the solver for a plan
    ///
    /// The service answers errors with a JSON body too, so the body is parsed
    /// whatever the status code.
    pub async fn solve(&self, request: &SolverRequest) -> Result<SolverResponse, PlannerError> {
        let url = format!("{}/solve", self.base_url);
        info!(
            url = %url,
            days = request.days,
            recipes = request.recipes.len(),
            "Sending plan request to solver"
        );

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<SolverResponse>(&body) {
            Ok(parsed) => {
                info!(status = %parsed.status, days = parsed.schedule.len(), "Solver answered");
                Ok(parsed)
            }
            Err(e) if status.is_success() => Err(PlannerError::Serialization(e)),
            Err(_) => Err(PlannerError::Solver(format!("HTTP {status}: {body}"))),
        }
    }

    /// Whether the service reports itself healthy
    pub async fn health(&self) -> Result<bool, PlannerError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: serde_json::Value = response.json().await?;
        Ok(body.get("status").and_then(|s| s.as_str()) == Some("ok"))
    }
}
