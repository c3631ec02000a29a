//! Planning request files read by the command-line planner.
//!
//! ```json
//! {
//!   "inventory": [{"id": 1, "name": "Eggs", "quantity": 6, "unit": "pcs", "expiry": "2024-05-10"}],
//!   "recipes": [{"title": "Omelette", "ingredients": ["3 pcs Eggs"]}],
//!   "meals": ["Breakfast"],
//!   "days": 3
//! }
//! ```
//!
//! `days` may be omitted for a dynamic plan and `meals` for the default slots.
//! When given, `days` must lie in `1..=7`, the same range the solver accepts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::PlannerError;
use crate::feasibility::RecipeMatch;
use crate::ledger::{InventoryLedger, StockSummary};
use crate::model::{InventoryRow, MealSlot, Recipe, SchedulePlan};
use crate::scheduler::{PlanTarget, ScheduleRequest};
use crate::solver::MAX_SOLVER_DAYS;

/// Input of one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub inventory: Vec<InventoryRow>,
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub meals: Vec<MealSlot>,
    #[serde(default)]
    pub days: Option<u32>,
    /// Reference date for expiry weighting, defaults to the local date
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl PlanningRequest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PlannerError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, PlannerError> {
        let request: Self = serde_json::from_str(content)?;
        request.validate()?;
        Ok(request)
    }

    /// Reject day targets outside `1..=MAX_SOLVER_DAYS`
    pub fn validate(&self) -> Result<(), PlannerError> {
        match self.days {
            Some(days) if days < 1 || days > MAX_SOLVER_DAYS => Err(PlannerError::InvalidRequest(
                format!("days must be between 1 and {MAX_SOLVER_DAYS}, got {days}"),
            )),
            _ => Ok(()),
        }
    }

    pub fn ledger(&self) -> InventoryLedger {
        InventoryLedger::from_rows(self.inventory.clone())
    }

    pub fn schedule_request(&self) -> ScheduleRequest {
        let target = match self.days {
            Some(days) => PlanTarget::Days(days),
            None => PlanTarget::Dynamic,
        };
        ScheduleRequest::new(self.meals.clone(), target)
    }
}

/// Output of one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningReport {
    pub recipe_book: Vec<RecipeMatch>,
    pub plan: SchedulePlan,
    /// Stock left once every planned meal is eaten
    pub remaining: Vec<StockSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_plan: Option<SchedulePlan>,
}
