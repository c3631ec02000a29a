//! # Configuration Module
//!
//! Planner tuning knobs and environment-driven application settings.

use std::env;

use crate::errors::PlannerError;
use crate::ledger::DEDUCTION_EPSILON;
use crate::model::MealSlot;

/// Days planned when the target is dynamic and stock never runs out
pub const DEFAULT_DYNAMIC_DAY_CAP: u32 = 7;

/// Upper bound of the random tie-break added to a recipe's ingredient count
pub const DEFAULT_TIE_BREAK_JITTER: f64 = 0.5;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum number of days for a dynamic target
    pub dynamic_day_cap: u32,
    /// Jitter amplitude, kept below 1 so it only breaks ties
    pub tie_break_jitter: f64,
    /// Remaining amount at which a deduction stops
    pub deduction_epsilon: f64,
    /// Meal slots used when a request names none
    pub default_meal_slots: Vec<MealSlot>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            dynamic_day_cap: DEFAULT_DYNAMIC_DAY_CAP,
            tie_break_jitter: DEFAULT_TIE_BREAK_JITTER,
            deduction_epsilon: DEDUCTION_EPSILON,
            default_meal_slots: MealSlot::ALL.to_vec(),
        }
    }
}

impl PlannerConfig {
    /// Jitter clamped into `[0, 1)`
    pub fn effective_jitter(&self) -> f64 {
        if self.tie_break_jitter.is_finite() {
            self.tie_break_jitter.clamp(0.0, 0.999)
        } else {
            0.0
        }
    }
}

/// Settings read from the environment (and `.env`)
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub solver_url: Option<String>,
    /// Pins the scheduler's random source
    pub seed: Option<u64>,
    pub planner: PlannerConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read the environment
    pub fn from_env() -> Result<Self, PlannerError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut planner = PlannerConfig::default();

        if let Some(cap) = non_empty("PLANNER_DYNAMIC_DAY_CAP") {
            planner.dynamic_day_cap = cap
                .trim()
                .parse()
                .ok()
                .filter(|&days: &u32| days > 0)
                .ok_or_else(|| {
                    PlannerError::Config(format!("PLANNER_DYNAMIC_DAY_CAP must be a positive integer, got {cap}"))
                })?;
        }
        if let Some(jitter) = non_empty("PLANNER_TIE_BREAK_JITTER") {
            planner.tie_break_jitter = jitter.trim().parse().map_err(|_| {
                PlannerError::Config(format!("PLANNER_TIE_BREAK_JITTER must be a number, got {jitter}"))
            })?;
        }
        let seed = match non_empty("PLANNER_SEED") {
            Some(seed) => Some(seed.trim().parse().map_err(|_| {
                PlannerError::Config(format!("PLANNER_SEED must be an unsigned integer, got {seed}"))
            })?),
            None => None,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            solver_url: non_empty("SOLVER_URL"),
            seed,
            planner,
        })
    }
}
