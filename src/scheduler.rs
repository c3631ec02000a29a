//! # Greedy Meal Scheduler
//!
//! Builds a multi-day plan by simulating each day meal by meal against a
//! working copy of the ledger.
//!
//! ## Rules
//!
//! - A recipe is a candidate when its title was not used today or yesterday,
//!   every ingredient is fully covered by the working ledger and a trial
//!   deduction of its usage serves every record in full.
//! - Candidates rank by ingredient count plus a random jitter below 1, so the
//!   jitter only breaks ties between recipes of the same size.
//! - The chosen recipe is deducted at once, later slots see the reduced stock.
//! - A day that cannot fill every requested slot is dropped and planning stops.
//!
//! The caller hands over the ledger by value and gets back the plan together
//! with the ledger as it stands after the planned meals, so one base inventory
//! can be used for several planning attempts without aliasing.
//!
//! ## Usage
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use wastenot::ledger::InventoryLedger;
//! use wastenot::model::{MealSlot, Recipe};
//! use wastenot::scheduler::{GreedyMealScheduler, PlanTarget, ScheduleRequest};
//!
//! let mut ledger = InventoryLedger::new();
//! ledger.add_lot("Eggs", 6.0, "pcs", None);
//! let recipes = vec![
//!     Recipe::new("Fried eggs").with_ingredient("2 pcs Eggs"),
//!     Recipe::new("Scrambled eggs").with_ingredient("2 pcs Eggs"),
//! ];
//!
//! let request = ScheduleRequest::new(vec![MealSlot::Breakfast], PlanTarget::Days(3));
//! let outcome = GreedyMealScheduler::default().schedule(
//!     ledger,
//!     &recipes,
//!     &request,
//!     &mut StdRng::seed_from_u64(7),
//! );
//! assert_eq!(outcome.plan.len(), 3);
//! assert!(outcome.ledger.is_empty());
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::feasibility::{match_recipe, RecipeMatch};
use crate::ledger::InventoryLedger;
use crate::model::{
    MealSlot, PlanSource, Recipe, ScheduleDay, ScheduledMeal, SchedulePlan,
};

/// How many days to plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTarget {
    /// Exactly this many days, or fewer when stock runs out
    Days(u32),
    /// As many days as stock allows, up to the configured cap
    Dynamic,
}

/// What to plan
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    /// Slots to fill each day, in order; empty means the configured default
    pub meal_slots: Vec<MealSlot>,
    pub target: PlanTarget,
}

impl ScheduleRequest {
    pub fn new(meal_slots: Vec<MealSlot>, target: PlanTarget) -> Self {
        Self { meal_slots, target }
    }
}

/// Plan plus the ledger left after its meals
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub plan: SchedulePlan,
    pub ledger: InventoryLedger,
}

/// Day-by-day greedy scheduler
#[derive(Debug, Clone, Default)]
pub struct GreedyMealScheduler {
    config: PlannerConfig,
}

impl GreedyMealScheduler {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan with a seeded random source
    pub fn schedule_with_seed(
        &self,
        ledger: InventoryLedger,
        recipes: &[Recipe],
        request: &ScheduleRequest,
        seed: u64,
    ) -> ScheduleOutcome {
        self.schedule(ledger, recipes, request, &mut StdRng::seed_from_u64(seed))
    }

    /// Plan meals; infeasibility yields a shorter or empty plan, never an error
    pub fn schedule<R: Rng>(
        &self,
        ledger: InventoryLedger,
        recipes: &[Recipe],
        request: &ScheduleRequest,
        rng: &mut R,
    ) -> ScheduleOutcome {
        let slots = if request.meal_slots.is_empty() {
            self.config.default_meal_slots.clone()
        } else {
            request.meal_slots.clone()
        };
        let max_days = match request.target {
            PlanTarget::Days(days) => days,
            PlanTarget::Dynamic => self.config.dynamic_day_cap,
        };

        let mut ledger = ledger.with_epsilon(self.config.deduction_epsilon);
        let mut plan = SchedulePlan::new(PlanSource::Greedy);
        if slots.is_empty() {
            return ScheduleOutcome { plan, ledger };
        }

        let mut used_yesterday: HashSet<String> = HashSet::new();

        for day in 1..=max_days {
            let mut working = ledger.clone();
            let mut used_today: HashSet<String> = HashSet::new();
            let mut meals = Vec::with_capacity(slots.len());

            for &slot in &slots {
                let Some((recipe, matched)) =
                    self.pick(recipes, &working, &used_today, &used_yesterday, rng)
                else {
                    debug!(day, slot = %slot, "No feasible recipe left for slot");
                    break;
                };

                working.deduct(&matched.usage);
                used_today.insert(recipe.title.clone());
                meals.push(ScheduledMeal {
                    slot,
                    recipe: recipe.clone(),
                    usage: matched.usage,
                });
            }

            if meals.len() < slots.len() {
                info!(
                    day,
                    filled = meals.len(),
                    requested = slots.len(),
                    "Dropping incomplete day and stopping"
                );
                break;
            }

            info!(day, meals = meals.len(), "Planned day");
            ledger = working;
            used_yesterday = used_today;
            plan.days.push(ScheduleDay { day, meals });
        }

        ScheduleOutcome { plan, ledger }
    }

    /// Best feasible recipe not used today or yesterday
    fn pick<'a, R: Rng>(
        &self,
        recipes: &'a [Recipe],
        ledger: &InventoryLedger,
        used_today: &HashSet<String>,
        used_yesterday: &HashSet<String>,
        rng: &mut R,
    ) -> Option<(&'a Recipe, RecipeMatch)> {
        let jitter = self.config.effective_jitter();

        recipes
            .iter()
            .filter(|r| !used_today.contains(&r.title) && !used_yesterday.contains(&r.title))
            .filter_map(|r| {
                let matched = match_recipe(r, ledger);
                (matched.is_complete() && ledger.can_cover(&matched.usage)).then_some((r, matched))
            })
            .map(|(r, matched)| {
                let score = r.ingredients.len() as f64 + rng.gen::<f64>() * jitter;
                (score, r, matched)
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, r, matched)| (r, matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eggs(count: f64) -> InventoryLedger {
        let mut ledger = InventoryLedger::new();
        ledger.add_lot("Eggs", count, "pcs", None);
        ledger
    }

    fn breakfast(days: u32) -> ScheduleRequest {
        ScheduleRequest::new(vec![MealSlot::Breakfast], PlanTarget::Days(days))
    }

    #[test]
    fn test_prefers_larger_recipes() {
        let mut ledger = eggs(6.0);
        ledger.add_lot("Cheese", 200.0, "g", None);
        let recipes = vec![
            Recipe::new("Boiled eggs").with_ingredient("2 pcs Eggs"),
            Recipe::new("Cheese omelette")
                .with_ingredient("2 pcs Eggs")
                .with_ingredient("50 g Cheese"),
        ];
        let outcome = GreedyMealScheduler::default().schedule_with_seed(ledger, &recipes, &breakfast(1), 1);
        assert_eq!(outcome.plan.days[0].titles(), vec!["Cheese omelette"]);
    }

    #[test]
    fn test_zero_days_requested() {
        let recipes = vec![Recipe::new("Boiled eggs").with_ingredient("2 pcs Eggs")];
        let outcome = GreedyMealScheduler::default().schedule_with_seed(eggs(6.0), &recipes, &breakfast(0), 1);
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.ledger.availability("Eggs", "pcs"), 6.0);
    }

    #[test]
    fn test_incomplete_day_leaves_ledger_untouched() {
        let recipes = vec![
            Recipe::new("Boiled eggs").with_ingredient("2 pcs Eggs"),
            Recipe::new("Fried eggs").with_ingredient("2 pcs Eggs"),
        ];
        let request = ScheduleRequest::new(
            vec![MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner],
            PlanTarget::Days(2),
        );
        let outcome = GreedyMealScheduler::default().schedule_with_seed(eggs(6.0), &recipes, &request, 3);
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.ledger.availability("Eggs", "pcs"), 6.0);
    }

    #[test]
    fn test_empty_slots_use_default() {
        let recipes = vec![
            Recipe::new("A").with_ingredient("1 pcs Eggs"),
            Recipe::new("B").with_ingredient("1 pcs Eggs"),
            Recipe::new("C").with_ingredient("1 pcs Eggs"),
        ];
        let request = ScheduleRequest::new(Vec::new(), PlanTarget::Days(1));
        let outcome = GreedyMealScheduler::default().schedule_with_seed(eggs(3.0), &recipes, &request, 9);
        assert_eq!(outcome.plan.days[0].meals.len(), 3);
        assert!(outcome.ledger.is_empty());
    }
}
