//! # Recipe Feasibility
//!
//! Answers "can I cook this?" for a recipe against a ledger snapshot: a match
//! percentage, a per-ingredient table, the list of missing ingredients and the
//! usage records needed to deduct the recipe later.

use serde::{Deserialize, Serialize};

use crate::ledger::InventoryLedger;
use crate::model::{Quantity, Recipe, UsageRecord};

/// Availability of one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientStatus {
    pub name: String,
    /// `None` when the ingredient line has no readable amount
    pub required: Option<Quantity>,
    /// Available stock in the required unit, rounded to 2 decimals
    pub available_amount: f64,
    pub has_enough: bool,
}

/// Result of matching a recipe against the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMatch {
    pub title: String,
    /// 0 to 100; 100 only when every ingredient is covered
    pub match_percentage: u8,
    pub ingredients: Vec<IngredientStatus>,
    /// Ingredients with no matching stock at all, or no readable amount
    pub missing: Vec<String>,
    /// Required amounts keyed on the first matching lot's name
    pub usage: Vec<UsageRecord>,
}

impl RecipeMatch {
    /// Every ingredient is covered
    pub fn is_complete(&self) -> bool {
        !self.ingredients.is_empty() && self.ingredients.iter().all(|i| i.has_enough)
    }
}

/// Match a recipe against the ledger
pub fn match_recipe(recipe: &Recipe, ledger: &InventoryLedger) -> RecipeMatch {
    let mut ingredients = Vec::new();
    let mut missing = Vec::new();
    let mut usage = Vec::new();

    for requirement in recipe.requirements() {
        let Some(required) = requirement.amount else {
            missing.push(requirement.name.clone());
            ingredients.push(IngredientStatus {
                name: requirement.name,
                required: None,
                available_amount: 0.0,
                has_enough: false,
            });
            continue;
        };

        let lots = ledger.matching_lots(&requirement.name);
        let Some(first) = lots.first() else {
            missing.push(requirement.name.clone());
            ingredients.push(IngredientStatus {
                name: requirement.name,
                required: Some(required),
                available_amount: 0.0,
                has_enough: false,
            });
            continue;
        };

        let available = ledger.availability(&requirement.name, &required.unit);
        usage.push(UsageRecord {
            item_name: first.name.clone(),
            amount_used: required.clone(),
        });
        ingredients.push(IngredientStatus {
            name: requirement.name,
            has_enough: available >= required.value,
            required: Some(required),
            available_amount: round2(available),
        });
    }

    let satisfied = ingredients.iter().filter(|i| i.has_enough).count();
    RecipeMatch {
        title: recipe.title.clone(),
        match_percentage: match_percentage(satisfied, ingredients.len()),
        ingredients,
        missing,
        usage,
    }
}

/// Whether every ingredient is covered; recipes without ingredients never are
pub fn is_cookable(recipe: &Recipe, ledger: &InventoryLedger) -> bool {
    let requirements = recipe.requirements();
    !requirements.is_empty()
        && requirements.iter().all(|requirement| match &requirement.amount {
            Some(required) => {
                ledger.has_match(&requirement.name)
                    && ledger.availability(&requirement.name, &required.unit) >= required.value
            }
            None => false,
        })
}

/// Every recipe's match, best matches first, ties by title
pub fn recipe_book(recipes: &[Recipe], ledger: &InventoryLedger) -> Vec<RecipeMatch> {
    let mut matches: Vec<RecipeMatch> = recipes.iter().map(|r| match_recipe(r, ledger)).collect();
    matches.sort_by(|a, b| {
        b.match_percentage
            .cmp(&a.match_percentage)
            .then_with(|| a.title.cmp(&b.title))
    });
    matches
}

fn match_percentage(satisfied: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percentage = (100.0 * satisfied as f64 / total as f64).round() as u8;
    if satisfied < total {
        percentage.min(99)
    } else {
        percentage
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
