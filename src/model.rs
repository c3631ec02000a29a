//! # Planning Data Model
//!
//! Plain data shared by the ledger, the feasibility matcher and the scheduler.
//!
//! - **Quantity**: an amount with a canonical unit, never negative
//! - **StockLot**: one addition of stock for an item, with its own expiry date
//! - **UsageRecord**: what a recipe takes from the ledger
//! - **Recipe**: free-text ingredient lines plus opaque metadata
//! - **SchedulePlan**: days of meals, each meal carrying its usage records
//!
//! ## Usage
//!
//! ```rust
//! use wastenot::model::{Quantity, Recipe};
//!
//! let milk = Quantity::new(1.5, "Litres");
//! assert_eq!(milk.unit, "l");
//!
//! let omelette = Recipe::new("Omelette")
//!     .with_ingredient("3 pcs Eggs")
//!     .with_ingredient("50 ml Milk");
//! assert_eq!(omelette.ingredients.len(), 2);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::requirement::IngredientRequirement;
use crate::units::{convert, normalize_unit};

/// An amount in a canonical unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Amount, clamped to zero when negative or not finite
    pub value: f64,
    /// Canonical unit spelling
    pub unit: String,
}

impl Quantity {
    /// Create a quantity, normalizing the unit and clamping the value at zero
    pub fn new(value: f64, unit: &str) -> Self {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self {
            value,
            unit: normalize_unit(unit),
        }
    }

    /// Express this quantity in another unit
    pub fn to_unit(&self, unit: &str) -> f64 {
        convert(self.value, &self.unit, unit)
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.value <= 0.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.fract() == 0.0 {
            write!(f, "{} {}", self.value as i64, self.unit)
        } else {
            write!(f, "{:.2} {}", self.value, self.unit)
        }
    }
}

/// Stable identity of a stock lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(pub i64);

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One addition of stock for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLot {
    pub id: LotId,
    /// Item name as entered, matching is case-insensitive
    pub name: String,
    pub quantity: Quantity,
    /// `None` for items that do not expire
    pub expiry: Option<NaiveDate>,
}

impl StockLot {
    pub fn new(id: LotId, name: &str, quantity: Quantity, expiry: Option<NaiveDate>) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            quantity,
            expiry,
        }
    }

    /// Days from `today` until this lot expires, negative once expired
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry.map(|expiry| (expiry - today).num_days())
    }
}

/// An inventory row as the persistence layer hands it over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
}

impl From<InventoryRow> for StockLot {
    fn from(row: InventoryRow) -> Self {
        StockLot::new(
            LotId(row.id),
            &row.name,
            Quantity::new(row.quantity, &row.unit),
            row.expiry,
        )
    }
}

/// Amount a meal takes from a ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Name identifying the ledger entry, matched like any ingredient name
    pub item_name: String,
    pub amount_used: Quantity,
}

impl UsageRecord {
    pub fn new(item_name: &str, amount: f64, unit: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            amount_used: Quantity::new(amount, unit),
        }
    }
}

/// A recipe from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    /// Free-text lines of the form `<number> <unit> <name>`
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Recipe {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ingredients: Vec::new(),
            cook_time: None,
            instructions: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, line: &str) -> Self {
        self.ingredients.push(line.to_string());
        self
    }

    pub fn with_cook_time(mut self, cook_time: &str) -> Self {
        self.cook_time = Some(cook_time.to_string());
        self
    }

    pub fn with_instruction(mut self, step: &str) -> Self {
        self.instructions.push(step.to_string());
        self
    }

    /// Parsed ingredient requirements, in recipe order
    pub fn requirements(&self) -> Vec<IngredientRequirement> {
        self.ingredients
            .iter()
            .map(|line| IngredientRequirement::parse(line))
            .collect()
    }
}

/// Meal of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            other => Err(format!("unknown meal slot: {other}")),
        }
    }
}

/// One meal placed in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMeal {
    pub slot: MealSlot,
    pub recipe: Recipe,
    pub usage: Vec<UsageRecord>,
}

/// A fully planned day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    /// 1-based day number
    pub day: u32,
    pub meals: Vec<ScheduledMeal>,
}

impl ScheduleDay {
    pub fn label(&self) -> String {
        format!("Day {}", self.day)
    }

    /// Recipe titles planned for this day, in slot order
    pub fn titles(&self) -> Vec<&str> {
        self.meals.iter().map(|m| m.recipe.title.as_str()).collect()
    }
}

/// Engine that produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Greedy,
    Solver,
}

/// Multi-day meal plan, possibly shorter than requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub source: PlanSource,
    pub days: Vec<ScheduleDay>,
}

impl SchedulePlan {
    pub fn new(source: PlanSource) -> Self {
        Self {
            source,
            days: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// An empty plan means the inventory could not cover a single day
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Look up a planned meal
    pub fn meal(&self, day: u32, slot: MealSlot) -> Option<&ScheduledMeal> {
        self.days
            .iter()
            .find(|d| d.day == day)?
            .meals
            .iter()
            .find(|m| m.slot == slot)
    }
}

impl fmt::Display for SchedulePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days.is_empty() {
            return writeln!(f, "No meals planned: insufficient inventory");
        }
        for day in &self.days {
            writeln!(f, "{}:", day.label())?;
            for meal in &day.meals {
                writeln!(f, "  {:<9} {}", meal.slot.as_str(), meal.recipe.title)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_clamps_and_normalizes() {
        let qty = Quantity::new(-3.0, " Grams ");
        assert_eq!(qty.value, 0.0);
        assert_eq!(qty.unit, "g");
        assert!(qty.is_zero());

        assert_eq!(Quantity::new(f64::NAN, "g").value, 0.0);
        assert_eq!(Quantity::new(2.0, "kg").to_unit("g"), 2000.0);
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(format!("{}", Quantity::new(2.0, "pcs")), "2 pcs");
        assert_eq!(format!("{}", Quantity::new(0.5, "bag")), "0.50 bag");
    }

    #[test]
    fn test_lot_days_until_expiry() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let lot = StockLot::new(
            LotId(1),
            " Spinach ",
            Quantity::new(1.0, "bag"),
            NaiveDate::from_ymd_opt(2024, 5, 3),
        );
        assert_eq!(lot.name, "Spinach");
        assert_eq!(lot.days_until_expiry(today), Some(2));
    }

    #[test]
    fn test_meal_slot_parsing() {
        assert_eq!("breakfast".parse::<MealSlot>(), Ok(MealSlot::Breakfast));
        assert_eq!(" Dinner ".parse::<MealSlot>(), Ok(MealSlot::Dinner));
        assert!("brunch".parse::<MealSlot>().is_err());
    }

    #[test]
    fn test_recipe_builder() {
        let recipe = Recipe::new("Pancakes")
            .with_ingredient("2 pcs Eggs")
            .with_ingredient("200 g Flour")
            .with_cook_time("20 min")
            .with_instruction("Whisk everything");
        assert_eq!(recipe.requirements().len(), 2);
        assert_eq!(recipe.cook_time.as_deref(), Some("20 min"));
    }

    #[test]
    fn test_empty_plan_display() {
        let plan = SchedulePlan::new(PlanSource::Greedy);
        assert!(plan.is_empty());
        assert!(format!("{}", plan).contains("insufficient inventory"));
    }
}
