//! # Weekly Plan Example
//!
//! Builds a small fridge, shows which recipes it can cook, plans a week of
//! lunches and dinners, then marks the first planned meal as eaten.

use chrono::{Duration, Local};
use wastenot::feasibility::recipe_book;
use wastenot::ledger::InventoryLedger;
use wastenot::model::{MealSlot, Recipe};
use wastenot::scheduler::{GreedyMealScheduler, PlanTarget, ScheduleRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🥕 Weekly Meal Plan Example");
    println!("===========================\n");

    let today = Local::now().date_naive();
    let in_days = |days: i64| Some(today + Duration::days(days));

    let mut fridge = InventoryLedger::new();
    fridge.add_lot("Spinach", 1.0, "bag", in_days(2));
    fridge.add_lot("Eggs", 12.0, "pieces", in_days(10));
    fridge.add_lot("Milk", 1.0, "l", in_days(4));
    fridge.add_lot("Milk", 500.0, "ml", in_days(1));
    fridge.add_lot("Rice", 1.0, "kg", None);
    fridge.add_lot("Chicken breast", 600.0, "g", in_days(3));
    fridge.add_lot("Feta", 200.0, "g", in_days(8));
    fridge.add_lot("Tomatoes", 6.0, "pcs", in_days(5));

    println!("📦 Stock, soonest-expiring first");
    println!("--------------------------------");
    for summary in fridge.aggregate() {
        let expiry = summary
            .earliest_expiry
            .map(|d| d.to_string())
            .unwrap_or_else(|| "no expiry".to_string());
        println!("  {:<16} {:>10}  ({})", summary.name, summary.total.to_string(), expiry);
    }

    let recipes = vec![
        Recipe::new("Spinach Omelette")
            .with_ingredient("3 pcs Eggs")
            .with_ingredient("0.5 bag Spinach")
            .with_ingredient("50 g Feta"),
        Recipe::new("Chicken Rice Bowl")
            .with_ingredient("200 g Chicken")
            .with_ingredient("150 g Rice")
            .with_ingredient("2 Tomatoes"),
        Recipe::new("Rice Pudding")
            .with_ingredient("100 g Rice")
            .with_ingredient("2 cups Milk"),
        Recipe::new("Shakshuka")
            .with_ingredient("3 eggs")
            .with_ingredient("3 pcs Tomatoes")
            .with_ingredient("30 g Feta"),
        Recipe::new("Salmon Teriyaki")
            .with_ingredient("300 g Salmon")
            .with_ingredient("1 tbsp Soy Sauce"),
    ];

    println!("\n📖 Recipe book");
    println!("--------------");
    for matched in recipe_book(&recipes, &fridge) {
        let missing = if matched.missing.is_empty() {
            String::new()
        } else {
            format!("  missing: {}", matched.missing.join(", "))
        };
        println!("  {:>3}%  {}{}", matched.match_percentage, matched.title, missing);
    }

    let request = ScheduleRequest::new(vec![MealSlot::Lunch, MealSlot::Dinner], PlanTarget::Dynamic);
    let outcome = GreedyMealScheduler::default().schedule_with_seed(fridge.clone(), &recipes, &request, 7);

    println!("\n🗓️  Plan ({} days)", outcome.plan.len());
    println!("----------------");
    print!("{}", outcome.plan);

    if let Some(first) = outcome.plan.days.first().and_then(|day| day.meals.first()) {
        println!("\n✅ Marking '{}' as eaten", first.recipe.title);
        for delta in fridge.consume(first) {
            println!(
                "  {} {}: {:.2} -> {:.2} {}{}",
                delta.lot_id,
                delta.item_name,
                delta.before,
                delta.after,
                delta.unit,
                if delta.removed { " (used up)" } else { "" }
            );
        }
    } else {
        println!("\nNot enough stock to plan a single full day.");
    }

    Ok(())
}
