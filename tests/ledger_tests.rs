//! # Inventory Ledger Tests
//!
//! FIFO deduction, conservation of stock and lot lifecycle.

use chrono::NaiveDate;
use wastenot::ledger::InventoryLedger;
use wastenot::model::{InventoryRow, LotId, MealSlot, Recipe, ScheduledMeal, UsageRecord};

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 6, d)
}

fn total(ledger: &InventoryLedger, name: &str, unit: &str) -> f64 {
    ledger.availability(name, unit)
}

#[test]
fn test_milk_deducted_oldest_first() {
    let mut ledger = InventoryLedger::new();
    let day_one = ledger.add_lot("Milk", 100.0, "ml", day(1)).unwrap();
    let day_five = ledger.add_lot("Milk", 200.0, "ml", day(5)).unwrap();

    let deltas = ledger.deduct(&[UsageRecord::new("Milk", 150.0, "ml")]);

    assert!(ledger.get(day_one).is_none());
    assert_eq!(ledger.get(day_five).unwrap().quantity.value, 150.0);
    assert_eq!(deltas.iter().map(|d| d.deducted).sum::<f64>(), 150.0);
}

#[test]
fn test_insertion_order_does_not_matter() {
    let mut ledger = InventoryLedger::new();
    let late = ledger.add_lot("Yogurt", 2.0, "pcs", day(20)).unwrap();
    let early = ledger.add_lot("Yogurt", 2.0, "pcs", day(2)).unwrap();

    ledger.deduct(&[UsageRecord::new("yogurt", 3.0, "pcs")]);

    assert!(ledger.get(early).is_none());
    assert_eq!(ledger.get(late).unwrap().quantity.value, 1.0);
}

#[test]
fn test_satisfiable_deduction_conserves_stock() {
    let mut ledger = InventoryLedger::new();
    ledger.add_lot("Flour", 1.0, "kg", day(10));
    ledger.add_lot("Flour", 500.0, "g", day(3));
    ledger.add_lot("Butter", 250.0, "g", day(8));
    ledger.add_lot("Milk", 1.0, "l", day(4));

    let usage = vec![
        UsageRecord::new("Flour", 700.0, "g"),
        UsageRecord::new("Butter", 0.1, "kg"),
        UsageRecord::new("Milk", 2.0, "cup"),
    ];
    let before = [
        total(&ledger, "Flour", "g"),
        total(&ledger, "Butter", "g"),
        total(&ledger, "Milk", "ml"),
    ];

    ledger.deduct(&usage);

    let after = [
        total(&ledger, "Flour", "g"),
        total(&ledger, "Butter", "g"),
        total(&ledger, "Milk", "ml"),
    ];
    let requested = [700.0, 100.0, 480.0];
    for i in 0..3 {
        assert!((before[i] - requested[i] - after[i]).abs() < 1e-6, "item {i}");
    }
    assert!(ledger.lots().iter().all(|lot| lot.quantity.value > 0.0));
}

#[test]
fn test_underflow_never_goes_negative() {
    let mut ledger = InventoryLedger::new();
    ledger.add_lot("Rice", 300.0, "g", day(30));
    ledger.add_lot("Rice", 200.0, "g", day(15));

    let deltas = ledger.deduct(&[UsageRecord::new("Rice", 2.0, "kg")]);

    assert!(ledger.is_empty());
    assert_eq!(deltas.len(), 2);
    assert!(deltas.iter().all(|d| d.removed && d.after == 0.0));
}

#[test]
fn test_lots_without_expiry_are_used_last() {
    let mut ledger = InventoryLedger::new();
    let pantry = ledger.add_lot("Salt", 500.0, "g", None).unwrap();
    let dated = ledger.add_lot("Salt", 10.0, "g", day(12)).unwrap();

    ledger.deduct(&[UsageRecord::new("Salt", 15.0, "g")]);

    assert!(ledger.get(dated).is_none());
    assert_eq!(ledger.get(pantry).unwrap().quantity.value, 495.0);
}

#[test]
fn test_spinach_half_bags() {
    let mut ledger = InventoryLedger::new();
    ledger.add_lot("Spinach", 1.0, "bag", day(2));

    ledger.deduct(&[UsageRecord::new("Spinach", 0.5, "bag")]);
    assert_eq!(total(&ledger, "Spinach", "bag"), 0.5);

    ledger.deduct(&[UsageRecord::new("Spinach", 0.5, "bag")]);
    assert!(ledger.is_empty());
}

#[test]
fn test_consume_meal_and_rows() {
    let rows = vec![
        InventoryRow {
            id: 10,
            name: "Eggs".to_string(),
            quantity: 6.0,
            unit: "pieces".to_string(),
            expiry: day(9),
        },
        InventoryRow {
            id: 11,
            name: "Cheddar cheese".to_string(),
            quantity: 0.2,
            unit: "kg".to_string(),
            expiry: day(14),
        },
    ];
    let mut ledger = InventoryLedger::from_rows(rows);
    let meal = ScheduledMeal {
        slot: MealSlot::Breakfast,
        recipe: Recipe::new("Cheese omelette"),
        usage: vec![
            UsageRecord::new("Eggs", 3.0, "pcs"),
            UsageRecord::new("Cheddar cheese", 50.0, "g"),
        ],
    };

    let deltas = ledger.consume(&meal);

    assert_eq!(deltas.len(), 2);
    assert_eq!(ledger.get(LotId(10)).unwrap().quantity.value, 3.0);
    assert!((ledger.get(LotId(11)).unwrap().quantity.value - 0.15).abs() < 1e-9);
    assert_eq!(deltas[1].unit, "kg");
}
