//! # Solver Interface Tests
//!
//! Request building and plan translation, without a running solver.

use chrono::NaiveDate;
use wastenot::errors::PlannerError;
use wastenot::ledger::InventoryLedger;
use wastenot::model::{MealSlot, PlanSource, Recipe};
use wastenot::solver::{build_request, into_plan, SolverResponse};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn kitchen() -> (InventoryLedger, Vec<Recipe>) {
    let mut ledger = InventoryLedger::new();
    ledger.add_lot("Eggs", 6.0, "pcs", NaiveDate::from_ymd_opt(2024, 6, 2));
    ledger.add_lot("Milk", 1.0, "l", NaiveDate::from_ymd_opt(2024, 6, 20));
    ledger.add_lot("Flour", 1.0, "kg", None);

    let recipes = vec![
        Recipe::new("Salmon Bowl").with_ingredient("200 g Salmon"),
        Recipe::new("Pancakes")
            .with_ingredient("2 pcs Eggs")
            .with_ingredient("250 ml Milk")
            .with_ingredient("200 g Flour"),
        Recipe::new("Omelette").with_ingredient("3 pcs Eggs"),
    ];
    (ledger, recipes)
}

#[test]
fn test_request_carries_cookable_recipes_only() {
    let (ledger, recipes) = kitchen();
    let request = build_request(&ledger, &recipes, &[MealSlot::Breakfast], 3, today()).unwrap();

    let ids: Vec<usize> = request.recipes.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(request.days, 3);

    // amounts are expressed in the inventory entry's unit
    let pancakes = &request.recipes[0];
    assert_eq!(pancakes.ingredients["Milk"], 0.25);
    assert_eq!(pancakes.ingredients["Flour"], 0.2);
    assert_eq!(pancakes.ingredients["Eggs"], 2.0);
}

#[test]
fn test_request_weights_expiring_stock() {
    let (ledger, recipes) = kitchen();
    let request = build_request(&ledger, &recipes, &[MealSlot::Dinner], 1, today()).unwrap();

    assert_eq!(request.inventory["Eggs"].expiry_weight, 7.0);
    assert_eq!(request.inventory["Eggs"].days_until_expiry, Some(1));
    assert_eq!(request.inventory["Milk"].expiry_weight, 1.0);
    assert_eq!(request.inventory["Flour"].days_until_expiry, None);
}

#[test]
fn test_request_payload_shape() {
    let (ledger, recipes) = kitchen();
    let request = build_request(&ledger, &recipes, &[MealSlot::Lunch], 2, today()).unwrap();
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["meals"], serde_json::json!(["Lunch"]));
    assert_eq!(json["inventory"]["Eggs"]["qty"], 6.0);
    assert!(json["inventory"]["Flour"].get("days_until_expiry").is_none());
}

#[test]
fn test_request_validation() {
    let (ledger, recipes) = kitchen();

    for days in [0, 8] {
        let err = build_request(&ledger, &recipes, &[MealSlot::Lunch], days, today()).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRequest(_)));
    }

    let err = build_request(&ledger, &recipes, &[], 2, today()).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidRequest(_)));

    let err = build_request(&InventoryLedger::new(), &recipes, &[MealSlot::Lunch], 2, today())
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidRequest(_)));

    let err = build_request(&ledger, &recipes[..1], &[MealSlot::Lunch], 2, today()).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidRequest(_)));
}

#[test]
fn test_solver_schedule_becomes_a_plan() {
    let (ledger, recipes) = kitchen();
    let response: SolverResponse = serde_json::from_str(
        r#"{
            "status": "Optimal",
            "message": "Optimal solution found.",
            "schedule": [
                {"day": "Day 1", "meals": [{"type": "Breakfast", "recipeId": 2}]},
                {"day": "Day 2", "meals": [{"type": "Breakfast", "recipeId": 1}]}
            ]
        }"#,
    )
    .unwrap();

    let plan = into_plan(&response, &recipes, &ledger).unwrap();

    assert_eq!(plan.source, PlanSource::Solver);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.days[0].titles(), vec!["Omelette"]);
    let pancakes = plan.meal(2, MealSlot::Breakfast).unwrap();
    assert_eq!(pancakes.usage.len(), 3);

    // the ledger handed in is not touched
    assert_eq!(ledger.availability("Eggs", "pcs"), 6.0);
}

#[test]
fn test_solver_failures_surface_as_errors() {
    let (ledger, recipes) = kitchen();

    let infeasible: SolverResponse =
        serde_json::from_str(r#"{"status": "Infeasible", "message": "No feasible solution found."}"#)
            .unwrap();
    let err = into_plan(&infeasible, &recipes, &ledger).unwrap_err();
    assert!(err.to_string().contains("Infeasible"));

    let unknown: SolverResponse = serde_json::from_str(
        r#"{"status": "Feasible", "schedule": [{"day": "Day 1", "meals": [{"type": "Brunch", "recipeId": 1}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        into_plan(&unknown, &recipes, &ledger),
        Err(PlannerError::Solver(_))
    ));

    let out_of_range: SolverResponse = serde_json::from_str(
        r#"{"status": "Feasible", "schedule": [{"day": "Day 1", "meals": [{"type": "Lunch", "recipeId": 40}]}]}"#,
    )
    .unwrap();
    assert!(matches!(
        into_plan(&out_of_range, &recipes, &ledger),
        Err(PlannerError::Solver(_))
    ));
}
