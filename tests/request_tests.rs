use std::io::Write;
use tempfile::NamedTempFile;
use wastenot::errors::PlannerError;
use wastenot::feasibility::recipe_book;
use wastenot::model::MealSlot;
use wastenot::request::{PlanningReport, PlanningRequest};
use wastenot::scheduler::{GreedyMealScheduler, PlanTarget};

const REQUEST: &str = r#"{
    "inventory": [
        {"id": 1, "name": "Eggs", "quantity": 6, "unit": "pieces", "expiry": "2024-06-03"},
        {"id": 2, "name": "Spinach", "quantity": 1, "unit": "bag", "expiry": "2024-06-02"},
        {"id": 3, "name": "Feta", "quantity": 200, "unit": "g", "expiry": null}
    ],
    "recipes": [
        {"title": "Spinach Omelette", "ingredients": ["2 pcs Eggs", "0.5 bag Spinach"]},
        {"title": "Feta Scramble", "ingredients": ["2 pcs Eggs", "50 g Feta"], "cook_time": "10 min"},
        {"title": "Lasagna", "ingredients": ["500 g Pasta Sheets"]}
    ],
    "meals": ["Breakfast"],
    "days": 2,
    "today": "2024-06-01"
}"#;

#[test]
fn test_request_file_to_report() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(REQUEST.as_bytes())?;

    let request = PlanningRequest::from_path(file.path())?;
    assert_eq!(request.meals, vec![MealSlot::Breakfast]);
    assert_eq!(request.schedule_request().target, PlanTarget::Days(2));

    let ledger = request.ledger();
    assert_eq!(ledger.len(), 3);

    let book = recipe_book(&request.recipes, &ledger);
    assert_eq!(book.last().map(|m| m.title.as_str()), Some("Lasagna"));

    let outcome = GreedyMealScheduler::default().schedule_with_seed(
        ledger,
        &request.recipes,
        &request.schedule_request(),
        2024,
    );
    assert_eq!(outcome.plan.len(), 2);

    let report = PlanningReport {
        recipe_book: book,
        remaining: outcome.ledger.aggregate(),
        plan: outcome.plan,
        solver_plan: None,
    };
    let json = serde_json::to_value(&report)?;
    assert!(json.get("solver_plan").is_none());
    assert_eq!(json["plan"]["days"].as_array().map(|d| d.len()), Some(2));

    let eggs = report.remaining.iter().find(|s| s.name == "Eggs");
    assert_eq!(eggs.map(|s| s.total.value), Some(2.0));

    Ok(())
}

#[test]
fn test_missing_request_file() {
    let err = PlanningRequest::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, PlannerError::Io(_)));
}
