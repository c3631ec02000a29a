//! # WasteNot Kitchen Planner
//!
//! Inventory-aware meal planning: unit conversion, FIFO stock allocation,
//! recipe feasibility and a greedy multi-day scheduler, plus thin adapters for
//! Postgres persistence and an external ILP solver.

pub mod config;
pub mod errors;
pub mod feasibility;
pub mod ledger;
pub mod matching;
pub mod model;
pub mod request;
pub mod requirement;
pub mod scheduler;
pub mod solver;
pub mod store;
pub mod units;
