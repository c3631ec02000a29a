//! # Inventory Store
//!
//! Postgres-backed adapter over [`InventoryLedger`]. Deductions read the
//! user's rows with `FOR UPDATE`, run the in-memory FIFO deduction and write
//! the resulting updates and deletions back in the same transaction, so two
//! concurrent "mark eaten" calls for one user cannot draw on the same lot twice.

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::errors::PlannerError;
use crate::ledger::{InventoryLedger, LotDelta};
use crate::model::{InventoryRow, LotId, ScheduledMeal, UsageRecord};
use crate::units::normalize_unit;

#[derive(Debug, FromRow)]
struct LotRow {
    id: i64,
    name: String,
    quantity: f64,
    unit: String,
    expiry: Option<NaiveDate>,
}

impl From<LotRow> for InventoryRow {
    fn from(row: LotRow) -> Self {
        InventoryRow {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
            expiry: row.expiry,
        }
    }
}

/// Inventory persisted in Postgres, one ledger per user
#[derive(Debug, Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `database_url`
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to inventory database")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the inventory table if missing
    pub async fn init_schema(&self) -> Result<(), PlannerError> {
        info!("Initializing inventory schema...");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS inventory_lots (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL,
                name TEXT NOT NULL,
                quantity DOUBLE PRECISION NOT NULL CHECK (quantity >= 0),
                unit TEXT NOT NULL,
                expiry DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_inventory_lots_user_expiry
             ON inventory_lots (user_id, expiry)",
        )
        .execute(&self.pool)
        .await?;

        info!("Inventory schema initialized successfully");
        Ok(())
    }

    /// Persist a new lot
    pub async fn add_lot(
        &self,
        user_id: i64,
        name: &str,
        quantity: f64,
        unit: &str,
        expiry: Option<NaiveDate>,
    ) -> Result<LotId, PlannerError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(PlannerError::InvalidRequest(format!(
                "lot quantity must be positive, got {quantity}"
            )));
        }
        if name.trim().is_empty() {
            return Err(PlannerError::InvalidRequest("lot name is empty".to_string()));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO inventory_lots (user_id, name, quantity, unit, expiry)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(name.trim())
        .bind(quantity)
        .bind(normalize_unit(unit))
        .bind(expiry)
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id, lot_id = id, name = %name, "Stored stock lot");
        Ok(LotId(id))
    }

    /// All rows for a user, soonest-expiring first
    pub async fn load_rows(&self, user_id: i64) -> Result<Vec<InventoryRow>, PlannerError> {
        let rows: Vec<LotRow> = sqlx::query_as(
            "SELECT id, name, quantity, unit, expiry
             FROM inventory_lots
             WHERE user_id = $1
             ORDER BY expiry ASC NULLS LAST, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InventoryRow::from).collect())
    }

    /// Snapshot of a user's inventory as a ledger
    pub async fn load_ledger(&self, user_id: i64) -> Result<InventoryLedger, PlannerError> {
        Ok(InventoryLedger::from_rows(self.load_rows(user_id).await?))
    }

    /// Deduct usage from a user's inventory in one transaction
    ///
    /// Touched rows are updated, rows that reach zero are deleted. Either all
    /// changes land or none do.
    pub async fn deduct(
        &self,
        user_id: i64,
        usage: &[UsageRecord],
    ) -> Result<Vec<LotDelta>, PlannerError> {
        let mut tx = self.pool.begin().await?;
        debug!(user_id, records = usage.len(), "Began deduction transaction");

        let rows: Vec<LotRow> = sqlx::query_as(
            "SELECT id, name, quantity, unit, expiry
             FROM inventory_lots
             WHERE user_id = $1
             ORDER BY id
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut ledger = InventoryLedger::from_rows(rows.into_iter().map(InventoryRow::from).collect());
        let deltas = ledger.deduct(usage);

        let touched: BTreeSet<LotId> = deltas.iter().map(|delta| delta.lot_id).collect();
        for id in &touched {
            match ledger.get(*id) {
                Some(lot) => {
                    sqlx::query("UPDATE inventory_lots SET quantity = $1 WHERE id = $2 AND user_id = $3")
                        .bind(lot.quantity.value)
                        .bind(id.0)
                        .bind(user_id)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    sqlx::query("DELETE FROM inventory_lots WHERE id = $1 AND user_id = $2")
                        .bind(id.0)
                        .bind(user_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        info!(
            user_id,
            lots_touched = touched.len(),
            deltas = deltas.len(),
            "Committed inventory deduction"
        );

        Ok(deltas)
    }

    /// Apply a planned meal's usage to the stored inventory
    pub async fn mark_meal_eaten(
        &self,
        user_id: i64,
        meal: &ScheduledMeal,
    ) -> Result<Vec<LotDelta>, PlannerError> {
        info!(user_id, recipe = %meal.recipe.title, slot = %meal.slot, "Marking meal eaten");
        self.deduct(user_id, &meal.usage).await
    }
}
