//! # Inventory Ledger
//!
//! Holds every stock lot for one user and is the only place quantities change.
//!
//! ## Allocation contract
//!
//! Lots matching an item name are always walked soonest-expiring first. Lots
//! without an expiry date come after every dated lot; ties break by lot id.
//! [`InventoryLedger::deduct`] consumes stock in that order, clamps at what is
//! available, removes emptied lots and reports what it actually took so a
//! persistence layer can mirror the change in one transaction.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use wastenot::ledger::InventoryLedger;
//! use wastenot::model::UsageRecord;
//!
//! let mut ledger = InventoryLedger::new();
//! ledger.add_lot("Milk", 100.0, "ml", NaiveDate::from_ymd_opt(2024, 5, 1));
//! ledger.add_lot("Milk", 200.0, "ml", NaiveDate::from_ymd_opt(2024, 5, 5));
//!
//! ledger.deduct(&[UsageRecord::new("Milk", 150.0, "ml")]);
//! assert_eq!(ledger.lots().len(), 1);
//! assert_eq!(ledger.availability("milk", "ml"), 150.0);
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::matching::{NameMatcher, SubstringMatcher};
use crate::model::{InventoryRow, LotId, Quantity, ScheduledMeal, StockLot, UsageRecord};
use crate::units::convert;

/// Remaining amount below which a deduction counts as fully served
pub const DEDUCTION_EPSILON: f64 = 0.001;

/// Change applied to one lot by a deduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotDelta {
    pub lot_id: LotId,
    pub item_name: String,
    /// Unit of the lot, all amounts below are in it
    pub unit: String,
    pub before: f64,
    pub deducted: f64,
    pub after: f64,
    /// The lot reached zero and left the ledger
    pub removed: bool,
}

/// Per-item totals across lots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub name: String,
    /// Sum of all lots, in the unit of the soonest-expiring lot
    pub total: Quantity,
    pub lot_count: usize,
    pub earliest_expiry: Option<NaiveDate>,
}

/// Stock lots for one user
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    lots: Vec<StockLot>,
    matcher: Arc<dyn NameMatcher>,
    epsilon: f64,
    next_id: i64,
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryLedger {
    /// Empty ledger with substring name matching
    pub fn new() -> Self {
        Self {
            lots: Vec::new(),
            matcher: Arc::new(SubstringMatcher),
            epsilon: DEDUCTION_EPSILON,
            next_id: 1,
        }
    }

    /// Build a ledger from existing lots, keeping their ids
    pub fn from_lots<I: IntoIterator<Item = StockLot>>(lots: I) -> Self {
        let mut ledger = Self::new();
        for lot in lots {
            ledger.insert_lot(lot);
        }
        ledger
    }

    /// Build a ledger from persisted inventory rows
    pub fn from_rows(rows: Vec<InventoryRow>) -> Self {
        Self::from_lots(rows.into_iter().map(StockLot::from))
    }

    /// Replace the name matching policy
    pub fn with_matcher<M: NameMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Replace the deduction stop threshold
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    /// Add a new lot; empty additions are ignored
    pub fn add_lot(
        &mut self,
        name: &str,
        quantity: f64,
        unit: &str,
        expiry: Option<NaiveDate>,
    ) -> Option<LotId> {
        let id = LotId(self.next_id);
        let lot = StockLot::new(id, name, Quantity::new(quantity, unit), expiry);
        self.insert_lot(lot)
    }

    /// Insert a lot with its own id; empty lots are ignored
    pub fn insert_lot(&mut self, lot: StockLot) -> Option<LotId> {
        if lot.quantity.is_zero() || lot.name.is_empty() {
            debug!(lot_id = %lot.id, name = %lot.name, "Ignoring empty stock lot");
            return None;
        }
        let id = lot.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.lots.push(lot);
        Some(id)
    }

    pub fn lots(&self) -> &[StockLot] {
        &self.lots
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn get(&self, id: LotId) -> Option<&StockLot> {
        self.lots.iter().find(|lot| lot.id == id)
    }

    pub fn matcher(&self) -> &dyn NameMatcher {
        self.matcher.as_ref()
    }

    /// Lots matching a name, soonest-expiring first
    pub fn matching_lots(&self, name: &str) -> Vec<&StockLot> {
        let mut lots: Vec<&StockLot> = self
            .lots
            .iter()
            .filter(|lot| self.matcher.matches(name, &lot.name))
            .collect();
        lots.sort_by(|a, b| fifo_order(a, b));
        lots
    }

    /// Whether any lot matches the name
    pub fn has_match(&self, name: &str) -> bool {
        self.lots
            .iter()
            .any(|lot| self.matcher.matches(name, &lot.name))
    }

    /// Total stock matching a name, expressed in `unit`
    pub fn availability(&self, name: &str, unit: &str) -> f64 {
        self.lots
            .iter()
            .filter(|lot| self.matcher.matches(name, &lot.name))
            .map(|lot| lot.quantity.to_unit(unit))
            .fold(0.0, |acc, v| acc + v)
    }

    /// Whether deducting `usage` would serve every record in full
    ///
    /// Runs the deduction on a copy, record by record, so records sharing
    /// stock or keyed on a narrower item name are caught.
    pub fn can_cover(&self, usage: &[UsageRecord]) -> bool {
        let mut trial = self.clone();
        usage.iter().all(|record| {
            let unit = &record.amount_used.unit;
            let served = trial
                .deduct(std::slice::from_ref(record))
                .iter()
                .map(|delta| convert(delta.deducted, &delta.unit, unit))
                .fold(0.0, |acc, v| acc + v);
            record.amount_used.value - served <= trial.epsilon
        })
    }

    /// One summary per distinct item name, soonest-expiring items first
    pub fn aggregate(&self) -> Vec<StockSummary> {
        let mut groups: BTreeMap<String, Vec<&StockLot>> = BTreeMap::new();
        for lot in &self.lots {
            groups.entry(lot.name.to_lowercase()).or_default().push(lot);
        }

        let mut summaries: Vec<StockSummary> = groups
            .into_values()
            .filter_map(|mut lots| {
                lots.sort_by(|a, b| fifo_order(a, b));
                let first = *lots.first()?;
                let unit = first.quantity.unit.clone();
                let total = lots
                    .iter()
                    .map(|lot| lot.quantity.to_unit(&unit))
                    .fold(0.0, |acc, v| acc + v);
                Some(StockSummary {
                    name: first.name.clone(),
                    total: Quantity::new(total, &unit),
                    lot_count: lots.len(),
                    earliest_expiry: first.expiry,
                })
            })
            .collect();

        summaries.sort_by(|a, b| {
            expiry_order(a.earliest_expiry, b.earliest_expiry).then_with(|| a.name.cmp(&b.name))
        });
        summaries
    }

    /// Lots expiring within `days` of `today` (already expired included),
    /// soonest first
    pub fn expiring_within(&self, today: NaiveDate, days: i64) -> Vec<&StockLot> {
        // Out-of-range windows cover every dated lot, or none when negative
        let horizon = Duration::try_days(days).and_then(|delta| today.checked_add_signed(delta));
        let mut lots: Vec<&StockLot> = self
            .lots
            .iter()
            .filter(|lot| match (lot.expiry, horizon) {
                (Some(expiry), Some(horizon)) => expiry <= horizon,
                (Some(_), None) => days > 0,
                (None, _) => false,
            })
            .collect();
        lots.sort_by(|a, b| fifo_order(a, b));
        lots
    }

    /// Consume stock for each usage record, soonest-expiring lots first
    ///
    /// Each lot gives `min(available, remaining)` converted into the lot's own
    /// unit. Emptied lots leave the ledger. Whatever cannot be served is
    /// dropped: the ledger never goes negative and the call never fails.
    pub fn deduct(&mut self, usage: &[UsageRecord]) -> Vec<LotDelta> {
        let mut deltas = Vec::new();

        for record in usage {
            let unit = record.amount_used.unit.clone();
            let mut remaining = record.amount_used.value;
            if remaining <= self.epsilon {
                continue;
            }

            let order: Vec<LotId> = self
                .matching_lots(&record.item_name)
                .into_iter()
                .map(|lot| lot.id)
                .collect();

            for id in order {
                let Some(lot) = self.lots.iter_mut().find(|lot| lot.id == id) else {
                    continue;
                };

                let available = lot.quantity.to_unit(&unit);
                if available <= 0.0 {
                    continue;
                }

                let taken = available.min(remaining);
                let before = lot.quantity.value;
                let after = if available - taken <= self.epsilon {
                    0.0
                } else {
                    (before - convert(taken, &unit, &lot.quantity.unit)).max(0.0)
                };
                lot.quantity.value = after;
                remaining -= taken;

                debug!(
                    lot_id = %lot.id,
                    item = %lot.name,
                    before,
                    after,
                    unit = %lot.quantity.unit,
                    "Deducted from stock lot"
                );

                deltas.push(LotDelta {
                    lot_id: lot.id,
                    item_name: lot.name.clone(),
                    unit: lot.quantity.unit.clone(),
                    before,
                    deducted: before - after,
                    after,
                    removed: after <= 0.0,
                });

                if remaining <= self.epsilon {
                    break;
                }
            }

            self.lots.retain(|lot| lot.quantity.value > 0.0);

            if remaining > self.epsilon {
                debug!(
                    item = %record.item_name,
                    unserved = remaining,
                    unit = %unit,
                    "Not enough stock, dropping the remainder"
                );
            }
        }

        deltas
    }

    /// Apply the usage of a planned meal ("mark eaten")
    pub fn consume(&mut self, meal: &ScheduledMeal) -> Vec<LotDelta> {
        self.deduct(&meal.usage)
    }
}

fn expiry_order(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn fifo_order(a: &StockLot, b: &StockLot) -> Ordering {
    expiry_order(a.expiry, b.expiry).then_with(|| a.id.cmp(&b.id))
}
