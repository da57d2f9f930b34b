//! Spare part with stock level

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{InterventionId, Money, PartId};
use crate::error::InventoryError;
use crate::movement::{MovementKind, StockMovement};

#[derive(Debug, Clone)]
pub struct NewPart {
    pub reference: String,
    pub name: String,
    pub unit_price: Money,
    pub initial_stock: u32,
    pub min_stock_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub reference: String,
    pub name: String,
    pub unit_price: Money,
    pub stock_quantity: u32,
    /// Reorder threshold
    pub min_stock_level: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    pub fn create(request: NewPart, now: DateTime<Utc>) -> Result<Self, InventoryError> {
        let reference = request.reference.trim().to_uppercase();
        if reference.is_empty() {
            return Err(InventoryError::Validation("Part reference is required".into()));
        }
        if request.unit_price.is_negative() {
            return Err(InventoryError::Validation("Unit price cannot be negative".into()));
        }

        Ok(Self {
            id: PartId::new_v7(),
            reference,
            name: request.name,
            unit_price: request.unit_price,
            stock_quantity: request.initial_stock,
            min_stock_level: request.min_stock_level,
            created_at: now,
            updated_at: now,
        })
    }

    /// At or below the reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    /// Takes parts out of stock, for an intervention when given
    pub fn withdraw(
        &mut self,
        quantity: u32,
        intervention_id: Option<InterventionId>,
        now: DateTime<Utc>,
    ) -> Result<StockMovement, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::Validation("Quantity must be positive".into()));
        }
        let remaining = self
            .stock_quantity
            .checked_sub(quantity)
            .ok_or_else(|| InventoryError::InsufficientStock {
                reference: self.reference.clone(),
                requested: quantity,
                available: self.stock_quantity,
            })?;

        self.stock_quantity = remaining;
        self.updated_at = now;
        if self.is_low_stock() {
            warn!(
                part = %self.reference,
                stock = remaining,
                min = self.min_stock_level,
                "Part below reorder threshold"
            );
        }

        let movement = StockMovement::record(
            self.id,
            MovementKind::Out,
            -i64::from(quantity),
            remaining,
            now,
        );
        Ok(match intervention_id {
            Some(id) => movement.for_intervention(id),
            None => movement,
        })
    }

    pub fn restock(
        &mut self,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<StockMovement, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::Validation("Quantity must be positive".into()));
        }
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or_else(|| InventoryError::Validation("Stock quantity overflow".into()))?;
        self.updated_at = now;
        Ok(StockMovement::record(
            self.id,
            MovementKind::In,
            i64::from(quantity),
            self.stock_quantity,
            now,
        ))
    }

    /// Sets the counted quantity after a physical inventory
    pub fn adjust(&mut self, counted: u32, reason: &str, now: DateTime<Utc>) -> StockMovement {
        let delta = i64::from(counted) - i64::from(self.stock_quantity);
        self.stock_quantity = counted;
        self.updated_at = now;
        StockMovement::record(self.id, MovementKind::Adjustment, delta, counted, now)
            .with_reason(reason)
    }

    pub fn adjust_min_level(&mut self, level: u32, now: DateTime<Utc>) {
        self.min_stock_level = level;
        self.updated_at = now;
    }

    pub fn stock_value(&self) -> Money {
        self.unit_price.multiply(self.stock_quantity.into())
    }
}
