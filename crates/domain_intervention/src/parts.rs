//! Parts consumed during an intervention

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PartId};

/// One line of parts consumption, priced when it was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartUsage {
    pub part_id: PartId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl PartUsage {
    pub fn new(part_id: PartId, quantity: u32, unit_price: Money) -> Self {
        Self {
            part_id,
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(Decimal::from(self.quantity))
    }
}
