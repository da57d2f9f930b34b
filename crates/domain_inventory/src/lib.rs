//! Spare Parts Inventory Domain
//!
//! Stock never goes negative. Every change to a part's quantity produces a
//! [`StockMovement`], so the movement list replays to the current level.

pub mod part;
pub mod movement;
pub mod error;

pub use part::{NewPart, Part};
pub use movement::{MovementKind, StockMovement};
pub use error::InventoryError;
