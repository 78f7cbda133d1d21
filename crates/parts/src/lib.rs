//! Parts domain module.
//!
//! This crate contains business rules for the spare-parts catalogue,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod movement;
pub mod part;
pub mod status;

pub use movement::{Movement, MovementDirection};
pub use part::{
    DEFAULT_CATEGORY, DEFAULT_CRITICAL_THRESHOLD, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_UNIT,
    NewPart, Part, PartPatch,
};
pub use status::{InventorySummary, StockStatus, summarize};
