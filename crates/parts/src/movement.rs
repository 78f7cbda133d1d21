use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, PartId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementDirection {
    /// Restock: stock increases, the last-restock timestamp advances.
    #[serde(rename = "IN")]
    In,
    /// Consumption: stock decreases, rejected when it would go negative.
    #[serde(rename = "OUT")]
    Out,
}

/// A single validated IN/OUT adjustment to one part's stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub part_id: PartId,
    pub quantity: i64,
    pub direction: MovementDirection,
    /// Caller-supplied annotation. Logged with the request, never persisted.
    pub note: Option<String>,
}

impl Movement {
    /// Validates the preconditions that hold before storage is touched.
    pub fn new(part_id: PartId, quantity: i64, direction: MovementDirection) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        Ok(Self {
            part_id,
            quantity,
            direction,
            note: None,
        })
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}
