use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{DomainError, PartId};
use stockroom_parts::{InventorySummary, Movement, NewPart, Part, PartPatch, summarize};

/// Storage operation error.
///
/// Deterministic domain failures pass through unchanged; everything the
/// backing store cannot answer for (connection loss, protocol errors) becomes
/// `Unavailable` and is surfaced to the caller as a server error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Result type used across the storage layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable home of Part records, plus the movement processor.
///
/// Implementations must execute the OUT-direction check-then-decrement as a
/// single atomic operation against their backing storage; two concurrent OUT
/// movements may never drive stock negative.
#[async_trait]
pub trait PartStore: Send + Sync {
    /// All parts ordered by `name` ascending, ties broken by id.
    async fn list(&self) -> StoreResult<Vec<Part>>;

    /// Insert a new part.
    ///
    /// Fails with `Conflict` when the id (or qrCodeId, if supplied) is
    /// already taken, and with `Validation` when the materialized record
    /// breaks an invariant.
    async fn create(&self, new_part: NewPart) -> StoreResult<Part>;

    /// Merge the supplied patch fields into an existing record.
    ///
    /// `NotFound` when the id does not exist; `Validation` when the merged
    /// record would break an invariant or the patch is empty.
    async fn update(&self, id: &PartId, patch: PartPatch) -> StoreResult<Part>;

    /// Remove a record. Returns whether anything was removed; absence is not
    /// an error at this level.
    async fn delete(&self, id: &PartId) -> StoreResult<bool>;

    /// Apply a validated IN/OUT movement and return the post-update part.
    async fn apply_movement(&self, movement: Movement) -> StoreResult<Part>;

    /// Catalogue-wide status counts.
    async fn summary(&self) -> StoreResult<InventorySummary> {
        let parts = self.list().await?;
        Ok(summarize(&parts))
    }
}
