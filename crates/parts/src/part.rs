use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, PartId};

use crate::status::StockStatus;

pub const DEFAULT_UNIT: &str = "unit";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_CRITICAL_THRESHOLD: i64 = 3;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 8;

/// A tracked inventory item with a stock count and threshold-based status.
///
/// Field names serialize in camelCase; that is the wire contract the admin UI
/// was built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: PartId,
    pub qr_code_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub stock: i64,
    pub critical_threshold: i64,
    pub low_stock_threshold: i64,
    pub location: Option<String>,
    pub image: Option<String>,
    pub vendor: Option<String>,
    pub category: String,
    /// Updated on every IN movement.
    pub last_restocked_at: DateTime<Utc>,
    /// Set at creation, immutable afterwards.
    pub created_at: DateTime<Utc>,
}

impl Part {
    /// Derived status band; never persisted.
    pub fn status(&self) -> StockStatus {
        StockStatus::derive(self.stock, self.critical_threshold, self.low_stock_threshold)
    }

    /// Record-level invariants, checked on create and after every patch merge.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        if self.critical_threshold >= self.low_stock_threshold {
            return Err(DomainError::validation(
                "criticalThreshold must be below lowStockThreshold",
            ));
        }
        Ok(())
    }
}

impl Entity for Part {
    type Id = PartId;

    fn id(&self) -> &PartId {
        &self.id
    }
}

/// Draft record for `create`: unset fields receive server-side defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPart {
    pub id: Option<PartId>,
    pub qr_code_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub stock: Option<i64>,
    pub critical_threshold: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub vendor: Option<String>,
    pub category: Option<String>,
}

impl NewPart {
    /// Materialize a full record: generates an id when the caller supplied
    /// none, fills defaults, and checks the invariants.
    pub fn into_part(self, now: DateTime<Utc>) -> DomainResult<Part> {
        let part = Part {
            id: self.id.unwrap_or_else(PartId::generate),
            qr_code_id: self.qr_code_id,
            name: self.name,
            description: self.description,
            unit: self.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            stock: self.stock.unwrap_or(0),
            critical_threshold: self.critical_threshold.unwrap_or(DEFAULT_CRITICAL_THRESHOLD),
            low_stock_threshold: self
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            location: self.location,
            image: self.image,
            vendor: self.vendor,
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            last_restocked_at: now,
            created_at: now,
        };
        part.validate()?;
        Ok(part)
    }
}

/// Explicit patch for `update`: `None` leaves the stored field untouched.
///
/// `id` and `created_at` are deliberately absent; neither is patchable.
/// `last_restocked_at` only moves through the movement path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPatch {
    pub qr_code_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub stock: Option<i64>,
    pub critical_threshold: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub vendor: Option<String>,
    pub category: Option<String>,
}

impl PartPatch {
    pub fn is_empty(&self) -> bool {
        self == &PartPatch::default()
    }

    /// Merge into an existing record, returning the merged copy.
    ///
    /// The merge is total: every supplied field lands, then the merged record
    /// is re-validated so a patch can never leave an invalid part behind.
    pub fn apply_to(&self, part: &Part) -> DomainResult<Part> {
        let mut merged = part.clone();
        if let Some(qr_code_id) = &self.qr_code_id {
            merged.qr_code_id = Some(qr_code_id.clone());
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(unit) = &self.unit {
            merged.unit = unit.clone();
        }
        if let Some(stock) = self.stock {
            merged.stock = stock;
        }
        if let Some(critical_threshold) = self.critical_threshold {
            merged.critical_threshold = critical_threshold;
        }
        if let Some(low_stock_threshold) = self.low_stock_threshold {
            merged.low_stock_threshold = low_stock_threshold;
        }
        if let Some(location) = &self.location {
            merged.location = Some(location.clone());
        }
        if let Some(image) = &self.image {
            merged.image = Some(image.clone());
        }
        if let Some(vendor) = &self.vendor {
            merged.vendor = Some(vendor.clone());
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        merged.validate()?;
        Ok(merged)
    }
}
