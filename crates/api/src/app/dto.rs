use serde::Deserialize;

use stockroom_core::{DomainResult, PartId};
use stockroom_parts::{InventorySummary, NewPart, Part, PartPatch};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartRequest {
    pub id: Option<String>,
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

impl CreatePartRequest {
    pub fn into_new_part(self) -> DomainResult<NewPart> {
        let id: Option<PartId> = self.id.as_deref().map(str::parse).transpose()?;
        Ok(NewPart {
            id,
            qr_code_id: self.qr_code_id,
            name: self.name,
            description: self.description,
            unit: self.unit,
            stock: self.stock,
            critical_threshold: self.critical_threshold,
            low_stock_threshold: self.low_stock_threshold,
            location: self.location,
            image: self.image,
            vendor: self.vendor,
            category: self.category,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartRequest {
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

impl UpdatePartRequest {
    pub fn into_patch(self) -> PartPatch {
        PartPatch {
            qr_code_id: self.qr_code_id,
            name: self.name,
            description: self.description,
            unit: self.unit,
            stock: self.stock,
            critical_threshold: self.critical_threshold,
            low_stock_threshold: self.low_stock_threshold,
            location: self.location,
            image: self.image,
            vendor: self.vendor,
            category: self.category,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePartRequest {
    pub part_id: String,
    pub quantity: i64,
    pub direction: String,
    pub note: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn part_to_json(part: Part) -> serde_json::Value {
    let status = part.status();
    serde_json::json!({
        "id": part.id.to_string(),
        "qrCodeId": part.qr_code_id,
        "name": part.name,
        "description": part.description,
        "unit": part.unit,
        "stock": part.stock,
        "criticalThreshold": part.critical_threshold,
        "lowStockThreshold": part.low_stock_threshold,
        "location": part.location,
        "image": part.image,
        "vendor": part.vendor,
        "category": part.category,
        "lastRestockedAt": part.last_restocked_at.to_rfc3339(),
        "createdAt": part.created_at.to_rfc3339(),
        "status": status.label(),
    })
}

pub fn summary_to_json(summary: InventorySummary) -> serde_json::Value {
    serde_json::json!({
        "totalItems": summary.total_items,
        "criticalCount": summary.critical_count,
        "lowStockCount": summary.low_stock_count,
    })
}
