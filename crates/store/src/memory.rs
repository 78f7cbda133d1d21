use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{DomainError, PartId};
use stockroom_parts::{Movement, MovementDirection, NewPart, Part, PartPatch};

use crate::part_store::{PartStore, StoreError, StoreResult};

/// In-memory part store.
///
/// Intended for tests/dev. Not optimized for performance. The write lock is
/// held across the OUT-direction check and decrement, which makes the
/// movement path atomic.
#[derive(Debug, Default)]
pub struct InMemoryPartStore {
    parts: RwLock<HashMap<PartId, Part>>,
}

impl InMemoryPartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_parts(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<PartId, Part>>> {
        self.parts
            .read()
            .map_err(|_| StoreError::unavailable("lock poisoned"))
    }

    fn write_parts(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<PartId, Part>>> {
        self.parts
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))
    }

    fn qr_code_taken(parts: &HashMap<PartId, Part>, qr_code_id: &str, except: Option<&PartId>) -> bool {
        parts.iter().any(|(id, part)| {
            Some(id) != except && part.qr_code_id.as_deref() == Some(qr_code_id)
        })
    }
}

#[async_trait]
impl PartStore for InMemoryPartStore {
    async fn list(&self) -> StoreResult<Vec<Part>> {
        let parts = self.read_parts()?;
        let mut all: Vec<Part> = parts.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn create(&self, new_part: NewPart) -> StoreResult<Part> {
        let part = new_part.into_part(Utc::now())?;

        let mut parts = self.write_parts()?;
        if parts.contains_key(&part.id) {
            return Err(DomainError::conflict(format!("part id '{}' already exists", part.id)).into());
        }
        if let Some(qr_code_id) = &part.qr_code_id {
            if Self::qr_code_taken(&parts, qr_code_id, None) {
                return Err(
                    DomainError::conflict(format!("qrCodeId '{qr_code_id}' already exists")).into(),
                );
            }
        }

        parts.insert(part.id.clone(), part.clone());
        Ok(part)
    }

    async fn update(&self, id: &PartId, patch: PartPatch) -> StoreResult<Part> {
        if patch.is_empty() {
            return Err(DomainError::validation("no fields to update").into());
        }

        let mut parts = self.write_parts()?;
        let current = parts.get(id).ok_or(DomainError::NotFound)?;
        let merged = patch.apply_to(current)?;

        if let Some(qr_code_id) = &merged.qr_code_id {
            if Self::qr_code_taken(&parts, qr_code_id, Some(id)) {
                return Err(
                    DomainError::conflict(format!("qrCodeId '{qr_code_id}' already exists")).into(),
                );
            }
        }

        parts.insert(id.clone(), merged.clone());
        Ok(merged)
    }

    async fn delete(&self, id: &PartId) -> StoreResult<bool> {
        let mut parts = self.write_parts()?;
        Ok(parts.remove(id).is_some())
    }

    async fn apply_movement(&self, movement: Movement) -> StoreResult<Part> {
        let mut parts = self.write_parts()?;
        let part = parts.get_mut(&movement.part_id).ok_or(DomainError::NotFound)?;

        match movement.direction {
            MovementDirection::In => {
                part.stock += movement.quantity;
                part.last_restocked_at = Utc::now();
            }
            MovementDirection::Out => {
                if part.stock < movement.quantity {
                    return Err(DomainError::insufficient_stock(part.stock).into());
                }
                part.stock -= movement.quantity;
            }
        }

        Ok(part.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use stockroom_parts::StockStatus;

    fn draft(id: &str, name: &str, stock: i64) -> NewPart {
        NewPart {
            id: Some(id.parse().unwrap()),
            name: name.to_string(),
            stock: Some(stock),
            ..NewPart::default()
        }
    }

    async fn seeded_store() -> InMemoryPartStore {
        let store = InMemoryPartStore::new();
        store.create(draft("SP-0001", "Bearing", 10)).await.unwrap();
        store.create(draft("SP-0002", "Axle", 2)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = seeded_store().await;
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Axle".to_string(), "Bearing".to_string()]);
    }

    #[tokio::test]
    async fn create_then_list_contains_the_part_exactly_once() {
        let store = seeded_store().await;
        store.create(draft("SP-0003", "Belt", 0)).await.unwrap();

        let parts = store.list().await.unwrap();
        let belts: Vec<_> = parts.iter().filter(|p| p.id.as_str() == "SP-0003").collect();
        assert_eq!(belts.len(), 1);
        assert_eq!(parts.len(), 3);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = seeded_store().await;
        let err = store.create(draft("SP-0001", "Other", 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_qr_code_id() {
        let store = InMemoryPartStore::new();
        let mut first = draft("SP-0001", "Bearing", 0);
        first.qr_code_id = Some("QR-1".to_string());
        store.create(first).await.unwrap();

        let mut second = draft("SP-0002", "Axle", 0);
        second.qr_code_id = Some("QR-1".to_string());
        let err = store.create(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_merges_supplied_fields_only() {
        let store = seeded_store().await;
        let id: PartId = "SP-0001".parse().unwrap();
        let patch = PartPatch {
            location: Some("Rack 4".to_string()),
            ..PartPatch::default()
        };

        let updated = store.update(&id, patch).await.unwrap();
        assert_eq!(updated.location.as_deref(), Some("Rack 4"));
        assert_eq!(updated.name, "Bearing");
        assert_eq!(updated.stock, 10);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = seeded_store().await;
        let id: PartId = "SP-MISSING".parse().unwrap();
        let patch = PartPatch {
            vendor: Some("Acme".to_string()),
            ..PartPatch::default()
        };
        let err = store.update(&id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn update_rejects_empty_patch() {
        let store = seeded_store().await;
        let id: PartId = "SP-0001".parse().unwrap();
        let err = store.update(&id, PartPatch::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let store = seeded_store().await;
        let id: PartId = "SP-0001".parse().unwrap();
        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn movement_in_increases_stock_and_stamps_restock_time() {
        let store = seeded_store().await;
        let id: PartId = "SP-0001".parse().unwrap();
        let before = Utc::now();

        let movement = Movement::new(id, 7, MovementDirection::In).unwrap();
        let updated = store.apply_movement(movement).await.unwrap();

        assert_eq!(updated.stock, 17);
        assert!(updated.last_restocked_at >= before);
    }

    #[tokio::test]
    async fn movement_out_decreases_stock() {
        let store = seeded_store().await;
        let id: PartId = "SP-0001".parse().unwrap();
        let movement = Movement::new(id, 4, MovementDirection::Out).unwrap();
        let updated = store.apply_movement(movement).await.unwrap();
        assert_eq!(updated.stock, 6);
    }

    #[tokio::test]
    async fn insufficient_out_leaves_stock_unchanged() {
        let store = seeded_store().await;
        let id: PartId = "SP-0002".parse().unwrap();

        let movement = Movement::new(id.clone(), 3, MovementDirection::Out).unwrap();
        let err = store.apply_movement(movement).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::InsufficientStock { current: 2 })
        ));

        let parts = store.list().await.unwrap();
        let axle = parts.iter().find(|p| p.id == id).unwrap();
        assert_eq!(axle.stock, 2);
    }

    #[tokio::test]
    async fn movement_against_unknown_part_is_not_found() {
        let store = seeded_store().await;
        let id: PartId = "SP-MISSING".parse().unwrap();
        let movement = Movement::new(id, 1, MovementDirection::In).unwrap();
        let err = store.apply_movement(movement).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn summary_counts_status_bands() {
        let store = InMemoryPartStore::new();
        store.create(draft("SP-0001", "Critical", 1)).await.unwrap();
        store.create(draft("SP-0002", "Low", 5)).await.unwrap();
        store.create(draft("SP-0003", "Fine", 50)).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.low_stock_count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_out_movements_never_drive_stock_negative() {
        let store = Arc::new(InMemoryPartStore::new());
        store.create(draft("SP-0001", "Bearing", 5)).await.unwrap();
        let id: PartId = "SP-0001".parse().unwrap();

        // Both movements want the full stock; only one can win.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let movement = Movement::new(id, 5, MovementDirection::Out).unwrap();
                store.apply_movement(movement).await
            }));
        }

        let mut ok = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(part) => {
                    ok += 1;
                    assert_eq!(part.stock, 0);
                }
                Err(StoreError::Domain(DomainError::InsufficientStock { current })) => {
                    insufficient += 1;
                    assert_eq!(current, 0);
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!((ok, insufficient), (1, 1));

        let parts = store.list().await.unwrap();
        assert_eq!(parts[0].stock, 0);
    }

    #[tokio::test]
    async fn random_movement_sequences_keep_stock_non_negative() {
        let store = seeded_store().await;
        let id: PartId = "SP-0001".parse().unwrap();

        // Deterministic pseudo-random walk; rejected OUTs must not change stock.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut expected: i64 = 10;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let quantity = ((seed >> 33) % 7 + 1) as i64;
            let direction = if seed % 2 == 0 {
                MovementDirection::In
            } else {
                MovementDirection::Out
            };

            let movement = Movement::new(id.clone(), quantity, direction).unwrap();
            match store.apply_movement(movement).await {
                Ok(part) => {
                    expected = match direction {
                        MovementDirection::In => expected + quantity,
                        MovementDirection::Out => expected - quantity,
                    };
                    assert_eq!(part.stock, expected);
                    assert!(part.stock >= 0);
                }
                Err(StoreError::Domain(DomainError::InsufficientStock { current })) => {
                    assert_eq!(current, expected);
                    assert!(matches!(direction, MovementDirection::Out));
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        let parts = store.list().await.unwrap();
        let part = parts.iter().find(|p| p.id == id).unwrap();
        assert_eq!(part.stock, expected);
        assert_eq!(part.status(), StockStatus::derive(expected, 3, 8));
    }
}
