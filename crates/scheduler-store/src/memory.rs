//! An in-process `VehicleStore`. Used for tests, local development, and as the default when
//! no document-store endpoint is configured. State lives behind `parking_lot::Mutex` rather
//! than `std::sync::Mutex` for its non-poisoning lock and cheaper uncontended path — none of
//! the guards here are ever held across an `.await`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use scheduler_core::{BufferId, BufferLane, MetricsSnapshot, Vehicle};

use crate::traits::{apply_update, VehicleStore, VehicleUpdate};

#[derive(Default)]
pub struct InMemoryStore {
    vehicles: Mutex<HashMap<u64, Vehicle>>,
    buffers: Mutex<HashMap<BufferId, BufferLane>>,
    metrics: Mutex<Option<MetricsSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleStore for InMemoryStore {
    async fn seed_vehicles(&self, vehicles: Vec<Vehicle>) -> bool {
        let mut guard = self.vehicles.lock();
        guard.clear();
        for vehicle in vehicles {
            guard.insert(vehicle.car_id, vehicle);
        }
        true
    }

    async fn get_waiting_vehicles(&self, limit: usize) -> Vec<Vehicle> {
        use scheduler_core::VehicleStatus;
        let guard = self.vehicles.lock();
        let mut waiting: Vec<Vehicle> = guard
            .values()
            .filter(|v| v.status == VehicleStatus::Waiting)
            .cloned()
            .collect();
        waiting.sort_by_key(|v| v.car_id);
        waiting.truncate(limit);
        waiting
    }

    async fn update_vehicle(&self, car_id: u64, update: VehicleUpdate) -> bool {
        let mut guard = self.vehicles.lock();
        match guard.get_mut(&car_id) {
            Some(vehicle) => {
                apply_update(vehicle, &update);
                true
            }
            None => false,
        }
    }

    async fn batch_update_vehicles(&self, updates: Vec<(u64, VehicleUpdate)>) -> bool {
        let mut guard = self.vehicles.lock();
        let mut all_known = true;
        for (car_id, update) in updates {
            match guard.get_mut(&car_id) {
                Some(vehicle) => apply_update(vehicle, &update),
                None => all_known = false,
            }
        }
        all_known
    }

    async fn update_metrics(&self, metrics: MetricsSnapshot) -> bool {
        *self.metrics.lock() = Some(metrics);
        true
    }

    async fn update_buffer_state(&self, buffer_id: BufferId, state: BufferLane) -> bool {
        self.buffers.lock().insert(buffer_id, state);
        true
    }

    async fn clear_collection(&self, collection: &str) -> bool {
        match collection {
            "vehicles" => self.vehicles.lock().clear(),
            "buffers" => self.buffers.lock().clear(),
            "metrics" => *self.metrics.lock() = None,
            other => {
                tracing::warn!(collection = other, "clear_collection called on unknown collection");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler_core::{Color, OvenId, VehicleStatus};

    #[tokio::test]
    async fn seed_then_get_waiting_respects_limit_and_ordering() {
        let store = InMemoryStore::new();
        let vehicles = (0..5).map(|i| Vehicle::new(i, Color::C1, OvenId::O1)).collect();
        assert!(store.seed_vehicles(vehicles).await);

        let waiting = store.get_waiting_vehicles(3).await;
        assert_eq!(waiting.len(), 3);
        assert_eq!(waiting[0].car_id, 0);
        assert_eq!(waiting[2].car_id, 2);
    }

    #[tokio::test]
    async fn update_vehicle_on_unknown_car_id_reports_false() {
        let store = InMemoryStore::new();
        let known = store.update_vehicle(42, VehicleUpdate::status(VehicleStatus::Painted)).await;
        assert!(!known);
    }

    #[tokio::test]
    async fn painted_vehicles_are_excluded_from_waiting_list() {
        let store = InMemoryStore::new();
        store.seed_vehicles(vec![Vehicle::new(1, Color::C2, OvenId::O1)]).await;
        store.update_vehicle(1, VehicleUpdate::painted()).await;
        assert!(store.get_waiting_vehicles(10).await.is_empty());
    }
}
