//! Persistence boundary between the scheduling core and whatever document store backs the
//! deployment. The trait mirrors the handful of operations the tick engine actually needs:
//! seed the waiting queue, page through it, and push back vehicle/buffer/metrics updates.
//! It intentionally does not expose a generic query API — callers that need one belong above
//! this layer, not inside it.

use async_trait::async_trait;

use scheduler_core::{BufferId, BufferLane, MetricsSnapshot, Vehicle, VehicleStatus};

/// A partial update to a vehicle document. Fields left as `None` are left untouched; this
/// mirrors a `PATCH`-style partial write rather than a full document replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleUpdate {
    pub status: Option<VehicleStatus>,
    pub buffer: Option<Option<BufferId>>,
    pub batch_id: Option<Option<String>>,
}

impl VehicleUpdate {
    pub fn status(status: VehicleStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn placed(buffer: BufferId, batch_id: String) -> Self {
        Self {
            status: Some(VehicleStatus::InBuffer),
            buffer: Some(Some(buffer)),
            batch_id: Some(Some(batch_id)),
        }
    }

    pub fn painted() -> Self {
        Self { status: Some(VehicleStatus::Painted), ..Default::default() }
    }

    fn apply(&self, vehicle: &mut Vehicle) {
        if let Some(status) = self.status {
            vehicle.status = status;
        }
        if let Some(buffer) = self.buffer {
            vehicle.buffer = buffer;
        }
        if let Some(batch_id) = &self.batch_id {
            vehicle.batch_id = batch_id.clone();
        }
    }
}

/// Document-store boundary for vehicle, buffer, and metrics state. Implementations must be
/// safe to call concurrently from the tick engine's own task and from request handlers.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Replace the store's vehicle collection with `vehicles`. Returns `false` if the write
    /// did not complete (the caller logs and retries rather than panicking).
    async fn seed_vehicles(&self, vehicles: Vec<Vehicle>) -> bool;

    /// Up to `limit` vehicles currently in `Waiting` status, in no particular guaranteed
    /// order (the tick engine re-sorts by `priority` itself if it cares).
    async fn get_waiting_vehicles(&self, limit: usize) -> Vec<Vehicle>;

    /// Apply a single partial update. Returns `false` if `car_id` is unknown to the store.
    async fn update_vehicle(&self, car_id: u64, update: VehicleUpdate) -> bool;

    /// Apply many partial updates as one logical write. Implementations that cannot batch
    /// atomically should still prefer fewer round trips over one call per update.
    async fn batch_update_vehicles(&self, updates: Vec<(u64, VehicleUpdate)>) -> bool;

    async fn update_metrics(&self, metrics: MetricsSnapshot) -> bool;

    async fn update_buffer_state(&self, buffer_id: BufferId, state: BufferLane) -> bool;

    /// Drop every document in `collection`. Used by `/reset` to clear prior-run state.
    async fn clear_collection(&self, collection: &str) -> bool;
}

pub(crate) fn apply_update(vehicle: &mut Vehicle, update: &VehicleUpdate) {
    update.apply(vehicle);
}
