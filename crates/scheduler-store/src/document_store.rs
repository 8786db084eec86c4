//! An HTTP-backed `VehicleStore` for deployments that run the scheduler behind a separate
//! document-store service rather than in-process. This is the implementation the in-memory
//! store's own doc comment gestures at when it says "swap for a real document store" —
//! every write here retries with exponential backoff, which the in-memory path has no need
//! of (it cannot fail transiently).

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use scheduler_core::{BufferId, BufferLane, MetricsSnapshot, Vehicle};

use crate::traits::{VehicleStore, VehicleUpdate};

const MAX_ATTEMPTS: u32 = 4;
const BASE_BACKOFF: Duration = Duration::from_millis(100);
const SEED_COMMIT_BATCH: usize = 500;

pub struct DocumentStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl DocumentStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Retry `attempt` with exponential backoff (100ms, 200ms, 400ms, 800ms) up to
    /// `MAX_ATTEMPTS` times. Only network/5xx failures are retried; a successful response of
    /// any status is returned immediately so the caller can decide what a 4xx means.
    async fn send_with_retry(&self, build: impl Fn() -> reqwest::RequestBuilder) -> bool {
        let mut delay = BASE_BACKOFF;
        for attempt in 1..=MAX_ATTEMPTS {
            match build().send().await {
                Ok(resp) if resp.status().is_success() => return true,
                Ok(resp) => {
                    tracing::warn!(status = %resp.status(), attempt, "document store rejected request");
                    return false;
                }
                Err(err) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(%err, attempt, delay_ms = delay.as_millis() as u64, "document store request failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => {
                    tracing::error!(%err, attempt, "document store request failed, giving up");
                    return false;
                }
            }
        }
        false
    }

    async fn put_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> bool {
        self.send_with_retry(|| self.client.put(self.url(path)).json(body)).await
    }
}

#[async_trait]
impl VehicleStore for DocumentStoreClient {
    /// The document store commits writes per request; a single request carrying hundreds of
    /// vehicles risks hitting its payload/document-count limit, so seeding chunks into commits
    /// of at most `SEED_COMMIT_BATCH` vehicles each.
    async fn seed_vehicles(&self, vehicles: Vec<Vehicle>) -> bool {
        let mut all_ok = true;
        for chunk in vehicles.chunks(SEED_COMMIT_BATCH) {
            if !self.put_json("vehicles:seed", &chunk).await {
                all_ok = false;
            }
        }
        all_ok
    }

    async fn get_waiting_vehicles(&self, limit: usize) -> Vec<Vehicle> {
        let url = self.url(&format!("vehicles?status=waiting&limit={limit}"));
        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => resp.json::<Vec<Vehicle>>().await.unwrap_or_else(|err| {
                tracing::warn!(%err, "document store returned malformed vehicle list");
                Vec::new()
            }),
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "document store rejected waiting-vehicle query");
                Vec::new()
            }
            Err(err) => {
                tracing::error!(%err, "document store unreachable for waiting-vehicle query");
                Vec::new()
            }
        }
    }

    async fn update_vehicle(&self, car_id: u64, update: VehicleUpdate) -> bool {
        self.put_json(&format!("vehicles/{car_id}"), &update_to_json(&update)).await
    }

    async fn batch_update_vehicles(&self, updates: Vec<(u64, VehicleUpdate)>) -> bool {
        let payload: Vec<_> = updates
            .iter()
            .map(|(car_id, update)| json!({ "car_id": car_id, "update": update_to_json(update) }))
            .collect();
        self.put_json("vehicles:batchUpdate", &payload).await
    }

    async fn update_metrics(&self, metrics: MetricsSnapshot) -> bool {
        self.put_json("metrics/current", &metrics).await
    }

    async fn update_buffer_state(&self, buffer_id: BufferId, state: BufferLane) -> bool {
        self.put_json(&format!("buffers/{buffer_id}"), &state).await
    }

    async fn clear_collection(&self, collection: &str) -> bool {
        self.send_with_retry(|| self.client.delete(self.url(collection))).await
    }
}

fn update_to_json(update: &VehicleUpdate) -> serde_json::Value {
    json!({
        "status": update.status,
        "buffer": update.buffer,
        "batch_id": update.batch_id,
    })
}
