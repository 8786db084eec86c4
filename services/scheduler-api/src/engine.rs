//! Owns the single `Scheduler` and drives it from a dedicated tokio task. All external access
//! — HTTP handlers included — goes through an mpsc command channel rather than shared-memory
//! locking: the scheduler's own invariants (buffer capacity, batch sequencing) only hold if
//! exactly one writer ever touches it at a time, and a channel makes that structurally true
//! instead of relying on callers to lock correctly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

use scheduler_core::{BufferId, MetricsSnapshot, ReportPayload, Scheduler};
use scheduler_store::{generate_vehicles, VehicleStore, VehicleUpdate};
use shared::error::CoreError;

const INITIAL_LOAD: usize = 500;
const RELOAD_BATCH: usize = 200;

pub enum Command {
    Start,
    Stop,
    Reset(oneshot::Sender<Result<(), CoreError>>),
    Seed(u32),
    SetMaintenance { buffer_id: BufferId, is_available: bool },
    Snapshot(oneshot::Sender<MetricsSnapshot>),
    Report(oneshot::Sender<ReportPayload>),
    BufferSnapshot { buffer_id: BufferId, reply: oneshot::Sender<Result<scheduler_core::BufferLane, CoreError>> },
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    pub fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            tracing::error!("tick engine task is gone, dropping command");
        }
    }

    pub async fn snapshot(&self) -> Option<MetricsSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx));
        rx.await.ok()
    }

    pub async fn report(&self) -> Option<ReportPayload> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Report(tx));
        rx.await.ok()
    }

    pub async fn buffer_snapshot(&self, buffer_id: BufferId) -> Option<Result<scheduler_core::BufferLane, CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::BufferSnapshot { buffer_id, reply: tx });
        rx.await.ok()
    }

    pub async fn reset(&self) -> Option<Result<(), CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Reset(tx));
        rx.await.ok()
    }
}

/// Spawn the tick loop and return a handle to it. `tick_rate_seconds` and
/// `oven_production_rate` come straight from `Settings`.
pub fn spawn(
    store: Arc<dyn VehicleStore>,
    tick_rate_seconds: f64,
    oven_production_rate: u32,
    max_conveyor_pick: u32,
) -> EngineHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    let handle = EngineHandle { tx };

    tokio::spawn(async move {
        let mut scheduler = Scheduler::with_max_conveyor_pick(max_conveyor_pick as usize);
        let mut ticker = interval(Duration::from_secs_f64(tick_rate_seconds.max(0.01)));

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    handle_command(cmd, &mut scheduler, &store).await;
                }
                _ = ticker.tick(), if scheduler.metrics.simulation_running => {
                    run_tick(&mut scheduler, &store, oven_production_rate).await;
                }
            }
        }
    });

    handle
}

async fn handle_command(cmd: Command, scheduler: &mut Scheduler, store: &Arc<dyn VehicleStore>) {
    match cmd {
        Command::Start => {
            if scheduler.metrics.simulation_running {
                return;
            }
            refill_waiting_queue(scheduler, store, INITIAL_LOAD).await;
            scheduler.metrics.simulation_running = true;
            tracing::info!("scheduler started");
        }
        Command::Stop => {
            scheduler.metrics.simulation_running = false;
            tracing::info!("scheduler stopped");
        }
        Command::Reset(reply) => {
            if scheduler.metrics.simulation_running {
                tracing::warn!("reset rejected: tick loop is running");
                let _ = reply.send(Err(CoreError::ResetWhileRunning));
                return;
            }
            scheduler.reset();
            store.clear_collection("vehicles").await;
            store.clear_collection("buffers").await;
            store.clear_collection("metrics").await;
            tracing::info!("scheduler reset");
            let _ = reply.send(Ok(()));
        }
        Command::Seed(count) => {
            let vehicles = generate_vehicles(count, scheduler);
            if !store.seed_vehicles(vehicles).await {
                tracing::warn!(count, "seed_vehicles reported failure");
            }
        }
        Command::SetMaintenance { buffer_id, is_available } => {
            scheduler.set_maintenance(buffer_id, is_available);
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(scheduler.snapshot());
        }
        Command::Report(reply) => {
            let _ = reply.send(scheduler.report());
        }
        Command::BufferSnapshot { buffer_id, reply } => {
            let _ = reply.send(scheduler.buffer_snapshot(buffer_id).map(|lane| lane.clone()));
        }
    }
}

async fn run_tick(scheduler: &mut Scheduler, store: &Arc<dyn VehicleStore>, oven_production_rate: u32) {
    let mut loaded = None;
    if scheduler.both_ovens_empty() {
        loaded = Some(refill_waiting_queue(scheduler, store, RELOAD_BATCH).await);
    }

    if loaded == Some(0) && scheduler.total_occupancy() == 0 {
        scheduler.metrics.simulation_running = false;
        tracing::info!("waiting queue and buffers exhausted, stopping simulation");
        return;
    }

    let (_o1, _o2, picked) = scheduler.tick(oven_production_rate);

    if !picked.is_empty() {
        let updates = picked.into_iter().map(|car_id| (car_id, VehicleUpdate::painted())).collect();
        store.batch_update_vehicles(updates).await;
    }

    if scheduler.metrics.current_tick % 10 == 0 {
        store.update_metrics(scheduler.snapshot()).await;
        for buffer_id in BufferId::ALL {
            if let Ok(lane) = scheduler.buffer_snapshot(buffer_id) {
                store.update_buffer_state(buffer_id, lane.clone()).await;
            }
        }
    }
}

async fn refill_waiting_queue(scheduler: &mut Scheduler, store: &Arc<dyn VehicleStore>, limit: usize) -> usize {
    let waiting = store.get_waiting_vehicles(limit).await;
    if waiting.is_empty() {
        return 0;
    }
    tracing::debug!(count = waiting.len(), "loading waiting vehicles into oven queues");
    let loaded = waiting.len();
    let updates = waiting
        .iter()
        .map(|v| (v.car_id, VehicleUpdate::status(scheduler_core::VehicleStatus::InOven)))
        .collect();
    for vehicle in waiting {
        scheduler.enqueue_waiting(vehicle);
    }
    store.batch_update_vehicles(updates).await;
    loaded
}
