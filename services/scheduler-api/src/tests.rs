use std::sync::Arc;
use std::time::Duration;

use scheduler_core::BufferId;
use scheduler_store::{InMemoryStore, VehicleStore};

use crate::engine::{self, Command};

#[tokio::test]
async fn seed_then_start_advances_ticks_and_admits_vehicles() {
    let store: Arc<dyn VehicleStore> = Arc::new(InMemoryStore::new());
    let handle = engine::spawn(store.clone(), 0.02, 2, 10);

    handle.send(Command::Seed(50));
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.send(Command::Start);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let snapshot = handle.snapshot().await.expect("engine alive");
    assert!(snapshot.simulation_running);
    assert!(snapshot.current_tick > 0);
}

#[tokio::test]
async fn stop_halts_tick_progression() {
    let store: Arc<dyn VehicleStore> = Arc::new(InMemoryStore::new());
    let handle = engine::spawn(store.clone(), 0.02, 2, 10);

    handle.send(Command::Seed(50));
    handle.send(Command::Start);
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.send(Command::Stop);
    let after_stop = handle.snapshot().await.unwrap().current_tick;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let later = handle.snapshot().await.unwrap().current_tick;

    assert_eq!(after_stop, later, "tick counter must not advance once stopped");
}

#[tokio::test]
async fn reset_clears_metrics_and_buffer_occupancy() {
    let store: Arc<dyn VehicleStore> = Arc::new(InMemoryStore::new());
    let handle = engine::spawn(store.clone(), 0.02, 2, 10);

    handle.send(Command::Seed(50));
    handle.send(Command::Start);
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.send(Command::Stop);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(handle.reset().await, Some(Ok(())));
    tokio::time::sleep(Duration::from_millis(20)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.simulation_running);
    assert_eq!(snapshot.current_tick, 0);
    assert_eq!(snapshot.vehicles_processed, 0);
}

#[tokio::test]
async fn reset_while_running_is_rejected() {
    let store: Arc<dyn VehicleStore> = Arc::new(InMemoryStore::new());
    let handle = engine::spawn(store.clone(), 0.02, 2, 10);

    handle.send(Command::Seed(50));
    handle.send(Command::Start);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(handle.reset().await, Some(Err(shared::error::CoreError::ResetWhileRunning)));

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.simulation_running, "rejected reset must not stop the run");
}

#[tokio::test]
async fn maintenance_toggle_is_reflected_in_buffer_snapshot() {
    let store: Arc<dyn VehicleStore> = Arc::new(InMemoryStore::new());
    let handle = engine::spawn(store.clone(), 1.0, 1, 10);

    handle.send(Command::SetMaintenance { buffer_id: BufferId::L1, is_available: false });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let lane = handle.buffer_snapshot(BufferId::L1).await.unwrap().unwrap();
    assert!(!lane.is_available);
}

#[tokio::test]
async fn buffer_snapshot_reports_every_lane_by_id() {
    let store: Arc<dyn VehicleStore> = Arc::new(InMemoryStore::new());
    let handle = engine::spawn(store.clone(), 1.0, 1, 10);

    for buffer_id in BufferId::ALL {
        let lane = handle.buffer_snapshot(buffer_id).await.unwrap().unwrap();
        assert_eq!(lane.buffer_id, buffer_id);
    }
}
