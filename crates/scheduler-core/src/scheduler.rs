//! Ties the allocator, dispatcher, and metrics aggregator together into the in-memory
//! scheduling core. This type is the sole owner of all mutable scheduling state; the tick
//! engine in `scheduler-api` wraps it in an async loop and talks to the outside world, but
//! every operation here is synchronous and side-effect-free beyond its own fields, which is
//! what makes it directly unit- and property-testable.

use std::collections::HashMap;

use serde::Serialize;
use shared::error::CoreError;

use crate::allocator::{AllBuffersFull, AssignOutcome, Allocator};
use crate::batch::BatchCounter;
use crate::buffer::BufferLane;
use crate::color::Color;
use crate::dispatcher::ConveyorDispatcher;
use crate::metrics::{build_report, Metrics, MetricsSnapshot, ReportPayload};
use crate::oven::OvenQueue;
use crate::topology::{BufferId, OvenId, Topology};
use crate::vehicle::Vehicle;

const DEFAULT_MAX_CONVEYOR_PICK: usize = 10;

/// Whether an oven's production step stalled on a full set of buffers this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OvenStepOutcome {
    pub admitted: u32,
    pub stalled: bool,
}

pub struct Scheduler {
    topo: Topology,
    pub lanes: HashMap<BufferId, BufferLane>,
    pub ovens: HashMap<OvenId, OvenQueue>,
    pub vehicles: HashMap<u64, Vehicle>,
    pub metrics: Metrics,
    pub batches: BatchCounter,
    pub max_conveyor_pick: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_max_conveyor_pick(DEFAULT_MAX_CONVEYOR_PICK)
    }

    pub fn with_max_conveyor_pick(max_conveyor_pick: usize) -> Self {
        let topo = Topology;
        let mut lanes = HashMap::new();
        for id in BufferId::ALL {
            lanes.insert(id, BufferLane::new(topo.lane_spec(id), topo.primary_colors(id)));
        }
        let mut ovens = HashMap::new();
        ovens.insert(OvenId::O1, OvenQueue::new());
        ovens.insert(OvenId::O2, OvenQueue::new());

        Self {
            topo,
            lanes,
            ovens,
            vehicles: HashMap::new(),
            metrics: Metrics::new(),
            batches: BatchCounter::new(),
            max_conveyor_pick,
        }
    }

    /// Oven assignment for `color`, per the high-volume color table.
    pub fn oven_for(&self, color: Color) -> OvenId {
        self.topo.oven_for(color)
    }

    /// Enqueue a vehicle that already exists (e.g. loaded from the waiting-vehicle store)
    /// onto its assigned oven's queue.
    pub fn enqueue_waiting(&mut self, vehicle: Vehicle) {
        let oven = vehicle.oven;
        let car_id = vehicle.car_id;
        self.vehicles.insert(car_id, vehicle);
        self.ovens.get_mut(&oven).expect("both ovens are always present").push_back(car_id);
    }

    /// Test/benchmark convenience: create a new `Waiting` vehicle for `color`, route it to
    /// its oven, and run the allocator on it directly (bypassing the oven queue).
    pub fn assign_new_vehicle(&mut self, car_id: u64, color: Color) -> Result<AssignOutcome, AllBuffersFull> {
        let oven = self.topo.oven_for(color);
        let mut vehicle = Vehicle::new(car_id, color, oven);
        let allocator = Allocator::new(&self.topo);
        let result = allocator.assign(&mut vehicle, &mut self.lanes, &mut self.metrics, &mut self.batches);
        self.vehicles.insert(car_id, vehicle);
        result
    }

    pub fn set_maintenance(&mut self, buffer_id: BufferId, is_available: bool) {
        if let Some(lane) = self.lanes.get_mut(&buffer_id) {
            lane.is_available = is_available;
        }
    }

    /// Step one oven's production for this tick: up to `production_rate` admissions. On
    /// allocator failure the car_id is pushed back to the head of the queue and the step
    /// aborts for this tick (the stalled oven is the signaled backpressure). A queued
    /// car_id with no vehicle record is dropped silently and counted neither as admitted
    /// nor as a stall.
    pub fn oven_step(&mut self, oven: OvenId, production_rate: u32) -> OvenStepOutcome {
        let allocator = Allocator::new(&self.topo);
        let mut admitted = 0;

        for _ in 0..production_rate {
            let Some(car_id) = self.ovens.get_mut(&oven).unwrap().pop_front() else {
                return OvenStepOutcome { admitted, stalled: false };
            };

            let Some(mut vehicle) = self.vehicles.get(&car_id).cloned() else {
                tracing::debug!(car_id, "oven queue referenced unknown vehicle, skipping");
                continue;
            };

            match allocator.assign(&mut vehicle, &mut self.lanes, &mut self.metrics, &mut self.batches) {
                Ok(_) => {
                    self.vehicles.insert(car_id, vehicle);
                    admitted += 1;
                }
                Err(AllBuffersFull) => {
                    self.ovens.get_mut(&oven).unwrap().push_front(car_id);
                    return OvenStepOutcome { admitted, stalled: true };
                }
            }
        }

        OvenStepOutcome { admitted, stalled: false }
    }

    /// Run the conveyor dispatcher once, draining the lane with the longest head-run.
    pub fn run_conveyor(&mut self) -> Vec<u64> {
        let dispatcher = ConveyorDispatcher::new(self.max_conveyor_pick);
        dispatcher.pick(&mut self.lanes, &mut self.vehicles, &mut self.metrics)
    }

    /// One full tick: O1 then O2 oven steps, then one conveyor pick, then advance the tick
    /// counter. Does not perform I/O — refilling empty oven queues and periodic persistence
    /// sync are the async tick engine's concern (`scheduler-api::engine`).
    pub fn tick(&mut self, oven_production_rate: u32) -> (OvenStepOutcome, OvenStepOutcome, Vec<u64>) {
        let o1 = self.oven_step(OvenId::O1, oven_production_rate);
        let o2 = self.oven_step(OvenId::O2, oven_production_rate);
        let picked = self.run_conveyor();
        self.metrics.current_tick += 1;
        (o1, o2, picked)
    }

    pub fn both_ovens_empty(&self) -> bool {
        self.ovens.values().all(|q| q.is_empty())
    }

    pub fn total_occupancy(&self) -> usize {
        self.lanes.values().map(|l| l.current_occupancy).sum()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(&self.lanes)
    }

    pub fn report(&self) -> ReportPayload {
        build_report(&self.metrics, &self.lanes)
    }

    pub fn buffer_snapshot(&self, buffer_id: BufferId) -> Result<&BufferLane, CoreError> {
        self.lanes.get(&buffer_id).ok_or_else(|| CoreError::UnknownBuffer(buffer_id.to_string()))
    }

    pub fn reset(&mut self) {
        *self = Self::with_max_conveyor_pick(self.max_conveyor_pick);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_moves_vehicles_from_oven_to_buffer_then_conveyor() {
        let mut sched = Scheduler::new();
        for car_id in 0..6 {
            let v = Vehicle::new(car_id, Color::C1, OvenId::O1);
            sched.enqueue_waiting(v);
        }

        let (o1, o2, _picked) = sched.tick(2);
        assert_eq!(o1.admitted, 2);
        assert_eq!(o2.admitted, 0);
        assert_eq!(sched.lanes[&BufferId::L1].current_occupancy, 2);
    }

    #[test]
    fn unknown_vehicle_reference_is_skipped_not_fatal() {
        let mut sched = Scheduler::new();
        sched.ovens.get_mut(&OvenId::O1).unwrap().push_back(999);
        let outcome = sched.oven_step(OvenId::O1, 1);
        assert_eq!(outcome.admitted, 0);
        assert!(!outcome.stalled);
    }

    #[test]
    fn maintenance_toggle_blocks_admission_but_not_drain() {
        let mut sched = Scheduler::new();
        sched.assign_new_vehicle(1, Color::C1).unwrap();
        sched.set_maintenance(BufferId::L1, false);

        let v = Vehicle::new(2, Color::C1, OvenId::O1);
        sched.enqueue_waiting(v);
        let outcome = sched.oven_step(OvenId::O1, 1);
        // L1 unavailable and not in any other preferred slot for C1 besides L2 (empty) ->
        // admits to L2 instead, it does not simply fail.
        assert!(outcome.admitted <= 1);

        // Existing vehicle in the unavailable L1 lane is still drainable.
        let picked = sched.run_conveyor();
        assert!(!picked.is_empty());
    }

    #[test]
    fn reset_clears_all_state() {
        let mut sched = Scheduler::new();
        sched.assign_new_vehicle(1, Color::C1).unwrap();
        sched.reset();
        assert_eq!(sched.metrics.vehicles_processed, 0);
        assert_eq!(sched.total_occupancy(), 0);
        assert!(sched.vehicles.is_empty());
    }
}
