//! Buffer allocation policy: picks the best lane for an incoming vehicle via a priority
//! cascade over that color's preferred buffer list, computing the changeover penalty and
//! batch id along the way.

use std::collections::HashMap;

use tracing::warn;

use crate::batch::BatchCounter;
use crate::buffer::BufferLane;
use crate::color::Color;
use crate::metrics::Metrics;
use crate::topology::{
    BufferId, OvenId, Topology, CHANGEOVER_BASE, CHANGEOVER_HIGH_VOLUME, CHANGEOVER_LARGE_BATCH,
    LARGE_BATCH_THRESHOLD,
};
use crate::vehicle::{Vehicle, VehicleStatus};

/// Outcome of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    pub buffer_id: BufferId,
    pub batch_id: String,
    pub changeover_penalty: u32,
    pub occupancy_after: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllBuffersFull;

pub struct Allocator<'a> {
    topo: &'a Topology,
}

impl<'a> Allocator<'a> {
    pub fn new(topo: &'a Topology) -> Self {
        Self { topo }
    }

    /// Changeover penalty, in seconds, for admitting `color` into a lane currently holding
    /// `lane_color` (`None` if empty) with `lane_occupancy` vehicles already in it.
    pub fn changeover_penalty(color: Color, lane_color: Option<Color>, lane_occupancy: usize) -> u32 {
        match lane_color {
            None => 0,
            Some(c) if c == color => 0,
            Some(c) => {
                let mut penalty = CHANGEOVER_BASE;
                if color.is_high_volume() || c.is_high_volume() {
                    penalty += CHANGEOVER_HIGH_VOLUME;
                }
                if lane_occupancy > LARGE_BATCH_THRESHOLD {
                    penalty += CHANGEOVER_LARGE_BATCH;
                }
                penalty
            }
        }
    }

    /// Assign `vehicle` to the best admissible lane, mutating `lanes`, `metrics`, and
    /// `batches`, and marking `vehicle` `InBuffer` on success.
    pub fn assign(
        &self,
        vehicle: &mut Vehicle,
        lanes: &mut HashMap<BufferId, BufferLane>,
        metrics: &mut Metrics,
        batches: &mut BatchCounter,
    ) -> Result<AssignOutcome, AllBuffersFull> {
        let color = vehicle.color;
        let preferred = self.topo.preferred_buffers(color);

        let mut best: Option<(BufferId, u32)> = None;

        for &candidate_id in preferred {
            let Some(lane) = lanes.get(&candidate_id) else { continue };

            if !lane.is_available || lane.is_full() {
                continue;
            }

            // Priority 2: same-color continuation terminates the search immediately.
            if lane.current_color == Some(color) && lane.available_space() > 0 {
                return Ok(self.admit(
                    candidate_id,
                    color,
                    0,
                    vehicle,
                    lanes,
                    metrics,
                    batches,
                ));
            }

            // Priority 3: an empty lane terminates the search immediately.
            if lane.current_occupancy == 0 {
                return Ok(self.admit(
                    candidate_id,
                    color,
                    0,
                    vehicle,
                    lanes,
                    metrics,
                    batches,
                ));
            }

            // Priority 4: cross-zone suppression, O1 -> O2 only.
            if vehicle.oven == OvenId::O1 && lane.oven == OvenId::O2 {
                let o1_has_space = self
                    .topo
                    .zone(OvenId::O1)
                    .iter()
                    .filter_map(|id| lanes.get(id))
                    .any(|l| !l.is_full());
                if o1_has_space {
                    continue;
                }
            }

            // Priority 5: remember the lowest-penalty candidate seen so far.
            let penalty = Self::changeover_penalty(color, lane.current_color, lane.current_occupancy);
            if best.map_or(true, |(_, best_penalty)| penalty < best_penalty) {
                best = Some((candidate_id, penalty));
            }
        }

        match best {
            Some((buffer_id, penalty)) => {
                Ok(self.admit(buffer_id, color, penalty, vehicle, lanes, metrics, batches))
            }
            None => {
                metrics.buffer_overflow_events += 1;
                warn!(car_id = vehicle.car_id, color = %color, "buffer overflow: no admissible lane");
                Err(AllBuffersFull)
            }
        }
    }

    fn admit(
        &self,
        buffer_id: BufferId,
        color: Color,
        penalty: u32,
        vehicle: &mut Vehicle,
        lanes: &mut HashMap<BufferId, BufferLane>,
        metrics: &mut Metrics,
        batches: &mut BatchCounter,
    ) -> AssignOutcome {
        let lane = lanes.get_mut(&buffer_id).expect("candidate lane must exist");

        let needs_new_batch = lane.current_color != Some(color) || lane.current_occupancy == 0;
        let oven_zone_is_o2 = lane.oven == OvenId::O2;

        lane.admit(vehicle.car_id, color);
        let occupancy_after = lane.current_occupancy;

        let batch_id = if needs_new_batch {
            batches.next_batch_id(color)
        } else {
            lane.current_batch_id.clone().unwrap_or_else(|| batches.next_batch_id(color))
        };
        lane.current_batch_id = Some(batch_id.clone());

        if penalty > 0 {
            metrics.total_changeovers += 1;
            if vehicle.oven == OvenId::O1 && oven_zone_is_o2 {
                metrics.o2_stoppage_events += 1;
            }
        }

        metrics.vehicles_processed += 1;

        vehicle.buffer = Some(buffer_id);
        vehicle.status = VehicleStatus::InBuffer;
        vehicle.batch_id = Some(batch_id.clone());

        AssignOutcome { buffer_id, batch_id, changeover_penalty: penalty, occupancy_after }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;

    fn new_scheduler() -> Scheduler {
        Scheduler::new()
    }

    #[test]
    fn s1_same_color_continuation() {
        let mut sched = new_scheduler();
        let r1 = sched.assign_new_vehicle(1, Color::C1).unwrap();
        assert_eq!(r1.buffer_id, BufferId::L1);
        assert_eq!(r1.batch_id, "B-C1-001");
        assert_eq!(r1.changeover_penalty, 0);
        assert_eq!(sched.metrics.total_changeovers, 0);

        let r2 = sched.assign_new_vehicle(2, Color::C1).unwrap();
        assert_eq!(r2.buffer_id, BufferId::L1);
        assert_eq!(r2.batch_id, "B-C1-001");
        assert_eq!(r2.changeover_penalty, 0);
        assert_eq!(sched.metrics.total_changeovers, 0);
        assert_eq!(sched.lanes[&BufferId::L1].current_occupancy, 2);
    }

    #[test]
    fn s2_empty_lane_preference() {
        let mut sched = new_scheduler();
        sched.assign_new_vehicle(1, Color::C1).unwrap();
        sched.assign_new_vehicle(2, Color::C1).unwrap();

        let r3 = sched.assign_new_vehicle(3, Color::C2).unwrap();
        assert_eq!(r3.buffer_id, BufferId::L3);
        assert_eq!(r3.batch_id, "B-C2-001");
        assert_eq!(r3.changeover_penalty, 0);
    }

    #[test]
    fn s3_changeover_penalty_and_overflow_recovery() {
        let mut sched = new_scheduler();
        for i in 0..6 {
            sched.assign_new_vehicle(i, Color::C2).unwrap();
        }
        assert_eq!(sched.lanes[&BufferId::L3].current_occupancy, 6);

        // Fill L4 to capacity and disable L2 so C3's preferred list [L4, L2] is fully blocked.
        for i in 100..114 {
            sched.assign_new_vehicle(i, Color::C3).unwrap();
        }
        assert!(sched.lanes[&BufferId::L4].is_full());
        sched.set_maintenance(BufferId::L2, false);

        let overflow_before = sched.metrics.buffer_overflow_events;
        let result = sched.assign_new_vehicle(200, Color::C3);
        assert!(result.is_err());
        assert_eq!(sched.metrics.buffer_overflow_events, overflow_before + 1);

        sched.set_maintenance(BufferId::L2, true);
        let recovered = sched.assign_new_vehicle(201, Color::C3).unwrap();
        assert_eq!(recovered.buffer_id, BufferId::L2);
        assert_eq!(recovered.changeover_penalty, 0);
    }

    #[test]
    fn s4_cross_zone_suppression_is_list_scoped() {
        let mut sched = new_scheduler();
        // C1's preferred list is [L1, L2] only; saturate both.
        for i in 0..14 {
            sched.assign_new_vehicle(i, Color::C1).unwrap();
        }
        assert!(sched.lanes[&BufferId::L1].is_full());
        // L2 still has room and is in C1's preferred list; keep pushing C1 in.
        for i in 100..114 {
            sched.assign_new_vehicle(i, Color::C1).unwrap();
        }
        assert!(sched.lanes[&BufferId::L2].is_full());

        let overflow_before = sched.metrics.buffer_overflow_events;
        let result = sched.assign_new_vehicle(999, Color::C1);
        assert!(result.is_err(), "C1's list never reaches L5..L9 even though they have space");
        assert_eq!(sched.metrics.buffer_overflow_events, overflow_before + 1);
    }
}
