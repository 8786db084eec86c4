//! Conveyor dispatch: picks the buffer lane with the longest same-color head-run and drains
//! up to `MAX_CONVEYOR_PICK` vehicles from it onto the conveyor.

use std::collections::HashMap;

use crate::buffer::BufferLane;
use crate::color::Color;
use crate::metrics::Metrics;
use crate::topology::BufferId;
use crate::vehicle::{Vehicle, VehicleStatus};

pub struct ConveyorDispatcher {
    pub max_pick: usize,
}

impl ConveyorDispatcher {
    pub fn new(max_pick: usize) -> Self {
        Self { max_pick }
    }

    /// Select a lane, drain its head-run, mark the drained vehicles `Painted`, and update
    /// `metrics`. Returns the drained car_ids in head-to-tail order (possibly empty).
    pub fn pick(
        &self,
        lanes: &mut HashMap<BufferId, BufferLane>,
        vehicles: &mut HashMap<u64, Vehicle>,
        metrics: &mut Metrics,
    ) -> Vec<u64> {
        let mut best: Option<(BufferId, Color, usize)> = None;

        let mut ids: Vec<BufferId> = lanes.keys().copied().collect();
        ids.sort();

        for id in ids {
            let lane = &lanes[&id];
            let (color, length) = lane.head_run(|car_id| vehicles[&car_id].color);

            match (best, color) {
                (None, Some(c)) if length > 0 => best = Some((id, c, length)),
                (Some((_, _, best_len)), Some(c)) if length > best_len => {
                    best = Some((id, c, length));
                }
                (Some((_, _, best_len)), Some(c)) if length == best_len && length > 0 => {
                    if Some(c) == metrics.last_painted_color {
                        best = Some((id, c, length));
                    }
                }
                _ => {}
            }
        }

        let Some((buffer_id, color, run_length)) = best else {
            return Vec::new();
        };

        let pick_count = run_length.min(self.max_pick);
        let lane = lanes.get_mut(&buffer_id).expect("selected lane must exist");
        let drained = lane.drain_head(pick_count);

        for &car_id in &drained {
            lane.record_drain(color);
            if let Some(v) = vehicles.get_mut(&car_id) {
                v.status = VehicleStatus::Painted;
            }
        }
        lane.settle_after_drain();

        if let Some(prev) = metrics.last_painted_color {
            if prev != color {
                metrics.total_changeovers += 1;
            }
        }
        metrics.last_painted_color = Some(color);
        metrics.throughput += drained.len() as u64;

        drained
    }
}
