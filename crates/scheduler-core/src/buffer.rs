use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::topology::{BufferId, LaneSpec, OvenId};

/// A finite-capacity FIFO holding post-oven, pre-conveyor vehicles.
///
/// Head (index 0) is the next vehicle to drain; tail is the most recently admitted vehicle.
/// See the module-level invariants re-checked by [`BufferLane::check_invariants`], which
/// property tests lean on directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferLane {
    pub buffer_id: BufferId,
    pub capacity: usize,
    pub vehicles: Vec<u64>,
    pub current_occupancy: usize,
    pub current_color: Option<Color>,
    pub last_color: Option<Color>,
    pub current_batch_id: Option<String>,
    pub color_counts: HashMap<Color, usize>,
    pub is_available: bool,
    pub is_flex: bool,
    pub primary_colors: Vec<Color>,
    pub oven: OvenId,
}

impl BufferLane {
    pub fn new(spec: LaneSpec, primary_colors: &[Color]) -> Self {
        Self {
            buffer_id: spec.id,
            capacity: spec.capacity,
            vehicles: Vec::new(),
            current_occupancy: 0,
            current_color: None,
            last_color: None,
            current_batch_id: None,
            color_counts: HashMap::new(),
            is_available: true,
            is_flex: spec.is_flex,
            primary_colors: primary_colors.to_vec(),
            oven: spec.oven,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_occupancy >= self.capacity
    }

    pub fn available_space(&self) -> usize {
        self.capacity.saturating_sub(self.current_occupancy)
    }

    pub fn occupancy_percent(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            (self.current_occupancy as f64 / self.capacity as f64) * 100.0
        }
    }

    /// Admit `color` at the tail of the lane, with accounting the caller (the allocator) has
    /// already decided is legal — this method does not itself check capacity/availability.
    pub fn admit(&mut self, car_id: u64, color: Color) {
        let was_empty = self.current_occupancy == 0;
        self.vehicles.push(car_id);
        self.current_occupancy += 1;
        *self.color_counts.entry(color).or_insert(0) += 1;

        if self.current_color != Some(color) {
            self.last_color = self.current_color;
        }
        self.current_color = Some(color);
        let _ = was_empty;
    }

    /// The longest same-color run at the head of the lane: `(color, length)`, or `(None, 0)`
    /// when empty. `vehicle_color` resolves a car_id to its color.
    pub fn head_run(&self, mut vehicle_color: impl FnMut(u64) -> Color) -> (Option<Color>, usize) {
        let Some(&first) = self.vehicles.first() else {
            return (None, 0);
        };
        let first_color = vehicle_color(first);
        let mut length = 1;
        for &car_id in self.vehicles.iter().skip(1) {
            if vehicle_color(car_id) == first_color {
                length += 1;
            } else {
                break;
            }
        }
        (Some(first_color), length)
    }

    /// Drain up to `count` vehicles from the head, returning their ids. The caller is
    /// responsible for looking up each drained vehicle's color to update `color_counts`
    /// (the lane itself does not hold a vehicle map) via [`BufferLane::record_drain`].
    pub fn drain_head(&mut self, count: usize) -> Vec<u64> {
        let n = count.min(self.vehicles.len());
        let drained: Vec<u64> = self.vehicles.drain(0..n).collect();
        self.current_occupancy -= drained.len();
        drained
    }

    /// Update `color_counts` for one drained vehicle; call once per id returned by
    /// [`BufferLane::drain_head`].
    pub fn record_drain(&mut self, color: Color) {
        if let Some(c) = self.color_counts.get_mut(&color) {
            *c = c.saturating_sub(1);
        }
    }

    /// After a drain, clear `current_color`/`current_batch_id` if the lane is now empty.
    pub fn settle_after_drain(&mut self) {
        if self.current_occupancy == 0 {
            self.current_color = None;
            self.current_batch_id = None;
        }
    }

    #[cfg(test)]
    pub fn check_invariants(&self) {
        assert_eq!(self.current_occupancy, self.vehicles.len());
        assert!(self.current_occupancy <= self.capacity);
        let sum: usize = self.color_counts.values().sum();
        assert_eq!(sum, self.current_occupancy);
        assert_eq!(self.current_color.is_none(), self.current_occupancy == 0);
    }
}
