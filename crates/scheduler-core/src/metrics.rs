use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::topology::{BufferId, Topology, O1_LANES, O2_LANES, STOPPAGE_PENALTY_SECONDS, SHIFT_SECONDS};
use crate::buffer::BufferLane;

/// Live counters updated by the allocator and dispatcher. Kept separate from the derived
/// snapshot (see [`MetricsSnapshot`]) so the hot path never pays for a `HashMap` clone.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub vehicles_processed: u64,
    pub total_changeovers: u64,
    pub o2_stoppage_events: u64,
    pub overflow_events: u64,
    pub buffer_overflow_events: u64,
    pub throughput: u64,
    pub last_painted_color: Option<Color>,
    pub current_tick: u64,
    pub simulation_running: bool,
}

/// A deep-copied, transport-ready view of the scheduler's current state. Built fresh on
/// every read so concurrent readers never observe a torn mutation mid-tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub vehicles_processed: u64,
    pub total_changeovers: u64,
    pub o2_stoppage_events: u64,
    pub overflow_events: u64,
    pub buffer_overflow_events: u64,
    pub throughput: u64,
    pub last_painted_color: Option<Color>,
    pub current_tick: u64,
    pub simulation_running: bool,
    pub efficiency_percent: f64,
    pub total_lost_time_seconds: u64,
    pub oven1_occupancy: usize,
    pub oven1_capacity: usize,
    pub oven2_occupancy: usize,
    pub oven2_capacity: usize,
    pub buffer_states: HashMap<BufferId, BufferLane>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the derived fields and package everything for external transport.
    pub fn snapshot(&self, lanes: &HashMap<BufferId, BufferLane>) -> MetricsSnapshot {
        let topo = Topology;
        let oven1_occupancy = zone_occupancy(lanes, &O1_LANES);
        let oven2_occupancy = zone_occupancy(lanes, &O2_LANES);
        let oven1_capacity: usize = O1_LANES.iter().map(|&id| topo.lane_spec(id).capacity).sum();
        let oven2_capacity: usize = O2_LANES.iter().map(|&id| topo.lane_spec(id).capacity).sum();

        let lost = self.total_changeovers * u64::from(crate::topology::CHANGEOVER_BASE)
            + self.o2_stoppage_events * u64::from(STOPPAGE_PENALTY_SECONDS);
        let efficiency_percent = (100.0 - (lost as f64 / SHIFT_SECONDS * 100.0)).max(0.0);

        MetricsSnapshot {
            vehicles_processed: self.vehicles_processed,
            total_changeovers: self.total_changeovers,
            o2_stoppage_events: self.o2_stoppage_events,
            overflow_events: self.overflow_events,
            buffer_overflow_events: self.buffer_overflow_events,
            throughput: self.throughput,
            last_painted_color: self.last_painted_color,
            current_tick: self.current_tick,
            simulation_running: self.simulation_running,
            efficiency_percent,
            total_lost_time_seconds: lost,
            oven1_occupancy,
            oven1_capacity,
            oven2_occupancy,
            oven2_capacity,
            buffer_states: lanes.clone(),
        }
    }
}

fn zone_occupancy(lanes: &HashMap<BufferId, BufferLane>, zone: &[BufferId]) -> usize {
    zone.iter().filter_map(|id| lanes.get(id)).map(|l| l.current_occupancy).sum()
}

/// Per-buffer changeover count derived from `last_color != current_color`, and a
/// per-color-per-buffer distribution — the `report` command's payload beyond the raw
/// metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub metrics: MetricsSnapshot,
    pub color_distribution: HashMap<BufferId, HashMap<Color, usize>>,
    pub buffer_changeovers: HashMap<BufferId, bool>,
}

pub fn build_report(metrics: &Metrics, lanes: &HashMap<BufferId, BufferLane>) -> ReportPayload {
    let snapshot = metrics.snapshot(lanes);
    let mut color_distribution = HashMap::new();
    let mut buffer_changeovers = HashMap::new();

    for (&id, lane) in lanes {
        color_distribution.insert(id, lane.color_counts.clone());
        buffer_changeovers.insert(id, lane.last_color != lane.current_color);
    }

    ReportPayload { metrics: snapshot, color_distribution, buffer_changeovers }
}
