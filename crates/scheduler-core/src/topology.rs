//! Static, read-only configuration tables: buffer capacities, preferred buffer lists,
//! oven zones, and changeover penalty weights. Nothing in this module is mutated after
//! construction; a [`Topology`] is built once and shared (by value — it is cheap and `Copy`
//! at the field level) across the allocator, dispatcher, and tick engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::error::CoreError;

use crate::color::Color;

/// Identity of one of the nine buffer lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BufferId {
    L1,
    L2,
    L3,
    L4,
    L5,
    L6,
    L7,
    L8,
    L9,
}

impl BufferId {
    pub const ALL: [BufferId; 9] = [
        BufferId::L1,
        BufferId::L2,
        BufferId::L3,
        BufferId::L4,
        BufferId::L5,
        BufferId::L6,
        BufferId::L7,
        BufferId::L8,
        BufferId::L9,
    ];

    fn number(self) -> u32 {
        match self {
            BufferId::L1 => 1,
            BufferId::L2 => 2,
            BufferId::L3 => 3,
            BufferId::L4 => 4,
            BufferId::L5 => 5,
            BufferId::L6 => 6,
            BufferId::L7 => 7,
            BufferId::L8 => 8,
            BufferId::L9 => 9,
        }
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.number())
    }
}

impl FromStr for BufferId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BufferId::ALL
            .iter()
            .copied()
            .find(|b| b.to_string() == s)
            .ok_or_else(|| CoreError::UnknownBuffer(s.to_string()))
    }
}

/// Which oven a vehicle was painted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OvenId {
    O1,
    O2,
}

impl fmt::Display for OvenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OvenId::O1 => write!(f, "O1"),
            OvenId::O2 => write!(f, "O2"),
        }
    }
}

/// The three changeover penalty components, in seconds.
pub const CHANGEOVER_BASE: u32 = 60;
pub const CHANGEOVER_HIGH_VOLUME: u32 = 30;
pub const CHANGEOVER_LARGE_BATCH: u32 = 20;
/// A lane is considered to be carrying a "large batch" once it holds more than this many
/// vehicles of the current color — breaking that run costs the extra penalty above.
pub const LARGE_BATCH_THRESHOLD: usize = 5;

/// The fixed shift length efficiency is measured against.
pub const SHIFT_SECONDS: f64 = 28_800.0;
/// Seconds charged per cross-zone (O1 → O2) stoppage event.
pub const STOPPAGE_PENALTY_SECONDS: u32 = 120;

/// Static per-lane metadata: capacity, oven zone, flex flag, and primary colors.
#[derive(Debug, Clone, Copy)]
pub struct LaneSpec {
    pub id: BufferId,
    pub capacity: usize,
    pub oven: OvenId,
    pub is_flex: bool,
}

fn lane_spec(id: BufferId) -> LaneSpec {
    use BufferId::*;
    use OvenId::*;
    match id {
        L1 => LaneSpec { id, capacity: 14, oven: O1, is_flex: false },
        L2 => LaneSpec { id, capacity: 14, oven: O1, is_flex: true },
        L3 => LaneSpec { id, capacity: 14, oven: O1, is_flex: false },
        L4 => LaneSpec { id, capacity: 14, oven: O1, is_flex: true },
        L5 => LaneSpec { id, capacity: 16, oven: O2, is_flex: false },
        L6 => LaneSpec { id, capacity: 16, oven: O2, is_flex: false },
        L7 => LaneSpec { id, capacity: 16, oven: O2, is_flex: false },
        L8 => LaneSpec { id, capacity: 16, oven: O2, is_flex: false },
        L9 => LaneSpec { id, capacity: 16, oven: O2, is_flex: true },
    }
}

/// Colors a lane is nominally dedicated to. Informational for reporting; admission is
/// governed entirely by [`preferred_buffers`], not by this set.
fn primary_colors(id: BufferId) -> &'static [Color] {
    use BufferId::*;
    use Color::*;
    match id {
        L1 => &[C1],
        L2 => &[C1, C2],
        L3 => &[C2],
        L4 => &[C2, C3],
        L5 => &[C4, C5],
        L6 => &[C6, C7],
        L7 => &[C8, C9],
        L8 => &[C10, C11],
        L9 => &[C12],
    }
}

/// Ordered preferred-buffer list per color; the allocator walks this in order.
fn preferred_buffers(color: Color) -> &'static [BufferId] {
    use BufferId::*;
    use Color::*;
    match color {
        C1 => &[L1, L2],
        C2 => &[L3, L2, L4],
        C3 => &[L4, L2],
        C4 => &[L5, L9],
        C5 => &[L5, L9],
        C6 => &[L6, L9],
        C7 => &[L6, L9],
        C8 => &[L7, L9],
        C9 => &[L7, L9],
        C10 => &[L8, L9],
        C11 => &[L8, L9],
        C12 => &[L9],
    }
}

/// The four O1-zone lanes, in lane-id order.
pub const O1_LANES: [BufferId; 4] = [BufferId::L1, BufferId::L2, BufferId::L3, BufferId::L4];
/// The five O2-zone lanes, in lane-id order.
pub const O2_LANES: [BufferId; 5] =
    [BufferId::L5, BufferId::L6, BufferId::L7, BufferId::L8, BufferId::L9];

/// The policy tables as a value, so the allocator/dispatcher/tick engine can take it by
/// reference without reaching back into free functions scattered across the module.
#[derive(Debug, Clone, Copy, Default)]
pub struct Topology;

impl Topology {
    pub fn lane_spec(&self, id: BufferId) -> LaneSpec {
        lane_spec(id)
    }

    pub fn primary_colors(&self, id: BufferId) -> &'static [Color] {
        primary_colors(id)
    }

    pub fn preferred_buffers(&self, color: Color) -> &'static [BufferId] {
        preferred_buffers(color)
    }

    pub fn zone(&self, oven: OvenId) -> &'static [BufferId] {
        match oven {
            OvenId::O1 => &O1_LANES,
            OvenId::O2 => &O2_LANES,
        }
    }

    /// O1 for high-volume colors, O2 otherwise.
    pub fn oven_for(&self, color: Color) -> OvenId {
        if color.is_high_volume() {
            OvenId::O1
        } else {
            OvenId::O2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_match_the_policy_table() {
        let topo = Topology;
        for lane in [BufferId::L1, BufferId::L2, BufferId::L3, BufferId::L4] {
            assert_eq!(topo.lane_spec(lane).capacity, 14);
        }
        for lane in [BufferId::L5, BufferId::L6, BufferId::L7, BufferId::L8, BufferId::L9] {
            assert_eq!(topo.lane_spec(lane).capacity, 16);
        }
    }

    #[test]
    fn preferred_lists_match_the_policy_table() {
        let topo = Topology;
        assert_eq!(topo.preferred_buffers(Color::C2), &[BufferId::L3, BufferId::L2, BufferId::L4]);
        assert_eq!(topo.preferred_buffers(Color::C12), &[BufferId::L9]);
    }

    #[test]
    fn high_volume_colors_route_to_o1() {
        let topo = Topology;
        assert_eq!(topo.oven_for(Color::C1), OvenId::O1);
        assert_eq!(topo.oven_for(Color::C3), OvenId::O1);
        assert_eq!(topo.oven_for(Color::C4), OvenId::O2);
        assert_eq!(topo.oven_for(Color::C12), OvenId::O2);
    }
}
