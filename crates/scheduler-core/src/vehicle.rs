use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::topology::{BufferId, OvenId};

/// Lifecycle state of a vehicle.
///
/// `InOven` and `OnConveyor` are reserved for the external system (a vehicle sits "in oven"
/// before it ever reaches the core's oven *queue*, and "on conveyor" is a transient external
/// presentation state after the dispatcher marks it `Painted`): the core itself only ever
/// sets `Waiting`, `InBuffer`, and `Painted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Waiting,
    InOven,
    InBuffer,
    OnConveyor,
    Painted,
}

/// A single vehicle moving through the paint shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub car_id: u64,
    pub color: Color,
    pub oven: OvenId,
    pub buffer: Option<BufferId>,
    pub status: VehicleStatus,
    pub batch_id: Option<String>,
    pub priority: u32,
}

impl Vehicle {
    /// Construct a freshly generated, still-`Waiting` vehicle. `priority` is derived from
    /// the color's numeric suffix, matching the reference generator's `int(color[1:])`.
    pub fn new(car_id: u64, color: Color, oven: OvenId) -> Self {
        Self {
            car_id,
            color,
            oven,
            buffer: None,
            status: VehicleStatus::Waiting,
            batch_id: None,
            priority: color.index(),
        }
    }
}
