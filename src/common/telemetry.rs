//! Per-cycle snapshot of the ego vehicle and surrounding traffic

/// Another vehicle detected this cycle, expressed in the road-relative frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtherVehicle {
    pub id: i64,
    /// Longitudinal progress along the reference curve [m]
    pub progress: f64,
    /// Lateral offset from the reference curve, positive to the right [m]
    pub lateral_offset: f64,
    /// Scalar speed [m/s]
    pub speed: f64,
}

impl OtherVehicle {
    pub fn new(id: i64, progress: f64, lateral_offset: f64, speed: f64) -> Self {
        Self { id, progress, lateral_offset, speed }
    }

    /// Build from a sensor-fusion row that reports Cartesian velocity components.
    pub fn from_velocity(id: i64, progress: f64, lateral_offset: f64, vx: f64, vy: f64) -> Self {
        Self::new(id, progress, lateral_offset, vx.hypot(vy))
    }
}

/// Input to the behavior and setpoint layers for one control cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Telemetry {
    pub ego_progress: f64,
    pub ego_lateral: f64,
    pub ego_speed: f64,
    pub others: Vec<OtherVehicle>,
}

impl Telemetry {
    pub fn new(ego_progress: f64, ego_lateral: f64, ego_speed: f64, others: Vec<OtherVehicle>) -> Self {
        Self { ego_progress, ego_lateral, ego_speed, others }
    }

    /// Telemetry with no surrounding traffic
    pub fn ego_only(ego_progress: f64, ego_lateral: f64, ego_speed: f64) -> Self {
        Self::new(ego_progress, ego_lateral, ego_speed, Vec::new())
    }
}
