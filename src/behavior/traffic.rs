//! Queries over surrounding traffic, and optional speed smoothing by id

use std::collections::HashMap;

use log::trace;

use crate::common::{OtherVehicle, PlannerError, PlannerResult, Telemetry};
use crate::road::{progress_delta, LaneLayout};

/// Another vehicle together with its along-road distance from the ego vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub vehicle: OtherVehicle,
    /// Non-negative distance along the road [m]
    pub gap: f64,
}

/// Nearest vehicle in `lane` at or ahead of the ego vehicle.
/// A vehicle exactly alongside counts as ahead with a zero gap.
pub fn nearest_ahead(
    telemetry: &Telemetry,
    lanes: &LaneLayout,
    lane: usize,
    track_length: f64,
) -> Option<Neighbor> {
    telemetry.others.iter()
        .filter(|v| lanes.lane_at(v.lateral_offset) == Some(lane))
        .map(|v| Neighbor {
            vehicle: *v,
            gap: progress_delta(telemetry.ego_progress, v.progress, track_length),
        })
        .filter(|n| n.gap >= 0.0)
        .min_by(|a, b| a.gap.total_cmp(&b.gap))
}

/// Nearest vehicle in `lane` strictly behind the ego vehicle
pub fn nearest_behind(
    telemetry: &Telemetry,
    lanes: &LaneLayout,
    lane: usize,
    track_length: f64,
) -> Option<Neighbor> {
    telemetry.others.iter()
        .filter(|v| lanes.lane_at(v.lateral_offset) == Some(lane))
        .map(|v| Neighbor {
            vehicle: *v,
            gap: -progress_delta(telemetry.ego_progress, v.progress, track_length),
        })
        .filter(|n| n.gap > 0.0)
        .min_by(|a, b| a.gap.total_cmp(&b.gap))
}

/// Exponential smoothing of other vehicles' speeds, keyed by id.
///
/// Ids missing from a snapshot are forgotten, so a vehicle that drops out of
/// sensor range and comes back starts from its raw speed again.
#[derive(Debug, Clone)]
pub struct TrafficTracker {
    alpha: f64,
    speeds: HashMap<i64, f64>,
}

impl TrafficTracker {
    /// `alpha` is the weight of the newest measurement, in (0, 1]
    pub fn new(alpha: f64) -> PlannerResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "smoothing factor must be in (0, 1], got {}", alpha
            )));
        }
        Ok(Self { alpha, speeds: HashMap::new() })
    }

    pub fn tracked(&self) -> usize {
        self.speeds.len()
    }

    /// Smooth `telemetry` against the previous snapshots
    pub fn update(&mut self, telemetry: &Telemetry) -> Telemetry {
        let mut next = HashMap::with_capacity(telemetry.others.len());
        let others = telemetry.others.iter()
            .map(|v| {
                let speed = match self.speeds.get(&v.id) {
                    Some(&prev) => self.alpha * v.speed + (1.0 - self.alpha) * prev,
                    None => v.speed,
                };
                next.insert(v.id, speed);
                OtherVehicle { speed, ..*v }
            })
            .collect();

        let dropped = self.speeds.keys().filter(|id| !next.contains_key(*id)).count();
        if dropped > 0 {
            trace!("Dropped {} vehicles from the traffic tracker", dropped);
        }
        self.speeds = next;

        Telemetry { others, ..telemetry.clone() }
    }
}
