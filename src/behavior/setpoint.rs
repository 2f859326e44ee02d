//! Boundary conditions for the trajectory synthesizer
//!
//! Longitudinally the ego vehicle moves from its current progress and speed
//! to a target speed, covering the distance of a linear speed ramp. The
//! target is the speed limit, or a safe-following speed when a vehicle is
//! ahead in the destination lane. Laterally it moves from rest at its current
//! offset to rest on the destination lane centerline.

use log::{trace, warn};
use serde::Deserialize;

use crate::behavior::traffic::nearest_ahead;
use crate::behavior::Maneuver;
use crate::common::Telemetry;
use crate::path_planning::BoundaryConditions;
use crate::road::LaneLayout;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SetpointConfig {
    /// Leaders further ahead than this do not limit the target speed [m]
    pub follow_lookahead: f64,
    /// Gap the following law converges to [m]
    pub safety_distance: f64,
    /// Speed correction per meter of gap error [1/s]
    pub follow_gain: f64,
}

impl Default for SetpointConfig {
    fn default() -> Self {
        Self {
            follow_lookahead: 60.0,
            safety_distance: 30.0,
            follow_gain: 0.5,
        }
    }
}

/// Longitudinal and lateral boundary conditions for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    pub longitudinal: BoundaryConditions,
    pub lateral: BoundaryConditions,
    pub destination_lane: usize,
}

impl Setpoint {
    pub fn target_speed(&self) -> f64 {
        self.longitudinal.vel1
    }
}

#[derive(Debug, Clone)]
pub struct SetpointGenerator {
    config: SetpointConfig,
    lanes: LaneLayout,
    track_length: f64,
}

impl SetpointGenerator {
    pub fn new(config: SetpointConfig, lanes: LaneLayout, track_length: f64) -> Self {
        Self { config, lanes, track_length }
    }

    pub fn generate(
        &self,
        maneuver: Maneuver,
        telemetry: &Telemetry,
        speed_limit: f64,
        horizon: f64,
    ) -> Setpoint {
        let ego_lane = self.lanes.nearest_lane(telemetry.ego_lateral);
        let destination_lane = match maneuver.target_lane(&self.lanes, ego_lane) {
            Some(lane) => lane,
            None => {
                warn!("No lane for {} from lane {}, keeping lane", maneuver, ego_lane);
                ego_lane
            }
        };

        let target_speed = self.target_speed(telemetry, destination_lane, speed_limit, horizon);

        let pos0 = telemetry.ego_progress;
        let vel0 = telemetry.ego_speed;
        let longitudinal = BoundaryConditions {
            pos0,
            vel0,
            acc0: 0.0,
            pos1: pos0 + 0.5 * (vel0 + target_speed) * horizon,
            vel1: target_speed,
            acc1: 0.0,
            duration: horizon,
        };
        let lateral = BoundaryConditions::rest_to_rest(
            telemetry.ego_lateral,
            self.lanes.lane_center(destination_lane),
            horizon,
        );
        trace!(
            "Setpoint {}: lane {} -> {}, speed {:.2} -> {:.2}",
            maneuver, ego_lane, destination_lane, vel0, target_speed
        );

        Setpoint { longitudinal, lateral, destination_lane }
    }

    /// Speed limit, or the safe-following speed behind the nearest leader in `lane`
    fn target_speed(&self, telemetry: &Telemetry, lane: usize, speed_limit: f64, horizon: f64) -> f64 {
        let leader = nearest_ahead(telemetry, &self.lanes, lane, self.track_length)
            .filter(|n| n.gap < self.config.follow_lookahead);
        match leader {
            Some(n) => {
                let v_lead = n.vehicle.speed;
                let predicted = n.gap + (v_lead - telemetry.ego_speed) * horizon;
                let gap = n.gap.min(predicted).max(0.0);
                let v_follow = v_lead + self.config.follow_gain * (gap - self.config.safety_distance);
                v_follow.min(speed_limit).max(0.0)
            }
            None => speed_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::OtherVehicle;
    use approx::assert_abs_diff_eq;

    const LIMIT: f64 = 22.0;
    const HORIZON: f64 = 2.0;
    const LOOP: f64 = 6945.554;

    fn generator() -> SetpointGenerator {
        SetpointGenerator::new(SetpointConfig::default(), LaneLayout::default(), LOOP)
    }

    #[test]
    fn test_free_road_from_standstill() {
        let t = Telemetry::ego_only(0.0, 2.0, 0.0);
        let sp = generator().generate(Maneuver::KeepLane, &t, LIMIT, HORIZON);
        assert_eq!(sp.destination_lane, 0);
        assert_eq!(sp.target_speed(), LIMIT);
        assert_abs_diff_eq!(sp.longitudinal.pos0, 0.0);
        assert_abs_diff_eq!(sp.longitudinal.pos1, 22.0);
        assert_abs_diff_eq!(sp.longitudinal.acc1, 0.0);
        assert_abs_diff_eq!(sp.lateral.pos0, 2.0);
        assert_abs_diff_eq!(sp.lateral.pos1, 2.0);
        assert_eq!(sp.lateral.duration, HORIZON);
    }

    #[test]
    fn test_follows_slower_leader() {
        let mut t = Telemetry::ego_only(100.0, 6.0, 10.0);
        t.others.push(OtherVehicle::new(1, 120.0, 6.0, 10.0));
        let sp = generator().generate(Maneuver::KeepLane, &t, LIMIT, HORIZON);
        // Inside the safety distance: slower than the leader
        assert!(sp.target_speed() < 10.0);
        assert_abs_diff_eq!(sp.target_speed(), 5.0);
        assert_abs_diff_eq!(sp.longitudinal.pos1, 100.0 + 0.5 * 15.0 * HORIZON);
    }

    #[test]
    fn test_closing_on_leader() {
        let mut t = Telemetry::ego_only(100.0, 2.0, 20.0);
        t.others.push(OtherVehicle::new(1, 125.0, 2.0, 15.0));
        let sp = generator().generate(Maneuver::KeepLane, &t, LIMIT, HORIZON);
        // 15 m left after the horizon
        assert_abs_diff_eq!(sp.target_speed(), 7.5);
        assert!(sp.target_speed() < 15.0);
    }

    #[test]
    fn test_never_exceeds_limit_or_reverses() {
        let mut t = Telemetry::ego_only(100.0, 6.0, 20.0);
        t.others.push(OtherVehicle::new(1, 155.0, 6.0, 30.0));
        let sp = generator().generate(Maneuver::KeepLane, &t, LIMIT, HORIZON);
        assert_eq!(sp.target_speed(), LIMIT);

        t.others[0] = OtherVehicle::new(1, 102.0, 6.0, 0.0);
        let sp = generator().generate(Maneuver::KeepLane, &t, LIMIT, HORIZON);
        assert_eq!(sp.target_speed(), 0.0);
    }

    #[test]
    fn test_bad_speed_limit_does_not_panic() {
        let mut t = Telemetry::ego_only(100.0, 6.0, 20.0);
        t.others.push(OtherVehicle::new(1, 120.0, 6.0, 15.0));
        let sp = generator().generate(Maneuver::KeepLane, &t, -1.0, HORIZON);
        assert_eq!(sp.target_speed(), 0.0);

        let sp = generator().generate(Maneuver::KeepLane, &t, f64::NAN, HORIZON);
        assert!(sp.target_speed() >= 0.0);
    }

    #[test]
    fn test_leader_beyond_lookahead_is_ignored() {
        let mut t = Telemetry::ego_only(100.0, 6.0, 20.0);
        t.others.push(OtherVehicle::new(1, 200.0, 6.0, 5.0));
        let sp = generator().generate(Maneuver::KeepLane, &t, LIMIT, HORIZON);
        assert_eq!(sp.target_speed(), LIMIT);
    }

    #[test]
    fn test_lane_change_targets_adjacent_center() {
        let mut t = Telemetry::ego_only(100.0, 6.3, 20.0);
        // Slow vehicle in the current lane does not limit a change to the left
        t.others.push(OtherVehicle::new(1, 110.0, 6.0, 5.0));
        let sp = generator().generate(Maneuver::ChangeLeft, &t, LIMIT, HORIZON);
        assert_eq!(sp.destination_lane, 0);
        assert_abs_diff_eq!(sp.lateral.pos0, 6.3);
        assert_abs_diff_eq!(sp.lateral.pos1, 2.0);
        assert_eq!(sp.lateral.vel1, 0.0);
        assert_eq!(sp.target_speed(), LIMIT);

        let sp = generator().generate(Maneuver::ChangeRight, &t, LIMIT, HORIZON);
        assert_eq!(sp.destination_lane, 2);
        assert_abs_diff_eq!(sp.lateral.pos1, 10.0);
    }

    #[test]
    fn test_missing_lane_falls_back_to_current() {
        let t = Telemetry::ego_only(0.0, 2.0, 15.0);
        let sp = generator().generate(Maneuver::ChangeLeft, &t, LIMIT, HORIZON);
        assert_eq!(sp.destination_lane, 0);
        assert_abs_diff_eq!(sp.lateral.pos1, 2.0);
    }
}
