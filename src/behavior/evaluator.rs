//! Maneuver selection by weighted cost
//!
//! Every cycle the three maneuvers are scored against the same telemetry
//! snapshot and the cheapest one wins. The score of a maneuver is the sum of
//!
//! - a proximity cost for the nearest vehicles ahead and behind in the lane
//!   the maneuver ends in, growing linearly as the gap closes and jumping by
//!   a large collision weight once the gap falls below a safety margin,
//! - a speed-opportunity reward for lanes that let the ego vehicle approach
//!   the speed limit,
//! - a constant comfort penalty for changing lanes.
//!
//! Gaps are evaluated both now and after the planning horizon assuming every
//! vehicle keeps its current speed; the smaller of the two is used.

use log::debug;
use ordered_float::OrderedFloat;
use serde::Deserialize;

use crate::behavior::traffic::{nearest_ahead, nearest_behind, Neighbor};
use crate::behavior::Maneuver;
use crate::common::{PlannerError, PlannerResult, Telemetry};
use crate::road::LaneLayout;

/// Cost weights and distances of the behavior layer
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Vehicles ahead further than this are ignored [m]
    pub lookahead: f64,
    /// Vehicles behind further than this are ignored [m]
    pub lookbehind: f64,
    /// Gap ahead below which a lane is considered blocked [m]
    pub safety_gap_ahead: f64,
    /// Gap behind below which a lane change would cut someone off [m]
    pub safety_gap_behind: f64,
    pub w_proximity_ahead: f64,
    pub w_proximity_behind: f64,
    pub w_collision: f64,
    pub w_speed: f64,
    pub w_lane_change: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            lookahead: 60.0,
            lookbehind: 30.0,
            safety_gap_ahead: 15.0,
            safety_gap_behind: 10.0,
            w_proximity_ahead: 1.0,
            w_proximity_behind: 0.5,
            w_collision: 1000.0,
            w_speed: 2.0,
            w_lane_change: 0.5,
        }
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.lookahead > 0.0) || !(self.lookbehind > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "lookahead and lookbehind must be positive, got {} and {}",
                self.lookahead, self.lookbehind
            )));
        }
        Ok(())
    }
}

/// Total cost of each maneuver for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverCosts {
    pub keep_lane: f64,
    pub change_left: f64,
    pub change_right: f64,
}

impl ManeuverCosts {
    pub fn get(&self, maneuver: Maneuver) -> f64 {
        match maneuver {
            Maneuver::KeepLane => self.keep_lane,
            Maneuver::ChangeLeft => self.change_left,
            Maneuver::ChangeRight => self.change_right,
        }
    }

    /// Cheapest maneuver; on equal cost the earlier one in [`Maneuver::ALL`] wins
    pub fn best(&self) -> Maneuver {
        Maneuver::ALL.iter()
            .copied()
            .min_by_key(|m| OrderedFloat(self.get(*m)))
            .unwrap_or(Maneuver::KeepLane)
    }
}

/// Stateless scorer of the maneuvers available to the ego vehicle
#[derive(Debug, Clone)]
pub struct BehaviorEvaluator {
    config: BehaviorConfig,
    lanes: LaneLayout,
    speed_limit: f64,
    horizon: f64,
    track_length: f64,
}

impl BehaviorEvaluator {
    pub fn new(
        config: BehaviorConfig,
        lanes: LaneLayout,
        speed_limit: f64,
        horizon: f64,
        track_length: f64,
    ) -> Self {
        Self { config, lanes, speed_limit, horizon, track_length }
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn evaluate(&self, telemetry: &Telemetry) -> Maneuver {
        self.costs(telemetry).best()
    }

    pub fn costs(&self, telemetry: &Telemetry) -> ManeuverCosts {
        let ego_lane = self.lanes.nearest_lane(telemetry.ego_lateral);
        let costs = ManeuverCosts {
            keep_lane: self.maneuver_cost(Maneuver::KeepLane, ego_lane, telemetry),
            change_left: self.maneuver_cost(Maneuver::ChangeLeft, ego_lane, telemetry),
            change_right: self.maneuver_cost(Maneuver::ChangeRight, ego_lane, telemetry),
        };
        debug!(
            "Lane {} costs: keep {:.3}, left {:.3}, right {:.3} -> {}",
            ego_lane, costs.keep_lane, costs.change_left, costs.change_right, costs.best()
        );
        costs
    }

    fn maneuver_cost(&self, maneuver: Maneuver, ego_lane: usize, telemetry: &Telemetry) -> f64 {
        let lane = match maneuver.target_lane(&self.lanes, ego_lane) {
            Some(lane) => lane,
            None => return f64::INFINITY,
        };

        let ahead = nearest_ahead(telemetry, &self.lanes, lane, self.track_length);
        let behind = nearest_behind(telemetry, &self.lanes, lane, self.track_length);
        let ahead_cost = ahead
            .map(|n| self.ahead_cost(&n, telemetry.ego_speed))
            .unwrap_or(0.0);

        let cost = if maneuver.is_lane_change() {
            let behind_cost = behind
                .map(|n| self.behind_cost(&n, telemetry.ego_speed, true))
                .unwrap_or(0.0);
            ahead_cost + behind_cost + self.config.w_lane_change
        } else {
            // Traffic behind in the own lane adds proximity only
            let behind_cost = behind
                .map(|n| self.behind_cost(&n, telemetry.ego_speed, false))
                .unwrap_or(0.0);
            ahead_cost + behind_cost
        };

        cost + self.speed_cost(ahead.as_ref())
    }

    fn ahead_cost(&self, neighbor: &Neighbor, ego_speed: f64) -> f64 {
        let gap_rate = neighbor.vehicle.speed - ego_speed;
        let gap = effective_gap(neighbor.gap, gap_rate, self.horizon);
        let mut cost = proximity(gap, self.config.lookahead, self.config.w_proximity_ahead);
        if gap < self.config.safety_gap_ahead {
            cost += self.config.w_collision;
        }
        cost
    }

    fn behind_cost(&self, neighbor: &Neighbor, ego_speed: f64, gated: bool) -> f64 {
        let gap_rate = ego_speed - neighbor.vehicle.speed;
        let gap = effective_gap(neighbor.gap, gap_rate, self.horizon);
        let mut cost = proximity(gap, self.config.lookbehind, self.config.w_proximity_behind);
        if gated && gap < self.config.safety_gap_behind {
            cost += self.config.w_collision;
        }
        cost
    }

    fn speed_cost(&self, ahead: Option<&Neighbor>) -> f64 {
        let lane_speed = ahead
            .filter(|n| n.gap < self.config.lookahead)
            .map(|n| n.vehicle.speed.min(self.speed_limit))
            .unwrap_or(self.speed_limit);
        -self.config.w_speed * lane_speed / self.speed_limit
    }
}

/// Smaller of the current gap and the gap after `horizon` at constant speeds,
/// where `gap_rate` is the rate at which the gap grows.
fn effective_gap(gap: f64, gap_rate: f64, horizon: f64) -> f64 {
    gap.min(gap + gap_rate * horizon).max(0.0)
}

fn proximity(gap: f64, range: f64, weight: f64) -> f64 {
    if gap < range {
        weight * (1.0 - gap / range)
    } else {
        0.0
    }
}
