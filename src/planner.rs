//! Per-cycle highway planning pipeline
//!
//! telemetry -> maneuver -> setpoint -> minimum-jerk (s, d) samples
//! -> Cartesian knots -> dense output path

use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use crate::behavior::{
    BehaviorConfig, BehaviorEvaluator, Maneuver, ManeuverCosts, Setpoint, SetpointConfig,
    SetpointGenerator,
};
use crate::common::{CyclePlanner, Path2D, PlannerError, PlannerResult, Telemetry};
use crate::path_planning::{solve, PathConfig, PathResampler};
use crate::road::{FrenetFrame, LaneLayout, ReferenceCurve};

/// All tunables of the planner
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Speed limit [m/s]
    pub speed_limit: f64,
    /// Planning horizon [s]
    pub horizon: f64,
    pub lanes: LaneLayout,
    pub behavior: BehaviorConfig,
    pub setpoint: SetpointConfig,
    pub path: PathConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            speed_limit: 22.0,
            horizon: 2.0,
            lanes: LaneLayout::default(),
            behavior: BehaviorConfig::default(),
            setpoint: SetpointConfig::default(),
            path: PathConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.horizon > 0.0) {
            return Err(PlannerError::InvalidDuration(self.horizon));
        }
        if !(self.speed_limit > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "speed limit must be positive, got {}", self.speed_limit
            )));
        }
        self.lanes.validate()?;
        self.behavior.validate()?;
        self.path.validate()?;
        // Two samples at t < horizon are needed to fit the output path
        if self.horizon <= self.path.sample_step {
            return Err(PlannerError::InvalidParameter(format!(
                "horizon {} must exceed the sample step {}",
                self.horizon, self.path.sample_step
            )));
        }
        Ok(())
    }
}

/// Everything decided in one cycle
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub maneuver: Maneuver,
    pub costs: ManeuverCosts,
    pub setpoint: Setpoint,
    pub path: Path2D,
}

pub struct HighwayPlanner {
    config: PlannerConfig,
    frame: FrenetFrame,
    evaluator: BehaviorEvaluator,
    generator: SetpointGenerator,
}

impl HighwayPlanner {
    pub fn new(curve: Arc<ReferenceCurve>, config: PlannerConfig) -> PlannerResult<Self> {
        config.validate()?;
        let track_length = curve.total_length();
        Ok(Self {
            config,
            frame: FrenetFrame::new(curve),
            evaluator: BehaviorEvaluator::new(
                config.behavior,
                config.lanes,
                config.speed_limit,
                config.horizon,
                track_length,
            ),
            generator: SetpointGenerator::new(config.setpoint, config.lanes, track_length),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn frame(&self) -> &FrenetFrame {
        &self.frame
    }

    pub fn plan(&self, telemetry: &Telemetry) -> PlannerResult<PlanOutcome> {
        let costs = self.evaluator.costs(telemetry);
        let maneuver = costs.best();
        let setpoint = self.generator.generate(
            maneuver,
            telemetry,
            self.config.speed_limit,
            self.config.horizon,
        );

        let step = self.config.path.sample_step;
        let long_samples: Vec<f64> = solve(&setpoint.longitudinal, step)?.collect();
        let lat_samples: Vec<f64> = solve(&setpoint.lateral, step)?.collect();

        let path = PathResampler::new(&self.frame, self.config.path)
            .resample(&long_samples, &lat_samples)?;
        debug!(
            "Planned {} into lane {} at {:.2} m/s ({} points)",
            maneuver, setpoint.destination_lane, setpoint.target_speed(), path.len()
        );

        Ok(PlanOutcome { maneuver, costs, setpoint, path })
    }
}

impl CyclePlanner for HighwayPlanner {
    fn plan_cycle(&self, telemetry: &Telemetry) -> PlannerResult<Path2D> {
        self.plan(telemetry).map(|outcome| outcome.path)
    }
}
