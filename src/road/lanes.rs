//! Lane geometry across the road-relative lateral axis
//!
//! Lanes are counted from 0 at the reference curve (leftmost) outwards to
//! the right, matching the sign of the lateral offset.

use serde::Deserialize;

use crate::common::{PlannerError, PlannerResult};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    /// Width of one lane [m]
    pub lane_width: f64,
    /// Number of lanes in the direction of travel
    pub lane_count: usize,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            lane_width: 4.0,
            lane_count: 3,
        }
    }
}

impl LaneLayout {
    pub fn new(lane_width: f64, lane_count: usize) -> PlannerResult<Self> {
        let layout = Self { lane_width, lane_count };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.lane_width > 0.0) || self.lane_count == 0 {
            return Err(PlannerError::InvalidParameter(format!(
                "lane layout needs positive width and at least one lane, got {} x {}",
                self.lane_count, self.lane_width
            )));
        }
        Ok(())
    }

    /// Lane the lateral offset falls in, if it is on the road at all
    pub fn lane_at(&self, lateral: f64) -> Option<usize> {
        let lane = (lateral / self.lane_width).floor();
        if lane >= 0.0 && lane < self.lane_count as f64 {
            Some(lane as usize)
        } else {
            None
        }
    }

    /// Lane the lateral offset falls in, clamped onto the road
    pub fn nearest_lane(&self, lateral: f64) -> usize {
        let lane = (lateral / self.lane_width).floor().max(0.0) as usize;
        lane.min(self.lane_count - 1)
    }

    /// Lateral offset of the lane centerline
    pub fn lane_center(&self, lane: usize) -> f64 {
        self.lane_width * (lane as f64 + 0.5)
    }

    pub fn left_of(&self, lane: usize) -> Option<usize> {
        lane.checked_sub(1)
    }

    pub fn right_of(&self, lane: usize) -> Option<usize> {
        if lane + 1 < self.lane_count { Some(lane + 1) } else { None }
    }

    pub fn is_leftmost(&self, lane: usize) -> bool {
        lane == 0
    }

    pub fn is_rightmost(&self, lane: usize) -> bool {
        lane + 1 >= self.lane_count
    }
}
