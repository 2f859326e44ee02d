//! Lane-level maneuvers considered each control cycle

use std::fmt;

use crate::road::LaneLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maneuver {
    KeepLane,
    ChangeLeft,
    ChangeRight,
}

impl Maneuver {
    /// All maneuvers, in tie-break preference order
    pub const ALL: [Maneuver; 3] = [Maneuver::KeepLane, Maneuver::ChangeLeft, Maneuver::ChangeRight];

    /// Lane this maneuver ends in when started from `current`, or `None`
    /// when that lane does not exist.
    pub fn target_lane(&self, lanes: &LaneLayout, current: usize) -> Option<usize> {
        match self {
            Maneuver::KeepLane => Some(current),
            Maneuver::ChangeLeft => lanes.left_of(current),
            Maneuver::ChangeRight => lanes.right_of(current),
        }
    }

    pub fn is_lane_change(&self) -> bool {
        !matches!(self, Maneuver::KeepLane)
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Maneuver::KeepLane => "keep lane",
            Maneuver::ChangeLeft => "change left",
            Maneuver::ChangeRight => "change right",
        };
        f.write_str(name)
    }
}
