//! Tagged-union dispatch over the fixed stage set.

use crate::deadzone::Deadzone;
use crate::linear_map::LinearMap;
use crate::moving_average::MovingAverage;

/// Discriminant identifying a stage variant.
///
/// Used to address a stage inside a pipeline by what it is rather than by
/// position, e.g. "bypass the deadzone on this axis".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Linear range remapping.
    LinearMap,
    /// Deadzone suppression.
    Deadzone,
    /// Sliding-window average filter.
    MovingAverage,
}

/// One transform stage.
///
/// The stage set is closed and known at design time, so this is an enum over
/// the three variants instead of a trait object; dispatch is a match, and a
/// pipeline of stages stays `Copy`-free but allocation-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Linear range remapping.
    LinearMap(LinearMap),
    /// Deadzone suppression.
    Deadzone(Deadzone),
    /// Sliding-window average filter.
    MovingAverage(MovingAverage),
}

impl Stage {
    /// The variant discriminant.
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::LinearMap(_) => StageKind::LinearMap,
            Stage::Deadzone(_) => StageKind::Deadzone,
            Stage::MovingAverage(_) => StageKind::MovingAverage,
        }
    }

    /// Runs the stage transform on one sample.
    ///
    /// Bypass is handled by the pipeline, not here: `compute` always applies
    /// the transform.
    pub fn compute(&mut self, input: i16) -> i16 {
        match self {
            Stage::LinearMap(map) => map.compute(input),
            Stage::Deadzone(dz) => dz.compute(input),
            Stage::MovingAverage(filter) => filter.compute(input),
        }
    }

    /// True when the stage output can evolve even for a repeated input.
    ///
    /// The pipeline must not short-circuit evaluation around such a stage.
    pub fn is_stateful(&self) -> bool {
        matches!(self, Stage::MovingAverage(_))
    }

    /// Sets or clears the bypass flag.
    pub fn set_bypassed(&mut self, bypassed: bool) {
        match self {
            Stage::LinearMap(map) => map.set_bypassed(bypassed),
            Stage::Deadzone(dz) => dz.set_bypassed(bypassed),
            Stage::MovingAverage(filter) => filter.set_bypassed(bypassed),
        }
    }

    /// True when the stage is currently bypassed.
    pub fn is_bypassed(&self) -> bool {
        match self {
            Stage::LinearMap(map) => map.is_bypassed(),
            Stage::Deadzone(dz) => dz.is_bypassed(),
            Stage::MovingAverage(filter) => filter.is_bypassed(),
        }
    }

    /// True when a parameter changed since the last acknowledgement.
    pub fn has_changed(&self) -> bool {
        match self {
            Stage::LinearMap(map) => map.has_changed(),
            Stage::Deadzone(dz) => dz.has_changed(),
            Stage::MovingAverage(filter) => filter.has_changed(),
        }
    }

    /// Clears the changed flag.
    pub fn acknowledge_change(&mut self) {
        match self {
            Stage::LinearMap(map) => map.acknowledge_change(),
            Stage::Deadzone(dz) => dz.acknowledge_change(),
            Stage::MovingAverage(filter) => filter.acknowledge_change(),
        }
    }

    /// The linear map parameters, when this is a linear map stage.
    pub fn as_linear_map_mut(&mut self) -> Option<&mut LinearMap> {
        match self {
            Stage::LinearMap(map) => Some(map),
            _ => None,
        }
    }

    /// The deadzone parameters, when this is a deadzone stage.
    pub fn as_deadzone_mut(&mut self) -> Option<&mut Deadzone> {
        match self {
            Stage::Deadzone(dz) => Some(dz),
            _ => None,
        }
    }

    /// The filter state, when this is a moving-average stage.
    pub fn as_moving_average_mut(&mut self) -> Option<&mut MovingAverage> {
        match self {
            Stage::MovingAverage(filter) => Some(filter),
            _ => None,
        }
    }
}

impl From<LinearMap> for Stage {
    fn from(map: LinearMap) -> Self {
        Stage::LinearMap(map)
    }
}

impl From<Deadzone> for Stage {
    fn from(dz: Deadzone) -> Self {
        Stage::Deadzone(dz)
    }
}

impl From<MovingAverage> for Stage {
    fn from(filter: MovingAverage) -> Self {
        Stage::MovingAverage(filter)
    }
}
