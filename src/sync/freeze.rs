//! Animation-pause freeze controller
//!
//! Watches the animation driver bound to the skeleton. On a running ->
//! paused transition the live original weights of every mapped channel are
//! snapshotted; while paused, reads come from that snapshot. Once the driver
//! runs again reads go back to the live renderer.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::mapping::ChannelMap;
use crate::scene::{SkinnedRenderer, MIN_WEIGHT};

/// External animation driver (e.g. an animator component) bound to the skeleton
pub trait AnimationDriver {
    /// Whether the driver is currently advancing the animation
    fn is_running(&self) -> bool;
}

/// Driver whose state is set explicitly by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualDriver {
    pub running: bool,
}

impl ManualDriver {
    pub fn running() -> Self {
        Self { running: true }
    }

    pub fn paused() -> Self {
        Self { running: false }
    }
}

impl AnimationDriver for ManualDriver {
    fn is_running(&self) -> bool {
        self.running
    }
}

/// Observed driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Driver advancing; assumed until the first tick says otherwise
    #[default]
    Running,
    /// Driver stopped or absent
    Paused,
}

impl DriverState {
    fn from_driver(driver: Option<&dyn AnimationDriver>) -> Self {
        match driver {
            Some(d) if d.is_running() => DriverState::Running,
            _ => DriverState::Paused,
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Running => write!(f, "Running"),
            DriverState::Paused => write!(f, "Paused"),
        }
    }
}

/// Supplies per-tick source weights keyed by substitute channel index
///
/// Both buffers are refilled in place so steady-state ticks do not allocate.
#[derive(Debug, Clone, Default)]
pub struct FreezeController {
    last_state: DriverState,
    frozen: HashMap<usize, f32>,
    active: HashMap<usize, f32>,
}

impl FreezeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame and refresh the active source weights
    pub fn tick(
        &mut self,
        driver: Option<&dyn AnimationDriver>,
        map: &ChannelMap,
        original: &SkinnedRenderer,
    ) {
        let state = DriverState::from_driver(driver);

        if self.last_state == DriverState::Running && state == DriverState::Paused {
            Self::capture_into(&mut self.frozen, map, original);
            debug!(
                "[FREEZE] Animation paused, froze {} original weights",
                self.frozen.len()
            );
        } else if self.last_state == DriverState::Paused && state == DriverState::Running {
            debug!("[FREEZE] Animation resumed, reading live weights");
        }
        self.last_state = state;

        if state == DriverState::Running {
            Self::capture_into(&mut self.active, map, original);
        }
    }

    /// Refill `buffer` with the live original weights, reusing its storage
    fn capture_into(
        buffer: &mut HashMap<usize, f32>,
        map: &ChannelMap,
        original: &SkinnedRenderer,
    ) {
        buffer.clear();
        buffer.extend(map.iter().map(|(from, to)| (to, original.weight(from))));
    }

    /// Source weight for a substitute channel this tick (0 when unknown)
    pub fn source_weight(&self, substitute_index: usize) -> f32 {
        let source = match self.last_state {
            DriverState::Paused => &self.frozen,
            DriverState::Running => &self.active,
        };
        source
            .get(&substitute_index)
            .copied()
            .unwrap_or(MIN_WEIGHT)
    }

    pub fn state(&self) -> DriverState {
        self.last_state
    }

    pub fn is_frozen(&self) -> bool {
        self.last_state == DriverState::Paused
    }

    /// Last snapshot taken on pause
    pub fn frozen_weights(&self) -> &HashMap<usize, f32> {
        &self.frozen
    }
}
