//! Blend Shape Synchronization Module
//!
//! Per-frame pipeline from the original renderer to the substitute:
//! - Channel map: name-based index correspondence, built once
//! - Freeze controller: stable source weights while animation is paused
//! - Transform: thresholds, multiplier and inversion per rule
//! - Linker: rule resolution and write-back

mod freeze;
mod linker;
mod mapping;
mod transform;

pub use freeze::{AnimationDriver, DriverState, FreezeController, ManualDriver};
pub use linker::{ChannelRow, WeightRule, WeightTransformEngine};
pub use mapping::ChannelMap;
pub use transform::{transform_weight, Category, TransformParams, RANGE_EPSILON};
