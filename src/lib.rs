//! FaceLink - Runtime Character Model Substitution
//!
//! Replaces a host-rendered character's mesh with a user-supplied one and
//! keeps the substitute's blend shapes in sync with the original facial
//! animation.
//!
//! # Architecture
//!
//! - Scene: host-agnostic node tree, skinned renderers and meshes
//! - Swap: one-shot geometry substitution onto the host skeleton
//! - Sync: per-frame channel mapping, freeze-on-pause and weight transforms
//! - Config: blend shape rules (JSON) and plugin toggles

pub mod cli;
pub mod config;
pub mod error;
pub mod scene;
pub mod swap;
pub mod sync;

pub use error::{FaceLinkError, Result, SubstitutionWarning};
