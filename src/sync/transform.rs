//! Weight transform function and category matcher
//!
//! `transform_weight` is stateless: the output depends only on the source
//! weight and the parameters.

use std::fmt;

use crate::scene::{MAX_WEIGHT, MIN_WEIGHT};

/// Threshold ranges narrower than this are treated as a step function
pub const RANGE_EPSILON: f32 = 0.001;

/// Numeric fields shared by overrides and category rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub lower: f32,
    pub upper: f32,
    pub multiplier: f32,
    pub inverted: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            lower: MIN_WEIGHT,
            upper: MAX_WEIGHT,
            multiplier: 1.0,
            inverted: false,
        }
    }
}

/// Map a source weight through thresholds, multiplier and inversion
///
/// The value (inverted first if requested) is normalized into
/// `[lower, upper]`, scaled back to 0-100, multiplied and clamped. When the
/// range is degenerate (`upper - lower <= RANGE_EPSILON`) anything strictly
/// above `lower` maps to full weight.
pub fn transform_weight(source: f32, params: &TransformParams) -> f32 {
    let value = if params.inverted {
        MAX_WEIGHT - source
    } else {
        source
    };

    let range = params.upper - params.lower;
    let normalized = if range > RANGE_EPSILON {
        ((value - params.lower) / range).clamp(0.0, 1.0)
    } else if value > params.lower {
        1.0
    } else {
        0.0
    };

    (normalized * MAX_WEIGHT * params.multiplier).clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// Channel groupings with their own global rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Mouth,
    Eye,
}

impl Category {
    /// Category of a channel, computed from its name
    ///
    /// Names containing `Mouth` are mouth channels. Names containing `Eye`
    /// are eye channels unless they also contain `blink` in any case. Mouth
    /// is checked first.
    pub fn of(channel_name: &str) -> Option<Category> {
        if channel_name.contains("Mouth") {
            return Some(Category::Mouth);
        }
        if channel_name.contains("Eye") && !channel_name.to_lowercase().contains("blink") {
            return Some(Category::Eye);
        }
        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mouth => "mouth",
            Category::Eye => "eye",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
