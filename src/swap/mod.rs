//! Model Substitution Module
//!
//! One-shot replacement of the host character's geometry, followed by
//! attaching the blend shape weight transform engine.

mod accessory;
mod session;
mod substitute;

pub use accessory::{
    AccessoryConfigurator, AccessoryToggles, NoAccessories, GLASSES_NODE_NAME, GLASSES_POSITION,
    GLASSES_SCALE, HEADPHONES_NODE_NAME, HIDDEN_POSITION,
};
pub use session::{SkipReason, SubstitutionOutcome, SwapSession, CHARACTER_ROOT_NAME};
pub use substitute::{
    replace_renderers, SubstitutionReport, ACCESSORY_SUFFIX, FACE_RENDERER_NAME,
    FORCED_SHADER_NAME, PRINCIPAL_PART_NAME, ROOT_JOINT_NAME,
};
