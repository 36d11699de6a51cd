mod engine;
mod types;

pub use crate::error::{CoreError, CoreErrorCode};
pub use crate::game::{Game, GameVariant, Generation};
pub use engine::{Engine, Session};
pub use types::{
    BlockReport, Capabilities, CapabilityIssue, ValidationDetail, ValidationReport,
};
