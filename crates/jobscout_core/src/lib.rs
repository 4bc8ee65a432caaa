//! Jobscout core: pure tab-registry state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{RegistryState, TabId, TabState, TabVerdict};
pub use update::update;
pub use view_model::{
    Badge, RegistryViewModel, TabRowView, EMPTY_BADGE_COLOR, JOB_BADGE_COLOR, JOB_BADGE_TEXT,
};
