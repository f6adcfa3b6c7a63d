pub mod engine;
pub mod entry;
pub mod error;

pub use engine::{AppliedChange, Replayed, replay, replay_into, replay_log};
pub use error::{DiagnosticError, ReplayError};
