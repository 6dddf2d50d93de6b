//! Chess client core: a two-player or versus-AI game session with tiered
//! move strategies and code-based synchronization between remote peers.
//!
//! The presentation layer lives behind the `gui` feature.

pub mod domain;
pub mod models;
pub mod settings;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
pub mod ui;

pub use models::{Mode, Session, SessionError, SyncOutcome, Tier};
pub use settings::Settings;
