//! Stateful application layer: the game session and what drives it.

pub mod engine;
pub mod notice;
pub mod peer;
pub mod session;
pub mod strategy;

pub use engine::{EngineError, EngineEvent, SimulatedEngine};
pub use notice::Notifications;
pub use peer::{PeerLink, SyncOutcome};
pub use session::{Mode, Phase, Session, SessionError};
pub use strategy::{Generation, MoveSelector, Resolved, Selection, Tier};
