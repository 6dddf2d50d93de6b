//! Remote play by exchanging position codes.
//!
//! There is no connection between the peers. Each side publishes the code of
//! the position after its move and the other side pastes it in. Adopting a
//! code replaces the local game outright; the last code wins.

use shakmaty::{Color, Position};
use tracing::{info, warn};

use crate::domain::codec::{decode, encode};
use crate::domain::history::History;
use crate::models::session::{Mode, Session, SessionError};

/// Code most recently handed to the peer
#[derive(Clone, Debug, Default)]
pub struct PeerLink {
    published: Option<String>,
}

impl PeerLink {
    pub fn published(&self) -> Option<&str> {
        self.published.as_deref()
    }

    pub fn publish(&mut self, code: String) {
        self.published = Some(code);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The code is the one this session already has
    AlreadyCurrent,
    /// The peer's position replaced the local game
    Adopted,
}

impl Session {
    /// Start a remote game from the standard position, playing White.
    /// Returns the code to send to the peer.
    pub fn create_remote_game(&mut self) -> String {
        self.begin_remote_game(History::new(), Color::White);
        self.notify("New game created! Send the code to your friend.");
        info!("remote game created");
        self.fen()
    }

    /// Join a game from a code received from the peer. The local side
    /// becomes whichever side is to move in that position.
    ///
    /// On an invalid code nothing changes.
    pub fn join_remote_game(&mut self, code: &str) -> Result<Color, SessionError> {
        let position = match decode(code) {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "join rejected");
                self.notify("Invalid Game Code.");
                return Err(e.into());
            }
        };

        let color = position.turn();
        self.begin_remote_game(History::from_position(position), color);
        self.notify("Game joined! It's your turn.");
        info!(?color, "joined remote game");
        Ok(color)
    }

    /// Adopt the position in a code received from the peer, keeping the
    /// local side. History starts over from the adopted position.
    pub fn sync_remote(&mut self, code: &str) -> Result<SyncOutcome, SessionError> {
        if self.mode() != Mode::RemotePeer {
            return Err(SessionError::NotRemote);
        }
        if self.code() == Some(code.trim()) {
            self.notify("This is the current game state.");
            return Ok(SyncOutcome::AlreadyCurrent);
        }

        let position = match decode(code) {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "sync rejected");
                self.notify("Invalid code from friend.");
                return Err(e.into());
            }
        };
        if self.code() == Some(encode(&position).as_str()) {
            self.notify("This is the current game state.");
            return Ok(SyncOutcome::AlreadyCurrent);
        }

        let local = self.local_color();
        self.begin_remote_game(History::from_position(position), local);
        if self.is_local_turn() {
            self.notify("Board updated! It's your turn.");
        } else {
            self.notify("Board updated.");
        }
        info!(status = %self.status(), "adopted peer position");
        Ok(SyncOutcome::Adopted)
    }
}
