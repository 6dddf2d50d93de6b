//! Game session state machine.
//!
//! The session owns the one live game. It decides whose input is accepted,
//! applies moves through the rules adapter, and drives the AI side. A game
//! is replaced as a whole on reset, mode change, and when a remote position
//! is adopted; the [`Generation`] counter moves on each time so that an AI
//! answer computed for a previous game is recognized and dropped.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position, Square};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::chess::Move;
use crate::domain::codec::{CodecError, encode};
use crate::domain::history::{History, HistoryEntry};
use crate::domain::rules::{self, GameStatus, IllegalMove};
use crate::domain::uci::UciOutput;
use crate::models::engine::{EngineEvent, SimulatedEngine};
use crate::models::notice::Notifications;
use crate::models::peer::PeerLink;
use crate::models::strategy::{Generation, MoveSelector, Resolved, Selection, Tier};
use crate::settings::Settings;

/// Who the opponent is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Human against the AI
    #[default]
    Ai,
    /// Two humans sharing one device
    LocalTwoPlayer,
    /// Two humans exchanging position codes
    RemotePeer,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Ai, Mode::LocalTwoPlayer, Mode::RemotePeer];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Ai => "Player vs AI",
            Mode::LocalTwoPlayer => "Hotseat",
            Mode::RemotePeer => "Play w/ Friend",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Moves are flowing
    Active,
    /// Checkmate, stalemate or draw; only a new game leaves this phase
    Terminal,
}

/// Why the session refused a request. The session is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the AI is still thinking")]
    Busy,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the game is over")]
    GameOver,
    #[error("illegal move {0}")]
    IllegalMove(Move),
    #[error("invalid game code: {0}")]
    InvalidCode(#[from] CodecError),
    #[error("undo is disabled in remote games")]
    UndoUnavailable,
    #[error("no remote game in progress")]
    NotRemote,
}

impl From<IllegalMove> for SessionError {
    fn from(err: IllegalMove) -> Self {
        SessionError::IllegalMove(err.0)
    }
}

/// State of one game
pub(super) struct Game {
    pub(super) history: History,
    pub(super) status: GameStatus,
    /// The side the local human plays. Unused in hotseat games.
    pub(super) local_color: Color,
    pub(super) peer: PeerLink,
}

impl Game {
    pub(super) fn new(history: History, local_color: Color) -> Self {
        let status = rules::status(history.current(), history.repetitions());
        Self {
            history,
            status,
            local_color,
            peer: PeerLink::default(),
        }
    }

    fn position(&self) -> &Chess {
        self.history.current()
    }

    fn refresh_status(&mut self) {
        self.status = rules::status(self.history.current(), self.history.repetitions());
    }
}

pub struct Session {
    mode: Mode,
    tier: Tier,
    /// Side the human takes in new AI games
    player_color: Color,
    game: Game,
    selector: MoveSelector,
    generation: Generation,
    /// Generation of the outstanding AI request, if any
    pending: Option<Generation>,
    notices: Notifications,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        let player_color = Color::from(settings.player_color);
        let local_color = match settings.mode {
            Mode::Ai => player_color,
            _ => Color::White,
        };
        let mut session = Self {
            mode: settings.mode,
            tier: settings.tier,
            player_color,
            game: Game::new(History::new(), local_color),
            selector: MoveSelector::new(settings),
            generation: Generation::default(),
            pending: None,
            notices: Notifications::new(settings.notification_duration()),
        };
        session.maybe_start_ai();
        session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Side the human takes in AI games
    pub fn player_color(&self) -> Color {
        self.player_color
    }

    /// Side the local human is playing in the current game
    pub fn local_color(&self) -> Color {
        self.game.local_color
    }

    pub fn position(&self) -> &Chess {
        self.game.position()
    }

    pub fn history(&self) -> &History {
        &self.game.history
    }

    pub fn status(&self) -> GameStatus {
        self.game.status
    }

    pub fn status_text(&self) -> String {
        self.game.status.to_string()
    }

    pub fn phase(&self) -> Phase {
        if self.game.status.is_terminal() {
            Phase::Terminal
        } else {
            Phase::Active
        }
    }

    /// An AI move is being computed
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn last_move(&self) -> Option<Move> {
        self.game.history.last_move()
    }

    /// Code of the live position, for sharing in any mode
    pub fn fen(&self) -> String {
        encode(self.game.position())
    }

    /// The last code published to the remote peer
    pub fn code(&self) -> Option<&str> {
        self.game.peer.published()
    }

    pub fn notification(&self) -> Option<&str> {
        self.notices.current()
    }

    /// Drop an expired notification. Returns true if one was dropped.
    pub fn expire_notifications(&mut self) -> bool {
        self.notices.expire()
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "notification");
        self.notices.post(message);
    }

    /// Recent raw output of the simulated engine
    pub fn engine_output(&self) -> &[UciOutput] {
        self.selector.engine().map(|e| e.output_lines()).unwrap_or(&[])
    }

    pub fn engine_running(&self) -> bool {
        self.selector.engine().is_some_and(SimulatedEngine::is_running)
    }

    /// Whether the side to move is played from this device
    pub fn is_local_turn(&self) -> bool {
        match self.mode {
            Mode::LocalTwoPlayer => true,
            Mode::Ai | Mode::RemotePeer => self.game.position().turn() == self.game.local_color,
        }
    }

    pub fn accepts_input(&self) -> bool {
        !self.is_busy() && !self.game.status.is_terminal() && self.is_local_turn()
    }

    pub fn can_undo(&self) -> bool {
        self.mode != Mode::RemotePeer && !self.is_busy() && !self.game.history.is_empty()
    }

    /// Play a move for the local side
    pub fn submit_move(&mut self, mv: Move) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        if self.game.status.is_terminal() {
            return Err(SessionError::GameOver);
        }
        if !self.is_local_turn() {
            return Err(SessionError::NotYourTurn);
        }

        self.commit(mv)?;
        self.maybe_start_ai();
        Ok(())
    }

    /// A drag or second click from `from` to `to`. Pawns reaching the last
    /// rank become queens.
    pub fn on_user_move_intent(&mut self, from: Square, to: Square) -> Result<(), SessionError> {
        self.submit_move(Move::new(from, to))
    }

    /// Destinations to highlight for the piece on `square`. Empty unless the
    /// piece belongs to the side to move and input is accepted.
    pub fn on_square_selected(&self, square: Square) -> Vec<Square> {
        if !self.accepts_input() {
            return Vec::new();
        }
        let position = self.game.position();
        match position.board().piece_at(square) {
            Some(piece) if piece.color == position.turn() => rules::destinations(position, square),
            _ => Vec::new(),
        }
    }

    /// Take back the last move, or the last move pair in AI games.
    /// Returns how many moves were removed.
    pub fn undo(&mut self) -> Result<usize, SessionError> {
        if self.mode == Mode::RemotePeer {
            return Err(SessionError::UndoUnavailable);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }

        let count = if self.mode == Mode::Ai { 2 } else { 1 };
        let removed = self.game.history.pop(count);
        if removed > 0 {
            self.game.refresh_status();
            debug!(removed, "undo");
            self.maybe_start_ai();
        }
        Ok(removed)
    }

    /// Start a new game from the standard position, keeping mode and tier
    pub fn reset(&mut self) {
        let local_color = match self.mode {
            Mode::Ai => self.player_color,
            _ => Color::White,
        };
        self.replace_game(Game::new(History::new(), local_color));
        info!(mode = ?self.mode, ?local_color, "new game");
        self.maybe_start_ai();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset();
    }

    /// Change the AI tier. Leaving the strong tier shuts its engine down
    /// unless it is still working on a move.
    pub fn set_tier(&mut self, tier: Tier) {
        debug!(?tier, "tier changed");
        if self.tier == Tier::Strong && tier != Tier::Strong && !self.is_busy() {
            self.selector.stop_engine();
        }
        self.tier = tier;
    }

    /// Choose the human's side for AI games and start a new game
    pub fn set_player_color(&mut self, color: Color) {
        self.player_color = color;
        self.reset();
    }

    /// Apply one engine event. Returns true if an AI move was played.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> bool {
        let mut played = false;
        for resolved in self.selector.on_engine_event(event) {
            played |= self.settle(resolved);
        }
        played
    }

    /// Apply every engine event already queued, without waiting
    pub fn pump_engine_events(&mut self) -> bool {
        let events = self.selector.events();
        let mut played = false;
        while let Ok(event) = events.try_recv() {
            played |= self.handle_engine_event(event);
        }
        played
    }

    /// Install a new remote game and publish its code
    pub(super) fn begin_remote_game(&mut self, history: History, local_color: Color) {
        self.mode = Mode::RemotePeer;
        let mut game = Game::new(history, local_color);
        game.peer.publish(encode(game.position()));
        self.replace_game(game);
    }

    fn replace_game(&mut self, game: Game) {
        if let Some(abandoned) = self.pending.take() {
            debug!(?abandoned, "abandoning outstanding AI move");
        }
        self.generation = self.generation.next();
        self.game = game;
    }

    /// Apply a move for whichever side is to move
    fn commit(&mut self, mv: Move) -> Result<(), SessionError> {
        let (position, san) = rules::apply(self.game.position(), mv)?;
        debug!(%mv, %san, "move applied");
        self.game.history.push(HistoryEntry::new(position, mv, san));
        self.game.refresh_status();

        if self.game.status.is_terminal() {
            info!(status = %self.game.status, "game over");
        }
        if self.mode == Mode::RemotePeer {
            let code = encode(self.game.position());
            self.game.peer.publish(code);
            self.notify("New game code ready. Send it to your friend.");
        }
        Ok(())
    }

    /// Let the AI move if it is its turn
    fn maybe_start_ai(&mut self) {
        if self.mode != Mode::Ai || self.pending.is_some() || self.game.status.is_terminal() {
            return;
        }
        if self.game.position().turn() == self.game.local_color {
            return;
        }

        let generation = self.generation;
        match self.selector.select(self.tier, self.game.position(), generation) {
            Selection::Ready(Some(mv)) => self.play_ai_move(mv),
            Selection::Fallback(Some(mv)) => {
                self.notify("Engine unavailable, the AI played a random move.");
                self.play_ai_move(mv);
            }
            Selection::Ready(None) | Selection::Fallback(None) => {
                warn!(status = %self.game.status, "AI to move but no move was found");
            }
            Selection::Pending => {
                debug!(?generation, "waiting for AI move");
                self.pending = Some(generation);
            }
        }
    }

    fn settle(&mut self, resolved: Resolved) -> bool {
        if self.pending != Some(resolved.generation) {
            warn!(
                stale = ?resolved.generation,
                current = ?self.generation,
                "discarding AI move for a previous game"
            );
            return false;
        }
        self.pending = None;

        if resolved.fallback {
            self.notify("Engine answer unusable, the AI played a random move.");
        }
        match resolved.mv {
            Some(mv) => {
                self.play_ai_move(mv);
                true
            }
            None => {
                warn!("AI returned no move");
                false
            }
        }
    }

    fn play_ai_move(&mut self, mv: Move) {
        if let Err(e) = self.commit(mv) {
            warn!(error = %e, "AI move rejected, playing a random move");
            if let Some(fallback) = self.selector.random_move(self.game.position()) {
                if let Err(e) = self.commit(fallback) {
                    warn!(error = %e, "random fallback rejected");
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
