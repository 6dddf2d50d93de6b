//! Move strategy selection for the AI side.
//!
//! The random and balanced tiers answer immediately. The strong tier hands the
//! legal moves to the simulated engine and answers later through
//! [`MoveSelector::on_engine_event`]. Every strong request carries the
//! [`Generation`] it was issued for, so the session can discard answers that
//! arrive after the game they belong to is gone.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position};
use tracing::{debug, warn};

use crate::domain::chess::Move;
use crate::domain::codec::encode;
use crate::domain::rules::{legal_moves, resolve};
use crate::domain::search::search_best_move;
use crate::domain::uci::UciOutput;
use crate::models::engine::{EngineError, EngineEvent, SimulatedEngine};
use crate::settings::{Settings, ThinkWindow};

/// AI difficulty
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Uniform choice among the legal moves
    #[default]
    Random,
    /// Shallow minimax over material
    Balanced,
    /// Simulated external engine with a thinking delay
    Strong,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Random, Tier::Balanced, Tier::Strong];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Random => "Easy",
            Tier::Balanced => "Medium",
            Tier::Strong => "Hard (Engine Sim)",
        }
    }
}

/// Identifies the game an asynchronous computation was issued for.
/// Bumped whenever the session's game is replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// Immediate outcome of a selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The move is known now; `None` means the side to move has no move
    Ready(Option<Move>),
    /// The strong tier could not be reached; a random move was chosen instead
    Fallback(Option<Move>),
    /// The move will arrive later as a [`Resolved`]
    Pending,
}

/// A strong-tier answer paired with the generation it was requested for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub generation: Generation,
    pub mv: Option<Move>,
    /// The engine's answer was unusable and `mv` is a random move
    pub fallback: bool,
}

/// A strong-tier request awaiting its `bestmove`
struct InFlight {
    generation: Generation,
    position: Chess,
}

/// Uniformly pick one legal move
pub fn random_move<R: rand::Rng + ?Sized>(position: &Chess, rng: &mut R) -> Option<Move> {
    legal_moves(position).choose(rng).copied()
}

pub struct MoveSelector {
    rng: StdRng,
    search_depth: u8,
    think: ThinkWindow,
    engine_seed: Option<u64>,
    /// Started on the first strong request, restarted if it exits
    engine: Option<SimulatedEngine>,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
    /// Answered strictly in order by the engine
    in_flight: VecDeque<InFlight>,
}

impl MoveSelector {
    pub fn new(settings: &Settings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (events_tx, events_rx) = unbounded();
        Self {
            rng,
            search_depth: settings.search_depth.max(1),
            think: settings.engine_think_ms,
            engine_seed: settings.rng_seed.map(|seed| seed.wrapping_add(1)),
            engine: None,
            events_tx,
            events_rx,
            in_flight: VecDeque::new(),
        }
    }

    /// Stream of engine events. Each event must be handed back to
    /// [`MoveSelector::on_engine_event`] (through the session).
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.events_rx.clone()
    }

    pub fn engine(&self) -> Option<&SimulatedEngine> {
        self.engine.as_ref()
    }

    /// Number of strong requests still waiting for an answer
    #[cfg(test)]
    pub(crate) fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// Choose a move for the side to move in `position`
    pub fn select(&mut self, tier: Tier, position: &Chess, generation: Generation) -> Selection {
        match tier {
            Tier::Random => Selection::Ready(self.random_move(position)),
            Tier::Balanced => Selection::Ready(self.balanced_move(position)),
            Tier::Strong => self.request_strong(position, generation),
        }
    }

    pub fn random_move(&mut self, position: &Chess) -> Option<Move> {
        random_move(position, &mut self.rng)
    }

    /// Minimax on a private copy, falling back to a random move
    pub fn balanced_move(&mut self, position: &Chess) -> Option<Move> {
        let copy = position.clone();
        let maximizing = copy.turn() == Color::White;
        match search_best_move(&copy, self.search_depth, maximizing) {
            Some(result) => {
                debug!(mv = %result.best_move, score = result.score, "search finished");
                Some(result.best_move)
            }
            None => {
                let fallback = self.random_move(&copy);
                if fallback.is_some() {
                    warn!("search returned no move, using a random one");
                }
                fallback
            }
        }
    }

    fn request_strong(&mut self, position: &Chess, generation: Generation) -> Selection {
        let candidates = legal_moves(position);
        if candidates.is_empty() {
            return Selection::Ready(None);
        }

        let code = encode(position);
        let sent = self
            .ensure_engine()
            .and_then(|engine| engine.request_move(&code, &candidates));

        match sent {
            Ok(()) => {
                self.in_flight.push_back(InFlight {
                    generation,
                    position: position.clone(),
                });
                debug!(?generation, "strong move requested");
                Selection::Pending
            }
            Err(e) => {
                warn!(error = %e, "engine unavailable, using a random move");
                Selection::Fallback(self.random_move(position))
            }
        }
    }

    fn ensure_engine(&mut self) -> Result<&SimulatedEngine, EngineError> {
        if self.engine.as_ref().is_none_or(SimulatedEngine::has_exited) {
            let engine = SimulatedEngine::start(self.think, self.engine_seed, self.events_tx.clone())?;
            self.engine = Some(engine);
        }
        self.engine.as_ref().ok_or(EngineError::NotRunning)
    }

    /// Ask the engine to quit. Requests sent afterwards fall back to random
    /// moves until the worker has exited and can be restarted.
    pub fn stop_engine(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
    }

    /// Process one engine event, returning any requests it settles.
    ///
    /// A `bestmove` settles the oldest request. An unusable answer, an engine
    /// error or the worker exiting settle requests with a random move on the
    /// position they were issued for.
    pub fn on_engine_event(&mut self, event: EngineEvent) -> Vec<Resolved> {
        let recorded = self.engine.as_mut().and_then(|engine| engine.record(&event));

        match event {
            EngineEvent::Output(line) => {
                let output = recorded.unwrap_or_else(|| UciOutput::new(line));
                let Some(answer) = output.best_move() else {
                    return Vec::new();
                };
                let Some(request) = self.in_flight.pop_front() else {
                    warn!(line = %output.raw, "bestmove without a pending request");
                    return Vec::new();
                };

                match answer {
                    Ok(Some(mv)) if resolve(&request.position, mv).is_some() => vec![Resolved {
                        generation: request.generation,
                        mv: Some(mv),
                        fallback: false,
                    }],
                    Ok(Some(mv)) => {
                        warn!(%mv, "engine answered an illegal move, using a random one");
                        vec![self.fallback(request)]
                    }
                    Ok(None) => {
                        warn!("engine found no move, using a random one");
                        vec![self.fallback(request)]
                    }
                    Err(e) => {
                        warn!(error = %e, "unreadable bestmove, using a random one");
                        vec![self.fallback(request)]
                    }
                }
            }
            EngineEvent::Error(_) => match self.in_flight.pop_front() {
                Some(request) => vec![self.fallback(request)],
                None => Vec::new(),
            },
            EngineEvent::Exited => {
                let orphaned: Vec<InFlight> = self.in_flight.drain(..).collect();
                if !orphaned.is_empty() {
                    warn!(count = orphaned.len(), "engine exited with requests pending");
                }
                orphaned.into_iter().map(|r| self.fallback(r)).collect()
            }
        }
    }

    fn fallback(&mut self, request: InFlight) -> Resolved {
        Resolved {
            generation: request.generation,
            mv: self.random_move(&request.position),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::decode;
    use std::time::Duration;

    fn selector(think: ThinkWindow) -> MoveSelector {
        MoveSelector::new(&Settings {
            engine_think_ms: think,
            rng_seed: Some(42),
            ..Settings::default()
        })
    }

    /// Feed engine events back until one request is settled
    fn wait_resolved(selector: &mut MoveSelector) -> Resolved {
        let events = selector.events();
        loop {
            let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
            if let Some(resolved) = selector.on_engine_event(event).pop() {
                return resolved;
            }
        }
    }

    fn fools_mate() -> Chess {
        decode("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap()
    }

    #[test]
    fn test_random_tier_picks_legal_move() {
        let mut selector = selector(ThinkWindow::default());
        let pos = Chess::default();
        for _ in 0..20 {
            let Selection::Ready(Some(mv)) = selector.select(Tier::Random, &pos, Generation::default())
            else {
                panic!("random tier must answer immediately");
            };
            assert!(legal_moves(&pos).contains(&mv));
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = selector(ThinkWindow::default());
        let mut b = selector(ThinkWindow::default());
        let pos = Chess::default();
        for _ in 0..10 {
            assert_eq!(a.random_move(&pos), b.random_move(&pos));
        }
    }

    #[test]
    fn test_balanced_tier_from_start() {
        let mut selector = selector(ThinkWindow::default());
        let pos = Chess::default();
        let selection = selector.select(Tier::Balanced, &pos, Generation::default());
        let Selection::Ready(Some(mv)) = selection else {
            panic!("balanced tier must answer immediately, got {selection:?}");
        };
        assert!(legal_moves(&pos).contains(&mv));
    }

    #[test]
    fn test_balanced_tier_takes_free_queen() {
        let mut selector = selector(ThinkWindow::default());
        let pos = decode("rnbqkbnr/pp1ppppp/8/2p5/3Q4/8/PPP1PPPP/RNB1KBNR b KQkq - 0 3").unwrap();
        assert_eq!(selector.balanced_move(&pos).unwrap().to_uci(), "c5d4");
    }

    #[test]
    fn test_no_move_when_mated() {
        let mut selector = selector(ThinkWindow::default());
        let pos = fools_mate();
        for tier in Tier::ALL {
            assert_eq!(
                selector.select(tier, &pos, Generation::default()),
                Selection::Ready(None)
            );
        }
        // No engine is started for a position without moves
        assert!(selector.engine().is_none());
    }

    #[test]
    fn test_strong_tier_answers_later() {
        let mut selector = selector(ThinkWindow::from_millis(0, 10));
        let pos = Chess::default();
        let generation = Generation::default().next();

        assert_eq!(selector.select(Tier::Strong, &pos, generation), Selection::Pending);
        assert_eq!(selector.pending_requests(), 1);

        let resolved = wait_resolved(&mut selector);
        assert_eq!(resolved.generation, generation);
        assert!(!resolved.fallback);
        assert!(legal_moves(&pos).contains(&resolved.mv.unwrap()));
        assert_eq!(selector.pending_requests(), 0);
        assert!(!selector.engine().unwrap().output_lines().is_empty());
    }

    #[test]
    fn test_strong_requests_answered_in_order() {
        let mut selector = selector(ThinkWindow::from_millis(0, 5));
        let first = Generation::default();
        let second = first.next();
        let after_e4 = decode("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();

        assert_eq!(selector.select(Tier::Strong, &Chess::default(), first), Selection::Pending);
        assert_eq!(selector.select(Tier::Strong, &after_e4, second), Selection::Pending);

        let a = wait_resolved(&mut selector);
        let b = wait_resolved(&mut selector);
        assert_eq!(a.generation, first);
        assert!(legal_moves(&Chess::default()).contains(&a.mv.unwrap()));
        assert_eq!(b.generation, second);
        assert!(legal_moves(&after_e4).contains(&b.mv.unwrap()));
    }

    #[test]
    fn test_stopped_engine_falls_back_to_random() {
        let mut selector = selector(ThinkWindow::from_millis(0, 0));
        let pos = Chess::default();
        assert_eq!(selector.select(Tier::Strong, &pos, Generation::default()), Selection::Pending);
        wait_resolved(&mut selector);

        selector.stop_engine();
        let Selection::Fallback(Some(mv)) = selector.select(Tier::Strong, &pos, Generation::default())
        else {
            panic!("a dead engine must degrade to an immediate random move");
        };
        assert!(legal_moves(&pos).contains(&mv));
    }

    #[test]
    fn test_engine_restarts_after_exit() {
        let mut selector = selector(ThinkWindow::from_millis(0, 0));
        let pos = Chess::default();
        assert_eq!(selector.select(Tier::Strong, &pos, Generation::default()), Selection::Pending);
        wait_resolved(&mut selector);

        selector.stop_engine();
        let events = selector.events();
        loop {
            let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
            let exited = event == EngineEvent::Exited;
            selector.on_engine_event(event);
            if exited {
                break;
            }
        }

        assert_eq!(selector.select(Tier::Strong, &pos, Generation::default()), Selection::Pending);
        assert!(wait_resolved(&mut selector).mv.is_some());
    }

    #[test]
    fn test_unusable_answers_fall_back_to_random() {
        // Long think time: the real answer never arrives during the test
        let mut selector = selector(ThinkWindow::from_millis(30_000, 30_001));
        let pos = Chess::default();
        let legal = legal_moves(&pos);

        for bad in ["bestmove zz99", "bestmove a1a8", "bestmove (none)"] {
            assert_eq!(selector.select(Tier::Strong, &pos, Generation::default()), Selection::Pending);
            let resolved = selector.on_engine_event(EngineEvent::Output(bad.to_string()));
            assert_eq!(resolved.len(), 1, "{bad}");
            assert!(resolved[0].fallback, "{bad}");
            assert!(legal.contains(&resolved[0].mv.unwrap()), "{bad}");
        }

        assert_eq!(selector.select(Tier::Strong, &pos, Generation::default()), Selection::Pending);
        let resolved = selector.on_engine_event(EngineEvent::Error("worker failed".to_string()));
        assert!(legal.contains(&resolved[0].mv.unwrap()));
    }

    #[test]
    fn test_exit_settles_every_pending_request() {
        let mut selector = selector(ThinkWindow::from_millis(30_000, 30_001));
        let pos = Chess::default();
        let g1 = Generation::default();
        let g2 = g1.next();
        selector.select(Tier::Strong, &pos, g1);
        selector.select(Tier::Strong, &pos, g2);

        let resolved = selector.on_engine_event(EngineEvent::Exited);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].generation, g1);
        assert_eq!(resolved[1].generation, g2);
        assert!(resolved.iter().all(|r| r.mv.is_some()));
        assert_eq!(selector.pending_requests(), 0);
    }

    #[test]
    fn test_stray_lines_are_ignored() {
        let mut selector = selector(ThinkWindow::default());
        assert!(selector.on_engine_event(EngineEvent::Output("readyok".to_string())).is_empty());
        assert!(selector.on_engine_event(EngineEvent::Output("bestmove e2e4".to_string())).is_empty());
    }
}
