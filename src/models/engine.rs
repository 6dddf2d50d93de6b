//! Simulated strong engine - manages the worker lifecycle and its output.
//!
//! The worker behaves like an external UCI engine: it reads command lines,
//! answers `uci`/`isready`, and replies to each `go` with a `bestmove` after
//! an artificial thinking delay. It has no playing strength; the move is a
//! uniform pick from the candidates it was given.
//!
//! Architecture:
//! - The worker runs on its own OS thread
//! - Commands go in as UCI text over one channel
//! - Output lines come back as [`EngineEvent`]s over a channel owned by the
//!   caller, so a restarted worker keeps the same event stream

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use shakmaty::Chess;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::chess::Move;
use crate::domain::codec::{INITIAL_CODE, decode};
use crate::domain::rules::{apply, legal_moves};
use crate::domain::uci::{UciCommand, UciOutput};
use crate::settings::ThinkWindow;

/// Maximum number of output lines to keep in history
const MAX_OUTPUT_LINES: usize = 100;

const ENGINE_NAME: &str = "Chess Duel Simulated Engine";

/// Messages sent from the worker thread to the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A line of output from the engine
    Output(String),
    /// Worker thread finished
    Exited,
    /// The engine could not answer a request
    Error(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is not running")]
    NotRunning,
    #[error("engine command channel closed")]
    Disconnected,
    #[error("failed to start engine worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Handle to a running simulated engine
pub struct SimulatedEngine {
    /// Whether the worker is accepting commands
    running: bool,
    /// Whether the worker thread has reported that it finished
    exited: bool,
    /// Recent output lines from the engine (for display)
    output_lines: Vec<UciOutput>,
    /// Channel sender for commands to the worker
    command_sender: Option<Sender<String>>,
}

impl SimulatedEngine {
    /// Spawn the worker thread and run the UCI handshake.
    ///
    /// Every line the worker prints is delivered on `events`.
    pub fn start(
        think: ThinkWindow,
        seed: Option<u64>,
        events: Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = unbounded::<String>();
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        thread::Builder::new()
            .name("simulated-engine".to_string())
            .spawn(move || run_worker(cmd_rx, events, think, rng))?;

        let mut engine = Self {
            running: true,
            exited: false,
            output_lines: Vec::new(),
            command_sender: Some(cmd_tx),
        };

        engine.send_command(UciCommand::Uci)?;
        engine.send_command(UciCommand::IsReady)?;
        engine.add_output("[Engine started]".to_string());
        info!(min_ms = think.min, max_ms = think.max, "simulated engine started");

        Ok(engine)
    }

    /// Check if the engine is currently running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the worker thread is gone for good
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Get the output lines for display
    pub fn output_lines(&self) -> &[UciOutput] {
        &self.output_lines
    }

    /// Send a UCI command to the worker
    pub fn send_command(&self, cmd: UciCommand) -> Result<(), EngineError> {
        let tx = self.command_sender.as_ref().ok_or(EngineError::NotRunning)?;
        let line = cmd.to_uci_string();
        debug!(%line, "engine <");
        tx.send(line).map_err(|_| EngineError::Disconnected)
    }

    /// Ask for a move for `position`, restricted to `candidates`
    pub fn request_move(&self, position: &str, candidates: &[Move]) -> Result<(), EngineError> {
        self.send_command(UciCommand::Position {
            fen: Some(position.to_string()),
            moves: vec![],
        })?;
        self.send_command(UciCommand::Go {
            searchmoves: candidates.iter().map(Move::to_uci).collect(),
        })
    }

    /// Record an event from the worker.
    /// Returns the parsed line for `Output` events.
    pub fn record(&mut self, event: &EngineEvent) -> Option<UciOutput> {
        match event {
            EngineEvent::Output(line) => {
                debug!(%line, "engine >");
                Some(self.add_output(line.clone()))
            }
            EngineEvent::Exited => {
                self.running = false;
                self.exited = true;
                self.command_sender = None;
                self.add_output("[Engine exited]".to_string());
                None
            }
            EngineEvent::Error(e) => {
                warn!(error = %e, "engine reported an error");
                self.add_output(format!("[Error: {}]", e));
                None
            }
        }
    }

    /// Ask the worker to quit. Does not wait for it.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        let _ = self.send_command(UciCommand::Quit);
        // Dropping the sender also ends the worker's command loop
        self.command_sender = None;
        self.running = false;
        self.add_output("[Engine stopped]".to_string());
    }

    /// Add an output line, dropping the oldest beyond the limit
    fn add_output(&mut self, line: String) -> UciOutput {
        let output = UciOutput::new(line);
        self.output_lines.push(output.clone());

        if self.output_lines.len() > MAX_OUTPUT_LINES {
            let excess = self.output_lines.len() - MAX_OUTPUT_LINES;
            self.output_lines.drain(0..excess);
        }
        output
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Send one line to the owner. False once nobody is listening.
fn emit(events: &Sender<EngineEvent>, line: impl Into<String>) -> bool {
    events.send(EngineEvent::Output(line.into())).is_ok()
}

fn think_time(window: &ThinkWindow, rng: &mut StdRng) -> Duration {
    let ms = if window.max > window.min {
        rng.random_range(window.min..window.max)
    } else {
        window.min
    };
    Duration::from_millis(ms)
}

/// Rebuild the position named by a `position` command
fn load_position(fen: Option<&str>, moves: &[String]) -> Option<Chess> {
    let mut position = decode(fen.unwrap_or(INITIAL_CODE)).ok()?;
    for text in moves {
        let mv: Move = text.parse().ok()?;
        position = apply(&position, mv).ok()?.0;
    }
    Some(position)
}

/// Worker loop: one command line at a time, strictly in order
fn run_worker(
    commands: Receiver<String>,
    events: Sender<EngineEvent>,
    think: ThinkWindow,
    mut rng: StdRng,
) {
    let mut position: Option<Chess> = None;

    for line in commands.iter() {
        let Some(cmd) = UciCommand::parse(&line) else {
            if !emit(&events, format!("info string unknown command: {}", line.trim())) {
                return;
            }
            continue;
        };

        let delivered = match cmd {
            UciCommand::Uci => {
                emit(&events, format!("id name {ENGINE_NAME}"))
                    && emit(&events, "id author chess-duel")
                    && emit(&events, "uciok")
            }
            UciCommand::IsReady => emit(&events, "readyok"),
            UciCommand::UciNewGame => {
                position = None;
                true
            }
            UciCommand::Position { fen, moves } => {
                position = load_position(fen.as_deref(), &moves);
                position.is_some() || emit(&events, "info string invalid position")
            }
            UciCommand::Go { searchmoves } => {
                let candidates = if !searchmoves.is_empty() {
                    searchmoves
                } else if let Some(pos) = &position {
                    legal_moves(pos).iter().map(Move::to_uci).collect()
                } else {
                    if events
                        .send(EngineEvent::Error("go without a position".to_string()))
                        .is_err()
                    {
                        return;
                    }
                    continue;
                };

                match candidates.choose(&mut rng).cloned() {
                    Some(best) => {
                        let delay = think_time(&think, &mut rng);
                        emit(
                            &events,
                            format!("info string thinking for {} ms", delay.as_millis()),
                        ) && {
                            thread::sleep(delay);
                            emit(&events, format!("bestmove {best}"))
                        }
                    }
                    None => emit(&events, "bestmove (none)"),
                }
            }
            // Searches are never running in the background, nothing to stop
            UciCommand::Stop => true,
            UciCommand::Quit => break,
        };

        if !delivered {
            return;
        }
    }

    let _ = events.send(EngineEvent::Exited);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::uci::UciOutputKind;
    use std::time::Instant;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn start(think: ThinkWindow) -> (SimulatedEngine, Receiver<EngineEvent>) {
        let (tx, rx) = unbounded();
        let engine = SimulatedEngine::start(think, Some(7), tx).unwrap();
        (engine, rx)
    }

    /// Wait for the next `bestmove` line, skipping everything else
    fn next_best_move(rx: &Receiver<EngineEvent>) -> String {
        loop {
            match rx.recv_timeout(TIMEOUT).unwrap() {
                EngineEvent::Output(line) if line.starts_with("bestmove ") => return line,
                EngineEvent::Output(_) => continue,
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn test_handshake() {
        let (_engine, rx) = start(ThinkWindow::from_millis(0, 0));
        let mut lines = Vec::new();
        while lines.last().map(String::as_str) != Some("readyok") {
            match rx.recv_timeout(TIMEOUT).unwrap() {
                EngineEvent::Output(line) => lines.push(line),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(lines[0].starts_with("id name"));
        assert!(lines.contains(&"uciok".to_string()));
    }

    #[test]
    fn test_best_move_is_a_candidate() {
        let (engine, rx) = start(ThinkWindow::from_millis(0, 5));
        let candidates: Vec<Move> = vec!["e2e4".parse().unwrap(), "d2d4".parse().unwrap()];
        engine.request_move(INITIAL_CODE, &candidates).unwrap();

        let line = next_best_move(&rx);
        let mv = UciOutput::new(line).best_move().unwrap().unwrap().unwrap();
        assert!(candidates.contains(&mv));
    }

    #[test]
    fn test_go_without_searchmoves_uses_position() {
        let (engine, rx) = start(ThinkWindow::from_millis(0, 0));
        engine
            .send_command(UciCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string()],
            })
            .unwrap();
        engine.send_command(UciCommand::Go { searchmoves: vec![] }).unwrap();

        let mv = UciOutput::new(next_best_move(&rx))
            .best_move()
            .unwrap()
            .unwrap()
            .unwrap();
        let after_e4 = load_position(None, &["e2e4".to_string()]).unwrap();
        assert!(legal_moves(&after_e4).contains(&mv));
    }

    #[test]
    fn test_no_legal_moves_answers_none() {
        let (engine, rx) = start(ThinkWindow::from_millis(0, 0));
        // Black is stalemated
        engine
            .send_command(UciCommand::Position {
                fen: Some("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".to_string()),
                moves: vec![],
            })
            .unwrap();
        engine.send_command(UciCommand::Go { searchmoves: vec![] }).unwrap();
        assert_eq!(next_best_move(&rx), "bestmove (none)");
    }

    #[test]
    fn test_go_without_position_is_an_error() {
        let (engine, rx) = start(ThinkWindow::from_millis(0, 0));
        engine.send_command(UciCommand::Go { searchmoves: vec![] }).unwrap();
        let error = loop {
            match rx.recv_timeout(TIMEOUT).unwrap() {
                EngineEvent::Error(e) => break e,
                EngineEvent::Output(_) => continue,
                EngineEvent::Exited => panic!("worker exited"),
            }
        };
        assert!(error.contains("without a position"));
    }

    #[test]
    fn test_default_window_waits_at_least_one_second() {
        let (engine, rx) = start(ThinkWindow::default());
        let candidates: Vec<Move> = vec!["g1f3".parse().unwrap()];
        let started = Instant::now();
        engine.request_move(INITIAL_CODE, &candidates).unwrap();
        assert_eq!(next_best_move(&rx), "bestmove g1f3");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "answered after {elapsed:?}");
    }

    #[test]
    fn test_stop_ends_worker() {
        let (mut engine, rx) = start(ThinkWindow::from_millis(0, 0));
        engine.stop();
        assert!(!engine.is_running());
        assert!(matches!(
            engine.send_command(UciCommand::IsReady),
            Err(EngineError::NotRunning)
        ));

        let exited = loop {
            match rx.recv_timeout(TIMEOUT).unwrap() {
                EngineEvent::Exited => break true,
                _ => continue,
            }
        };
        assert!(exited);
    }

    #[test]
    fn test_record_tracks_exit_and_bounds_output() {
        let (tx, _rx) = unbounded();
        let mut engine = SimulatedEngine::start(ThinkWindow::from_millis(0, 0), None, tx).unwrap();

        for i in 0..150 {
            engine.record(&EngineEvent::Output(format!("info string line {i}")));
        }
        assert_eq!(engine.output_lines().len(), MAX_OUTPUT_LINES);
        assert_eq!(engine.output_lines()[99].raw, "info string line 149");

        let parsed = engine.record(&EngineEvent::Output("bestmove e2e4".to_string()));
        assert!(matches!(parsed.unwrap().kind, UciOutputKind::BestMove(_)));

        assert!(engine.record(&EngineEvent::Exited).is_none());
        assert!(!engine.is_running());
        assert!(engine.has_exited());
        assert!(matches!(
            engine.send_command(UciCommand::IsReady),
            Err(EngineError::NotRunning)
        ));
    }

    #[test]
    fn test_unknown_command_reported() {
        let (engine, rx) = start(ThinkWindow::from_millis(0, 0));
        let tx = engine.command_sender.clone().unwrap();
        tx.send("setoption name Hash value 16".to_string()).unwrap();
        let found = loop {
            match rx.recv_timeout(TIMEOUT).unwrap() {
                EngineEvent::Output(line) if line.contains("unknown command") => break line,
                EngineEvent::Output(_) => continue,
                other => panic!("unexpected event {other:?}"),
            }
        };
        assert!(found.ends_with("setoption name Hash value 16"));
    }
}
