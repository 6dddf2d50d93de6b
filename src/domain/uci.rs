//! UCI (Universal Chess Interface) protocol types.
//!
//! The strong tier talks to its worker in plain UCI text, exactly as it
//! would talk to an external engine process. Both directions are here: the
//! session formats [`UciCommand`]s and parses [`UciOutput`]; the worker does
//! the reverse.

use crate::domain::chess::{Move, ParseMoveError};

/// UCI commands that can be sent to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Initialize UCI mode
    Uci,
    /// Check if engine is ready
    IsReady,
    /// Set a new game
    UciNewGame,
    /// Set position (startpos or FEN, with optional moves)
    Position { fen: Option<String>, moves: Vec<String> },
    /// Search, optionally restricted to the listed moves
    Go { searchmoves: Vec<String> },
    /// Stop searching
    Stop,
    /// Quit the engine
    Quit,
}

impl UciCommand {
    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::Position { fen, moves } => {
                let mut cmd = String::from("position ");
                match fen {
                    Some(f) => {
                        cmd.push_str("fen ");
                        cmd.push_str(f);
                    }
                    None => cmd.push_str("startpos"),
                }
                if !moves.is_empty() {
                    cmd.push_str(" moves ");
                    cmd.push_str(&moves.join(" "));
                }
                cmd
            }
            UciCommand::Go { searchmoves } => {
                if searchmoves.is_empty() {
                    "go".to_string()
                } else {
                    format!("go searchmoves {}", searchmoves.join(" "))
                }
            }
            UciCommand::Stop => "stop".to_string(),
            UciCommand::Quit => "quit".to_string(),
        }
    }

    /// Parse a command line as received by the engine side.
    /// Returns `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let cmd = match tokens.next()? {
            "uci" => UciCommand::Uci,
            "isready" => UciCommand::IsReady,
            "ucinewgame" => UciCommand::UciNewGame,
            "stop" => UciCommand::Stop,
            "quit" => UciCommand::Quit,
            "position" => {
                let rest: Vec<&str> = tokens.collect();
                let (setup, moves) = match rest.iter().position(|t| *t == "moves") {
                    Some(i) => (&rest[..i], &rest[i + 1..]),
                    None => (&rest[..], &[][..]),
                };
                let fen = match setup.split_first() {
                    Some((&"startpos", [])) => None,
                    Some((&"fen", fields)) if !fields.is_empty() => Some(fields.join(" ")),
                    _ => return None,
                };
                UciCommand::Position {
                    fen,
                    moves: moves.iter().map(|m| m.to_string()).collect(),
                }
            }
            "go" => {
                // Search limits other than searchmoves are accepted and ignored
                let mut searchmoves = Vec::new();
                let mut collecting = false;
                for token in tokens {
                    if token == "searchmoves" {
                        collecting = true;
                    } else if collecting && token.parse::<Move>().is_ok() {
                        searchmoves.push(token.to_string());
                    } else {
                        collecting = false;
                    }
                }
                UciCommand::Go { searchmoves }
            }
            _ => return None,
        };
        Some(cmd)
    }
}

/// Raw UCI output line types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOutputKind {
    /// "uciok" - engine is ready for UCI
    UciOk,
    /// "readyok" - engine is ready
    ReadyOk,
    /// "info ..." - analysis information
    Info(String),
    /// "bestmove ..." - best move found
    BestMove(String),
    /// Engine identification
    Id(String),
    /// Unknown/other output
    Other(String),
}

impl UciOutputKind {
    /// Parse a raw UCI output line into a categorized type
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "uciok" {
            UciOutputKind::UciOk
        } else if line == "readyok" {
            UciOutputKind::ReadyOk
        } else if let Some(rest) = line.strip_prefix("info ") {
            UciOutputKind::Info(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("bestmove ") {
            UciOutputKind::BestMove(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("id ") {
            UciOutputKind::Id(rest.to_string())
        } else {
            UciOutputKind::Other(line.to_string())
        }
    }
}

/// A UCI output line (for display in the UI)
#[derive(Debug, Clone)]
pub struct UciOutput {
    /// The raw line from the engine
    pub raw: String,
    /// Parsed/categorized output
    pub kind: UciOutputKind,
}

impl UciOutput {
    pub fn new(line: String) -> Self {
        let kind = UciOutputKind::parse(&line);
        Self { raw: line, kind }
    }

    /// The move carried by a `bestmove` line.
    ///
    /// `None` when this is not a `bestmove` line at all; `Some(Ok(None))`
    /// when the engine reported that it has no move.
    pub fn best_move(&self) -> Option<Result<Option<Move>, ParseMoveError>> {
        match &self.kind {
            UciOutputKind::BestMove(rest) => Some(parse_best_move(rest)),
            _ => None,
        }
    }
}

/// Parse the part of a `bestmove` line after the keyword.
/// A trailing `ponder <move>` is ignored.
pub fn parse_best_move(rest: &str) -> Result<Option<Move>, ParseMoveError> {
    match rest.split_whitespace().next() {
        None => Err(ParseMoveError(rest.to_string())),
        Some("(none)") | Some("0000") => Ok(None),
        Some(token) => token.parse().map(Some),
    }
}
