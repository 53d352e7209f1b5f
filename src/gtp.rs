//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the subset of GTP version 2 needed to play games
//! from graphical interfaces like GoGui or Sabaki.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - Set board size (4 to 19) and clear the board
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Set komi
//! - `play <color> <vertex>` - Play a move for the side to move
//! - `genmove <color>` - Search, play and answer a move for the side to move
//! - `showboard` - Render the current position
//!
//! The engine keeps the hashes of every earlier position of the game and
//! hands them to the search, which refuses moves that recreate a recent one.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::{info, warn};

use crate::board::{Board, Color};
use crate::constants::PASS_MOVE;
use crate::error::GoError;
use crate::mcts::{UctSearch, budget_for};
use crate::options::Options;
use crate::playout::PureRandom;
use crate::zobrist::ZobristTable;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Why a GTP command failed. The display text is the failure response.
#[derive(Debug, thiserror::Error)]
pub enum GtpError {
    #[error(transparent)]
    Go(#[from] GoError),

    #[error("unknown command")]
    UnknownCommand(String),

    #[error("missing argument")]
    MissingArgument,

    #[error("syntax error: {0}")]
    Syntax(String),
}

/// GTP engine state.
pub struct GtpEngine {
    board: Board,
    /// Hashes of the positions before the current one, oldest first.
    history: Vec<u64>,
    options: Options,
    policy: PureRandom,
}

impl GtpEngine {
    /// Create an engine on an empty board of `options.board_size`.
    pub fn new(options: Options) -> Result<Self, GoError> {
        options.validate()?;
        let board = Board::new(options.board_size, Arc::new(ZobristTable::default()))?;
        let policy = options
            .seed
            .map_or_else(PureRandom::new, PureRandom::with_seed);
        Ok(Self {
            board,
            history: Vec::new(),
            options,
            policy,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Hashes of the earlier positions of the current game.
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = preprocess(&line?);
            if line.is_empty() {
                continue;
            }

            // Parse optional command ID
            let (id, command_line) = Self::parse_id(&line);

            let mut parts = command_line.split_whitespace();
            let Some(command) = parts.next() else {
                continue;
            };
            let command = command.to_lowercase();
            let args: Vec<&str> = parts.collect();

            let (prefix, message) = match self.execute(&command, &args) {
                Ok(message) => ('=', message),
                Err(err) => {
                    warn!(command = %command, error = %err, "gtp command failed");
                    ('?', err.to_string())
                }
            };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            if message.is_empty() {
                write!(output, "{prefix}{id_str}\n\n")?;
            } else {
                write!(output, "{prefix}{id_str} {message}\n\n")?;
            }
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a GTP command and return the success response.
    pub fn execute(&mut self, command: &str, args: &[&str]) -> Result<String, GtpError> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("2".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let name = arg(args, 0)?.to_lowercase();
                Ok(KNOWN_COMMANDS.contains(&name.as_str()).to_string())
            }

            "quit" => Ok(String::new()),

            "boardsize" => {
                let size: usize = parse_arg(args, 0)?;
                self.board = Board::new(size, Arc::clone(self.board.zobrist()))?;
                self.options.board_size = size;
                self.history.clear();
                Ok(String::new())
            }

            "clear_board" => {
                self.board.clear();
                self.history.clear();
                Ok(String::new())
            }

            "komi" => {
                let komi: f32 = parse_arg(args, 0)?;
                if !komi.is_finite() {
                    return Err(GtpError::Syntax(format!("komi {komi}")));
                }
                self.options.komi = komi;
                Ok(String::new())
            }

            "play" => {
                self.check_color(arg(args, 0)?)?;
                let vertex = arg(args, 1)?;
                let pt = self.board.parse_point(vertex)?;
                if pt != PASS_MOVE && !self.board.is_legal(pt) {
                    return Err(GoError::IllegalMove {
                        name: vertex.to_string(),
                    }
                    .into());
                }
                self.history.push(self.board.hash());
                self.board.play_or_pass(pt);
                Ok(String::new())
            }

            "genmove" => {
                self.check_color(arg(args, 0)?)?;
                let player = self.board.turn();
                let pt = if self.board.must_pass() {
                    PASS_MOVE
                } else {
                    let mut search = UctSearch::new(
                        &self.board,
                        &self.history,
                        &self.options,
                        &mut self.policy,
                        budget_for(&self.options),
                    );
                    search.run()
                };
                let name = self.board.point_name(pt);
                info!(%player, mv = %name, "genmove");
                self.history.push(self.board.hash());
                self.board.play_or_pass(pt);
                Ok(name)
            }

            "showboard" => Ok(format!("\n{}", self.board)),

            _ => Err(GtpError::UnknownCommand(command.to_string())),
        }
    }

    /// Moves must be given for the side to move.
    fn check_color(&self, name: &str) -> Result<(), GoError> {
        let color = Color::parse(name)?;
        let expected = self.board.turn();
        if color != expected {
            return Err(GoError::WrongColor {
                expected,
                found: color,
            });
        }
        Ok(())
    }
}

/// Drop control characters and comments, and turn tabs into spaces.
fn preprocess(line: &str) -> String {
    let line = line.split('#').next().unwrap_or_default();
    line.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn arg<'a>(args: &[&'a str], idx: usize) -> Result<&'a str, GtpError> {
    args.get(idx).copied().ok_or(GtpError::MissingArgument)
}

fn parse_arg<T: std::str::FromStr>(args: &[&str], idx: usize) -> Result<T, GtpError> {
    let text = arg(args, idx)?;
    text.parse()
        .map_err(|_| GtpError::Syntax(format!("cannot parse \"{text}\"")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn engine() -> GtpEngine {
        GtpEngine::new(Options {
            board_size: 5,
            pool_nodes: 20_000,
            pool_blocks: 2,
            simulations: 200,
            verbosity: 0,
            seed: Some(11),
            ..Options::default()
        })
        .unwrap()
    }

    fn session(engine: &mut GtpEngine, input: &str) -> String {
        let mut out = Vec::new();
        engine.run(Cursor::new(input), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_preprocess_strips_comments() {
        assert_eq!(preprocess("play b c3 # opening"), "play b c3");
        assert_eq!(preprocess("\tname\r"), "name");
        assert_eq!(preprocess("# just a comment"), "");
    }

    #[test]
    fn test_name_and_protocol() {
        let mut engine = engine();
        assert_eq!(engine.execute("name", &[]).unwrap(), "gaugo");
        assert_eq!(engine.execute("protocol_version", &[]).unwrap(), "2");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("known_command", &["genmove"]).unwrap(), "true");
        assert_eq!(engine.execute("known_command", &["fly"]).unwrap(), "false");
        assert!(matches!(
            engine.execute("known_command", &[]),
            Err(GtpError::MissingArgument)
        ));
    }

    #[test]
    fn test_boardsize() {
        let mut engine = engine();
        assert!(engine.execute("boardsize", &["13"]).is_ok());
        assert_eq!(engine.board().size(), 13);

        let err = engine.execute("boardsize", &["25"]).unwrap_err();
        assert!(matches!(
            err,
            GtpError::Go(GoError::InvalidBoardSize { size: 25 })
        ));
        assert_eq!(err.to_string(), "invalid size 25");
        assert!(matches!(
            engine.execute("boardsize", &["big"]),
            Err(GtpError::Syntax(_))
        ));
    }

    #[test]
    fn test_play_checks_color_and_legality() {
        let mut engine = engine();
        assert!(engine.execute("play", &["black", "C3"]).is_ok());
        assert_eq!(engine.history().len(), 1);

        let err = engine.execute("play", &["black", "D3"]).unwrap_err();
        assert_eq!(err.to_string(), "wrong color: black given, white to play");

        let err = engine.execute("play", &["white", "C3"]).unwrap_err();
        assert!(matches!(err, GtpError::Go(GoError::IllegalMove { .. })));

        assert!(engine.execute("play", &["white", "Z9"]).is_err());
        assert!(engine.execute("play", &["white", "pass"]).is_ok());
        assert_eq!(engine.board().turn(), Color::Black);
    }

    #[test]
    fn test_clear_board_forgets_history() {
        let mut engine = engine();
        engine.execute("play", &["b", "C3"]).unwrap();
        engine.execute("clear_board", &[]).unwrap();
        assert!(engine.history().is_empty());
        assert_eq!(engine.board().move_number(), 0);
    }

    #[test]
    fn test_genmove_plays_for_side_to_move() {
        let mut engine = engine();
        let answer = engine.execute("genmove", &["b"]).unwrap();
        let pt = engine.board().parse_point(&answer).unwrap();
        assert_ne!(pt, PASS_MOVE);
        assert_eq!(engine.board().color_at(pt), Color::Black);
        assert_eq!(engine.board().turn(), Color::White);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_session_responses() {
        let mut engine = engine();
        let out = session(&mut engine, "1 name\nkomi 0.5\n2 fly\nquit\nname\n");
        assert_eq!(out, "=1 gaugo\n\n=\n\n?2 unknown command\n\n=\n\n");
        assert_eq!(engine.options.komi, 0.5);
    }
}
