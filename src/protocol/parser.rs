//! Parsing of the line-oriented server commands.
//!
//! The parser is stateful only for the maze data: after a `MAZE` header, every
//! line that is not a recognized command is collected as a maze line, and the
//! next recognized command finalizes the maze. Malformed lines are logged and
//! dropped; they never kill the session.

use anyhow::{bail, Context, Result};
use log::error;

use crate::bait::{BaitChange, BaitType};
use crate::player::{PositionChangeReason, TeleportType, ViewDirection};
use crate::protocol::{InfoCode, COMMAND_SEPARATOR};

/// A fully parsed command from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerCommand {
    /// Starts the handshake; the client answers with "HELO" on a version match.
    ProtocolVersion { version: u32 },
    /// Login accepted; carries the own player id.
    Welcome { id: i32 },
    /// The complete maze data.
    Maze {
        width: usize,
        height: usize,
        lines: Vec<String>,
    },
    /// A player position change.
    PlayerPos {
        id: i32,
        x: i32,
        y: i32,
        direction: ViewDirection,
        reason: PositionChangeReason,
        teleport: Option<TeleportType>,
        causing_player_id: Option<i32>,
    },
    /// A bait appeared or vanished.
    BaitPos {
        x: i32,
        y: i32,
        kind: BaitType,
        change: BaitChange,
    },
    /// A score change.
    PlayerScore { id: i32, score: i32 },
    /// Info, error, chat or speed change.
    Info(InfoMessage),
    /// A new player joined the game.
    Join {
        id: i32,
        nick: String,
        flavor: Option<String>,
    },
    /// A player left the game.
    Leave { id: i32 },
    /// The server expects the next move.
    Ready,
    /// The server terminates the connection.
    Term,
    /// The server confirms a client-side logout.
    Quit,
}

/// The payload of an "INFO" command.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoMessage {
    pub code: InfoCode,
    pub raw_code: u32,
    pub message: Option<String>,
    pub source_player_id: Option<i32>,
    pub game_speed: Option<u32>,
}

enum MazeState {
    NoMaze,
    Receiving {
        width: usize,
        height: usize,
        lines: Vec<String>,
    },
    Received,
}

/// Stateful parser turning raw lines into [`ServerCommand`]s.
pub struct CommandParser {
    maze: MazeState,
}

impl Default for CommandParser {
    fn default() -> Self {
        CommandParser::new()
    }
}

impl CommandParser {
    pub fn new() -> Self {
        CommandParser {
            maze: MazeState::NoMaze,
        }
    }

    /// Feeds one raw line. Returns zero, one or two commands: finalizing the
    /// maze emits the maze command in front of the command that ended it.
    pub fn feed(&mut self, line: &str) -> Vec<ServerCommand> {
        let parts: Vec<&str> = line.split(COMMAND_SEPARATOR).collect();
        let mut commands = Vec::new();
        let parsed: Result<Option<ServerCommand>> = match parts[0] {
            "MAZE" => self.prepare_maze(&parts).map(|_| None),
            "PPOS" => {
                commands.extend(self.finalize_maze());
                parse_player_pos(&parts).map(Some)
            }
            "RDY." => {
                commands.extend(self.finalize_maze());
                Ok(Some(ServerCommand::Ready))
            }
            "BPOS" => {
                commands.extend(self.finalize_maze());
                parse_bait_pos(&parts).map(Some)
            }
            "PSCO" => {
                commands.extend(self.finalize_maze());
                parse_player_score(&parts).map(Some)
            }
            "INFO" => {
                commands.extend(self.finalize_maze());
                parse_info(&parts).map(Some)
            }
            "JOIN" => {
                commands.extend(self.finalize_maze());
                parse_join(&parts).map(Some)
            }
            "LEAV" => {
                commands.extend(self.finalize_maze());
                parse_leave(&parts).map(Some)
            }
            "MSRV" => {
                commands.extend(self.finalize_maze());
                parse_protocol_version(&parts).map(Some)
            }
            "WELC" => {
                commands.extend(self.finalize_maze());
                parse_welcome(&parts).map(Some)
            }
            "TERM" => {
                commands.extend(self.finalize_maze());
                Ok(Some(ServerCommand::Term))
            }
            "QUIT" => {
                commands.extend(self.finalize_maze());
                Ok(Some(ServerCommand::Quit))
            }
            _ => self.append_maze_line(&parts).map(|_| None),
        };
        match parsed {
            Ok(Some(command)) => commands.push(command),
            Ok(None) => {}
            Err(err) => {
                error!("An error occurred while parsing the command '{line}' ... ignoring! ({err:#})");
            }
        }
        commands
    }

    /// Switches into maze reception. The header already contains the
    /// dimensions of the maze.
    fn prepare_maze(&mut self, parts: &[&str]) -> Result<()> {
        if !matches!(self.maze, MazeState::NoMaze) {
            bail!("received MAZE command while maze data was already handled");
        }
        if parts.len() < 3 {
            bail!("malformed MAZE command detected");
        }
        let width = parts[1].parse().context("invalid maze width")?;
        let height = parts[2].parse().context("invalid maze height")?;
        self.maze = MazeState::Receiving {
            width,
            height,
            lines: Vec::new(),
        };
        Ok(())
    }

    /// Receives a line of maze map data.
    fn append_maze_line(&mut self, parts: &[&str]) -> Result<()> {
        match &mut self.maze {
            MazeState::Receiving { lines, .. } => {
                if parts.len() != 1 {
                    bail!("received line was not a maze line");
                }
                lines.push(parts[0].trim().to_string());
                Ok(())
            }
            _ => bail!("unknown command '{}'", parts[0]),
        }
    }

    /// Ends maze reception, if it is ongoing, and yields the maze command.
    fn finalize_maze(&mut self) -> Option<ServerCommand> {
        if !matches!(self.maze, MazeState::Receiving { .. }) {
            return None;
        }
        match std::mem::replace(&mut self.maze, MazeState::Received) {
            MazeState::Receiving {
                width,
                height,
                lines,
            } => Some(ServerCommand::Maze {
                width,
                height,
                lines,
            }),
            _ => unreachable!(),
        }
    }
}

fn parse_protocol_version(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 2 {
        bail!("MSRV requires a protocol version");
    }
    let version = parts[1].parse().context("invalid protocol version")?;
    Ok(ServerCommand::ProtocolVersion { version })
}

fn parse_welcome(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 2 {
        bail!("WELC requires a player id");
    }
    let id = parts[1].parse().context("invalid player id")?;
    Ok(ServerCommand::Welcome { id })
}

fn parse_player_pos(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 6 {
        bail!("PPOS requires id, coordinates, direction and reason");
    }
    let id = parts[1].parse().context("invalid player id")?;
    let x = parts[2].parse().context("invalid x coordinate")?;
    let y = parts[3].parse().context("invalid y coordinate")?;
    let direction = ViewDirection::from_short_name(parts[4])?;
    let reason = PositionChangeReason::from_short_name(parts[5])?;
    let teleport = if reason == PositionChangeReason::Teleport && parts.len() > 6 {
        Some(TeleportType::from_short_name(parts[6])?)
    } else {
        None
    };
    let causing_player_id = if teleport.is_some() && parts.len() > 7 {
        Some(parts[7].parse().context("invalid causing player id")?)
    } else {
        None
    };
    Ok(ServerCommand::PlayerPos {
        id,
        x,
        y,
        direction,
        reason,
        teleport,
        causing_player_id,
    })
}

fn parse_bait_pos(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 5 {
        bail!("BPOS requires coordinates, bait type and change");
    }
    let x = parts[1].parse().context("invalid x coordinate")?;
    let y = parts[2].parse().context("invalid y coordinate")?;
    let kind = BaitType::by_name(parts[3])?;
    let change = BaitChange::by_name(parts[4])?;
    Ok(ServerCommand::BaitPos { x, y, kind, change })
}

fn parse_player_score(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 3 {
        bail!("PSCO requires a player id and a score");
    }
    let id = parts[1].parse().context("invalid player id")?;
    let score = parts[2].parse().context("invalid score")?;
    Ok(ServerCommand::PlayerScore { id, score })
}

fn parse_info(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 2 {
        bail!("INFO requires a code");
    }
    let raw_code: u32 = parts[1].parse().context("invalid info code")?;
    let code = InfoCode::from_code(raw_code);
    let mut message = None;
    let mut game_speed = None;
    if parts.len() > 2 {
        if code == InfoCode::SpeedChange {
            game_speed = Some(parts[2].parse().context("invalid game speed")?);
        } else {
            message = Some(parts[2].to_string());
        }
    }
    let source_player_id = if parts.len() > 3 {
        Some(parts[3].parse().context("invalid source player id")?)
    } else {
        None
    };
    Ok(ServerCommand::Info(InfoMessage {
        code,
        raw_code,
        message,
        source_player_id,
        game_speed,
    }))
}

fn parse_join(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 3 {
        bail!("JOIN requires a player id and a nick");
    }
    let id = parts[1].parse().context("invalid player id")?;
    let nick = parts[2].to_string();
    let flavor = parts
        .get(3)
        .filter(|flavor| !flavor.is_empty())
        .map(|flavor| flavor.to_string());
    Ok(ServerCommand::Join { id, nick, flavor })
}

fn parse_leave(parts: &[&str]) -> Result<ServerCommand> {
    if parts.len() < 2 {
        bail!("LEAV requires a player id");
    }
    let id = parts[1].parse().context("invalid player id")?;
    Ok(ServerCommand::Leave { id })
}
