//! The session driver: reads lines, executes server commands sequentially
//! and schedules bot moves.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::client::{ClientShared, ConnectionStatus};
use crate::connection::LineStream;
use crate::protocol::parser::{CommandParser, InfoMessage, ServerCommand};
use crate::protocol::{
    step_message, turn_left_message, turn_right_message, InfoCode, PROTOCOL_VERSION,
};
use crate::strategy::Move;

/// What the main loop woke up on.
enum Input {
    Line(anyhow::Result<Option<String>>),
    Ctrl(Option<Ctrl>),
}

/// Control messages fed back into the driver, mostly by timer tasks.
pub(crate) enum Ctrl {
    /// Ask the strategy for the next move.
    MakeMove,
    /// Send a previously decided move.
    Execute(Move),
    /// Tear the session down.
    Stop { client_side: bool },
}

/// Owns the parser and executes commands one at a time, so every state
/// change and event happens in a fixed order.
pub(crate) struct Driver<S> {
    shared: Arc<ClientShared>,
    stream: S,
    parser: CommandParser,
    ctrl_tx: UnboundedSender<Ctrl>,
    ctrl_rx: UnboundedReceiver<Ctrl>,
    writer: Option<JoinHandle<()>>,
    login_iteration: u32,
}

impl<S: LineStream> Driver<S> {
    pub(crate) fn new(
        shared: Arc<ClientShared>,
        stream: S,
        ctrl_tx: UnboundedSender<Ctrl>,
        ctrl_rx: UnboundedReceiver<Ctrl>,
        writer: JoinHandle<()>,
    ) -> Self {
        Driver {
            shared,
            stream,
            parser: CommandParser::new(),
            ctrl_tx,
            ctrl_rx,
            writer: Some(writer),
            login_iteration: 0,
        }
    }

    pub(crate) async fn run(mut self) {
        let client_side = self.read_loop().await;
        self.shutdown(client_side).await;
    }

    /// The main loop. Returns whether the session ended on the client's
    /// initiative.
    async fn read_loop(&mut self) -> bool {
        loop {
            let input = tokio::select! {
                line = self.stream.next_line() => Input::Line(line),
                ctrl = self.ctrl_rx.recv() => Input::Ctrl(ctrl),
            };
            match input {
                Input::Line(Ok(Some(line))) => {
                    debug!("Received line: '{line}'");
                    for command in self.parser.feed(&line) {
                        if let Some(client_side) = self.execute(command).await {
                            return client_side;
                        }
                    }
                }
                Input::Line(Ok(None)) => return true,
                Input::Line(Err(err)) => {
                    error!("Read error: {err:#}");
                    return true;
                }
                Input::Ctrl(Some(Ctrl::MakeMove)) => self.make_next_move().await,
                Input::Ctrl(Some(Ctrl::Execute(next_move))) => {
                    self.execute_move(next_move).await
                }
                Input::Ctrl(Some(Ctrl::Stop { client_side })) => return client_side,
                Input::Ctrl(None) => return true,
            }
        }
    }

    /// Executes a single command. A `Some` return ends the session.
    async fn execute(&mut self, command: ServerCommand) -> Option<bool> {
        match command {
            ServerCommand::ProtocolVersion { version } => {
                if version == PROTOCOL_VERSION {
                    self.shared.send_hello(self.login_iteration);
                } else {
                    warn!(
                        "The server speaks protocol version '{version}', expected '{PROTOCOL_VERSION}'."
                    );
                }
            }
            ServerCommand::Welcome { id } => self.shared.logged_in(id).await,
            ServerCommand::Maze {
                width,
                height,
                lines,
            } => self.shared.initialize_maze(width, height, &lines).await,
            ServerCommand::PlayerPos {
                id,
                x,
                y,
                direction,
                reason,
                teleport,
                causing_player_id,
            } => {
                self.shared
                    .apply_player_pos(id, x, y, direction, reason, teleport, causing_player_id)
                    .await
            }
            ServerCommand::BaitPos { x, y, kind, change } => {
                self.shared.apply_bait_pos(x, y, kind, change).await
            }
            ServerCommand::PlayerScore { id, score } => self.shared.apply_score(id, score).await,
            ServerCommand::Info(info) => self.apply_info(info).await,
            ServerCommand::Join { id, nick, flavor } => {
                self.shared.apply_join(id, nick, flavor).await
            }
            ServerCommand::Leave { id } => self.shared.apply_leave(id).await,
            ServerCommand::Ready => self.on_ready().await,
            ServerCommand::Term => return Some(false),
            ServerCommand::Quit => info!("Server confirmed logout."),
        }
        None
    }

    async fn apply_info(&mut self, info: InfoMessage) {
        match info.code {
            InfoCode::ServerMessage => match info.message {
                Some(message) => self.shared.fire_server_info(&message),
                None => warn!("Received empty server message."),
            },
            InfoCode::ClientMessage | InfoCode::ClientWhisper => {
                let whisper = info.code == InfoCode::ClientWhisper;
                match (info.source_player_id, info.message) {
                    (Some(source), Some(message)) => {
                        // the sender may already be gone again
                        let nick = match self.shared.players.snapshot(source).await {
                            Some(snapshot) => snapshot.nick,
                            None => format!("<{source}>"),
                        };
                        self.shared.fire_player_chat(source, &nick, &message, whisper);
                    }
                    (source, message) => warn!(
                        "Received invalid client message with source player id '{source:?}' and message '{message:?}'."
                    ),
                }
            }
            InfoCode::SpeedChange => {
                if let Some(speed) = info.game_speed {
                    self.shared.change_speed(speed).await;
                }
            }
            InfoCode::Ok => {
                // just ignore it
            }
            code => {
                self.shared.fire_server_error(code);
                if code == InfoCode::DuplicateNick && self.shared.config().retry_on_duplicate_nick {
                    self.login_iteration += 1;
                    self.shared.send_hello(self.login_iteration);
                }
            }
        }
    }

    async fn on_ready(&mut self) {
        if self.shared.status().await == ConnectionStatus::Spectating {
            if !self.shared.own_player_joined().await {
                error!("Own player did not join the game: leaving the game again!");
                self.shared.logout().await;
                return;
            }
            self.shared.set_status(ConnectionStatus::Playing).await;
        }
        // No early return above: ignoring the very first "RDY." would mean
        // the bot never starts moving.
        if self.shared.status().await == ConnectionStatus::Playing {
            self.make_next_move().await;
        }
    }

    /// Asks the strategy for a move. Doing nothing schedules a retry after
    /// one game tick; a bot delay defers the send.
    async fn make_next_move(&mut self) {
        let ctx = match self.shared.strategy_context().await {
            Some(ctx) => ctx,
            None => return,
        };
        let handle = match self.shared.strategy_handle() {
            Some(handle) => handle,
            None => return,
        };
        let (next_move, delay) = {
            let mut strategy = handle.lock().unwrap();
            let next_move = strategy.next_move(&ctx);
            (next_move, strategy.bot_delay())
        };
        if next_move == Move::DoNothing {
            let wait = ctx.game_speed.max(10) as u64;
            let ctrl = self.ctrl_tx.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(wait)).await;
                let _ = ctrl.send(Ctrl::MakeMove);
            });
        } else if delay == 0 {
            self.execute_move(next_move).await;
        } else {
            let ctrl = self.ctrl_tx.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                let _ = ctrl.send(Ctrl::Execute(next_move));
            });
        }
    }

    async fn execute_move(&mut self, next_move: Move) {
        if !self.shared.is_logged_in().await {
            return;
        }
        match next_move {
            Move::Step => self.shared.send_message(step_message()),
            Move::TurnLeft => self.shared.send_message(turn_left_message()),
            Move::TurnRight => self.shared.send_message(turn_right_message()),
            Move::DoNothing => {
                // literally do nothing
            }
        }
    }

    /// The idempotent stop path: drain the writer, then declare the client
    /// dead.
    async fn shutdown(&mut self, client_side: bool) {
        let status = self.shared.status().await;
        if status == ConnectionStatus::Dying || status == ConnectionStatus::Dead {
            return;
        }
        self.shared.set_status(ConnectionStatus::Dying).await;
        if client_side {
            info!("Terminating the connection...");
        } else {
            warn!("The server terminated the connection!");
        }
        self.shared.send_shutdown();
        if let Some(writer) = self.writer.take() {
            if let Err(err) = writer.await {
                error!("Writer task failed: {err}");
            }
        }
        self.shared.set_status(ConnectionStatus::Dead).await;
        info!(
            "Connection closed: '{}:{}'",
            self.shared.config().server_address,
            self.shared.config().server_port
        );
    }
}
