/// The central maze client: connection lifecycle, state mirroring and the
/// session driver.
mod test;

mod driver;
pub mod headless;

use std::fmt;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::bait::{Bait, BaitChange, BaitCollection, BaitType};
use crate::config::MazeClientConfig;
use crate::connection::{tcp, LineSink, LineStream};
use crate::events::{EventHandler, EventListener};
use crate::player::{
    Player, PlayerCollection, PlayerSnapshot, PositionChangeReason, TeleportType, ViewDirection,
};
use crate::protocol::text::sanitize_chat_message;
use crate::protocol::{
    bye_message, chat_message, hello_message, request_maze_message, whisper_message, Message,
};
use crate::strategy::{self, SharedStrategy, StrategyContext, StrategyHandle};

use self::driver::{Ctrl, Driver};

/// Placeholder for "no id assigned by the server yet".
pub const NO_ID: i32 = -1;

/// 150 is the historical default game speed.
pub const DEFAULT_GAME_SPEED: u32 = 150;

/// The connection state of a client.
///
/// - `NotConnected`: fresh client; the strategy does not exist yet.
/// - `Connected`: the network connection stands. The client waits for the
///   server's "MSRV" command, answers "HELO" and hopes for a "WELC".
/// - `LoggedIn`: the own id is known; the maze data was requested.
/// - `Spectating`: the maze data arrived and game updates are coming in. A
///   spectating client never receives a "RDY.".
/// - `Playing`: the first "RDY." arrived; the client may send moves.
/// - `Dying`: short-lived status while logging out or being kicked.
/// - `Dead`: disconnected for good; play again with a fresh client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NotConnected,
    Connected,
    LoggedIn,
    Spectating,
    Playing,
    Dying,
    Dead,
}

impl ConnectionStatus {
    pub fn is_logged_in(self) -> bool {
        matches!(
            self,
            ConnectionStatus::LoggedIn | ConnectionStatus::Spectating | ConnectionStatus::Playing
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionStatus::NotConnected | ConnectionStatus::Dead => "Disconnected",
            ConnectionStatus::Connected => "Logging in...",
            ConnectionStatus::LoggedIn => "Logged in",
            ConnectionStatus::Spectating => "Spectating",
            ConnectionStatus::Playing => "Playing",
            ConnectionStatus::Dying => "Logging out...",
        };
        f.write_str(text)
    }
}

/// What travels through the outgoing channel to the write loop.
enum Outbound {
    Line(Message),
    Shutdown,
}

struct ConnState {
    status: ConnectionStatus,
    id: i32,
    game_speed: u32,
    own_player_joined: bool,
}

/// State shared between the client handle, the session driver and spawned
/// timer tasks.
pub(crate) struct ClientShared {
    config: MazeClientConfig,
    conn: Mutex<ConnState>,
    players: PlayerCollection,
    baits: BaitCollection,
    events: StdMutex<EventHandler>,
    strategy: StdMutex<Option<StrategyHandle>>,
    outgoing: UnboundedSender<Outbound>,
    outgoing_rx: StdMutex<Option<UnboundedReceiver<Outbound>>>,
    ctrl: StdMutex<Option<UnboundedSender<Ctrl>>>,
}

impl ClientShared {
    pub(crate) fn config(&self) -> &MazeClientConfig {
        &self.config
    }

    pub(crate) async fn status(&self) -> ConnectionStatus {
        self.conn.lock().await.status
    }

    pub(crate) async fn id(&self) -> i32 {
        self.conn.lock().await.id
    }

    pub(crate) async fn game_speed(&self) -> u32 {
        self.conn.lock().await.game_speed
    }

    pub(crate) async fn is_logged_in(&self) -> bool {
        self.status().await.is_logged_in()
    }

    pub(crate) async fn own_player_joined(&self) -> bool {
        self.conn.lock().await.own_player_joined
    }

    pub(crate) async fn set_status(&self, new: ConnectionStatus) {
        let old = {
            let mut conn = self.conn.lock().await;
            std::mem::replace(&mut conn.status, new)
        };
        if old != new {
            self.events
                .lock()
                .unwrap()
                .fire_connection_status_change(old, new);
        }
    }

    /// Queues a message for the write loop.
    pub(crate) fn send_message(&self, message: Message) {
        if self.outgoing.send(Outbound::Line(message)).is_err() {
            error!("Outgoing channel was already closed.");
        }
    }

    pub(crate) fn send_shutdown(&self) {
        let _ = self.outgoing.send(Outbound::Shutdown);
    }

    /// Sends the login request. An iteration above zero attaches a number to
    /// the nickname, the simple retry mechanism for duplicate nicks.
    pub(crate) fn send_hello(&self, iteration: u32) {
        let suffix = if iteration == 0 {
            String::new()
        } else {
            iteration.to_string()
        };
        let nick = format!("{}{suffix}", self.config.display_name());
        let flavor = if self.config.with_flavor {
            strategy::flavor_text(&self.config.strategy_name)
        } else {
            None
        };
        self.send_message(hello_message(&nick, flavor.as_deref()));
    }

    /// Handles a successful login: stores the id and requests the maze.
    pub(crate) async fn logged_in(&self, id: i32) {
        let accepted = {
            let mut conn = self.conn.lock().await;
            if conn.status == ConnectionStatus::Connected && id > 0 {
                conn.id = id;
                true
            } else {
                false
            }
        };
        if accepted {
            self.set_status(ConnectionStatus::LoggedIn).await;
            self.send_message(request_maze_message());
        }
    }

    /// Processes the received maze and switches to spectating.
    pub(crate) async fn initialize_maze(&self, width: usize, height: usize, lines: &[String]) {
        if self.status().await == ConnectionStatus::LoggedIn {
            self.events
                .lock()
                .unwrap()
                .fire_maze_received(width, height, lines);
            self.set_status(ConnectionStatus::Spectating).await;
        }
    }

    pub(crate) async fn apply_join(&self, id: i32, nick: String, flavor: Option<String>) {
        let player = Player::new(id, nick, flavor);
        if let Some(snapshot) = self.players.add_player(player).await {
            let own = {
                let mut conn = self.conn.lock().await;
                if conn.id == id {
                    conn.own_player_joined = true;
                    true
                } else {
                    false
                }
            };
            let mut events = self.events.lock().unwrap();
            events.fire_player_login(&snapshot);
            if own {
                events.fire_own_player_login(&snapshot);
            }
        }
    }

    pub(crate) async fn apply_leave(&self, id: i32) {
        if let Some(snapshot) = self.players.remove_player(id).await {
            self.events.lock().unwrap().fire_player_logout(&snapshot);
        }
    }

    pub(crate) async fn apply_player_pos(
        &self,
        id: i32,
        x: i32,
        y: i32,
        direction: ViewDirection,
        reason: PositionChangeReason,
        teleport: Option<TeleportType>,
        causing_player_id: Option<i32>,
    ) {
        if let Some((old, new)) = self
            .players
            .change_position(id, x, y, direction, reason)
            .await
        {
            let mut events = self.events.lock().unwrap();
            match reason {
                PositionChangeReason::Move => events.fire_player_step(old.position(), &new),
                PositionChangeReason::Turn => events.fire_player_turn(old.position(), &new),
                PositionChangeReason::Teleport => {
                    events.fire_player_teleport(old.position(), &new, teleport, causing_player_id)
                }
                PositionChangeReason::Appear => events.fire_player_appear(&new),
                PositionChangeReason::Vanish => events.fire_player_vanish(&old),
            }
        }
    }

    pub(crate) async fn apply_bait_pos(&self, x: i32, y: i32, kind: BaitType, change: BaitChange) {
        match change {
            BaitChange::Collected => {
                if let Some(bait) = self.baits.bait_at(x, y).await {
                    if self.baits.remove_bait(bait).await {
                        self.events.lock().unwrap().fire_bait_vanished(bait);
                    }
                }
            }
            BaitChange::Generated => {
                let bait = Bait::new(kind, x, y);
                if self.baits.add_bait(bait).await {
                    self.events.lock().unwrap().fire_bait_appeared(bait);
                }
            }
        }
    }

    pub(crate) async fn apply_score(&self, id: i32, score: i32) {
        if let Some((old_score, snapshot)) = self.players.change_score(id, score).await {
            self.events
                .lock()
                .unwrap()
                .fire_score_change(old_score, &snapshot);
        }
    }

    pub(crate) async fn change_speed(&self, new_speed: u32) {
        let old = {
            let mut conn = self.conn.lock().await;
            std::mem::replace(&mut conn.game_speed, new_speed)
        };
        if old != new_speed {
            self.events.lock().unwrap().fire_speed_changed(old, new_speed);
        }
    }

    pub(crate) fn fire_client_info(&self, message: &str) {
        self.events.lock().unwrap().fire_client_info(message);
    }

    pub(crate) fn fire_server_info(&self, message: &str) {
        self.events.lock().unwrap().fire_server_info(message);
    }

    pub(crate) fn fire_player_chat(&self, id: i32, nick: &str, message: &str, whisper: bool) {
        self.events
            .lock()
            .unwrap()
            .fire_player_chat(id, nick, message, whisper);
    }

    pub(crate) fn fire_server_error(&self, code: crate::protocol::InfoCode) {
        self.events.lock().unwrap().fire_server_error(code);
    }

    pub(crate) fn strategy_handle(&self) -> Option<StrategyHandle> {
        self.strategy.lock().unwrap().clone()
    }

    pub(crate) async fn own_player(&self) -> Option<PlayerSnapshot> {
        let id = self.id().await;
        if id == NO_ID {
            return None;
        }
        self.players.snapshot(id).await
    }

    pub(crate) async fn strategy_context(&self) -> Option<StrategyContext> {
        let own_player = self.own_player().await?;
        Some(StrategyContext {
            own_player,
            game_speed: self.game_speed().await,
        })
    }

    /// Logs out of the game. If the client is not logged in (yet), the
    /// session is torn down directly.
    pub(crate) async fn logout(&self) {
        if self.is_logged_in().await {
            if let Some(handle) = self.strategy_handle() {
                handle.lock().unwrap().before_goodbye();
            }
            info!("Logging out...");
            self.send_message(bye_message());
        } else {
            warn!("Not logged in.");
            self.request_stop(true).await;
        }
    }

    /// Asks the driver to stop the session. Before any connection exists,
    /// the client is put out of its misery directly.
    pub(crate) async fn request_stop(&self, client_side: bool) {
        let ctrl = self.ctrl.lock().unwrap().clone();
        match ctrl {
            Some(ctrl) => {
                let _ = ctrl.send(Ctrl::Stop { client_side });
            }
            None => {
                warn!(
                    "Client terminated before a connection to '{}:{}' was established.",
                    self.config.server_address, self.config.server_port
                );
                self.set_status(ConnectionStatus::Dying).await;
                self.set_status(ConnectionStatus::Dead).await;
            }
        }
    }
}

/// Central maze client.
///
/// Constructed from a [`MazeClientConfig`], started asynchronously and
/// stopped with [`logout`](MazeClient::logout). The client mirrors the game
/// state the server reports and exposes it through snapshot accessors, while
/// registered [`EventListener`]s and the configured strategy receive every
/// change as it happens.
pub struct MazeClient {
    shared: Arc<ClientShared>,
}

impl MazeClient {
    pub fn new(config: MazeClientConfig) -> Self {
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        MazeClient {
            shared: Arc::new(ClientShared {
                config,
                conn: Mutex::new(ConnState {
                    status: ConnectionStatus::NotConnected,
                    id: NO_ID,
                    game_speed: DEFAULT_GAME_SPEED,
                    own_player_joined: false,
                }),
                players: PlayerCollection::new(),
                baits: BaitCollection::new(),
                events: StdMutex::new(EventHandler::new()),
                strategy: StdMutex::new(None),
                outgoing,
                outgoing_rx: StdMutex::new(Some(outgoing_rx)),
                ctrl: StdMutex::new(None),
            }),
        }
    }

    pub fn server_address(&self) -> &str {
        &self.shared.config.server_address
    }

    pub fn server_port(&self) -> u16 {
        self.shared.config.server_port
    }

    /// Registers an event listener. The strategy is added automatically at
    /// start; everything else has to be added manually.
    pub fn add_listener(&self, listener: Box<dyn EventListener>) {
        self.shared.events.lock().unwrap().add_listener(listener);
    }

    /// Hands a message of the client itself to all chat listeners.
    pub fn fire_client_info(&self, message: &str) {
        self.shared.fire_client_info(message);
    }

    /// Connects to the configured server and starts the session.
    ///
    /// The returned [`Session`] represents the completion of the whole
    /// session. Connection errors leave the client [`ConnectionStatus::Dead`]
    /// and propagate to the caller.
    pub async fn start(&self) -> Result<Session> {
        let address = format!(
            "{}:{}",
            self.shared.config.server_address, self.shared.config.server_port
        );
        let stream = match TcpStream::connect(&address).await {
            Ok(stream) => stream,
            Err(err) => {
                error!("Connection error: {err}");
                self.shared.set_status(ConnectionStatus::Dead).await;
                return Err(err).context(format!("could not connect to '{address}'"));
            }
        };
        let (line_stream, line_sink) = tcp::split(stream);
        self.start_with(line_stream, line_sink).await
    }

    /// Starts the session on an already established transport. This is what
    /// [`start`](MazeClient::start) uses under the hood and what tests and
    /// embeddings use with the in-process channel transport.
    pub async fn start_with(
        &self,
        stream: impl LineStream + 'static,
        sink: impl LineSink + 'static,
    ) -> Result<Session> {
        let strategy_name = &self.shared.config.strategy_name;
        let strategy = strategy::create_strategy(strategy_name)
            .ok_or_else(|| anyhow!("could not find strategy with name '{strategy_name}'"))?;
        let handle: StrategyHandle = Arc::new(StdMutex::new(strategy));
        *self.shared.strategy.lock().unwrap() = Some(handle.clone());
        self.shared
            .events
            .lock()
            .unwrap()
            .add_listener(Box::new(SharedStrategy::new(handle)));

        let outgoing_rx = self
            .shared
            .outgoing_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow!("the client was already started"))?;
        let writer = tokio::spawn(write_loop(sink, outgoing_rx));

        let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel();
        *self.shared.ctrl.lock().unwrap() = Some(ctrl_tx.clone());

        self.shared.set_status(ConnectionStatus::Connected).await;
        let shared = self.shared.clone();
        let session = tokio::spawn(async move {
            Driver::new(shared, stream, ctrl_tx, ctrl_rx, writer).run().await;
        });
        Ok(Session { handle: session })
    }

    /// Logs out of the game.
    pub async fn logout(&self) {
        self.shared.logout().await;
    }

    /// Sends a chat message to all players.
    pub fn broadcast(&self, message: &str) {
        self.shared
            .send_message(chat_message(&sanitize_chat_message(message)));
    }

    /// Sends a whisper message to the player with `receiver_id`.
    pub fn whisper(&self, message: &str, receiver_id: i32) {
        self.shared
            .send_message(whisper_message(&sanitize_chat_message(message), receiver_id));
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.shared.status().await
    }

    /// The id assigned by the server, [`NO_ID`] before the login.
    pub async fn id(&self) -> i32 {
        self.shared.id().await
    }

    /// The current game speed; can be changed by the server.
    pub async fn game_speed(&self) -> u32 {
        self.shared.game_speed().await
    }

    pub async fn is_logged_in(&self) -> bool {
        self.shared.is_logged_in().await
    }

    /// Snapshots of all players currently in the game.
    pub async fn players(&self) -> Vec<PlayerSnapshot> {
        self.shared.players.snapshots().await
    }

    /// Snapshot of the own player, once it joined the game.
    pub async fn own_player(&self) -> Option<PlayerSnapshot> {
        self.shared.own_player().await
    }

    /// All baits currently on the map.
    pub async fn baits(&self) -> Vec<Bait> {
        self.shared.baits.elements().await
    }

    /// The bait at the given position, if there is one.
    pub async fn bait_at(&self, x: i32, y: i32) -> Option<Bait> {
        self.shared.baits.bait_at(x, y).await
    }

    /// Sets the score offset of every player to its current score, for
    /// comparable score displays after new players joined.
    pub async fn soft_reset_scores(&self) {
        self.shared.players.soft_reset_all_scores().await;
    }
}

/// The handle representing the completion of a running session.
pub struct Session {
    handle: JoinHandle<()>,
}

impl Session {
    /// Waits until the session is over: the connection is closed and the
    /// client is [`ConnectionStatus::Dead`].
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|err| anyhow!("session task failed: {err}"))
    }
}

/// Drains the outgoing channel into the sink. Messages marked as last
/// trigger a flush; empty messages only flush.
async fn write_loop(mut sink: impl LineSink, mut outgoing: UnboundedReceiver<Outbound>) {
    while let Some(item) = outgoing.recv().await {
        match item {
            Outbound::Line(message) => {
                if !message.is_empty() {
                    if let Err(err) = sink.write_line(message.text()).await {
                        error!("Write error: {err:#}");
                        break;
                    }
                    debug!("Sent message: '{}'", message.text());
                }
                if message.is_last() {
                    if let Err(err) = sink.flush().await {
                        error!("Write error: {err:#}");
                        break;
                    }
                }
            }
            Outbound::Shutdown => break,
        }
    }
}
