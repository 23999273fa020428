
pub mod aimless;
pub mod astar;
pub mod spectator;
pub mod trapeater;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use anyhow::{bail, Result};

use crate::events::EventListener;
use crate::player::{PlayerSnapshot, ViewDirection};
use crate::protocol::text::{is_nick_valid, sanitize_flavor_text};

use self::aimless::Aimless;
use self::spectator::Spectator;
use self::trapeater::Trapeater;

/// A single move of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Don't move at all.
    DoNothing,
    /// Turn left.
    TurnLeft,
    /// Turn right.
    TurnRight,
    /// Step forward.
    Step,
}

impl Move {
    /// The view direction after applying this move to `before`.
    pub fn direction_after(self, before: ViewDirection) -> ViewDirection {
        match self {
            Move::DoNothing | Move::Step => before,
            Move::TurnRight => before.turn_right(),
            Move::TurnLeft => before.turn_left(),
        }
    }
}

/// How a strategy participates in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Bot,
    Spectator,
    Human,
}

/// What a strategy gets to see when it is asked for a move.
///
/// Strategies that need more than this (the maze, baits, other players) build
/// their own representations from the [`EventListener`] callbacks.
#[derive(Debug, Clone)]
pub struct StrategyContext {
    /// Snapshot of the own player.
    pub own_player: PlayerSnapshot,
    /// The current game speed in milliseconds per move.
    pub game_speed: u32,
}

/// A bot strategy.
///
/// A strategy is also an [`EventListener`] and is registered with the
/// client's event handler automatically when the client starts, so it can
/// collect whatever game data it needs.
pub trait Strategy: EventListener {
    /// Decides the next move. Called every time the server signals that it
    /// is ready for one.
    fn next_move(&mut self, ctx: &StrategyContext) -> Move;

    /// Artificial delay in milliseconds applied before the chosen move is
    /// sent. Useful for slowing a bot down.
    fn bot_delay(&self) -> u64 {
        0
    }

    /// Called right before the client sends its goodbye to the server.
    fn before_goodbye(&mut self) {}
}

/// Shared handle to the running strategy. The client keeps one for the move
/// loop while the event handler holds the listener side.
pub(crate) type StrategyHandle = Arc<Mutex<Box<dyn Strategy>>>;

/// Listener adapter delegating to the shared strategy.
pub(crate) struct SharedStrategy {
    inner: StrategyHandle,
}

impl SharedStrategy {
    pub(crate) fn new(inner: StrategyHandle) -> Self {
        SharedStrategy { inner }
    }
}

impl EventListener for SharedStrategy {
    fn on_maze_received(&mut self, width: usize, height: usize, lines: &[String]) {
        self.inner
            .lock()
            .unwrap()
            .on_maze_received(width, height, lines);
    }

    fn on_bait_appeared(&mut self, bait: crate::bait::Bait) {
        self.inner.lock().unwrap().on_bait_appeared(bait);
    }

    fn on_bait_vanished(&mut self, bait: crate::bait::Bait) {
        self.inner.lock().unwrap().on_bait_vanished(bait);
    }

    fn on_player_login(&mut self, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_player_login(player);
    }

    fn on_own_player_login(&mut self, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_own_player_login(player);
    }

    fn on_player_logout(&mut self, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_player_logout(player);
    }

    fn on_player_appear(&mut self, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_player_appear(player);
    }

    fn on_player_vanish(&mut self, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_player_vanish(player);
    }

    fn on_player_step(&mut self, old_position: crate::player::PlayerPosition, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_player_step(old_position, player);
    }

    fn on_player_turn(&mut self, old_position: crate::player::PlayerPosition, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_player_turn(old_position, player);
    }

    fn on_player_teleport(
        &mut self,
        old_position: crate::player::PlayerPosition,
        player: &PlayerSnapshot,
        teleport: Option<crate::player::TeleportType>,
        causing_player_id: Option<i32>,
    ) {
        self.inner
            .lock()
            .unwrap()
            .on_player_teleport(old_position, player, teleport, causing_player_id);
    }

    fn on_score_change(&mut self, old_score: i32, player: &PlayerSnapshot) {
        self.inner.lock().unwrap().on_score_change(old_score, player);
    }

    fn on_client_info(&mut self, message: &str) {
        self.inner.lock().unwrap().on_client_info(message);
    }

    fn on_server_info(&mut self, message: &str) {
        self.inner.lock().unwrap().on_server_info(message);
    }

    fn on_player_chat(&mut self, player_id: i32, nick: &str, message: &str, whisper: bool) {
        self.inner
            .lock()
            .unwrap()
            .on_player_chat(player_id, nick, message, whisper);
    }

    fn on_server_error(&mut self, code: crate::protocol::InfoCode) {
        self.inner.lock().unwrap().on_server_error(code);
    }

    fn on_connection_status_change(
        &mut self,
        old: crate::client::ConnectionStatus,
        new: crate::client::ConnectionStatus,
    ) {
        self.inner
            .lock()
            .unwrap()
            .on_connection_status_change(old, new);
    }

    fn on_speed_changed(&mut self, old_speed: u32, new_speed: u32) {
        self.inner.lock().unwrap().on_speed_changed(old_speed, new_speed);
    }
}

type Constructor = fn() -> Box<dyn Strategy>;

struct StrategyEntry {
    flavor: String,
    kind: StrategyKind,
    constructor: Constructor,
}

fn new_aimless() -> Box<dyn Strategy> {
    Box::new(Aimless::new())
}

fn new_spectator() -> Box<dyn Strategy> {
    Box::new(Spectator)
}

fn new_trapeater() -> Box<dyn Strategy> {
    Box::new(Trapeater::new())
}

static REGISTRY: LazyLock<Mutex<HashMap<String, StrategyEntry>>> = LazyLock::new(|| {
    let mut strategies = HashMap::new();
    strategies.insert(
        "aimless".to_string(),
        StrategyEntry {
            flavor: sanitize_flavor_text("I run against walls!"),
            kind: StrategyKind::Bot,
            constructor: new_aimless as Constructor,
        },
    );
    strategies.insert(
        "spectator".to_string(),
        StrategyEntry {
            flavor: String::new(),
            kind: StrategyKind::Spectator,
            constructor: new_spectator as Constructor,
        },
    );
    strategies.insert(
        "trapeater".to_string(),
        StrategyEntry {
            flavor: sanitize_flavor_text("I eat traps for breakfast!"),
            kind: StrategyKind::Bot,
            constructor: new_trapeater as Constructor,
        },
    );
    Mutex::new(strategies)
});

/// Registers a custom strategy under `name`. The name has to start with a
/// letter and may only contain letters, digits, '_' and '-'; no fancy stuff.
/// Registering an already taken name is an error.
pub fn register_strategy(
    name: &str,
    flavor: &str,
    kind: StrategyKind,
    constructor: Constructor,
) -> Result<()> {
    if !is_nick_valid(name) {
        bail!("strategy '{name}' has an invalid name");
    }
    let mut registry = REGISTRY.lock().unwrap();
    if registry.contains_key(name) {
        bail!("strategy '{name}' has already been registered");
    }
    registry.insert(
        name.to_string(),
        StrategyEntry {
            flavor: sanitize_flavor_text(flavor),
            kind,
            constructor,
        },
    );
    Ok(())
}

/// Creates an instance of the strategy registered under `name`.
pub fn create_strategy(name: &str) -> Option<Box<dyn Strategy>> {
    let registry = REGISTRY.lock().unwrap();
    registry.get(name).map(|entry| (entry.constructor)())
}

/// The sanitized flavor text registered for `name`.
pub fn flavor_text(name: &str) -> Option<String> {
    let registry = REGISTRY.lock().unwrap();
    registry.get(name).map(|entry| entry.flavor.clone())
}

/// How the strategy registered under `name` participates in the game.
pub fn strategy_kind(name: &str) -> Option<StrategyKind> {
    let registry = REGISTRY.lock().unwrap();
    registry.get(name).map(|entry| entry.kind)
}

/// All registered strategy names, sorted.
pub fn strategy_names() -> Vec<String> {
    let registry = REGISTRY.lock().unwrap();
    let mut names: Vec<String> = registry.keys().cloned().collect();
    names.sort();
    names
}
