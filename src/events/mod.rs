
use crate::bait::Bait;
use crate::client::ConnectionStatus;
use crate::player::{PlayerPosition, PlayerSnapshot, TeleportType};
use crate::protocol::InfoCode;

/// Listener for maze game client events.
///
/// Every method has an empty default implementation, so implementors only
/// pick what they need. Strategies implement this trait as well and are
/// registered automatically when the client starts; all other listeners have
/// to be added manually.
///
/// A short overview:
/// - [`on_maze_received`](Self::on_maze_received) delivers the map data,
///   essential for building custom maze representations.
/// - the bait methods follow baits appearing and vanishing.
/// - the player login/logout methods follow players joining and leaving.
/// - the movement methods follow position changes, including appearing on
///   and vanishing from the map.
/// - [`on_score_change`](Self::on_score_change) follows score changes.
/// - the chat methods deliver messages, including whispers (bots can talk
///   with each other).
/// - [`on_server_error`](Self::on_server_error) delivers server error codes,
///   e.g. for reacting to wall crashes.
/// - [`on_connection_status_change`](Self::on_connection_status_change) and
///   [`on_speed_changed`](Self::on_speed_changed) follow session-level
///   changes.
#[allow(unused_variables)]
pub trait EventListener: Send {
    /// Called once the server sent the whole maze data. The perfect place to
    /// initialize data that requires the maze to be present.
    fn on_maze_received(&mut self, width: usize, height: usize, lines: &[String]) {}

    /// Called whenever the server reports that a bait appeared.
    fn on_bait_appeared(&mut self, bait: Bait) {}

    /// Called whenever the server reports that a bait has vanished.
    fn on_bait_vanished(&mut self, bait: Bait) {}

    /// Called when the server reports that a new player joined the game.
    fn on_player_login(&mut self, player: &PlayerSnapshot) {}

    /// Called in addition to [`on_player_login`](Self::on_player_login) when
    /// the joining player is the own player.
    fn on_own_player_login(&mut self, player: &PlayerSnapshot) {}

    /// Called when the server reports that a player left the game.
    fn on_player_logout(&mut self, player: &PlayerSnapshot) {}

    /// Called when a player position is communicated for the first time,
    /// shortly after joining.
    fn on_player_appear(&mut self, player: &PlayerSnapshot) {}

    /// Called when a player is about to leave the game.
    fn on_player_vanish(&mut self, player: &PlayerSnapshot) {}

    /// Called when a player successfully performed a step move.
    fn on_player_step(&mut self, old_position: PlayerPosition, player: &PlayerSnapshot) {}

    /// Called when a player successfully performed a turn move.
    fn on_player_turn(&mut self, old_position: PlayerPosition, player: &PlayerSnapshot) {}

    /// Called when a player was teleported. For collisions the causing player
    /// id says who is to blame; the server can always tell.
    fn on_player_teleport(
        &mut self,
        old_position: PlayerPosition,
        player: &PlayerSnapshot,
        teleport: Option<TeleportType>,
        causing_player_id: Option<i32>,
    ) {
    }

    /// Called when a player's score changed; the new score is part of the
    /// snapshot.
    fn on_score_change(&mut self, old_score: i32, player: &PlayerSnapshot) {}

    /// Called when the client itself wants to display something.
    fn on_client_info(&mut self, message: &str) {}

    /// Called when the server wants to display something.
    fn on_server_info(&mut self, message: &str) {}

    /// Called when another player chats; whispers carry the flag.
    fn on_player_chat(&mut self, player_id: i32, nick: &str, message: &str, whisper: bool) {}

    /// Called when the server sends an error-related info code.
    fn on_server_error(&mut self, code: InfoCode) {}

    /// Called just after the connection status changed.
    fn on_connection_status_change(&mut self, old: ConnectionStatus, new: ConnectionStatus) {}

    /// Called whenever the game speed changes.
    fn on_speed_changed(&mut self, old_speed: u32, new_speed: u32) {}
}

/// Fans client events out to all registered listeners, in registration
/// order. Each client has its own handler, or it would get very messy.
#[derive(Default)]
pub struct EventHandler {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventHandler {
    pub fn new() -> Self {
        EventHandler::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn fire_maze_received(&mut self, width: usize, height: usize, lines: &[String]) {
        for listener in &mut self.listeners {
            listener.on_maze_received(width, height, lines);
        }
    }

    pub fn fire_bait_appeared(&mut self, bait: Bait) {
        for listener in &mut self.listeners {
            listener.on_bait_appeared(bait);
        }
    }

    pub fn fire_bait_vanished(&mut self, bait: Bait) {
        for listener in &mut self.listeners {
            listener.on_bait_vanished(bait);
        }
    }

    pub fn fire_player_login(&mut self, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_player_login(player);
        }
    }

    pub fn fire_own_player_login(&mut self, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_own_player_login(player);
        }
    }

    pub fn fire_player_logout(&mut self, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_player_logout(player);
        }
    }

    pub fn fire_player_appear(&mut self, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_player_appear(player);
        }
    }

    pub fn fire_player_vanish(&mut self, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_player_vanish(player);
        }
    }

    pub fn fire_player_step(&mut self, old_position: PlayerPosition, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_player_step(old_position, player);
        }
    }

    pub fn fire_player_turn(&mut self, old_position: PlayerPosition, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_player_turn(old_position, player);
        }
    }

    pub fn fire_player_teleport(
        &mut self,
        old_position: PlayerPosition,
        player: &PlayerSnapshot,
        teleport: Option<TeleportType>,
        causing_player_id: Option<i32>,
    ) {
        for listener in &mut self.listeners {
            listener.on_player_teleport(old_position, player, teleport, causing_player_id);
        }
    }

    pub fn fire_score_change(&mut self, old_score: i32, player: &PlayerSnapshot) {
        for listener in &mut self.listeners {
            listener.on_score_change(old_score, player);
        }
    }

    pub fn fire_client_info(&mut self, message: &str) {
        for listener in &mut self.listeners {
            listener.on_client_info(message);
        }
    }

    pub fn fire_server_info(&mut self, message: &str) {
        for listener in &mut self.listeners {
            listener.on_server_info(message);
        }
    }

    pub fn fire_player_chat(&mut self, player_id: i32, nick: &str, message: &str, whisper: bool) {
        for listener in &mut self.listeners {
            listener.on_player_chat(player_id, nick, message, whisper);
        }
    }

    pub fn fire_server_error(&mut self, code: InfoCode) {
        for listener in &mut self.listeners {
            listener.on_server_error(code);
        }
    }

    pub fn fire_connection_status_change(&mut self, old: ConnectionStatus, new: ConnectionStatus) {
        for listener in &mut self.listeners {
            listener.on_connection_status_change(old, new);
        }
    }

    pub fn fire_speed_changed(&mut self, old_speed: u32, new_speed: u32) {
        for listener in &mut self.listeners {
            listener.on_speed_changed(old_speed, new_speed);
        }
    }
}
