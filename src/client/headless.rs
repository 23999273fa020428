//! Log-based event listeners for running the client without any UI.

use log::{error, info, warn};

use crate::bait::BaitType;
use crate::events::EventListener;
use crate::player::{PlayerPosition, PlayerSnapshot, TeleportType};
use crate::protocol::InfoCode;

/// Writes client, server and player chat to the log.
pub struct ChatDisplay;

impl EventListener for ChatDisplay {
    fn on_client_info(&mut self, message: &str) {
        info!("{message}");
    }

    fn on_server_info(&mut self, message: &str) {
        info!("Server: {message}");
    }

    fn on_player_chat(&mut self, _player_id: i32, nick: &str, message: &str, whisper: bool) {
        let appendix = if whisper { "(whisper)" } else { "" };
        info!("{nick}{appendix}: {message}");
    }
}

/// Writes server errors to the log, in human words.
pub struct ErrorDisplay;

impl EventListener for ErrorDisplay {
    fn on_server_error(&mut self, code: InfoCode) {
        let number = code.code();
        match code {
            InfoCode::WrongParameterValue => warn!("{number}: Wrong parameter value"),
            InfoCode::TooManyClients => warn!("{number}: Server full (too many clients)"),
            InfoCode::DuplicateNick => warn!("{number}: Duplicate/Invalid nick"),
            InfoCode::WallCrash => warn!("{number}: Tried to step into a wall"),
            InfoCode::ActionWithoutReady => warn!("{number}: Did not wait for RDY."),
            InfoCode::AlreadyLoggedIn => warn!("{number}: Already logged in"),
            InfoCode::CommandBeforeLogin => warn!("{number}: Not logged in"),
            InfoCode::LoginTimeout => error!("{number}: Login timed out"),
            InfoCode::UnknownCommand => {
                error!("{number}: The server did not understand our last command")
            }
            InfoCode::ParameterCountIncorrect => {
                error!("{number}: Incorrect number of parameters")
            }
            InfoCode::CompletelyUnknown => error!("{number}: We do not know this error code"),
            other => error!("{other:?} should not be manifested as server error event."),
        }
    }
}

/// Logs players joining and leaving, with their final statistics.
pub struct PlayerConnectionLogger;

impl EventListener for PlayerConnectionLogger {
    fn on_player_login(&mut self, player: &PlayerSnapshot) {
        info!("Player '{} ({})' logged in.", player.nick, player.id);
    }

    fn on_own_player_login(&mut self, player: &PlayerSnapshot) {
        info!(
            "The own player '{} ({})' finally logged in.",
            player.nick, player.id
        );
    }

    fn on_player_logout(&mut self, player: &PlayerSnapshot) {
        info!(
            "Player '{} ({})' logged out. Total playtime was: {:?}. Current playtime was: {:?}. \
             Current points per minute was {}. Current move time was: {}.",
            player.nick,
            player.id,
            player.total_play_time,
            player.current_play_time,
            player.points_per_minute,
            player.move_time
        );
    }
}

/// Logs every player movement.
pub struct PlayerMovementLogger;

impl EventListener for PlayerMovementLogger {
    fn on_player_appear(&mut self, player: &PlayerSnapshot) {
        info!("Player '{} ({})' entered the maze.", player.nick, player.id);
    }

    fn on_player_vanish(&mut self, player: &PlayerSnapshot) {
        info!("Player '{} ({})' left the maze.", player.nick, player.id);
    }

    fn on_player_step(&mut self, _old_position: PlayerPosition, player: &PlayerSnapshot) {
        info!(
            "Player '{} ({})' made a step forward.",
            player.nick, player.id
        );
    }

    fn on_player_turn(&mut self, old_position: PlayerPosition, player: &PlayerSnapshot) {
        info!(
            "Player '{} ({})' turned from '{:?}' to '{:?}'.",
            player.nick, player.id, old_position.direction, player.direction
        );
    }

    fn on_player_teleport(
        &mut self,
        _old_position: PlayerPosition,
        player: &PlayerSnapshot,
        teleport: Option<TeleportType>,
        causing_player_id: Option<i32>,
    ) {
        let collision_reason = match causing_player_id {
            None => String::new(),
            Some(id) if id == player.id => " It was their own fault.".to_string(),
            Some(id) => format!(" It was the other player's fault ({id})."),
        };
        let teleport_reason = match teleport {
            None => String::new(),
            Some(TeleportType::Trap) => " They ran into a trap.".to_string(),
            Some(TeleportType::Collision) => {
                format!(" They collided with another player.{collision_reason}")
            }
        };
        info!(
            "Player '{} ({})' was teleported away.{teleport_reason}",
            player.nick, player.id
        );
    }
}

/// Logs score changes and guesses the collected bait from the difference.
pub struct PlayerScoreLogger;

impl EventListener for PlayerScoreLogger {
    fn on_score_change(&mut self, old_score: i32, player: &PlayerSnapshot) {
        let difference = player.score - old_score;
        let reason = match BaitType::by_score(difference) {
            None => String::new(),
            Some(BaitType::Trap) => " They ran into a trap.".to_string(),
            Some(kind) => format!(" They collected a {kind}."),
        };
        info!(
            "Player with id '{}' made '{difference}' points.{reason}",
            player.id
        );
    }
}
