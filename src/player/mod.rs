/// Players, their positions and the concurrent player collection.
mod test;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rand::Rng;
use tokio::sync::Mutex;

/// The view direction as orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewDirection {
    North,
    East,
    South,
    West,
}

impl ViewDirection {
    pub fn short_name(self) -> &'static str {
        match self {
            ViewDirection::North => "n",
            ViewDirection::East => "e",
            ViewDirection::South => "s",
            ViewDirection::West => "w",
        }
    }

    pub fn from_short_name(short_name: &str) -> Result<ViewDirection> {
        match short_name {
            "n" => Ok(ViewDirection::North),
            "e" => Ok(ViewDirection::East),
            "s" => Ok(ViewDirection::South),
            "w" => Ok(ViewDirection::West),
            _ => bail!("incorrect view direction: {short_name}"),
        }
    }

    pub fn random() -> ViewDirection {
        match rand::rng().random_range(0..4) {
            0 => ViewDirection::North,
            1 => ViewDirection::East,
            2 => ViewDirection::South,
            _ => ViewDirection::West,
        }
    }

    pub fn turn_right(self) -> ViewDirection {
        match self {
            ViewDirection::North => ViewDirection::East,
            ViewDirection::East => ViewDirection::South,
            ViewDirection::South => ViewDirection::West,
            ViewDirection::West => ViewDirection::North,
        }
    }

    pub fn turn_left(self) -> ViewDirection {
        match self {
            ViewDirection::North => ViewDirection::West,
            ViewDirection::East => ViewDirection::North,
            ViewDirection::South => ViewDirection::East,
            ViewDirection::West => ViewDirection::South,
        }
    }
}

/// All possible reasons for player position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionChangeReason {
    /// The player was teleported, see [`TeleportType`].
    Teleport,
    /// The player appears for the first time, right after a login.
    Appear,
    /// The player vanishes from the maze, right before a logout.
    Vanish,
    /// The player moved one step forward.
    Move,
    /// The player changed the view direction.
    Turn,
}

impl PositionChangeReason {
    pub fn short_name(self) -> &'static str {
        match self {
            PositionChangeReason::Teleport => "tel",
            PositionChangeReason::Appear => "app",
            PositionChangeReason::Vanish => "van",
            PositionChangeReason::Move => "mov",
            PositionChangeReason::Turn => "trn",
        }
    }

    pub fn from_short_name(short_name: &str) -> Result<PositionChangeReason> {
        match short_name {
            "tel" => Ok(PositionChangeReason::Teleport),
            "app" => Ok(PositionChangeReason::Appear),
            "van" => Ok(PositionChangeReason::Vanish),
            "mov" => Ok(PositionChangeReason::Move),
            "trn" => Ok(PositionChangeReason::Turn),
            _ => bail!("incorrect position change reason: {short_name}"),
        }
    }
}

/// Reason for a teleportation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeleportType {
    /// Caused by a trap.
    Trap,
    /// Caused by a collision with another player.
    Collision,
}

impl TeleportType {
    pub fn short_name(self) -> &'static str {
        match self {
            TeleportType::Trap => "t",
            TeleportType::Collision => "c",
        }
    }

    pub fn from_short_name(short_name: &str) -> Result<TeleportType> {
        match short_name {
            "t" => Ok(TeleportType::Trap),
            "c" => Ok(TeleportType::Collision),
            _ => bail!("incorrect teleport type: {short_name}"),
        }
    }
}

/// The position of a player including the view direction, without everything
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerPosition {
    pub x: i32,
    pub y: i32,
    pub direction: ViewDirection,
}

impl PlayerPosition {
    pub fn new(x: i32, y: i32, direction: ViewDirection) -> Self {
        PlayerPosition { x, y, direction }
    }

    pub fn when_right(self) -> PlayerPosition {
        PlayerPosition {
            direction: self.direction.turn_right(),
            ..self
        }
    }

    pub fn when_left(self) -> PlayerPosition {
        PlayerPosition {
            direction: self.direction.turn_left(),
            ..self
        }
    }

    pub fn when_step(self) -> PlayerPosition {
        let (x, y) = match self.direction {
            ViewDirection::North => (self.x, self.y - 1),
            ViewDirection::East => (self.x + 1, self.y),
            ViewDirection::South => (self.x, self.y + 1),
            ViewDirection::West => (self.x - 1, self.y),
        };
        PlayerPosition { x, y, ..self }
    }
}

/// A player as tracked by the client.
///
/// Besides the data reported by the server, the client keeps a score offset:
/// it is set to the first score ever reported for the player and allows
/// displaying comparable scores since login.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: i32,
    pub nick: String,
    pub flavor: Option<String>,
    pub x: i32,
    pub y: i32,
    pub direction: ViewDirection,
    score: i32,
    score_offset: i32,
    move_counter: u32,
    login_time: Instant,
    play_start_time: Instant,
}

impl Player {
    /// A new player; the position stays off-map until the first position
    /// report arrives.
    pub fn new(id: i32, nick: impl Into<String>, flavor: Option<String>) -> Self {
        let now = Instant::now();
        Player {
            id,
            nick: nick.into(),
            flavor,
            x: -1,
            y: -1,
            direction: ViewDirection::random(),
            score: 0,
            score_offset: 0,
            move_counter: 0,
            login_time: now,
            play_start_time: now,
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    pub fn score_offset(&self) -> i32 {
        self.score_offset
    }

    pub fn set_score_offset(&mut self, offset: i32) {
        self.score_offset = offset;
    }

    /// Resets the score and everything derived from it.
    pub fn reset_score(&mut self) {
        self.score = 0;
        self.score_offset = 0;
        self.move_counter = 0;
        self.play_start_time = Instant::now();
    }

    pub fn increment_move_counter(&mut self) {
        self.move_counter += 1;
    }

    /// Time since login.
    pub fn total_play_time(&self) -> Duration {
        self.login_time.elapsed()
    }

    /// Time since the last score reset.
    pub fn current_play_time(&self) -> Duration {
        self.play_start_time.elapsed()
    }

    /// Points per minute since the last score reset, rounded to two decimals.
    pub fn points_per_minute(&self) -> f64 {
        let minutes = self.current_play_time().as_secs_f64() / 60.0;
        (((self.score - self.score_offset) as f64 / minutes) * 100.0).round() / 100.0
    }

    /// Average milliseconds per move for the current play time, NaN before
    /// the first move.
    pub fn move_time(&self) -> f64 {
        if self.move_counter == 0 {
            return f64::NAN;
        }
        let millis = self.current_play_time().as_secs_f64() * 1000.0;
        (millis * 100.0 / self.move_counter as f64).round() / 100.0
    }

    pub fn position(&self) -> PlayerPosition {
        PlayerPosition::new(self.x, self.y, self.direction)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            nick: self.nick.clone(),
            flavor: self.flavor.clone(),
            x: self.x,
            y: self.y,
            direction: self.direction,
            score: self.score,
            score_offset: self.score_offset,
            total_play_time: self.total_play_time(),
            current_play_time: self.current_play_time(),
            points_per_minute: self.points_per_minute(),
            move_time: self.move_time(),
        }
    }
}

/// An immutable copy of a player's state at the moment it was taken. Useful
/// for strategies and listeners, not for live surveillance.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: i32,
    pub nick: String,
    pub flavor: Option<String>,
    pub x: i32,
    pub y: i32,
    pub direction: ViewDirection,
    pub score: i32,
    pub score_offset: i32,
    pub total_play_time: Duration,
    pub current_play_time: Duration,
    pub points_per_minute: f64,
    pub move_time: f64,
}

impl PlayerSnapshot {
    pub fn position(&self) -> PlayerPosition {
        PlayerPosition::new(self.x, self.y, self.direction)
    }

    /// The score without the offset.
    pub fn local_score(&self) -> i32 {
        self.score - self.score_offset
    }
}

#[derive(Default)]
struct PlayerMap {
    players: HashMap<i32, Player>,
    /// Player ids that never received a score. Decides when the score offset
    /// is set.
    virgin_score_ids: HashSet<i32>,
}

/// A concurrency-safe collection of [`Player`]s.
#[derive(Default)]
pub struct PlayerCollection {
    inner: Mutex<PlayerMap>,
}

impl PlayerCollection {
    pub fn new() -> Self {
        PlayerCollection::default()
    }

    /// Adds a new player. Returns the snapshot of the added player, or `None`
    /// if the id was already present.
    pub(crate) async fn add_player(&self, player: Player) -> Option<PlayerSnapshot> {
        let mut inner = self.inner.lock().await;
        if inner.players.contains_key(&player.id) {
            return None;
        }
        let snapshot = player.snapshot();
        inner.virgin_score_ids.insert(player.id);
        inner.players.insert(player.id, player);
        Some(snapshot)
    }

    /// Removes the player with the given id and returns its last snapshot.
    pub(crate) async fn remove_player(&self, player_id: i32) -> Option<PlayerSnapshot> {
        let mut inner = self.inner.lock().await;
        inner.virgin_score_ids.remove(&player_id);
        inner
            .players
            .remove(&player_id)
            .map(|player| player.snapshot())
    }

    /// The snapshot of a single player, if it exists.
    pub async fn snapshot(&self, player_id: i32) -> Option<PlayerSnapshot> {
        let inner = self.inner.lock().await;
        inner.players.get(&player_id).map(Player::snapshot)
    }

    /// Applies a position change and returns the snapshots from before and
    /// after it. Steps and turns increase the player's move counter.
    pub(crate) async fn change_position(
        &self,
        player_id: i32,
        x: i32,
        y: i32,
        direction: ViewDirection,
        reason: PositionChangeReason,
    ) -> Option<(PlayerSnapshot, PlayerSnapshot)> {
        let mut inner = self.inner.lock().await;
        let player = inner.players.get_mut(&player_id)?;
        let old_snapshot = player.snapshot();
        player.x = x;
        player.y = y;
        player.direction = direction;
        if matches!(
            reason,
            PositionChangeReason::Move | PositionChangeReason::Turn
        ) {
            player.increment_move_counter();
        }
        let new_snapshot = player.snapshot();
        Some((old_snapshot, new_snapshot))
    }

    /// Applies a score change and returns the old score plus the new
    /// snapshot. A report of 0 for a player with positive points per minute
    /// is a server-side score reset.
    pub(crate) async fn change_score(
        &self,
        player_id: i32,
        new_score: i32,
    ) -> Option<(i32, PlayerSnapshot)> {
        let mut inner = self.inner.lock().await;
        if !inner.players.contains_key(&player_id) {
            return None;
        }
        let virgin = inner.virgin_score_ids.remove(&player_id);
        let player = inner.players.get_mut(&player_id)?;
        let old_score = player.score();
        if new_score == 0 && player.points_per_minute() > 0.0 {
            // A reset would also hit trapeaters, but their ppm is negative.
            player.reset_score();
        } else {
            player.set_score(new_score);
        }
        if virgin {
            player.set_score_offset(new_score);
        }
        let new_snapshot = player.snapshot();
        Some((old_score, new_snapshot))
    }

    /// Sets every player's score offset to the current score, for comparable
    /// score displays.
    pub(crate) async fn soft_reset_all_scores(&self) {
        let mut inner = self.inner.lock().await;
        for player in inner.players.values_mut() {
            let score = player.score();
            player.set_score_offset(score);
        }
    }

    /// Snapshots of all players currently in the collection.
    pub async fn snapshots(&self) -> Vec<PlayerSnapshot> {
        let inner = self.inner.lock().await;
        inner.players.values().map(Player::snapshot).collect()
    }
}
