//! The trapeater bot.
//!
//! Uses A* for pathfinding; target selection happens by Manhattan distance.
//! Players and all other baits are completely ignored, and the bot sticks to
//! a target until it is collected or the bot gets teleported. This
//! intentionally bad strategy is good enough for eating traps. It is not
//! easily adaptable to "real" strategies; developing a better approach from
//! scratch will be faster ... you have been warned!

use std::collections::HashSet;

use log::error;

use crate::bait::{Bait, BaitType};
use crate::events::EventListener;
use crate::maze::Maze;
use crate::player::{PlayerPosition, PlayerSnapshot, TeleportType};
use crate::strategy::astar::{manhattan_distance, AStarNavigator};
use crate::strategy::{Move, Strategy, StrategyContext};

pub struct Trapeater {
    navigator: AStarNavigator,
    /// All traps currently in the maze.
    traps: HashSet<Bait>,
    own_player_id: Option<i32>,
}

impl Trapeater {
    pub fn new() -> Self {
        Trapeater {
            navigator: AStarNavigator::new(),
            traps: HashSet::new(),
            own_player_id: None,
        }
    }

    fn select_target(&mut self, own_player: &PlayerSnapshot) {
        let mut best: Option<(i32, Bait)> = None;
        for &trap in &self.traps {
            let distance = manhattan_distance(own_player.x, trap.x, own_player.y, trap.y);
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, trap));
            }
        }
        self.navigator.set_target(best.map(|(_, trap)| trap));
    }
}

impl Default for Trapeater {
    fn default() -> Self {
        Trapeater::new()
    }
}

impl EventListener for Trapeater {
    fn on_maze_received(&mut self, width: usize, height: usize, lines: &[String]) {
        match Maze::new(width, height, lines) {
            Ok(maze) => self.navigator.set_maze(maze),
            Err(err) => error!("Received an unusable maze: {err:#}"),
        }
    }

    fn on_own_player_login(&mut self, player: &PlayerSnapshot) {
        self.own_player_id = Some(player.id);
    }

    fn on_bait_appeared(&mut self, bait: Bait) {
        if bait.kind == BaitType::Trap {
            self.traps.insert(bait);
        }
    }

    fn on_bait_vanished(&mut self, bait: Bait) {
        self.traps.remove(&bait);
        if self.navigator.target() == Some(bait) {
            self.navigator.set_target(None);
            self.navigator.clear_path();
        }
    }

    fn on_player_teleport(
        &mut self,
        _old_position: PlayerPosition,
        player: &PlayerSnapshot,
        _teleport: Option<TeleportType>,
        _causing_player_id: Option<i32>,
    ) {
        // after a teleport the old plan is worthless
        if Some(player.id) == self.own_player_id {
            self.navigator.set_target(None);
            self.navigator.clear_path();
        }
    }
}

impl Strategy for Trapeater {
    fn next_move(&mut self, ctx: &StrategyContext) -> Move {
        let target_gone = match self.navigator.target() {
            None => true,
            Some(target) => !self.traps.contains(&target),
        };
        if target_gone || !self.navigator.has_path() {
            self.select_target(&ctx.own_player);
            self.navigator.clear_path();
        }
        self.navigator.next_move(ctx.own_player.position())
    }
}
