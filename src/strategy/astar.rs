//! Single-target A* pathfinding over the maze.
//!
//! Search states are full player positions, so turning costs a move just like
//! stepping does; the produced paths are optimal in moves, not in tiles.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::bait::Bait;
use crate::maze::Maze;
use crate::player::PlayerPosition;
use crate::strategy::Move;

pub fn manhattan_distance(x1: i32, x2: i32, y1: i32, y2: i32) -> i32 {
    (x1 - x2).abs() + (y1 - y2).abs()
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct SearchState {
    position: PlayerPosition,
    cost_so_far: i32,
    estimated: i32,
}

impl SearchState {
    fn total(&self) -> i32 {
        self.cost_so_far + self.estimated
    }
}

impl Ord for SearchState {
    // reversed, so the BinaryHeap pops the cheapest state first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total()
            .cmp(&self.total())
            .then_with(|| other.cost_so_far.cmp(&self.cost_so_far))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Chases one target bait at a time across the maze.
///
/// The navigator keeps the computed move path and re-plans only when the path
/// ran out or the target was dropped. Feed it the maze once it arrives and a
/// target whenever one is selected.
#[derive(Default)]
pub struct AStarNavigator {
    maze: Option<Maze>,
    target: Option<Bait>,
    /// Positions towards the target, current position last.
    path: Vec<PlayerPosition>,
}

impl AStarNavigator {
    pub fn new() -> Self {
        AStarNavigator::default()
    }

    pub fn set_maze(&mut self, maze: Maze) {
        self.maze = Some(maze);
    }

    pub fn has_maze(&self) -> bool {
        self.maze.is_some()
    }

    pub fn target(&self) -> Option<Bait> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Bait>) {
        self.target = target;
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// The next move towards the current target, planning a path first when
    /// necessary. Without a target or a reachable path there is nothing to
    /// do.
    pub fn next_move(&mut self, from: PlayerPosition) -> Move {
        let target = match self.target {
            Some(target) => target,
            None => return Move::DoNothing,
        };
        if !self.path.is_empty() {
            return self.extract_next_move();
        }
        self.search(from, target)
    }

    fn search(&mut self, from: PlayerPosition, target: Bait) -> Move {
        let maze = match &self.maze {
            Some(maze) => maze,
            None => return Move::DoNothing,
        };
        let mut marker: HashSet<PlayerPosition> = HashSet::new();
        let mut queue: BinaryHeap<SearchState> = BinaryHeap::new();
        let mut costs: HashMap<PlayerPosition, i32> = HashMap::new();
        let mut parent: HashMap<PlayerPosition, PlayerPosition> = HashMap::new();

        costs.insert(from, 0);
        queue.push(SearchState {
            position: from,
            cost_so_far: 0,
            estimated: manhattan_distance(from.x, target.x, from.y, target.y),
        });
        let mut target_position = None;
        while let Some(state) = queue.pop() {
            let position = state.position;
            if !marker.insert(position) {
                continue;
            }
            if target.x == position.x && target.y == position.y {
                target_position = Some(position);
                break;
            }
            let follow_ups = [position.when_right(), position.when_left(), position.when_step()];
            for next in follow_ups {
                if !maze.is_walkable(next.x, next.y) {
                    continue;
                }
                let new_cost = state.cost_so_far + 1;
                if costs.get(&next).copied().unwrap_or(i32::MAX) > new_cost {
                    parent.insert(next, position);
                    costs.insert(next, new_cost);
                    queue.push(SearchState {
                        position: next,
                        cost_so_far: new_cost,
                        estimated: manhattan_distance(next.x, target.x, next.y, target.y),
                    });
                }
            }
        }

        let target_position = match target_position {
            Some(position) => position,
            None => return Move::DoNothing,
        };
        let mut current = Some(target_position);
        while let Some(position) = current {
            self.path.push(position);
            current = parent.get(&position).copied();
        }
        self.extract_next_move()
    }

    fn extract_next_move(&mut self) -> Move {
        let current = match self.path.pop() {
            Some(position) => position,
            None => return Move::DoNothing,
        };
        match self.path.last() {
            Some(&next) => move_between(current, next),
            None => {
                // arrived
                self.target = None;
                Move::DoNothing
            }
        }
    }
}

fn move_between(source: PlayerPosition, target: PlayerPosition) -> Move {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    if source.direction == target.direction && (dx != 0 || dy != 0) {
        return Move::Step;
    }
    if target.direction == source.direction.turn_right() {
        return Move::TurnRight;
    }
    if target.direction == source.direction.turn_left() {
        return Move::TurnLeft;
    }
    Move::DoNothing
}
