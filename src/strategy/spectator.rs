use crate::events::EventListener;
use crate::strategy::{Move, Strategy, StrategyContext};

/// A spectator does ... nothing.
pub struct Spectator;

impl EventListener for Spectator {}

impl Strategy for Spectator {
    fn next_move(&mut self, _ctx: &StrategyContext) -> Move {
        Move::DoNothing
    }
}
