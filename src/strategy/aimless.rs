//! The dummy bot. The design is based on the original dummy bot: it mostly
//! walks straight ahead and only turns when it feels like it or after
//! crashing into a wall.

use rand::Rng;

use crate::events::EventListener;
use crate::protocol::InfoCode;
use crate::strategy::{Move, Strategy, StrategyContext};

/// Random-walk strategy. Can also serve as a fallback inside other bots via
/// [`next_dummy_move`](Aimless::next_dummy_move); if used that way, the
/// wrapping strategy has to forward wall-crash errors, or the crash reaction
/// will not work.
pub struct Aimless {
    next_move: Option<Move>,
    delay: u64,
}

impl Aimless {
    pub fn new() -> Self {
        Aimless {
            next_move: None,
            delay: 0,
        }
    }

    /// The next dummy move: 5% turn left, 5% turn right, otherwise a step.
    /// A pending wall-crash reaction wins over the dice.
    pub fn next_dummy_move(&mut self) -> Move {
        if let Some(queued) = self.next_move.take() {
            return queued;
        }
        let roll: f64 = rand::rng().random();
        match roll {
            r if r < 0.05 => Move::TurnLeft,
            r if r < 0.1 => Move::TurnRight,
            _ => Move::Step,
        }
    }
}

impl Default for Aimless {
    fn default() -> Self {
        Aimless::new()
    }
}

impl EventListener for Aimless {
    fn on_server_error(&mut self, code: InfoCode) {
        if code == InfoCode::WallCrash {
            self.next_move = Some(if rand::rng().random::<f64>() < 0.5 {
                Move::TurnLeft
            } else {
                Move::TurnRight
            });
        }
    }
}

impl Strategy for Aimless {
    fn next_move(&mut self, ctx: &StrategyContext) -> Move {
        self.delay = rand::rng().random_range(0..ctx.game_speed.max(1)) as u64;
        self.next_dummy_move()
    }

    fn bot_delay(&self) -> u64 {
        self.delay
    }
}
