
use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Result};
use tokio::sync::Mutex;

/// Which bait types exist, how they are called and what they are worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaitType {
    Food,
    Coffee,
    Gem,
    Trap,
}

impl BaitType {
    pub fn bait_name(self) -> &'static str {
        match self {
            BaitType::Food => "food",
            BaitType::Coffee => "coffee",
            BaitType::Gem => "gem",
            BaitType::Trap => "trap",
        }
    }

    pub fn score(self) -> i32 {
        match self {
            BaitType::Food => 13,
            BaitType::Coffee => 42,
            BaitType::Gem => 314,
            BaitType::Trap => -128,
        }
    }

    pub fn by_name(name: &str) -> Result<BaitType> {
        match name {
            "food" => Ok(BaitType::Food),
            "coffee" => Ok(BaitType::Coffee),
            "gem" => Ok(BaitType::Gem),
            "trap" => Ok(BaitType::Trap),
            _ => bail!("incorrect bait name: {name}"),
        }
    }

    /// Looks a bait type up by the absolute value of a score difference.
    pub fn by_score(score: i32) -> Option<BaitType> {
        match score.abs() {
            13 => Some(BaitType::Food),
            42 => Some(BaitType::Coffee),
            314 => Some(BaitType::Gem),
            128 => Some(BaitType::Trap),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        self.bait_name()
            .chars()
            .next()
            .unwrap_or('?')
            .to_ascii_uppercase()
    }
}

impl fmt::Display for BaitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bait_name())
    }
}

/// Indicates whether a bait appears or vanishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaitChange {
    /// A new bait was generated and therefore appears now.
    Generated,
    /// An existing bait was collected and therefore vanishes now.
    Collected,
}

impl BaitChange {
    pub fn short_name(self) -> &'static str {
        match self {
            BaitChange::Generated => "app",
            BaitChange::Collected => "van",
        }
    }

    pub fn by_name(name: &str) -> Result<BaitChange> {
        match name {
            "app" => Ok(BaitChange::Generated),
            "van" => Ok(BaitChange::Collected),
            _ => bail!("incorrect bait change name: {name}"),
        }
    }
}

/// A bait of a specific [`BaitType`] at a unique position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bait {
    pub kind: BaitType,
    pub x: i32,
    pub y: i32,
}

impl Bait {
    pub fn new(kind: BaitType, x: i32, y: i32) -> Self {
        Bait { kind, x, y }
    }

    pub fn score(self) -> i32 {
        self.kind.score()
    }

    /// Packs the coordinates into the storage key. The x value lands in the
    /// high bits, the y value in the low bits, signs taken as-is.
    fn key(x: i32, y: i32) -> i64 {
        ((x as i64) << 32) | (y as i64 & 0xFFFF_FFFF)
    }
}

/// A concurrency-safe collection of [`Bait`]s, keyed by position.
#[derive(Default)]
pub struct BaitCollection {
    baits: Mutex<HashMap<i64, Bait>>,
}

impl BaitCollection {
    pub fn new() -> Self {
        BaitCollection::default()
    }

    /// Adds a bait. If the position is already occupied, nothing happens.
    /// Returns true if something was actually added.
    pub(crate) async fn add_bait(&self, bait: Bait) -> bool {
        let mut baits = self.baits.lock().await;
        let key = Bait::key(bait.x, bait.y);
        if baits.contains_key(&key) {
            return false;
        }
        baits.insert(key, bait);
        true
    }

    /// Removes a bait. Returns true if something was actually removed.
    pub(crate) async fn remove_bait(&self, bait: Bait) -> bool {
        let mut baits = self.baits.lock().await;
        baits.remove(&Bait::key(bait.x, bait.y)).is_some()
    }

    /// The bait at the given coordinates, if there is one.
    pub async fn bait_at(&self, x: i32, y: i32) -> Option<Bait> {
        let baits = self.baits.lock().await;
        baits.get(&Bait::key(x, y)).copied()
    }

    /// A copy of all baits currently in the collection.
    pub async fn elements(&self) -> Vec<Bait> {
        let baits = self.baits.lock().await;
        baits.values().copied().collect()
    }
}
