//! Headless client library for the maze game.
//!
//! The client connects to a maze server over TCP, speaks the line-oriented
//! maze protocol, mirrors the server's game state (maze map, players, baits)
//! and drives a pluggable bot [`strategy`](crate::strategy) whenever the
//! server asks for the next move. Everything a UI would need is exposed
//! through snapshots and the [`events`](crate::events) listener API.

pub mod bait;
pub mod client;
pub mod config;
pub mod connection;
pub mod events;
pub mod maze;
pub mod player;
pub mod protocol;
pub mod strategy;

pub use client::{ConnectionStatus, MazeClient, Session};
pub use config::MazeClientConfig;
