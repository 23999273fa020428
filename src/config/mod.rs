/// This module contains the [`MazeClientConfig`] struct.
mod test;

use serde::{Deserialize, Serialize};

/// Connection settings for a [`MazeClient`](crate::client::MazeClient).
///
/// The configuration is built once and handed to the client constructor; the
/// client never mutates it. The three mandatory fields are the server address,
/// the server port and the name of the strategy to play with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeClientConfig {
    /// The server address.
    pub server_address: String,
    /// The server port.
    pub server_port: u16,
    /// The name of the strategy, also used as the default nickname.
    pub strategy_name: String,
    /// Should the strategy's flavor text be sent to the server?
    #[serde(default = "default_true")]
    pub with_flavor: bool,
    /// The nickname to display. Defaults to [`strategy_name`](Self::strategy_name).
    #[serde(default)]
    pub display_name: Option<String>,
    /// Retry the login with a numeric nick suffix when the server reports a
    /// duplicate nickname.
    #[serde(default = "default_true")]
    pub retry_on_duplicate_nick: bool,
}

fn default_true() -> bool {
    true
}

impl MazeClientConfig {
    /// Creates a configuration with the default flags set.
    pub fn new(
        server_address: impl Into<String>,
        server_port: u16,
        strategy_name: impl Into<String>,
    ) -> Self {
        MazeClientConfig {
            server_address: server_address.into(),
            server_port,
            strategy_name: strategy_name.into(),
            with_flavor: true,
            display_name: None,
            retry_on_duplicate_nick: true,
        }
    }

    /// The nickname presented to the server.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.strategy_name)
    }
}
