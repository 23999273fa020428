//! Headless launcher: connects a bot to a local maze server, lets it play
//! for a few seconds and logs it out again.

use std::time::Duration;

use anyhow::Result;
use env_logger::Env;
use log::info;

use mazegame_client::client::headless::{
    ChatDisplay, ErrorDisplay, PlayerConnectionLogger, PlayerScoreLogger,
};
use mazegame_client::strategy;
use mazegame_client::{MazeClient, MazeClientConfig};

const LOGOUT_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Known strategies: {:?}", strategy::strategy_names());

    let config = MazeClientConfig::new("localhost", 12344, "aimless");
    let client = MazeClient::new(config);
    client.add_listener(Box::new(ChatDisplay));
    client.add_listener(Box::new(ErrorDisplay));
    client.add_listener(Box::new(PlayerConnectionLogger));
    client.add_listener(Box::new(PlayerScoreLogger));

    client.fire_client_info("The game is about to start!");
    let session = client.start().await?;
    tokio::time::sleep(LOGOUT_DELAY).await;
    client.logout().await;
    session.wait().await?;
    Ok(())
}
