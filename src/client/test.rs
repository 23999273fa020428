#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
    use tokio::time::{sleep, timeout};

    use crate::client::{ConnectionStatus, MazeClient, Session};
    use crate::config::MazeClientConfig;
    use crate::connection::channel::{ChannelLineSink, ChannelLineStream};

    fn scripted_config(strategy: &str) -> MazeClientConfig {
        let mut config = MazeClientConfig::new("localhost", 12344, strategy);
        config.with_flavor = false;
        config
    }

    /// Starts a client on the in-process transport and hands back the
    /// server's side of the wire.
    async fn start_scripted(
        config: MazeClientConfig,
    ) -> (
        MazeClient,
        Session,
        UnboundedSender<String>,
        UnboundedReceiver<String>,
    ) {
        let (server_tx, client_rx) = mpsc::unbounded_channel();
        let (client_tx, server_rx) = mpsc::unbounded_channel();
        let client = MazeClient::new(config);
        let session = client
            .start_with(
                ChannelLineStream::new(client_rx),
                ChannelLineSink::new(client_tx),
            )
            .await
            .expect("client should start");
        (client, session, server_tx, server_rx)
    }

    async fn expect_line(server_rx: &mut UnboundedReceiver<String>) -> String {
        timeout(Duration::from_secs(2), server_rx.recv())
            .await
            .expect("timed out waiting for a client line")
            .expect("client closed the connection")
    }

    async fn wait_for_status(client: &MazeClient, expected: ConnectionStatus) {
        timeout(Duration::from_secs(2), async {
            while client.status().await != expected {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("client never reached status {expected:?}"));
    }

    fn send(server_tx: &UnboundedSender<String>, line: &str) {
        server_tx.send(line.to_string()).expect("client went away");
    }

    #[tokio::test]
    async fn test_handshake_and_login() {
        let (client, _session, server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;
        assert_eq!(client.status().await, ConnectionStatus::Connected);

        send(&server_tx, "MSRV;1");
        assert_eq!(expect_line(&mut server_rx).await, "HELO;spectator");

        send(&server_tx, "WELC;7");
        assert_eq!(expect_line(&mut server_rx).await, "MAZ?");
        wait_for_status(&client, ConnectionStatus::LoggedIn).await;
        assert_eq!(client.id().await, 7);

        send(&server_tx, "MAZE;3;1");
        send(&server_tx, "...");
        send(&server_tx, "INFO;0");
        wait_for_status(&client, ConnectionStatus::Spectating).await;
        assert!(client.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_hello_carries_the_flavor_text() {
        let mut config = scripted_config("aimless");
        config.with_flavor = true;
        let (_client, _session, server_tx, mut server_rx) = start_scripted(config).await;

        send(&server_tx, "MSRV;1");
        assert_eq!(
            expect_line(&mut server_rx).await,
            "HELO;aimless;I run against walls!"
        );
    }

    #[tokio::test]
    async fn test_version_mismatch_stalls_the_login() {
        let (client, _session, server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;
        send(&server_tx, "MSRV;2");
        // no HELO may be sent
        sleep(Duration::from_millis(50)).await;
        assert!(server_rx.try_recv().is_err());
        assert_eq!(client.status().await, ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_duplicate_nick_retries_with_suffix() {
        let (_client, _session, server_tx, mut server_rx) =
            start_scripted(scripted_config("aimless")).await;

        send(&server_tx, "MSRV;1");
        assert_eq!(expect_line(&mut server_rx).await, "HELO;aimless");
        send(&server_tx, "INFO;452");
        assert_eq!(expect_line(&mut server_rx).await, "HELO;aimless1");
        send(&server_tx, "INFO;452");
        assert_eq!(expect_line(&mut server_rx).await, "HELO;aimless2");
    }

    #[tokio::test]
    async fn test_ready_without_own_player_leaves_the_game() {
        let (client, session, server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;

        send(&server_tx, "MSRV;1");
        expect_line(&mut server_rx).await;
        send(&server_tx, "WELC;7");
        expect_line(&mut server_rx).await;
        send(&server_tx, "MAZE;3;1");
        send(&server_tx, "...");
        send(&server_tx, "RDY.");

        // never joined: the client gives up and says goodbye
        assert_eq!(expect_line(&mut server_rx).await, "BYE!");
        send(&server_tx, "QUIT");
        drop(server_tx);
        session.wait().await.expect("session should end cleanly");
        assert_eq!(client.status().await, ConnectionStatus::Dead);
    }

    #[tokio::test]
    async fn test_playing_flow_sends_a_move() {
        let (client, _session, server_tx, mut server_rx) =
            start_scripted(scripted_config("aimless")).await;

        send(&server_tx, "MSRV;1");
        expect_line(&mut server_rx).await;
        send(&server_tx, "WELC;3");
        expect_line(&mut server_rx).await;
        send(&server_tx, "MAZE;3;3");
        send(&server_tx, "###");
        send(&server_tx, "#.#");
        send(&server_tx, "###");
        send(&server_tx, "JOIN;3;aimless");
        send(&server_tx, "PPOS;3;1;1;e;app");
        send(&server_tx, "RDY.");

        wait_for_status(&client, ConnectionStatus::Playing).await;
        let line = expect_line(&mut server_rx).await;
        assert!(
            line == "STEP" || line == "TURN;l" || line == "TURN;r",
            "unexpected move line: {line}"
        );
        assert_eq!(client.own_player().await.unwrap().x, 1);
    }

    #[tokio::test]
    async fn test_state_mirroring_and_speed_change() {
        let (client, _session, server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;

        send(&server_tx, "MSRV;1");
        expect_line(&mut server_rx).await;
        send(&server_tx, "WELC;7");
        expect_line(&mut server_rx).await;
        send(&server_tx, "MAZE;3;1");
        send(&server_tx, "...");
        send(&server_tx, "JOIN;2;alice");
        send(&server_tx, "PPOS;2;1;0;n;app");
        send(&server_tx, "BPOS;2;0;gem;app");
        send(&server_tx, "PSCO;2;314");
        send(&server_tx, "INFO;300;100");
        wait_for_status(&client, ConnectionStatus::Spectating).await;

        timeout(Duration::from_secs(2), async {
            while client.game_speed().await != 100 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("speed change never arrived");

        let players = client.players().await;
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].nick, "alice");
        assert_eq!(players[0].score, 314);
        assert_eq!(client.bait_at(2, 0).await.unwrap().kind, crate::bait::BaitType::Gem);

        send(&server_tx, "BPOS;2;0;gem;van");
        timeout(Duration::from_secs(2), async {
            while client.bait_at(2, 0).await.is_some() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("bait never vanished");
    }

    #[tokio::test]
    async fn test_broadcast_is_sanitized() {
        let (client, _session, _server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;
        client.broadcast("hi; all");
        assert_eq!(
            expect_line(&mut server_rx).await,
            "INFO;201;hi\u{FFFD} all"
        );
        client.whisper("psst", 4);
        assert_eq!(expect_line(&mut server_rx).await, "INFO;202;psst;4");
    }

    #[tokio::test]
    async fn test_logout_sends_bye_and_session_completes() {
        let (client, session, server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;

        send(&server_tx, "MSRV;1");
        expect_line(&mut server_rx).await;
        send(&server_tx, "WELC;7");
        expect_line(&mut server_rx).await;
        wait_for_status(&client, ConnectionStatus::LoggedIn).await;

        client.logout().await;
        assert_eq!(expect_line(&mut server_rx).await, "BYE!");
        send(&server_tx, "QUIT");
        drop(server_tx);

        session.wait().await.expect("session should end cleanly");
        assert_eq!(client.status().await, ConnectionStatus::Dead);
    }

    #[tokio::test]
    async fn test_logout_before_login_kills_the_session() {
        let (client, session, _server_tx, _server_rx) =
            start_scripted(scripted_config("spectator")).await;
        client.logout().await;
        session.wait().await.expect("session should end cleanly");
        assert_eq!(client.status().await, ConnectionStatus::Dead);
    }

    #[tokio::test]
    async fn test_server_term_ends_the_session() {
        let (client, session, server_tx, mut server_rx) =
            start_scripted(scripted_config("spectator")).await;
        send(&server_tx, "MSRV;1");
        expect_line(&mut server_rx).await;
        send(&server_tx, "TERM");
        session.wait().await.expect("session should end cleanly");
        assert_eq!(client.status().await, ConnectionStatus::Dead);
    }

    #[tokio::test]
    async fn test_unknown_strategy_fails_the_start() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let client = MazeClient::new(scripted_config("does-not-exist"));
        let result = client
            .start_with(ChannelLineStream::new(rx), ChannelLineSink::new(tx2))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let (client, _session, _server_tx, _server_rx) =
            start_scripted(scripted_config("spectator")).await;
        let (_tx, rx) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        assert!(client
            .start_with(ChannelLineStream::new(rx), ChannelLineSink::new(tx2))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_connect_error_leaves_the_client_dead() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = MazeClient::new(MazeClientConfig::new("127.0.0.1", port, "aimless"));
        assert!(client.start().await.is_err());
        assert_eq!(client.status().await, ConnectionStatus::Dead);
    }

    #[tokio::test]
    async fn test_full_session_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();

            write_half.write_all(b"MSRV;1\n").await.unwrap();
            write_half.flush().await.unwrap();
            assert_eq!(lines.next_line().await.unwrap().unwrap(), "HELO;spectator");

            write_half.write_all(b"WELC;9\n").await.unwrap();
            write_half.flush().await.unwrap();
            assert_eq!(lines.next_line().await.unwrap().unwrap(), "MAZ?");

            write_half
                .write_all(b"MAZE;3;1\n...\nJOIN;9;spectator\nINFO;0\n")
                .await
                .unwrap();
            write_half.flush().await.unwrap();

            assert_eq!(lines.next_line().await.unwrap().unwrap(), "BYE!");
            write_half.write_all(b"QUIT\n").await.unwrap();
            write_half.flush().await.unwrap();
        });

        let mut config = MazeClientConfig::new("127.0.0.1", port, "spectator");
        config.with_flavor = false;
        let client = MazeClient::new(config);
        let session = client.start().await.expect("client should connect");

        wait_for_status(&client, ConnectionStatus::Spectating).await;
        client.logout().await;

        session.wait().await.expect("session should end cleanly");
        server.await.expect("scripted server should finish");
        assert_eq!(client.status().await, ConnectionStatus::Dead);
    }
}
