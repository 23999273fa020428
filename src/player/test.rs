#[cfg(test)]
mod tests {
    use crate::player::{
        Player, PlayerCollection, PlayerPosition, PositionChangeReason, ViewDirection,
    };

    #[test]
    fn test_turning() {
        assert_eq!(ViewDirection::North.turn_right(), ViewDirection::East);
        assert_eq!(ViewDirection::East.turn_right(), ViewDirection::South);
        assert_eq!(ViewDirection::South.turn_left(), ViewDirection::East);
        assert_eq!(ViewDirection::West.turn_left(), ViewDirection::South);
    }

    #[test]
    fn test_short_name_round_trip() {
        for direction in [
            ViewDirection::North,
            ViewDirection::East,
            ViewDirection::South,
            ViewDirection::West,
        ] {
            assert_eq!(
                ViewDirection::from_short_name(direction.short_name()).unwrap(),
                direction
            );
        }
        assert!(ViewDirection::from_short_name("x").is_err());
    }

    #[test]
    fn test_position_stepping() {
        let position = PlayerPosition::new(3, 3, ViewDirection::North);
        assert_eq!(position.when_step(), PlayerPosition::new(3, 2, ViewDirection::North));

        let east = PlayerPosition::new(3, 3, ViewDirection::East);
        assert_eq!(east.when_step(), PlayerPosition::new(4, 3, ViewDirection::East));
        assert_eq!(east.when_left().direction, ViewDirection::North);
        assert_eq!(east.when_right().direction, ViewDirection::South);
        assert_eq!(east.when_right().x, 3);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_ignored() {
        let players = PlayerCollection::new();
        assert!(players
            .add_player(Player::new(1, "alice", None))
            .await
            .is_some());
        assert!(players
            .add_player(Player::new(1, "impostor", None))
            .await
            .is_none());
        assert_eq!(players.snapshot(1).await.unwrap().nick, "alice");
    }

    #[tokio::test]
    async fn test_change_position_reports_old_and_new() {
        let players = PlayerCollection::new();
        players.add_player(Player::new(1, "alice", None)).await;
        players
            .change_position(1, 2, 3, ViewDirection::East, PositionChangeReason::Appear)
            .await;

        let (old_snapshot, new_snapshot) = players
            .change_position(1, 3, 3, ViewDirection::East, PositionChangeReason::Move)
            .await
            .unwrap();
        assert_eq!(old_snapshot.position(), PlayerPosition::new(2, 3, ViewDirection::East));
        assert_eq!(new_snapshot.position(), PlayerPosition::new(3, 3, ViewDirection::East));

        assert!(players
            .change_position(9, 0, 0, ViewDirection::North, PositionChangeReason::Move)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_first_score_becomes_offset() {
        let players = PlayerCollection::new();
        players.add_player(Player::new(1, "alice", None)).await;

        let (old_score, snapshot) = players.change_score(1, 42).await.unwrap();
        assert_eq!(old_score, 0);
        assert_eq!(snapshot.score, 42);
        assert_eq!(snapshot.score_offset, 42);
        assert_eq!(snapshot.local_score(), 0);

        let (old_score, snapshot) = players.change_score(1, 55).await.unwrap();
        assert_eq!(old_score, 42);
        assert_eq!(snapshot.score_offset, 42);
        assert_eq!(snapshot.local_score(), 13);
    }

    #[tokio::test]
    async fn test_score_reset_detection() {
        let players = PlayerCollection::new();
        players.add_player(Player::new(1, "alice", None)).await;
        players.change_score(1, 10).await;
        players.change_score(1, 23).await;

        // ppm is positive, so a reported 0 is a server-side reset
        let (_, snapshot) = players.change_score(1, 0).await.unwrap();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.score_offset, 0);
    }

    #[tokio::test]
    async fn test_trapeater_scores_survive_reset() {
        let players = PlayerCollection::new();
        players.add_player(Player::new(1, "eater", None)).await;
        players.change_score(1, 10).await;
        players.change_score(1, -118).await;

        // negative ppm: the reported 0 is a real score, not a reset
        let (_, snapshot) = players.change_score(1, 0).await.unwrap();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.score_offset, 10);
    }

    #[tokio::test]
    async fn test_soft_reset_all_scores() {
        let players = PlayerCollection::new();
        players.add_player(Player::new(1, "alice", None)).await;
        players.add_player(Player::new(2, "bob", None)).await;
        players.change_score(1, 10).await;
        players.change_score(1, 30).await;
        players.change_score(2, 5).await;
        players.change_score(2, 18).await;

        players.soft_reset_all_scores().await;
        assert_eq!(players.snapshot(1).await.unwrap().local_score(), 0);
        assert_eq!(players.snapshot(2).await.unwrap().local_score(), 0);
        assert_eq!(players.snapshot(1).await.unwrap().score, 30);
    }

    #[tokio::test]
    async fn test_remove_player() {
        let players = PlayerCollection::new();
        players.add_player(Player::new(1, "alice", None)).await;
        let removed = players.remove_player(1).await.unwrap();
        assert_eq!(removed.nick, "alice");
        assert!(players.remove_player(1).await.is_none());
        assert!(players.snapshots().await.is_empty());
    }
}
