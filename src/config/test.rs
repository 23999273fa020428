#[cfg(test)]
mod tests {
    use crate::config::MazeClientConfig;

    #[test]
    fn test_stores_values_unchanged() {
        let config = MazeClientConfig::new("localhost", 12344, "aimless");
        assert_eq!(config.server_address, "localhost");
        assert_eq!(config.server_port, 12344);
        assert_eq!(config.strategy_name, "aimless");
    }

    #[test]
    fn test_display_name_defaults_to_strategy_name() {
        let mut config = MazeClientConfig::new("localhost", 12344, "trapeater");
        assert_eq!(config.display_name(), "trapeater");

        config.display_name = Some("eater_of_traps".to_string());
        assert_eq!(config.display_name(), "eater_of_traps");
    }

    #[test]
    fn test_flags_default_to_true() {
        let config = MazeClientConfig::new("localhost", 12344, "aimless");
        assert!(config.with_flavor);
        assert!(config.retry_on_duplicate_nick);
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let json = r#"
        {
            "server_address": "localhost",
            "server_port": 12344,
            "strategy_name": "aimless"
        }
        "#;
        let config: MazeClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, MazeClientConfig::new("localhost", 12344, "aimless"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut config = MazeClientConfig::new("maze.example.org", 12345, "spectator");
        config.with_flavor = false;
        config.display_name = Some("watcher".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: MazeClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
