#[cfg(test)]
mod tests {
    use crate::maze::{FieldValue, Maze};

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_field_value_mapping() {
        assert_eq!(FieldValue::from_char('-'), FieldValue::Outside);
        assert_eq!(FieldValue::from_char('#'), FieldValue::Wall);
        assert_eq!(FieldValue::from_char('.'), FieldValue::Path);
        assert_eq!(FieldValue::from_char('?'), FieldValue::Unknown);
        assert_eq!(FieldValue::from_char('x'), FieldValue::Unknown);
    }

    #[test]
    fn test_only_paths_are_walkable() {
        assert!(FieldValue::Path.is_walkable());
        assert!(!FieldValue::Wall.is_walkable());
        assert!(!FieldValue::Outside.is_walkable());
        assert!(!FieldValue::Unknown.is_walkable());
    }

    #[test]
    fn test_maze_lookup() {
        let maze = Maze::new(3, 2, &lines(&["#.#", "-.-"])).unwrap();
        assert_eq!(maze.width(), 3);
        assert_eq!(maze.height(), 2);
        assert_eq!(maze.get(0, 0), FieldValue::Wall);
        assert_eq!(maze.get(1, 0), FieldValue::Path);
        assert_eq!(maze.get(0, 1), FieldValue::Outside);
        assert_eq!(maze.get(1, 1), FieldValue::Path);
    }

    #[test]
    fn test_out_of_bounds_reads_as_outside() {
        let maze = Maze::new(2, 2, &lines(&["..", ".."])).unwrap();
        assert_eq!(maze.get(2, 0), FieldValue::Outside);
        assert_eq!(maze.get(0, 7), FieldValue::Outside);
        assert!(!maze.is_walkable(-1, 0));
        assert!(!maze.is_walkable(0, -1));
        assert!(maze.is_walkable(1, 1));
    }

    #[test]
    fn test_dimension_validation() {
        assert!(Maze::new(0, 1, &lines(&[""])).is_err());
        assert!(Maze::new(3, 2, &lines(&["###"])).is_err());
        assert!(Maze::new(3, 1, &lines(&["####"])).is_err());
    }
}
