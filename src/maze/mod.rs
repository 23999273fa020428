/// This module contains the [`Maze`] map representation.
mod test;

use anyhow::{bail, Result};

/// The value of a single maze field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Outside fields. Can also occur "inside" for artistic reasons and in
    /// non-rectangular mazes. Not walkable.
    Outside,
    /// Walls inside the maze. Not walkable.
    Wall,
    /// Pathways inside the maze. Walkable.
    Path,
    /// Produced when the server sends gibberish. Should not occur; treated as
    /// not walkable.
    Unknown,
}

impl FieldValue {
    pub fn from_char(c: char) -> FieldValue {
        match c {
            '-' => FieldValue::Outside,
            '#' => FieldValue::Wall,
            '.' => FieldValue::Path,
            _ => FieldValue::Unknown,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            FieldValue::Outside => '-',
            FieldValue::Wall => '#',
            FieldValue::Path => '.',
            FieldValue::Unknown => '?',
        }
    }

    pub fn is_walkable(self) -> bool {
        self == FieldValue::Path
    }
}

/// The maze map as received from the server.
#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    height: usize,
    fields: Vec<FieldValue>,
}

impl Maze {
    /// Builds a maze from the raw lines of the maze command. Validates the
    /// dimensions against the actual line data.
    pub fn new(width: usize, height: usize, lines: &[String]) -> Result<Maze> {
        if width < 1 || height < 1 {
            bail!("maze dimensions too small");
        }
        if lines.len() != height {
            bail!("received {} maze lines but expected {height}", lines.len());
        }
        let mut fields = Vec::with_capacity(width * height);
        for line in lines {
            if line.chars().count() != width {
                bail!(
                    "maze line should have length {width} but has length {}",
                    line.chars().count()
                );
            }
            fields.extend(line.chars().map(FieldValue::from_char));
        }
        Ok(Maze {
            width,
            height,
            fields,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The field value at the given position. Out-of-bounds positions read as
    /// [`FieldValue::Outside`].
    pub fn get(&self, x: usize, y: usize) -> FieldValue {
        if x >= self.width || y >= self.height {
            return FieldValue::Outside;
        }
        self.fields[y * self.width + x]
    }

    /// Whether the field at the (possibly negative) coordinates can be
    /// stepped on.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.get(x as usize, y as usize).is_walkable()
    }
}
