use crate::planner::Planner;

use anyhow::{anyhow, bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

// MovingAI grid map. `x` is the column, `y` the row.
#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>,
}

impl Map {
    pub fn from_file(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open map {path}"))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("failed to read map {path}"))?;
        Self::parse(&lines).with_context(|| format!("malformed map {path}"))
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        Self::parse(&lines)
    }

    fn parse(lines: &[String]) -> Result<Self> {
        let mut lines = lines.iter();
        let _type = lines.next().ok_or_else(|| anyhow!("missing type line"))?;
        let height = Self::header_value(lines.next(), "height")?;
        let width = Self::header_value(lines.next(), "width")?;
        let _map = lines.next().ok_or_else(|| anyhow!("missing map line"))?;

        let mut grid = Vec::with_capacity(height);
        for (row, line) in lines.take(height).enumerate() {
            let tiles_row: Vec<Tile> = line
                .chars()
                .map(|ch| Tile {
                    passable: matches!(ch, '.' | 'G' | 'S'),
                })
                .collect();
            if tiles_row.len() != width {
                bail!("row {row} has {} tiles, expected {width}", tiles_row.len());
            }
            grid.push(tiles_row);
        }
        if grid.len() != height {
            bail!("found {} rows, expected {height}", grid.len());
        }

        Ok(Map {
            height,
            width,
            grid,
        })
    }

    fn header_value(line: Option<&String>, name: &str) -> Result<usize> {
        let line = line.ok_or_else(|| anyhow!("missing {name} line"))?;
        line.split_whitespace()
            .last()
            .ok_or_else(|| anyhow!("empty {name} line"))?
            .parse::<usize>()
            .with_context(|| format!("invalid {name}: {line}"))
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.grid[y as usize][x as usize].is_passable()
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.grid.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, tile)| !tile.is_passable())
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }

    // Ring of cells just outside the map.
    fn frame(&self) -> Vec<(i32, i32)> {
        let (w, h) = (self.width as i32, self.height as i32);
        let mut frame = Vec::with_capacity(2 * (self.width + self.height) + 4);
        for x in -1..=w {
            frame.push((x, -1));
            frame.push((x, h));
        }
        for y in 0..h {
            frame.push((-1, y));
            frame.push((w, y));
        }
        frame
    }

    /// Marks every blocked tile, and the frame around the map, as an obstacle.
    /// Returns the number of cells marked.
    pub fn apply_to(&self, planner: &mut Planner) -> usize {
        let mut marked = 0;
        for (x, y) in self.blocked_cells().chain(self.frame()) {
            planner.update_cell(x, y, -1.0);
            marked += 1;
        }
        marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/test/test.map").unwrap();

        assert_eq!(map.height, 6);
        assert_eq!(map.width, 8);

        assert!(map.is_passable(0, 0));
        assert!(!map.is_passable(2, 1));
        assert!(!map.is_passable(1, 3));
        assert!(!map.is_passable(5, 4));
        assert!(!map.is_passable(8, 0));
        assert!(!map.is_passable(-1, 2));
        assert_eq!(map.blocked_cells().count(), 8);
    }

    #[test]
    fn test_malformed_map() {
        assert!(Map::from_text("type octile\nheight 2\nwidth 3\nmap\n...\n..\n").is_err());
        assert!(Map::from_text("type octile\nheight x\nwidth 3\nmap\n").is_err());
        assert!(Map::from_text("type octile\nheight 3\nwidth 1\nmap\n.\n.\n").is_err());
        assert!(Map::from_file("map_file/test/missing.map").is_err());
    }

    #[test]
    fn test_plan_on_map() {
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let mut planner = Planner::new(3, 3, 7, 3);
        let marked = map.apply_to(&mut planner);
        assert_eq!(marked, 8 + 2 * (8 + 6) + 4);

        assert!(planner.replan());
        let path = planner.path();
        assert_eq!(path.first().map(|v| (v.x, v.y)), Some((3, 3)));
        assert_eq!(path.last().map(|v| (v.x, v.y)), Some((7, 3)));
        for v in path {
            assert!(map.is_passable(v.x, v.y), "({}, {}) is blocked", v.x, v.y);
        }
    }
}
