//! The defending ship's static geometry, built from an ASCII layout.
//!
//! ```text
//! #  rail (solid)     .  open deck     C  cannon     B  item barrel
//! P  player spawn     p  crew spawn
//! ```

use thiserror::Error;

use crate::geometry::{Rect, Vec2};
use crate::render::{Camera, Sprite, Z_MAP};

/// Sprite-sheet pixels to world units.
pub const DRAW_SCALE: f32 = 2.5;
pub const TILE_PX: f32 = 16.0;
pub const TILE_SIZE: f32 = TILE_PX * DRAW_SCALE;

/// Everything the simulation happens in. Fired-up objects leaving through the
/// top have reached the enemy ship.
pub const PLAYFIELD: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

pub const SHIP_ORIGIN: Vec2 = Vec2::new(40.0, 380.0);

pub const STANDARD_LAYOUT: &str = "\
##############################
#..C...C...C...C...C...C....B#
#............................#
#..p........P..........p.....#
#............................#
#B.....p..............p.....B#
#............................#
##############################";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Rail,
    Deck,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShipMapError {
    #[error("ship layout is empty")]
    Empty,
    #[error("row {row} is {actual} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile {ch:?} at column {col}, row {row}")]
    UnknownTile { ch: char, col: usize, row: usize },
    #[error("layout has no player spawn (`P`)")]
    NoPlayerSpawn,
}

#[derive(Clone, Debug)]
pub struct ShipMap {
    origin: Vec2,
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
    colliders: Vec<Rect>,
    pub player_spawn: (u32, u32),
    pub crew_spawns: Vec<(u32, u32)>,
    pub cannon_tiles: Vec<(u32, u32)>,
    pub barrel_tiles: Vec<(u32, u32)>,
}

impl ShipMap {
    pub fn standard() -> Result<Self, ShipMapError> {
        Self::parse(STANDARD_LAYOUT, SHIP_ORIGIN)
    }

    pub fn parse(layout: &str, origin: Vec2) -> Result<Self, ShipMapError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(ShipMapError::Empty);
        };
        let width = first.chars().count();

        let mut map = ShipMap {
            origin,
            width: width as u32,
            height: rows.len() as u32,
            tiles: Vec::with_capacity(width * rows.len()),
            colliders: Vec::new(),
            player_spawn: (0, 0),
            crew_spawns: Vec::new(),
            cannon_tiles: Vec::new(),
            barrel_tiles: Vec::new(),
        };
        let mut player_spawn = None;

        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(ShipMapError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let at = (col as u32, row as u32);
                let kind = match ch {
                    '#' => TileKind::Rail,
                    '.' => TileKind::Deck,
                    'C' => {
                        map.cannon_tiles.push(at);
                        TileKind::Deck
                    }
                    'B' => {
                        map.barrel_tiles.push(at);
                        TileKind::Deck
                    }
                    'P' => {
                        player_spawn = Some(at);
                        TileKind::Deck
                    }
                    'p' => {
                        map.crew_spawns.push(at);
                        TileKind::Deck
                    }
                    _ => return Err(ShipMapError::UnknownTile { ch, col, row }),
                };
                if kind == TileKind::Rail {
                    map.colliders.push(map.tile_rect(at.0, at.1));
                }
                map.tiles.push(kind);
            }
        }

        map.player_spawn = player_spawn.ok_or(ShipMapError::NoPlayerSpawn)?;
        Ok(map)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileKind> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize).copied()
    }

    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        Rect::new(
            self.origin.x + x as f32 * TILE_SIZE,
            self.origin.y + y as f32 * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        )
    }

    /// World position of a tile's centre; defined outside the grid too.
    pub fn tile_center(&self, x: u32, y: u32) -> Vec2 {
        self.tile_rect(x, y).center()
    }

    pub fn colliders(&self) -> &[Rect] {
        &self.colliders
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }

    /// Open deck inside the rails.
    pub fn deck_bounds(&self) -> Rect {
        let outer = self.bounds();
        Rect::new(
            outer.x + TILE_SIZE,
            outer.y + TILE_SIZE,
            (outer.w - 2.0 * TILE_SIZE).max(0.0),
            (outer.h - 2.0 * TILE_SIZE).max(0.0),
        )
    }

    pub fn update(&mut self, _dt: f32) {}

    pub fn draw(&self, cam: &mut Camera) {
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(kind) = self.tile_at(x, y) {
                    cam.blit(Sprite::Tile(kind), self.tile_center(x, y), Z_MAP);
                }
            }
        }
    }
}
