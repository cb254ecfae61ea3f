use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::map::terrain::Terrain;
use crate::map::tile::Tile;

/// One hexagonal position of the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub hex: Hex,
    pub terrain: Terrain,
    pub tile: Tile,
}

/// Finite rectangle of flat-topped hexes.
///
/// Cells are laid out in odd-q offset rows and addressed by axial coordinates.
/// Storage is row-major, which is also the deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl HexGrid {
    pub fn new(width: u32, height: u32, mut terrain: impl FnMut(u32, u32) -> Terrain) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                cells.push(Cell {
                    hex: offset_to_hex(col, row),
                    terrain: terrain(col, row),
                    tile: Tile::default(),
                });
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn uniform(width: u32, height: u32, terrain: Terrain) -> Self {
        Self::new(width, height, |_, _| terrain)
    }

    /// Rebuilds a grid from stored cells, checking that every cell sits where
    /// the layout expects it.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self, GameError> {
        if cells.len() != (width * height) as usize {
            return Err(GameError::Snapshot(format!(
                "expected {} cells for a {width}x{height} grid, found {}",
                width * height,
                cells.len()
            )));
        }
        for (index, cell) in cells.iter().enumerate() {
            let index = index as u32;
            let expected = offset_to_hex(index % width, index / width);
            if cell.hex != expected {
                return Err(GameError::Snapshot(format!(
                    "cell {index} is {:?}, expected {expected:?}",
                    cell.hex
                )));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Axial coordinate of an offset (column, row) position
    pub fn hex_at(&self, col: u32, row: u32) -> Option<Hex> {
        (col < self.width && row < self.height).then(|| offset_to_hex(col, row))
    }

    fn index_of(&self, hex: Hex) -> Option<usize> {
        let col = hex.x;
        let row = hex.y + (hex.x - (hex.x & 1)) / 2;
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.index_of(hex).is_some()
    }

    pub fn get(&self, hex: Hex) -> Option<&Cell> {
        self.index_of(hex).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, hex: Hex) -> Option<&mut Cell> {
        self.index_of(hex).map(move |index| &mut self.cells[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        self.cells.iter().map(|cell| cell.hex)
    }

    /// Integer hex distance; independent of the grid bounds
    pub fn distance(&self, a: Hex, b: Hex) -> u32 {
        a.distance_to(b) as u32
    }

    /// In-bounds cells adjacent to `hex`
    pub fn neighbors(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        hex.all_neighbors()
            .into_iter()
            .filter(|neighbor| self.contains(*neighbor))
    }

    /// In-bounds cells at exactly `radius` from `center`
    pub fn ring(&self, center: Hex, radius: u32) -> Vec<Hex> {
        if radius == 0 {
            return if self.contains(center) {
                vec![center]
            } else {
                Vec::new()
            };
        }
        center
            .ring(radius)
            .filter(|hex| self.contains(*hex))
            .collect()
    }

    /// In-bounds cells within `radius` of `center`: the center first, then
    /// each ring outwards
    pub fn spiral(&self, center: Hex, radius: u32) -> Vec<Hex> {
        (0..=radius)
            .flat_map(|r| self.ring(center, r))
            .collect()
    }
}

fn offset_to_hex(col: u32, row: u32) -> Hex {
    let q = col as i32;
    let r = row as i32 - (q - (q & 1)) / 2;
    Hex::new(q, r)
}
