use noise::{NoiseFn, Perlin};

use crate::map::grid::HexGrid;
use crate::map::terrain::Terrain;

/// Seeded, deterministic terrain assignment for worlds that are not loaded
/// from a hand-authored map
pub struct TerrainGenerator {
    elevation_noise: Perlin,
    moisture_noise: Perlin,
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            elevation_noise: Perlin::new(seed),
            moisture_noise: Perlin::new(seed.wrapping_add(1000)),
        }
    }

    /// Terrain for an offset position; noise sampled on the normalized map
    pub fn generate_terrain(&self, col: u32, row: u32, width: u32, height: u32) -> Terrain {
        let norm_x = col as f64 / width.max(1) as f64;
        let norm_y = row as f64 / height.max(1) as f64;

        let elevation_scale = 3.0;
        let moisture_scale = 5.0;

        // Noise is in -1..1, normalize to 0..1
        let elevation = (self
            .elevation_noise
            .get([norm_x * elevation_scale, norm_y * elevation_scale])
            + 1.0)
            / 2.0;
        let moisture = (self
            .moisture_noise
            .get([norm_x * moisture_scale, norm_y * moisture_scale])
            + 1.0)
            / 2.0;

        classify_terrain(elevation, moisture)
    }

    pub fn generate_grid(&self, width: u32, height: u32) -> HexGrid {
        HexGrid::new(width, height, |col, row| {
            self.generate_terrain(col, row, width, height)
        })
    }
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

fn classify_terrain(elevation: f64, moisture: f64) -> Terrain {
    if elevation < 0.25 {
        return Terrain::Ocean;
    }
    if elevation < 0.3 {
        return if moisture > 0.5 {
            Terrain::Lake
        } else {
            Terrain::Marsh
        };
    }
    if elevation > 0.75 {
        return Terrain::Mountains;
    }
    if elevation > 0.65 {
        return Terrain::Hills;
    }

    if moisture > 0.62 {
        Terrain::Forest
    } else if moisture > 0.4 {
        Terrain::Grassland
    } else {
        Terrain::Plains
    }
}
