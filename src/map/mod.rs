// Map-related modules
pub mod claims;
pub mod grid;
pub mod terrain;
pub mod terrain_gen;
pub mod tile;

// Re-exports for convenience
pub use claims::*;
pub use grid::*;
pub use terrain::*;
pub use terrain_gen::*;
pub use tile::*;
