//! Game constants and configuration values
//!
//! This module centralizes all magic numbers and configuration values used throughout the game.

// ============================================================================
// MAP CONSTANTS
// ============================================================================

/// Default map width in columns (flat-topped hexes, odd-q offset layout)
pub const DEFAULT_MAP_WIDTH: u32 = 15;

/// Default map height in rows
pub const DEFAULT_MAP_HEIGHT: u32 = 6;

/// Seed used by the headless runner when none is supplied
pub const TERRAIN_SEED: u32 = 12345;

// ============================================================================
// FOOD & LOGISTICS
// ============================================================================

/// Food each laborer eats at the end of a round
pub const FOOD_CONSUMPTION_PER_LABORER: i32 = 2;

/// Food goods older than this many rounds spoil and are removed from the board
pub const FOOD_GOODS_MAX_AGE: u32 = 5;

// ============================================================================
// TERRITORY
// ============================================================================

/// Claim strength a new city puts on its own cell and the adjacent ring
pub const CITY_CORE_CLAIM: u32 = 100;

/// Radius of the core claim around a new city
pub const CITY_CORE_RADIUS: u32 = 1;

/// Claim strength a new city puts on water cells of its outer ring
pub const CITY_WATER_CLAIM: u32 = 50;

/// Radius of the outer ring in which a city claims water
pub const CITY_WATER_RADIUS: u32 = 2;

/// Claim strength a faction gains on a cell it improves
pub const IMPROVEMENT_CLAIM: u32 = 10;

/// Claim change applied to every claimant at the start of a round
pub const ROUND_CLAIM_STEP: u32 = 1;

// ============================================================================
// VISUAL CONSTANTS - Colors (0xRRGGBB, consumed by rendering collaborators)
// ============================================================================

/// Palette for the first factions and nations, in index order
pub const PARTY_COLORS: [u32; 3] = [0x32cd32, 0xff0000, 0x0000ff];

/// Color used once the palette runs out
pub const FALLBACK_PARTY_COLOR: u32 = 0xaaaaaa;

/// Returns the palette color for a faction or nation index
pub fn party_color(index: usize) -> u32 {
    PARTY_COLORS
        .get(index)
        .copied()
        .unwrap_or(FALLBACK_PARTY_COLOR)
}
