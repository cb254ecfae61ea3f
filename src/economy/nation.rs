use serde::{Deserialize, Serialize};

use crate::constants::party_color;

/// Index of a nation in the world's nation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NationId(pub u32);

/// Coarse grouping that owns cities and scores territorial claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    /// 0xRRGGBB
    pub color: u32,
}

impl Nation {
    pub fn new(id: NationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: party_color(id.0 as usize),
        }
    }
}
