use bevy::log::debug;
use hexx::Hex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::economy::city::CityId;
use crate::error::GameError;
use crate::state::GameState;
use crate::units::UnitKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaborerId(pub u32);

/// A worker tied to one cell, fed from that cell's food stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Laborer {
    pub id: LaborerId,
    pub name: String,
    pub kind: UnitKind,
    pub hex: Hex,
    pub city: Option<CityId>,
}

const PRAENOMINA: [&str; 8] = [
    "Gaius", "Lucius", "Marcus", "Quintus", "Titus", "Publius", "Aulus", "Sextus",
];

const CELTIC_NAMES: [&str; 8] = [
    "Bran", "Cai", "Elen", "Rhiannon", "Taran", "Mabon", "Nia", "Owain",
];

const COGNOMINA: [&str; 8] = [
    "Agricola", "Felix", "Silvanus", "Varus", "Florus", "Crispus", "Severus", "Vitalis",
];

const EPITHETS: [&str; 6] = [
    "the Smith",
    "of Londinium",
    "the Younger",
    "the Red",
    "from Camulodunum",
    "the Hunter",
];

/// Romano-British name: a Roman or Celtic first name, a cognomen, and
/// sometimes an epithet
pub fn generate_laborer_name<R: Rng>(rng: &mut R) -> String {
    let first = if rng.random_bool(0.5) {
        PRAENOMINA[rng.random_range(0..PRAENOMINA.len())]
    } else {
        CELTIC_NAMES[rng.random_range(0..CELTIC_NAMES.len())]
    };
    let last = COGNOMINA[rng.random_range(0..COGNOMINA.len())];

    if rng.random_bool(0.3) {
        let epithet = EPITHETS[rng.random_range(0..EPITHETS.len())];
        format!("{first} {last} {epithet}")
    } else {
        format!("{first} {last}")
    }
}

impl GameState {
    /// Settles a laborer on a cell (and optionally in a city's workforce).
    /// Names are drawn from the world seed, so replays name laborers alike.
    pub fn add_laborer(
        &mut self,
        hex: Hex,
        kind: UnitKind,
        city: Option<CityId>,
    ) -> Result<LaborerId, GameError> {
        if !self.grid.contains(hex) {
            return Err(GameError::InvalidCell(hex));
        }
        if let Some(city) = city
            && self.city(city).is_none()
        {
            return Err(GameError::UnknownCity(city));
        }

        let id = LaborerId(self.laborers.len() as u32);
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(u64::from(id.0)));
        let name = generate_laborer_name(&mut rng);
        debug!("Laborer {name} settles at {:?}", hex);

        if let Some(cell) = self.grid.get_mut(hex) {
            cell.tile.laborers.insert(id);
        }
        if let Some(city) = city.and_then(|city| self.cities.get_mut(city.0 as usize)) {
            city.laborers.insert(id);
        }
        self.laborers.push(Laborer {
            id,
            name,
            kind,
            hex,
            city,
        });
        Ok(id)
    }
}
