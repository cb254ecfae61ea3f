use serde::{Deserialize, Serialize};

use crate::constants::ROUND_CLAIM_STEP;

/// One party's claim on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim<K> {
    pub party: K,
    pub strength: u32,
}

/// Territorial claims of one kind of party (nations or factions) on a cell.
///
/// The holder is the party whose claim owns the cell's territorial effects:
/// - the current holder keeps the cell while its strength ties the top claim;
/// - otherwise the strongest claimant takes over, equal strengths going to the
///   lowest party id;
/// - a party with strength 0 never holds the cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTable<K> {
    /// Sorted by party
    claims: Vec<Claim<K>>,
    holder: Option<K>,
}

impl<K> Default for ClaimTable<K> {
    fn default() -> Self {
        Self {
            claims: Vec::new(),
            holder: None,
        }
    }
}

impl<K: Copy + Ord> ClaimTable<K> {
    pub fn holder(&self) -> Option<K> {
        self.holder
    }

    pub fn strength(&self, party: K) -> u32 {
        self.claims
            .iter()
            .find(|claim| claim.party == party)
            .map_or(0, |claim| claim.strength)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim<K>> {
        self.claims.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.iter().all(|claim| claim.strength == 0)
    }

    /// Adds `delta` to a party's claim, never going below zero
    pub fn claim(&mut self, party: K, delta: i64) {
        match self.claims.binary_search_by(|claim| claim.party.cmp(&party)) {
            Ok(index) => {
                let claim = &mut self.claims[index];
                claim.strength = apply_delta(claim.strength, delta);
            }
            Err(index) => {
                let strength = apply_delta(0, delta);
                if strength > 0 {
                    self.claims.insert(index, Claim { party, strength });
                }
            }
        }
        self.refresh_holder();
    }

    /// Round-start drift: the holder's claim grows by one step, every other
    /// positive claim shrinks by one step.
    pub fn settle_round(&mut self) {
        let holder = self.holder;
        let step = i64::from(ROUND_CLAIM_STEP);
        for claim in &mut self.claims {
            if Some(claim.party) == holder {
                claim.strength = apply_delta(claim.strength, step);
            } else if claim.strength > 0 {
                claim.strength = apply_delta(claim.strength, -step);
            }
        }
        self.refresh_holder();
    }

    fn refresh_holder(&mut self) {
        let top = self
            .claims
            .iter()
            .map(|claim| claim.strength)
            .max()
            .unwrap_or(0);
        if top == 0 {
            self.holder = None;
            return;
        }
        if let Some(holder) = self.holder
            && self.strength(holder) == top
        {
            return;
        }
        // Claims are sorted, so the first match is the lowest party id
        self.holder = self
            .claims
            .iter()
            .find(|claim| claim.strength == top)
            .map(|claim| claim.party);
    }
}

fn apply_delta(strength: u32, delta: i64) -> u32 {
    (i64::from(strength) + delta).clamp(0, i64::from(u32::MAX)) as u32
}
