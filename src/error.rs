use hexx::Hex;
use thiserror::Error;

use crate::economy::city::CityId;
use crate::economy::nation::NationId;
use crate::faction::FactionId;
use crate::units::EntityRef;

/// Errors surfaced by the simulation core.
///
/// Construction and input errors are returned before any state is touched, so a
/// failed call never leaves a half-registered object behind. Recoverable
/// conditions (no route, stale action context) are not errors: they are logged
/// and reported through `false` or an empty path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("cell {0:?} is not part of the grid")]
    InvalidCell(Hex),
    #[error("unknown nation {0:?}")]
    UnknownNation(NationId),
    #[error("unknown faction {0:?}")]
    UnknownFaction(FactionId),
    #[error("unknown city {0:?}")]
    UnknownCity(CityId),
    #[error("unknown mobile entity {0:?}")]
    UnknownEntity(EntityRef),
    #[error("cell {0:?} already holds a city")]
    CityAlreadyPresent(Hex),
    #[error("turn index {index} is out of range for {factions} factions")]
    InvalidTurnIndex { index: usize, factions: usize },
    #[error("turns cannot be taken while the round is being settled")]
    BetweenRounds,
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("unknown unit kind `{0}`")]
    UnknownUnitKind(String),
    #[error("unknown goods kind `{0}`")]
    UnknownGoodsKind(String),
    #[error("unknown validator `{0}`")]
    UnknownValidator(String),
    #[error("unknown executor `{0}`")]
    UnknownExecutor(String),
    #[error("unknown menu `{0}`")]
    UnknownMenu(String),
    #[error("currency must be a non-negative amount, got {0}")]
    NegativeCurrency(i64),
    #[error("invalid world configuration: {0}")]
    Config(String),
    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Config(err.to_string())
    }
}
