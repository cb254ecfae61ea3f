//! Nations, cities and the laborers who work the land around them.

pub mod city;
pub mod laborer;
pub mod nation;

pub use city::{City, CityId, ProductionOrder};
pub use laborer::{Laborer, LaborerId, generate_laborer_name};
pub use nation::{Nation, NationId};
