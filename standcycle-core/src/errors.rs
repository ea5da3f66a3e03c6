use crate::ecoregion::EcoregionId;
use crate::species::SpeciesId;
use thiserror::Error;

/// Error type for invalid operations and configurations.
///
/// Only fatal conditions are represented here. Numeric degeneracies
/// (NaN/Inf terms) are clamped and logged by the engines rather than
/// propagated, and mineral-nitrogen exhaustion is expected behaviour.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{0}")]
    Error(String),
    #[error("invariant violated at site {site}: {message}")]
    InvariantViolation { site: u32, message: String },
    #[error("no species registered with id {0:?}")]
    UnknownSpecies(SpeciesId),
    #[error("no ecoregion registered with id {0:?}")]
    UnknownEcoregion(EcoregionId),
    #[error("invalid parameter table: {0}")]
    InvalidConfiguration(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, ModelError>`.
pub type ModelResult<T> = Result<T, ModelError>;
