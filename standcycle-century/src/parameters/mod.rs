//! Engine parameters.
//!
//! Each engine has an associated parameter struct with sensible defaults
//! from the Century soil-organic-matter lineage. Species- and
//! ecoregion-specific values live in the `standcycle-core` tables; these
//! structs hold the knobs shared by every species at a site.

mod decomposition;
mod growth;

pub use decomposition::DecompositionParameters;
pub use growth::{GrowthParameters, LaiCombination};
