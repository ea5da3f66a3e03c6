//! Cohort growth and Century-style decomposition engines for standcycle.
//!
//! Two tightly coupled subsystems share a per-site mineral-nitrogen pool:
//!
//! - the **decomposition engine** ([`decomposition::DecompositionEngine`])
//!   moves carbon and nitrogen between litter and soil-organic-matter pools,
//!   enforcing conservation and C:N-driven immobilization/mineralization;
//! - the **cohort growth engine** ([`growth::CohortGrowthEngine`]) computes
//!   each cohort's monthly wood/leaf biomass change from potential
//!   productivity, multiplicative environmental limits, age and growth
//!   mortality, and nitrogen demand, and routes dead biomass into the
//!   decomposition engine's input pools.
//!
//! [`site::Site`] drives one simulated month per site (cohorts strictly in
//! order, then pools), and [`landscape::Landscape`] fans sites out across a
//! rayon pool, synchronizing at month boundaries.
//!
//! # Parameters
//!
//! Each engine has an associated parameter struct in the `parameters`
//! module with documented defaults from the Century lineage.

pub mod cohort;
pub mod decomposition;
pub mod growth;
pub mod landscape;
pub mod modifiers;
pub mod nitrogen;
pub mod parameters;
pub mod pool;
pub mod site;

pub use cohort::Cohort;
pub use decomposition::DecompositionEngine;
pub use growth::{CanopyDisturbance, CohortGrowthEngine, NoDisturbance};
pub use landscape::Landscape;
pub use nitrogen::NitrogenLedger;
pub use parameters::{DecompositionParameters, GrowthParameters, LaiCombination};
pub use pool::{Pool, PoolArena, PoolKind};
pub use site::Site;
