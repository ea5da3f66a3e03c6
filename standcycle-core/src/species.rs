//! Static per-species functional-type parameters.
//!
//! Species parameters are immutable once loaded and are passed explicitly
//! into engine calls; nothing here is mutated during a run. Defaults
//! describe a generic mid-tolerant temperate conifer and are primarily
//! useful for tests.

use crate::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Small integer key for a species, assigned in table order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SpeciesId(pub u16);

/// Foliage retention strategy, which selects the leaf-fall functional form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoliageHabit {
    /// Foliage turns over continuously, spread across the leaf longevity.
    Evergreen,
    /// Foliage is dropped over a two-month window starting at `drop_month`
    /// (1..=12).
    Deciduous { drop_month: u8 },
}

/// Functional-type parameters for one species.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesParameters {
    /// Display name, used only in messages.
    pub name: String,

    /// Maximum cohort age.
    /// unit: years
    /// default: 300
    pub longevity: f64,

    /// Shape of the exponential age-mortality curve. Larger values
    /// concentrate mortality near the longevity limit.
    /// unit: dimensionless
    /// default: 10.0
    pub mortality_shape: f64,

    /// Constant monthly fraction of wood biomass lost to growth mortality.
    /// unit: 1/month
    /// default: 0.00055
    pub monthly_wood_mortality: f64,

    /// Fraction of ANPP allocated to foliage (remainder to wood).
    /// unit: dimensionless, [0,1]
    /// default: 0.25
    pub leaf_fraction: f64,

    /// Foliage lifespan; controls evergreen leaf turnover.
    /// unit: years
    /// default: 3.0
    pub leaf_longevity: f64,

    /// Evergreen turnover vs. deciduous drop-window leaf fall.
    pub foliage: FoliageHabit,

    /// Intrinsic decay rate of dead wood from this species.
    /// unit: 1/year
    /// default: 0.06
    pub wood_decay_rate: f64,

    /// Lignin fraction of leaf litter.
    /// unit: dimensionless, [0,1]
    /// default: 0.2
    pub leaf_lignin: f64,

    /// Lignin fraction of dead wood and coarse roots.
    /// unit: dimensionless, [0,1]
    /// default: 0.25
    pub wood_lignin: f64,

    /// Lignin fraction of fine-root litter.
    /// unit: dimensionless, [0,1]
    /// default: 0.22
    pub fine_root_lignin: f64,

    /// C:N mass ratio of live foliage.
    /// default: 45.0
    pub leaf_cn: f64,

    /// C:N mass ratio of live wood.
    /// default: 250.0
    pub wood_cn: f64,

    /// C:N mass ratio of fine roots.
    /// default: 50.0
    pub fine_root_cn: f64,

    /// C:N mass ratio of coarse roots.
    /// default: 200.0
    pub coarse_root_cn: f64,

    /// Fraction of foliage nitrogen resorbed before leaf fall, banked for
    /// reuse during the spring resorption window.
    /// unit: dimensionless, [0,1]
    /// default: 0.5
    pub n_resorption_fraction: f64,

    /// Maximum annual aboveground net primary productivity.
    /// unit: g biomass / m2 / year
    /// default: 900.0
    pub max_anpp: f64,

    /// Aboveground biomass ceiling used by the self-thinning limit and by
    /// establishment seeding.
    /// unit: g biomass / m2
    /// default: 30000.0
    pub max_biomass: f64,

    /// Saturating leaf-area ceiling shared by the foliage and wood LAI
    /// curves.
    /// unit: dimensionless
    /// default: 10.0
    pub max_lai: f64,

    /// Exponential coefficient of the foliage-mass LAI curve.
    /// unit: m2 / g C
    /// default: 0.004
    pub leaf_lai_coeff: f64,

    /// Half-saturation wood carbon of the Michaelis-Menten wood LAI curve.
    /// unit: g C / m2
    /// default: 1500.0
    pub wood_lai_half_sat: f64,

    /// Intercept, water-content slope and saturation point of the linear
    /// water limit (Century `pprpts`).
    /// default: [0.0, 1.0, 0.8]
    pub pprpts: [f64; 3],

    /// Soil temperature at which production peaks (Parton-Innis curve).
    /// unit: degrees C
    /// default: 20.0
    pub optimum_temperature: f64,

    /// Soil temperature above which production is zero.
    /// unit: degrees C
    /// default: 38.0
    pub maximum_temperature: f64,

    /// Left-side shape exponent of the Parton-Innis curve.
    /// default: 1.0
    pub temperature_shape: f64,

    /// Right-side skew exponent of the Parton-Innis curve.
    /// default: 2.5
    pub temperature_skew: f64,

    /// Symbiotic nitrogen fixers are never nitrogen limited.
    /// default: false
    pub n_fixer: bool,
}

impl Default for SpeciesParameters {
    fn default() -> Self {
        Self {
            name: "generic conifer".to_string(),
            longevity: 300.0,
            mortality_shape: 10.0,
            monthly_wood_mortality: 0.00055,
            leaf_fraction: 0.25,
            leaf_longevity: 3.0,
            foliage: FoliageHabit::Evergreen,
            wood_decay_rate: 0.06,
            leaf_lignin: 0.2,
            wood_lignin: 0.25,
            fine_root_lignin: 0.22,
            leaf_cn: 45.0,
            wood_cn: 250.0,
            fine_root_cn: 50.0,
            coarse_root_cn: 200.0,
            n_resorption_fraction: 0.5,
            max_anpp: 900.0,
            max_biomass: 30000.0,
            max_lai: 10.0,
            leaf_lai_coeff: 0.004,
            wood_lai_half_sat: 1500.0,
            pprpts: [0.0, 1.0, 0.8],
            optimum_temperature: 20.0,
            maximum_temperature: 38.0,
            temperature_shape: 1.0,
            temperature_skew: 2.5,
            n_fixer: false,
        }
    }
}

/// Immutable lookup table of species parameters, indexed by [`SpeciesId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesTable {
    entries: Vec<SpeciesParameters>,
}

impl SpeciesTable {
    pub fn new(entries: Vec<SpeciesParameters>) -> Self {
        Self { entries }
    }

    /// Look up a species. A miss is a fatal configuration error.
    pub fn get(&self, id: SpeciesId) -> ModelResult<&SpeciesParameters> {
        self.entries
            .get(id.0 as usize)
            .ok_or(ModelError::UnknownSpecies(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesParameters)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, p)| (SpeciesId(i as u16), p))
    }
}
