//! Pool-flux decomposition engine.
//!
//! Advances litter, dead-wood and SOM pools one month. Each decomposing
//! pool sends a respiration fraction of its carbon flow to CO2 and the rest
//! downstream (structural lignin to SOM2, everything else to the
//! location-matched SOM1; SOM1 to SOM2; SOM2 to SOM3; SOM3 to CO2).
//! Nitrogen follows carbon, immobilizing mineral N when the source material
//! is poorer than the destination's target C:N ratio and mineralizing to
//! the site stock otherwise.
//!
//! No operation here errors for in-range inputs: numeric degeneracies are
//! clamped to zero with a warning, and nitrogen shortfalls are handled by
//! the gate ([`crate::pool::Pool::decompose_possible`]) and by clamped
//! immobilization.

use crate::modifiers;
use crate::nitrogen::NitrogenLedger;
use crate::parameters::DecompositionParameters;
use crate::pool::{Pool, PoolArena, PoolKind};
use log::warn;
use standcycle_core::{EcoregionParameters, MonthlyClimate, MONTH_FRACTION};

/// Grams of dry biomass per gram of carbon, used when converting a pool's
/// nitrogen stock to a per-biomass nitrogen content.
const BIOMASS_PER_CARBON: f64 = 2.5;

/// Site-month decomposition drivers, computed once per site per month.
#[derive(Debug, Clone, Copy)]
pub struct DecayEnvironment {
    /// Combined temperature-moisture rate modifier in [0,1].
    pub decay_factor: f64,
    /// Anaerobic-conditions multiplier, applied to soil-located pools.
    pub anaerobic_effect: f64,
    /// Sand fraction of the soil, for the soil SOM1 respiration split.
    pub percent_sand: f64,
}

impl DecayEnvironment {
    pub fn from_climate(climate: &MonthlyClimate, ecoregion: &EcoregionParameters) -> Self {
        Self {
            decay_factor: modifiers::decay_factor(climate),
            anaerobic_effect: modifiers::anaerobic_effect(climate, ecoregion),
            percent_sand: ecoregion.percent_sand,
        }
    }
}

/// Monthly site-level flux totals written by the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecayTotals {
    /// Carbon respired to CO2 this month.
    pub heterotrophic_respiration: f64,
}

/// Moves carbon and nitrogen through the litter/SOM cascade.
#[derive(Debug, Clone)]
pub struct DecompositionEngine {
    parameters: DecompositionParameters,
}

impl DecompositionEngine {
    pub fn new() -> Self {
        Self::from_parameters(DecompositionParameters::default())
    }

    pub fn from_parameters(parameters: DecompositionParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &DecompositionParameters {
        &self.parameters
    }

    /// Advance one pool one month.
    pub fn advance(
        &self,
        kind: PoolKind,
        arena: &mut PoolArena,
        ledger: &mut NitrogenLedger,
        env: &DecayEnvironment,
        totals: &mut DecayTotals,
    ) {
        match kind {
            PoolKind::SurfaceStructural
            | PoolKind::SoilStructural
            | PoolKind::DeadWood
            | PoolKind::CoarseRoots => self.decompose_structural(kind, arena, ledger, env, totals),
            PoolKind::SurfaceMetabolic | PoolKind::SoilMetabolic => {
                self.decompose_metabolic(kind, arena, ledger, env, totals)
            }
            PoolKind::Som1Surface | PoolKind::Som1Soil | PoolKind::Som2 => {
                self.cascade_som(kind, arena, ledger, env, totals)
            }
            PoolKind::Som3 => self.decompose_passive(arena, ledger, env, totals),
        }
    }

    /// Destination C:N target for surface SOM1, a regression on the source
    /// material's nitrogen content: nitrogen-poor material pushes the
    /// target toward the maximum ratio, nitrogen-rich toward the minimum.
    pub fn aboveground_decomposition_ratio(&self, source: &Pool) -> f64 {
        let p = &self.parameters;
        if source.carbon < 1e-9 {
            return p.surface_som1_cn_min;
        }
        let n_content = source.nitrogen / (source.carbon * BIOMASS_PER_CARBON);
        let frac = (n_content / p.surface_som1_n_saturation).clamp(0.0, 1.0);
        p.surface_som1_cn_max + (p.surface_som1_cn_min - p.surface_som1_cn_max) * frac
    }

    /// Destination C:N target for a soil pool, interpolated between the
    /// nitrogen-starved maximum and the saturated minimum as mineral N
    /// approaches the saturation threshold.
    pub fn belowground_decomposition_ratio(
        &self,
        mineral_n: f64,
        cn_max: f64,
        cn_min: f64,
    ) -> f64 {
        let frac = (mineral_n.max(0.0) / self.parameters.mineral_n_saturation).clamp(0.0, 1.0);
        cn_max + (cn_min - cn_max) * frac
    }

    /// C:N target the destination pool imposes on incoming material.
    fn target_ratio(&self, dst: PoolKind, source: &Pool, ledger: &NitrogenLedger) -> f64 {
        let p = &self.parameters;
        match dst {
            PoolKind::Som1Surface => self.aboveground_decomposition_ratio(source),
            PoolKind::Som1Soil => self.belowground_decomposition_ratio(
                ledger.mineral_n(),
                p.soil_som1_cn_max,
                p.soil_som1_cn_min,
            ),
            PoolKind::Som2 => self.belowground_decomposition_ratio(
                ledger.mineral_n(),
                p.som2_cn_range[0],
                p.som2_cn_range[1],
            ),
            PoolKind::Som3 => self.belowground_decomposition_ratio(
                ledger.mineral_n(),
                p.som3_cn_range[0],
                p.som3_cn_range[1],
            ),
            other => unreachable!("{other:?} is not a decomposition destination"),
        }
    }

    /// Monthly carbon flow out of a pool given its decay attributes, with
    /// NaN/Inf terms clamped to zero (recoverable degeneracy, not an
    /// error). Structural-family pools expose at most
    /// `structural_carbon_cap` of their stock per month; all other pools
    /// decompose proportionally to the full stock.
    fn monthly_flow(&self, kind: PoolKind, pool: &Pool, env: &DecayEnvironment, shielded: bool) -> f64 {
        let decomposable = if kind.is_structural() {
            pool.carbon.min(self.parameters.structural_carbon_cap)
        } else {
            pool.carbon
        };
        let anaerobic = if kind.is_soil() {
            env.anaerobic_effect
        } else {
            1.0
        };
        let shielding = if shielded {
            (-self.parameters.lignin_decay_effect * pool.lignin_fraction).exp()
        } else {
            1.0
        };
        let flow = decomposable
            * env.decay_factor
            * pool.decay_rate
            * anaerobic
            * shielding
            * MONTH_FRACTION
            * self.parameters.month_adjust;
        if !flow.is_finite() {
            warn!("non-finite decomposition flow from {kind:?} clamped to zero");
            return 0.0;
        }
        flow.clamp(0.0, pool.carbon)
    }

    /// Structural, dead-wood and coarse-root decomposition: the lignin
    /// share of the flow goes to SOM2, the remainder to the
    /// location-matched SOM1, each share losing its respiration fraction
    /// first.
    pub fn decompose_structural(
        &self,
        kind: PoolKind,
        arena: &mut PoolArena,
        ledger: &mut NitrogenLedger,
        env: &DecayEnvironment,
        totals: &mut DecayTotals,
    ) {
        let som1 = kind.som1_destination();
        let som1_ratio = self.target_ratio(som1, &arena[kind], ledger);
        if !arena[kind].decompose_possible(som1_ratio, ledger.mineral_n()) {
            return;
        }

        let total_c = arena[kind].carbon;
        if total_c < 1e-9 {
            return;
        }
        let lignin = arena[kind].lignin_fraction;
        let flow = self.monthly_flow(kind, &arena[kind], env, true);

        // Lignin-proportional share to the slow pool.
        let to_som2 = flow * lignin;
        let co2_som2 = to_som2 * self.parameters.lignin_to_som2_co2;
        self.respiration(arena, kind, co2_som2, ledger, totals);
        let som2_ratio = self.target_ratio(PoolKind::Som2, &arena[kind], ledger);
        let moved = arena.transfer_carbon(kind, PoolKind::Som2, to_som2 - co2_som2);
        self.transfer_nitrogen(arena, kind, PoolKind::Som2, moved, total_c, som2_ratio, ledger);

        // Remainder to the active pool.
        let to_som1 = flow - to_som2;
        let co2_fraction = if kind.is_soil() {
            self.parameters.structural_soil_co2
        } else {
            self.parameters.structural_surface_co2
        };
        let co2_som1 = to_som1 * co2_fraction;
        self.respiration(arena, kind, co2_som1, ledger, totals);
        let moved = arena.transfer_carbon(kind, som1, to_som1 - co2_som1);
        self.transfer_nitrogen(arena, kind, som1, moved, total_c, som1_ratio, ledger);
    }

    /// Metabolic litter decomposition, entirely routed to the
    /// location-matched SOM1 after respiration loss.
    pub fn decompose_metabolic(
        &self,
        kind: PoolKind,
        arena: &mut PoolArena,
        ledger: &mut NitrogenLedger,
        env: &DecayEnvironment,
        totals: &mut DecayTotals,
    ) {
        let som1 = kind.som1_destination();
        let ratio = self.target_ratio(som1, &arena[kind], ledger);
        if !arena[kind].decompose_possible(ratio, ledger.mineral_n()) {
            return;
        }

        let total_c = arena[kind].carbon;
        if total_c < 1e-9 {
            return;
        }
        let flow = self.monthly_flow(kind, &arena[kind], env, false);
        let co2 = flow * self.parameters.metabolic_co2;
        self.respiration(arena, kind, co2, ledger, totals);
        let moved = arena.transfer_carbon(kind, som1, flow - co2);
        self.transfer_nitrogen(arena, kind, som1, moved, total_c, ratio, ledger);
    }

    /// SOM1 -> SOM2 and SOM2 -> SOM3 cascade steps.
    fn cascade_som(
        &self,
        kind: PoolKind,
        arena: &mut PoolArena,
        ledger: &mut NitrogenLedger,
        env: &DecayEnvironment,
        totals: &mut DecayTotals,
    ) {
        let (dst, co2_fraction) = match kind {
            PoolKind::Som1Surface => (PoolKind::Som2, self.parameters.som1_surface_co2),
            PoolKind::Som1Soil => (
                PoolKind::Som2,
                self.parameters.som1_soil_co2_intercept
                    + self.parameters.som1_soil_co2_sand_slope * env.percent_sand,
            ),
            PoolKind::Som2 => (PoolKind::Som3, self.parameters.som2_co2),
            other => unreachable!("{other:?} is not a SOM cascade source"),
        };
        let ratio = self.target_ratio(dst, &arena[kind], ledger);
        if !arena[kind].decompose_possible(ratio, ledger.mineral_n()) {
            return;
        }

        let total_c = arena[kind].carbon;
        if total_c < 1e-9 {
            return;
        }
        let flow = self.monthly_flow(kind, &arena[kind], env, false);
        let co2 = flow * co2_fraction;
        self.respiration(arena, kind, co2, ledger, totals);
        let moved = arena.transfer_carbon(kind, dst, flow - co2);
        self.transfer_nitrogen(arena, kind, dst, moved, total_c, ratio, ledger);
    }

    /// Passive SOM turns over straight to CO2, mineralizing its nitrogen.
    fn decompose_passive(
        &self,
        arena: &mut PoolArena,
        ledger: &mut NitrogenLedger,
        env: &DecayEnvironment,
        totals: &mut DecayTotals,
    ) {
        let flow = self.monthly_flow(PoolKind::Som3, &arena[PoolKind::Som3], env, false);
        self.respiration(arena, PoolKind::Som3, flow, ledger, totals);
    }

    /// Move nitrogen alongside a carbon transfer.
    ///
    /// The nitrogen flow is the source nitrogen scaled by the transfer's
    /// share of the source carbon (`carbon_flow / total_c`). If the moving
    /// material is nitrogen-poor relative to the destination's target
    /// ratio, the shortfall `carbon_flow / ratio - n_flow` is immobilized
    /// from mineral N (clamped at the floor); otherwise the excess over
    /// `carbon_flow / ratio` is mineralized to the site stock.
    pub fn transfer_nitrogen(
        &self,
        arena: &mut PoolArena,
        src: PoolKind,
        dst: PoolKind,
        carbon_flow: f64,
        total_c: f64,
        ratio_cn_destination: f64,
        ledger: &mut NitrogenLedger,
    ) {
        if carbon_flow <= 0.0 || total_c < 1e-9 || ratio_cn_destination <= 0.0 {
            return;
        }
        let source_n = arena[src].nitrogen;
        let mut n_flow = source_n * (carbon_flow / total_c);
        if !n_flow.is_finite() {
            warn!("non-finite nitrogen flow from {src:?} clamped to zero");
            n_flow = 0.0;
        }
        n_flow = n_flow.clamp(0.0, source_n);

        let required = carbon_flow / ratio_cn_destination;
        if n_flow < required {
            // Immobilization: decomposers pull the shortfall from mineral N.
            let immobilized =
                ledger.immobilize(required - n_flow, self.parameters.mineral_n_floor);
            arena[src].nitrogen -= n_flow;
            arena[src].net_mineralization -= immobilized;
            arena[dst].nitrogen += n_flow + immobilized;
        } else {
            // Mineralization: the destination takes only what its target
            // ratio demands; the rest is released to the site stock.
            let released = n_flow - required;
            arena[src].nitrogen -= n_flow;
            arena[dst].nitrogen += required;
            ledger.deposit(released);
            arena[src].net_mineralization += released;
            if released > 0.0 {
                arena[src].gross_mineralization += released;
            }
        }
    }

    /// Respire carbon to CO2, mineralizing a proportional share of the
    /// source pool's nitrogen.
    pub fn respiration(
        &self,
        arena: &mut PoolArena,
        src: PoolKind,
        co2_loss: f64,
        ledger: &mut NitrogenLedger,
        totals: &mut DecayTotals,
    ) {
        if !co2_loss.is_finite() {
            warn!("non-finite respiration from {src:?} clamped to zero");
            return;
        }
        if co2_loss <= 0.0 {
            return;
        }
        let pool = &mut arena[src];
        let co2 = co2_loss.min(pool.carbon);
        let n_flow = match pool.cn_ratio() {
            Some(ratio) => (co2 / ratio).min(pool.nitrogen),
            None => 0.0,
        };
        pool.carbon -= co2;
        pool.nitrogen -= n_flow;
        pool.gross_mineralization += n_flow;
        pool.net_mineralization += n_flow;
        ledger.deposit(n_flow);
        totals.heterotrophic_respiration += co2;
    }
}

impl Default for DecompositionEngine {
    fn default() -> Self {
        Self::new()
    }
}
