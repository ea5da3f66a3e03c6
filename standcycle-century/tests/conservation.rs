//! Whole-system checks: conservation laws, bounds, and the canonical
//! single-cohort scenarios, exercised through the public site and
//! landscape drivers.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use standcycle_century::growth::CanopyDisturbance;
use standcycle_century::parameters::{DecompositionParameters, GrowthParameters};
use standcycle_century::pool::PoolKind;
use standcycle_century::{
    Cohort, CohortGrowthEngine, DecompositionEngine, Landscape, Site,
};
use standcycle_core::{
    EcoregionId, EcoregionParameters, EcoregionTable, MonthlyClimate, SimulationClock, SpeciesId,
    SpeciesParameters, SpeciesTable,
};
use std::collections::HashMap;

fn engines() -> (CohortGrowthEngine, DecompositionEngine) {
    (
        CohortGrowthEngine::from_parameters(GrowthParameters::default()),
        DecompositionEngine::from_parameters(DecompositionParameters::default()),
    )
}

fn one_species_table() -> SpeciesTable {
    SpeciesTable::new(vec![SpeciesParameters::default()])
}

fn populated_site(decomposition: &DecompositionEngine) -> Site {
    let ecoregion = EcoregionParameters::default();
    let mut site = Site::new(0, EcoregionId(0), &ecoregion, decomposition);
    site.add_cohort(Cohort::new(SpeciesId(0), 400.0, 80.0));
    site.arena_mut()[PoolKind::SurfaceStructural].add_material(120.0, 120.0 / 60.0, 0.25);
    site.arena_mut()[PoolKind::SoilMetabolic].add_material(40.0, 40.0 / 15.0, 0.0);
    site.arena_mut()[PoolKind::Som1Soil].add_material(200.0, 200.0 / 12.0, 0.0);
    site.arena_mut()[PoolKind::Som2].add_material(900.0, 900.0 / 18.0, 0.0);
    site.arena_mut()[PoolKind::Som3].add_material(2000.0, 2000.0 / 7.0, 0.0);
    site
}

fn random_climate(rng: &mut StdRng) -> MonthlyClimate {
    let avg = rng.random_range(-25.0..40.0);
    MonthlyClimate {
        precipitation: rng.random_range(0.0..50.0),
        avg_temperature: avg,
        min_temperature: avg - rng.random_range(0.0..15.0),
        max_temperature: avg + rng.random_range(0.0..15.0),
        pet: rng.random_range(0.0..25.0),
        soil_temperature: rng.random_range(-20.0..40.0),
        available_water: rng.random_range(0.0..30.0),
    }
}

mod carbon_conservation {
    use super::*;

    /// Over one site month, detrital carbon changes only by litter input
    /// and respired loss.
    #[test]
    fn test_pool_carbon_balances_litterfall_against_respiration() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();
        let mut site = populated_site(&decomposition);

        let before = site.arena().total_carbon();
        let totals = *site
            .advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                SimulationClock::new(1, 6),
                &growth,
                &decomposition,
            )
            .unwrap();
        let after = site.arena().total_carbon();

        assert_relative_eq!(
            after - before,
            totals.litterfall_carbon - totals.heterotrophic_respiration,
            epsilon = 1e-9
        );
        assert!(totals.heterotrophic_respiration > 0.0);
    }

    /// Decomposition alone never creates carbon: with no cohorts, every
    /// unit leaving the pools shows up as respiration.
    #[test]
    fn test_bare_soil_carbon_loss_equals_respiration() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();
        let template = populated_site(&decomposition);
        let mut site = Site::new(1, EcoregionId(0), &ecoregion, &decomposition);
        *site.arena_mut() = template.arena().clone();

        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..60 {
            let before = site.arena().total_carbon();
            let totals = *site
                .advance_month(
                    &table,
                    &ecoregion,
                    &MonthlyClimate::default(),
                    clock,
                    &growth,
                    &decomposition,
                )
                .unwrap();
            let after = site.arena().total_carbon();
            assert_relative_eq!(
                before - after,
                totals.heterotrophic_respiration,
                epsilon = 1e-9
            );
            assert!(after <= before + 1e-12);
            clock = clock.next();
        }
    }
}

mod nitrogen_conservation {
    use super::*;

    /// With no plants, nitrogen only shuttles between the pools and the
    /// mineral stock; the closed-system total is invariant.
    #[test]
    fn test_bare_soil_nitrogen_is_closed() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();
        let template = populated_site(&decomposition);
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        *site.arena_mut() = template.arena().clone();

        let before = site.arena().total_nitrogen() + site.ledger().mineral_n();
        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..120 {
            site.advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                clock,
                &growth,
                &decomposition,
            )
            .unwrap();
            clock = clock.next();
        }
        let after = site.arena().total_nitrogen() + site.ledger().mineral_n();
        assert_relative_eq!(before, after, epsilon = 1e-8);
    }

    /// Plant uptake is the only flux that leaves the soil system, and it
    /// is bounded by what the mineral stock held.
    #[test]
    fn test_uptake_never_exceeds_mineral_supply() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters {
            initial_mineral_n: 0.5,
            ..EcoregionParameters::default()
        };
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        site.add_cohort(Cohort::new(SpeciesId(0), 2000.0, 400.0));

        let totals = *site
            .advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                SimulationClock::new(1, 1),
                &growth,
                &decomposition,
            )
            .unwrap();
        assert!(totals.n_uptake <= 0.5 + totals.gross_mineralization + 1e-9);
        assert!(site.ledger().mineral_n() >= 0.0);
    }
}

mod bounds {
    use super::*;

    /// Random extreme drivers for ten years: nothing goes negative and
    /// nothing goes non-finite.
    #[test]
    fn test_state_stays_non_negative_under_random_drivers() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();
        let mut site = populated_site(&decomposition);
        let mut rng = StdRng::seed_from_u64(1902);

        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..120 {
            site.advance_month(
                &table,
                &ecoregion,
                &random_climate(&mut rng),
                clock,
                &growth,
                &decomposition,
            )
            .unwrap();
            for (_, pool) in site.arena().iter() {
                assert!(pool.carbon >= 0.0 && pool.carbon.is_finite());
                assert!(pool.nitrogen >= 0.0 && pool.nitrogen.is_finite());
            }
            assert!(site.ledger().mineral_n() >= 0.0);
            for cohort in site.cohorts() {
                assert!(cohort.wood_biomass >= 0.0);
                assert!(cohort.leaf_biomass >= 0.0);
            }
            clock = clock.next();
        }
    }

    /// The environmental limits are true multipliers in [0, 1] for any
    /// physically plausible driver combination.
    #[test]
    fn test_limiting_factors_bounded_for_random_inputs() {
        use standcycle_century::modifiers;
        use standcycle_century::parameters::LaiCombination;

        let species = SpeciesParameters::default();
        let ecoregion = EcoregionParameters::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let climate = random_climate(&mut rng);
            let leaf_c = rng.random_range(0.0..5000.0);
            let wood_c = rng.random_range(0.0..50000.0);
            let biomass = rng.random_range(0.0..60000.0);

            for limit in [
                modifiers::lai_limit(leaf_c, wood_c, &species, LaiCombination::Average, 0.47),
                modifiers::water_limit(&climate, &ecoregion, &species),
                modifiers::temperature_limit(climate.soil_temperature, &species),
                modifiers::capacity_limit(biomass, species.max_biomass),
                modifiers::decay_factor(&climate),
            ] {
                assert!((0.0..=1.0).contains(&limit), "limit out of range: {limit}");
            }
        }
    }

    /// Monthly mortality can empty a cohort but never overdraw it.
    #[test]
    fn test_mortality_bounded_by_biomass() {
        let (growth, decomposition) = engines();
        let table = SpeciesTable::new(vec![SpeciesParameters {
            longevity: 20.0,
            monthly_wood_mortality: 0.2,
            ..SpeciesParameters::default()
        }]);
        let ecoregion = EcoregionParameters::default();
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        let mut ancient = Cohort::new(SpeciesId(0), 5.0, 1.0);
        ancient.age_months = 1200;
        site.add_cohort(ancient);

        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..36 {
            site.advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                clock,
                &growth,
                &decomposition,
            )
            .unwrap();
            for cohort in site.cohorts() {
                assert!(cohort.total_biomass() >= 0.0);
            }
            clock = clock.next();
        }
    }
}

mod mineralization {
    use super::*;

    /// Nitrogen-poor litter immobilizes: mineral N falls while the litter
    /// decomposes. Nitrogen-rich litter mineralizes: mineral N rises.
    #[test]
    fn test_litter_quality_sets_mineral_n_direction() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();

        let run = |cn: f64| {
            let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
            site.arena_mut()[PoolKind::SurfaceStructural].add_material(300.0, 300.0 / cn, 0.1);
            let start = site.ledger().mineral_n();
            site.advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                SimulationClock::new(1, 6),
                &growth,
                &decomposition,
            )
            .unwrap();
            site.ledger().mineral_n() - start
        };

        let poor = run(200.0);
        let rich = run(5.0);
        assert!(poor < 0.0, "high C:N litter should draw mineral N, got {poor}");
        assert!(rich > 0.0, "low C:N litter should release mineral N, got {rich}");
    }

    /// With mineral N exhausted, nitrogen-poor pools stall instead of
    /// overdrawing the stock.
    #[test]
    fn test_decomposition_stalls_when_mineral_n_exhausted() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters {
            initial_mineral_n: 0.0,
            ..EcoregionParameters::default()
        };
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        site.arena_mut()[PoolKind::SurfaceStructural].add_material(300.0, 300.0 / 400.0, 0.1);

        let before = site.arena()[PoolKind::SurfaceStructural].carbon;
        site.advance_month(
            &table,
            &ecoregion,
            &MonthlyClimate::default(),
            SimulationClock::new(1, 6),
            &growth,
            &decomposition,
        )
        .unwrap();
        let after = site.arena()[PoolKind::SurfaceStructural].carbon;
        assert_relative_eq!(before, after, epsilon = 1e-12);
        assert_eq!(site.ledger().mineral_n(), 0.0);
    }

    /// Gross mineralization counts only positive releases.
    #[test]
    fn test_gross_mineralization_is_non_negative() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();
        let mut site = populated_site(&decomposition);

        let totals = *site
            .advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                SimulationClock::new(1, 6),
                &growth,
                &decomposition,
            )
            .unwrap();
        assert!(totals.gross_mineralization >= 0.0);
    }
}

mod scenarios {
    use super::*;

    /// A young cohort with ample nitrogen accumulates biomass.
    #[test]
    fn test_young_stand_accumulates_biomass() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters {
            initial_mineral_n: 20.0,
            ..EcoregionParameters::default()
        };
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        site.add_cohort(Cohort::new(SpeciesId(0), 100.0, 20.0));

        let start = site.total_biomass();
        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..12 {
            site.advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                clock,
                &growth,
                &decomposition,
            )
            .unwrap();
            clock = clock.next();
        }
        assert!(site.total_biomass() > start);
    }

    /// July defoliation at fraction 1.0 strips the canopy into the frass
    /// pathway and the mineral stock later recovers the frass nitrogen.
    #[test]
    fn test_full_defoliation_routes_through_frass() {
        struct Outbreak;
        impl CanopyDisturbance for Outbreak {
            fn defoliation_fraction(&self, _: &Cohort, _: SimulationClock) -> f64 {
                1.0
            }
        }
        let growth = CohortGrowthEngine::with_disturbance(
            GrowthParameters::default(),
            Box::new(Outbreak),
        );
        let decomposition = DecompositionEngine::from_parameters(DecompositionParameters::default());
        let table = one_species_table();
        let ecoregion = EcoregionParameters::default();
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        site.add_cohort(Cohort::new(SpeciesId(0), 100.0, 10.0));

        let totals = *site
            .advance_month(
                &table,
                &ecoregion,
                &MonthlyClimate::default(),
                SimulationClock::new(1, 7),
                &growth,
                &decomposition,
            )
            .unwrap();
        assert_relative_eq!(totals.frass_carbon, 10.0 * 0.47, epsilon = 1e-9);
    }

    /// The multi-site driver matches a sequential per-site run exactly.
    #[test]
    fn test_landscape_matches_sequential_sites() {
        let (growth, decomposition) = engines();
        let mut landscape = Landscape::new(
            one_species_table(),
            EcoregionTable::new(vec![EcoregionParameters::default()]),
            growth,
            decomposition,
        );
        for _ in 0..4 {
            let id = landscape.add_site(EcoregionId(0)).unwrap();
            landscape.establish(id, SpeciesId(0)).unwrap();
        }

        let climate = HashMap::from([(EcoregionId(0), MonthlyClimate::default())]);
        let mut clock = SimulationClock::new(1, 1);
        let mut cumulative_npp = 0.0;
        for _ in 0..36 {
            let totals = landscape.advance_month(&climate, clock).unwrap();
            cumulative_npp += totals.ag_npp_carbon;
            clock = clock.next();
        }
        assert!(cumulative_npp > 0.0);
        let biomasses: Vec<f64> = landscape
            .sites()
            .iter()
            .map(Site::total_biomass)
            .collect();
        for pair in biomasses.windows(2) {
            assert_eq!(pair[0], pair[1], "identical sites must stay identical");
        }
    }
}

mod idempotence {
    use super::*;

    /// An empty site under any climate stays exactly empty.
    #[test]
    fn test_empty_site_is_a_fixed_point() {
        let (growth, decomposition) = engines();
        let table = one_species_table();
        let ecoregion = EcoregionParameters {
            initial_mineral_n: 0.0,
            ..EcoregionParameters::default()
        };
        let mut site = Site::new(0, EcoregionId(0), &ecoregion, &decomposition);
        let mut rng = StdRng::seed_from_u64(42);

        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..24 {
            let totals = *site
                .advance_month(
                    &table,
                    &ecoregion,
                    &random_climate(&mut rng),
                    clock,
                    &growth,
                    &decomposition,
                )
                .unwrap();
            assert_eq!(totals.ag_npp_carbon, 0.0);
            assert_eq!(totals.heterotrophic_respiration, 0.0);
            assert_eq!(site.arena().total_carbon(), 0.0);
            assert_eq!(site.ledger().mineral_n(), 0.0);
            clock = clock.next();
        }
    }
}
