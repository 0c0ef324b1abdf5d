//! Runs a generated ecosystem until it dies out or hits the tick cap.

mod telemetry;

use anyhow::{Context, Result};
use ecogrid_core::{DeathCause, Population, SimulationConfig};
use ecogrid_world::{Ecosystem, SeededDice, TickReport};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Totals over a whole run, printed as JSON when the run ends.
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    extinct: bool,
    generated: Population,
    final_population: Population,
    births: usize,
    deaths: HashMap<DeathCause, usize>,
    placement_failures: usize,
    grid_growths: u32,
    final_height: i32,
    final_width: i32,
}

impl RunSummary {
    fn absorb(&mut self, report: &TickReport) {
        self.ticks = report.tick;
        self.births += report.births;
        self.placement_failures += report.placement_failures;
        self.grid_growths += report.grid_growths;
        for (cause, count) in &report.deaths {
            *self.deaths.entry(*cause).or_insert(0) += count;
        }
        self.final_population = report.population;
        self.extinct = report.population.is_extinct();
    }

    /// Deaths for every cause in a fixed order, including causes never seen.
    fn death_breakdown(&self) -> Vec<(DeathCause, usize)> {
        DeathCause::all()
            .into_iter()
            .map(|cause| (cause, self.deaths.get(&cause).copied().unwrap_or(0)))
            .collect()
    }
}

fn main() -> Result<()> {
    let json_logs = std::env::var("ECOGRID_LOG_FORMAT")
        .map_or(false, |format| format.eq_ignore_ascii_case("json"));
    telemetry::init_telemetry(json_logs);

    let config = load_config()?;
    info!(
        seed = config.seed,
        height = config.world.height,
        width = config.world.width,
        entities = config.generation.total_entity_count,
        max_ticks = ?config.max_ticks,
        "Starting ecogrid run"
    );

    let mut eco = Ecosystem::new(&config)?;
    let summary = run(&mut eco, &config);

    info!(
        ticks = summary.ticks,
        extinct = summary.extinct,
        births = summary.births,
        population = summary.final_population.total(),
        "Run finished"
    );
    for (cause, count) in summary.death_breakdown() {
        info!(cause = ?cause, count, "Deaths");
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Ok(path) = std::env::var("ECOGRID_SNAPSHOT") {
        let snapshot = eco.snapshot().to_json()?;
        std::fs::write(&path, snapshot)
            .with_context(|| format!("failed to write snapshot to {path}"))?;
        info!(path = %path, "Snapshot written");
    }

    Ok(())
}

/// Config path from `ECOGRID_CONFIG`, else the first argument; defaults
/// when neither is set.
fn load_config() -> Result<SimulationConfig> {
    let path = std::env::var("ECOGRID_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1));

    let Some(path) = path else {
        info!("No config given, using defaults");
        return Ok(SimulationConfig::default());
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {path}"))?;
    let config = SimulationConfig::from_json(&text)
        .with_context(|| format!("invalid config {path}"))?;
    info!(path = %path, "Loaded config");
    Ok(config)
}

#[instrument(skip_all, fields(seed = config.seed))]
fn run(eco: &mut Ecosystem<SeededDice>, config: &SimulationConfig) -> RunSummary {
    let generation = eco.populate(&config.generation);
    let mut summary = RunSummary {
        seed: config.seed,
        generated: generation.placed,
        final_population: generation.placed,
        extinct: generation.placed.is_extinct(),
        placement_failures: generation.placement_failures,
        ..Default::default()
    };

    while !summary.extinct {
        if config.max_ticks.is_some_and(|max| eco.tick() >= max) {
            info!(tick = eco.tick(), "Tick cap reached");
            break;
        }

        let population = eco.advance_tick();
        let report = eco.last_report();
        summary.absorb(report);

        info!(
            tick = report.tick,
            plants = population.plants,
            herbivores = population.herbivores,
            omnivores = population.omnivores,
            carnivores = population.carnivores,
            births = report.births,
            deaths = report.total_deaths(),
            "Tick"
        );
    }

    summary.final_height = eco.grid().height;
    summary.final_width = eco.grid().width;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecogrid_core::{GenerationConfig, Kind, WorldConfig};

    #[test]
    fn test_summary_absorbs_reports() {
        let mut summary = RunSummary::default();

        let mut first = TickReport::new(1);
        first.births = 2;
        first.record_death(DeathCause::Eaten);
        first.population.record(Kind::Plant);
        summary.absorb(&first);

        let mut second = TickReport::new(2);
        second.record_death(DeathCause::Eaten);
        second.record_death(DeathCause::OldAge);
        second.grid_growths = 1;
        summary.absorb(&second);

        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.births, 2);
        assert_eq!(summary.deaths[&DeathCause::Eaten], 2);
        assert_eq!(summary.grid_growths, 1);
        assert!(summary.extinct);
    }

    #[test]
    fn test_death_breakdown_lists_every_cause() {
        let mut summary = RunSummary::default();
        let mut report = TickReport::new(1);
        report.record_death(DeathCause::Poisoned);
        report.record_death(DeathCause::Poisoned);
        summary.absorb(&report);

        let breakdown = summary.death_breakdown();
        assert_eq!(breakdown.len(), 7);
        assert_eq!(breakdown[0], (DeathCause::OldAge, 0));
        assert_eq!(breakdown[6], (DeathCause::Poisoned, 2));
        assert_eq!(breakdown.iter().map(|(_, n)| n).sum::<usize>(), 2);
    }

    #[test]
    fn test_run_respects_tick_cap() {
        let config = SimulationConfig {
            seed: 3,
            max_ticks: Some(4),
            world: WorldConfig {
                height: 30,
                width: 30,
                growth_margin: 5,
            },
            generation: GenerationConfig {
                total_entity_count: 200,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut eco = Ecosystem::new(&config).unwrap();
        let summary = run(&mut eco, &config);

        assert!(summary.ticks <= 4);
        assert!(summary.generated.total() > 0);
        assert!(summary.extinct || summary.ticks == 4);
        assert_eq!(summary.final_width, eco.grid().width);
    }

    #[test]
    fn test_empty_world_is_extinct_before_first_tick() {
        let config = SimulationConfig {
            generation: GenerationConfig {
                total_entity_count: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut eco = Ecosystem::new(&config).unwrap();
        let summary = run(&mut eco, &config);
        assert!(summary.extinct);
        assert_eq!(summary.ticks, 0);
    }
}
