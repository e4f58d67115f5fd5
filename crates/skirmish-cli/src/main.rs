//! Headless scenario harness: loads a scenario file, runs it for a fixed
//! number of ticks (or until one side has no hostiles left standing), and
//! prints a per-tick summary.
//!
//! Run with:
//!   cargo run -p skirmish-cli -- demos/skirmish.ron --ticks 600

use std::path::PathBuf;

use serde::Deserialize;
use skirmish_core::prelude::*;

struct Args {
    scenario_path: Option<PathBuf>,
    ticks: u64,
    quiet: bool,
}

fn parse_args() -> Args {
    let mut scenario_path = None;
    let mut ticks = 600;
    let mut quiet = false;

    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--ticks" => {
                if let Some(value) = raw.next() {
                    ticks = value.parse().unwrap_or(ticks);
                }
            }
            "--quiet" => quiet = true,
            other => scenario_path = Some(PathBuf::from(other)),
        }
    }

    Args {
        scenario_path,
        ticks,
        quiet,
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    config: SimConfig,
    combatants: Vec<CombatantSpec>,
    #[serde(default)]
    hostile_pairs: Vec<(i64, i64)>,
}

#[derive(Debug, Deserialize)]
struct CombatantSpec {
    id: i64,
    name: String,
    faction_id: i64,
    x: f64,
    y: f64,
    stats: Stats,
    weapon: Weapon,
    #[serde(default)]
    auto_targeting: bool,
    #[serde(default)]
    firing_mode: Option<FiringMode>,
}

fn built_in_scenario() -> ScenarioFile {
    let rifle = Weapon {
        id: 1,
        name: "Battle Rifle".to_owned(),
        kind: WeaponKind::Ranged,
        damage: 14,
        accuracy: 15,
        sound_id: "rifle_fire".to_owned(),
        state_machine: WeaponStateMachine::rifle(),
        projectile_velocity_fps: Some(2800.0),
        max_range_ft: Some(400.0),
        ammunition: Some(30),
        firing_delay_ticks: Some(0),
        cyclic_rate_ticks: Some(10),
        burst_size: Some(3),
        firing_modes: vec![FiringMode::SingleShot, FiringMode::Burst],
        reach_ft: None,
    };

    ScenarioFile {
        config: SimConfig {
            seed: Some(20260731),
            ..SimConfig::default()
        },
        combatants: vec![
            CombatantSpec {
                id: 1,
                name: "Red One".to_owned(),
                faction_id: 1,
                x: 0.0,
                y: 0.0,
                stats: Stats {
                    dexterity: 60,
                    strength: 55,
                    reflexes: 65,
                    coolness: 50,
                    max_health: 30,
                },
                weapon: rifle.clone(),
                auto_targeting: true,
                firing_mode: Some(FiringMode::Burst),
            },
            CombatantSpec {
                id: 2,
                name: "Blue One".to_owned(),
                faction_id: 2,
                x: 210.0,
                y: 0.0,
                stats: Stats {
                    dexterity: 55,
                    strength: 55,
                    reflexes: 55,
                    coolness: 55,
                    max_health: 30,
                },
                weapon: rifle,
                auto_targeting: true,
                firing_mode: Some(FiringMode::SingleShot),
            },
        ],
        hostile_pairs: vec![(1, 2)],
    }
}

fn load_scenario(path: &PathBuf) -> anyhow::Result<ScenarioFile> {
    let text = std::fs::read_to_string(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(ron::from_str(&text)?)
    }
}

fn build_game_loop(scenario: ScenarioFile) -> GameLoop {
    let mut game = GameLoop::new(scenario.config);
    for combatant in scenario.combatants {
        let mut character = Character::new(combatant.id, combatant.name, combatant.faction_id, combatant.stats);
        character.auto_targeting = combatant.auto_targeting;
        character.equip(combatant.weapon);
        character.firing_mode = combatant.firing_mode;
        let unit = Unit::new(Point::new(combatant.x, combatant.y), character);
        game.store.register(unit);
    }
    for (a, b) in scenario.hostile_pairs {
        game.factions.set_mutually_hostile(a, b);
    }
    game
}

fn any_hostile_pair_alive(game: &GameLoop) -> bool {
    let ids = game.store.ids_sorted();
    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let a_alive = game.store.get(a).map(|u| !u.character.is_incapacitated()).unwrap_or(false);
            let b_alive = game.store.get(b).map(|u| !u.character.is_incapacitated()).unwrap_or(false);
            if a_alive && b_alive && game.factions.is_hostile(
                game.store.get(a).unwrap().character.faction_id,
                game.store.get(b).unwrap().character.faction_id,
            ) {
                return true;
            }
        }
    }
    false
}

fn print_summary(game: &GameLoop, tick: Tick) {
    for id in game.store.ids_sorted() {
        let unit = game.store.get(id).unwrap();
        let c = &unit.character;
        tracing::info!(
            tick = tick.get(),
            id,
            name = %c.name,
            health = c.current_health,
            attempts = c.counters.attacks_attempted,
            hits = c.counters.attacks_successful,
            "combatant state"
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();

    let scenario = match &args.scenario_path {
        Some(path) => load_scenario(path)?,
        None => built_in_scenario(),
    };

    let mut game = build_game_loop(scenario);

    let mut last_tick = Tick::ZERO;
    for _ in 0..args.ticks {
        let Some(tick) = game.tick() else { break };
        last_tick = tick;
        if !args.quiet && tick.get() % 60 == 0 {
            print_summary(&game, tick);
        }
        if !any_hostile_pair_alive(&game) {
            break;
        }
    }

    print_summary(&game, last_tick);
    Ok(())
}
