//! Headless стрельбище TRACER
//!
//! Расставляет мишени по seed, стреляет из встроенного каталога
//! (carbine в Auto + pistol) и печатает итоговый health.

use bevy::prelude::*;
use rand::Rng;
use tracer_simulation::weapon::{CycleFireMode, ReloadRequested};
use tracer_simulation::*;

const SEED: u64 = 42;
const TICKS: u32 = 600;
const TARGETS: usize = 6;

fn main() {
    let mut app = create_headless_app(SEED);
    log_info(&format!("Starting TRACER headless range (seed: {})", SEED));

    let positions: Vec<Vec3> = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        (0..TARGETS)
            .map(|_| Vec3::new(rng.rng.gen_range(-6.0..6.0), 0.0, -rng.rng.gen_range(8.0..80.0)))
            .collect()
    };
    let targets: Vec<Entity> = positions
        .iter()
        .map(|position| spawn_target(app.world_mut(), *position, 100.0))
        .collect();

    let catalog = app.world().resource::<WeaponCatalog>().clone();
    let mut weapons = Vec::new();
    for (attacker_id, id) in [(1, "carbine"), (2, "pistol")] {
        match catalog.instantiate(id, attacker_id) {
            Ok(weapon) => weapons.push(app.world_mut().spawn(weapon).id()),
            Err(err) => log_error(&format!("Weapon '{}' unavailable: {}", id, err)),
        }
    }

    // carbine: Semi → Burst → Auto
    if let Some(&carbine) = weapons.first() {
        app.world_mut().send_event(CycleFireMode { weapon: carbine });
        app.world_mut().send_event(CycleFireMode { weapon: carbine });
    }

    let origin = Vec3::new(0.0, 1.4, 0.0);
    for tick in 0..TICKS {
        if tick % 30 == 0 {
            let aim = positions[(tick / 30) as usize % TARGETS] + Vec3::new(0.0, 1.0, 0.0);
            for &weapon in &weapons {
                app.world_mut().send_event(TriggerPressed {
                    weapon,
                    origin,
                    direction: aim - origin,
                });
            }
        }
        if tick % 30 == 15 {
            for &weapon in &weapons {
                app.world_mut().send_event(TriggerReleased { weapon });
            }
        }
        if tick % 150 == 149 {
            for &weapon in &weapons {
                app.world_mut().send_event(ReloadRequested { weapon });
            }
        }

        run_fixed_ticks(&mut app, 1);

        if tick % 100 == 0 {
            let shots = app.world().resource::<ballistics::ShotSequence>().total();
            log_info(&format!("Tick {}: {} shots fired", tick, shots));
        }
    }

    for (index, target) in targets.iter().enumerate() {
        let Some(damageable) = app.world().get::<Damageable>(*target) else {
            continue;
        };
        log_info(&format!(
            "Target #{} at {:.1}m: {:.0}/{:.0} HP{}",
            index,
            positions[index].length(),
            damageable.current_health(),
            damageable.max_health(),
            if damageable.is_dead() { " 💀" } else { "" }
        ));
    }

    log_info("Simulation complete!");
}
