//! TRACER Simulation Core
//!
//! ECS-симуляция ranged combat на Bevy 0.16 (headless)
//!
//! Поток данных за один FixedUpdate тик:
//! 1. Weapon input → FireControl (ammo, rate, режим) → `ShotFired`
//! 2. Ballistics: hitscan сразу, projectile: Verlet шаг + segment raycast
//! 3. `HitRegistered` → DamageModel → DamageAuthority → Damageable
//! 4. Notices → события для UI (DamageTaken, HealthChanged, AmmoChanged, ...)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ballistics;
pub mod clock;
pub mod combat;
pub mod error;
pub mod logger;
pub mod weapon;

// Re-export базовых типов для удобства
pub use ballistics::{
    BallisticsPlugin, BallisticsResolver, ColliderScene, DamageCurve, FireProfile, HitEvent,
    HitRegistered, ProjectileSimulator, SceneCollider, ShotContext, ShotFired, ShotMissed,
};
pub use clock::SimClock;
pub use combat::{
    compute_damage, CombatPlugin, DamageAuthority, DamageInfo, DamageTaken, Damageable, Dead,
    EntityDied, HealthChanged, NetRole,
};
pub use error::{ConfigError, FireError, OracleError};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use weapon::{
    AmmoChanged, FireControl, FireMode, FireRejected, TriggerPressed, TriggerReleased, Weapon,
    WeaponCatalog, WeaponPlugin, WeaponState, WeaponStateChanged,
};

/// Фазы FixedUpdate (строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Clock,
    WeaponInput,
    FireControl,
    Ballistics,
    Damage,
    Bookkeeping,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<SimClock>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Clock,
                    SimulationSet::WeaponInput,
                    SimulationSet::FireControl,
                    SimulationSet::Ballistics,
                    SimulationSet::Damage,
                    SimulationSet::Bookkeeping,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                clock::advance_sim_clock.in_set(SimulationSet::Clock),
            )
            // Подсистемы
            .add_plugins((WeaponPlugin, BallisticsPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Прогнать `ticks` FixedUpdate тиков напрямую (без wall-clock)
pub fn run_fixed_ticks(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Манекен: Damageable + body box + head sphere в `ColliderScene`
///
/// `position`: точка у ног; body 0..1.5м, голова ~1.7м.
pub fn spawn_target(world: &mut World, position: Vec3, max_health: f32) -> Entity {
    let entity = world.spawn(Damageable::new(max_health)).id();

    let mut scene = world.get_resource_or_insert_with(ColliderScene::default);
    scene.insert(
        SceneCollider::cuboid(position + Vec3::new(0.0, 0.75, 0.0), Vec3::new(0.3, 0.75, 0.3))
            .owned_by(entity)
            .tagged("Body"),
    );
    scene.insert(
        SceneCollider::sphere(position + Vec3::new(0.0, 1.7, 0.0), 0.15)
            .owned_by(entity)
            .tagged("Head"),
    );

    entity
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
