//! Tests for ProjectileSimulator.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::prelude::*;

    use crate::ballistics::profile::{FireProfile, FlightModel, HitId, ShotContext};
    use crate::ballistics::projectile::{ProjectileSimulator, DEFAULT_GRAVITY};
    use crate::ballistics::scene::{ColliderScene, SceneCollider};
    use crate::combat::damage::DamageInfo;

    fn caliber(muzzle_speed: f32, gravity_multiplier: f32, max_lifetime: f32) -> FireProfile {
        FireProfile {
            flight: FlightModel::Projectile {
                muzzle_speed,
                gravity_multiplier,
                max_lifetime,
            },
            ..FireProfile::pistol_caliber()
        }
    }

    fn launch(simulator: &mut ProjectileSimulator, profile: FireProfile) {
        let shot = ShotContext::new(5, Vec3::ZERO, Vec3::NEG_Z, 11, Arc::new(profile));
        assert!(simulator.launch(Arc::new(shot), 0.0));
    }

    /// Стена толщиной 2м, передняя грань на `face` метрах по -Z
    fn wall(face: f32) -> SceneCollider {
        SceneCollider::cuboid(Vec3::new(0.0, 0.0, -(face + 1.0)), Vec3::new(5.0, 5.0, 1.0))
    }

    #[test]
    fn test_gravity_drop_matches_kinematics() {
        let scene = ColliderScene::default();
        let mut simulator = ProjectileSimulator::new(DEFAULT_GRAVITY);
        launch(&mut simulator, caliber(100.0, 1.0, 5.0));

        for step in 1..=10 {
            let hits = simulator.tick(&scene, 0.1, step as f32 * 0.1);
            assert!(hits.is_empty());
        }

        // Шаг точен для постоянного ускорения: y = ½·g·t²
        let projectile = &simulator.active()[0];
        assert!((projectile.position.y - (-4.905)).abs() < 1e-3, "y = {}", projectile.position.y);
        assert!((projectile.position.z - (-100.0)).abs() < 1e-3);
        assert!((projectile.velocity.y - (-9.81)).abs() < 1e-3);
        assert_eq!(projectile.start_position, Vec3::ZERO);
    }

    #[test]
    fn test_gravity_multiplier_scales_drop() {
        let scene = ColliderScene::default();
        let mut simulator = ProjectileSimulator::default();
        launch(&mut simulator, caliber(100.0, 0.0, 5.0));

        simulator.tick(&scene, 0.5, 0.5);
        let projectile = &simulator.active()[0];
        assert_eq!(projectile.position.y, 0.0);
        assert!((projectile.position.z - (-50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_lifetime_expiry_is_silent() {
        let scene = ColliderScene::default();
        let mut simulator = ProjectileSimulator::default();
        launch(&mut simulator, caliber(100.0, 1.0, 0.5));

        assert!(simulator.tick(&scene, 0.1, 0.3).is_empty());
        assert_eq!(simulator.active_count(), 1);

        assert!(simulator.tick(&scene, 0.1, 0.6).is_empty());
        assert_eq!(simulator.active_count(), 0);
    }

    #[test]
    fn test_segment_hit_destroys_projectile() {
        let mut scene = ColliderScene::default();
        scene.insert(wall(9.0).owned_by(Entity::from_raw(4)));
        let mut simulator = ProjectileSimulator::default();
        let profile = caliber(100.0, 0.0, 5.0);
        launch(&mut simulator, profile.clone());

        // Сегмент 0 → -10м пересекает стену на -9м
        let hits = simulator.tick(&scene, 0.1, 0.1);
        assert_eq!(hits.len(), 1);
        assert_eq!(simulator.active_count(), 0);

        let hit = &hits[0].hit;
        assert_eq!(hit.id, HitId::new(11, 5, 0));
        assert_eq!(hit.target, Some(Entity::from_raw(4)));
        assert!((hit.travel_distance - 9.0).abs() < 1e-3);
        assert_eq!(hit.damage_multiplier, 1.0);

        // falloff в метрах: 25 × (1 − 0.5·9/100)
        let damage = DamageInfo::from_hit(hit, &hits[0].shot).damage;
        assert!((damage - 23.875).abs() < 1e-3, "damage = {}", damage);
        assert_eq!(hits[0].shot.attacker_id, 11);
    }

    #[test]
    fn test_penetration_continues_from_step_end() {
        let mut scene = ColliderScene::default();
        scene.insert(wall(9.0));
        scene.insert(wall(29.0));
        let mut simulator = ProjectileSimulator::default();
        launch(&mut simulator, caliber(100.0, 0.0, 5.0).with_penetration(1, 0.5));

        let first = simulator.tick(&scene, 0.1, 0.1);
        assert_eq!(first.len(), 1);
        assert_eq!(simulator.active_count(), 1);
        assert_eq!(simulator.active()[0].penetrations_remaining, 0);

        // -10 → -20: старт внутри первой стены, она не репортится
        assert!(simulator.tick(&scene, 0.1, 0.2).is_empty());

        let second = simulator.tick(&scene, 0.1, 0.3);
        assert_eq!(second.len(), 1);
        let hit = &second[0].hit;
        assert_eq!(hit.id.index, 1);
        assert_eq!(hit.damage_multiplier, 0.5);
        assert!((hit.travel_distance - 29.0).abs() < 1e-3);
        assert_eq!(simulator.active_count(), 0);
    }

    #[test]
    fn test_launch_rejects_hitscan_and_zero_direction() {
        let mut simulator = ProjectileSimulator::default();

        let hitscan = ShotContext::new(1, Vec3::ZERO, Vec3::NEG_Z, 1, Arc::new(FireProfile::rifle_hitscan()));
        assert!(!simulator.launch(Arc::new(hitscan), 0.0));

        let stalled = ShotContext::new(2, Vec3::ZERO, Vec3::ZERO, 1, Arc::new(FireProfile::pistol_caliber()));
        assert!(!simulator.launch(Arc::new(stalled), 0.0));

        assert_eq!(simulator.active_count(), 0);
    }

    #[test]
    fn test_clear_drops_all_projectiles() {
        let mut simulator = ProjectileSimulator::default();
        launch(&mut simulator, FireProfile::pistol_caliber());
        launch(&mut simulator, FireProfile::pistol_caliber());
        assert_eq!(simulator.active_count(), 2);

        simulator.clear();
        assert_eq!(simulator.active_count(), 0);
    }
}
