//! Simulation clock (монотонное время симуляции)

use bevy::prelude::*;

/// Секунды симуляции, растут на fixed timestep каждый FixedUpdate
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimClock {
    elapsed: f32,
    delta: f32,
    tick: u64,
}

impl SimClock {
    pub fn now(&self) -> f32 {
        self.elapsed
    }

    /// Шаг последнего тика
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self, delta: f32) {
        self.delta = delta.max(0.0);
        self.elapsed += self.delta;
        self.tick += 1;
    }
}

/// Система: первая в FixedUpdate
pub fn advance_sim_clock(mut clock: ResMut<SimClock>, time: Res<Time<Fixed>>) {
    clock.advance(time.timestep().as_secs_f32());
}
