//! Seeded body populations
//!
//! Every participant that runs the same seed builds the same bodies and
//! applies the same perturbations on the same ticks. Used by the
//! headless runner and by the determinism tests.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{BodyId, Pose};
use super::shape::{BodyConfig, Shape};
use super::world::SimContext;
use crate::error::BodyError;
use crate::math::{Fixed, Vec2d};
use crate::render::RenderSync;
use crate::settings::SimConfig;

/// Ticks between random velocity/heading changes
pub const PERTURB_INTERVAL: u64 = 16;

/// World half-extent bodies are spawned in
const SPAWN_EXTENT: i64 = 200;

/// A seeded simulation and the RNG that keeps perturbing it
#[derive(Debug)]
pub struct Scenario {
    ctx: SimContext,
    rng: Pcg32,
}

impl Scenario {
    /// Build `count` bodies from `seed`. Roughly a quarter of them are
    /// parented to an earlier body.
    pub fn generate(seed: u64, count: usize, config: SimConfig) -> Result<Self, BodyError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ctx = SimContext::new(config);

        for i in 0..count {
            let shape = random_shape(&mut rng);
            let config = BodyConfig {
                shape,
                trigger: rng.random_bool(0.1),
                immovable: false,
                priority: rng.random_range(0..4),
            };
            let position = Vec2d::from_int(
                rng.random_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
                rng.random_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
            );
            let id = ctx.initialize(config, Pose::new(position, random_heading(&mut rng)))?;
            ctx.set_velocity(id, random_velocity(&mut rng))?;

            if i > 0 && rng.random_range(0..4) == 0 {
                let parent = BodyId(rng.random_range(0..i as u32));
                ctx.set_parent(id, parent)?;
            }
        }
        log::debug!("Generated scenario seed={} bodies={}", seed, count);
        Ok(Self { ctx, rng })
    }

    pub fn ctx(&self) -> &SimContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// Apply this tick's perturbations, then run the tick
    pub fn step(&mut self, target: &mut dyn RenderSync) -> Result<(), BodyError> {
        let count = self.ctx.len() as u32;
        if count > 0 && self.ctx.tick() % PERTURB_INTERVAL == 0 {
            let mover = BodyId(self.rng.random_range(0..count));
            let velocity = random_velocity(&mut self.rng);
            self.ctx.set_velocity(mover, velocity)?;

            let turner = BodyId(self.rng.random_range(0..count));
            let heading = random_heading(&mut self.rng);
            self.ctx.set_rotation(turner, heading)?;
        }
        self.ctx.step(target)
    }
}

fn random_shape(rng: &mut Pcg32) -> Shape {
    let size = Fixed::from_raw(rng.random_range(Fixed::HALF.raw()..=Fixed::from_int(4).raw()));
    match rng.random_range(0..4) {
        0 => Shape::None,
        1 => Shape::circle(size),
        2 => Shape::aa_box(size, size.half().max(Fixed::HALF)),
        _ => {
            let s = size.raw();
            // Counter-clockwise quad around the origin
            Shape::polygon(vec![
                Vec2d::from_raw(-s, -s),
                Vec2d::from_raw(s, -s),
                Vec2d::from_raw(s, s / 2),
                Vec2d::from_raw(-s / 2, s),
            ])
        }
    }
}

fn random_heading(rng: &mut Pcg32) -> Vec2d {
    match rng.random_range(0..6) {
        0 => Vec2d::RIGHT,
        1 => Vec2d::UP,
        2 => -Vec2d::RIGHT,
        3 => -Vec2d::UP,
        4 => Vec2d::from_int(1, 1).normalize(),
        _ => Vec2d::from_int(-3, 4).normalize(),
    }
}

fn random_velocity(rng: &mut Pcg32) -> Vec2d {
    let limit = Fixed::from_int(2).raw();
    if rng.random_bool(0.2) {
        return Vec2d::ZERO;
    }
    Vec2d::from_raw(rng.random_range(-limit..=limit), rng.random_range(-limit..=limit))
}
