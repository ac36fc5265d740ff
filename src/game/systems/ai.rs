//! Per-enemy AI: tactical brain feeding the navigator
//!
//! Each controller owns its own seeded RNG so tie-breaks never depend on the
//! order other agents are ticked in.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::TacticsConfig;
use crate::game::kinematics::Kinematics;
use crate::game::spatial::{ColliderId, SpatialQuery};
use crate::game::systems::brain::{BrainOutput, EnemyBrain, Perception, TacticalMode};
use crate::game::systems::navigation::{Navigator, NavigatorTick};
use crate::util::vec2::Vec2;

/// Everything an enemy decided and did in one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTick {
    pub brain: BrainOutput,
    pub navigation: NavigatorTick,
}

impl EnemyTick {
    pub fn mode(&self) -> TacticalMode {
        self.brain.mode
    }
}

#[derive(Debug, Clone)]
pub struct EnemyController {
    brain: EnemyBrain,
    navigator: Navigator,
    rng: ChaCha8Rng,
}

impl EnemyController {
    pub fn new(config: &TacticsConfig, seed: u64) -> Self {
        Self::with_parts(EnemyBrain::new(config), Navigator::from_config(config), seed)
    }

    pub fn with_parts(brain: EnemyBrain, navigator: Navigator, seed: u64) -> Self {
        Self {
            brain,
            navigator,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn brain(&self) -> &EnemyBrain {
        &self.brain
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Decide, then drive. `target` is the explicit target reference; `None`
    /// when there is nothing to hunt.
    pub fn tick<K, Q>(
        &mut self,
        body: &mut K,
        query: &Q,
        collider: Option<ColliderId>,
        target: Option<Vec2>,
        dt: f32,
    ) -> EnemyTick
    where
        K: Kinematics + ?Sized,
        Q: SpatialQuery + ?Sized,
    {
        let perception = Perception {
            position: body.position(),
            heading: body.heading(),
            collider,
            target,
        };
        let brain = self.brain.tick(query, &perception, &mut self.rng, dt);
        let navigation = self
            .navigator
            .tick(body, query, brain.navigation_target, brain.can_move, dt);

        EnemyTick { brain, navigation }
    }
}
