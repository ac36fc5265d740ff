//! Simulation state
//!
//! Owns the world and every agent in it. The player is the single target all
//! enemies and turrets hunt; it is passed to them explicitly each tick.

use hashbrown::HashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TacticsConfig;
use crate::game::constants::world::AGENT_RADIUS;
use crate::game::kinematics::Body;
use crate::game::spatial::{ColliderId, Layer, Shape, Tag, World};
use crate::game::systems::ai::EnemyController;
use crate::game::systems::targeting::TargetingSystem;
use crate::game::systems::turret::{TurretAi, Weapon};
use crate::util::vec2::Vec2;

/// Unique agent identifier
pub type AgentId = Uuid;

/// The target every hostile agent is after
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    /// Units per second, applied every tick
    pub velocity: Vec2,
    #[serde(skip)]
    pub collider: Option<ColliderId>,
}

/// A single shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub origin: Vec2,
    pub direction: Vec2,
}

/// Weapon that records what it fired instead of spawning projectiles
#[derive(Debug, Clone, Default)]
pub struct ShotLog {
    pub fired: u64,
    pub last: Option<Shot>,
}

impl Weapon for ShotLog {
    fn fire(&mut self, origin: Vec2, direction: Vec2) {
        self.fired += 1;
        self.last = Some(Shot { origin, direction });
    }
}

/// Mobile tank enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: AgentId,
    pub body: Body,
    pub collider: ColliderId,
    pub controller: EnemyController,
}

/// Stationary turret
#[derive(Debug, Clone)]
pub struct Turret {
    pub id: AgentId,
    pub body: Body,
    pub collider: ColliderId,
    pub targeting: TargetingSystem,
    pub ai: TurretAi,
    pub weapon: ShotLog,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub tick: u64,
    pub world: World,
    pub player: Option<Player>,
    pub enemies: HashMap<AgentId, Enemy>,
    pub turrets: HashMap<AgentId, Turret>,
    /// Enemies in spawn order; ticks follow this order
    pub(crate) enemy_order: Vec<AgentId>,
    pub(crate) turret_order: Vec<AgentId>,
    config: TacticsConfig,
    rng: ChaCha8Rng,
}

impl Simulation {
    pub fn new(world: World, config: TacticsConfig, seed: u64) -> Self {
        Self {
            tick: 0,
            world,
            player: None,
            enemies: HashMap::new(),
            turrets: HashMap::new(),
            enemy_order: Vec::new(),
            turret_order: Vec::new(),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    /// Ids come from the simulation RNG so a seeded run is fully repeatable
    fn next_agent_id(&mut self) -> AgentId {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    fn agent_collider(&mut self, position: Vec2, layer: Layer, tag: Tag) -> ColliderId {
        self.world.insert(
            Shape::Circle {
                center: position,
                radius: AGENT_RADIUS,
            },
            layer,
            tag,
        )
    }

    /// Place the player, or move it if it already exists
    pub fn set_player(&mut self, position: Vec2, velocity: Vec2) {
        if let Some(player) = self.player.as_mut() {
            player.position = position;
            player.velocity = velocity;
            if let Some(collider) = player.collider {
                self.world.set_position(collider, position);
            }
            return;
        }

        let collider = self.agent_collider(position, Layer::Player, Tag::Player);
        self.player = Some(Player {
            position,
            velocity,
            collider: Some(collider),
        });
    }

    pub fn remove_player(&mut self) -> Option<Player> {
        let player = self.player.take()?;
        if let Some(collider) = player.collider {
            self.world.remove(collider);
        }
        Some(player)
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.player.map(|p| p.position)
    }

    pub fn spawn_enemy(&mut self, position: Vec2, heading: f32) -> AgentId {
        let id = self.next_agent_id();
        let seed = self.rng.gen::<u64>();
        let collider = self.agent_collider(position, Layer::Enemy, Tag::Enemy);
        let enemy = Enemy {
            id,
            body: Body::new(position, heading),
            collider,
            controller: EnemyController::new(&self.config, seed),
        };

        self.enemies.insert(id, enemy);
        self.enemy_order.push(id);
        tracing::debug!(%id, x = position.x, z = position.z, "Spawned enemy");
        id
    }

    /// Turrets start scanning around their spawn heading
    pub fn spawn_turret(&mut self, position: Vec2, heading: f32) -> AgentId {
        let id = self.next_agent_id();
        let collider = self.agent_collider(position, Layer::Enemy, Tag::Enemy);
        let turret = Turret {
            id,
            body: Body::new(position, heading),
            collider,
            targeting: TargetingSystem::new(&self.config.turret),
            ai: TurretAi::new(self.config.turret, heading),
            weapon: ShotLog::default(),
        };

        self.turrets.insert(id, turret);
        self.turret_order.push(id);
        tracing::debug!(%id, x = position.x, z = position.z, "Spawned turret");
        id
    }

    /// Remove an enemy or turret. Returns true if it existed.
    pub fn despawn(&mut self, id: AgentId) -> bool {
        let collider = if let Some(enemy) = self.enemies.remove(&id) {
            self.enemy_order.retain(|&other| other != id);
            enemy.collider
        } else if let Some(turret) = self.turrets.remove(&id) {
            self.turret_order.retain(|&other| other != id);
            turret.collider
        } else {
            return false;
        };
        self.world.remove(collider);
        true
    }

    pub fn enemy(&self, id: AgentId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    pub fn turret(&self, id: AgentId) -> Option<&Turret> {
        self.turrets.get(&id)
    }

    /// Enemies in spawn order
    pub fn enemies_in_order(&self) -> impl Iterator<Item = &Enemy> {
        self.enemy_order.iter().filter_map(|id| self.enemies.get(id))
    }

    /// Turrets in spawn order
    pub fn turrets_in_order(&self) -> impl Iterator<Item = &Turret> {
        self.turret_order.iter().filter_map(|id| self.turrets.get(id))
    }

    pub fn agent_count(&self) -> usize {
        self.enemies.len() + self.turrets.len()
    }
}
