//! JSON scenario files
//!
//! A scenario lists the static geometry, the player and every hostile agent,
//! plus the seed that makes a run repeatable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, TacticsConfig};
use crate::game::constants::{sim, world::MAX_EXTENT};
use crate::game::spatial::{Layer, Shape, Tag, World};
use crate::game::state::Simulation;
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Scenario has no ground collider")]
    EmptyWorld,
    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: String, value: f32 },
    #[error("{field} must lie within +/-{limit} (got {value})", limit = MAX_EXTENT)]
    OutOfBounds { field: String, value: f32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Static collider placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderSpec {
    #[serde(flatten)]
    pub shape: Shape,
    pub layer: Layer,
    #[serde(default)]
    pub tag: Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
}

/// Spawn point for an enemy or turret
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub position: Vec2,
    #[serde(default)]
    pub heading: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub config: TacticsConfig,
    pub world: Vec<ColliderSpec>,
    #[serde(default)]
    pub player: Option<PlayerSpec>,
    #[serde(default)]
    pub enemies: Vec<AgentSpec>,
    #[serde(default)]
    pub turrets: Vec<AgentSpec>,
}

/// Rejects non-finite or far-flung coordinates before they reach the grid
fn check_extent(field: &str, point: Vec2) -> Result<(), ScenarioError> {
    for (axis, value) in [("x", point.x), ("z", point.z)] {
        if !(value.abs() <= MAX_EXTENT) {
            return Err(ScenarioError::OutOfBounds {
                field: format!("{}.{}", field, axis),
                value,
            });
        }
    }
    Ok(())
}

fn default_seed() -> u64 {
    sim::DEFAULT_SEED
}

fn default_ticks() -> u64 {
    sim::DEFAULT_TICKS
}

impl Scenario {
    /// Parse and validate a scenario
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Built-in arena used when no scenario file is given
    pub fn demo() -> Self {
        let rect = |min: (f32, f32), max: (f32, f32), layer: Layer, tag: Tag| ColliderSpec {
            shape: Shape::Rect {
                min: Vec2::new(min.0, min.1),
                max: Vec2::new(max.0, max.1),
            },
            layer,
            tag,
        };
        let rock = |x: f32, z: f32, radius: f32| ColliderSpec {
            shape: Shape::Circle {
                center: Vec2::new(x, z),
                radius,
            },
            layer: Layer::Obstacle,
            tag: Tag::Untagged,
        };
        let agent = |x: f32, z: f32, heading: f32| AgentSpec {
            position: Vec2::new(x, z),
            heading,
        };

        Self {
            seed: sim::DEFAULT_SEED,
            ticks: sim::DEFAULT_TICKS,
            config: TacticsConfig::default(),
            world: vec![
                rect((-30.0, -30.0), (30.0, 30.0), Layer::Ground, Tag::Untagged),
                rect((-6.0, 4.0), (6.0, 5.0), Layer::Wall, Tag::Untagged),
                rect((16.0, -8.0), (17.0, 6.0), Layer::Wall, Tag::Untagged),
                rect((-3.0, -10.0), (-1.0, -8.0), Layer::Breakable, Tag::Breakable),
                rock(8.0, -4.0, 1.2),
                rock(-10.0, -2.0, 1.5),
                rock(4.0, -16.0, 1.0),
            ],
            player: Some(PlayerSpec {
                position: Vec2::new(0.0, 12.0),
                velocity: Vec2::new(1.0, 0.0),
            }),
            // Each enemy starts within sight of the player and clear of the walls
            enemies: vec![agent(-16.0, -4.0, 45.0), agent(14.0, 0.0, 315.0), agent(-20.0, 8.0, 90.0)],
            turrets: vec![agent(-14.0, 12.0, 90.0), agent(22.0, 12.0, 270.0)],
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.world.iter().any(|spec| spec.layer == Layer::Ground) {
            return Err(ScenarioError::EmptyWorld);
        }

        for (i, spec) in self.world.iter().enumerate() {
            let (min, max) = spec.shape.bounds();
            check_extent(&format!("world[{}]", i), min)?;
            check_extent(&format!("world[{}]", i), max)?;
            match spec.shape {
                Shape::Circle { radius, .. } if !(radius > 0.0) => {
                    return Err(ScenarioError::NonPositive {
                        field: format!("world[{}].radius", i),
                        value: radius,
                    });
                }
                Shape::Rect { min, max } => {
                    let size = max - min;
                    for (axis, value) in [("width", size.x), ("depth", size.z)] {
                        if !(value > 0.0) {
                            return Err(ScenarioError::NonPositive {
                                field: format!("world[{}].{}", i, axis),
                                value,
                            });
                        }
                    }
                }
                Shape::Circle { .. } => {}
            }
        }

        if let Some(player) = self.player {
            check_extent("player.position", player.position)?;
        }
        for (i, enemy) in self.enemies.iter().enumerate() {
            check_extent(&format!("enemies[{}].position", i), enemy.position)?;
        }
        for (i, turret) in self.turrets.iter().enumerate() {
            check_extent(&format!("turrets[{}].position", i), turret.position)?;
        }

        if self.ticks == 0 {
            return Err(ScenarioError::NonPositive {
                field: "ticks".to_string(),
                value: 0.0,
            });
        }

        self.config.validate()?;
        Ok(())
    }

    /// Validate, then build a simulation with every agent spawned in file order
    pub fn build(&self) -> Result<Simulation, ScenarioError> {
        self.validate()?;

        let mut world = World::default();
        for spec in &self.world {
            world.insert(spec.shape, spec.layer, spec.tag);
        }

        let mut sim = Simulation::new(world, self.config, self.seed);
        if let Some(player) = self.player {
            sim.set_player(player.position, player.velocity);
        }
        for enemy in &self.enemies {
            sim.spawn_enemy(enemy.position, enemy.heading);
        }
        for turret in &self.turrets {
            sim.spawn_turret(turret.position, turret.heading);
        }

        tracing::debug!(
            colliders = self.world.len(),
            enemies = self.enemies.len(),
            turrets = self.turrets.len(),
            seed = self.seed,
            "Built scenario"
        );
        Ok(sim)
    }
}
