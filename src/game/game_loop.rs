//! Fixed-step game loop
//!
//! Each tick moves the player, then every enemy in spawn order, then every
//! turret in spawn order. Agents read the world as left by the agents ticked
//! before them.

use serde::Serialize;

use crate::game::constants::sim;
use crate::game::state::{AgentId, Simulation};
use crate::game::systems::brain::TacticalMode;
use crate::game::systems::turret::TurretState;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct GameLoopConfig {
    /// Seconds simulated per tick
    pub dt: f32,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self { dt: sim::DT }
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameLoopEvent {
    ModeChanged {
        enemy: AgentId,
        from: TacticalMode,
        to: TacticalMode,
    },
    TurretStateChanged {
        turret: AgentId,
        state: TurretState,
    },
    ShotFired {
        turret: AgentId,
        origin: Vec2,
        direction: Vec2,
    },
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// Mode of every enemy after the tick, in spawn order
    pub enemy_modes: Vec<(AgentId, TacticalMode)>,
    /// State of every turret after the tick, in spawn order
    pub turret_states: Vec<(AgentId, TurretState)>,
    pub shots_fired: u32,
    pub events: Vec<GameLoopEvent>,
}

/// Totals over a run of ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub mode_changes: u64,
    pub turret_transitions: u64,
    pub shots_fired: u64,
}

impl RunSummary {
    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.shots_fired += u64::from(report.shots_fired);
        for event in &report.events {
            match event {
                GameLoopEvent::ModeChanged { .. } => self.mode_changes += 1,
                GameLoopEvent::TurretStateChanged { .. } => self.turret_transitions += 1,
                GameLoopEvent::ShotFired { .. } => {}
            }
        }
    }
}

impl Simulation {
    /// Advance every agent by `dt` seconds
    pub fn step(&mut self, dt: f32) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            enemy_modes: Vec::with_capacity(self.enemy_order.len()),
            turret_states: Vec::with_capacity(self.turret_order.len()),
            shots_fired: 0,
            events: Vec::new(),
        };

        if let Some(player) = self.player.as_mut() {
            player.position += player.velocity * dt;
            if let Some(collider) = player.collider {
                self.world.set_position(collider, player.position);
            }
        }
        let target = self.player.map(|p| p.position);

        for id in &self.enemy_order {
            let Some(enemy) = self.enemies.get_mut(id) else {
                continue;
            };
            let before = enemy.controller.brain().mode();
            let result = enemy
                .controller
                .tick(&mut enemy.body, &self.world, Some(enemy.collider), target, dt);
            self.world.set_position(enemy.collider, enemy.body.position);

            if result.mode() != before {
                report.events.push(GameLoopEvent::ModeChanged {
                    enemy: *id,
                    from: before,
                    to: result.mode(),
                });
            }
            report.enemy_modes.push((*id, result.mode()));
        }

        for id in &self.turret_order {
            let Some(turret) = self.turrets.get_mut(id) else {
                continue;
            };
            let before = turret.ai.state();
            let world = &self.world;
            let targeting = &turret.targeting;
            let collider = turret.collider;
            let result = turret.ai.tick(
                &mut turret.body,
                target,
                |origin, heading| targeting.can_see(world, origin, heading, Some(collider), target),
                &mut turret.weapon,
                dt,
            );

            if result.state != before {
                report.events.push(GameLoopEvent::TurretStateChanged {
                    turret: *id,
                    state: result.state,
                });
            }
            if let (true, Some(shot)) = (result.fired, turret.weapon.last) {
                report.shots_fired += 1;
                report.events.push(GameLoopEvent::ShotFired {
                    turret: *id,
                    origin: shot.origin,
                    direction: shot.direction,
                });
            }
            report.turret_states.push((*id, result.state));
        }

        report
    }
}

pub struct GameLoop {
    config: GameLoopConfig,
    state: Simulation,
}

impl GameLoop {
    pub fn new(state: Simulation, config: GameLoopConfig) -> Self {
        Self { config, state }
    }

    pub fn state(&self) -> &Simulation {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Simulation {
        &mut self.state
    }

    /// Run a single tick
    pub fn tick(&mut self) -> TickReport {
        self.state.step(self.config.dt)
    }

    /// Run `ticks` ticks and total up what happened
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        self.run_with(ticks, |_| {})
    }

    /// Like `run`, handing every report to `on_tick` as it is produced
    pub fn run_with<F: FnMut(&TickReport)>(&mut self, ticks: u64, mut on_tick: F) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            let report = self.tick();
            for event in &report.events {
                tracing::trace!(tick = report.tick, ?event, "Game event");
            }
            summary.record(&report);
            on_tick(&report);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TacticsConfig;
    use crate::game::kinematics::Kinematics;
    use crate::game::scenario::Scenario;
    use crate::game::spatial::{Layer, Shape, Tag, World};

    fn arena() -> World {
        let mut world = World::default();
        world.insert(
            Shape::Rect {
                min: Vec2::new(-40.0, -40.0),
                max: Vec2::new(40.0, 40.0),
            },
            Layer::Ground,
            Tag::Untagged,
        );
        world
    }

    fn game(seed: u64) -> GameLoop {
        GameLoop::new(
            Simulation::new(arena(), TacticsConfig::default(), seed),
            GameLoopConfig::default(),
        )
    }

    #[test]
    fn test_player_moves_with_velocity() {
        let mut game = game(1);
        game.state_mut().set_player(Vec2::ZERO, Vec2::new(1.0, 0.0));
        for _ in 0..50 {
            game.tick();
        }
        let position = game.state().player_position().unwrap_or_default();
        assert!(position.approx_eq(Vec2::new(1.0, 0.0), 1e-3));
        assert_eq!(game.state().tick, 50);
        assert!(game.tick().enemy_modes.is_empty());
    }

    #[test]
    fn test_enemy_engages_and_collider_follows() {
        let mut game = game(3);
        game.state_mut().set_player(Vec2::new(0.0, 10.0), Vec2::ZERO);
        let id = game.state_mut().spawn_enemy(Vec2::new(0.0, -14.0), 0.0);

        let report = game.tick();
        assert_eq!(report.enemy_modes, vec![(id, TacticalMode::Engage)]);
        assert!(report.events.contains(&GameLoopEvent::ModeChanged {
            enemy: id,
            from: TacticalMode::Hold,
            to: TacticalMode::Engage,
        }));

        for _ in 0..300 {
            game.tick();
        }
        let state = game.state();
        let enemy = state.enemy(id).expect("enemy was spawned");
        let position = enemy.body.position();
        assert!(position.distance_to(Vec2::new(0.0, -14.0)) > 1.0);
        match state.world.get(enemy.collider).map(|c| c.shape) {
            Some(Shape::Circle { center, .. }) => assert!(center.approx_eq(position, 1e-4)),
            other => panic!("unexpected collider {:?}", other),
        }
    }

    #[test]
    fn test_turret_acquires_and_fires() {
        let mut game = game(5);
        game.state_mut().set_player(Vec2::new(0.0, 6.0), Vec2::ZERO);
        let id = game.state_mut().spawn_turret(Vec2::ZERO, 0.0);

        let summary = game.run(200);
        assert!(summary.turret_transitions >= 1);
        assert!(summary.shots_fired > 0);
        let turret = game.state().turret(id).map(|t| (t.ai.state(), t.weapon.fired));
        assert_eq!(turret, Some((TurretState::Tracking, summary.shots_fired)));
    }

    #[test]
    fn test_wall_hides_player_from_turret() {
        let mut game = game(5);
        game.state_mut().world.insert(
            Shape::Rect {
                min: Vec2::new(-3.0, 2.0),
                max: Vec2::new(3.0, 3.0),
            },
            Layer::Wall,
            Tag::Untagged,
        );
        game.state_mut().set_player(Vec2::new(0.0, 6.0), Vec2::ZERO);
        game.state_mut().spawn_turret(Vec2::ZERO, 0.0);

        let summary = game.run(200);
        assert_eq!(summary.shots_fired, 0);
        assert_eq!(summary.turret_transitions, 0);
    }

    #[test]
    fn test_seeded_runs_match() {
        let run = |seed: u64| {
            let mut game = game(seed);
            game.state_mut().set_player(Vec2::new(4.0, 9.0), Vec2::new(0.5, 0.0));
            game.state_mut().spawn_enemy(Vec2::new(-6.0, -8.0), 45.0);
            game.state_mut().spawn_enemy(Vec2::new(8.0, -8.0), 315.0);
            game.state_mut().spawn_turret(Vec2::new(0.0, 0.0), 0.0);
            let summary = game.run(400);
            let bodies: Vec<_> = game.state().enemies_in_order().map(|e| e.body).collect();
            (summary, bodies)
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_no_player_means_quiet() {
        let mut game = game(9);
        game.state_mut().spawn_enemy(Vec2::new(2.0, 2.0), 0.0);
        game.state_mut().spawn_turret(Vec2::new(-2.0, -2.0), 0.0);
        let summary = game.run(100);
        assert_eq!(summary, RunSummary { ticks: 100, ..Default::default() });
    }

    #[test]
    fn test_demo_scenario_has_activity() {
        let scenario = Scenario::demo();
        let simulation = scenario.build().expect("demo is valid");
        let spawns: Vec<_> = simulation.enemies_in_order().map(|e| (e.id, e.body.position())).collect();
        assert_eq!(spawns.len(), 3);

        let mut game = GameLoop::new(simulation, GameLoopConfig::default());
        let summary = game.run(sim::DEFAULT_TICKS);
        assert_eq!(summary.ticks, sim::DEFAULT_TICKS);
        assert!(summary.mode_changes >= 1);

        let moved = spawns.iter().filter(|(id, spawn)| {
            game.state()
                .enemy(*id)
                .map_or(false, |enemy| enemy.body.position().distance_to(*spawn) > 0.5)
        });
        assert!(moved.count() >= 1);
    }

    #[test]
    fn test_run_with_sees_every_report() {
        let mut game = game(7);
        game.state_mut().set_player(Vec2::new(0.0, 10.0), Vec2::ZERO);
        game.state_mut().spawn_enemy(Vec2::new(0.0, -10.0), 0.0);

        let mut ticks = Vec::new();
        let mut changes = 0;
        let summary = game.run_with(20, |report| {
            ticks.push(report.tick);
            changes += report
                .events
                .iter()
                .filter(|e| matches!(e, GameLoopEvent::ModeChanged { .. }))
                .count() as u64;
        });
        assert_eq!(ticks, (1..=20).collect::<Vec<u64>>());
        assert_eq!(changes, summary.mode_changes);
    }

    #[test]
    fn test_tick_report_serializes_as_json() {
        let mut game = game(3);
        game.state_mut().set_player(Vec2::new(0.0, 10.0), Vec2::ZERO);
        let id = game.state_mut().spawn_enemy(Vec2::new(0.0, -14.0), 0.0);

        let report = game.tick();
        let json = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(json["tick"], 1);
        assert_eq!(json["enemy_modes"][0][0], id.to_string());
        assert_eq!(json["enemy_modes"][0][1], "engage");
        assert_eq!(json["events"][0]["event"], "mode_changed");
        assert_eq!(json["events"][0]["from"], "hold");
        assert_eq!(json["events"][0]["enemy"], id.to_string());
    }
}
