//! Enemy tactical brain
//!
//! Decides where an enemy tank wants to be. A behavior tree picks the mode
//! each tick:
//!
//! - Engage while the target is visible: hold a candidate stand-off point,
//!   re-picked on a timer or on arrival
//! - Search after sight is lost: drive to the last-known position, peek there,
//!   then reposition around it until the search times out
//! - Hold otherwise
//!
//! The brain only produces a navigation target; the `Navigator` drives.

use rand::Rng;
use serde::Serialize;

use crate::config::{BrainConfig, TacticsConfig};
use crate::game::spatial::{ColliderId, LayerMask, SpatialQuery};
use crate::game::systems::behavior_tree::BehaviorNode;
use crate::game::systems::candidates::{CandidateGenerator, CandidateSet};
use crate::game::systems::scoring::{CandidateScorer, TacticalContext};
use crate::game::systems::selection::select_best;
use crate::game::systems::targeting::line_of_sight;
use crate::game::timer::Timer;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticalCondition {
    TargetVisible,
    HasLastKnown,
    SearchExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticalMode {
    Engage,
    Search,
    #[default]
    Hold,
}

pub type TacticalTree = BehaviorNode<TacticalCondition, TacticalMode>;

/// Selector[ Sequence[visible, Engage], Sequence[last-known, !expired, Search], Hold ]
pub fn tactical_tree() -> TacticalTree {
    use TacticalCondition::*;

    TacticalTree::selector(vec![
        TacticalTree::sequence(vec![
            TacticalTree::condition(TargetVisible),
            TacticalTree::action(TacticalMode::Engage),
        ]),
        TacticalTree::sequence(vec![
            TacticalTree::condition(HasLastKnown),
            TacticalTree::inverter(TacticalTree::condition(SearchExpired)),
            TacticalTree::action(TacticalMode::Search),
        ]),
        TacticalTree::action(TacticalMode::Hold),
    ])
}

/// What the enemy knows about itself and its target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub position: Vec2,
    pub heading: f32,
    pub collider: Option<ColliderId>,
    /// Target position, if a target exists at all
    pub target: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainOutput {
    pub mode: TacticalMode,
    pub navigation_target: Option<Vec2>,
    pub can_move: bool,
    /// A new candidate batch was generated this tick
    pub refreshed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peek {
    /// Still heading for the last-known position
    Pending,
    Peeking,
    Done,
}

#[derive(Debug, Clone)]
pub struct EnemyBrain {
    config: BrainConfig,
    tree: TacticalTree,
    generator: CandidateGenerator,
    scorer: CandidateScorer,
    blockers: LayerMask,
    mode: TacticalMode,
    last_known: Option<Vec2>,
    destination: Option<Vec2>,
    candidates: CandidateSet,
    refresh_timer: Timer,
    search_timer: Timer,
    peek_timer: Timer,
    peek: Peek,
}

impl EnemyBrain {
    pub fn new(config: &TacticsConfig) -> Self {
        Self {
            config: config.brain,
            tree: tactical_tree(),
            generator: CandidateGenerator::new(config.candidates),
            scorer: CandidateScorer::new(config.scoring),
            blockers: LayerMask::SIGHT_BLOCKERS,
            mode: TacticalMode::Hold,
            last_known: None,
            destination: None,
            candidates: CandidateSet::new(),
            refresh_timer: Timer::new(config.brain.refresh_interval),
            search_timer: Timer::new(config.brain.search_duration),
            peek_timer: Timer::new(config.brain.peek_duration),
            peek: Peek::Pending,
        }
    }

    pub fn mode(&self) -> TacticalMode {
        self.mode
    }

    pub fn last_known(&self) -> Option<Vec2> {
        self.last_known
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    /// Most recent scored candidate batch
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Whether the target is within sight range with nothing in between
    pub fn can_see<Q: SpatialQuery + ?Sized>(&self, query: &Q, perception: &Perception) -> bool {
        perception.target.is_some_and(|target| {
            perception.position.distance_to(target) <= self.config.sight_range
                && line_of_sight(query, perception.position, target, self.blockers)
        })
    }

    pub fn tick<Q, R>(&mut self, query: &Q, perception: &Perception, rng: &mut R, dt: f32) -> BrainOutput
    where
        Q: SpatialQuery + ?Sized,
        R: Rng + ?Sized,
    {
        let visible = self.can_see(query, perception);
        if visible {
            self.last_known = perception.target;
        }

        let search_expired = self.search_timer.finished();
        let has_last_known = self.last_known.is_some();
        let (_, action) = self.tree.evaluate(&mut |condition: &TacticalCondition| match condition {
            TacticalCondition::TargetVisible => visible,
            TacticalCondition::HasLastKnown => has_last_known,
            TacticalCondition::SearchExpired => search_expired,
        });
        let mode = action.unwrap_or_default();

        if mode != self.mode {
            tracing::debug!(from = ?self.mode, to = ?mode, last_known = ?self.last_known, "Tactical mode change");
            self.enter(mode);
        }

        let refreshed = match mode {
            TacticalMode::Engage => self.engage(query, perception, rng, dt),
            TacticalMode::Search => self.search(query, perception, rng, dt),
            TacticalMode::Hold => false,
        };

        BrainOutput {
            mode: self.mode,
            navigation_target: self.destination,
            can_move: self.destination.is_some() && self.peek != Peek::Peeking,
            refreshed,
        }
    }

    fn enter(&mut self, mode: TacticalMode) {
        self.mode = mode;
        self.refresh_timer.reset();
        self.peek = Peek::Pending;
        self.peek_timer.reset();
        self.destination = match mode {
            TacticalMode::Engage | TacticalMode::Hold => None,
            TacticalMode::Search => self.last_known,
        };
    }

    fn arrived(&self, position: Vec2) -> bool {
        self.destination
            .is_some_and(|destination| position.distance_to(destination) <= self.config.arrival_radius)
    }

    fn engage<Q, R>(&mut self, query: &Q, perception: &Perception, rng: &mut R, dt: f32) -> bool
    where
        Q: SpatialQuery + ?Sized,
        R: Rng + ?Sized,
    {
        self.search_timer.reset();
        let timer_elapsed = self.refresh_timer.tick(dt);

        if self.destination.is_none() || timer_elapsed || self.arrived(perception.position) {
            let ctx = TacticalContext {
                agent_position: perception.position,
                agent_heading: perception.heading,
                agent_collider: perception.collider,
                target: perception.target,
                last_known: self.last_known,
            };
            self.refresh(query, perception.position, &ctx, rng)
        } else {
            false
        }
    }

    fn search<Q, R>(&mut self, query: &Q, perception: &Perception, rng: &mut R, dt: f32) -> bool
    where
        Q: SpatialQuery + ?Sized,
        R: Rng + ?Sized,
    {
        if self.search_timer.tick(dt) {
            tracing::debug!(last_known = ?self.last_known, "Search expired");
            self.last_known = None;
            self.enter(TacticalMode::Hold);
            return false;
        }

        let Some(last_known) = self.last_known else {
            return false;
        };

        match self.peek {
            Peek::Pending => {
                if perception.position.distance_to(last_known) <= self.config.arrival_radius {
                    self.peek = Peek::Peeking;
                    self.peek_timer.reset();
                } else {
                    self.destination = Some(last_known);
                }
                false
            }
            Peek::Peeking => {
                if !self.peek_timer.tick(dt) {
                    return false;
                }
                self.peek = Peek::Done;
                self.refresh_timer.reset();
                self.refresh_around_last_known(query, perception, last_known, rng)
            }
            Peek::Done => {
                let timer_elapsed = self.refresh_timer.tick(dt);
                if self.destination.is_none() || timer_elapsed || self.arrived(perception.position) {
                    self.refresh_around_last_known(query, perception, last_known, rng)
                } else {
                    false
                }
            }
        }
    }

    fn refresh_around_last_known<Q, R>(&mut self, query: &Q, perception: &Perception, last_known: Vec2, rng: &mut R) -> bool
    where
        Q: SpatialQuery + ?Sized,
        R: Rng + ?Sized,
    {
        let ctx = TacticalContext {
            agent_position: perception.position,
            agent_heading: perception.heading,
            agent_collider: perception.collider,
            target: None,
            last_known: Some(last_known),
        };
        self.refresh(query, last_known, &ctx, rng)
    }

    /// Generate, score and select a new destination around `anchor`.
    /// With no reference point this is a no-op.
    fn refresh<Q, R>(&mut self, query: &Q, anchor: Vec2, ctx: &TacticalContext, rng: &mut R) -> bool
    where
        Q: SpatialQuery + ?Sized,
        R: Rng + ?Sized,
    {
        if ctx.reference_point().is_none() {
            return false;
        }

        let mut batch = self.generator.generate(query, anchor);
        self.scorer.score_all(query, &mut batch, ctx);
        let picked = select_best(&batch, rng).copied();

        tracing::debug!(
            candidates = batch.len(),
            score = picked.map(|c| c.score),
            destination = ?picked.map(|c| c.position),
            "Candidate refresh"
        );

        // Nothing inside the stand-off band: close in on the reference point
        self.destination = match picked {
            Some(candidate) if candidate.score > 0 => Some(candidate.position),
            Some(_) => ctx.reference_point(),
            None => None,
        };
        self.candidates = batch;
        self.refresh_timer.reset();
        true
    }
}
