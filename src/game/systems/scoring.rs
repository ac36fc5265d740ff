//! Candidate scoring
//!
//! Two interchangeable policies. Both treat the [min, max] distance band as a
//! gate: a candidate outside it scores 0 whatever else is true of it.

use crate::config::{ScoringConfig, ScoringPolicy};
use crate::game::constants::scoring::{DISTANCE_WEIGHT, LOS_BONUS, WEIGHTED_MAX, WEIGHTED_MIN};
use crate::game::spatial::{ColliderId, LayerMask, SpatialQuery};
use crate::game::systems::candidates::Candidate;
use crate::game::systems::targeting::line_of_sight;
use crate::util::vec2::Vec2;

/// What the scorer knows about the agent and its target this cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalContext {
    pub agent_position: Vec2,
    pub agent_heading: f32,
    /// Excluded from the hostile proximity check
    pub agent_collider: Option<ColliderId>,
    /// Live target position, when the target is currently known
    pub target: Option<Vec2>,
    /// Where the target was last seen, when it is not visible
    pub last_known: Option<Vec2>,
}

impl TacticalContext {
    /// Point distances are measured from: live position, else last-known
    pub fn reference_point(&self) -> Option<Vec2> {
        self.target.or(self.last_known)
    }
}

/// Assigns scores to a candidate batch
#[derive(Debug, Clone, Copy)]
pub struct CandidateScorer {
    config: ScoringConfig,
    blockers: LayerMask,
    hostiles: LayerMask,
}

impl CandidateScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            blockers: LayerMask::SIGHT_BLOCKERS,
            hostiles: LayerMask::ENEMY,
        }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.config.policy
    }

    /// Score every candidate in place
    pub fn score_all<Q: SpatialQuery + ?Sized>(&self, query: &Q, candidates: &mut [Candidate], ctx: &TacticalContext) {
        let nearest = ctx.last_known.and_then(|last| nearest_index(candidates, last));

        for (idx, candidate) in candidates.iter_mut().enumerate() {
            candidate.has_line_of_sight = ctx
                .target
                .map(|target| line_of_sight(query, candidate.position, target, self.blockers))
                .unwrap_or(false);
            candidate.nearest_to_last_known = nearest == Some(idx);

            candidate.score = match self.config.policy {
                ScoringPolicy::Binary => self.binary_score(query, candidate, ctx),
                ScoringPolicy::Weighted => self.weighted_score(candidate, ctx),
            };
        }
    }

    fn in_range(&self, distance: f32) -> bool {
        distance >= self.config.min_distance && distance <= self.config.max_distance
    }

    /// +1 per satisfied criterion, 0-6
    fn binary_score<Q: SpatialQuery + ?Sized>(&self, query: &Q, candidate: &Candidate, ctx: &TacticalContext) -> u32 {
        let Some(reference) = ctx.reference_point() else {
            return 0;
        };
        if !self.in_range(candidate.position.distance_to(reference)) {
            return 0;
        }

        let sees_agent = line_of_sight(query, candidate.position, ctx.agent_position, self.blockers);

        let offset = candidate.position - ctx.agent_position;
        let in_forward_cone = offset.length_sq() > f32::EPSILON
            && Vec2::from_heading(ctx.agent_heading).angle_between(offset) <= self.config.forward_cone_degrees
            && sees_agent;

        let clear_of_hostiles = query
            .overlap_sphere(candidate.position, self.config.hostile_exclusion_radius, self.hostiles)
            .into_iter()
            .all(|id| Some(id) == ctx.agent_collider);

        [
            candidate.has_line_of_sight,
            sees_agent,
            true,
            in_forward_cone,
            clear_of_hostiles,
            candidate.nearest_to_last_known,
        ]
        .into_iter()
        .filter(|&satisfied| satisfied)
        .count() as u32
    }

    /// Distance-to-ideal weighting plus a sight bonus, 1-100 in range
    fn weighted_score(&self, candidate: &Candidate, ctx: &TacticalContext) -> u32 {
        let Some(reference) = ctx.reference_point() else {
            return 0;
        };
        let distance = candidate.position.distance_to(reference);
        if !self.in_range(distance) {
            return 0;
        }

        let ideal = self.config.ideal_distance();
        let closeness = if ideal > 0.0 {
            1.0 - (distance - ideal).abs() / ideal
        } else {
            1.0
        };
        let distance_points = (closeness.clamp(0.0, 1.0) * DISTANCE_WEIGHT).round() as u32;
        let sight_points = if candidate.has_line_of_sight { LOS_BONUS } else { 0 };

        (distance_points + sight_points).clamp(WEIGHTED_MIN, WEIGHTED_MAX)
    }
}

/// Index of the candidate closest to `point`; the first one wins ties
fn nearest_index(candidates: &[Candidate], point: Vec2) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, c)| {
            let d = c.position.distance_sq_to(point);
            match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((idx, d)),
            }
        })
        .map(|(idx, _)| idx)
}
