//! Candidate stand-off positions
//!
//! A ring of evenly spaced points around an anchor, each kept only if there
//! is ground beneath it and no wall within the clearance radius. Failed slots
//! are dropped, never replaced, so a batch may hold fewer than `count`.

use smallvec::SmallVec;
use std::f32::consts::TAU;

use crate::config::CandidateConfig;
use crate::game::spatial::{LayerMask, SpatialQuery};
use crate::util::vec2::Vec2;

/// One regeneration cycle's worth of candidates
pub type CandidateSet = SmallVec<[Candidate; 16]>;

/// A proposed stand-off point and its tactical evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Vec2,
    /// Ring slot this candidate was generated for
    pub slot: usize,
    pub score: u32,
    pub has_line_of_sight: bool,
    pub nearest_to_last_known: bool,
}

impl Candidate {
    pub fn new(position: Vec2, slot: usize) -> Self {
        Self {
            position,
            slot,
            score: 0,
            has_line_of_sight: false,
            nearest_to_last_known: false,
        }
    }
}

/// Generates validated candidate rings
#[derive(Debug, Clone, Copy)]
pub struct CandidateGenerator {
    config: CandidateConfig,
    ground_mask: LayerMask,
    wall_mask: LayerMask,
}

impl CandidateGenerator {
    pub fn new(config: CandidateConfig) -> Self {
        Self {
            config,
            ground_mask: LayerMask::GROUND,
            wall_mask: LayerMask::WALL,
        }
    }

    pub fn with_masks(mut self, ground_mask: LayerMask, wall_mask: LayerMask) -> Self {
        self.ground_mask = ground_mask;
        self.wall_mask = wall_mask;
        self
    }

    pub fn config(&self) -> &CandidateConfig {
        &self.config
    }

    /// Ring slot position before validation
    pub fn slot_position(anchor: Vec2, radius: f32, slot: usize, count: usize) -> Vec2 {
        let angle = slot as f32 * TAU / count as f32;
        anchor + Vec2::from_angle(angle) * radius
    }

    /// Generate the configured ring around `anchor`
    pub fn generate<Q: SpatialQuery + ?Sized>(&self, query: &Q, anchor: Vec2) -> CandidateSet {
        self.generate_ring(query, anchor, self.config.ring_radius, self.config.count)
    }

    pub fn generate_ring<Q: SpatialQuery + ?Sized>(
        &self,
        query: &Q,
        anchor: Vec2,
        radius: f32,
        count: usize,
    ) -> CandidateSet {
        if count == 0 {
            return CandidateSet::new();
        }

        (0..count)
            .map(|slot| (slot, Self::slot_position(anchor, radius, slot, count)))
            .filter(|&(_, position)| self.is_valid(query, position))
            .map(|(slot, position)| Candidate::new(position, slot))
            .collect()
    }

    /// Ground beneath and no wall within the clearance radius
    pub fn is_valid<Q: SpatialQuery + ?Sized>(&self, query: &Q, position: Vec2) -> bool {
        let grounded = query
            .ground_probe(
                position,
                self.config.ground_probe_height,
                self.config.ground_probe_range,
                self.ground_mask,
            )
            .is_some();
        if !grounded {
            return false;
        }

        query
            .overlap_sphere(position, self.config.wall_clearance, self.wall_mask)
            .is_empty()
    }
}
