/// Simulation clock - matches a 50 Hz fixed physics step
pub mod sim {
    /// Fixed tick rate in Hz
    pub const TICK_RATE: u32 = 50;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / TICK_RATE as f32;
    /// Default number of ticks the CLI runs for
    pub const DEFAULT_TICKS: u64 = 600;
    /// Seed used when a scenario does not provide one
    pub const DEFAULT_SEED: u64 = 0x7A4C_0FFE;
}

/// Candidate ring generation
pub mod candidate {
    /// Radius of the candidate ring around the anchor
    pub const RING_RADIUS: f32 = 6.0;
    /// Number of evenly spaced ring slots
    pub const COUNT: usize = 12;
    /// Upper bound on ring slots, one per degree
    pub const MAX_COUNT: usize = 360;
    /// Height above the candidate the ground probe starts from
    pub const GROUND_PROBE_HEIGHT: f32 = 2.0;
    /// Maximum downward distance the ground probe may travel
    pub const GROUND_PROBE_RANGE: f32 = 5.0;
    /// Radius of the wall overlap check around each candidate
    pub const WALL_CLEARANCE: f32 = 0.5;
}

/// Candidate scoring
pub mod scoring {
    /// Minimum acceptable distance from the target
    pub const MIN_DISTANCE: f32 = 5.0;
    /// Maximum acceptable distance from the target
    pub const MAX_DISTANCE: f32 = 15.0;
    /// Other hostile agents closer than this disqualify a candidate
    pub const HOSTILE_EXCLUSION_RADIUS: f32 = 2.0;
    /// Half-angle of the agent's forward cone
    pub const FORWARD_CONE_DEGREES: f32 = 60.0;
    /// Weighted policy: points available for distance
    pub const DISTANCE_WEIGHT: f32 = 80.0;
    /// Weighted policy: bonus for line of sight to the target
    pub const LOS_BONUS: u32 = 20;
    /// Weighted policy: floor for an in-range candidate
    pub const WEIGHTED_MIN: u32 = 1;
    /// Weighted policy: ceiling
    pub const WEIGHTED_MAX: u32 = 100;
}

/// Obstacle probe fan
pub mod probes {
    /// Length of the forward and inner probes
    pub const NEAR_DISTANCE: f32 = 1.5;
    /// Length of the outer probes
    pub const FAR_DISTANCE: f32 = 2.0;
    /// Yaw offset of the inner probes
    pub const INNER_ANGLE: f32 = 20.0;
    /// Yaw offset of the outer probes
    pub const OUTER_ANGLE: f32 = 60.0;
}

/// Yaw rotation
pub mod rotation {
    /// Maximum turn rate in degrees per second
    pub const ANGULAR_SPEED: f32 = 120.0;
    /// Remaining angle at which a turn is considered complete
    pub const EPSILON: f32 = 0.01;
    /// Facing error below which the agent does not turn toward its target
    pub const FACING_DEADZONE: f32 = 1.0;
    /// Squared length below which a direction vector is treated as zero
    pub const DEGENERATE_DIRECTION_SQ: f32 = 0.0001;
}

/// Navigation
pub mod navigation {
    /// Forward speed in units per second
    pub const MOVE_SPEED: f32 = 5.0;
    /// Relative turn when forward is blocked and one side is clear
    pub const AVOID_TURN: f32 = 45.0;
    /// Relative turn when forward and both far probes are blocked
    pub const BLOCKED_TURN: f32 = 90.0;
    /// Headings used for wall-following snap
    pub const ALLOWED_HEADINGS: [f32; 8] = [45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0, 360.0];
}

/// Stationary turrets
pub mod turret {
    /// Half-width of the scan arc around the start angle
    pub const SCAN_ANGLE: f32 = 60.0;
    /// Sweep speed in degrees per second
    pub const SCAN_SPEED: f32 = 30.0;
    /// Tracking speed in degrees per second
    pub const TRACK_SPEED: f32 = 30.0;
    /// Fire when the angular error is below this
    pub const FIRE_ALIGNMENT: f32 = 10.0;
    /// Arrival tolerance when returning to the start angle
    pub const RETURN_TOLERANCE: f32 = 0.1;
    /// Detection range of the turret targeting system
    pub const DETECTION_RANGE: f32 = 10.0;
    /// Half-angle of the turret detection cone
    pub const DETECTION_ANGLE: f32 = 45.0;
    /// Sphere-cast radius used to avoid shooting through allies
    pub const FRIENDLY_RADIUS: f32 = 0.5;
}

/// Enemy tactical brain
pub mod brain {
    /// Seconds between candidate refreshes while engaging
    pub const REFRESH_INTERVAL: f32 = 2.0;
    /// Seconds an enemy searches after losing sight of its target
    pub const SEARCH_DURATION: f32 = 8.0;
    /// Seconds spent holding still at the last-known position
    pub const PEEK_DURATION: f32 = 1.5;
    /// Distance at which a destination counts as reached
    pub const ARRIVAL_RADIUS: f32 = 0.75;
    /// Enemies cannot see further than this
    pub const SIGHT_RANGE: f32 = 25.0;
}

/// Reference world
pub mod world {
    /// Spatial hash cell size in world units
    pub const GRID_CELL_SIZE: f32 = 4.0;
    /// Radius of agent colliders registered by the simulation
    pub const AGENT_RADIUS: f32 = 0.5;
    /// Colliders or query boxes spanning more cells than this skip the grid
    pub const MAX_INDEXED_CELLS: u64 = 1024;
    /// Scenario coordinates must lie within +/- this on both axes
    pub const MAX_EXTENT: f32 = 10_000.0;
}
