//! Tank Tactics
//!
//! Tactical AI for tank enemies and stationary turrets: candidate stand-off
//! positions, obstacle-aware navigation, yaw rotation and a scan/track turret,
//! driven by a headless fixed-step simulation.
//!
//! Every component receives its collaborators explicitly. Spatial questions go
//! through [`game::spatial::SpatialQuery`]; movement goes through
//! [`game::kinematics::Kinematics`].

pub mod config;
pub mod util;
pub mod game;
