pub mod candidates;
pub mod scoring;
pub mod selection;
pub mod targeting;
pub mod obstacles;
pub mod rotation;
pub mod navigation;
pub mod turret;
pub mod behavior_tree;
pub mod brain;
pub mod ai;
