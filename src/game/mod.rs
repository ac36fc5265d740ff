pub mod constants;
pub mod state;
pub mod systems;
pub mod game_loop;
pub mod scenario;
pub mod spatial;
pub mod kinematics;
pub mod timer;
