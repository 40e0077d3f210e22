//! Frame-loop utilities.
//!
//! - [`OrbitControls`]: mouse-driven camera orbiting
//! - [`FpsCounter`]: windowed frame rate averaging
//! - [`Timer`]: the per-frame clock

pub mod fps_counter;
pub mod orbit_control;
pub mod time;

pub use fps_counter::FpsCounter;
pub use orbit_control::OrbitControls;
pub use time::Timer;
