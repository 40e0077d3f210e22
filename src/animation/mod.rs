//! Scripted per-frame behaviors.
//!
//! Small self-contained drivers that the frame loop ticks with elapsed
//! time: a one-shot camera ride, a periodic light toggle, and one-time
//! prop scattering.

pub mod flythrough;
pub mod light_cycle;
pub mod scatter;

pub use flythrough::Flythrough;
pub use light_cycle::LightCycle;
pub use scatter::{Placement, ScatterField};
