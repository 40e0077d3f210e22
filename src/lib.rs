#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod resources;
pub mod assets;
pub mod scene;
pub mod renderer;
pub mod engine;
pub mod app;
pub mod errors;
pub mod utils;
pub mod animation;

pub use resources::{Mesh, Material, MeshBasicMaterial, MeshStandardMaterial, PointsMaterial, Texture, Image, Geometry};
pub use resources::primitives::*;
pub use assets::{AssetServer, ColorSpace};
pub use scene::{Node, Scene, Camera, Light, LightKind, Environment, Fog};
pub use renderer::{Renderer, RendererSettings};
pub use engine::{Engine, FrameState};
pub use app::{App, AppHandler, Input};
pub use errors::GloamError;
pub use utils::orbit_control::OrbitControls;
pub use animation::{Flythrough, LightCycle, ScatterField};
