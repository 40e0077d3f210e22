//! Scene graph module.
//!
//! Manages the scene hierarchy and its components:
//! - Node: scene node (hierarchy + transform)
//! - Transform: TRS component with cached matrices
//! - Scene: scene container and component pools
//! - Camera: perspective camera component
//! - Light: light component
//! - TransformSystem: decoupled matrix update system

pub mod camera;
pub mod environment;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use environment::{Environment, Fog};
pub use light::{Light, LightKind};
pub use node::Node;
pub use scene::{NodeBuilder, Scene};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct CameraKey;
    pub struct LightKey;
}
