//! CPU-side resource definitions.
//!
//! Data structures the renderer consumes, with no GPU state of their own:
//! meshes, materials, textures, images, geometry, and the built-in
//! primitive generators.

pub mod geometry;
pub mod image;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod texture;

pub use geometry::{Attribute, BoundingBox, BoundingSphere, Geometry};
pub use image::Image;
pub use material::{
    Material, MaterialData, MeshBasicMaterial, MeshStandardMaterial, PointsMaterial,
};
pub use mesh::Mesh;
pub use primitives::{
    ConeOptions, PlaneOptions, SphereOptions, create_box, create_cone, create_plane,
    create_points, create_sphere,
};
pub use texture::{Texture, TextureSampler, TextureTransform};
