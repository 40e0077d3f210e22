use crate::assets::{GeometryHandle, MaterialHandle};

/// Renderable component: a geometry/material pair plus shadow settings.
/// Visibility lives on the scene node that owns the mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,

    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            geometry,
            material,
            cast_shadows: true,
            receive_shadows: true,
        }
    }

    #[must_use]
    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadows = cast;
        self.receive_shadows = receive;
        self
    }
}
