use glam::{Affine3A, Mat4, Vec3, Vec4};

/// Perspective camera component.
///
/// Holds projection parameters plus cached view/projection matrices. The view
/// matrix is derived from the owning node's world matrix by the transform
/// system; the projection matrix is rebuilt whenever a parameter changes.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    // Cached matrices, read by the renderer.
    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
    pub(crate) frustum: Frustum,
}

impl Camera {
    /// Creates a perspective camera. `fov` is in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov: fov.to_radians(),
            aspect,
            near,
            far,

            world_matrix: Affine3A::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };

        cam.update_projection_matrix();
        cam
    }

    /// Updates the aspect ratio, rebuilding the projection only on change.
    ///
    /// Called on viewport resize; repeated notifications with the same size
    /// are no-ops.
    pub fn set_aspect(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    pub fn update_projection_matrix(&mut self) {
        // glam's perspective_rh targets the WGPU/Vulkan depth range (0 to 1).
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;

        // View matrix is the world matrix inverse.
        self.view_matrix = Mat4::from(*world_transform).inverse();

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;

        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    /// Camera position in world space.
    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    /// Extracts the six frustum planes from a view-projection matrix.
    ///
    /// Gribb-Hartmann extraction, adjusted for the WGPU NDC depth range of
    /// [0, 1]: the near plane is row 3 alone, the far plane row 4 minus
    /// row 3.
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [Vec4::ZERO; 6];

        // Left:   row4 + row1
        planes[0] = rows[3] + rows[0];
        // Right:  row4 - row1
        planes[1] = rows[3] - rows[0];
        // Bottom: row4 + row2
        planes[2] = rows[3] + rows[1];
        // Top:    row4 - row2
        planes[3] = rows[3] - rows[1];
        // Near / Far for [0, 1] depth:
        planes[4] = rows[2];
        planes[5] = rows[3] - rows[2];

        // Normalize
        for plane in &mut planes {
            let length = Vec3::new(plane.x, plane.y, plane.z).length();
            *plane /= length;
        }

        Self { planes }
    }

    /// Sphere-frustum intersection test.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }
}
