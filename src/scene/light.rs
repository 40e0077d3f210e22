use glam::Vec3;

/// Shadow map parameters for a single light.
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            normal_bias: 0.02,
            map_size: 1024,
        }
    }
}

/// Light variant data.
///
/// Directional lights shine along the node's -Z axis; point and spot lights
/// use the node's world position, spots additionally the -Z direction. Cone
/// angles are in radians.
#[derive(Debug, Clone)]
pub enum LightKind {
    Directional,
    Point {
        range: f32,
    },
    Spot {
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    },
}

/// Light component in the scene.
#[derive(Debug, Clone)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub cast_shadows: bool,
    pub shadow: Option<ShadowConfig>,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional,
            cast_shadows: false,
            shadow: Some(ShadowConfig::default()),
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { range },
            cast_shadows: false,
            shadow: Some(ShadowConfig::default()),
        }
    }

    #[must_use]
    pub fn new_spot(
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot {
                range,
                inner_cone,
                outer_cone,
            },
            cast_shadows: false,
            shadow: Some(ShadowConfig::default()),
        }
    }

    /// Builder-style toggle for shadow casting.
    #[must_use]
    pub fn with_shadows(mut self) -> Self {
        self.cast_shadows = true;
        self
    }
}
