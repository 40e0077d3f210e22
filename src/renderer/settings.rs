//! Renderer Settings
//!
//! Startup configuration for the renderer: GPU selection, presentation,
//! and the shadow map budget.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gloam::renderer::RendererSettings;
//!
//! // Defaults: vsync on, discrete GPU preferred, 4 shadow layers
//! let settings = RendererSettings::default();
//!
//! // Battery-friendly setup without shadows
//! let mobile = RendererSettings {
//!     power_preference: wgpu::PowerPreference::LowPower,
//!     max_shadow_casters: 0,
//!     ..Default::default()
//! };
//! ```

/// Global configuration for renderer initialization.
///
/// Consumed once when the renderer is created. Everything here is fixed for
/// the lifetime of the GPU context; per-frame state (background color, fog)
/// lives on the scene instead.
///
/// # Fields
///
/// | Field                | Description                               | Default           |
/// |----------------------|-------------------------------------------|-------------------|
/// | `vsync`              | Vertical sync enabled                     | `true`            |
/// | `backends`           | Forced wgpu backend set                   | `None` (auto)     |
/// | `power_preference`   | GPU adapter selection strategy            | `HighPerformance` |
/// | `clear_color`        | Fallback framebuffer clear color          | Black (0,0,0,1)   |
/// | `required_features`  | wgpu features the adapter must support    | empty             |
/// | `required_limits`    | wgpu limits requested from the device     | `default()`       |
/// | `depth_format`       | Depth buffer texture format               | `Depth32Float`    |
/// | `max_pixel_ratio`    | Device pixel ratio ceiling                | `2.0`             |
/// | `shadow_map_size`    | Shadow map resolution per light (px)      | `1024`            |
/// | `max_shadow_casters` | Shadow map array layers                   | `4`               |
#[derive(Debug, Clone)]
pub struct RendererSettings {
    // === Presentation ===
    /// Enable vertical synchronization (VSync).
    ///
    /// When `true`, the frame rate is capped to the display refresh rate,
    /// reducing screen tearing and power consumption.
    /// When `false`, the frame rate is uncapped, which may cause tearing
    /// but reduces input latency.
    pub vsync: bool,

    // === GPU / Backend Configuration ===
    /// Force a specific wgpu backend (Vulkan, Metal, DX12, ...).
    ///
    /// `None` lets wgpu choose the best available backend for the platform.
    /// Override this only when debugging backend-specific issues.
    pub backends: Option<wgpu::Backends>,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features that must be supported by the adapter.
    ///
    /// Initialization fails if these features are unavailable.
    pub required_features: wgpu::Features,

    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,

    /// Depth buffer texture format for the main pass. The shadow map
    /// always uses `Depth32Float` regardless.
    pub depth_format: wgpu::TextureFormat,

    /// Background clear color for the main render target.
    ///
    /// Used when the active scene does not set its own background.
    pub clear_color: wgpu::Color,

    /// Upper bound applied to the window's device pixel ratio.
    ///
    /// Retina-class displays report ratios of 3.0 and above; rendering at
    /// full density there burns fill rate for no visible gain. The surface
    /// is sized with `ratio.min(max_pixel_ratio)`.
    pub max_pixel_ratio: f32,

    // === Shadows ===
    /// Shadow map resolution (square, per light).
    pub shadow_map_size: u32,

    /// Number of layers in the shadow map array.
    ///
    /// Each shadow-casting directional or spot light claims one layer;
    /// lights beyond this count render unshadowed. `0` disables shadow
    /// rendering entirely.
    pub max_shadow_casters: u32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            backends: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            max_pixel_ratio: 2.0,
            shadow_map_size: 1024,
            max_shadow_casters: 4,
        }
    }
}
