//! Engine Core Module
//!
//! This module contains [`Engine`], the coordinator that ties the renderer,
//! the scene graph, and the asset server together. It holds no window
//! management logic; a frontend (the winit [`App`](crate::app::App), tests,
//! or an offscreen driver) owns the event loop and drives the engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use gloam::{Engine, RendererSettings};
//!
//! let mut engine = Engine::new(window, 1280, 720, RendererSettings::default()).await?;
//!
//! // Main loop
//! loop {
//!     engine.update(dt);
//!     engine.render()?;
//! }
//! ```

use std::sync::Arc;
use winit::window::Window;

use crate::assets::AssetServer;
use crate::errors::Result;
use crate::renderer::{Renderer, RendererSettings};
use crate::scene::Scene;

/// The engine instance orchestrating all subsystems.
///
/// # Components
///
/// - `renderer`: GPU context, resource caches, and the frame loop
/// - `scene`: the node hierarchy with mesh/camera/light components
/// - `assets`: shared storage for geometries, materials, and textures
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`] (needs a window for the surface)
/// 2. Advance the clock each frame with [`Engine::update`]
/// 3. Draw with [`Engine::render`]
/// 4. Forward window size changes to [`Engine::resize`]
pub struct Engine {
    pub renderer: Renderer,
    pub scene: Scene,
    pub assets: AssetServer,

    max_pixel_ratio: f32,
    time: f32,
    frame_count: u64,
}

impl Engine {
    /// Creates the engine and initializes the GPU context on `window`.
    ///
    /// `width` and `height` are the initial surface size in physical
    /// pixels.
    ///
    /// # Errors
    ///
    /// Fails when no compatible adapter is found, the device request is
    /// rejected, or the surface cannot be configured.
    pub async fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        settings: RendererSettings,
    ) -> Result<Self> {
        let max_pixel_ratio = settings.max_pixel_ratio;
        let renderer = Renderer::new(window, width, height, settings).await?;

        Ok(Self {
            renderer,
            scene: Scene::new(),
            assets: AssetServer::new(),
            max_pixel_ratio,
            time: 0.0,
            frame_count: 0,
        })
    }

    /// Total elapsed time in seconds since the engine started.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of completed update steps.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Current surface size in physical pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.renderer.size()
    }

    /// Advances the engine clock. Call once per frame before rendering.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;
    }

    /// Renders the scene through its active camera.
    pub fn render(&mut self) -> Result<()> {
        self.renderer
            .render(&mut self.scene, &self.assets, self.time)
    }

    /// Handles a window resize.
    ///
    /// `width`/`height` are physical pixels, `scale_factor` the window's
    /// device pixel ratio. Ratios above the configured ceiling are clamped
    /// by shrinking the surface, so high-density displays do not pay for
    /// pixels nobody can see. The active camera's aspect ratio follows the
    /// window. Repeated calls with the same size are no-ops.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        let (surface_width, surface_height) =
            surface_size(width, height, scale_factor, self.max_pixel_ratio);
        self.renderer.resize(surface_width, surface_height);

        if width > 0 && height > 0 {
            self.update_camera_aspect(width as f32 / height as f32);
        }
    }

    fn update_camera_aspect(&mut self, aspect: f32) {
        let Some(camera_key) = self
            .scene
            .active_camera
            .and_then(|handle| self.scene.nodes.get(handle))
            .and_then(|node| node.camera)
        else {
            return;
        };
        if let Some(camera) = self.scene.cameras.get_mut(camera_key) {
            camera.set_aspect(aspect);
        }
    }
}

/// Surface size for a window of `width`x`height` physical pixels on a
/// display with the given device pixel ratio.
///
/// Ratios above `max_pixel_ratio` shrink the surface proportionally;
/// ratios at or below it pass the window size through unchanged.
fn surface_size(width: u32, height: u32, scale_factor: f32, max_pixel_ratio: f32) -> (u32, u32) {
    let scale = if scale_factor > max_pixel_ratio && scale_factor > 0.0 {
        max_pixel_ratio / scale_factor
    } else {
        1.0
    };
    (
        ((width as f32) * scale).round() as u32,
        ((height as f32) * scale).round() as u32,
    )
}

/// Per-frame timing snapshot passed to the application update callback.
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Total elapsed time since startup (seconds).
    pub time: f32,
    /// Delta time since the last frame (seconds).
    pub dt: f32,
    /// Completed update steps since startup.
    pub frame_count: u64,
}

#[cfg(test)]
mod tests {
    use super::surface_size;

    #[test]
    fn surface_keeps_window_size_up_to_the_ratio_cap() {
        assert_eq!(surface_size(1280, 720, 1.0, 2.0), (1280, 720));
        assert_eq!(surface_size(2560, 1440, 2.0, 2.0), (2560, 1440));
    }

    #[test]
    fn surface_shrinks_past_the_ratio_cap() {
        // A 3x display renders at 2/3 the reported physical size.
        assert_eq!(surface_size(3840, 2160, 3.0, 2.0), (2560, 1440));
        assert_eq!(surface_size(3000, 1500, 4.0, 2.0), (1500, 750));
    }

    #[test]
    fn surface_ignores_degenerate_scale_factors() {
        assert_eq!(surface_size(800, 600, 0.0, 2.0), (800, 600));
        assert_eq!(surface_size(800, 600, -1.0, 2.0), (800, 600));
    }
}
