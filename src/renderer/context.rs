//! WGPU device and surface bootstrap.

use std::sync::Arc;
use winit::window::Window;

use crate::errors::{GloamError, Result};
use crate::renderer::settings::RendererSettings;

/// Owns the GPU handles every other renderer subsystem borrows:
/// instance, adapter, device, queue, surface, and the depth buffer.
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    pub depth_format: wgpu::TextureFormat,
    depth_view: wgpu::TextureView,
}

impl WgpuContext {
    pub async fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        settings: &RendererSettings,
    ) -> Result<Self> {
        let instance = match settings.backends {
            Some(backends) => wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends,
                ..wgpu::InstanceDescriptor::new_without_display_handle()
            }),
            None => wgpu::Instance::default(),
        };
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GloamError::AdapterRequestFailed(e.to_string()))?;

        log::info!("Selected adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Gloam Device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| {
                GloamError::AdapterRequestFailed("surface is incompatible with the adapter".into())
            })?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        surface.configure(&device, &config);

        let depth_format = settings.depth_format;
        let depth_view = Self::create_depth_texture(&device, &config, depth_format);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_format,
            depth_view,
        })
    }

    /// Reconfigures the surface and rebuilds the depth buffer.
    ///
    /// Zero-sized requests (minimized window) are ignored; the old
    /// configuration stays in place until a real size arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_texture(&self.device, &self.config, self.depth_format);
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        format: wgpu::TextureFormat,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Current surface size in physical pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
