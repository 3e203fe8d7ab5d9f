//! wgpu-backed graphics context for winit-hosted map views.
//!
//! `prepare` acquires instance/adapter/device once per context instance;
//! surface bindings are `wgpu::Surface` configurations that come and go with
//! the host window. Drawing engines share the device and queue through the
//! accessors and render into the surface before the engine presents.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context as _, Result};
use tracing::{debug, info};
use winit::window::Window;

use crate::context::{Dimensions, GraphicsContext, NativeSurface, SwapResult};
use crate::error::ContextError;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// A winit window acting as the platform drawing surface.
pub struct WindowSurface {
    window: Arc<Window>,
    id: u64,
    released: bool,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            id: NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed),
            released: false,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl NativeSurface for WindowSurface {
    fn surface_id(&self) -> u64 {
        self.id
    }

    fn is_valid(&self) -> bool {
        if self.released {
            return false;
        }
        // A zero-sized window cannot back a surface configuration yet.
        let size = self.window.inner_size();
        size.width > 0 && size.height > 0
    }

    fn release(&mut self) {
        self.released = true;
    }
}

struct GpuState {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

struct SurfaceBinding {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

/// Production [`GraphicsContext`] over wgpu.
pub struct WgpuContext {
    instance: wgpu::Instance,
    gpu: Option<GpuState>,
    binding: Option<SurfaceBinding>,
}

impl WgpuContext {
    pub fn new() -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self {
            instance,
            gpu: None,
            binding: None,
        }
    }

    /// Device shared with the drawing engine; present after `prepare`.
    pub fn device(&self) -> Option<&wgpu::Device> {
        self.gpu.as_ref().map(|g| &g.device)
    }

    pub fn queue(&self) -> Option<&wgpu::Queue> {
        self.gpu.as_ref().map(|g| &g.queue)
    }

    /// Current surface texture format, once a binding exists.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.binding.as_ref().map(|b| b.config.format)
    }

    fn init_gpu(&self) -> Result<GpuState> {
        let adapter = pollster::block_on(self.instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            },
        ))
        .context("no suitable GPU adapter")?;

        info!("using GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("maprender device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Default::default()
        }))
        .context("failed to acquire GPU device")?;

        Ok(GpuState {
            adapter,
            device,
            queue,
        })
    }
}

impl Default for WgpuContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for WgpuContext {
    type Surface = WindowSurface;

    fn prepare(&mut self) -> Result<(), ContextError> {
        if self.gpu.is_some() {
            return Ok(());
        }
        match self.init_gpu() {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                Ok(())
            }
            Err(e) => Err(ContextError::Unsupported(format!("{e:#}"))),
        }
    }

    fn create_surface_binding(
        &mut self,
        surface: &WindowSurface,
        dims: Dimensions,
    ) -> Result<(), ContextError> {
        let gpu = self
            .gpu
            .as_ref()
            .ok_or_else(|| ContextError::SurfaceUnready("context not prepared".into()))?;

        let raw = self
            .instance
            .create_surface(Arc::clone(surface.window()))
            .map_err(|e| ContextError::SurfaceUnready(e.to_string()))?;

        let caps = raw.get_capabilities(&gpu.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| ContextError::SurfaceUnready("no supported surface format".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: dims.width.max(1),
            height: dims.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        raw.configure(&gpu.device, &config);
        debug!(?format, dims.width, dims.height, "surface binding configured");

        self.binding = Some(SurfaceBinding {
            surface: raw,
            config,
        });
        Ok(())
    }

    fn has_surface_binding(&self) -> bool {
        self.binding.is_some()
    }

    fn make_current(&mut self) -> bool {
        // wgpu contexts are not thread-affine; current just means usable.
        self.gpu.is_some() && self.binding.is_some()
    }

    fn make_nothing_current(&mut self) {}

    fn reconfigure(&mut self, dims: Dimensions) {
        if let (Some(gpu), Some(binding)) = (self.gpu.as_ref(), self.binding.as_mut()) {
            binding.config.width = dims.width.max(1);
            binding.config.height = dims.height.max(1);
            binding.surface.configure(&gpu.device, &binding.config);
        }
    }

    fn swap_buffers(&mut self) -> SwapResult {
        let Some(binding) = self.binding.as_ref() else {
            return SwapResult::Other(-1);
        };
        match binding.surface.get_current_texture() {
            Ok(frame) => {
                frame.present();
                SwapResult::Success
            }
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::OutOfMemory) => {
                SwapResult::ContextLost
            }
            Err(wgpu::SurfaceError::Outdated) => SwapResult::Other(1),
            Err(wgpu::SurfaceError::Timeout) => SwapResult::Other(2),
            Err(wgpu::SurfaceError::Other) => SwapResult::Other(3),
        }
    }

    fn release_surface_binding(&mut self) {
        self.binding = None;
    }

    fn release(&mut self) {
        self.binding = None;
        self.gpu = None;
    }
}
