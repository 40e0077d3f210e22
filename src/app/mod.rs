pub mod input;

pub use self::input::Input;

use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::engine::{Engine, FrameState};
use crate::errors::Result;
use crate::renderer::RendererSettings;
use crate::utils::Timer;

/// Application logic driven by the [`App`] runner.
///
/// `init` builds the scene once the GPU context is live; whatever it
/// returns is the per-app state (camera controllers, node handles,
/// animation drivers) handed back to `update` every frame.
pub trait AppHandler: Sized + 'static {
    fn init(engine: &mut Engine, window: &Window) -> Self;

    /// Called once per frame, before the frame is rendered.
    fn update(
        &mut self,
        engine: &mut Engine,
        window: &Window,
        input: &Input,
        frame: &FrameState,
    );
}

/// Winit frontend: owns the event loop, the window, and an [`Engine`].
///
/// ```rust,ignore
/// App::new()
///     .with_title("demo")
///     .run::<MyHandler>()
/// ```
pub struct App {
    title: String,
    settings: RendererSettings,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Gloam".into(),
            settings: RendererSettings::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runs the event loop until the window closes.
    pub fn run<H: AppHandler>(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = Runner::<H> {
            title: self.title,
            settings: self.settings,
            window: None,
            engine: None,
            handler: None,
            input: Input::new(),
            timer: Timer::new(),
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct Runner<H: AppHandler> {
    title: String,
    settings: RendererSettings,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    handler: Option<H>,
    input: Input,
    timer: Timer,
}

impl<H: AppHandler> Runner<H> {
    fn update(&mut self) {
        let (Some(engine), Some(handler), Some(window)) = (
            self.engine.as_mut(),
            self.handler.as_mut(),
            self.window.as_deref(),
        ) else {
            return;
        };

        self.timer.tick();
        let dt = self.timer.dt_seconds();

        engine.update(dt);

        let frame = FrameState {
            time: engine.time(),
            dt,
            frame_count: engine.frame_count(),
        };
        handler.update(engine, window, &self.input, &frame);

        self.input.end_frame();
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if let Err(e) = engine.render() {
            log::error!("Fatal render error: {e}");
            event_loop.exit();
        }
    }
}

impl<H: AppHandler> ApplicationHandler for Runner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));

        let window = event_loop
            .create_window(window_attributes)
            .expect("Failed to create window");
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let size = window.inner_size();
        let scale_factor = window.scale_factor() as f32;

        log::info!("Initializing renderer backend...");
        let settings = self.settings.clone();
        let mut engine = match pollster::block_on(Engine::new(
            window.clone(),
            size.width,
            size.height,
            settings,
        )) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Fatal renderer error: {e}");
                event_loop.exit();
                return;
            }
        };

        // Apply the pixel ratio clamp to the initial size as well.
        engine.resize(size.width, size.height, scale_factor);
        self.input.handle_resize(size.width, size.height);

        self.handler = Some(H::init(&mut engine, &window));
        self.engine = Some(engine);
        // Scene setup can take a while; do not bill it to the first frame.
        self.timer = Timer::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.input
                    .handle_resize(physical_size.width, physical_size.height);

                let scale_factor = self
                    .window
                    .as_ref()
                    .map_or(1.0, |window| window.scale_factor() as f32);
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(physical_size.width, physical_size.height, scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                self.update();
                self.render(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_move(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_input(state, button);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.handle_mouse_wheel(delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
