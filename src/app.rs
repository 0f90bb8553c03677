//! Windowed host driving the renderer from winit's redraw loop.
//!
//! `RedrawRequested` is the platform's next-display-refresh callback:
//! each tick requests another redraw, forming the same self-perpetuating
//! chain a browser's requestAnimationFrame would. winit cannot un-request a
//! redraw, so cancellation is enforced by the loop phase instead: a redraw
//! arriving after stop or disable finds `tick` returning `None` and draws
//! nothing.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::animation::{AnimationLoop, TickHandle, TickScheduler};
use crate::gpu::{AuroraOptions, SurfaceRenderer};

/// Scheduler backed by the window's redraw request.
struct RedrawScheduler {
    window: Arc<Window>,
    next: u64,
}

impl TickScheduler for RedrawScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.window.request_redraw();
        self.next += 1;
        TickHandle::from_raw(self.next)
    }

    fn cancel_tick(&mut self, _handle: TickHandle) {
        // No-op: late redraws are dropped by the animation loop phase.
    }
}

/// Full-window aurora application.
pub struct AuroraApp {
    title: String,
    options: AuroraOptions,
}

impl AuroraApp {
    pub fn new() -> Self {
        Self {
            title: "aurora".to_string(),
            options: AuroraOptions::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_options(mut self, options: AuroraOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the event loop until the window closes. Blocks.
    pub fn run(self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut host = Host {
            title: self.title,
            options: self.options,
            window: None,
            renderer: None,
            animation: None,
            started: None,
        };
        event_loop
            .run_app(&mut host)
            .context("event loop terminated abnormally")
    }
}

impl Default for AuroraApp {
    fn default() -> Self {
        Self::new()
    }
}

struct Host {
    title: String,
    options: AuroraOptions,
    window: Option<Arc<Window>>,
    renderer: Option<SurfaceRenderer>,
    animation: Option<AnimationLoop<RedrawScheduler>>,
    started: Option<Instant>,
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes().with_title(self.title.clone());
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let mut animation = AnimationLoop::new(RedrawScheduler {
            window: window.clone(),
            next: 0,
        });

        let attached = pollster::block_on(SurfaceRenderer::attach(
            window.clone(),
            size.width,
            size.height,
            self.options.clone(),
        ));
        match attached {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.started = Some(Instant::now());
                animation.start();
            }
            Err(e) => {
                // The window stays blank; the process lives on.
                log::error!("aurora renderer disabled: {e}");
                animation.disable();
            }
        }

        self.animation = Some(animation);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                // Stop the loop before the renderer is dropped.
                if let Some(animation) = &mut self.animation {
                    animation.stop();
                }
                self.renderer = None;
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let (Some(window), Some(animation)) = (&self.window, &mut self.animation) else {
                    return;
                };
                let timestamp_ms = self
                    .started
                    .map_or(0.0, |s| s.elapsed().as_secs_f64() * 1e3);
                let Some(time) = animation.tick(timestamp_ms) else {
                    return;
                };
                if let Some(renderer) = &mut self.renderer {
                    let size = window.inner_size();
                    if let Err(e) = renderer.render((size.width, size.height), time) {
                        log::error!("aurora frame failed, disabling renderer: {e}");
                        animation.disable();
                    }
                }
            }
            // Size changes are picked up by the per-tick poll in
            // SurfaceRenderer::render; no resize subscription needed.
            _ => {}
        }
    }
}
