use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, SetupCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::error::EngineError;
use crate::input::{translate, InputState};
use crate::scheduler::FrameScheduler;
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tidewater".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs `app` until it exits, and returns the error that
    /// stopped it, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Banner for a capability failure anywhere under `err`'s context layers.
fn capability_banner(err: &anyhow::Error) -> Option<String> {
    err.downcast_ref::<EngineError>()
        .and_then(EngineError::capability_banner)
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    scheduler: FrameScheduler,
    torn_down: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            scheduler: FrameScheduler::new(),
            torn_down: false,
            failure: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    /// Window, GPU, app resources, then the scheduler.
    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut entry = self.create_window_entry(event_loop)?;

        let app = &mut self.app;
        entry.with(|fields| {
            let mut ctx = SetupCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            app.on_setup(&mut ctx)
        })
        .context("application setup failed")?;

        entry.with_clock_mut(|clock| clock.reset());
        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);

        self.scheduler.start()?;
        log::info!("setup complete");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        if let Some(banner) = capability_banner(&err) {
            eprintln!("{banner}");
        }
        log::error!("{err:#}");
        self.failure = Some(err);
        self.shutdown(event_loop);
    }

    /// Stops the loop, lets the app release its resources, then drops the
    /// window and GPU context.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.scheduler.stop();
        if !self.torn_down {
            self.torn_down = true;
            self.app.on_teardown();
            self.entry = None;
        }
        event_loop.exit();
    }

    fn run_frame(&mut self, window_id: WindowId) -> Result<AppControl> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let app = &mut self.app;
        let mut control = AppControl::Continue;

        self.scheduler.tick(|_| {
            entry.with_mut(|fields| {
                let ft: FrameTime = fields.clock.tick();

                let result = {
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: window_id,
                            window: fields.window,
                        },
                        gpu: fields.gpu,
                        time: ft,
                    };
                    app.on_frame(&mut ctx)
                };

                control = result?;
                Ok::<(), anyhow::Error>(())
            })
        })?;

        Ok(control)
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.torn_down {
            return;
        }

        if let Err(e) = self.setup(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.scheduler.is_running() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous animation: one redraw per loop iteration.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let mut exit_from_input = false;

        if let Some(entry) = self.entry.as_mut() {
            let app = &mut self.app;
            entry.with_mut(|fields| {
                if let Some(ev) =
                    translate::translate_window_event(fields.window, fields.input_state, &event)
                {
                    if app.on_input(&ev) == AppControl::Exit {
                        exit_from_input = true;
                    }
                    fields.input_state.apply_event(&ev);
                }
            });
        }

        if exit_from_input {
            self.shutdown(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => match self.run_frame(window_id) {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => self.shutdown(event_loop),
                Err(e) => self.fail(event_loop, e),
            },

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown(event_loop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquire(err: EngineError) -> Result<()> {
        Err(err).context("failed to find a suitable GPU adapter")
    }

    #[test]
    fn banner_survives_context_layers() {
        let err = acquire(EngineError::Capability("no adapter".into()))
            .context("application setup failed")
            .unwrap_err();

        let banner = capability_banner(&err).unwrap();
        assert!(banner.contains("no adapter"));
    }

    #[test]
    fn other_failures_print_no_banner() {
        let err = acquire(EngineError::Config("plane detail must be at least 1".into()))
            .unwrap_err();
        assert!(capability_banner(&err).is_none());

        let plain = anyhow::anyhow!("failed to create window");
        assert!(capability_banner(&plain).is_none());
    }
}
