use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::EngineError;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Context passed to `core::App::on_setup`.
pub struct SetupCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a Gpu<'w>,
}

impl<'a, 'w> SetupCtx<'a, 'w> {
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        render_ctx(self.gpu)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Drawable width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.gpu.aspect_ratio()
    }

    /// Acquires a surface frame, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then submits and presents.
    ///
    /// Transient surface errors skip the frame and `Lost`/`Outdated` reconfigure;
    /// both return `Ok`. Out-of-memory and `draw` failures return `Err`.
    pub fn render<F>(&mut self, draw: F) -> Result<(), EngineError>
    where
        F: FnOnce(&RenderCtx<'_>, RenderTarget<'_>) -> Result<(), EngineError>,
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let reason = err.to_string();
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        Err(EngineError::Frame(format!("surface failure: {reason}")))
                    }
                    action => {
                        log::debug!("frame skipped ({action:?}): {reason}");
                        Ok(())
                    }
                };
            }
        };

        {
            let rctx = render_ctx(self.gpu);
            let target =
                RenderTarget::new(&mut frame.encoder, &frame.view, self.gpu.depth_view());
            draw(&rctx, target)?;
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);
        Ok(())
    }
}

fn render_ctx<'g>(gpu: &'g Gpu<'_>) -> RenderCtx<'g> {
    RenderCtx::new(
        gpu.device(),
        gpu.queue(),
        gpu.surface_format(),
        gpu.depth_format(),
        gpu.aspect_ratio(),
    )
}
