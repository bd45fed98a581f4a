use anyhow::Result;

use crate::input::InputEvent;

use super::ctx::{FrameCtx, SetupCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime.
///
/// Call order: `on_setup` once, then `on_input`/`on_frame` until exit, then
/// `on_teardown` once.
pub trait App {
    /// Creates every GPU resource the app needs. The frame loop starts only
    /// after this returns `Ok`.
    fn on_setup(&mut self, ctx: &mut SetupCtx<'_, '_>) -> Result<()>;

    /// Called for each translated input event, before the next frame.
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per frame. An `Err` halts the frame loop.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;

    /// Called once after the loop stops. GPU objects owned by the app should be
    /// released here.
    fn on_teardown(&mut self) {}
}
