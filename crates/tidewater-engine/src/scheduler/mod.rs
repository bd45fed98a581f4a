//! Frame loop state machine.
//!
//! The runtime owns one `FrameScheduler`; setup completes before `start()`, and
//! every redraw runs one step through `tick`.

mod frame_scheduler;

pub use frame_scheduler::{FrameScheduler, SchedulerState};
