//! Pure per-frame description: what to write, then what to draw.

use glam::Vec3;

use crate::error::EngineError;
use crate::render::uniforms::UniformWrite;
use crate::settings::Settings;

/// Everything a frame depends on besides the static scene configuration.
#[derive(Debug, Copy, Clone)]
pub struct FrameInputs<'a> {
    /// Camera forward direction.
    pub forward: Vec3,
    /// Seconds since the clock started.
    pub elapsed: f32,
    pub aspect: f32,
    pub settings: &'a Settings,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    Water { index_count: u32 },
    /// Three generated vertices, no buffers bound.
    SkyboxFullscreen,
    SkyboxCube { index_count: u32 },
}

impl DrawCall {
    pub fn is_water(&self) -> bool {
        matches!(self, DrawCall::Water { .. })
    }

    pub fn is_skybox(&self) -> bool {
        matches!(self, DrawCall::SkyboxFullscreen | DrawCall::SkyboxCube { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    Write(UniformWrite),
    Draw(DrawCall),
}

/// Ordered steps of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    steps: Vec<PlanStep>,
}

impl FramePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, write: UniformWrite) {
        self.steps.push(PlanStep::Write(write));
    }

    pub fn draw(&mut self, call: DrawCall) {
        self.steps.push(PlanStep::Draw(call));
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn writes(&self) -> impl Iterator<Item = &UniformWrite> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Write(w) => Some(w),
            PlanStep::Draw(_) => None,
        })
    }

    pub fn draws(&self) -> impl Iterator<Item = DrawCall> + '_ {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Draw(d) => Some(*d),
            PlanStep::Write(_) => None,
        })
    }

    /// Checks every write before anything reaches the queue.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.writes().try_for_each(UniformWrite::validate)
    }
}

/// Carries out a plan. The GPU implementation performs the writes through the
/// queue and records the draws into a single render pass.
pub trait FrameExecutor {
    fn execute(&mut self, plan: &FramePlan) -> Result<(), EngineError>;
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use crate::render::uniforms::UniformMirror;

    /// Executor that keeps everything it was asked to do.
    #[derive(Default)]
    pub(crate) struct RecordingExecutor {
        pub mirror: UniformMirror,
        pub frames: Vec<FramePlan>,
        /// Fails the frame with this index, if set.
        pub fail_at: Option<usize>,
    }

    impl FrameExecutor for RecordingExecutor {
        fn execute(&mut self, plan: &FramePlan) -> Result<(), EngineError> {
            if self.fail_at == Some(self.frames.len()) {
                return Err(EngineError::Frame("injected failure".into()));
            }
            for w in plan.writes() {
                self.mirror.apply(w)?;
            }
            self.frames.push(plan.clone());
            Ok(())
        }
    }
}
