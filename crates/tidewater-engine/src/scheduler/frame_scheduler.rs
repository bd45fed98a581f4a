use crate::error::EngineError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SchedulerState {
    /// Setup not finished.
    Idle,
    Running,
    /// Terminal.
    Stopped,
}

/// Drives frame steps one at a time.
///
/// A step that fails stops the scheduler; there is no retry.
#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    frames_completed: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            frames_completed: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// `Idle → Running`. Starting a running scheduler is a no-op; a stopped one
    /// cannot be restarted.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            SchedulerState::Idle => {
                log::info!("frame scheduler started");
                self.state = SchedulerState::Running;
                Ok(())
            }
            SchedulerState::Running => Ok(()),
            SchedulerState::Stopped => Err(EngineError::Frame(
                "frame scheduler was stopped and cannot be restarted".into(),
            )),
        }
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Stopped {
            log::info!(
                "frame scheduler stopped after {} frames",
                self.frames_completed
            );
            self.state = SchedulerState::Stopped;
        }
    }

    /// Runs one frame step to completion.
    ///
    /// Returns `Ok(false)` without calling `step` when not running.
    pub fn tick<F, E>(&mut self, step: F) -> Result<bool, E>
    where
        F: FnOnce(u64) -> Result<(), E>,
        E: std::fmt::Display,
    {
        if !self.is_running() {
            return Ok(false);
        }

        let index = self.frames_completed;
        match step(index) {
            Ok(()) => {
                self.frames_completed += 1;
                Ok(true)
            }
            Err(e) => {
                log::error!("frame {index} failed: {e}");
                self.stop();
                Err(e)
            }
        }
    }

    /// Ticks up to `n` times, stopping early if the scheduler stops.
    /// Returns the number of frames completed by this call.
    pub fn run_ticks<F, E>(&mut self, n: u64, mut step: F) -> Result<u64, E>
    where
        F: FnMut(u64) -> Result<(), E>,
        E: std::fmt::Display,
    {
        let before = self.frames_completed;
        for _ in 0..n {
            if !self.tick(&mut step)? {
                break;
            }
        }
        Ok(self.frames_completed - before)
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;
    use crate::render::{
        DrawCall, FrameExecutor, FrameInputs, FramePlanner, PlanStep, RecordingExecutor,
        SceneConfig,
    };
    use crate::render::uniforms::UniformRegion;
    use crate::settings::Settings;

    fn drive(
        scheduler: &mut FrameScheduler,
        exec: &mut RecordingExecutor,
        n: u64,
    ) -> Result<u64, EngineError> {
        let planner = FramePlanner::new(&SceneConfig::default(), 16);
        let settings = Settings::default();
        let camera = CameraController::new(0.3, -0.2, 0.002);

        scheduler.run_ticks(n, |i| {
            let plan = planner.plan(&FrameInputs {
                forward: camera.forward(),
                elapsed: i as f32 / 60.0,
                aspect: 1.5,
                settings: &settings,
            });
            exec.execute(&plan)
        })
    }

    #[test]
    fn n_frames_draw_water_and_sky_n_times() {
        let mut scheduler = FrameScheduler::new();
        scheduler.start().unwrap();
        let mut exec = RecordingExecutor::default();

        assert_eq!(drive(&mut scheduler, &mut exec, 5).unwrap(), 5);
        assert_eq!(exec.frames.len(), 5);

        let draws: Vec<DrawCall> = exec.frames.iter().flat_map(|p| p.draws()).collect();
        assert_eq!(draws.iter().filter(|d| d.is_water()).count(), 5);
        assert_eq!(draws.iter().filter(|d| d.is_skybox()).count(), 5);

        for plan in &exec.frames {
            let mut transform_written = false;
            let mut sky_written = false;
            for step in plan.steps() {
                match step {
                    PlanStep::Write(w) if w.region == UniformRegion::Transform => {
                        transform_written = true
                    }
                    PlanStep::Write(w) if w.region == UniformRegion::SkyboxView => {
                        sky_written = true
                    }
                    PlanStep::Write(_) => {}
                    PlanStep::Draw(d) if d.is_water() => assert!(transform_written),
                    PlanStep::Draw(_) => assert!(sky_written),
                }
            }
        }

        // Time uniform carries the last frame's elapsed seconds.
        assert_eq!(exec.mirror.read_f32(UniformRegion::Time, 0), Some(4.0 / 60.0));
    }

    #[test]
    fn idle_scheduler_runs_nothing() {
        let mut scheduler = FrameScheduler::new();
        let mut exec = RecordingExecutor::default();
        assert_eq!(drive(&mut scheduler, &mut exec, 3).unwrap(), 0);
        assert!(exec.frames.is_empty());
    }

    #[test]
    fn failed_step_stops_the_loop() {
        let mut scheduler = FrameScheduler::new();
        scheduler.start().unwrap();
        let mut exec = RecordingExecutor {
            fail_at: Some(2),
            ..Default::default()
        };

        assert!(drive(&mut scheduler, &mut exec, 10).is_err());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.frames_completed(), 2);

        // No retry.
        assert_eq!(drive(&mut scheduler, &mut exec, 10).unwrap(), 0);
        assert_eq!(exec.frames.len(), 2);
    }

    #[test]
    fn stop_is_terminal_and_idempotent() {
        let mut scheduler = FrameScheduler::new();
        scheduler.start().unwrap();
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.start().is_err());
        assert_eq!(scheduler.tick(|_| Ok::<(), EngineError>(())).unwrap(), false);
    }
}
