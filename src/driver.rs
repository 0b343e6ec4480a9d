//! Frame loop shared by every game
//!
//! The driver measures the time between frames, clamps it so a stalled
//! terminal does not teleport the ball, and hands it to a step function
//! before calling a render function. When the game is not running it only
//! renders.

use std::time::Instant;

/// Reference frame the per-frame tuning constants were written against
pub const REFERENCE_FRAME: f32 = 1.0 / 60.0;

/// Largest delta handed to a step, in seconds
pub const MAX_FRAME_DT: f32 = 0.05;

/// Elapsed simulation time for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDelta {
    pub seconds: f32,
}

impl FrameDelta {
    pub fn from_seconds(seconds: f32) -> Self {
        let seconds = if seconds.is_finite() { seconds.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        Self { seconds }
    }

    /// Delta measured in 60 Hz reference frames
    pub fn frames(self) -> f32 {
        self.seconds / REFERENCE_FRAME
    }
}

/// What a call to `LoopDriver::frame` did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Stepped,
    RenderedOnly,
    Stopped,
}

#[derive(Debug)]
pub struct LoopDriver {
    last: Option<Instant>,
    active: bool,
    frames: u64,
}

impl Default for LoopDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopDriver {
    pub fn new() -> Self {
        Self {
            last: None,
            active: true,
            frames: 0,
        }
    }

    /// No frame runs after this, on any path
    pub fn stop(&mut self) {
        self.active = false;
        self.last = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Time since the previous frame, clamped. The first frame gets one
    /// reference frame.
    pub fn delta(&mut self, now: Instant) -> FrameDelta {
        let seconds = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => REFERENCE_FRAME,
        };
        self.last = Some(now);
        FrameDelta::from_seconds(seconds)
    }

    /// Run one frame: `step` (only when `running`) then `render`.
    pub fn frame<T, E, S, R>(
        &mut self,
        now: Instant,
        state: &mut T,
        running: bool,
        step: S,
        render: R,
    ) -> Result<FrameOutcome, E>
    where
        T: ?Sized,
        S: FnOnce(&mut T, FrameDelta),
        R: FnOnce(&mut T) -> Result<(), E>,
    {
        if !self.active {
            return Ok(FrameOutcome::Stopped);
        }
        // Always advance the clock so resuming does not replay the paused time
        let dt = self.delta(now);
        let outcome = if running {
            step(state, dt);
            FrameOutcome::Stepped
        } else {
            FrameOutcome::RenderedOnly
        };
        render(state)?;
        self.frames += 1;
        Ok(outcome)
    }
}
