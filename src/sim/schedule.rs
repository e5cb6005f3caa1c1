//! Frame loop state machine
//!
//! The loop is either dormant or running. Commands wake it; a frame that ends
//! with no bodies left puts it back to sleep. Timestamps come from whoever
//! drives the frames: `requestAnimationFrame` in the browser, a
//! [`FixedStepDriver`] in tests and the native demo.

use crate::consts::{FRAME_DT, MAX_FRAME_MS};

use super::sink::OffsetSink;
use super::world::SoftBodyWorld;

/// Whether frames are being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// No frame scheduled; commands will wake the loop
    #[default]
    Dormant,
    /// A frame is (or should be) scheduled
    Running,
}

/// What a frame asks of its driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Bodies remain; schedule another frame
    Continue,
    /// Last body is gone; the loop is now dormant
    Stopped,
    /// The loop was already dormant; nothing was simulated
    Idle,
}

impl FrameOutcome {
    pub fn wants_next_frame(self) -> bool {
        self == FrameOutcome::Continue
    }
}

/// Loop state plus frame timing
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    state: LoopState,
    /// Timestamp of the previous frame (ms); `None` right after waking
    last_time_ms: Option<f64>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Dormant -> Running. Returns true if the loop actually woke up (the
    /// caller then owes the driver a frame request).
    pub fn wake(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.last_time_ms = None;
        log::debug!("Frame loop woke");
        true
    }

    /// Start a frame at `now_ms`, returning its time step in seconds, or
    /// `None` if the loop is dormant.
    ///
    /// The delta is clamped to `MAX_FRAME_MS`; a clock running backwards gives
    /// a zero step. The first frame after waking uses the nominal frame length.
    pub fn begin_frame(&mut self, now_ms: f64) -> Option<f64> {
        if !self.is_running() {
            return None;
        }
        let dt = match self.last_time_ms {
            Some(last) => {
                let delta = now_ms - last;
                if delta.is_finite() {
                    delta.clamp(0.0, MAX_FRAME_MS) / 1000.0
                } else {
                    FRAME_DT
                }
            }
            None => FRAME_DT,
        };
        self.last_time_ms = Some(now_ms);
        Some(dt)
    }

    /// Finish a frame: keep running while bodies exist, otherwise go dormant
    pub fn end_frame(&mut self, bodies_remaining: bool) -> FrameOutcome {
        if bodies_remaining {
            FrameOutcome::Continue
        } else {
            self.state = LoopState::Dormant;
            self.last_time_ms = None;
            log::info!("Frame loop stopped (no bodies)");
            FrameOutcome::Stopped
        }
    }
}

/// Drives a world with evenly spaced timestamps, standing in for the display
#[derive(Debug, Clone)]
pub struct FixedStepDriver {
    now_ms: f64,
    frame_ms: f64,
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new(FRAME_DT * 1000.0)
    }
}

impl FixedStepDriver {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_ms,
        }
    }

    /// Current clock value (ms)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Advance the clock by one frame and run it
    pub fn frame(&mut self, world: &mut SoftBodyWorld, sink: &mut impl OffsetSink) -> FrameOutcome {
        self.now_ms += self.frame_ms;
        world.frame(self.now_ms, sink)
    }

    /// Run frames until the loop stops or `max_frames` have run.
    /// Returns the number of frames simulated.
    pub fn run(
        &mut self,
        world: &mut SoftBodyWorld,
        sink: &mut impl OffsetSink,
        max_frames: usize,
    ) -> usize {
        let mut frames = 0;
        while frames < max_frames && world.is_running() {
            frames += 1;
            if !self.frame(world, sink).wants_next_frame() {
                break;
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dormant_loop_ignores_frames() {
        let mut frames = FrameLoop::new();
        assert_eq!(frames.state(), LoopState::Dormant);
        assert_eq!(frames.begin_frame(100.0), None);
    }

    #[test]
    fn test_wake_only_once() {
        let mut frames = FrameLoop::new();
        assert!(frames.wake());
        assert!(!frames.wake());
        assert!(frames.is_running());
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut frames = FrameLoop::new();
        frames.wake();

        // First frame after waking: nominal step
        assert_eq!(frames.begin_frame(1000.0), Some(FRAME_DT));

        let dt = frames.begin_frame(1016.0).unwrap();
        assert!((dt - 0.016).abs() < 1e-12);

        // Long pause (background tab)
        let dt = frames.begin_frame(5000.0).unwrap();
        assert!((dt - 0.032).abs() < 1e-12);

        // Clock went backwards
        assert_eq!(frames.begin_frame(4000.0), Some(0.0));
    }

    #[test]
    fn test_end_frame_transitions() {
        let mut frames = FrameLoop::new();
        frames.wake();
        assert_eq!(frames.end_frame(true), FrameOutcome::Continue);
        assert!(frames.is_running());

        assert_eq!(frames.end_frame(false), FrameOutcome::Stopped);
        assert_eq!(frames.state(), LoopState::Dormant);

        // Waking again restarts timing
        assert!(frames.wake());
        assert_eq!(frames.begin_frame(10.0), Some(FRAME_DT));
    }
}
