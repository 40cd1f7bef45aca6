//! Frame-based animation state for the panel.
//!
//! The only effect is the swing: a short glyph cycle played once after a
//! confirmed open or close. Timers advance on wall-clock deltas measured
//! per frame, so a skipped frame shortens the animation instead of
//! stretching it.

use std::time::{Duration, Instant};

use latch_session::CommandKind;

const SWING_DURATION: Duration = Duration::from_millis(500);

/// Tracks elapsed time for an effect with a fixed duration.
#[derive(Debug, Clone, Copy)]
struct EffectTimer {
    elapsed: Duration,
    duration: Duration,
}

impl EffectTimer {
    fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    /// Progress in `[0.0, 1.0]`. A zero-duration timer is always done.
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Fast start, slow settle. Reads as the bolt snapping then seating.
fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// All running animations, advanced once per frame.
pub struct Effects {
    swing: Option<(CommandKind, EffectTimer)>,
    last_frame: Instant,
}

impl Effects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            swing: None,
            last_frame: Instant::now(),
        }
    }

    /// Starts the swing for a confirmed command, replacing any running one.
    pub fn start_swing(&mut self, kind: CommandKind) {
        self.swing = Some((kind, EffectTimer::new(SWING_DURATION)));
    }

    /// Advances all timers by the time since the previous frame.
    pub fn advance(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if let Some((_, timer)) = self.swing.as_mut() {
            timer.advance(delta);
            if timer.is_finished() {
                self.swing = None;
            }
        }
    }

    /// Current swing frame, if a swing is playing.
    ///
    /// An open sweeps the frames forward, a close sweeps them backward,
    /// so the two motions read as opposites.
    #[must_use]
    pub fn swing_frame<'a>(&self, frames: &[&'a str]) -> Option<&'a str> {
        let (kind, timer) = self.swing.as_ref()?;
        if frames.is_empty() {
            return None;
        }
        let steps = frames.len();
        let eased = ease_out_cubic(timer.progress());
        let idx = ((eased * steps as f32) as usize).min(steps - 1);
        let idx = match kind {
            CommandKind::Open => idx,
            CommandKind::Close => steps - 1 - idx,
        };
        Some(frames[idx])
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}
