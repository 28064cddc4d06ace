/// Frame step the scene player advances by, roughly 60 frames per second.
pub const FRAME_STEP: f32 = 0.016;

/// Elapsed-time accumulator gated by a play/pause flag.
///
/// Pausing stops accumulation; resuming continues from the accumulated value.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    elapsed: f32,
    ticks: u64,
    playing: bool,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            ticks: 0,
            playing: true,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Adds `dt` seconds if playing and returns the new elapsed time; returns
    /// `None` while paused. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.playing {
            return None;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.ticks += 1;
        Some(self.elapsed)
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.ticks = 0;
    }
}

/// Per-tick rotation of element `index` under the staggered multi-shape rule.
pub fn staggered_rotation(rotation_speed: f32, index: usize) -> f32 {
    rotation_speed * (1.0 + index as f32 * 0.01)
}
