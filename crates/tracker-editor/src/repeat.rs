/// Key-repeat state machine: an initial delay before the first repeat,
/// then a constant rate (spec.md §6: delay=20 frames, rate=4 frames).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyRepeat {
    held_frames: u32,
}

pub const INITIAL_DELAY: u32 = 20;
pub const REPEAT_PERIOD: u32 = 4;

impl KeyRepeat {
    /// Call once per frame for a key that is currently held. Returns
    /// `true` on the frame the action should fire (the initial press is
    /// the edge-triggered caller's job, not this state machine's).
    pub fn tick_held(&mut self) -> bool {
        self.held_frames += 1;
        self.held_frames == INITIAL_DELAY
            || (self.held_frames > INITIAL_DELAY
                && (self.held_frames - INITIAL_DELAY) % REPEAT_PERIOD == 0)
    }

    pub fn reset(&mut self) {
        self.held_frames = 0;
    }
}
