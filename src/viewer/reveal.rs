use std::time::Duration;

/// How long a press must be held before it counts as a peek.
pub const PEEK_PRESS_MIN_DURATION: Duration = Duration::from_millis(200);

/// Whether masks cover their content while studying a card.
///
/// `hide_mode` is the user's toggle; `peeking` is true only while a long
/// press is held and temporarily shows everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealState {
    hide_mode: bool,
    peeking: bool,
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealState {
    pub const fn new() -> Self {
        Self {
            hide_mode: true,
            peeking: false,
        }
    }

    pub const fn hide_mode(&self) -> bool {
        self.hide_mode
    }

    pub fn set_hide_mode(&mut self, hide_mode: bool) {
        self.hide_mode = hide_mode;
    }

    pub fn toggle_hide_mode(&mut self) -> bool {
        self.hide_mode = !self.hide_mode;
        self.hide_mode
    }

    /// Call once the press has lasted [`PEEK_PRESS_MIN_DURATION`].
    pub fn begin_peek(&mut self) {
        self.peeking = true;
    }

    pub fn end_peek(&mut self) {
        self.peeking = false;
    }

    pub const fn is_peeking(&self) -> bool {
        self.peeking
    }

    pub const fn masks_hidden(&self) -> bool {
        self.hide_mode && !self.peeking
    }
}
