use super::model::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Start,
    OpenCard,
    OpenEditor,
    CloseEditor,
    CloseCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<AppState>,
    pub event: AppEvent,
    pub to: AppState,
}

impl StateTransition {
    pub const fn new(from: Option<AppState>, event: AppEvent, to: AppState) -> Self {
        Self { from, event, to }
    }

    /// New pan/zoom permission when this transition flips it.
    pub fn zoom_toggled(&self) -> Option<bool> {
        let before = self.from.is_some_and(AppState::allows_zoom);
        let after = self.to.allows_zoom();
        (before != after).then_some(after)
    }
}
