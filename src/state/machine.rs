use super::error::{StateError, StateResult};
use super::{event::StateTransition, AppEvent, AppState};

#[derive(Debug)]
pub struct StateMachine {
    state: AppState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn can_transition(&self, event: AppEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: AppEvent) -> Option<AppState> {
        use AppEvent::*;
        match (self.state, event) {
            (AppState::Library, Start) => Some(AppState::Library),
            (AppState::Library, OpenCard) => Some(AppState::Viewer),
            // Paging to a neighbouring card stays in the viewer.
            (AppState::Viewer, OpenCard) => Some(AppState::Viewer),
            (AppState::Viewer, OpenEditor) => Some(AppState::Editor),
            (AppState::Editor, CloseEditor) => Some(AppState::Viewer),
            (AppState::Viewer, CloseCard) => Some(AppState::Library),
            _ => None,
        }
    }

    /// Applies `event` and returns the recorded transition.
    pub fn transition(&mut self, event: AppEvent) -> StateResult<StateTransition> {
        tracing::debug!(from = ?self.state, ?event, "screen transition requested");
        let Some(next) = self.next_state(event) else {
            let error = StateError::rejected(self.state, event);
            tracing::warn!(%error, "rejected screen transition");
            return Err(error);
        };

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);
        if let Some(allow_zoom) = record.zoom_toggled() {
            tracing::debug!(allow_zoom, screen = ?next, "pan/zoom permission changed");
        }

        Ok(record)
    }

    /// Applied transitions, oldest first. Rejected events are not recorded.
    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }

    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.transition_history.last()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppState::{:?}", self.state)
    }
}
