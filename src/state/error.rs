use super::event::AppEvent;
use super::model::AppState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cannot apply {event:?} while showing {from:?}: {reason}")]
    InvalidStateTransition {
        from: AppState,
        event: AppEvent,
        reason: &'static str,
    },
}

impl StateError {
    pub fn rejected(from: AppState, event: AppEvent) -> Self {
        Self::InvalidStateTransition {
            from,
            event,
            reason: rejection_reason(from, event),
        }
    }
}

fn rejection_reason(from: AppState, event: AppEvent) -> &'static str {
    use AppEvent::*;
    match (from, event) {
        (_, Start) => "already started",
        (AppState::Library, OpenEditor) => "no card is open",
        (AppState::Library, CloseCard | CloseEditor) => "already in the library",
        (AppState::Editor, OpenCard | CloseCard) => "finish editing first",
        (AppState::Editor, OpenEditor) => "editor is already open",
        (AppState::Viewer, CloseEditor) => "editor is not open",
        _ => "not reachable from this screen",
    }
}
