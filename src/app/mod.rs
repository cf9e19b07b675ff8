use crate::editor::MaskEditor;
use crate::entitlement::{Entitlement, Tier};
use crate::error::AppResult;
use crate::state::{AppEvent, AppState, StateError, StateMachine, StateTransition};
use crate::storage::{CardId, CardRepository, ImageSizeProvider, StorageError};
use crate::viewer::CardViewer;

/// Navigation between the library, the study viewer and the mask editor.
///
/// The editor borrows the repository as its [`crate::storage::MaskSink`], so
/// every committed edit lands on disk before [`App::close_editor`] is called.
#[derive(Debug)]
pub struct App {
    machine: StateMachine,
    repository: CardRepository,
    entitlement: Entitlement,
    viewer: Option<CardViewer>,
}

impl App {
    pub fn new(repository: CardRepository, entitlement: Entitlement) -> Self {
        Self {
            machine: StateMachine::new(),
            repository,
            entitlement,
            viewer: None,
        }
    }

    pub fn start(&mut self) -> AppResult<()> {
        tracing::info!(event = "start", from = ?self.machine.state());
        let _ = self.machine.transition(AppEvent::Start)?;
        Ok(())
    }

    pub fn state(&self) -> &StateMachine {
        &self.machine
    }

    pub fn repository(&self) -> &CardRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut CardRepository {
        &mut self.repository
    }

    pub const fn entitlement(&self) -> &Entitlement {
        &self.entitlement
    }

    pub fn set_tier(&mut self, tier: Tier) {
        tracing::info!(?tier, "entitlement tier changed");
        self.entitlement.set_tier(tier);
    }

    pub fn viewer(&self) -> Option<&CardViewer> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut CardViewer> {
        self.viewer.as_mut()
    }

    /// Opens a card from the library, or pages to it from the viewer.
    pub fn open_card(&mut self, id: CardId) -> AppResult<&mut CardViewer> {
        let card = self
            .repository
            .card(id)
            .ok_or(StorageError::CardNotFound(id))?;
        let image_size = self.repository.image_size(card);
        let transition = self.machine.transition(AppEvent::OpenCard)?;

        let viewer = match self.viewer.take() {
            Some(mut viewer) => {
                viewer.show_card(id, image_size);
                viewer
            }
            None => CardViewer::new(id, image_size),
        };
        let viewer = self.viewer.insert(viewer);
        if let Some(allow_zoom) = transition.zoom_toggled() {
            viewer.pan_zoom_mut().set_allow_zoom(allow_zoom);
        }
        Ok(viewer)
    }

    /// Pages forward; `None` at the end of the library.
    pub fn show_next_card(&mut self) -> AppResult<Option<CardId>> {
        let current = self.current_card(AppEvent::OpenCard)?;
        match self.repository.next_card_id(current) {
            Some(next) => self.open_card(next).map(|viewer| Some(viewer.card_id())),
            None => Ok(None),
        }
    }

    pub fn show_previous_card(&mut self) -> AppResult<Option<CardId>> {
        let current = self.current_card(AppEvent::OpenCard)?;
        match self.repository.previous_card_id(current) {
            Some(previous) => self.open_card(previous).map(|viewer| Some(viewer.card_id())),
            None => Ok(None),
        }
    }

    pub fn open_editor(&mut self) -> AppResult<MaskEditor<&mut CardRepository>> {
        let card_id = self.current_card(AppEvent::OpenEditor)?;
        let card = self
            .repository
            .card(card_id)
            .ok_or(StorageError::CardNotFound(card_id))?;
        let masks = card.masks.clone();
        let image_size = self.repository.image_size(card);
        let transition = self.machine.transition(AppEvent::OpenEditor)?;
        self.apply_zoom_permission(transition);

        tracing::debug!(card = %card_id, masks = masks.len(), "editor opened");
        Ok(MaskEditor::new(
            card_id,
            masks,
            image_size,
            &self.entitlement,
            &mut self.repository,
        ))
    }

    pub fn close_editor(&mut self) -> AppResult<()> {
        let transition = self.machine.transition(AppEvent::CloseEditor)?;
        self.apply_zoom_permission(transition);
        Ok(())
    }

    pub fn close_card(&mut self) -> AppResult<()> {
        self.machine.transition(AppEvent::CloseCard)?;
        self.viewer = None;
        Ok(())
    }

    fn current_card(&self, event: AppEvent) -> AppResult<CardId> {
        match (self.machine.state(), &self.viewer) {
            (AppState::Viewer, Some(viewer)) => Ok(viewer.card_id()),
            (from, _) => Err(StateError::rejected(from, event).into()),
        }
    }

    fn apply_zoom_permission(&mut self, transition: StateTransition) {
        let (Some(allow_zoom), Some(viewer)) = (transition.zoom_toggled(), &mut self.viewer) else {
            return;
        };
        viewer.pan_zoom_mut().set_allow_zoom(allow_zoom);
    }
}
