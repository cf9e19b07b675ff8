//! Mask editing engine for a single card.
//!
//! The editor owns the card's ordered mask list, the single selection, and one
//! gesture session per mask. It never talks to a UI toolkit: the presentation
//! layer forwards pointer streams as `(mask id, target, translation)` and draws
//! whatever [`MaskEditor::overlays`] returns.

pub mod fit;
pub mod gesture;
pub mod handle;
pub mod mask;
pub mod overlay;

use std::collections::HashMap;

use crate::entitlement::EntitlementProvider;
use crate::geometry::{NormalizedRect, Point, Rect, Size};
use crate::storage::{CardId, MaskSink};

pub use gesture::{FitContext, GestureKind, GestureSession, PointerTarget};
pub use handle::MaskHandle;
pub use mask::{clamp_rect, Mask, MaskId};
pub use overlay::{MaskOverlay, OverlayOptions};

/// Result of asking the editor for a new mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(MaskId),
    /// The entitlement ceiling is reached; the caller may offer an upgrade.
    LimitReached { limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskCounter {
    pub count: usize,
    pub limit: usize,
}

impl std::fmt::Display for MaskCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.count, self.limit)
    }
}

#[derive(Debug)]
pub struct MaskEditor<S: MaskSink> {
    card_id: CardId,
    masks: Vec<Mask>,
    selected: Option<MaskId>,
    sessions: HashMap<MaskId, GestureSession>,
    image_size: Option<Size>,
    container_size: Size,
    mask_limit: usize,
    sink: S,
}

impl<S: MaskSink> MaskEditor<S> {
    pub fn new<E: EntitlementProvider + ?Sized>(
        card_id: CardId,
        masks: Vec<Mask>,
        image_size: Option<Size>,
        entitlement: &E,
        sink: S,
    ) -> Self {
        Self {
            card_id,
            masks,
            selected: None,
            sessions: HashMap::new(),
            image_size,
            container_size: Size::ZERO,
            mask_limit: entitlement.mask_limit(),
            sink,
        }
    }

    pub const fn card_id(&self) -> CardId {
        self.card_id
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn mask(&self, id: MaskId) -> Option<&Mask> {
        self.masks.iter().find(|mask| mask.id == id)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (Vec<Mask>, S) {
        (self.masks, self.sink)
    }

    pub const fn selected_id(&self) -> Option<MaskId> {
        self.selected
    }

    pub fn fit_context(&self) -> FitContext {
        FitContext::new(self.image_size, self.container_size)
    }

    /// Called whenever the measured canvas size changes.
    pub fn set_container_size(&mut self, container_size: Size) {
        self.container_size = container_size;
    }

    pub fn set_image_size(&mut self, image_size: Option<Size>) {
        self.image_size = image_size;
    }

    /// Re-reads the ceiling, e.g. after an upgrade completed.
    pub fn refresh_entitlement<E: EntitlementProvider + ?Sized>(&mut self, entitlement: &E) {
        self.mask_limit = entitlement.mask_limit();
    }

    pub fn counter(&self) -> MaskCounter {
        MaskCounter {
            count: self.masks.len(),
            limit: self.mask_limit,
        }
    }

    pub fn can_add(&self) -> bool {
        self.masks.len() < self.mask_limit
    }

    /// Selects `id` if it names a mask of this card.
    pub fn select(&mut self, id: MaskId) -> bool {
        if self.mask(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// A press-release with no movement.
    pub fn tap(&mut self, id: MaskId) -> bool {
        self.select(id)
    }

    pub fn add_mask(&mut self) -> AddOutcome {
        if !self.can_add() {
            tracing::info!(
                card = %self.card_id,
                limit = self.mask_limit,
                "mask limit reached"
            );
            return AddOutcome::LimitReached {
                limit: self.mask_limit,
            };
        }
        let mask = Mask::centered_default();
        let id = mask.id;
        self.masks.push(mask);
        self.selected = Some(id);
        self.commit();
        AddOutcome::Added(id)
    }

    pub fn delete_selected(&mut self) -> Option<Mask> {
        let id = self.selected?;
        self.delete_mask(id)
    }

    pub fn delete_mask(&mut self, id: MaskId) -> Option<Mask> {
        let index = self.masks.iter().position(|mask| mask.id == id)?;
        let removed = self.masks.remove(index);
        self.sessions.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit();
        Some(removed)
    }

    pub fn active_gesture(&self, id: MaskId) -> Option<&GestureSession> {
        self.sessions.get(&id)
    }

    /// Rectangle to draw for `id`: the working copy while a gesture is in
    /// flight, the stored rectangle otherwise.
    pub fn live_rect(&self, id: MaskId) -> Option<NormalizedRect> {
        if let Some(session) = self.sessions.get(&id) {
            return Some(session.current());
        }
        self.mask(id).map(|mask| mask.rect)
    }

    /// A movement frame. `translation` is cumulative since the press.
    ///
    /// The first frame of a stream opens the session and selects the mask.
    /// A frame for a target other than the one that opened the session is
    /// ignored, which keeps handle drags and body drags mutually exclusive.
    pub fn pointer_changed(
        &mut self,
        id: MaskId,
        target: PointerTarget,
        translation: Size,
    ) -> Option<NormalizedRect> {
        let context = self.fit_context();
        let session = self.session_for(id, target.into())?;
        Some(session.update(translation, &context))
    }

    /// End of a pointer stream: applies the final frame and commits.
    ///
    /// Returns the committed rectangle, or `None` when nothing moved. A drag
    /// that leaves the rectangle at its anchor, or that ran without an image,
    /// ends the session without touching `updated_at` or the sink.
    pub fn pointer_ended(
        &mut self,
        id: MaskId,
        target: PointerTarget,
        translation: Size,
    ) -> Option<NormalizedRect> {
        let kind = GestureKind::from(target);
        let has_session = self.sessions.contains_key(&id);
        if !has_session && translation == Size::ZERO {
            return None;
        }
        if has_session && self.sessions.get(&id).map(GestureSession::kind) != Some(kind) {
            return None;
        }

        let context = self.fit_context();
        let session = self.session_for(id, kind)?;
        let rect = session.update(translation, &context);
        let anchor = session.anchor();
        self.sessions.remove(&id);
        if context.image_size.is_none() || rect == anchor {
            tracing::debug!(mask = %id, ?kind, "gesture ended without change");
            return None;
        }

        let mask = self.masks.iter_mut().find(|mask| mask.id == id)?;
        mask.commit_rect(rect);
        tracing::debug!(mask = %id, ?kind, "gesture committed");
        self.commit();
        Some(rect)
    }

    /// Drops the session for `id` without committing.
    pub fn pointer_cancelled(&mut self, id: MaskId) -> bool {
        let cancelled = self.sessions.remove(&id).is_some();
        if cancelled {
            tracing::debug!(mask = %id, "gesture cancelled");
        }
        cancelled
    }

    /// Discards every in-flight gesture, e.g. when the canvas goes away.
    pub fn cancel_all_gestures(&mut self) {
        self.sessions.clear();
    }

    pub fn overlays(&self) -> Vec<MaskOverlay> {
        overlay::build_overlays(
            self.masks
                .iter()
                .map(|mask| (mask.id, self.live_rect(mask.id).unwrap_or(mask.rect))),
            &self.fit_context(),
            OverlayOptions {
                editing: true,
                hidden: false,
                selected: self.selected,
            },
        )
    }

    /// Topmost mask under a container point.
    pub fn mask_at_point(&self, point: Point) -> Option<MaskId> {
        overlay::top_overlay_at_point(&self.overlays(), point).map(|overlay| overlay.id)
    }

    /// Handle under a container point. Handles sit above every mask body, so
    /// they are tested first, topmost mask first.
    pub fn handle_at_point(&self, point: Point) -> Option<(MaskId, MaskHandle)> {
        self.overlays()
            .iter()
            .rev()
            .filter(|overlay| overlay.frame != Rect::ZERO)
            .find_map(|overlay| {
                handle::handle_at_point(overlay.frame, point).map(|handle| (overlay.id, handle))
            })
    }

    /// Resolves what a press at `point` would drag.
    pub fn target_at_point(&self, point: Point) -> Option<(MaskId, PointerTarget)> {
        if let Some((id, handle)) = self.handle_at_point(point) {
            return Some((id, PointerTarget::Handle(handle)));
        }
        self.mask_at_point(point)
            .map(|id| (id, PointerTarget::Body))
    }

    fn session_for(&mut self, id: MaskId, kind: GestureKind) -> Option<&mut GestureSession> {
        if let Some(existing) = self.sessions.get(&id) {
            if existing.kind() != kind {
                tracing::debug!(
                    mask = %id,
                    active = ?existing.kind(),
                    requested = ?kind,
                    "ignoring frame for competing gesture"
                );
                return None;
            }
        } else {
            let anchor = self.mask(id)?.rect;
            tracing::debug!(mask = %id, ?kind, "gesture started");
            self.sessions
                .insert(id, GestureSession::begin(kind, id, anchor));
            self.selected = Some(id);
        }
        self.sessions.get_mut(&id)
    }

    fn commit(&mut self) {
        self.sink.store_masks(self.card_id, &self.masks);
    }
}
