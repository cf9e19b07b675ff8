//! Study view: pan/zoom of the card image and mask reveal state.

pub mod reveal;

use crate::editor::fit::image_frame;
use crate::editor::overlay::{build_overlays, MaskOverlay, OverlayOptions};
use crate::editor::{FitContext, Mask};
use crate::geometry::{Point, Rect, Size};
use crate::storage::CardId;

pub use reveal::{RevealState, PEEK_PRESS_MIN_DURATION};

pub const MIN_ZOOM_SCALE: f64 = 1.0;
pub const MAX_ZOOM_SCALE: f64 = 5.0;

fn clamp_zoom_scale(scale: f64) -> f64 {
    scale.max(MIN_ZOOM_SCALE).min(MAX_ZOOM_SCALE)
}

fn sanitize_magnification(magnification: f64) -> f64 {
    if magnification.is_finite() && magnification > 0.0 {
        magnification
    } else {
        1.0
    }
}

/// Scale about the container centre followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Point::ZERO,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Maps a container-local point to where it is drawn on screen.
    pub fn apply(&self, point: Point, container_size: Size) -> Point {
        let cx = container_size.width / 2.0;
        let cy = container_size.height / 2.0;
        Point::new(
            cx + (point.x - cx) * self.scale + self.offset.x,
            cy + (point.y - cy) * self.scale + self.offset.y,
        )
    }

    /// Inverse of [`ViewTransform::apply`].
    pub fn invert(&self, point: Point, container_size: Size) -> Point {
        let cx = container_size.width / 2.0;
        let cy = container_size.height / 2.0;
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Point::new(
            cx + (point.x - self.offset.x - cx) / scale,
            cy + (point.y - self.offset.y - cy) / scale,
        )
    }

    pub fn apply_rect(&self, rect: Rect, container_size: Size) -> Rect {
        let origin = self.apply(rect.origin(), container_size);
        Rect::from_origin_size(origin, rect.size().scaled(self.scale))
    }
}

/// Persisted pan/zoom plus the live values of an in-flight pinch or pan.
///
/// Live values are merged only when their gesture ends. Pan and pinch may run
/// at the same time.
#[derive(Debug, Clone, PartialEq)]
pub struct PanZoom {
    allow_zoom: bool,
    committed: ViewTransform,
    live_scale: Option<f64>,
    live_offset: Option<Point>,
}

impl Default for PanZoom {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PanZoom {
    pub const fn new(allow_zoom: bool) -> Self {
        Self {
            allow_zoom,
            committed: ViewTransform::IDENTITY,
            live_scale: None,
            live_offset: None,
        }
    }

    pub const fn allow_zoom(&self) -> bool {
        self.allow_zoom
    }

    pub fn set_allow_zoom(&mut self, allow_zoom: bool) {
        self.allow_zoom = allow_zoom;
        if !allow_zoom {
            self.cancel_gestures();
        }
    }

    /// The persisted transform, without any live gesture.
    pub const fn committed(&self) -> ViewTransform {
        self.committed
    }

    pub const fn is_gesturing(&self) -> bool {
        self.live_scale.is_some() || self.live_offset.is_some()
    }

    pub fn pan_changed(&mut self, translation: Point) -> bool {
        if !self.allow_zoom {
            return false;
        }
        self.live_offset = Some(translation);
        true
    }

    pub fn pan_ended(&mut self, translation: Point) -> bool {
        if !self.allow_zoom {
            return false;
        }
        self.live_offset = None;
        self.committed.offset = self.committed.offset.offset_by(translation.x, translation.y);
        true
    }

    pub fn zoom_changed(&mut self, magnification: f64) -> bool {
        if !self.allow_zoom {
            return false;
        }
        self.live_scale = Some(sanitize_magnification(magnification));
        true
    }

    pub fn zoom_ended(&mut self, magnification: f64) -> bool {
        if !self.allow_zoom {
            return false;
        }
        self.live_scale = None;
        self.committed.scale =
            clamp_zoom_scale(self.committed.scale * sanitize_magnification(magnification));
        tracing::debug!(scale = self.committed.scale, "zoom committed");
        true
    }

    pub fn cancel_gestures(&mut self) {
        self.live_scale = None;
        self.live_offset = None;
    }

    /// Double tap: back to the fitted 1:1 view.
    pub fn reset(&mut self) {
        self.cancel_gestures();
        self.committed = ViewTransform::IDENTITY;
    }

    /// Transform to apply to both the image and the mask layer this frame.
    pub fn combined(&self) -> ViewTransform {
        if !self.allow_zoom {
            return ViewTransform::IDENTITY;
        }
        let live_offset = self.live_offset.unwrap_or(Point::ZERO);
        ViewTransform {
            scale: self.committed.scale * self.live_scale.unwrap_or(1.0),
            offset: self.committed.offset.offset_by(live_offset.x, live_offset.y),
        }
    }
}

/// Study session for one card.
#[derive(Debug, Clone)]
pub struct CardViewer {
    card_id: CardId,
    image_size: Option<Size>,
    container_size: Size,
    pan_zoom: PanZoom,
    reveal: RevealState,
}

impl CardViewer {
    pub fn new(card_id: CardId, image_size: Option<Size>) -> Self {
        Self {
            card_id,
            image_size,
            container_size: Size::ZERO,
            pan_zoom: PanZoom::new(true),
            reveal: RevealState::new(),
        }
    }

    pub const fn card_id(&self) -> CardId {
        self.card_id
    }

    /// Switches to another card. The view returns to the fitted frame; the
    /// hide toggle carries over.
    pub fn show_card(&mut self, card_id: CardId, image_size: Option<Size>) {
        self.card_id = card_id;
        self.image_size = image_size;
        self.pan_zoom.reset();
        self.reveal.end_peek();
    }

    pub fn set_container_size(&mut self, container_size: Size) {
        self.container_size = container_size;
    }

    pub fn pan_zoom(&self) -> &PanZoom {
        &self.pan_zoom
    }

    pub fn pan_zoom_mut(&mut self) -> &mut PanZoom {
        &mut self.pan_zoom
    }

    pub fn reveal(&self) -> &RevealState {
        &self.reveal
    }

    pub fn reveal_mut(&mut self) -> &mut RevealState {
        &mut self.reveal
    }

    /// Screen rectangle of the image, `None` without an image.
    pub fn image_frame(&self) -> Option<Rect> {
        let image_size = self.image_size.filter(|size| !size.is_empty())?;
        let frame = image_frame(image_size, self.container_size);
        Some(
            self.pan_zoom
                .combined()
                .apply_rect(frame, self.container_size),
        )
    }

    /// Mask overlays with the same combined transform as the image applied.
    pub fn overlays(&self, masks: &[Mask]) -> Vec<MaskOverlay> {
        let transform = self.pan_zoom.combined();
        let mut overlays = build_overlays(
            masks.iter().map(|mask| (mask.id, mask.rect)),
            &FitContext::new(self.image_size, self.container_size),
            OverlayOptions {
                editing: false,
                hidden: self.reveal.masks_hidden(),
                selected: None,
            },
        );
        if !transform.is_identity() {
            for overlay in &mut overlays {
                if overlay.frame != Rect::ZERO {
                    overlay.frame = transform.apply_rect(overlay.frame, self.container_size);
                }
            }
        }
        overlays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{assert_close, assert_rect_close, NormalizedRect};
    use uuid::Uuid;

    #[test]
    fn pan_accumulates_on_end() {
        let mut pan_zoom = PanZoom::new(true);
        pan_zoom.pan_ended(Point::new(10.0, 5.0));
        pan_zoom.pan_ended(Point::new(-4.0, 5.0));
        assert_eq!(pan_zoom.committed().offset, Point::new(6.0, 10.0));
    }

    #[test]
    fn zoom_composes_multiplicatively_and_clamps() {
        let mut pan_zoom = PanZoom::new(true);
        pan_zoom.zoom_ended(2.0);
        pan_zoom.zoom_ended(1.5);
        assert_close(pan_zoom.committed().scale, 3.0);
        pan_zoom.zoom_ended(4.0);
        assert_close(pan_zoom.committed().scale, MAX_ZOOM_SCALE);
        pan_zoom.zoom_ended(0.01);
        assert_close(pan_zoom.committed().scale, MIN_ZOOM_SCALE);
        pan_zoom.zoom_ended(f64::NAN);
        assert_close(pan_zoom.committed().scale, MIN_ZOOM_SCALE);
    }

    #[test]
    fn live_gesture_is_combined_but_not_persisted() {
        let mut pan_zoom = PanZoom::new(true);
        pan_zoom.zoom_ended(2.0);
        pan_zoom.pan_ended(Point::new(10.0, 0.0));

        pan_zoom.zoom_changed(1.5);
        pan_zoom.pan_changed(Point::new(0.0, 20.0));
        let combined = pan_zoom.combined();
        assert_close(combined.scale, 3.0);
        assert_eq!(combined.offset, Point::new(10.0, 20.0));
        assert_close(pan_zoom.committed().scale, 2.0);

        pan_zoom.cancel_gestures();
        assert!(!pan_zoom.is_gesturing());
        assert_eq!(pan_zoom.combined(), pan_zoom.committed());
    }

    #[test]
    fn live_scale_may_exceed_bounds_until_committed() {
        let mut pan_zoom = PanZoom::new(true);
        pan_zoom.zoom_changed(0.5);
        assert_close(pan_zoom.combined().scale, 0.5);
        pan_zoom.zoom_ended(0.5);
        assert_close(pan_zoom.combined().scale, 1.0);
    }

    #[test]
    fn double_tap_resets_to_identity() {
        let mut pan_zoom = PanZoom::new(true);
        pan_zoom.zoom_ended(3.0);
        pan_zoom.pan_ended(Point::new(30.0, -12.0));
        pan_zoom.zoom_changed(1.2);
        pan_zoom.reset();
        assert!(pan_zoom.combined().is_identity());
        assert!(!pan_zoom.is_gesturing());
    }

    #[test]
    fn disabled_zoom_ignores_gestures() {
        let mut pan_zoom = PanZoom::new(false);
        assert!(!pan_zoom.zoom_ended(3.0));
        assert!(!pan_zoom.pan_changed(Point::new(4.0, 4.0)));
        assert!(pan_zoom.combined().is_identity());

        let mut enabled = PanZoom::new(true);
        enabled.zoom_ended(2.0);
        enabled.set_allow_zoom(false);
        assert!(enabled.combined().is_identity());
    }

    #[test]
    fn transform_scales_about_centre_and_inverts() {
        let container = Size::new(200.0, 100.0);
        let transform = ViewTransform {
            scale: 2.0,
            offset: Point::new(5.0, -5.0),
        };
        let mapped = transform.apply(Point::new(150.0, 50.0), container);
        assert_eq!(mapped, Point::new(205.0, 45.0));
        let back = transform.invert(mapped, container);
        assert_close(back.x, 150.0);
        assert_close(back.y, 50.0);
    }

    #[test]
    fn overlays_stay_pinned_to_image_through_live_zoom() {
        let mut viewer = CardViewer::new(Uuid::new_v4(), Some(Size::new(200.0, 100.0)));
        viewer.set_container_size(Size::new(100.0, 100.0));
        let mask = Mask::new(NormalizedRect::new(0.0, 0.0, 1.0, 1.0));

        viewer.pan_zoom_mut().zoom_ended(2.0);
        viewer.pan_zoom_mut().zoom_changed(1.25);
        viewer.pan_zoom_mut().pan_changed(Point::new(8.0, 3.0));

        let image = viewer.image_frame().expect("image is present");
        let overlays = viewer.overlays(std::slice::from_ref(&mask));
        assert_rect_close(overlays[0].frame, image);
        assert!(overlays[0].hidden);
        assert!(overlays[0].handles.is_none());
    }

    #[test]
    fn peek_reveals_masks_in_overlays() {
        let mut viewer = CardViewer::new(Uuid::new_v4(), Some(Size::new(10.0, 10.0)));
        viewer.set_container_size(Size::new(10.0, 10.0));
        let masks = [Mask::centered_default()];
        viewer.reveal_mut().begin_peek();
        assert!(!viewer.overlays(&masks)[0].hidden);
    }

    #[test]
    fn switching_cards_resets_view_but_keeps_hide_toggle() {
        let mut viewer = CardViewer::new(Uuid::new_v4(), None);
        assert!(viewer.image_frame().is_none());
        viewer.reveal_mut().set_hide_mode(false);
        viewer.pan_zoom_mut().zoom_ended(2.0);

        let next = Uuid::new_v4();
        viewer.show_card(next, Some(Size::new(4.0, 3.0)));
        assert_eq!(viewer.card_id(), next);
        assert!(viewer.pan_zoom().combined().is_identity());
        assert!(!viewer.reveal().hide_mode());
    }
}
