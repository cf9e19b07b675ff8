use super::fit::display_frame;
use super::gesture::FitContext;
use super::handle::{handle_positions, MaskHandle};
use super::mask::MaskId;
use crate::geometry::{NormalizedRect, Point, Rect};

/// Everything the presentation layer needs to draw and hit-test one mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOverlay {
    pub id: MaskId,
    /// Container-local frame of the mask.
    pub frame: Rect,
    pub selected: bool,
    /// Drawn opaque when true, outlined otherwise.
    pub hidden: bool,
    /// Resize handles, present only in edit mode.
    pub handles: Option<[(MaskHandle, Point); 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayOptions {
    pub editing: bool,
    pub hidden: bool,
    pub selected: Option<MaskId>,
}

/// Builds overlays in z-order (first entry drawn first, last on top).
pub fn build_overlays<I>(masks: I, context: &FitContext, options: OverlayOptions) -> Vec<MaskOverlay>
where
    I: IntoIterator<Item = (MaskId, NormalizedRect)>,
{
    masks
        .into_iter()
        .map(|(id, rect)| {
            let frame = context
                .image_size
                .map(|image_size| display_frame(rect, image_size, context.container_size))
                .unwrap_or(Rect::ZERO);
            MaskOverlay {
                id,
                frame,
                selected: options.selected == Some(id),
                hidden: options.hidden,
                handles: options.editing.then(|| handle_positions(frame)),
            }
        })
        .collect()
}

/// Topmost overlay whose frame contains `point`.
pub fn top_overlay_at_point(overlays: &[MaskOverlay], point: Point) -> Option<&MaskOverlay> {
    overlays
        .iter()
        .rev()
        .find(|overlay| overlay.frame.size().width > 0.0 && overlay.frame.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use uuid::Uuid;

    fn context() -> FitContext {
        FitContext::new(Some(Size::new(200.0, 100.0)), Size::new(100.0, 100.0))
    }

    #[test]
    fn viewer_overlays_have_no_handles_and_carry_hidden_flag() {
        let id = Uuid::new_v4();
        let overlays = build_overlays(
            [(id, NormalizedRect::new(0.25, 0.25, 0.5, 0.5))],
            &context(),
            OverlayOptions {
                editing: false,
                hidden: true,
                selected: None,
            },
        );
        assert_eq!(overlays.len(), 1);
        assert!(overlays[0].hidden);
        assert!(!overlays[0].selected);
        assert!(overlays[0].handles.is_none());
        assert_eq!(overlays[0].frame, Rect::new(25.0, 37.5, 50.0, 25.0));
    }

    #[test]
    fn editing_overlays_place_handles_on_frame_corners() {
        let id = Uuid::new_v4();
        let overlays = build_overlays(
            [(id, NormalizedRect::new(0.25, 0.25, 0.5, 0.5))],
            &context(),
            OverlayOptions {
                editing: true,
                hidden: false,
                selected: Some(id),
            },
        );
        let handles = overlays[0].handles.expect("edit mode shows handles");
        assert!(overlays[0].selected);
        assert_eq!(handles[0].1, Point::new(25.0, 37.5));
        assert_eq!(handles[3].1, Point::new(75.0, 62.5));
    }

    #[test]
    fn later_overlays_win_hit_tests() {
        let bottom = Uuid::new_v4();
        let top = Uuid::new_v4();
        let overlays = build_overlays(
            [
                (bottom, NormalizedRect::new(0.0, 0.0, 0.6, 0.6)),
                (top, NormalizedRect::new(0.4, 0.4, 0.6, 0.6)),
            ],
            &context(),
            OverlayOptions::default(),
        );
        let hit = top_overlay_at_point(&overlays, Point::new(50.0, 50.0)).expect("overlap hit");
        assert_eq!(hit.id, top);
        let hit = top_overlay_at_point(&overlays, Point::new(10.0, 30.0)).expect("bottom hit");
        assert_eq!(hit.id, bottom);
        assert!(top_overlay_at_point(&overlays, Point::new(50.0, 5.0)).is_none());
    }

    #[test]
    fn missing_image_produces_zero_frames_that_never_hit() {
        let overlays = build_overlays(
            [(Uuid::new_v4(), NormalizedRect::new(0.0, 0.0, 1.0, 1.0))],
            &FitContext::new(None, Size::new(100.0, 100.0)),
            OverlayOptions::default(),
        );
        assert_eq!(overlays[0].frame, Rect::ZERO);
        assert!(top_overlay_at_point(&overlays, Point::ZERO).is_none());
    }
}
