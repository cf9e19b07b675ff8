//! Conversions between unit space and container pixels under "fit" scaling.
//!
//! The image is scaled to fit inside the container with its aspect ratio kept
//! and centred. `display_frame` and `normalized_delta` use the same scale
//! factor, so a screen-space drag converted to unit space lands exactly where
//! the forward mapping would draw it.

use crate::geometry::{NormalizedRect, Point, Rect, Size};

/// Scale factor fitting `image_size` inside `container_size`, or `None` when
/// there is no usable image.
pub fn fit_scale(image_size: Size, container_size: Size) -> Option<f64> {
    if image_size.is_empty() {
        return None;
    }
    let scale = (container_size.width / image_size.width)
        .min(container_size.height / image_size.height);
    scale.is_finite().then_some(scale.max(0.0))
}

/// The fitted image's rectangle inside the container.
pub fn image_frame(image_size: Size, container_size: Size) -> Rect {
    let Some(scale) = fit_scale(image_size, container_size) else {
        return Rect::ZERO;
    };
    let display = image_size.scaled(scale);
    let inset = Point::new(
        (container_size.width - display.width) / 2.0,
        (container_size.height - display.height) / 2.0,
    );
    Rect::from_origin_size(inset, display)
}

/// Maps a unit-space rectangle to container-local pixels.
///
/// A missing image (non-positive intrinsic size) yields [`Rect::ZERO`].
pub fn display_frame(rect: NormalizedRect, image_size: Size, container_size: Size) -> Rect {
    if fit_scale(image_size, container_size).is_none() {
        return Rect::ZERO;
    }
    let image = image_frame(image_size, container_size);
    Rect::new(
        image.x + rect.x() * image.width,
        image.y + rect.y() * image.height,
        rect.width() * image.width,
        rect.height() * image.height,
    )
}

/// Maps a screen-space translation to a unit-space delta.
///
/// Degenerate inputs (no image, or a fitted size of zero on either axis)
/// return [`Size::ZERO`] instead of dividing by zero.
pub fn normalized_delta(translation: Size, image_size: Size, container_size: Size) -> Size {
    let Some(scale) = fit_scale(image_size, container_size) else {
        return Size::ZERO;
    };
    let display = image_size.scaled(scale);
    if display.is_empty() {
        return Size::ZERO;
    }
    Size::new(
        translation.width / display.width,
        translation.height / display.height,
    )
}

/// Inverse of the forward mapping for a single container point.
///
/// The result is not clamped: points in the letterbox bands land outside
/// `[0,1]`. Returns `None` when there is no displayable image.
pub fn normalized_point(point: Point, image_size: Size, container_size: Size) -> Option<Point> {
    let image = image_frame(image_size, container_size);
    if image.size().is_empty() {
        return None;
    }
    Some(Point::new(
        (point.x - image.x) / image.width,
        (point.y - image.y) / image.height,
    ))
}
