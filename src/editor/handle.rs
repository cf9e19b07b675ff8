use crate::geometry::{NormalizedRect, Point, Rect, Size, MIN_MASK_SIZE};

/// Half the side of a handle's square hit target, in container pixels.
pub const HANDLE_HIT_RADIUS: f64 = 7.0;

/// One of the four corner controls used to resize a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl MaskHandle {
    pub const ALL: [MaskHandle; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    const fn moves_left_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    const fn moves_top_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// The corner of `frame` this handle sits on.
    pub fn position(self, frame: Rect) -> Point {
        let x = if self.moves_left_edge() {
            frame.min_x()
        } else {
            frame.max_x()
        };
        let y = if self.moves_top_edge() {
            frame.min_y()
        } else {
            frame.max_y()
        };
        Point::new(x, y)
    }

    /// Rectangle produced by dragging this handle of `anchor` by `delta`
    /// (unit space), keeping the opposite corner fixed.
    ///
    /// Per axis, the handle's edge moves by the delta and the size changes by
    /// the same amount in the opposite sense. The dragged edge stops at the
    /// unit-square border and at [`MIN_MASK_SIZE`] from the fixed edge, so an
    /// over-drag leaves the rectangle pinned rather than sliding the anchor.
    pub fn resize(self, anchor: NormalizedRect, delta: Size) -> Rect {
        let (x, width) = resize_axis(
            anchor.x(),
            anchor.width(),
            delta.width,
            self.moves_left_edge(),
        );
        let (y, height) = resize_axis(
            anchor.y(),
            anchor.height(),
            delta.height,
            self.moves_top_edge(),
        );
        Rect::new(x, y, width, height)
    }
}

fn resize_axis(origin: f64, size: f64, delta: f64, moves_leading_edge: bool) -> (f64, f64) {
    let delta = if delta.is_finite() { delta } else { 0.0 };
    if moves_leading_edge {
        // Trailing edge stays put; leading edge may travel from 0 up to
        // `size - MIN` past its start.
        let bounded = delta.clamp(-origin, (size - MIN_MASK_SIZE).max(0.0));
        (origin + bounded, size - bounded)
    } else {
        let trailing_room = (1.0 - (origin + size)).max(0.0);
        let bounded = delta.clamp((MIN_MASK_SIZE - size).min(0.0), trailing_room);
        (origin, size + bounded)
    }
}

/// Handles at the corners of `frame`, in [`MaskHandle::ALL`] order.
pub fn handle_positions(frame: Rect) -> [(MaskHandle, Point); 4] {
    MaskHandle::ALL.map(|handle| (handle, handle.position(frame)))
}

/// Handle whose hit target contains `point`, if any.
pub fn handle_at_point(frame: Rect, point: Point) -> Option<MaskHandle> {
    handle_positions(frame)
        .into_iter()
        .find(|(_, corner)| {
            (point.x - corner.x).abs() <= HANDLE_HIT_RADIUS
                && (point.y - corner.y).abs() <= HANDLE_HIT_RADIUS
        })
        .map(|(handle, _)| handle)
}
