use super::fit::normalized_delta;
use super::handle::MaskHandle;
use super::mask::{clamp_rect, MaskId};
use crate::geometry::{NormalizedRect, Size};

/// Part of a mask overlay a pointer stream started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Body,
    Handle(MaskHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(MaskHandle),
}

impl From<PointerTarget> for GestureKind {
    fn from(target: PointerTarget) -> Self {
        match target {
            PointerTarget::Body => Self::Move,
            PointerTarget::Handle(handle) => Self::Resize(handle),
        }
    }
}

/// Image and container sizes a gesture frame is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitContext {
    pub image_size: Option<Size>,
    pub container_size: Size,
}

impl FitContext {
    pub const fn new(image_size: Option<Size>, container_size: Size) -> Self {
        Self {
            image_size,
            container_size,
        }
    }

    pub fn normalized_delta(&self, translation: Size) -> Size {
        match self.image_size {
            Some(image_size) => normalized_delta(translation, image_size, self.container_size),
            None => Size::ZERO,
        }
    }
}

/// One in-flight move or resize of a single mask.
///
/// Created on the first movement frame and dropped when the gesture ends or is
/// cancelled. Every frame is recomputed from `anchor`, never from the previous
/// frame, so the outcome depends only on the total translation.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    kind: GestureKind,
    target: MaskId,
    anchor: NormalizedRect,
    current: NormalizedRect,
}

impl GestureSession {
    pub fn begin(kind: GestureKind, target: MaskId, anchor: NormalizedRect) -> Self {
        Self {
            kind,
            target,
            anchor,
            current: anchor,
        }
    }

    pub const fn kind(&self) -> GestureKind {
        self.kind
    }

    pub const fn target(&self) -> MaskId {
        self.target
    }

    pub const fn anchor(&self) -> NormalizedRect {
        self.anchor
    }

    /// Working rectangle after the latest frame.
    pub const fn current(&self) -> NormalizedRect {
        self.current
    }

    /// Applies the cumulative `translation` (screen pixels since gesture
    /// start) and returns the new working rectangle.
    pub fn update(&mut self, translation: Size, context: &FitContext) -> NormalizedRect {
        let delta = context.normalized_delta(translation);
        self.current = match self.kind {
            GestureKind::Move => clamp_rect(
                self.anchor
                    .as_rect()
                    .translated(delta.width, delta.height),
            ),
            GestureKind::Resize(handle) => clamp_rect(handle.resize(self.anchor, delta)),
        };
        self.current
    }
}
