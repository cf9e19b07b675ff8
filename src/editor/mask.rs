use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{NormalizedRect, Rect, MIN_MASK_SIZE};

pub type MaskId = Uuid;

pub const DEFAULT_MASK_WIDTH: f64 = 0.3;
pub const DEFAULT_MASK_HEIGHT: f64 = 0.2;

/// A rectangular cover over part of a card image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MaskRecord", into = "MaskRecord")]
pub struct Mask {
    pub id: MaskId,
    pub rect: NormalizedRect,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mask {
    pub fn new(rect: NormalizedRect) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            rect,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mask with the default size, centred in the unit square.
    pub fn centered_default() -> Self {
        Self::new(default_mask_rect())
    }

    /// Stores a committed geometry change and refreshes `updated_at`.
    pub fn commit_rect(&mut self, rect: NormalizedRect) {
        self.rect = rect;
        self.updated_at = Utc::now();
    }
}

pub fn default_mask_rect() -> NormalizedRect {
    NormalizedRect::new(
        (1.0 - DEFAULT_MASK_WIDTH) / 2.0,
        (1.0 - DEFAULT_MASK_HEIGHT) / 2.0,
        DEFAULT_MASK_WIDTH,
        DEFAULT_MASK_HEIGHT,
    )
}

/// Re-establishes the mask invariants on an arbitrary unit-space rectangle.
///
/// Sizes are floored to [`MIN_MASK_SIZE`] (and capped at 1) before the origin
/// is clamped, so an undersized rectangle can never push its origin out of
/// range. `f64::max`/`min` drop NaN operands, which keeps the result finite.
pub fn clamp_rect(rect: Rect) -> NormalizedRect {
    let width = rect.width.max(MIN_MASK_SIZE).min(1.0);
    let height = rect.height.max(MIN_MASK_SIZE).min(1.0);
    let x = rect.x.max(0.0).min(1.0 - width);
    let y = rect.y.max(0.0).min(1.0 - height);
    NormalizedRect::from_clamped(x, y, width, height)
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaskRecord {
    id: Uuid,
    rect_x: f64,
    rect_y: f64,
    rect_width: f64,
    rect_height: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MaskRecord> for Mask {
    fn from(record: MaskRecord) -> Self {
        Self {
            id: record.id,
            rect: clamp_rect(Rect::new(
                record.rect_x,
                record.rect_y,
                record.rect_width,
                record.rect_height,
            )),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<Mask> for MaskRecord {
    fn from(mask: Mask) -> Self {
        Self {
            id: mask.id,
            rect_x: mask.rect.x(),
            rect_y: mask.rect.y(),
            rect_width: mask.rect.width(),
            rect_height: mask.rect.height(),
            created_at: mask.created_at,
            updated_at: mask.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{assert_close, assert_rect_close};

    #[test]
    fn clamp_pulls_overhanging_rect_back_inside() {
        let rect = clamp_rect(Rect::new(0.95, 0.95, 0.1, 0.1));
        assert_rect_close(rect.as_rect(), Rect::new(0.9, 0.9, 0.1, 0.1));
    }

    #[test]
    fn clamp_floors_size_before_clamping_origin() {
        let rect = clamp_rect(Rect::new(0.99, 0.99, 0.0, -0.3));
        assert_rect_close(rect.as_rect(), Rect::new(0.95, 0.95, 0.05, 0.05));
    }

    #[test]
    fn clamp_caps_oversized_rect_at_unit_square() {
        let rect = clamp_rect(Rect::new(-0.2, 0.4, 1.7, 3.0));
        assert_rect_close(rect.as_rect(), Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn clamp_is_idempotent_for_pathological_inputs() {
        let inputs = [
            Rect::new(-1.0, -1.0, 0.5, 0.5),
            Rect::new(2.0, 3.0, 0.01, 0.02),
            Rect::new(0.5, 0.5, 5.0, 0.0),
            Rect::new(0.3, 0.2, 0.4, 0.4),
            Rect::new(f64::NAN, 0.5, f64::NAN, 0.1),
            Rect::new(0.9999, 0.0, 0.05, 1.0),
        ];
        for input in inputs {
            let once = clamp_rect(input);
            let twice = clamp_rect(once.as_rect());
            assert_eq!(once, twice, "clamp not idempotent for {input:?}");
            assert!(once.x().is_finite() && once.width().is_finite());
            assert!(once.x() >= 0.0 && once.x() + once.width() <= 1.0 + 1e-12);
            assert!(once.y() >= 0.0 && once.y() + once.height() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn default_mask_is_centred_with_fixed_size() {
        let mask = Mask::centered_default();
        assert_close(mask.rect.x(), 0.35);
        assert_close(mask.rect.y(), 0.4);
        assert_close(mask.rect.width(), 0.3);
        assert_close(mask.rect.height(), 0.2);
        assert_eq!(mask.created_at, mask.updated_at);
    }

    #[test]
    fn commit_rect_refreshes_updated_at_only() {
        let mut mask = Mask::centered_default();
        let created = mask.created_at;
        mask.updated_at = created - chrono::Duration::seconds(10);
        mask.commit_rect(NormalizedRect::new(0.1, 0.1, 0.2, 0.2));
        assert_eq!(mask.created_at, created);
        assert!(mask.updated_at >= created);
        assert_close(mask.rect.x(), 0.1);
    }

    #[test]
    fn mask_serializes_with_flat_rect_fields() {
        let mask = Mask::new(NormalizedRect::new(0.1, 0.2, 0.3, 0.4));
        let json = serde_json::to_value(&mask).expect("mask should serialize");
        assert_eq!(json["rectX"], serde_json::json!(0.1));
        assert_eq!(json["rectHeight"], serde_json::json!(0.4));
        assert!(json["createdAt"].is_string());

        let decoded: Mask = serde_json::from_value(json).expect("mask should deserialize");
        assert_eq!(decoded, mask);
    }

    #[test]
    fn deserializing_out_of_range_rect_clamps_it() {
        let json = serde_json::json!({
            "id": "6f1d3c2e-8a4b-4c5d-9e6f-0a1b2c3d4e5f",
            "rectX": 0.95,
            "rectY": -0.1,
            "rectWidth": 0.1,
            "rectHeight": 0.01,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        });
        let mask: Mask = serde_json::from_value(json).expect("mask should deserialize");
        assert_close(mask.rect.x(), 0.9);
        assert_close(mask.rect.y(), 0.0);
        assert_close(mask.rect.height(), MIN_MASK_SIZE);
    }
}
