use planpin_proto::{MarkupKind, MarkupRow, PinStatus, Point};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Default stroke color for rectangle markups.
pub const RECTANGLE_COLOR: &str = "#00A3E0";
/// Default stroke color for measurement lines.
pub const LINE_COLOR: &str = "#FF00AA";

/// Reference to the photo attached to a pin.
///
/// A pin owns its photo file exclusively until upload; afterwards it only
/// holds the URL of the backend-owned storage object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhotoRef {
    /// Captured file on the local device, not yet uploaded.
    Local(PathBuf),
    /// Public URL of the uploaded object.
    Uploaded(String),
}

/// A placed pin annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Normalized position on the floor-plan image.
    pub position: Point,
    pub status: PinStatus,
    /// Product code or similar identifier; never empty.
    pub label: String,
    pub comment: String,
    pub photo: Option<PhotoRef>,
}

/// A rectangle or measurement-line markup spanning two normalized points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markup {
    pub kind: MarkupKind,
    pub start: Point,
    pub end: Point,
    pub color: String,
    pub label: String,
    pub comment: String,
}

impl Markup {
    pub fn rectangle(start: Point, end: Point, label: String, comment: String) -> Self {
        Self {
            kind: MarkupKind::Rectangle,
            start,
            end,
            color: RECTANGLE_COLOR.to_string(),
            label,
            comment,
        }
    }

    pub fn line(start: Point, end: Point, label: String, comment: String) -> Self {
        Self {
            kind: MarkupKind::Line,
            start,
            end,
            color: LINE_COLOR.to_string(),
            label,
            comment,
        }
    }

    /// Length of the span in normalized units. No conversion to real-world
    /// units is attempted; measurement lines record the value in the comment.
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Wire row for the `markups` table.
    pub fn to_row(&self, floor_plan_id: Uuid) -> MarkupRow {
        MarkupRow {
            floor_plan_id,
            kind: self.kind,
            coordinates: [self.start, self.end],
            color: self.color.clone(),
            label: self.label.clone(),
            comment: self.comment.clone(),
        }
    }
}
