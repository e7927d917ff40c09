use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A position expressed as a fraction of the rendered image size,
/// independent of display resolution.
///
/// Both components lie in `[0, 1]`; producers clamp rather than emit
/// out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point clamped into the unit square.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }

    pub fn in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Installation status recorded on a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinStatus {
    Complete,
    Damage,
    Snag,
    Missing,
}

impl PinStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PinStatus::Complete => "complete",
            PinStatus::Damage => "damage",
            PinStatus::Snag => "snag",
            PinStatus::Missing => "missing",
        }
    }

    /// Anything other than a clean completion must be documented with a photo.
    pub fn requires_photo(self) -> bool {
        !matches!(self, PinStatus::Complete)
    }
}

impl std::fmt::Display for PinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-resolved row destined for the `pins` table.
///
/// `photo_url` is resolved before the row is built; rows never carry
/// device-local photo references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinRow {
    pub floor_plan_id: Uuid,
    pub x_coord: f64,
    pub y_coord: f64,
    pub status: PinStatus,
    pub label: String,
    pub comment: String,
    pub photo_url: Option<String>,
}

/// Shape discriminator for a markup row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    Rectangle,
    Line,
}

/// A rectangle or measurement line destined for the `markups` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupRow {
    pub floor_plan_id: Uuid,
    #[serde(rename = "type")]
    pub kind: MarkupKind,
    pub coordinates: [Point; 2],
    pub color: String,
    pub label: String,
    pub comment: String,
}

/// A submitted structured form destined for the `form_responses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponseRow {
    pub form_id: Uuid,
    pub project_id: Uuid,
    pub submitted_by: Uuid,
    pub data: Map<String, Value>,
}

/// One immutable revision of a project's floor-plan image.
///
/// Per project, `version_number` is strictly increasing and gapless from 1;
/// the highest number is the version shown by default. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanVersion {
    pub id: Uuid,
    pub project_id: Uuid,
    pub version_number: u32,
    pub file_url: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Logical queue partition for offline writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Pins,
    FormResponses,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Pins, Category::FormResponses];

    /// Stable key under which the category's pending batches are persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            Category::Pins => "offline_pins",
            Category::FormResponses => "offline_forms",
        }
    }
}

/// An atomic unit of queued rows destined for one backend table.
///
/// A batch is created at save time with fully-resolved rows and is never
/// partially mutated afterwards; it either reaches the backend whole or is
/// retained whole for the next attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteBatch {
    Pins {
        project_id: Uuid,
        floor_plan_id: Uuid,
        rows: Vec<PinRow>,
    },
    FormResponse {
        row: FormResponseRow,
    },
}

impl WriteBatch {
    pub fn category(&self) -> Category {
        match self {
            WriteBatch::Pins { .. } => Category::Pins,
            WriteBatch::FormResponse { .. } => Category::FormResponses,
        }
    }

    /// Number of backend rows the batch carries.
    pub fn row_count(&self) -> usize {
        match self {
            WriteBatch::Pins { rows, .. } => rows.len(),
            WriteBatch::FormResponse { .. } => 1,
        }
    }
}
