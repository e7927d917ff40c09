use crate::error::ValidationError;
use crate::models::{Markup, PhotoRef, Pin};
use planpin_proto::{MarkupKind, PinStatus, Point};

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Pin,
    Rectangle,
    Line,
}

/// Two-click shape construction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum ShapeState {
    #[default]
    Idle,
    AwaitingSecondPoint {
        anchor: Point,
    },
}

/// What a tap produced, telling the caller which input to collect next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// Pin mode: a site was chosen; collect the pin fields and call
    /// [`CaptureSession::add_pin`].
    PinSite(Point),
    /// Shape mode: the anchor was stored; the next tap completes the span.
    Anchored(Point),
    /// Shape mode: the span is complete; collect label and comment and call
    /// [`CaptureSession::add_markup`].
    SpanComplete { start: Point, end: Point },
}

/// In-progress annotation capture for one floor-plan view.
///
/// Shape completion is driven as an explicit state machine over discrete tap
/// events, so the construction logic is independent of the input modality
/// (tap, dialog, form). No partial shape ever persists: switching modes
/// discards a pending anchor.
#[derive(Debug, Default)]
pub struct CaptureSession {
    mode: DrawMode,
    state: ShapeState,
    pins: Vec<Pin>,
    markups: Vec<Markup>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Switch drawing mode; a pending shape anchor is discarded.
    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
        self.state = ShapeState::Idle;
    }

    /// Whether a first shape point is waiting for its partner.
    pub fn awaiting_second_point(&self) -> bool {
        matches!(self.state, ShapeState::AwaitingSecondPoint { .. })
    }

    /// Feed a tap at a normalized position.
    pub fn tap(&mut self, point: Point) -> TapOutcome {
        match self.mode {
            DrawMode::Pin => TapOutcome::PinSite(point),
            DrawMode::Rectangle | DrawMode::Line => match self.state {
                ShapeState::Idle => {
                    self.state = ShapeState::AwaitingSecondPoint { anchor: point };
                    TapOutcome::Anchored(point)
                }
                ShapeState::AwaitingSecondPoint { anchor } => {
                    self.state = ShapeState::Idle;
                    TapOutcome::SpanComplete {
                        start: anchor,
                        end: point,
                    }
                }
            },
        }
    }

    /// Accept a pin once its fields have been collected.
    ///
    /// Hard preconditions, not warnings: the label must be non-empty, and any
    /// status other than complete requires a photo. A rejected pin never
    /// enters the session (and so can never reach the queue or backend).
    pub fn add_pin(
        &mut self,
        position: Point,
        status: PinStatus,
        label: String,
        comment: String,
        photo: Option<PhotoRef>,
    ) -> Result<&Pin, ValidationError> {
        if label.trim().is_empty() {
            return Err(ValidationError::MissingLabel);
        }
        if status.requires_photo() && photo.is_none() {
            return Err(ValidationError::PhotoRequired { status });
        }
        self.pins.push(Pin {
            position,
            status,
            label,
            comment,
            photo,
        });
        Ok(self.pins.last().unwrap())
    }

    /// Accept a completed rectangle or line span.
    pub fn add_markup(
        &mut self,
        kind: MarkupKind,
        start: Point,
        end: Point,
        label: String,
        comment: String,
    ) -> &Markup {
        let markup = match kind {
            MarkupKind::Rectangle => Markup::rectangle(start, end, label, comment),
            MarkupKind::Line => Markup::line(start, end, label, comment),
        };
        self.markups.push(markup);
        self.markups.last().unwrap()
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn markups(&self) -> &[Markup] {
        &self.markups
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.markups.is_empty()
    }
}
