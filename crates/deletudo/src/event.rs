//! Geometry and synthetic interaction events.

use serde::{Deserialize, Serialize};

/// A point in viewport (client) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen bounding box of an element, as reported by
/// `getBoundingClientRect()`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Kind of synthetic event, in the order the synthesizer dispatches them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntheticEventKind {
    /// Primary button pressed
    PointerDown,
    /// Target gains focus
    FocusIn,
    /// Primary button released
    PointerUp,
    /// Primary click
    Click,
}

impl SyntheticEventKind {
    /// Dispatch order of a full activation
    pub const SEQUENCE: [Self; 4] = [Self::PointerDown, Self::FocusIn, Self::PointerUp, Self::Click];

    /// DOM event type string
    #[must_use]
    pub const fn dom_type(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::FocusIn => "focusin",
            Self::PointerUp => "mouseup",
            Self::Click => "click",
        }
    }

    /// Whether this is a mouse event carrying client coordinates
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        !matches!(self, Self::FocusIn)
    }
}

/// A single synthetic event ready for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    /// Event kind
    pub kind: SyntheticEventKind,
    /// Client coordinate for pointer events
    pub client: Option<Point>,
    /// Whether the event bubbles
    pub bubbles: bool,
    /// Whether the event is cancelable
    pub cancelable: bool,
}

impl SyntheticEvent {
    /// Create an event of `kind` at `at`; focus events drop the coordinate
    #[must_use]
    pub const fn new(kind: SyntheticEventKind, at: Point) -> Self {
        let pointer = kind.is_pointer();
        Self {
            kind,
            client: if pointer { Some(at) } else { None },
            bubbles: true,
            cancelable: pointer,
        }
    }

    /// DOM event type string
    #[must_use]
    pub const fn dom_type(&self) -> &'static str {
        self.kind.dom_type()
    }
}

/// The fixed pointer-down, focus-in, pointer-up, click sequence for one target.
///
/// Built fresh for every activation; all pointer events share one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticEventSequence {
    events: Vec<SyntheticEvent>,
}

impl SyntheticEventSequence {
    /// Build the sequence aimed at the center of `bounds`
    #[must_use]
    pub fn at_center_of(bounds: &BoundingBox) -> Self {
        let at = bounds.center();
        Self {
            events: SyntheticEventKind::SEQUENCE
                .iter()
                .map(|&kind| SyntheticEvent::new(kind, at))
                .collect(),
        }
    }

    /// Events in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = &SyntheticEvent> {
        self.events.iter()
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the sequence is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
