//! Host-agnostic pointer events.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Physical pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Extra,
}

impl PointerButton {
    pub fn label(self) -> &'static str {
        match self {
            PointerButton::Primary => "primary",
            PointerButton::Secondary => "secondary",
            PointerButton::Middle => "middle",
            PointerButton::Extra => "extra",
        }
    }
}

/// Which listener an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// A single pointer event in page space.
///
/// For `Down`/`Up`, `button` is the button that changed state. For `Move` it is the
/// button held during the move, or `None` when nothing is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
    pub button: Option<PointerButton>,
}

impl PointerEvent {
    pub fn down(position: Point, button: PointerButton) -> Self {
        Self {
            kind: PointerEventKind::Down,
            position,
            button: Some(button),
        }
    }

    pub fn moved(position: Point, held: Option<PointerButton>) -> Self {
        Self {
            kind: PointerEventKind::Move,
            position,
            button: held,
        }
    }

    pub fn up(position: Point, button: PointerButton) -> Self {
        Self {
            kind: PointerEventKind::Up,
            position,
            button: Some(button),
        }
    }

    pub fn is_button(&self, button: PointerButton) -> bool {
        self.button == Some(button)
    }
}
