//! Input model: modifier keys, buttons, keys, cursors, and the gesture state machines.
//!
//! `Gesture` is the pointer interaction tracked between pointer-down and
//! pointer-up. `DragUndo` runs alongside it and records whether the gesture
//! actually changed the document, so only real changes open an undo action.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use crate::camera::Point;
use crate::element::ViewId;
use crate::handle::{HandleKind, ResizeAnchor};
use crate::model::GraphId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true, ctrl: false, alt: false, meta: false };
    pub const CTRL: Modifiers = Modifiers { shift: false, ctrl: true, alt: false, meta: false };

    /// Click toggles selection membership instead of replacing it.
    #[must_use]
    pub fn multi_select(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Rotation snaps to the configured angle step.
    #[must_use]
    pub fn snap(self) -> bool {
        self.shift
    }

    /// Platform command modifier for keyboard shortcuts.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key name as reported by the host (`"Delete"`, `"ArrowLeft"`, `"g"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Pointer cursor the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Move,
    Resize(ResizeAnchor),
    Rotate,
    /// Over a link anchor.
    Link,
    Crosshair,
}

/// Feedback for the host produced by input handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The set of selected model elements changed.
    SelectionChanged(Vec<GraphId>),
    /// The user double-clicked an element and wants its property dialog.
    EditPropertiesRequested(GraphId),
    SetCursor(Cursor),
    /// Elements under the pointer changed.
    Hover { entered: Vec<GraphId>, exited: Vec<GraphId> },
    /// A template inserted these elements.
    Inserted(Vec<GraphId>),
}

/// What a drag moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    /// Every selected element, by the pointer delta.
    Selection,
    /// One handle of one element.
    Handle { owner: ViewId, kind: HandleKind },
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        target: DragTarget,
        /// Model-space pointer position at the previous event.
        last: Point,
    },
    RubberBand {
        /// Selection kept regardless of the band (modifier held at press).
        base: BTreeSet<ViewId>,
    },
}

impl Gesture {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Whether the current gesture produced a change worth an undo entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragUndo {
    #[default]
    NotRecording,
    /// A pre-gesture snapshot was taken; nothing changed yet.
    ChangeStarted,
    Changed,
}

impl DragUndo {
    /// Begin recording a gesture.
    #[must_use]
    pub fn start(self) -> Self {
        Self::ChangeStarted
    }

    /// Note a document change. Only a started recording becomes `Changed`.
    #[must_use]
    pub fn touch(self) -> Self {
        match self {
            Self::ChangeStarted | Self::Changed => Self::Changed,
            Self::NotRecording => Self::NotRecording,
        }
    }
}
