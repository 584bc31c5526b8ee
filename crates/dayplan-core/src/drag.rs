//! Drag-and-drop reclassification as a small state machine.
//!
//! A drag starts on a task, tracks the section under the pointer and, on
//! release over a section, yields the [`Reclassify`] to apply. Releasing
//! anywhere else goes straight back to idle without touching the task.

use crate::{
    projection::SectionKind,
    tasks::{Priority, Task},
};

/// Vertical extent of a rendered section, in the same units as pointer positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    pub kind: SectionKind,
    pub y: f32,
    pub height: f32,
}

impl SectionBounds {
    pub fn contains(&self, y: f32) -> bool {
        self.y <= y && y <= self.y + self.height
    }
}

/// First section whose bounds contain `y`.
pub fn hit_test(layout: &[SectionBounds], y: f32) -> Option<SectionKind> {
    layout.iter().find(|b| b.contains(y)).map(|b| b.kind)
}

/// Priority/completion to write back for a dropped task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reclassify {
    pub id: u64,
    pub priority: Priority,
    pub completed: bool,
}

impl Reclassify {
    /// Dropping on Completed keeps the task's priority; dropping on a
    /// priority section moves it there and marks it open again.
    pub fn onto(id: u64, current: Priority, target: SectionKind) -> Self {
        match target.priority() {
            Some(priority) => Self {
                id,
                priority,
                completed: false,
            },
            None => Self {
                id,
                priority: current,
                completed: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: u64,
        priority: Priority,
        hover: Option<SectionKind>,
    },
    /// Interrupted drag animating back to its origin.
    Settling { id: u64 },
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    pub fn dragged_id(&self) -> Option<u64> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { id, .. } | DragState::Settling { id } => Some(*id),
        }
    }

    pub fn hover(&self) -> Option<SectionKind> {
        match self {
            DragState::Dragging { hover, .. } => *hover,
            _ => None,
        }
    }

    /// Picks up `task`. Ignored unless idle.
    pub fn start(&mut self, task: &Task) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = DragState::Dragging {
            id: task.id,
            priority: task.priority,
            hover: None,
        };
        true
    }

    /// Records the section under the pointer; `true` when it changed.
    pub fn hover_over(&mut self, target: Option<SectionKind>) -> bool {
        match self {
            DragState::Dragging { hover, .. } if *hover != target => {
                *hover = target;
                true
            }
            _ => false,
        }
    }

    /// Pointer-driven variant of [`DragState::hover_over`].
    pub fn pointer_moved(&mut self, layout: &[SectionBounds], y: f32) -> bool {
        self.hover_over(hit_test(layout, y))
    }

    /// Ends the drag. Returns the change to commit when released over a section.
    pub fn release(&mut self) -> Option<Reclassify> {
        let DragState::Dragging {
            id,
            priority,
            hover,
        } = *self
        else {
            return None;
        };
        *self = DragState::Idle;
        hover.map(|target| Reclassify::onto(id, priority, target))
    }

    /// Aborts the drag without a commit.
    pub fn cancel(&mut self) {
        if let DragState::Dragging { id, .. } = *self {
            *self = DragState::Settling { id };
        }
    }

    /// Return animation finished.
    pub fn settled(&mut self) {
        if matches!(self, DragState::Settling { .. }) {
            *self = DragState::Idle;
        }
    }
}
