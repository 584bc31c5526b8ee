use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use dayplan_core::{
    drag::{DragState, Reclassify, SectionBounds},
    navigation::Direction,
    projection::{DayProjection, SectionKind},
};
use ratatui::layout::{Margin, Position, Rect};

/// Swipe units per terminal column; a drag across roughly ten columns of the
/// header changes the day.
const CELL_WIDTH: f32 = 8.0;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Reload,
    Step(Direction),
    Toggle(u64),
    Delete(u64),
    Drop(Reclassify),
}

/// Where the header and task list were drawn on the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Screen {
    pub header: Rect,
    pub list: Rect,
}

/// Selection, drag and status line of the day screen. Holds no tasks; every
/// call gets the current projection.
#[derive(Debug, Default)]
pub struct DayView {
    selected: usize,
    pub drag: DragState,
    pub status: Option<String>,
    pub screen: Screen,
    swipe_from: Option<u16>,
}

impl DayView {
    /// Index into the day's tasks in display order.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_id(&self, day: &DayProjection<'_>) -> Option<u64> {
        day.ordered().nth(self.selected).map(|t| t.id)
    }

    /// Keeps the selection inside the day after the list shrank.
    pub fn clamp(&mut self, day: &DayProjection<'_>) {
        self.selected = self.selected.min(day.total().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyCode, day: &DayProjection<'_>) -> Action {
        if matches!(self.drag, DragState::Dragging { .. }) {
            return self.handle_drag_key(key);
        }
        self.status = None;

        match key {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Left | KeyCode::Char('h') => self.step(Direction::Backward),
            KeyCode::Right | KeyCode::Char('l') => self.step(Direction::Forward),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < day.total() {
                    self.selected += 1;
                }
                Action::None
            }
            KeyCode::Char(' ') => self.selected_id(day).map_or(Action::None, Action::Toggle),
            KeyCode::Char('x') => self.selected_id(day).map_or(Action::None, Action::Delete),
            KeyCode::Char('g') => {
                if let Some(task) = day.ordered().nth(self.selected) {
                    self.drag.start(task);
                    self.drag.hover_over(Some(SectionKind::of_task(task)));
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_drag_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.drag.hover_over(Some(cycle(self.drag.hover(), false)));
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.drag.hover_over(Some(cycle(self.drag.hover(), true)));
                Action::None
            }
            KeyCode::Enter => {
                self.drag.release().map_or(Action::None, Action::Drop)
            }
            KeyCode::Esc => {
                self.drag.cancel();
                self.status = Some("Move cancelled".to_string());
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Left button only. Pressing a task picks it up, dragging over a
    /// section targets it and releasing drops; a horizontal drag across the
    /// header is a swipe.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, day: &DayProjection<'_>) -> Action {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.status = None;
                let at = Position::new(mouse.column, mouse.row);
                if self.screen.header.contains(at) {
                    self.swipe_from = Some(mouse.column);
                } else if let Some(index) = self.task_at(day, at) {
                    self.selected = index;
                    if let Some(task) = day.ordered().nth(index) {
                        self.drag.start(task);
                    }
                }
                Action::None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let layout = section_bounds(day, self.list_top());
                self.drag.pointer_moved(&layout, f32::from(mouse.row));
                Action::None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(start) = self.swipe_from.take() {
                    let translation = (f32::from(mouse.column) - f32::from(start)) * CELL_WIDTH;
                    return Direction::from_swipe(translation)
                        .map_or(Action::None, |direction| self.step(direction));
                }
                if matches!(self.drag, DragState::Dragging { .. }) {
                    return self.drag.release().map_or(Action::None, Action::Drop);
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    /// First row inside the list border.
    fn list_top(&self) -> u16 {
        self.screen.list.y.saturating_add(1)
    }

    /// Display index of the task drawn at `at`, if any.
    fn task_at(&self, day: &DayProjection<'_>, at: Position) -> Option<usize> {
        if !self.screen.list.inner(Margin::new(1, 1)).contains(at) {
            return None;
        }
        let row = usize::from(at.y);
        let mut header = usize::from(self.list_top());
        let mut index = 0;
        for section in day.sections() {
            let count = section.tasks.len();
            if row > header && row <= header + count {
                return Some(index + row - header - 1);
            }
            index += count;
            header += count + 2;
        }
        None
    }

    fn step(&mut self, direction: Direction) -> Action {
        self.selected = 0;
        Action::Step(direction)
    }
}

/// Row span of each section as drawn: its header row through its last task.
/// The blank spacer after a section belongs to no section.
pub fn section_bounds(day: &DayProjection<'_>, top: u16) -> Vec<SectionBounds> {
    let mut y = f32::from(top);
    day.sections()
        .iter()
        .map(|section| {
            let height = section.tasks.len() as f32;
            let bounds = SectionBounds {
                kind: section.kind,
                y,
                height,
            };
            y += height + 2.0;
            bounds
        })
        .collect()
}

/// Next (or previous) section in display order, wrapping around.
fn cycle(current: Option<SectionKind>, forward: bool) -> SectionKind {
    let all = SectionKind::ALL;
    let Some(index) = current.and_then(|c| all.iter().position(|k| *k == c)) else {
        return all[0];
    };
    let next = if forward {
        (index + 1) % all.len()
    } else {
        (index + all.len() - 1) % all.len()
    };
    all[next]
}
