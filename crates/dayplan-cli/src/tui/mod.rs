mod view;

use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dayplan_core::{
    projection::{DayProjection, SectionKind},
    tasks::{Task, TaskStore},
};
use dayplan_task::Session;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, Paragraph},
    Frame, Terminal,
};
use tracing::debug;

use self::view::{Action, DayView, Screen};

/// Interactive day screen over an open session. Every change is written
/// through the session before the next frame. Press `q` to exit.
pub async fn launch<S: TaskStore>(session: &mut Session<S>) -> Result<()> {
    // Guard restores the terminal even if we early-return.
    let guard = TerminalGuard::enter()?;
    let mut terminal = guard.terminal()?;
    let mut view = DayView::default();

    loop {
        {
            let day = session.projection();
            view.clamp(&day);
            let mut screen = Screen::default();
            terminal.draw(|frame| screen = render(frame, &day, &view))?;
            view.screen = screen;
        }
        // Nothing animates in a terminal; an interrupted drag settles on the next frame.
        view.drag.settled();

        if !event::poll(Duration::from_millis(150))? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                view.handle_key(key.code, &session.projection())
            }
            Event::Mouse(mouse) => view.handle_mouse(mouse, &session.projection()),
            _ => continue,
        };
        match action {
            Action::None => {}
            Action::Quit => break,
            Action::Reload => session.reload().await,
            Action::Step(direction) => {
                let date = session.step(direction);
                debug!(%date, "day changed");
            }
            Action::Toggle(id) => {
                session.toggle_completed(id).await;
            }
            Action::Delete(id) => {
                if let Some(task) = session.delete(id).await {
                    view.status = Some(format!("Deleted \"{}\"", task.title));
                }
            }
            Action::Drop(drop) => {
                if !session.apply_drop(drop).await {
                    view.status = Some("Task no longer exists".to_string());
                }
            }
        }
    }

    Ok(())
}

fn render(frame: &mut Frame<'_>, day: &DayProjection<'_>, view: &DayView) -> Screen {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", day.date.naive().format("%A"), day.date),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                "dayplan",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            )),
    );
    frame.render_widget(header, chunks[0]);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(day.progress())
        .label(day.progress_text());
    frame.render_widget(progress, chunks[1]);

    let body = List::new(section_items(day, view)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Tasks"),
    );
    frame.render_widget(body, chunks[2]);

    let footer = match &view.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None if view.drag.dragged_id().is_some() => controls(&[
            ("↑↓/mouse", "pick section"),
            ("Enter", "drop"),
            ("Esc", "cancel"),
        ]),
        None => controls(&[
            ("←→", "day"),
            ("↑↓", "select"),
            ("space", "done"),
            ("g/drag", "move"),
            ("x", "delete"),
            ("r", "reload"),
            ("q", "quit"),
        ]),
    };
    let footer = Paragraph::new(footer).block(Block::default().borders(Borders::ALL).title("Controls"));
    frame.render_widget(footer, chunks[3]);

    Screen {
        header: chunks[0],
        list: chunks[2],
    }
}

fn section_items<'a>(day: &DayProjection<'a>, view: &DayView) -> Vec<ListItem<'a>> {
    let mut items = Vec::new();
    let mut index = 0;

    for section in day.sections() {
        let header_style = if view.drag.hover() == Some(section.kind) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        };
        let mut header = vec![Span::styled(section.kind.title(), header_style)];
        if let Some(message) = section.all_done_message() {
            header.push(Span::styled(
                format!("  {message}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        items.push(ListItem::new(Line::from(header)));

        for task in section.tasks.iter().copied() {
            let selected = index == view.selected();
            let dragged = view.drag.dragged_id() == Some(task.id);
            items.push(ListItem::new(task_line(task, section.kind, selected, dragged)));
            index += 1;
        }
        items.push(ListItem::new(Line::raw("")));
    }
    items
}

fn task_line<'a>(task: &'a Task, kind: SectionKind, selected: bool, dragged: bool) -> Line<'a> {
    let accent = if task.completed {
        Color::Green
    } else {
        Color::Yellow
    };
    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if kind == SectionKind::Completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if dragged {
        title_style = title_style.add_modifier(Modifier::ITALIC);
    }

    let mut spans = vec![
        Span::raw(if selected { "› " } else { "  " }),
        Span::styled("▌", Style::default().fg(accent)),
        Span::raw(" "),
        Span::styled(task.title.as_str(), title_style),
    ];
    if let Some(time) = task.time_label() {
        spans.push(Span::styled(
            format!("  {time}"),
            Style::default().fg(Color::Cyan),
        ));
    }
    if !task.description.is_empty() {
        spans.push(Span::styled(
            format!("  {}", task.description),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let line = Line::from(spans);
    if selected {
        line.style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

fn controls(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, label)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(format!(" {label}")));
    }
    Line::from(spans)
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are reported but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use dayplan_core::{
        projection::project,
        tasks::{Priority, TaskDate},
    };
    use ratatui::{backend::TestBackend, buffer::Buffer};

    use super::*;

    fn buffer_text(buffer: &Buffer) -> String {
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn renders_sections_and_progress() {
        let date = TaskDate::from_ymd(2025, 1, 1).expect("date");
        let tasks = vec![
            Task {
                id: 1,
                title: "Stretch".into(),
                description: String::new(),
                date,
                priority: Priority::High,
                completed: true,
                from: None,
                to: None,
            },
            Task {
                id: 2,
                title: "Email".into(),
                description: String::new(),
                date,
                priority: Priority::Low,
                completed: false,
                from: None,
                to: None,
            },
        ];
        let day = project(&tasks, date);
        let view = DayView::default();

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("terminal");
        let mut screen = Screen::default();
        terminal
            .draw(|frame| screen = render(frame, &day, &view))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let text = buffer_text(buffer);

        assert!(text.contains("01/01/2025"));
        assert!(text.contains("Completed tasks: 1 / 2"));
        assert!(text.contains("High Priority"));
        assert!(text.contains("All high priority tasks done. Good job!"));
        assert!(text.contains("Stretch"));
        assert!(text.contains("Email"));

        // Section rows used for mouse hit-testing line up with what was drawn.
        assert_eq!(screen.header.y, 1);
        for bounds in view::section_bounds(&day, screen.list.y + 1) {
            let row = row_text(buffer, bounds.y as u16);
            assert!(row.contains(bounds.kind.title()), "row {}: {row}", bounds.y);
        }
        assert!(row_text(buffer, screen.list.y + 2).contains("Stretch"));
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (buffer.area.x..buffer.area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }
}
