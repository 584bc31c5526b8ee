use std::fmt::Write as _;

use color_eyre::{eyre::eyre, Result};
use dayplan_core::{
    copy::CopyRequest,
    drag::Reclassify,
    projection::DayProjection,
    tasks::{Task, TaskDate, TaskInput, TaskStore},
};
use dayplan_task::Session;

use crate::{
    cli::{TaskCommand, TaskFields},
    config, storage,
};

/// Execute a task subcommand against the configured store.
pub async fn handle(cmd: TaskCommand, config: &config::Config) -> Result<()> {
    let store = storage::task_store(config)?;
    let output = run(cmd, config, store).await?;
    print!("{output}");
    Ok(())
}

/// Runs one command and returns what it would print.
pub async fn run<S: TaskStore>(
    cmd: TaskCommand,
    config: &config::Config,
    store: S,
) -> Result<String> {
    let mut session = Session::open(store, TaskDate::today()).await;

    let output = match cmd {
        TaskCommand::List { date } => {
            if let Some(date) = date {
                session.set_date(date);
            }
            render_day(&session.projection())
        }
        TaskCommand::Add { title, fields } => {
            let date = fields.date.unwrap_or(session.date());
            let priority = fields.priority.unwrap_or(config.default_priority());
            let input = TaskInput::new(title, date, priority)
                .with_description(fields.description.unwrap_or_default())
                .with_range(fields.from, fields.to);
            let id = session.save(input, None).await.map_err(|e| eyre!(e))?;
            format!("Created task {id} on {date}\n")
        }
        TaskCommand::Edit {
            id,
            title,
            fields,
            no_time,
        } => {
            let existing = find(&session, id)?;
            let input = edited_input(existing, title, fields, no_time);
            session.save(input, Some(id)).await.map_err(|e| eyre!(e))?;
            format!("Updated task {id}\n")
        }
        TaskCommand::Move { id, section } => {
            let current = find(&session, id)?.priority;
            session
                .apply_drop(Reclassify::onto(id, current, section))
                .await;
            format!("Moved task {id} to {section}\n")
        }
        TaskCommand::Done { id } => {
            find(&session, id)?;
            session.toggle_completed(id).await;
            let state = if find(&session, id)?.completed {
                "completed"
            } else {
                "reopened"
            };
            format!("Task {id} {state}\n")
        }
        TaskCommand::Delete { id } => match session.delete(id).await {
            Some(task) => format!("Deleted task {id}: {}\n", task.title),
            None => format!("No task {id}; nothing deleted\n"),
        },
        TaskCommand::Titles => {
            let titles = session.tasks().distinct_titles();
            if titles.is_empty() {
                "No previous tasks.\n".to_string()
            } else {
                titles.iter().map(|t| format!("{t}\n")).collect()
            }
        }
        TaskCommand::Copy { title, to } => {
            copy_onto(&mut session, CopyRequest::Task { title: Some(title) }, to).await?
        }
        TaskCommand::CopyDay { source, to } => {
            copy_onto(&mut session, CopyRequest::Day { source }, to).await?
        }
    };

    Ok(output)
}

fn find<S: TaskStore>(session: &Session<S>, id: u64) -> Result<&Task> {
    session
        .tasks()
        .get(id)
        .ok_or_else(|| eyre!("no task with id {id}"))
}

fn edited_input(
    existing: &Task,
    title: Option<String>,
    fields: TaskFields,
    no_time: bool,
) -> TaskInput {
    let (from, to) = if no_time {
        (None, None)
    } else {
        (fields.from.or(existing.from), fields.to.or(existing.to))
    };
    TaskInput::new(
        title.unwrap_or_else(|| existing.title.clone()),
        fields.date.unwrap_or(existing.date),
        fields.priority.unwrap_or(existing.priority),
    )
    .with_description(
        fields
            .description
            .unwrap_or_else(|| existing.description.clone()),
    )
    .with_range(from, to)
}

async fn copy_onto<S: TaskStore>(
    session: &mut Session<S>,
    request: CopyRequest,
    to: Option<TaskDate>,
) -> Result<String> {
    if let Some(target) = to {
        session.set_date(target);
    }
    let copied = session.copy(request).await.map_err(|e| eyre!(e))?;
    let mut out = format!("Copied {copied} task(s) onto {}\n\n", session.date());
    out.push_str(&render_day(&session.projection()));
    Ok(out)
}

/// Plain-text rendering of a day: header, progress, then the four sections.
pub fn render_day(day: &DayProjection<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  {}",
        day.date.naive().format("%A"),
        day.date,
        day.progress_text()
    );
    if !day.has_tasks() {
        let _ = writeln!(out, "No tasks for this day. Add one with `dayplan task add <title>`.");
    }
    for section in day.sections() {
        let _ = writeln!(out, "\n{}", section.kind.title());
        for task in &section.tasks {
            let mark = if task.completed { "x" } else { " " };
            let _ = write!(out, "  [{mark}] #{} {}", task.id, task.title);
            if let Some(time) = task.time_label() {
                let _ = write!(out, "  {time}");
            }
            let _ = writeln!(out);
            if !task.description.is_empty() {
                let _ = writeln!(out, "      {}", task.description);
            }
        }
        if let Some(message) = section.all_done_message() {
            let _ = writeln!(out, "  {message}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use dayplan_core::{projection::SectionKind, tasks::Priority};

    use super::*;
    use crate::storage;

    fn jan(d: u32) -> TaskDate {
        TaskDate::from_ymd(2025, 1, d).expect("date")
    }

    fn add(title: &str, date: TaskDate) -> TaskCommand {
        TaskCommand::Add {
            title: title.into(),
            fields: TaskFields {
                date: Some(date),
                ..TaskFields::default()
            },
        }
    }

    #[tokio::test]
    async fn add_list_and_move_through_file_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config::Config::default();
        let store = || storage::test_task_store(dir.path());

        let out = run(add("Buy milk", jan(1)), &cfg, store())
            .await
            .expect("add");
        assert_eq!(out, "Created task 1 on 01/01/2025\n");

        run(
            TaskCommand::Move {
                id: 1,
                section: SectionKind::Completed,
            },
            &cfg,
            store(),
        )
        .await
        .expect("move");

        let listing = run(TaskCommand::List { date: Some(jan(1)) }, &cfg, store())
            .await
            .expect("list");
        assert!(listing.contains("Completed tasks: 1 / 1"));
        assert!(listing.contains("[x] #1 Buy milk"));
        assert!(listing.contains("All high priority tasks done. Good job!"));
    }

    #[tokio::test]
    async fn edit_keeps_unset_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config::Config {
            default_priority: Some(Priority::Low),
            ..config::Config::default()
        };
        let store = || storage::test_task_store(dir.path());
        run(add("Read", jan(1)), &cfg, store()).await.expect("add");

        run(
            TaskCommand::Edit {
                id: 1,
                title: Some("Read book".into()),
                fields: TaskFields::default(),
                no_time: false,
            },
            &cfg,
            store(),
        )
        .await
        .expect("edit");

        let tasks = store().load().await;
        assert_eq!(tasks[0].title, "Read book");
        assert_eq!(tasks[0].priority, Priority::Low);
        assert_eq!(tasks[0].date, jan(1));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config::Config::default();
        let err = run(add("  ", jan(1)), &cfg, storage::test_task_store(dir.path()))
            .await
            .expect_err("blank title");
        assert!(err.to_string().contains("title"));
        assert!(storage::test_task_store(dir.path()).load().await.is_empty());
    }

    #[tokio::test]
    async fn copy_day_reports_new_tasks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config::Config::default();
        let store = || storage::test_task_store(dir.path());
        run(add("A", jan(1)), &cfg, store()).await.expect("add");
        run(add("B", jan(1)), &cfg, store()).await.expect("add");

        let out = run(
            TaskCommand::CopyDay {
                source: jan(1),
                to: Some(jan(2)),
            },
            &cfg,
            store(),
        )
        .await
        .expect("copy");
        assert!(out.starts_with("Copied 2 task(s) onto 02/01/2025"));

        let ids: Vec<u64> = store()
            .load()
            .await
            .iter()
            .filter(|t| t.date == jan(2))
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn unknown_ids_error_for_edit_but_not_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config::Config::default();
        let store = || storage::test_task_store(dir.path());

        assert!(run(TaskCommand::Done { id: 4 }, &cfg, store()).await.is_err());
        let out = run(TaskCommand::Delete { id: 4 }, &cfg, store())
            .await
            .expect("delete");
        assert_eq!(out, "No task 4; nothing deleted\n");
    }

    #[test]
    fn renders_empty_day_with_all_sections() {
        let tasks: Vec<Task> = Vec::new();
        let text = render_day(&dayplan_core::projection::project(&tasks, jan(1)));
        assert!(text.starts_with("Wednesday 01/01/2025  Completed tasks: 0 / 0"));
        for kind in SectionKind::ALL {
            assert!(text.contains(kind.title()));
        }
    }
}
