//! Duplicating earlier tasks onto another day.

use crate::{
    collection::TaskCollection,
    tasks::{Task, TaskDate, TaskError},
};

/// What to duplicate onto the target day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyRequest {
    /// The first task carrying this exact title. `None` means nothing was picked.
    Task { title: Option<String> },
    /// Every task of a source day.
    Day { source: TaskDate },
}

/// Builds the tasks a copy request would append, with fresh ids starting
/// after the current maximum. Nothing is inserted here.
pub fn resolve(
    tasks: &TaskCollection,
    request: &CopyRequest,
    target: TaskDate,
) -> Result<Vec<Task>, TaskError> {
    match request {
        CopyRequest::Task { title } => {
            resolve_task_copy(tasks, title.as_deref(), target).map(|task| vec![task])
        }
        CopyRequest::Day { source } => Ok(resolve_day_copy(tasks, *source, target)),
    }
}

/// Title, description and priority come from the match. Completion is reset
/// and the time range is not carried over.
pub fn resolve_task_copy(
    tasks: &TaskCollection,
    title: Option<&str>,
    target: TaskDate,
) -> Result<Task, TaskError> {
    let title = title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TaskError::NotFound {
            what: "no previous task selected".to_string(),
        })?;
    let source = tasks
        .iter()
        .find(|t| t.title == title)
        .ok_or_else(|| TaskError::NotFound {
            what: format!("task titled `{title}`"),
        })?;

    Ok(Task {
        id: tasks.next_id(),
        title: source.title.clone(),
        description: source.description.clone(),
        date: target,
        priority: source.priority,
        completed: false,
        from: None,
        to: None,
    })
}

/// Structural copies of every task on `source`, re-dated to `target`.
/// An empty source day yields nothing.
pub fn resolve_day_copy(tasks: &TaskCollection, source: TaskDate, target: TaskDate) -> Vec<Task> {
    let first_id = tasks.next_id();
    tasks
        .on_date(source)
        .zip(first_id..)
        .map(|(task, id)| Task {
            id,
            date: target,
            ..task.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Priority, TimeOfDay};

    fn jan(d: u32) -> TaskDate {
        TaskDate::from_ymd(2025, 1, d).expect("valid date")
    }

    fn sample() -> TaskCollection {
        TaskCollection::from_tasks(vec![
            Task {
                id: 1,
                title: "Gym".into(),
                description: "legs".into(),
                date: jan(1),
                priority: Priority::Medium,
                completed: true,
                from: TimeOfDay::from_hm(7, 0),
                to: TimeOfDay::from_hm(8, 0),
            },
            Task {
                id: 2,
                title: "Read".into(),
                description: String::new(),
                date: jan(1),
                priority: Priority::Low,
                completed: false,
                from: None,
                to: None,
            },
        ])
    }

    #[test]
    fn task_copy_resets_completion_and_drops_times() {
        let tasks = sample();
        let copy = resolve_task_copy(&tasks, Some("Gym"), jan(5)).expect("copy");

        assert_eq!(copy.id, 3);
        assert_eq!(copy.title, "Gym");
        assert_eq!(copy.description, "legs");
        assert_eq!(copy.priority, Priority::Medium);
        assert_eq!(copy.date, jan(5));
        assert!(!copy.completed);
        assert_eq!(copy.from, None);
        assert_eq!(copy.to, None);
    }

    #[test]
    fn task_copy_uses_first_match() {
        let mut tasks = sample();
        tasks.append([Task {
            id: 9,
            title: "Read".into(),
            description: "second".into(),
            date: jan(2),
            priority: Priority::High,
            completed: false,
            from: None,
            to: None,
        }]);
        let copy = resolve_task_copy(&tasks, Some("Read"), jan(3)).expect("copy");
        assert_eq!(copy.description, "");
        assert_eq!(copy.priority, Priority::Low);
        assert_eq!(copy.id, 10);
    }

    #[test]
    fn task_copy_requires_a_known_title() {
        let tasks = sample();
        assert!(matches!(
            resolve_task_copy(&tasks, None, jan(2)),
            Err(TaskError::NotFound { .. })
        ));
        assert!(matches!(
            resolve_task_copy(&tasks, Some("Swim"), jan(2)),
            Err(TaskError::NotFound { .. })
        ));
    }

    #[test]
    fn day_copy_assigns_sequential_ids_and_keeps_fields() {
        let tasks = sample();
        let copies = resolve_day_copy(&tasks, jan(1), jan(2));

        assert_eq!(copies.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);
        assert!(copies.iter().all(|t| t.date == jan(2)));
        assert!(copies[0].completed);
        assert_eq!(copies[0].from, TimeOfDay::from_hm(7, 0));
        assert_eq!(copies[1].title, "Read");
        assert_eq!(copies[1].priority, Priority::Low);
    }

    #[test]
    fn day_copy_from_empty_day_is_empty() {
        let tasks = sample();
        let request = CopyRequest::Day { source: jan(20) };
        assert_eq!(resolve(&tasks, &request, jan(21)), Ok(Vec::new()));
    }
}
