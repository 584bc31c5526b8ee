use tracing::debug;

use crate::tasks::{Priority, Task, TaskDate, TaskError, TaskInput};

/// In-memory, insertion-ordered task list for the active session.
///
/// Lookups are linear scans; the list is personal-scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// `max(ids) + 1`, or 1 for an empty list. Ids freed by deleting the
    /// current maximum are handed out again.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Overwrites the editable fields of `existing_id` when it is present,
    /// otherwise appends a new task under a fresh id. Returns the id written.
    pub fn upsert(&mut self, input: TaskInput, existing_id: Option<u64>) -> Result<u64, TaskError> {
        input.validate()?;

        if let Some(task) = existing_id.and_then(|id| self.tasks.iter_mut().find(|t| t.id == id))
        {
            task.title = input.title;
            task.description = input.description;
            task.date = input.date;
            task.priority = input.priority;
            task.from = input.from;
            task.to = input.to;
            debug!(id = task.id, "task updated");
            return Ok(task.id);
        }

        let id = self.next_id();
        self.tasks.push(Task::from_input(id, input));
        debug!(id, "task created");
        Ok(id)
    }

    /// Sets priority and completion only. Returns `false` when the id is gone.
    pub fn reclassify(&mut self, id: u64, priority: Priority, completed: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.priority = priority;
                task.completed = completed;
                true
            }
            None => {
                debug!(id, "reclassify ignored, task no longer present");
                false
            }
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn append(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    pub fn on_date(&self, date: TaskDate) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.date == date)
    }

    /// Each title once, in order of first appearance.
    pub fn distinct_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !titles.contains(&task.title.as_str()) {
                titles.push(&task.title);
            }
        }
        titles
    }
}

impl From<Vec<Task>> for TaskCollection {
    fn from(tasks: Vec<Task>) -> Self {
        Self::from_tasks(tasks)
    }
}
