use dayplan_core::{
    collection::TaskCollection,
    copy::{self, CopyRequest},
    drag::Reclassify,
    navigation::{self, Direction},
    projection::{self, DayProjection},
    tasks::{Priority, Task, TaskDate, TaskError, TaskInput, TaskStore},
};
use tracing::{debug, info, instrument};

/// Owned state for one open view: the task list loaded from a store and the
/// day being looked at. Every mutation that changes the list is flushed back
/// to the store before the call returns.
pub struct Session<S: TaskStore> {
    store: S,
    tasks: TaskCollection,
    date: TaskDate,
}

impl<S: TaskStore> Session<S> {
    /// Session with nothing loaded yet.
    pub fn new(store: S, date: TaskDate) -> Self {
        Self {
            store,
            tasks: TaskCollection::new(),
            date,
        }
    }

    /// Session with the store's current contents.
    pub async fn open(store: S, date: TaskDate) -> Self {
        let mut session = Self::new(store, date);
        session.reload().await;
        session
    }

    /// Replaces the in-memory list with what the store holds.
    #[instrument(skip(self))]
    pub async fn reload(&mut self) {
        self.tasks = TaskCollection::from_tasks(self.store.load().await);
        debug!(count = self.tasks.len(), "tasks reloaded");
    }

    /// Writes the whole list back.
    pub async fn flush(&self) {
        self.store.replace(self.tasks.as_slice()).await;
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn date(&self) -> TaskDate {
        self.date
    }

    pub fn set_date(&mut self, date: TaskDate) {
        self.date = date;
    }

    pub fn step(&mut self, direction: Direction) -> TaskDate {
        self.date = navigation::step(self.date, direction);
        self.date
    }

    /// Sections of the selected day.
    pub fn projection(&self) -> DayProjection<'_> {
        projection::project(self.tasks.as_slice(), self.date)
    }

    /// Creates or overwrites a task. Invalid input changes nothing and writes nothing.
    #[instrument(skip(self, input))]
    pub async fn save(&mut self, input: TaskInput, existing_id: Option<u64>) -> Result<u64, TaskError> {
        let id = self.tasks.upsert(input, existing_id)?;
        self.flush().await;
        Ok(id)
    }

    /// `false` when the task no longer exists; nothing is written then.
    #[instrument(skip(self))]
    pub async fn reclassify(&mut self, id: u64, priority: Priority, completed: bool) -> bool {
        if !self.tasks.reclassify(id, priority, completed) {
            return false;
        }
        self.flush().await;
        true
    }

    pub async fn apply_drop(&mut self, drop: Reclassify) -> bool {
        self.reclassify(drop.id, drop.priority, drop.completed).await
    }

    /// Flips completion while keeping the priority.
    pub async fn toggle_completed(&mut self, id: u64) -> bool {
        let Some(task) = self.tasks.get(id) else {
            return false;
        };
        let (priority, completed) = (task.priority, !task.completed);
        self.reclassify(id, priority, completed).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: u64) -> Option<Task> {
        let removed = self.tasks.remove(id)?;
        self.flush().await;
        Some(removed)
    }

    /// Appends copies onto the selected day, which stays selected, and
    /// returns how many were added. An empty day copy writes nothing.
    #[instrument(skip(self))]
    pub async fn copy(&mut self, request: CopyRequest) -> Result<usize, TaskError> {
        let target = self.date;
        let copies = copy::resolve(&self.tasks, &request, target)?;
        let count = copies.len();
        if count > 0 {
            info!(count, %target, "copied tasks");
            self.tasks.append(copies);
            self.flush().await;
        }
        Ok(count)
    }
}
