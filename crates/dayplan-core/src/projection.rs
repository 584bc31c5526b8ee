//! Per-day grouping of tasks into the four display sections.

use std::{fmt, str::FromStr};

use crate::tasks::{ParseError, Priority, Task, TaskDate};

/// One of the four display buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Completed,
    High,
    Medium,
    Low,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Completed,
        SectionKind::High,
        SectionKind::Medium,
        SectionKind::Low,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Completed => "Completed",
            SectionKind::High => "High Priority",
            SectionKind::Medium => "Medium Priority",
            SectionKind::Low => "Low Priority",
        }
    }

    /// Priority a bucket stands for; `None` for Completed.
    pub fn priority(self) -> Option<Priority> {
        match self {
            SectionKind::Completed => None,
            SectionKind::High => Some(Priority::High),
            SectionKind::Medium => Some(Priority::Medium),
            SectionKind::Low => Some(Priority::Low),
        }
    }

    pub fn of_priority(priority: Priority) -> Self {
        match priority {
            Priority::High => SectionKind::High,
            Priority::Medium => SectionKind::Medium,
            Priority::Low => SectionKind::Low,
        }
    }

    pub fn of_task(task: &Task) -> Self {
        if task.completed {
            SectionKind::Completed
        } else {
            SectionKind::of_priority(task.priority)
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for SectionKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("completed") {
            return Ok(SectionKind::Completed);
        }
        s.parse::<Priority>().map(SectionKind::of_priority)
    }
}

/// Tasks of one bucket for one day, in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub kind: SectionKind,
    pub tasks: Vec<&'a Task>,
    all_done: bool,
}

impl Section<'_> {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Affirmation for a priority bucket whose tasks for the day exist and
    /// are all completed. Never shown for Completed itself.
    pub fn all_done_message(&self) -> Option<String> {
        self.all_done.then(|| {
            format!(
                "All {} tasks done. Good job!",
                self.kind.title().to_lowercase()
            )
        })
    }
}

/// The four sections of a day plus its completion counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayProjection<'a> {
    pub date: TaskDate,
    sections: [Section<'a>; 4],
    total: usize,
    completed: usize,
}

impl<'a> DayProjection<'a> {
    pub fn sections(&self) -> &[Section<'a>] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> &Section<'a> {
        &self.sections[index_of(kind)]
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Completed share of the day in `[0, 1]`; 0 for an empty day.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn progress_text(&self) -> String {
        format!("Completed tasks: {} / {}", self.completed, self.total)
    }

    pub fn has_tasks(&self) -> bool {
        self.total > 0
    }

    /// Tasks in display order: section by section.
    pub fn ordered(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.sections.iter().flat_map(|s| s.tasks.iter().copied())
    }
}

fn index_of(kind: SectionKind) -> usize {
    match kind {
        SectionKind::Completed => 0,
        SectionKind::High => 1,
        SectionKind::Medium => 2,
        SectionKind::Low => 3,
    }
}

/// Splits the tasks of `date` into the four sections.
pub fn project(tasks: &[Task], date: TaskDate) -> DayProjection<'_> {
    let mut sections = SectionKind::ALL.map(|kind| Section {
        kind,
        tasks: Vec::new(),
        all_done: false,
    });
    // Per priority: (tasks of that priority on the day, incomplete among them).
    let mut per_priority = [(0usize, 0usize); 4];

    for task in tasks.iter().filter(|t| t.date == date) {
        sections[index_of(SectionKind::of_task(task))].tasks.push(task);
        let counts = &mut per_priority[index_of(SectionKind::of_priority(task.priority))];
        counts.0 += 1;
        if !task.completed {
            counts.1 += 1;
        }
    }

    for section in sections.iter_mut().skip(1) {
        let (count, incomplete) = per_priority[index_of(section.kind)];
        section.all_done = count > 0 && incomplete == 0;
    }

    let completed = sections[0].tasks.len();
    let total = sections.iter().map(|s| s.tasks.len()).sum();
    DayProjection {
        date,
        sections,
        total,
        completed,
    }
}
