//! Derived views over a snapshot of the tasks
//!
//! Nothing in here mutates tasks, and nothing is stored: "overdue", ranks and progress are always computed from the current snapshot and an explicit `now`.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use chrono::NaiveDateTime;

use crate::config::UNCATEGORIZED;
use crate::task::{Priority, Task};


/// The sentinel value that disables a filter
pub const ALL: &str = "all";

/// Either the sentinel "all", or an exact value to match
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: Display> Display for Filter<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Filter::All => write!(f, "{}", ALL),
            Filter::Only(value) => write!(f, "{}", value),
        }
    }
}

/// Parses `"all"` as [`Filter::All`], anything else as an exact value
impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            return Ok(Filter::All);
        }
        s.parse().map(Filter::Only)
    }
}

pub type PriorityFilter = Filter<Priority>;
pub type CategoryFilter = Filter<String>;


/// Whether a task is overdue at `now`.
///
/// This only compares calendar days: a pending task due today is never overdue, whatever its due time.
pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    !task.completed() && task.due_date() < now.date()
}

/// Returns the tasks matching both filters, in their original order
pub fn filter<'a>(tasks: &'a [Task], priority: &PriorityFilter, category: &CategoryFilter) -> Vec<&'a Task> {
    tasks.iter()
        .filter(|task| priority.matches(&task.priority()))
        .filter(|task| match category {
            Filter::All => true,
            Filter::Only(c) => c == task.category(),
        })
        .collect()
}

/// 0 for overdue tasks, 1 for other pending tasks, 2 for completed tasks
pub fn display_rank(task: &Task, now: NaiveDateTime) -> u8 {
    if task.completed() {
        2
    } else if is_overdue(task, now) {
        0
    } else {
        1
    }
}

/// Sort tasks by rank (see [`display_rank`]), then by due date.
///
/// The sort is stable: tasks that compare equal keep their relative order.
pub fn sort_for_display<'a, I>(tasks: I, now: NaiveDateTime) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by_key(|task| (display_rank(task, now), task.due_date()));
    sorted
}

/// The distinct non-empty categories, in the order they first appear
pub fn distinct_categories(tasks: &[Task]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for task in tasks {
        let category = task.category();
        if category.is_empty() || categories.iter().any(|c| c == category) {
            continue;
        }
        categories.push(category.to_string());
    }
    categories
}

/// Keep the active category filter if it is still one of the `options`, fall back to "all" otherwise
pub fn reconcile_category_filter(current: &CategoryFilter, options: &[String]) -> CategoryFilter {
    match current {
        Filter::Only(category) if options.contains(category) => current.clone(),
        Filter::Only(category) => {
            log::debug!("Category {:?} is gone, resetting the category filter", category);
            Filter::All
        },
        Filter::All => Filter::All,
    }
}


/// How many tasks of a category are completed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub category: String,
    pub total: usize,
    pub completed: usize,
    /// Rounded to the nearest integer, halves rounded up
    pub percent: u8,
}

impl CategoryProgress {
    fn new(category: String) -> Self {
        Self { category, total: 0, completed: 0, percent: 0 }
    }

    fn compute_percent(&mut self) {
        self.percent = if self.total == 0 {
            0
        } else {
            ((200 * self.completed + self.total) / (2 * self.total)) as u8
        };
    }
}

impl Display for CategoryProgress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} ({}/{}) {}%", self.category, self.completed, self.total, self.percent)
    }
}

/// Per-category completion, in the order categories first appear.
/// Tasks without a category are grouped under "Uncategorized".
pub fn category_progress(tasks: &[Task]) -> Vec<CategoryProgress> {
    let mut progress: Vec<CategoryProgress> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for task in tasks {
        let category = match task.category() {
            "" => UNCATEGORIZED,
            c => c,
        };
        let index = *index_of.entry(category).or_insert_with(|| {
            progress.push(CategoryProgress::new(category.to_string()));
            progress.len() - 1
        });

        let entry = &mut progress[index];
        entry.total += 1;
        if task.completed() {
            entry.completed += 1;
        }
    }

    for entry in progress.iter_mut() {
        entry.compute_percent();
    }
    progress
}
