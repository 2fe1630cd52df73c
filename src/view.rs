//! What a presentation layer displays

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;

use crate::query::{self, CategoryFilter, CategoryProgress, PriorityFilter};
use crate::task::Task;


/// The filters a user has selected
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    pub priority: PriorityFilter,
    pub category: CategoryFilter,
}


/// A task, as it should be displayed at a given time
#[derive(Clone, Debug, PartialEq)]
pub struct TaskLine {
    pub task: Task,
    pub overdue: bool,
}

impl Display for TaskLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        let completion = if self.task.completed() { "✓" } else { " " };
        let time = match self.task.due_time() {
            Some(t) => format!(" @ {}", t.format("%H:%M")),
            None => String::new(),
        };
        let overdue = if self.overdue { " (OVERDUE)" } else { "" };
        write!(f, "[{}] {}\t{} | Due: {}{}{} | Priority: {}",
            completion, self.task.name(), self.task.category(),
            self.task.due_date(), time, overdue, self.task.priority())
    }
}


/// Everything needed to render the task list, the progress rings and the category choices
#[derive(Clone, Debug, PartialEq)]
pub struct RenderModel {
    /// Filtered, then sorted for display
    pub visible_tasks: Vec<TaskLine>,
    pub category_progress: Vec<CategoryProgress>,
    pub category_options: Vec<String>,
}

impl RenderModel {
    /// Whether the "no tasks" message should be displayed
    pub fn is_empty(&self) -> bool {
        self.visible_tasks.is_empty()
    }
}

/// Compute the render model of `tasks` at `now`.
///
/// Progress and category options are computed over every task, regardless of the filters.
pub fn render(tasks: &[Task], filters: &Filters, now: NaiveDateTime) -> RenderModel {
    let filtered = query::filter(tasks, &filters.priority, &filters.category);
    let visible_tasks = query::sort_for_display(filtered, now)
        .into_iter()
        .map(|task| TaskLine { task: task.clone(), overdue: query::is_overdue(task, now) })
        .collect();

    RenderModel {
        visible_tasks,
        category_progress: query::category_progress(tasks),
        category_options: query::distinct_categories(tasks),
    }
}
