//! Derived views
//!
//! Pure helpers the view layer uses to turn a store snapshot into what it
//! shows: filtering by category and status, ordering, pagination, and
//! summary counts. Nothing here mutates its input.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{Category, Todo};

/// Which category to show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => todo.category == *category,
        }
    }
}

impl From<Option<&str>> for CategoryFilter {
    /// `None` and `"all"` both mean no category filter
    fn from(value: Option<&str>) -> Self {
        match value {
            None | Some("all") => CategoryFilter::All,
            Some(category) => CategoryFilter::Only(category.to_string()),
        }
    }
}

/// Which completion state to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(format!(
                "Unknown status '{}'. Use 'all', 'active' or 'completed'.",
                other
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Display order of the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Reverse of server order, so the latest additions come first
    #[default]
    NewestFirst,
    /// Exactly as the server returned them
    ServerOrder,
}

/// Todos matching both filters, in input order
pub fn filter(todos: &[Todo], category: &CategoryFilter, status: StatusFilter) -> Vec<Todo> {
    todos
        .iter()
        .filter(|t| category.matches(t) && status.matches(t))
        .cloned()
        .collect()
}

/// Apply a display order
pub fn ordered(mut todos: Vec<Todo>, order: Order) -> Vec<Todo> {
    if order == Order::NewestFirst {
        todos.reverse();
    }
    todos
}

/// Number of pages needed for `count` items; never less than 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// Clamp a 1-based page number into `[1, total_pages]`
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size))
}

/// One page of `todos`, with 1-based `page`
///
/// Does not clamp: out-of-range pages, page 0, and a page size of 0 all
/// give an empty slice.
pub fn paginate(todos: &[Todo], page: usize, page_size: usize) -> &[Todo] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= todos.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(todos.len());
    &todos[start..end]
}

/// Summary counts for a list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    /// Completed share, rounded half up; 0 for an empty list
    pub percent_completed: u8,
}

pub fn stats(todos: &[Todo]) -> Stats {
    let total = todos.len();
    let completed = todos.iter().filter(|t| t.completed).count();
    let percent_completed = if total == 0 {
        0
    } else {
        ((completed * 200 + total) / (total * 2)) as u8
    };

    Stats {
        total,
        active: total - completed,
        completed,
        percent_completed,
    }
}

/// Display name for a category id, falling back to the id itself
pub fn category_label<'a>(categories: &'a [Category], id: &'a str) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(id)
}
