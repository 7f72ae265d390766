//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use todosync_core::views::{category_label, Stats};
use todosync_core::{Category, PendingTodo, Todo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// One page of the todo list, ready to print
pub struct PageView<'a> {
    pub todos: &'a [Todo],
    /// Creates still waiting for the server, shown above the page
    pub pending: &'a [PendingTodo],
    pub page: usize,
    pub total_pages: usize,
    /// Todos matching the filters across all pages
    pub matching: usize,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single todo
    pub fn print_todo(&self, todo: &Todo, categories: &[Category]) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", todo.id);
                println!("Text:        {}", todo.text);
                println!(
                    "Category:    {}",
                    category_label(categories, &todo.category)
                );
                println!(
                    "Status:      {}",
                    if todo.completed { "completed" } else { "active" }
                );
                if let Some(ref desc) = todo.description {
                    println!("Description: {}", desc);
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(todo));
            }
            OutputFormat::Quiet => {
                println!("{}", todo.id);
            }
        }
    }

    /// Print one page of todos
    pub fn print_page(&self, view: &PageView<'_>, categories: &[Category]) {
        match self.format {
            OutputFormat::Human => {
                if view.todos.is_empty() && view.pending.is_empty() {
                    println!("No todos found.");
                    return;
                }
                for pending in view.pending {
                    println!("{}", pending_row(pending, categories));
                }
                for todo in view.todos {
                    println!(
                        "[{}] {:>5} | {} | {}",
                        if todo.completed { "x" } else { " " },
                        todo.id,
                        truncate(&todo.text, 40),
                        category_label(categories, &todo.category)
                    );
                    if let Some(ref desc) = todo.description {
                        println!("            {}", truncate_line(desc, 60));
                    }
                }
                println!(
                    "\nPage {}/{} - {} todo(s)",
                    view.page, view.total_pages, view.matching
                );
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "page": view.page,
                        "total_pages": view.total_pages,
                        "matching": view.matching,
                        "todos": view.todos,
                        "pending": view
                            .pending
                            .iter()
                            .map(|p| serde_json::json!({
                                "key": p.key().to_string(),
                                "text": p.draft.text,
                                "category": p.draft.category,
                            }))
                            .collect::<Vec<_>>(),
                    })
                );
            }
            OutputFormat::Quiet => {
                for pending in view.pending {
                    println!("{}", pending.key());
                }
                for todo in view.todos {
                    println!("{}", todo.id);
                }
            }
        }
    }

    /// Print summary counts
    pub fn print_stats(&self, stats: &Stats) {
        match self.format {
            OutputFormat::Human => {
                println!("Total:     {}", stats.total);
                println!("Active:    {}", stats.active);
                println!("Completed: {}", stats.completed);
                println!("Progress:  {}%", stats.percent_completed);
            }
            OutputFormat::Json => {
                println!("{}", to_json(stats));
            }
            OutputFormat::Quiet => {
                println!("{}", stats.percent_completed);
            }
        }
    }

    /// Print the category list
    pub fn print_categories(&self, categories: &[Category]) {
        match self.format {
            OutputFormat::Human => {
                if categories.is_empty() {
                    println!("No categories found.");
                    return;
                }
                for category in categories {
                    match category.color {
                        Some(ref color) => {
                            println!("{} - {} ({})", category.id, category.name, color)
                        }
                        None => println!("{} - {}", category.id, category.name),
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(categories));
            }
            OutputFormat::Quiet => {
                for category in categories {
                    println!("{}", category.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a blocking error to stderr, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Print a one-shot warning to stderr
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// List row for a create the server hasn't confirmed yet
fn pending_row(pending: &PendingTodo, categories: &[Category]) -> String {
    format!(
        "[~] {} | {} | {}",
        pending.key(),
        truncate(&pending.draft.text, 40),
        category_label(categories, &pending.draft.category)
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
