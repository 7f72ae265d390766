//! Todo command handlers

use std::process::ExitCode;

use anyhow::Result;

use todosync_core::views::{self, CategoryFilter, Order, StatusFilter};
use todosync_core::{RemoveOutcome, TodoDraft, TodoId, TodoPatch};

use super::{command_failed, Session};
use crate::output::{Output, PageView};

/// Options of the `list` command
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub category: Option<String>,
    pub status: StatusFilter,
    pub page: usize,
    pub page_size: Option<usize>,
    pub oldest_first: bool,
}

/// Show one page of the filtered list
pub async fn list(session: &Session, query: ListQuery, output: &Output) -> Result<ExitCode> {
    if session.report_query_error(output) {
        return Ok(ExitCode::FAILURE);
    }

    let category = CategoryFilter::from(query.category.as_deref());
    let order = display_order(query.oldest_first, session.config.newest_first);
    let todos = views::ordered(
        views::filter(&session.store().get_all(), &category, query.status),
        order,
    );

    let page_size = effective_page_size(query.page_size, session.config.page_size);
    let page = views::clamp_page(query.page, todos.len(), page_size);
    let pending = session.store().pending();
    let view = PageView {
        todos: views::paginate(&todos, page, page_size),
        pending: &pending,
        page,
        total_pages: views::total_pages(todos.len(), page_size),
        matching: todos.len(),
    };

    let categories = session.categories().await;
    output.print_page(&view, &categories);
    Ok(ExitCode::SUCCESS)
}

/// Create a todo
pub async fn add(
    session: &Session,
    text: String,
    category: String,
    description: Option<String>,
    output: &Output,
) -> Result<ExitCode> {
    let mut draft = TodoDraft::new(text, category);
    if let Some(description) = description {
        draft = draft.with_description(description);
    }

    match session.engine.create(draft).await {
        Ok(todo) => {
            output.success(&format!("Added todo: {}", todo.id));
            output.print_todo(&todo, &session.categories().await);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(command_failed(output, "Could not add todo", &e)),
    }
}

/// Changes requested by `edit`
#[derive(Debug, Clone, Default)]
pub struct EditFields {
    pub text: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
}

impl EditFields {
    fn into_patch(self, id: TodoId) -> TodoPatch {
        let mut patch = TodoPatch::new(id);
        if let Some(text) = self.text {
            patch = patch.text(text);
        }
        if let Some(category) = self.category {
            patch = patch.category(category);
        }
        if self.clear_description {
            patch = patch.description(None);
        } else if let Some(description) = self.description {
            patch = patch.description(Some(description));
        }
        patch
    }
}

/// Edit text, category or description of a todo
pub async fn edit(
    session: &Session,
    id: TodoId,
    fields: EditFields,
    output: &Output,
) -> Result<ExitCode> {
    apply(session, fields.into_patch(id), "Could not update todo", output).await
}

/// Mark a todo completed or active
pub async fn set_completed(
    session: &Session,
    id: TodoId,
    completed: bool,
    output: &Output,
) -> Result<ExitCode> {
    let action = if completed {
        "Could not complete todo"
    } else {
        "Could not reopen todo"
    };
    apply(session, TodoPatch::new(id).completed(completed), action, output).await
}

/// Flip the completion state of a loaded todo
pub async fn toggle(session: &Session, id: TodoId, output: &Output) -> Result<ExitCode> {
    let Some(todo) = session.store().get(id) else {
        output.warn(&format!("Todo not found: {}", id));
        return Ok(ExitCode::FAILURE);
    };

    set_completed(session, id, !todo.completed, output).await
}

/// Delete a todo
pub async fn remove(session: &Session, id: TodoId, output: &Output) -> Result<ExitCode> {
    match session.engine.remove(id).await {
        Ok(RemoveOutcome::Removed) => {
            output.success(&format!("Deleted todo: {}", id));
            Ok(ExitCode::SUCCESS)
        }
        Ok(RemoveOutcome::AlreadyGone) => {
            output.success(&format!("Todo {} was already deleted", id));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(command_failed(output, "Could not delete todo", &e)),
    }
}

async fn apply(
    session: &Session,
    patch: TodoPatch,
    action: &str,
    output: &Output,
) -> Result<ExitCode> {
    let id = patch.id;
    match session.engine.update(patch).await {
        Ok(Some(todo)) => {
            output.success(&format!("Updated todo: {}", id));
            output.print_todo(&todo, &session.categories().await);
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            output.success(&format!("Updated todo: {}", id));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(command_failed(output, action, &e)),
    }
}

fn display_order(oldest_first: bool, newest_first: bool) -> Order {
    if oldest_first || !newest_first {
        Order::ServerOrder
    } else {
        Order::NewestFirst
    }
}

fn effective_page_size(requested: Option<usize>, configured: usize) -> usize {
    requested.unwrap_or(configured).max(1)
}
