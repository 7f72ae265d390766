//! Stats command handler

use std::process::ExitCode;

use anyhow::Result;

use todosync_core::views;

use super::Session;
use crate::output::Output;

/// Show total, active and completed counts
pub fn show(session: &Session, output: &Output) -> Result<ExitCode> {
    if session.report_query_error(output) {
        return Ok(ExitCode::FAILURE);
    }

    output.print_stats(&views::stats(&session.store().get_all()));
    Ok(ExitCode::SUCCESS)
}
