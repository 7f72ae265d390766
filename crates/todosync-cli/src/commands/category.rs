//! Category command handlers

use std::process::ExitCode;

use anyhow::Result;

use super::Session;
use crate::output::Output;

/// List the categories the server offers
pub async fn list(session: &Session, output: &Output) -> Result<ExitCode> {
    match session.engine.fetch_categories().await {
        Ok(categories) => {
            output.print_categories(&categories);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output.error(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}
