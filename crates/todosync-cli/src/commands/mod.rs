//! Command handlers

pub mod category;
pub mod config;
pub mod stats;
pub mod todo;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use todosync_core::{Category, CommandError, Config, HttpRemote, Store, SyncEngine};

use crate::output::Output;

/// Engine and configuration shared by the data commands
pub struct Session {
    pub engine: SyncEngine,
    pub config: Config,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let remote = HttpRemote::with_timeout(&config.base_url, config.request_timeout())
            .with_context(|| format!("Failed to create client for {}", config.base_url))?;
        let engine = SyncEngine::new(Arc::new(remote), Arc::new(Store::new()))
            .with_options(config.sync_options());

        Ok(Self { engine, config })
    }

    pub fn store(&self) -> &Store {
        self.engine.store()
    }

    /// Initial list fetch; a failure lands in the store's error slot
    pub async fn load(&self) {
        if let Ok(count) = self.engine.fetch_all().await {
            debug!(count, base_url = %self.config.base_url, "Loaded todos");
        }
    }

    /// Categories for display, empty when the server can't provide them
    pub async fn categories(&self) -> Vec<Category> {
        match self.engine.fetch_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                debug!(error = %e, "Showing raw category ids");
                Vec::new()
            }
        }
    }

    /// Print the query error, if any, and report whether one was present
    pub fn report_query_error(&self, output: &Output) -> bool {
        match self.store().error() {
            Some(message) => {
                output.error(&message);
                true
            }
            None => false,
        }
    }
}

/// Show a failed command once and turn it into a failing exit code
pub fn command_failed(output: &Output, action: &str, err: &CommandError) -> ExitCode {
    output.warn(&format!("{}: {}", action, err));
    if let Some(hint) = err.remote().and_then(|e| e.recovery_suggestion()) {
        output.warn(hint);
    }
    ExitCode::FAILURE
}
