//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use todosync_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "base_url": config.base_url,
                    "page_size": config.page_size,
                    "newest_first": config.newest_first,
                    "write_policy": config.write_policy,
                    "refetch_on_invalidate": config.refetch_on_invalidate,
                    "max_age_secs": config.max_age_secs,
                    "request_timeout_secs": config.request_timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.base_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  base_url:              {}", config.base_url);
            println!("  page_size:             {}", config.page_size);
            println!("  newest_first:          {}", config.newest_first);
            println!("  write_policy:          {}", config.write_policy);
            println!("  refetch_on_invalidate: {}", config.refetch_on_invalidate);
            println!(
                "  max_age_secs:          {}",
                config
                    .max_age_secs
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  request_timeout_secs:  {}", config.request_timeout_secs);
            println!(
                "  log_file:              {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "base_url" => {
            if value.is_empty() {
                bail!("base_url must not be empty");
            }
            config.base_url = value.to_string();
        }
        "page_size" => {
            let size: usize = value
                .parse()
                .context("Invalid value for page_size. Use a positive number.")?;
            if size == 0 {
                bail!("Invalid value for page_size. Use a positive number.");
            }
            config.page_size = size;
        }
        "newest_first" => {
            config.newest_first = value
                .parse()
                .context("Invalid value for newest_first. Use 'true' or 'false'.")?;
        }
        "write_policy" => {
            config.write_policy = value.parse().map_err(anyhow::Error::msg)?;
        }
        "refetch_on_invalidate" => {
            config.refetch_on_invalidate = value
                .parse()
                .context("Invalid value for refetch_on_invalidate. Use 'true' or 'false'.")?;
        }
        "max_age_secs" => {
            config.max_age_secs = if value.is_empty() || value == "none" {
                None
            } else {
                Some(
                    value
                        .parse()
                        .context("Invalid value for max_age_secs. Use a number or 'none'.")?,
                )
            };
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: base_url, page_size, newest_first, write_policy, \
                 refetch_on_invalidate, max_age_secs, request_timeout_secs, log_file",
                key
            );
        }
    }

    Ok(())
}
