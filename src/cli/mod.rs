//! CLI entry point
//!
//! Turns parsed arguments into a harness configuration, runs the suites and
//! maps the totals onto the process exit code.

use crate::commands::Cli;
use crate::common::config::resolve_interpreter;
use crate::common::{HarnessConfig, OutputFormat, Result};
use crate::testing::{self, Reporter};

/// Run the harness; returns the exit code for the process
pub async fn run(cli: Cli) -> Result<i32> {
    let config = build_config(cli);
    config.validate()?;

    if config.color {
        // colored would otherwise re-check the terminal on its own
        colored::control::set_override(true);
    }

    tracing::debug!(
        root = %config.root.display(),
        interpreter = %config.interpreter.display(),
        timeout = ?config.timeout,
        extension = %config.extension,
        "Starting harness run"
    );

    let mut reporter = Reporter::stdout(config.color, config.format);
    let totals = testing::run_suites(&config, &mut reporter).await?;
    Ok(totals.exit_code())
}

fn build_config(cli: Cli) -> HarnessConfig {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let mut config = HarnessConfig::new(cli.root, resolve_interpreter(&cli.interpreter))
        .with_extension(&cli.extension)
        .with_color(cli.color.resolve())
        .with_format(format);
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    config
}
