//! Command implementations for the CLI.

mod build;
mod clean;
mod develop;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use pagekit_core::{invoke, BuildContext, Config, TaskRef};
use pagekit_stages::DefaultStages;

use crate::formatting::{format_duration, print_error, print_success, print_summary_box};

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use develop::cmd_develop;

/// Resolves the project root and its configuration.
fn load_project(cwd: &Path) -> Result<(PathBuf, Config)> {
    let root = cwd
        .canonicalize()
        .with_context(|| format!("Project directory {} not found", cwd.display()))?;
    let config = Config::load(&root);
    Ok((root, config))
}

fn build_context(root: PathBuf, config: Config) -> BuildContext {
    BuildContext::new(config, root, Arc::new(DefaultStages))
}

/// Runs a one-shot command to completion and prints its summary.
///
/// Exits the process with status 1 when the task fails.
async fn run_to_completion(command: &str, task: TaskRef, ctx: &Arc<BuildContext>) -> Result<()> {
    let started = Instant::now();
    let result = invoke(task.as_ref(), ctx).await;
    let duration = format_duration(started.elapsed());

    print_summary_box("Summary", &[("Command", command), ("Duration", &duration)]);
    println!();

    match result {
        Ok(()) => {
            print_success(&format!("{} finished", command));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("{} failed: {}", command, e));
            std::process::exit(1);
        }
    }
}
