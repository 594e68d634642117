use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use pagekit_core::TaskRegistry;

use crate::formatting::print_command_header;

use super::{build_context, load_project, run_to_completion};

/// `clean`: removes the output roots.
pub async fn cmd_clean(cwd: &Path) -> Result<()> {
    let (root, config) = load_project(cwd)?;
    print_command_header("clean", &root);

    let registry = TaskRegistry::new(&config);
    let ctx = Arc::new(build_context(root, config));
    run_to_completion("clean", registry.clean_command(), &ctx).await
}
