use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use pagekit_core::TaskRegistry;

use crate::formatting::{print_command_header, print_key_value};

use super::{build_context, load_project, run_to_completion};

/// `build`: clean, compile, bundle and copy everything into dist.
pub async fn cmd_build(cwd: &Path) -> Result<()> {
    let (root, config) = load_project(cwd)?;
    print_command_header("build", &root);
    print_key_value("Source", &config.build.src);
    print_key_value("Output", &config.build.dist);
    println!();

    let registry = TaskRegistry::new(&config);
    let ctx = Arc::new(build_context(root, config));
    run_to_completion("build", registry.build(), &ctx).await
}
