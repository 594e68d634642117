//! Named asynchronous build steps.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info};

use crate::cleaner;
use crate::context::BuildContext;
use crate::error::Result;
use crate::executor::Pipeline;

/// A unit of work whose only observable result is success or failure.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, ctx: &Arc<BuildContext>) -> Result<()>;
}

pub type TaskRef = Arc<dyn Task>;

/// Runs a task, logging its start, duration and outcome.
pub async fn invoke(task: &dyn Task, ctx: &Arc<BuildContext>) -> Result<()> {
    let started = Instant::now();
    info!("Starting '{}'...", task.name());

    let result = task.run(ctx).await;
    let elapsed = started.elapsed();
    match &result {
        Ok(()) => info!("Finished '{}' after {:.2?}", task.name(), elapsed),
        Err(e) => error!("'{}' errored after {:.2?}: {}", task.name(), elapsed, e),
    }

    result
}

/// Deletes the configured output roots.
pub struct CleanTask {
    targets: Vec<String>,
}

impl CleanTask {
    pub fn new(targets: Vec<String>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl Task for CleanTask {
    fn name(&self) -> &str {
        "clean"
    }

    async fn run(&self, ctx: &Arc<BuildContext>) -> Result<()> {
        let paths: Vec<PathBuf> = self.targets.iter().map(|t| ctx.path(t)).collect();
        cleaner::clean(&paths).await
    }
}

/// A task backed by a single [`Pipeline`].
pub struct PipelineTask {
    name: String,
    pipeline: Pipeline,
}

impl PipelineTask {
    pub fn new(name: impl Into<String>, pipeline: Pipeline) -> Self {
        Self {
            name: name.into(),
            pipeline,
        }
    }

    #[inline]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

#[async_trait]
impl Task for PipelineTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &Arc<BuildContext>) -> Result<()> {
        let report = self.pipeline.run(ctx).await?;
        tracing::debug!(
            "'{}' processed {} file(s), wrote {}",
            self.name,
            report.files_read,
            report.written.len()
        );
        Ok(())
    }
}
