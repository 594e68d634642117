//! Sequential and parallel task composition.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::task::{invoke, Task, TaskRef};

/// Runs children one at a time; the first failure stops the sequence.
pub struct Series {
    name: String,
    children: Vec<TaskRef>,
}

/// Starts all children at once and completes when every child has.
///
/// A failing child does not cancel its siblings; the first failure is
/// reported once all of them are done.
pub struct Parallel {
    name: String,
    children: Vec<TaskRef>,
}

pub fn series(name: impl Into<String>, children: Vec<TaskRef>) -> TaskRef {
    Arc::new(Series {
        name: name.into(),
        children,
    })
}

pub fn parallel(name: impl Into<String>, children: Vec<TaskRef>) -> TaskRef {
    Arc::new(Parallel {
        name: name.into(),
        children,
    })
}

#[async_trait]
impl Task for Series {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &Arc<BuildContext>) -> Result<()> {
        for child in &self.children {
            invoke(child.as_ref(), ctx).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Task for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &Arc<BuildContext>) -> Result<()> {
        let handles: Vec<_> = self
            .children
            .iter()
            .map(|child| {
                let child = Arc::clone(child);
                let ctx = Arc::clone(ctx);
                let name = child.name().to_string();
                let handle = tokio::spawn(async move { invoke(child.as_ref(), &ctx).await });
                (name, handle)
            })
            .collect();

        let mut first_error = None;
        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::TaskJoin {
                    task: name.clone(),
                    message: e.to_string(),
                }),
            };

            if let Err(e) = outcome {
                if first_error.is_some() {
                    warn!("'{}' also failed in '{}': {}", name, self.name, e);
                } else {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
