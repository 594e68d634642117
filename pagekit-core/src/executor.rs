//! Pipeline execution: select files, run them through stages, write results.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use tracing::{debug, trace, warn};

use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::path_utils::{is_partial, relative_to, to_url_path};
use crate::server::ReloadScope;
use crate::stage::{FileRecord, StageContext, StageKind, Transform};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// One file transformation job: `pattern` under `base`, through `stages`, into `dest`.
///
/// Directories are project-relative strings taken from the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pattern: String,
    base: String,
    dest: String,
    stages: Vec<StageKind>,
    skip_partials: bool,
    reload: bool,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub files_read: usize,
    /// Written files as URL paths relative to the destination.
    pub written: Vec<String>,
}

impl Pipeline {
    pub fn new(pattern: impl Into<String>, base: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            base: base.into(),
            dest: dest.into(),
            stages: Vec::new(),
            skip_partials: false,
            reload: false,
        }
    }

    pub fn stage(mut self, kind: StageKind) -> Self {
        self.stages.push(kind);
        self
    }

    /// Leave `_`-prefixed files out of the selection.
    pub fn skip_partials(mut self) -> Self {
        self.skip_partials = true;
        self
    }

    /// Notify the reloader with the written assets after a successful run.
    pub fn notify_reload(mut self) -> Self {
        self.reload = true;
        self
    }

    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[inline]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[inline]
    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    /// Lists the files under `base` matching the pattern, sorted.
    ///
    /// Wildcards never match a leading dot, so dotfiles are only selected
    /// when the pattern names them.
    pub fn select(&self, base: &Path) -> Result<Vec<PathBuf>> {
        let full_pattern = format!(
            "{}/{}",
            Pattern::escape(&base.to_string_lossy()),
            self.pattern.trim_start_matches("./")
        );

        let paths = glob::glob_with(&full_pattern, MATCH_OPTIONS).map_err(|e| Error::Glob {
            pattern: self.pattern.clone(),
            message: e.to_string(),
        })?;

        let names_dotfiles = self.pattern.starts_with('.') || self.pattern.contains("/.");
        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    if !names_dotfiles && is_hidden(&path, base) {
                        trace!("Skipping hidden {}", path.display());
                        continue;
                    }
                    if self.skip_partials && is_partial(&path) {
                        trace!("Skipping partial {}", path.display());
                        continue;
                    }
                    files.push(path);
                }
                Err(e) => warn!("Unreadable path while matching '{}': {}", self.pattern, e),
            }
        }

        files.sort();
        Ok(files)
    }

    /// Runs every selected file through the stages and writes the results.
    ///
    /// Returns once every output is on disk. The first failing file aborts
    /// the run; files after it are not processed.
    pub async fn run(&self, ctx: &BuildContext) -> Result<PipelineReport> {
        let base = ctx.path(&self.base);
        let dest = ctx.path(&self.dest);
        let files = self.select(&base)?;

        if files.is_empty() {
            debug!("No files match '{}' under {}", self.pattern, base.display());
            return Ok(PipelineReport::default());
        }

        let stages: Arc<Vec<Box<dyn Transform>>> = Arc::new(
            self.stages
                .iter()
                .map(|kind| ctx.stages().stage(*kind, ctx.config()))
                .collect(),
        );

        let mut report = PipelineReport::default();
        for path in files {
            let contents = tokio::fs::read(&path)
                .await
                .map_err(|e| Error::fs(&path, e))?;
            report.files_read += 1;

            let relative = relative_to(&path, &base).ok_or_else(|| {
                Error::fs(
                    &path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "outside of base"),
                )
            })?;

            let record = FileRecord::new(relative, &base, contents);
            let records = self.transform_off_thread(record, &stages, ctx).await?;

            for record in records {
                let target = dest.join(&record.path);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| Error::fs(parent, e))?;
                }
                tokio::fs::write(&target, &record.contents)
                    .await
                    .map_err(|e| Error::fs(&target, e))?;
                trace!("Wrote {}", target.display());
                report.written.push(to_url_path(&record.path));
            }
        }

        if self.reload && !report.written.is_empty() {
            ctx.reloader()
                .reload(ReloadScope::Assets(report.written.clone()));
        }

        Ok(report)
    }

    /// Runs the stage chain for one file on the blocking pool so a slow
    /// stage never holds up sibling tasks or the dev server.
    async fn transform_off_thread(
        &self,
        record: FileRecord,
        stages: &Arc<Vec<Box<dyn Transform>>>,
        ctx: &BuildContext,
    ) -> Result<Vec<FileRecord>> {
        let stages = Arc::clone(stages);
        let config = ctx.shared_config();
        let root = ctx.root().to_path_buf();

        tokio::task::spawn_blocking(move || {
            let stage_ctx = StageContext {
                config: &config,
                root: &root,
            };
            apply_stages(record, &stages, &stage_ctx)
        })
        .await
        .map_err(|e| Error::TaskJoin {
            task: self.pattern.clone(),
            message: e.to_string(),
        })?
    }
}

fn is_hidden(path: &Path, base: &Path) -> bool {
    relative_to(path, base).is_some_and(|relative| {
        relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    })
}

fn apply_stages(
    record: FileRecord,
    stages: &[Box<dyn Transform>],
    ctx: &StageContext<'_>,
) -> Result<Vec<FileRecord>> {
    let mut records = vec![record];
    for stage in stages {
        let mut next = Vec::with_capacity(records.len());
        for record in records {
            next.extend(stage.transform(record, ctx)?);
        }
        records = next;
    }
    Ok(records)
}
