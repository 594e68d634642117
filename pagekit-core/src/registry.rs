//! The fixed task set and the top-level commands composed from it.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::executor::Pipeline;
use crate::runner::{parallel, series};
use crate::serve::Serve;
use crate::server::DevServer;
use crate::stage::StageKind;
use crate::task::{CleanTask, PipelineTask, TaskRef};
use crate::watcher::{WatchAction, WatchBinding};

/// Every build step, wired to the paths of one [`Config`].
pub struct TaskRegistry {
    pub clean: TaskRef,
    pub style: TaskRef,
    pub script: TaskRef,
    pub page: TaskRef,
    pub image: TaskRef,
    pub font: TaskRef,
    pub extra: TaskRef,
    pub useref: TaskRef,
    config: Config,
}

impl TaskRegistry {
    pub fn new(config: &Config) -> Self {
        let build = &config.build;
        let paths = &build.paths;

        let task = |name: &str, pipeline: Pipeline| -> TaskRef {
            Arc::new(PipelineTask::new(name, pipeline))
        };

        Self {
            clean: Arc::new(CleanTask::new(vec![build.dist.clone(), build.temp.clone()])),
            style: task(
                "style",
                Pipeline::new(&paths.styles, &build.src, &build.temp)
                    .stage(StageKind::Style)
                    .skip_partials()
                    .notify_reload(),
            ),
            script: task(
                "script",
                Pipeline::new(&paths.scripts, &build.src, &build.temp)
                    .stage(StageKind::Script)
                    .notify_reload(),
            ),
            page: task(
                "page",
                Pipeline::new(&paths.pages, &build.src, &build.temp)
                    .stage(StageKind::Page)
                    .notify_reload(),
            ),
            image: task(
                "image",
                Pipeline::new(&paths.images, &build.src, &build.dist).stage(StageKind::Optimize),
            ),
            font: task(
                "font",
                Pipeline::new(&paths.fonts, &build.src, &build.dist).stage(StageKind::Optimize),
            ),
            extra: task(
                "extra",
                Pipeline::new("**", &build.public, &build.dist).stage(StageKind::Copy),
            ),
            useref: task(
                "useref",
                Pipeline::new(&paths.pages, &build.temp, &build.dist)
                    .stage(StageKind::Useref)
                    .stage(StageKind::Minify),
            ),
            config: config.clone(),
        }
    }

    /// Looks a task up by name.
    pub fn get(&self, name: &str) -> Option<TaskRef> {
        let task = match name {
            "clean" => &self.clean,
            "style" => &self.style,
            "script" => &self.script,
            "page" => &self.page,
            "image" => &self.image,
            "font" => &self.font,
            "extra" => &self.extra,
            "useref" => &self.useref,
            _ => return None,
        };
        Some(Arc::clone(task))
    }

    /// `clean`
    pub fn clean_command(&self) -> TaskRef {
        Arc::clone(&self.clean)
    }

    /// `compile = parallel(style, script, page)`
    pub fn compile(&self) -> TaskRef {
        parallel(
            "compile",
            vec![
                Arc::clone(&self.style),
                Arc::clone(&self.script),
                Arc::clone(&self.page),
            ],
        )
    }

    /// `build = series(clean, parallel(series(compile, useref), image, font, extra))`
    pub fn build(&self) -> TaskRef {
        series(
            "build",
            vec![
                Arc::clone(&self.clean),
                parallel(
                    "assets",
                    vec![
                        series("bundle", vec![self.compile(), Arc::clone(&self.useref)]),
                        Arc::clone(&self.image),
                        Arc::clone(&self.font),
                        Arc::clone(&self.extra),
                    ],
                ),
            ],
        )
    }

    /// `develop = series(compile, serve)`
    ///
    /// # Errors
    ///
    /// Fails when a configured glob cannot be used as a watch pattern.
    pub fn develop(&self, server: Arc<dyn DevServer>) -> Result<TaskRef> {
        let serve: TaskRef = Arc::new(Serve::new(server, self.watch_bindings()?));
        Ok(series("develop", vec![self.compile(), serve]))
    }

    /// The bindings `serve` installs.
    pub fn watch_bindings(&self) -> Result<Vec<Arc<WatchBinding>>> {
        let build = &self.config.build;
        let paths = &build.paths;

        let bindings = vec![
            WatchBinding::new(
                "style",
                &[paths.styles.as_str()],
                &build.src,
                WatchAction::Run(vec![Arc::clone(&self.style)]),
            )?,
            WatchBinding::new(
                "script",
                &[paths.scripts.as_str()],
                &build.src,
                WatchAction::Run(vec![Arc::clone(&self.script)]),
            )?,
            WatchBinding::new(
                "page",
                &[paths.pages.as_str()],
                &build.src,
                WatchAction::Run(vec![Arc::clone(&self.page)]),
            )?,
            WatchBinding::new(
                "assets",
                &[paths.images.as_str(), paths.fonts.as_str()],
                &build.src,
                WatchAction::Reload,
            )?,
            WatchBinding::new("public", &["**"], &build.public, WatchAction::Reload)?,
        ];

        Ok(bindings.into_iter().map(Arc::new).collect())
    }
}
