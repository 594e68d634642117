//! Transform stage trait and the file records flowing through a pipeline.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;

/// One file in flight through a pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to `base`; preserved when writing to the destination.
    pub path: PathBuf,
    pub base: PathBuf,
    pub contents: Vec<u8>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            contents,
        }
    }

    /// Absolute source location.
    pub fn source_path(&self) -> PathBuf {
        self.base.join(&self.path)
    }

    pub fn with_contents(mut self, contents: Vec<u8>) -> Self {
        self.contents = contents;
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.path.set_extension(extension);
        self
    }

    #[inline]
    pub fn extension(&self) -> Option<String> {
        crate::path_utils::extension(&self.path)
    }
}

/// The closed set of stages a pipeline can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Style,
    Script,
    Page,
    Optimize,
    Useref,
    Minify,
    Copy,
}

impl StageKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Style => "style",
            StageKind::Script => "script",
            StageKind::Page => "page",
            StageKind::Optimize => "optimize",
            StageKind::Useref => "useref",
            StageKind::Minify => "minify",
            StageKind::Copy => "copy",
        }
    }
}

/// What a stage may look at besides the file itself.
pub struct StageContext<'a> {
    pub config: &'a Config,
    /// Project root every configured path is relative to.
    pub root: &'a Path,
}

impl StageContext<'_> {
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

/// A content transform applied to each selected file.
///
/// Stages may rename a file or fan it out into several; returning an empty
/// vector drops it.
pub trait Transform: Send + Sync {
    fn kind(&self) -> StageKind;
    fn transform(&self, file: FileRecord, ctx: &StageContext<'_>) -> Result<Vec<FileRecord>>;
}

/// Selects the implementation for each [`StageKind`].
pub trait StageFactory: Send + Sync {
    fn stage(&self, kind: StageKind, config: &Config) -> Box<dyn Transform>;
}
