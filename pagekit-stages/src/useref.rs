//! Build-comment bundling for HTML pages.
//!
//! ```html
//! <!-- build:css(.) assets/styles/vendor.css -->
//! <link rel="stylesheet" href="/node_modules/bootstrap/dist/css/bootstrap.css">
//! <!-- endbuild -->
//! ```
//!
//! Every reference inside a block is looked up in the search path, the hits
//! are concatenated into the block's target, and the block collapses to a
//! single tag pointing at the target. `remove` blocks are dropped.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use pagekit_core::{Error, FileRecord, Result, StageContext, StageKind, Transform};
use regex::{Captures, Regex};
use tracing::{debug, warn};

static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<!--\s*build:(\w+)(?:\(([^)]*)\))?(?:\s+(\S+?))?\s*-->(.*?)<!--\s*endbuild\s*-->",
    )
    .expect("build block pattern")
});

static SCRIPT_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("script pattern")
});

static LINK_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).expect("link pattern")
});

/// One parsed `build:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildBlock {
    pub kind: String,
    /// Alternate search directories, relative to the project root.
    pub search: Option<Vec<String>>,
    pub target: Option<String>,
    pub references: Vec<String>,
}

/// Extracts every build block in document order.
pub fn parse_blocks(html: &str) -> Vec<BuildBlock> {
    BLOCK.captures_iter(html).map(|caps| block_from(&caps)).collect()
}

fn block_from(caps: &Captures<'_>) -> BuildBlock {
    let kind = caps[1].to_ascii_lowercase();
    let search = caps.get(2).map(|m| {
        m.as_str()
            .trim_matches(|c| c == '{' || c == '}')
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    });
    let body = caps.get(4).map_or("", |m| m.as_str());
    let pattern: &Regex = if kind == "css" { &LINK_HREF } else { &SCRIPT_SRC };
    let references = pattern
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect();

    BuildBlock {
        kind,
        search,
        target: caps.get(3).map(|m| m.as_str().to_string()),
        references,
    }
}

pub struct UserefStage;

impl Transform for UserefStage {
    fn kind(&self) -> StageKind {
        StageKind::Useref
    }

    fn transform(&self, file: FileRecord, ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        let source = file.source_path();
        let html = std::str::from_utf8(&file.contents)
            .map_err(|e| Error::transform("useref", &source, e))?;

        let page_dir = file.path.parent().unwrap_or(Path::new("")).to_path_buf();
        let default_search = vec![ctx.resolve(&ctx.config.build.temp), ctx.root.to_path_buf()];

        let mut bundles = Vec::new();
        let mut output = String::with_capacity(html.len());
        let mut last = 0;

        for caps in BLOCK.captures_iter(html) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            output.push_str(&html[last..whole.start]);
            last = whole.end;

            let block = block_from(&caps);
            let replacement = match block.kind.as_str() {
                "remove" => String::new(),
                "css" | "js" => {
                    let Some(target) = block.target.as_deref() else {
                        return Err(Error::transform(
                            "useref",
                            &source,
                            format!("build:{} block has no target", block.kind),
                        ));
                    };
                    let search = match &block.search {
                        Some(dirs) => dirs.iter().map(|d| ctx.resolve(d)).collect(),
                        None => default_search.clone(),
                    };

                    let mut joined = Vec::new();
                    for reference in &block.references {
                        let path = locate(reference, &page_dir, &search).ok_or_else(|| {
                            Error::transform(
                                "useref",
                                &source,
                                format!("cannot find {} referenced by {}", reference, target),
                            )
                        })?;
                        let contents = fs::read(&path).map_err(|e| Error::fs(&path, e))?;
                        if !joined.is_empty() {
                            joined.push(b'\n');
                        }
                        joined.extend_from_slice(&contents);
                    }

                    debug!(
                        "{}: bundled {} file(s) into {}",
                        file.path.display(),
                        block.references.len(),
                        target
                    );
                    let target_path = page_dir.join(target.trim_start_matches('/'));
                    bundles.push(FileRecord::new(target_path, file.base.clone(), joined));
                    replacement_tag(&block.kind, target)
                }
                other => {
                    warn!("{}: leaving unknown build:{} block", source.display(), other);
                    caps[0].to_string()
                }
            };
            output.push_str(&replacement);
        }
        output.push_str(&html[last..]);

        let mut files = Vec::with_capacity(bundles.len() + 1);
        files.push(file.with_contents(output.into_bytes()));
        files.extend(bundles);
        Ok(files)
    }
}

fn replacement_tag(kind: &str, target: &str) -> String {
    if kind == "css" {
        format!(r#"<link rel="stylesheet" href="{}">"#, target)
    } else {
        format!(r#"<script src="{}"></script>"#, target)
    }
}

/// Finds `reference` in the first search directory that has it.
fn locate(reference: &str, page_dir: &Path, search: &[PathBuf]) -> Option<PathBuf> {
    let clean = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);

    let relative = match clean.strip_prefix('/') {
        Some(rooted) => PathBuf::from(rooted),
        None => page_dir.join(clean),
    };
    if relative.components().any(|c| c == std::path::Component::ParentDir) {
        return None;
    }

    search
        .iter()
        .map(|dir| dir.join(&relative))
        .find(|candidate| candidate.is_file())
}
