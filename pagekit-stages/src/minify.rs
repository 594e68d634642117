//! Production minification, dispatched on file extension.

pub mod html;
pub mod js;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use pagekit_core::{Error, FileRecord, Result, StageContext, StageKind, Transform};

pub use html::minify_html;
pub use js::minify_js;

pub struct MinifyStage;

impl Transform for MinifyStage {
    fn kind(&self) -> StageKind {
        StageKind::Minify
    }

    fn transform(&self, file: FileRecord, _ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        let extension = file.extension();
        if !matches!(extension.as_deref(), Some("css" | "js" | "html" | "htm")) {
            return Ok(vec![file]);
        }

        let source = file.source_path();
        let text = std::str::from_utf8(&file.contents)
            .map_err(|e| Error::transform("minify", &source, e))?;

        let minified = match extension.as_deref() {
            Some("css") => minify_css(text).map_err(|e| Error::transform("minify", &source, e))?,
            Some("js") => minify_js(text),
            _ => minify_html(text),
        };

        Ok(vec![file.with_contents(minified.into_bytes())])
    }
}

/// Minifies a stylesheet with lightningcss.
pub fn minify_css(text: &str) -> std::result::Result<String, String> {
    let mut sheet =
        StyleSheet::parse(text, ParserOptions::default()).map_err(|e| e.to_string())?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| e.to_string())?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(printed.code)
}
