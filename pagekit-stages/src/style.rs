use pagekit_core::{Error, FileRecord, Result, StageContext, StageKind, Transform};

/// Compiles Sass/SCSS to expanded CSS.
pub struct StyleStage;

impl Transform for StyleStage {
    fn kind(&self) -> StageKind {
        StageKind::Style
    }

    fn transform(&self, file: FileRecord, _ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        let source = file.source_path();
        let text = String::from_utf8(file.contents.clone())
            .map_err(|e| Error::transform("style", &source, e))?;

        let syntax = match file.extension().as_deref() {
            Some("sass") => grass::InputSyntax::Sass,
            Some("css") => grass::InputSyntax::Css,
            _ => grass::InputSyntax::Scss,
        };

        let mut options = grass::Options::default()
            .style(grass::OutputStyle::Expanded)
            .input_syntax(syntax)
            .load_path(&file.base);
        if let Some(dir) = source.parent() {
            options = options.load_path(dir);
        }

        let css = grass::from_string(text, &options)
            .map_err(|e| Error::transform("style", &source, e))?;

        Ok(vec![file.with_extension("css").with_contents(css.into_bytes())])
    }
}
