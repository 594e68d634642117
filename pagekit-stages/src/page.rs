use minijinja::Environment;
use pagekit_core::{Error, FileRecord, Result, StageContext, StageKind, Transform};

/// Renders HTML templates with the configured `data` payload.
///
/// `{% include %}` and `{% extends %}` resolve against the pipeline base.
/// Templates are reloaded on every render so edits show up while watching.
pub struct PageStage;

impl Transform for PageStage {
    fn kind(&self) -> StageKind {
        StageKind::Page
    }

    fn transform(&self, file: FileRecord, ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        let source = file.source_path();
        let template = std::str::from_utf8(&file.contents)
            .map_err(|e| Error::transform("page", &source, e))?;

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(&file.base));

        let data = match &ctx.config.data {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        };

        let html = env
            .render_str(template, data)
            .map_err(|e| Error::transform("page", &source, e))?;

        Ok(vec![file.with_contents(html.into_bytes())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekit_core::Config;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_renders_data_payload() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data: json!({
                "name": "pages",
                "menus": [{"name": "Home"}, {"name": "About"}],
            }),
            ..Config::default()
        };
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let source = "<h1>{{ name }}</h1>{% for m in menus %}<a>{{ m.name }}</a>{% endfor %}";
        let file = FileRecord::new("index.html", temp_dir.path(), source.as_bytes().to_vec());

        let out = PageStage.transform(file, &ctx).unwrap();
        assert_eq!(
            String::from_utf8(out[0].contents.clone()).unwrap(),
            "<h1>pages</h1><a>Home</a><a>About</a>"
        );
    }

    #[test]
    fn test_includes_resolve_against_base() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("partials")).unwrap();
        fs::write(temp_dir.path().join("partials/header.html"), "<header>hi</header>").unwrap();

        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new(
            "about.html",
            temp_dir.path(),
            b"{% include 'partials/header.html' %}<main></main>".to_vec(),
        );

        let out = PageStage.transform(file, &ctx).unwrap();
        assert_eq!(out[0].contents, b"<header>hi</header><main></main>");
    }

    #[test]
    fn test_template_error_fails_stage() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new("index.html", temp_dir.path(), b"{% if %}".to_vec());

        assert!(matches!(
            PageStage.transform(file, &ctx),
            Err(Error::Transform { .. })
        ));
    }
}
