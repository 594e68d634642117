use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pagekit_core::{
    BuildContext, Config, Error, FileRecord, Pipeline, ReloadScope, Reloader, Result,
    StageContext, StageFactory, StageKind, Transform,
};
use tempfile::TempDir;

/// Uppercases text and renames `.scss` to `.css`; fails on files containing "boom".
struct Shout;

impl Transform for Shout {
    fn kind(&self) -> StageKind {
        StageKind::Style
    }

    fn transform(&self, file: FileRecord, _ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        let text = String::from_utf8_lossy(&file.contents).to_string();
        if text.contains("boom") {
            return Err(Error::transform("shout", file.source_path(), "exploded"));
        }
        let renamed = if file.extension().as_deref() == Some("scss") {
            file.with_extension("css")
        } else {
            file
        };
        Ok(vec![renamed.with_contents(text.to_uppercase().into_bytes())])
    }
}

/// Emits a `.map` companion next to every file.
struct Companion;

impl Transform for Companion {
    fn kind(&self) -> StageKind {
        StageKind::Useref
    }

    fn transform(&self, file: FileRecord, _ctx: &StageContext<'_>) -> Result<Vec<FileRecord>> {
        let mut map_path = file.path.clone().into_os_string();
        map_path.push(".map");
        let companion = FileRecord::new(map_path, file.base.clone(), b"{}".to_vec());
        Ok(vec![file, companion])
    }
}

struct TestStages;

impl StageFactory for TestStages {
    fn stage(&self, kind: StageKind, _config: &Config) -> Box<dyn Transform> {
        match kind {
            StageKind::Useref => Box::new(Companion),
            _ => Box::new(Shout),
        }
    }
}

#[derive(Default)]
struct RecordingReloader {
    scopes: Mutex<Vec<ReloadScope>>,
}

impl Reloader for RecordingReloader {
    fn reload(&self, scope: ReloadScope) {
        self.scopes.lock().unwrap().push(scope);
    }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn context(root: &Path) -> BuildContext {
    BuildContext::new(Config::default(), root, Arc::new(TestStages))
}

#[tokio::test]
async fn test_pipeline_preserves_relative_structure() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/assets/styles/main.scss", "body {}");
    write(root, "src/assets/styles/theme/dark.scss", "nested");

    let pipeline = Pipeline::new("assets/styles/**/*.scss", "src", "temp").stage(StageKind::Style);
    let report = pipeline.run(&context(root)).await.unwrap();

    assert_eq!(report.files_read, 2);
    assert_eq!(
        fs::read_to_string(root.join("temp/assets/styles/main.css")).unwrap(),
        "BODY {}"
    );
    assert_eq!(
        fs::read_to_string(root.join("temp/assets/styles/theme/dark.css")).unwrap(),
        "NESTED"
    );
}

#[tokio::test]
async fn test_partials_are_skipped_only_when_requested() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/assets/styles/main.scss", "a");
    write(root, "src/assets/styles/_variables.scss", "b");

    let styles = Pipeline::new("assets/styles/*.scss", "src", "temp")
        .stage(StageKind::Style)
        .skip_partials();
    let selected = styles.select(&root.join("src")).unwrap();
    assert_eq!(selected.len(), 1);
    assert!(selected[0].ends_with("main.scss"));

    let everything = Pipeline::new("assets/styles/*.scss", "src", "temp");
    assert_eq!(everything.select(&root.join("src")).unwrap().len(), 2);
}

#[tokio::test]
async fn test_pipeline_without_stages_copies_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "public/robots.txt", "User-agent: *");
    write(root, "public/nested/favicon.ico", "icon");

    let report = Pipeline::new("**", "public", "dist")
        .run(&context(root))
        .await
        .unwrap();

    assert_eq!(report.files_read, 2);
    assert_eq!(
        fs::read_to_string(root.join("dist/robots.txt")).unwrap(),
        "User-agent: *"
    );
    assert!(root.join("dist/nested/favicon.ico").exists());
}

#[tokio::test]
async fn test_wildcards_skip_dotfiles() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "public/robots.txt", "User-agent: *");
    write(root, "public/.DS_Store", "junk");
    write(root, "public/fonts/.gitkeep", "");
    write(root, "public/.well-known/security.txt", "contact");

    let report = Pipeline::new("**", "public", "dist")
        .run(&context(root))
        .await
        .unwrap();

    assert_eq!(report.written, vec!["/robots.txt".to_string()]);
    assert!(!root.join("dist/.DS_Store").exists());
    assert!(!root.join("dist/fonts/.gitkeep").exists());

    let named = Pipeline::new(".well-known/*.txt", "public", "dist");
    assert_eq!(named.select(&root.join("public")).unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_base_selects_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let report = Pipeline::new("**", "public", "dist")
        .run(&context(temp_dir.path()))
        .await
        .unwrap();
    assert_eq!(report.files_read, 0);
    assert!(!temp_dir.path().join("dist").exists());
}

#[tokio::test]
async fn test_transform_error_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/a.html", "fine");
    write(root, "src/b.html", "boom");
    write(root, "src/c.html", "never reached");

    let result = Pipeline::new("*.html", "src", "temp")
        .stage(StageKind::Page)
        .run(&context(root))
        .await;

    match result {
        Err(Error::Transform { path, .. }) => assert!(path.ends_with("b.html")),
        other => panic!("expected transform error, got {:?}", other),
    }
    assert!(root.join("temp/a.html").exists());
    assert!(!root.join("temp/c.html").exists());
}

#[tokio::test]
async fn test_stages_can_fan_out() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "temp/index.html", "page");

    let report = Pipeline::new("*.html", "temp", "dist")
        .stage(StageKind::Useref)
        .stage(StageKind::Minify)
        .run(&context(root))
        .await
        .unwrap();

    assert_eq!(report.written.len(), 2);
    assert_eq!(fs::read_to_string(root.join("dist/index.html")).unwrap(), "PAGE");
    assert_eq!(fs::read_to_string(root.join("dist/index.html.map")).unwrap(), "{}");
}

#[tokio::test]
async fn test_reload_fires_after_writes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/assets/styles/main.scss", "x");

    let reloader = Arc::new(RecordingReloader::default());
    let ctx = context(root).with_reloader(reloader.clone());

    Pipeline::new("assets/styles/*.scss", "src", "temp")
        .stage(StageKind::Style)
        .notify_reload()
        .run(&ctx)
        .await
        .unwrap();

    let scopes = reloader.scopes.lock().unwrap();
    assert_eq!(
        *scopes,
        vec![ReloadScope::Assets(vec!["/assets/styles/main.css".to_string()])]
    );
}

#[tokio::test]
async fn test_no_reload_on_failure() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/index.html", "boom");

    let reloader = Arc::new(RecordingReloader::default());
    let ctx = context(root).with_reloader(reloader.clone());

    let result = Pipeline::new("*.html", "src", "temp")
        .stage(StageKind::Page)
        .notify_reload()
        .run(&ctx)
        .await;

    assert!(result.is_err());
    assert!(reloader.scopes.lock().unwrap().is_empty());
}
