use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>{{ title }}</title>
  <!-- build:css assets/styles/main.css -->
  <link rel="stylesheet" href="assets/styles/main.css">
  <!-- endbuild -->
</head>
<body>
  <h1>{{ title }}</h1>
</body>
</html>
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(root, "src/index.html", INDEX);
    write(root, "src/assets/styles/main.scss", "$fg: #333;\nbody { color: $fg; }\n");
    write(root, "src/assets/scripts/main.js", "console.log('ready');\n");
    write(root, "public/robots.txt", "User-agent: *\n");
    write(root, "pages.config.toml", "[data]\ntitle = \"Fixture\"\n");

    temp_dir
}

fn pagekit(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pagekit"))
        .arg("--cwd")
        .arg(root)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute pagekit")
}

#[test]
fn test_build_command() {
    let project = create_test_project();
    let root = project.path();

    let output = pagekit(root, &["build"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
    assert!(html.contains("<title>Fixture</title>"));
    assert!(html.contains(r#"<link rel="stylesheet" href="assets/styles/main.css">"#));
    assert!(root.join("dist/assets/styles/main.css").is_file());
    assert!(root.join("dist/assets/scripts/main.js").is_file());
    assert!(root.join("dist/robots.txt").is_file());
}

#[test]
fn test_clean_command() {
    let project = create_test_project();
    let root = project.path();

    assert!(pagekit(root, &["build"]).status.success());
    assert!(root.join("dist").exists());
    assert!(root.join("temp").exists());

    let output = pagekit(root, &["clean"]);
    assert!(output.status.success());
    assert!(!root.join("dist").exists());
    assert!(!root.join("temp").exists());
    assert!(root.join("src/index.html").exists());
}

#[test]
fn test_build_fails_on_style_error() {
    let project = create_test_project();
    let root = project.path();
    write(root, "src/assets/styles/main.scss", "body { color: $missing; }\n");

    let output = pagekit(root, &["build"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_build_section_override() {
    let project = create_test_project();
    let root = project.path();
    write(
        root,
        "pages.config.toml",
        r#"[build]
src = "src"
dist = "release"
temp = ".tmp"
public = "public"

[build.paths]
styles = "assets/styles/*.scss"
scripts = "assets/scripts/*.js"
pages = "*.html"
images = "assets/images/**"
fonts = "assets/fonts/**"

[data]
title = "Override"
"#,
    );

    let output = pagekit(root, &["build"]);
    assert!(output.status.success());

    let html = fs::read_to_string(root.join("release/index.html")).unwrap();
    assert!(html.contains("<title>Override</title>"));
    assert!(root.join(".tmp/assets/styles/main.css").is_file());
    assert!(!root.join("dist").exists());
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_pagekit"))
        .arg("--help")
        .output()
        .expect("Failed to execute pagekit --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["clean", "build", "develop"] {
        assert!(stdout.contains(command), "missing {command} in {stdout}");
    }
}

#[test]
fn test_missing_project_directory() {
    let project = create_test_project();
    let output = pagekit(&project.path().join("nope"), &["build"]);
    assert!(!output.status.success());
}
