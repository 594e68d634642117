use std::fs;

use pagekit_core::config::{resolve, Config, CONFIG_FILE};
use proptest::prelude::*;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.build.src, "src");
    assert_eq!(config.build.dist, "dist");
    assert_eq!(config.build.temp, "temp");
    assert_eq!(config.build.public, "public");
    assert_eq!(config.build.paths.styles, "assets/styles/*.scss");
    assert_eq!(config.build.paths.pages, "*.html");
    assert_eq!(config.server.port, 2080);
    assert!(config.server.open);
    assert!(!config.server.notify);
    assert_eq!(
        config.server.routes.get("/node_modules").map(String::as_str),
        Some("node_modules")
    );
    assert!(config.data.is_null());
}

#[test]
fn test_missing_override_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = resolve(Config::default(), Some(&temp_dir.path().join(CONFIG_FILE)));
    assert_eq!(config, Config::default());
}

#[test]
fn test_no_override_path_yields_defaults() {
    assert_eq!(resolve(Config::default(), None), Config::default());
}

#[test]
fn test_malformed_override_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE);
    fs::write(&path, "build = [unterminated").unwrap();

    assert_eq!(resolve(Config::default(), Some(&path)), Config::default());
}

#[test]
fn test_data_override_replaces_payload() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"
[data]
name = "site"
menus = ["home", "about"]
"#,
    )
    .unwrap();

    let config = Config::load(temp_dir.path());
    assert_eq!(config.data["name"], "site");
    assert_eq!(config.data["menus"][1], "about");
    assert_eq!(config.build, Config::default().build);
}

#[test]
fn test_build_override_replaces_whole_section() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"
[build]
src = "app"
dist = "release"
temp = ".tmp"
public = "static"

[build.paths]
styles = "css/*.scss"
scripts = "js/*.js"
pages = "**/*.html"
images = "img/**"
fonts = "font/**"
"#,
    )
    .unwrap();

    let config = Config::load(temp_dir.path());
    assert_eq!(config.build.src, "app");
    assert_eq!(config.build.temp, ".tmp");
    assert_eq!(config.build.paths.pages, "**/*.html");
}

#[test]
fn test_partial_build_override_is_not_deep_merged() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"
[build]
src = "app"
"#,
    )
    .unwrap();

    // The replaced section lacks required keys, so it is skipped.
    assert_eq!(Config::load(temp_dir.path()), Config::default());
}

#[test]
fn test_invalid_section_keeps_the_rest_of_the_override() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"
[build]
dist = "release"

[server]
port = 4000

[data]
title = "Kept"
"#,
    )
    .unwrap();

    let config = Config::load(temp_dir.path());
    assert_eq!(config.build, Config::default().build);
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.data["title"], "Kept");
}

#[test]
fn test_server_override_keeps_field_defaults() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"
[server]
port = 3000
"#,
    )
    .unwrap();

    let config = Config::load(temp_dir.path());
    assert_eq!(config.server.port, 3000);
    assert!(config.server.open);
    assert_eq!(config.server.routes.len(), 1);
}

proptest! {
    #[test]
    fn prop_garbage_override_never_panics(content in "\\PC*") {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, &content).unwrap();

        let config = resolve(Config::default(), Some(&path));
        if toml::from_str::<toml::Table>(&content).is_err() {
            prop_assert_eq!(config, Config::default());
        }
    }
}
