use std::path::Path;

use pagekit_core::path_utils::extension;
use pagekit_core::ReloadScope;
use serde::Serialize;

/// What connected browsers are told to do, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReloadMessage {
    Reload,
    /// Swap these stylesheets without refreshing the page.
    Inject { paths: Vec<String> },
}

impl From<ReloadScope> for ReloadMessage {
    fn from(scope: ReloadScope) -> Self {
        match scope {
            ReloadScope::Assets(paths)
                if !paths.is_empty() && paths.iter().all(|p| is_stylesheet(p)) =>
            {
                ReloadMessage::Inject { paths }
            }
            _ => ReloadMessage::Reload,
        }
    }
}

fn is_stylesheet(url_path: &str) -> bool {
    extension(Path::new(url_path)).as_deref() == Some("css")
}

impl ReloadMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"kind":"reload"}"#.to_string())
    }
}
