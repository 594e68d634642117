//! Pipes file contents through a user-supplied shell command.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use pagekit_core::{Error, FileRecord, Result, StageContext};
use tracing::debug;

/// Runs `command` via `sh -c` in the project root with the file on stdin.
///
/// The source path is exported as `PAGEKIT_FILE`. Stdout replaces the file
/// contents; a non-zero exit fails the stage with the command's stderr.
pub fn pipe(
    stage: &str,
    command: &str,
    file: &FileRecord,
    ctx: &StageContext<'_>,
) -> Result<Vec<u8>> {
    let source = file.source_path();
    debug!("Piping {} through `{}`", source.display(), command);

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(ctx.root)
        .env("PAGEKIT_FILE", &source)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::transform(stage, &source, format!("failed to spawn: {}", e)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::transform(stage, &source, "stdin unavailable"))?;
    let input = file.contents.clone();
    let writer = thread::spawn(move || stdin.write_all(&input));

    let output = child
        .wait_with_output()
        .map_err(|e| Error::transform(stage, &source, e))?;

    // A command may exit without draining stdin; only its status matters.
    let _ = writer.join();

    if !output.status.success() {
        return Err(Error::transform(
            stage,
            &source,
            format!(
                "`{}` exited with {}: {}",
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekit_core::Config;
    use tempfile::TempDir;

    #[test]
    fn test_pipe_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new("main.js", temp_dir.path(), b"let a = 1;".to_vec());

        let out = pipe("script", "tr a-z A-Z", &file, &ctx).unwrap();
        assert_eq!(out, b"LET A = 1;");
    }

    #[test]
    fn test_failing_command_reports_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new("main.js", temp_dir.path(), Vec::new());

        let err = pipe("script", "echo nope >&2; exit 3", &file, &ctx).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nope"), "{}", message);
        assert!(message.contains("main.js"), "{}", message);
    }

    #[test]
    fn test_file_path_is_exported() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let ctx = StageContext {
            config: &config,
            root: temp_dir.path(),
        };
        let file = FileRecord::new("logo.png", temp_dir.path(), Vec::new());

        let out = pipe("optimize", "cat >/dev/null; printf %s \"$PAGEKIT_FILE\"", &file, &ctx)
            .unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("logo.png"));
    }
}
