use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Opens `url` in the default browser without waiting for it.
pub fn open(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    match command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => debug!("Opened {} in the browser", url),
        Err(e) => warn!("Could not open a browser for {}: {}", url, e),
    }
}
