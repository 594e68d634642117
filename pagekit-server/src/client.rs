//! The browser half of live reload.

pub const CLIENT_PATH: &str = "/__pagekit/client.js";
pub const EVENTS_PATH: &str = "/__pagekit/events";

const SNIPPET: &str = r#"<script async src="/__pagekit/client.js"></script>"#;

const CLIENT_JS: &str = r#"(function () {
  var notify = __PAGEKIT_NOTIFY__;
  var source = new EventSource('/__pagekit/events');

  source.onopen = function () {
    if (notify) banner('Connected to Pagekit');
  };

  source.onmessage = function (event) {
    var message = JSON.parse(event.data);
    if (message.kind === 'inject') {
      inject(message.paths);
    } else {
      location.reload();
    }
  };

  function inject(paths) {
    var links = document.querySelectorAll('link[rel="stylesheet"]');
    var missed = paths.some(function (path) {
      var hit = false;
      Array.prototype.forEach.call(links, function (link) {
        var url = new URL(link.href, location.href);
        if (url.pathname === path) {
          url.searchParams.set('pagekit', Date.now());
          link.href = url.toString();
          hit = true;
        }
      });
      return !hit;
    });
    if (missed) location.reload();
  }

  function banner(text) {
    var el = document.createElement('div');
    el.textContent = text;
    el.style.cssText = 'position:fixed;top:0;right:0;z-index:99999;padding:8px 14px;' +
      'background:#1b1f23;color:#fff;font:13px sans-serif;';
    document.body.appendChild(el);
    setTimeout(function () { el.remove(); }, 1500);
  }
})();
"#;

/// The client script, with the connection banner switched on or off.
pub fn script(notify: bool) -> String {
    CLIENT_JS.replace("__PAGEKIT_NOTIFY__", if notify { "true" } else { "false" })
}

/// Adds the client `<script>` before the last `</body>`, or at the end.
pub fn inject(html: &str) -> String {
    let position = html.to_ascii_lowercase().rfind("</body>");
    let mut out = String::with_capacity(html.len() + SNIPPET.len());
    match position {
        Some(at) => {
            out.push_str(&html[..at]);
            out.push_str(SNIPPET);
            out.push_str(&html[at..]);
        }
        None => {
            out.push_str(html);
            out.push_str(SNIPPET);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_closing_body() {
        let html = "<html><body><p>hi</p></BODY></html>";
        assert_eq!(
            inject(html),
            format!("<html><body><p>hi</p>{}</BODY></html>", SNIPPET)
        );
    }

    #[test]
    fn test_inject_without_body_appends() {
        assert_eq!(inject("<p>fragment</p>"), format!("<p>fragment</p>{}", SNIPPET));
    }

    #[test]
    fn test_script_bakes_in_notify_flag() {
        assert!(script(true).contains("var notify = true;"));
        assert!(script(false).contains("var notify = false;"));
        assert!(script(false).contains(EVENTS_PATH));
    }
}
