//! HTML whitespace collapsing with inline style and script minification.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{minify_css, minify_js};

static RAW_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(pre|textarea|script|style)\b[^>]*>").expect("raw element pattern")
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("comment pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static BLOCK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*(</?(?:!doctype|html|head|body|meta|link|title|base|script|style|noscript|div|p|ul|ol|li|dl|dt|dd|header|footer|nav|main|section|article|aside|h[1-6]|hr|br|table|thead|tbody|tfoot|tr|td|th|form|fieldset|legend|figure|figcaption|blockquote|pre|textarea|option|select|iframe|video|audio|source|canvas|svg)\b[^>]*>)\s*",
    )
    .expect("block tag pattern")
});

static SCRIPT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*["']?([^"'\s>]+)"#).expect("script type pattern")
});

/// Collapses insignificant whitespace and drops comments.
///
/// `<pre>` and `<textarea>` bodies are kept verbatim; inline `<style>` and
/// JavaScript `<script>` bodies are minified, falling back to the original
/// text when a stylesheet fails to parse. Conditional comments survive.
pub fn minify_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = RAW_OPEN.captures(rest) {
        let (Some(tag), Some(name)) = (open.get(0), open.get(1)) else {
            break;
        };
        let name = name.as_str().to_ascii_lowercase();
        out.push_str(&collapse(&rest[..tag.start()]));
        out.push_str(tag.as_str());

        let body_start = tag.end();
        let closing = format!("</{}", name);
        let body_len = rest[body_start..]
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len() - body_start);
        let body = &rest[body_start..body_start + body_len];

        match name.as_str() {
            "style" => out.push_str(&minify_css(body).unwrap_or_else(|e| {
                debug!("Keeping inline style as-is: {}", e);
                body.to_string()
            })),
            "script" if is_javascript(tag.as_str()) => out.push_str(&minify_js(body)),
            _ => out.push_str(body),
        }

        rest = &rest[body_start + body_len..];
    }

    out.push_str(&collapse(rest));
    out.trim().to_string()
}

fn is_javascript(open_tag: &str) -> bool {
    match SCRIPT_TYPE.captures(open_tag).and_then(|c| c.get(1)) {
        None => true,
        Some(kind) => {
            let kind = kind.as_str().to_ascii_lowercase();
            kind == "module" || kind.ends_with("javascript") || kind.ends_with("ecmascript")
        }
    }
}

fn collapse(segment: &str) -> String {
    let without_comments = COMMENT.replace_all(segment, |caps: &regex::Captures<'_>| {
        if caps[1].starts_with("[if") || caps[1].starts_with("<![endif]") {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let single_spaced = WHITESPACE.replace_all(&without_comments, " ");
    BLOCK_TAG.replace_all(&single_spaced, "$1").into_owned()
}
