//! Whitespace and comment stripping for JavaScript.
//!
//! Not a parser: the scanner only knows enough about string, template and
//! regex literals to leave them untouched, and keeps a newline wherever
//! automatic semicolon insertion could depend on it.

const REGEX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "do",
    "else",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "instanceof",
    "yield",
    "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Gap {
    None,
    Space,
    Newline,
}

pub fn minify_js(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    scan(&chars, 0, &mut out, false);
    out
}

/// Copies code from `start`, dropping comments and redundant whitespace.
///
/// With `nested` set the scan belongs to a template `${...}` and stops at
/// the `}` that closes it, returning its index.
fn scan(chars: &[char], start: usize, out: &mut String, nested: bool) -> usize {
    let mut gap = Gap::None;
    let mut depth = 0usize;
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            gap = gap.max(if c == '\n' || c == '\r' {
                Gap::Newline
            } else {
                Gap::Space
            });
            i += 1;
            continue;
        }

        if c == '/' && next == Some('/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && next == Some('*') {
            let start = i;
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            let spans_lines = chars[start..i.min(chars.len())].contains(&'\n');
            i = (i + 2).min(chars.len());
            gap = gap.max(if spans_lines { Gap::Newline } else { Gap::Space });
            continue;
        }

        if nested && c == '}' && depth == 0 {
            return i;
        }

        flush_gap(out, gap, c);
        gap = Gap::None;

        match c {
            '\'' | '"' => i = copy_quoted(chars, i, out),
            '`' => i = copy_template(chars, i, out),
            '/' if regex_allowed(out) => i = copy_regex(chars, i, out),
            _ => {
                match c {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                out.push(c);
                i += 1;
            }
        }
    }

    i
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn flush_gap(out: &mut String, gap: Gap, next: char) {
    if gap == Gap::None {
        return;
    }
    let Some(prev) = out.chars().last() else {
        return;
    };

    if gap == Gap::Newline && needs_newline(prev, next) {
        out.push('\n');
    } else if needs_space(prev, next) {
        out.push(' ');
    }
}

fn needs_space(prev: char, next: char) -> bool {
    (is_ident(prev) && is_ident(next))
        || (prev == '+' && next == '+')
        || (prev == '-' && next == '-')
        || (prev.is_ascii_digit() && next == '.')
}

/// Whether joining `prev` and `next` across a line break could change how
/// semicolons are inserted.
fn needs_newline(prev: char, next: char) -> bool {
    let continues_before = "{([,;:=*%&|!?<>~^".contains(prev);
    let continues_after = ")]},;.?:=".contains(next);
    !(continues_before || continues_after)
}

fn regex_allowed(out: &str) -> bool {
    let trimmed = out.trim_end();
    let Some(last) = trimmed.chars().last() else {
        return true;
    };
    if "(,=:[!&|?{};+-*%<>~^".contains(last) {
        return true;
    }
    if is_ident(last) {
        let word: String = trimmed
            .chars()
            .rev()
            .take_while(|c| is_ident(*c))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        return REGEX_KEYWORDS.contains(&word.as_str());
    }
    false
}

fn copy_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '\\' {
            if let Some(&escaped) = chars.get(i) {
                out.push(escaped);
                i += 1;
            }
        } else if c == quote {
            break;
        }
    }
    i
}

/// Template text is copied verbatim; each `${...}` is scanned as code.
fn copy_template(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('`');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                out.push(c);
                i += 1;
                if let Some(&escaped) = chars.get(i) {
                    out.push(escaped);
                    i += 1;
                }
            }
            '`' => {
                out.push(c);
                return i + 1;
            }
            '$' if chars.get(i + 1) == Some(&'{') => {
                out.push_str("${");
                i = scan(chars, i + 2, out, true);
                if i < chars.len() {
                    out.push('}');
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    i
}

fn copy_regex(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('/');
    let mut i = start + 1;
    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            break;
        }
        out.push(c);
        i += 1;
        match c {
            '\\' => {
                if let Some(&escaped) = chars.get(i) {
                    out.push(escaped);
                    i += 1;
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => break,
            _ => {}
        }
    }
    i
}
