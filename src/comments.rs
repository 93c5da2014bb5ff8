//! Comment association: comment groups rendered as documentation lines.
//!
//! Which group documents which node is decided while parsing (see
//! [`crate::parser`]); this module only turns a group into lines.

use crate::ast::{CommentGroupId, CommentKind};
use crate::package::{FileId, Package};

/// How comment markers are stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// Documentation text: the marker and one following space are removed,
    /// block comments are split into lines, tool directives such as
    /// `//go:generate` are dropped, trailing whitespace is trimmed and blank
    /// lines are removed at both ends and collapsed in between.
    Doc,
    /// Only the `//` marker or the `/*` `*/` delimiters are removed; the
    /// text after them is kept as written.
    Raw,
}

/// Renders a comment group, one entry per physical line. No group yields an
/// empty vector.
pub fn comment_lines(
    pkg: &Package,
    file: FileId,
    group: Option<CommentGroupId>,
    style: CommentStyle,
) -> Vec<String> {
    let Some(group) = group else {
        return Vec::new();
    };
    let arena = pkg.arena();
    let ids = arena.comment_ids(arena.comment_groups[group].comments);

    let mut lines = Vec::new();
    for &id in ids {
        let text = pkg.comment_text(file, id);
        match arena.comments[id].kind {
            CommentKind::Line => {
                let body = text.strip_prefix("//").unwrap_or(text);
                match style {
                    CommentStyle::Raw => lines.push(body.to_owned()),
                    CommentStyle::Doc if is_directive(body) => {}
                    CommentStyle::Doc => lines.push(body.strip_prefix(' ').unwrap_or(body).to_owned()),
                }
            }
            CommentKind::Block => {
                let body = text
                    .strip_prefix("/*")
                    .and_then(|s| s.strip_suffix("*/"))
                    .unwrap_or(text);
                lines.extend(body.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l).to_owned()));
            }
        }
    }

    match style {
        CommentStyle::Raw => lines,
        CommentStyle::Doc => tidy(lines),
    }
}

/// `//go:generate`, `//lint:ignore`, `//line`, `//export`, `//extern`.
fn is_directive(body: &str) -> bool {
    if ["line ", "extern ", "export "].iter().any(|p| body.starts_with(p)) {
        return true;
    }
    let Some((prefix, rest)) = body.split_once(':') else {
        return false;
    };
    let word = |s: &str| s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    !prefix.is_empty()
        && word(prefix)
        && rest
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn tidy(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(line.to_owned());
    }
    if out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out
}
