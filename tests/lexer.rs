// tests/lexer.rs
use genz_model::error::{Diag, DiagKind};
use genz_model::lexer::{Lexer, Tok};
use proptest::prelude::*;

fn lex_all(input: &str) -> (Vec<(usize, Tok<'_>, usize)>, Vec<Diag>) {
    let mut lx = Lexer::new(input);
    let mut toks = Vec::new();
    for t in lx.by_ref() {
        toks.push(t);
    }
    let diags = lx.take_diags();
    (toks, diags)
}

fn injected_semis(input: &str) -> Vec<usize> {
    Lexer::new(input)
        .filter_map(|(s, t, e)| (matches!(t, Tok::Semi) && s == e).then_some(s))
        .collect()
}

fn kinds(input: &str) -> Vec<String> {
    lex_all(input)
        .0
        .into_iter()
        .map(|(_, t, _)| match t {
            Tok::Ident(s) => s.to_owned(),
            Tok::Semi => ";".to_owned(),
            Tok::LBrace => "{".to_owned(),
            Tok::RBrace => "}".to_owned(),
            Tok::LineComment(c) | Tok::BlockComment(c) => format!("comment({c})"),
            other => format!("{other:?}"),
        })
        .collect()
}

#[test]
fn semicolon_after_line_ending_tokens() {
    let src = "x\n1\n\"s\"\n`r`\n'c'\nreturn\nbreak\ni++\nf()\na[0]\n}\n";
    let (toks, diags) = lex_all(src);
    assert!(diags.is_empty(), "{diags:?}");
    let semis = toks.iter().filter(|(_, t, _)| matches!(t, Tok::Semi)).count();
    assert_eq!(semis, 11);
}

#[test]
fn no_semicolon_after_operators_and_open_delimiters() {
    // Only the EOF semicolon after the last operand.
    assert_eq!(injected_semis("a +\nb"), [5]);
    assert_eq!(injected_semis("f(\n)"), [4]);
    assert!(injected_semis("struct {\n").is_empty());
    assert!(injected_semis("x,\ny,\n").is_empty());
}

#[test]
fn semicolon_at_eof() {
    let src = "package p";
    assert_eq!(injected_semis(src), [src.len()]);
}

#[test]
fn line_comment_comes_before_the_newline_semicolon() {
    assert_eq!(kinds("foo string // tail\n"), ["foo", "string", "comment(// tail)", ";"]);
}

#[test]
fn multiline_block_comment_acts_as_newline() {
    let src = "x /* a\nb */ y";
    assert_eq!(kinds(src), ["x", ";", "comment(/* a\nb */)", "y", ";"]);
    // The semicolon sits on the comment's first newline.
    assert_eq!(injected_semis(src)[0], 6);
}

#[test]
fn single_line_block_comment_is_transparent() {
    assert_eq!(kinds("x /* a */ y"), ["x", "comment(/* a */)", "y", ";"]);
}

#[test]
fn comments_do_not_enable_insertion() {
    assert_eq!(kinds("{ // open\n}"), ["{", "comment(// open)", "}", ";"]);
}

#[test]
fn leading_bom_is_skipped() {
    let (toks, diags) = lex_all("\u{FEFF}package p\n");
    assert!(diags.is_empty());
    assert!(matches!(toks[0].1, Tok::KwPackage));
}

#[test]
fn inner_bom_is_an_error() {
    let (_, diags) = lex_all("a \u{FEFF} b");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagKind::Lex);
}

#[test]
fn unterminated_block_comment() {
    let (toks, diags) = lex_all("x /* never closed");
    assert!(toks.iter().any(|(_, t, _)| matches!(t, Tok::Error)));
    assert_eq!(diags[0].message, "unterminated comment");
}

#[test]
fn raw_strings_span_lines() {
    let (toks, diags) = lex_all("`json:\"a\"\nxml:\"b\"`");
    assert!(diags.is_empty());
    assert!(matches!(toks[0].1, Tok::RawStringLit("`json:\"a\"\nxml:\"b\"`")));
}

#[test]
fn unicode_identifiers() {
    assert_eq!(kinds("ñandú Größe"), ["ñandú", "Größe", ";"]);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn never_panics_and_progresses(s in ".*") {
        let mut last_end = 0usize;
        for (start, _, end) in Lexer::new(&s) {
            prop_assert!(start <= end);
            prop_assert!(end <= s.len());
            prop_assert!(end >= last_end || start == end);
            last_end = last_end.max(end);
        }
    }
}
