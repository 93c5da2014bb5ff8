use std::path::PathBuf;

use thiserror::Error;

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

impl Diag {
    #[inline]
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagKind::Parse,
            span,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} error at {}..{}: {}",
            self.kind, self.span.start, self.span.end, self.message
        )
    }
}

/// Diagnostics collected while parsing one file. No partial tree is kept:
/// a file that does not parse cleanly never becomes part of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub diags: Vec<Diag>,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.diags.first() {
            Some(first) if self.diags.len() > 1 => {
                write!(f, "{first} (and {} more)", self.diags.len() - 1)
            }
            Some(first) => write!(f, "{first}"),
            None => f.write_str("parse failed"),
        }
    }
}

impl std::error::Error for ParseFailure {}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

/// Failure to turn Go sources into a [`Package`](crate::package::Package).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse {path}: {failure}")]
    Parse {
        path: PathBuf,
        failure: ParseFailure,
    },

    #[error("{path} declares package `{found}`, expected `{expected}`")]
    PackageMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("no Go sources found in {0}")]
    NoSources(PathBuf),
}

/// Failure to extract an [`Element`](crate::model::Element).
///
/// Every variant is terminal for the `build_element` call that hit it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The name is absent from the package or is not a struct/interface type.
    #[error("no struct or interface named `{name}` in package `{package}`")]
    NotFound { name: String, package: String },

    /// A type reference that the package cannot resolve (loader defect or
    /// an imported interface whose members are not visible).
    #[error("unresolved type `{name}` in {context}")]
    UnresolvedType { name: String, context: String },

    /// Field annotation text that is not a `key:"value"` sequence.
    #[error("malformed tag {tag}: unexpected `{offending}`")]
    MalformedTag { tag: String, offending: String },

    #[error("interface `{name}` embeds itself through {chain}")]
    EmbeddingCycle { name: String, chain: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
