//! Turns Go sources into a [`Package`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::ast::{AstArena, Interner, SourceFile};
use crate::error::LoadError;
use crate::package::{Package, PackageFile};
use crate::parser::parse_file;

/// Loader settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadConfig {
    /// Whether `_test.go` files take part in the package.
    pub include_tests: bool,
}

impl LoadConfig {
    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct Loader {
    config: LoadConfig,
}

impl Loader {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> LoadConfig {
        self.config
    }

    /// Loads a single in-memory file.
    pub fn load_str(&self, path: impl Into<PathBuf>, source: impl Into<String>) -> Result<Package, LoadError> {
        self.load_sources([(path.into(), source.into())])
    }

    /// Loads `(path, source)` pairs as one package, in the given order.
    ///
    /// The first non-test file fixes the package name. Test files are dropped
    /// unless the config includes them; with tests included, an external
    /// `foo_test` package next to `foo` is skipped rather than rejected.
    pub fn load_sources<I, P, S>(&self, sources: I) -> Result<Package, LoadError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let mut arena = AstArena::new();
        let mut interner = Interner::new();
        let mut parsed = Vec::new();
        let mut first_path: Option<PathBuf> = None;

        for (path, source) in sources {
            let path = path.into();
            let source = source.into();
            first_path.get_or_insert_with(|| path.clone());

            let test_file = is_test_file(&path);
            if test_file && !self.config.include_tests {
                debug!(path = %path.display(), "skipping test file");
                continue;
            }

            let ast = parse_file(&source, &mut arena, &mut interner).map_err(|failure| {
                LoadError::Parse {
                    path: path.clone(),
                    failure,
                }
            })?;
            let package = interner.resolve(ast.name).to_owned();
            parsed.push(ParsedFile {
                path,
                source,
                ast,
                package,
                test_file,
            });
        }

        // Non-test files name the package, whatever order the files come in.
        let Some(name) = parsed
            .iter()
            .find(|f| !f.test_file)
            .or_else(|| parsed.iter().find(|f| !f.package.ends_with("_test")))
            .or(parsed.first())
            .map(|f| f.package.clone())
        else {
            return Err(LoadError::NoSources(first_path.unwrap_or_default()));
        };

        let mut files = Vec::with_capacity(parsed.len());
        for file in parsed {
            if file.package != name {
                if file.test_file && file.package.strip_suffix("_test") == Some(name.as_str()) {
                    warn!(path = %file.path.display(), package = %file.package, "skipping external test package");
                    continue;
                }
                return Err(LoadError::PackageMismatch {
                    path: file.path,
                    expected: name,
                    found: file.package,
                });
            }
            debug!(path = %file.path.display(), "loaded file");
            files.push(PackageFile::new(file.path, file.source, file.ast));
        }

        debug!(package = %name, files = files.len(), "package loaded");
        Ok(Package::new(name, arena, interner, files))
    }

    /// Loads every `*.go` file directly inside `dir`, sorted by path.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<Package, LoadError> {
        let dir = dir.as_ref();
        let mut sources = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
                continue;
            }
            if is_test_file(path) && !self.config.include_tests {
                continue;
            }
            let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            sources.push((path.to_path_buf(), source));
        }

        if sources.is_empty() {
            warn!(dir = %dir.display(), "no Go sources");
            return Err(LoadError::NoSources(dir.to_path_buf()));
        }
        self.load_sources(sources)
    }
}

struct ParsedFile {
    path: PathBuf,
    source: String,
    ast: SourceFile,
    package: String,
    test_file: bool,
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}
