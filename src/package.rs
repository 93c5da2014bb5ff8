//! The resolved package handle consumed by extraction.
//!
//! A [`Package`] owns the arena, the interner and the raw sources of every file
//! that was loaded into it. It is immutable once built, so a shared reference
//! can be handed to any number of concurrent extraction calls.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::ast::{
    AstArena, CommentId, FuncDeclId, ImportName, Interner, SourceFile, Span, Symbol, Type,
    TypeId, TypeSpec, TypeSpecId,
};

/// Predeclared type names that are never qualified.
pub const UNIVERSE_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex128",
    "complex64",
    "error",
    "float32",
    "float64",
    "int",
    "int16",
    "int32",
    "int64",
    "int8",
    "rune",
    "string",
    "uint",
    "uint16",
    "uint32",
    "uint64",
    "uint8",
    "uintptr",
];

#[inline]
pub fn is_universe(name: &str) -> bool {
    UNIVERSE_TYPES.binary_search(&name).is_ok()
}

/// Package name an import path binds when the import has no explicit name.
///
/// Uses the last path element, skipping a trailing `vN` major-version
/// element and dropping a `.vN` suffix (`gopkg.in/yaml.v3` binds `yaml`).
pub fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let last = segments.next().unwrap_or(path);
    let name = if is_major_version(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    match name.rsplit_once('.') {
        Some((stem, suffix)) if is_major_version(suffix) && !stem.is_empty() => stem,
        _ => name,
    }
}

fn is_major_version(s: &str) -> bool {
    s.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Index of a file within its package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A top-level type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDecl {
    pub file: FileId,
    pub spec: TypeSpecId,
}

/// A method declared with a receiver of some local type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDecl {
    pub file: FileId,
    pub func: FuncDeclId,
}

/// Where an identifier used as a type name is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Declared at package level in this package.
    Local,
    /// Predeclared (`string`, `error`, ...).
    Universe,
    /// Provided by an import; `name` is the qualifier to print.
    Imported { name: String, path: String },
}

#[derive(Debug, Clone)]
struct Import {
    path: Symbol,
    name: Box<str>,
}

/// One loaded source file.
#[derive(Debug)]
pub struct PackageFile {
    pub path: PathBuf,
    pub source: String,
    pub ast: SourceFile,
    imports: FxHashMap<Box<str>, Import>,
    dot_imports: Vec<Import>,
}

impl PackageFile {
    pub fn new(path: impl Into<PathBuf>, source: String, ast: SourceFile) -> Self {
        Self {
            path: path.into(),
            source,
            ast,
            imports: FxHashMap::default(),
            dot_imports: Vec::new(),
        }
    }

    #[inline]
    pub fn slice(&self, span: Span) -> &str {
        self.source.get(span.range()).unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Package {
    name: String,
    arena: AstArena,
    interner: Interner,
    files: Vec<PackageFile>,
    types: IndexMap<Symbol, TypeDecl, FxBuildHasher>,
    methods: FxHashMap<Symbol, Vec<MethodDecl>>,
}

impl Package {
    /// Indexes parsed files. All of them must already share `name`; the
    /// loader checks that.
    pub fn new(
        name: impl Into<String>,
        arena: AstArena,
        interner: Interner,
        mut files: Vec<PackageFile>,
    ) -> Self {
        let mut types: IndexMap<Symbol, TypeDecl, FxBuildHasher> = IndexMap::default();
        let mut methods: FxHashMap<Symbol, Vec<MethodDecl>> = FxHashMap::default();

        for (idx, file) in files.iter_mut().enumerate() {
            let file_id = FileId(idx as u32);

            for spec in arena.imports(file.ast.imports) {
                let path = interner.resolve(spec.path);
                let bound = match spec.name {
                    Some(ImportName::Blank(_)) => continue,
                    Some(ImportName::Name(sym, _)) => interner.resolve(sym),
                    Some(ImportName::Dot(_)) | None => default_import_name(path),
                };
                let import = Import {
                    path: spec.path,
                    name: bound.into(),
                };
                if matches!(spec.name, Some(ImportName::Dot(_))) {
                    file.dot_imports.push(import);
                } else {
                    file.imports.insert(bound.into(), import);
                }
            }

            for &spec_id in arena.type_specs_list(file.ast.type_specs) {
                let name = arena.type_specs[spec_id].name;
                types.entry(name).or_insert(TypeDecl {
                    file: file_id,
                    spec: spec_id,
                });
            }

            for &func_id in arena.funcs_list(file.ast.funcs) {
                let Some(recv) = arena.funcs[func_id].recv else {
                    continue;
                };
                if let Some(base) = receiver_base(&arena, recv.typ) {
                    methods.entry(base).or_default().push(MethodDecl {
                        file: file_id,
                        func: func_id,
                    });
                }
            }
        }

        Self {
            name: name.into(),
            arena,
            interner,
            files,
            types,
            methods,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn arena(&self) -> &AstArena {
        &self.arena
    }

    #[inline]
    pub fn files(&self) -> &[PackageFile] {
        &self.files
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> {
        (0..self.files.len() as u32).map(FileId)
    }

    #[inline]
    pub fn file(&self, id: FileId) -> &PackageFile {
        &self.files[id.index()]
    }

    #[inline]
    pub fn file_path(&self, id: FileId) -> &Path {
        &self.file(id).path
    }

    #[inline]
    pub fn text(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    #[inline]
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.interner.get(name)
    }

    /// Type declarations in file then source order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.keys().map(|&sym| self.text(sym))
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeDecl> {
        let sym = self.symbol(name)?;
        self.types.get(&sym).copied()
    }

    #[inline]
    pub fn type_spec(&self, decl: TypeDecl) -> &TypeSpec {
        &self.arena.type_specs[decl.spec]
    }

    /// Methods whose receiver base type is `type_name`, in file then source
    /// order.
    pub fn methods_of(&self, type_name: &str) -> &[MethodDecl] {
        self.symbol(type_name)
            .and_then(|sym| self.methods.get(&sym))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolves the scope of a type name used in `file`.
    ///
    /// `None` means a dangling reference: an unknown qualifier, or a bare
    /// identifier that is neither declared here, predeclared, nor possibly
    /// provided by a dot import.
    pub fn scope_of(&self, file: FileId, qualifier: Option<Symbol>, ident: Symbol) -> Option<Scope> {
        let file = self.file(file);
        let imported = |import: &Import| Scope::Imported {
            name: import.name.to_string(),
            path: self.text(import.path).to_owned(),
        };

        if let Some(qualifier) = qualifier {
            return file.imports.get(self.text(qualifier)).map(imported);
        }
        if self.types.contains_key(&ident) {
            return Some(Scope::Local);
        }
        if is_universe(self.text(ident)) {
            return Some(Scope::Universe);
        }
        file.dot_imports.first().map(imported)
    }

    /// Source text of a single comment, delimiters included.
    pub fn comment_text(&self, file: FileId, id: CommentId) -> &str {
        self.file(file).slice(self.arena.comments.span(id))
    }

    #[inline]
    pub fn source_text(&self, file: FileId, span: Span) -> &str {
        self.file(file).slice(span)
    }
}

/// `T`, `*T`, `T[K]` and `(*T)` all have base `T`.
fn receiver_base(arena: &AstArena, typ: TypeId) -> Option<Symbol> {
    let mut typ = arena.unparen(typ);
    if let Type::Pointer { elem } = arena.types[typ] {
        typ = arena.unparen(elem);
    }
    match arena.types[typ] {
        Type::Named { pkg: None, name, .. } => Some(name),
        _ => None,
    }
}
