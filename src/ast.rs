//! # Declaration-level Go AST
//!
//! Only what a type model needs survives here: the package clause, imports,
//! type specs, function/method signatures, struct fields, interface elements
//! and the comments attached to them. Function bodies and value declarations
//! are skipped by the parser and have no nodes.
//!
//! ## Architecture
//!
//! - **Nodes**: allocated in typed arenas (`SpannedArena<T>`) and referenced by `Id<T>`
//! - **Lists**: centralized buffers in `ExtraData`, referenced by `ListRef<T>`
//! - **Spans**: kept in a side table next to each arena
//! - **Symbols**: identifiers are interned once per package (`Interner`)
//! - **Comments**: grouped during parsing; nodes point at their doc/trailing
//!   `CommentGroupId`, text is recovered from the file source via span

use core::marker::PhantomData;
use core::ops::Index;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

// =============================================================================
// Core Foundation Types
// =============================================================================

/// Byte span into one source file.
///
/// Positions are stored as `u32` to save memory, limiting file size to 4GB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Creates a span from usize offsets, clamping rather than panicking.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        let s = if start > u32::MAX as usize {
            u32::MAX
        } else {
            start as u32
        };
        let e = if end > u32::MAX as usize {
            u32::MAX
        } else {
            end as u32
        };
        Self { start: s, end: e }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    /// Smallest span covering both.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Type-safe identifier for arena-allocated nodes.
#[derive(Debug)]
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(&self) -> usize {
        self.raw as usize
    }
}

/// Typed reference into a centralized list buffer.
#[derive(Debug)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> PartialEq for ListRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<T> Eq for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> u32 {
        self.start + self.len
    }
}

// =============================================================================
// Symbol Interning
// =============================================================================

/// Interned string symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol(u32);

/// Type alias for identifier symbols.
pub type Ident = Symbol;

/// Identifier occurrence (interned symbol + source position).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentName {
    pub sym: Ident,
    pub pos: Span,
}

/// String interner shared by every file of a package.
///
/// The set index doubles as the symbol value, so lookups in both directions
/// are a single hash probe or a slice index.
#[derive(Debug, Default)]
pub struct Interner {
    strings: IndexSet<Box<str>, FxBuildHasher>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string and returns its symbol.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(idx) = self.strings.get_index_of(s) {
            return Symbol(idx as u32);
        }
        let (idx, _) = self.strings.insert_full(s.into());
        Symbol(idx as u32)
    }

    /// Looks a string up without interning it.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.strings.get_index_of(s).map(|idx| Symbol(idx as u32))
    }

    /// Resolves a symbol back to its string.
    ///
    /// Symbols are only minted by this interner, so an unknown symbol is a
    /// caller bug; it resolves to the empty string rather than panicking.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        debug_assert!((sym.0 as usize) < self.strings.len());
        self.strings
            .get_index(sym.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or_default()
    }
}

// =============================================================================
// Arena Allocation
// =============================================================================

/// Arena for nodes with associated spans.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn get(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        self.get(id)
    }
}

// =============================================================================
// Type Aliases for Node IDs
// =============================================================================

pub type TypeId = Id<Type>;
pub type FieldId = Id<Field>;
pub type SignatureId = Id<Signature>;
pub type TypeSpecId = Id<TypeSpec>;
pub type FuncDeclId = Id<FuncDecl>;
pub type CommentId = Id<Comment>;
pub type CommentGroupId = Id<CommentGroup>;

// =============================================================================
// Centralized List Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct ExtraData {
    pub ident_names: Vec<IdentName>,
    pub types: Vec<TypeId>,
    pub fields: Vec<FieldId>,
    pub imports: Vec<ImportSpec>,
    pub type_specs: Vec<TypeSpecId>,
    pub funcs: Vec<FuncDeclId>,
    pub interface_elems: Vec<InterfaceElem>,
    pub type_terms: Vec<TypeTerm>,
    pub comment_ids: Vec<CommentId>,
    pub comment_group_ids: Vec<CommentGroupId>,
}

// =============================================================================
// Main AST Arena
// =============================================================================

/// Central arena holding every node of a package, across all of its files.
#[derive(Debug, Default)]
pub struct AstArena {
    pub types: SpannedArena<Type>,
    pub fields: SpannedArena<Field>,
    pub signatures: SpannedArena<Signature>,
    pub type_specs: SpannedArena<TypeSpec>,
    pub funcs: SpannedArena<FuncDecl>,
    pub comments: SpannedArena<Comment>,
    pub comment_groups: SpannedArena<CommentGroup>,
    pub extras: ExtraData,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn push_list<T>(buf: &mut Vec<T>, items: impl IntoIterator<Item = T>) -> ListRef<T> {
        let start = buf.len();
        buf.extend(items);
        let len = buf.len() - start;
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(len <= u32::MAX as usize);
        ListRef::new(start as u32, len as u32)
    }

    #[inline]
    fn slice<T>(buf: &[T], r: ListRef<T>) -> &[T] {
        &buf[r.start() as usize..r.end() as usize]
    }

    // List Builders

    pub fn list_ident_names(
        &mut self,
        i: impl IntoIterator<Item = IdentName>,
    ) -> ListRef<IdentName> {
        Self::push_list(&mut self.extras.ident_names, i)
    }

    pub fn list_types(&mut self, i: impl IntoIterator<Item = TypeId>) -> ListRef<TypeId> {
        Self::push_list(&mut self.extras.types, i)
    }

    pub fn list_fields(&mut self, i: impl IntoIterator<Item = FieldId>) -> ListRef<FieldId> {
        Self::push_list(&mut self.extras.fields, i)
    }

    pub fn list_imports(&mut self, i: impl IntoIterator<Item = ImportSpec>) -> ListRef<ImportSpec> {
        Self::push_list(&mut self.extras.imports, i)
    }

    pub fn list_type_specs(
        &mut self,
        i: impl IntoIterator<Item = TypeSpecId>,
    ) -> ListRef<TypeSpecId> {
        Self::push_list(&mut self.extras.type_specs, i)
    }

    pub fn list_funcs(&mut self, i: impl IntoIterator<Item = FuncDeclId>) -> ListRef<FuncDeclId> {
        Self::push_list(&mut self.extras.funcs, i)
    }

    pub fn list_interface_elems(
        &mut self,
        i: impl IntoIterator<Item = InterfaceElem>,
    ) -> ListRef<InterfaceElem> {
        Self::push_list(&mut self.extras.interface_elems, i)
    }

    pub fn list_type_terms(&mut self, i: impl IntoIterator<Item = TypeTerm>) -> ListRef<TypeTerm> {
        Self::push_list(&mut self.extras.type_terms, i)
    }

    pub fn list_comment_ids(
        &mut self,
        i: impl IntoIterator<Item = CommentId>,
    ) -> ListRef<CommentId> {
        Self::push_list(&mut self.extras.comment_ids, i)
    }

    pub fn list_comment_group_ids(
        &mut self,
        i: impl IntoIterator<Item = CommentGroupId>,
    ) -> ListRef<CommentGroupId> {
        Self::push_list(&mut self.extras.comment_group_ids, i)
    }

    // List Accessors

    pub fn ident_names(&self, r: ListRef<IdentName>) -> &[IdentName] {
        Self::slice(&self.extras.ident_names, r)
    }

    pub fn types_list(&self, r: ListRef<TypeId>) -> &[TypeId] {
        Self::slice(&self.extras.types, r)
    }

    pub fn fields_list(&self, r: ListRef<FieldId>) -> &[FieldId] {
        Self::slice(&self.extras.fields, r)
    }

    pub fn imports(&self, r: ListRef<ImportSpec>) -> &[ImportSpec] {
        Self::slice(&self.extras.imports, r)
    }

    pub fn type_specs_list(&self, r: ListRef<TypeSpecId>) -> &[TypeSpecId] {
        Self::slice(&self.extras.type_specs, r)
    }

    pub fn funcs_list(&self, r: ListRef<FuncDeclId>) -> &[FuncDeclId] {
        Self::slice(&self.extras.funcs, r)
    }

    pub fn interface_elems(&self, r: ListRef<InterfaceElem>) -> &[InterfaceElem] {
        Self::slice(&self.extras.interface_elems, r)
    }

    pub fn type_terms(&self, r: ListRef<TypeTerm>) -> &[TypeTerm] {
        Self::slice(&self.extras.type_terms, r)
    }

    pub fn comment_ids(&self, r: ListRef<CommentId>) -> &[CommentId] {
        Self::slice(&self.extras.comment_ids, r)
    }

    pub fn comment_group_ids(&self, r: ListRef<CommentGroupId>) -> &[CommentGroupId] {
        Self::slice(&self.extras.comment_group_ids, r)
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self, mut id: TypeId) -> TypeId {
        while let Type::Paren { typ } = self.types[id] {
            id = typ;
        }
        id
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// Comment token (text is recovered from source via span).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
}

/// Group of adjacent comments with no blank line between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: ListRef<CommentId>,
}

// =============================================================================
// Source File (Root Node)
// =============================================================================

/// One parsed Go file.
///
/// ```text
/// SourceFile = PackageClause ";" { ImportDecl ";" } { TopLevelDecl ";" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile {
    pub package_pos: Span,
    pub name: Ident,
    pub imports: ListRef<ImportSpec>,
    /// Type specs in source order, grouped declarations flattened.
    pub type_specs: ListRef<TypeSpecId>,
    /// Functions and methods in source order.
    pub funcs: ListRef<FuncDeclId>,
    /// Every comment group in the file.
    pub comments: ListRef<CommentGroupId>,
    /// Package doc comment.
    pub doc: Option<CommentGroupId>,
}

// =============================================================================
// Declarations
// =============================================================================

/// `ImportSpec = [ "." | PackageName ] ImportPath`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<ImportName>,
    /// Import path, unquoted.
    pub path: Symbol,
    pub path_pos: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportName {
    /// `import . "pkg"`
    Dot(Span),
    /// `import _ "pkg"`
    Blank(Span),
    /// `import name "pkg"`
    Name(Ident, Span),
}

/// `TypeSpec = AliasDecl | TypeDef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    /// Doc of the spec, or of the enclosing ungrouped `type` declaration.
    pub doc: Option<CommentGroupId>,
    pub name: Ident,
    pub name_pos: Span,
    /// Names declared by the `[...]` type parameter list; constraints are
    /// not modelled.
    pub type_params: ListRef<IdentName>,
    pub typ: TypeId,
    /// True for `type A = B`.
    pub alias: bool,
}

/// ```text
/// FunctionDecl = "func" FunctionName [ TypeParameters ] Signature [ FunctionBody ]
/// MethodDecl   = "func" Receiver MethodName Signature [ FunctionBody ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncDecl {
    pub doc: Option<CommentGroupId>,
    pub func_pos: Span,
    pub recv: Option<Receiver>,
    pub name: Ident,
    pub name_pos: Span,
    pub signature: SignatureId,
    /// Braces of the skipped body.
    pub body: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver {
    pub name: Option<IdentName>,
    pub typ: TypeId,
}

// =============================================================================
// Signatures and Fields
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: ListRef<FieldId>,
    pub results: ListRef<FieldId>,
}

/// Field in a parameter list, result list or struct.
///
/// `ParameterDecl = [ IdentifierList ] [ "..." ] Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field names (empty for anonymous parameters and embedded fields)
    pub names: ListRef<IdentName>,
    /// Position of `...` for variadic parameters
    pub ellipsis_pos: Option<Span>,
    pub typ: TypeId,
    /// Raw struct tag literal, quotes included
    pub tag: Option<Span>,
    pub is_embed: bool,
    /// Leading doc comment group
    pub doc: Option<CommentGroupId>,
    /// Trailing line comment group
    pub comment: Option<CommentGroupId>,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// `Name`, `pkg.Name` or `Name[T]`
    Named {
        pkg: Option<Ident>,
        name: Ident,
        args: ListRef<TypeId>,
    },

    /// `*T`
    Pointer { elem: TypeId },

    /// `[N]T`; the length is kept as source text.
    Array { len: Span, elem: TypeId },

    /// `[]T`
    Slice { elem: TypeId },

    /// `map[K]V`
    Map { key: TypeId, val: TypeId },

    /// `chan T`, `<-chan T` or `chan<- T`
    Chan { dir: ChanDir, elem: TypeId },

    /// `struct { ... }`
    Struct { fields: ListRef<FieldId> },

    /// `interface { ... }`
    Interface { elems: ListRef<InterfaceElem> },

    /// `func(...) ...`
    Func { sig: SignatureId },

    /// `(T)`
    Paren { typ: TypeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Union term: `~T` or `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub typ: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceElem {
    /// `Method(...) ...`
    Method {
        name: Ident,
        name_pos: Span,
        sig: SignatureId,
        doc: Option<CommentGroupId>,
        comment: Option<CommentGroupId>,
    },

    /// Embedded type (`io.Reader`, `A`) or union (`~int | string`).
    TypeElem {
        terms: ListRef<TypeTerm>,
        doc: Option<CommentGroupId>,
        comment: Option<CommentGroupId>,
    },
}

impl InterfaceElem {
    pub fn doc(&self) -> Option<CommentGroupId> {
        match *self {
            InterfaceElem::Method { doc, .. } | InterfaceElem::TypeElem { doc, .. } => doc,
        }
    }
}
