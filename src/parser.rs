//! Declaration-level recursive-descent parser for Go source files.
//!
//! The parser runs in two passes. The first drains the [`Lexer`], turns
//! comment tokens into [`CommentGroup`]s and records, for every real token,
//! the group that ends on the line right above it (`lead`) and the group that
//! follows it on its own line (`trailing`). The second pass parses the token
//! vector; declarations and fields pick up their docs from the lead group of
//! their first token, which keeps comment association a side table built
//! during tree construction rather than a later positional search.
//!
//! Function bodies, `var` and `const` declarations are skipped by delimiter
//! matching.

use std::mem::discriminant;

use crate::ast::{
    AstArena, ChanDir, Comment, CommentGroup, CommentGroupId, CommentId, CommentKind, Field,
    FieldId, FuncDecl, IdentName, ImportName, ImportSpec, InterfaceElem, Interner, ListRef,
    Receiver, Signature, SignatureId, SourceFile, Span, Type, TypeId, TypeSpec, TypeSpecId,
    TypeTerm,
};
use crate::error::{Diag, ParseFailure};
use crate::lexer::{Lexer, Tok};
use crate::parser_support::{resolve_param_list, ParamDecl};

type PResult<T> = Result<T, Diag>;

/// Parses one file into `arena`, interning identifiers into `interner`.
///
/// Nothing is rolled back on failure: the arena may hold orphan nodes from a
/// file that did not parse, but no [`SourceFile`] refers to them.
pub fn parse_file(
    src: &str,
    arena: &mut AstArena,
    interner: &mut Interner,
) -> Result<SourceFile, ParseFailure> {
    let mut lexer = Lexer::new(src);
    let (toks, groups) = collect_tokens(src, &mut lexer, arena);
    let mut diags = lexer.take_diags();

    let mut parser = Parser {
        src,
        toks,
        pos: 0,
        arena,
        interner,
        groups,
    };

    match parser.source_file() {
        Ok(file) if diags.is_empty() => Ok(file),
        Ok(_) => Err(ParseFailure { diags }),
        Err(diag) => {
            diags.push(diag);
            Err(ParseFailure { diags })
        }
    }
}

// =============================================================================
// Pass 1: tokens and comment groups
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Token<'src> {
    tok: Tok<'src>,
    span: Span,
    /// Comment group ending on the line immediately above this token.
    lead: Option<CommentGroupId>,
    /// Comment group starting on this token's line, after it.
    trailing: Option<CommentGroupId>,
}

impl Token<'_> {
    /// Automatic semicolons are zero-width.
    #[inline]
    fn is_injected_semi(&self) -> bool {
        matches!(self.tok, Tok::Semi) && self.span.is_empty()
    }
}

/// Byte offsets of line starts, for line lookups.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(memchr::memchr_iter(b'\n', src.as_bytes()).map(|i| i + 1));
        Self { starts }
    }

    #[inline]
    fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}

struct PendingGroup {
    comments: Vec<CommentId>,
    span: Span,
    end_line: usize,
    trailing: bool,
}

fn collect_tokens<'src>(
    src: &'src str,
    lexer: &mut Lexer<'src>,
    arena: &mut AstArena,
) -> (Vec<Token<'src>>, Vec<CommentGroupId>) {
    let lines = LineIndex::new(src);
    let mut toks: Vec<Token<'src>> = Vec::new();
    let mut groups = Vec::new();
    let mut pending: Option<PendingGroup> = None;

    // Finished groups are attached to the last real token when trailing.
    let mut flush = |pending: &mut Option<PendingGroup>,
                     toks: &mut Vec<Token<'src>>,
                     arena: &mut AstArena|
     -> Option<(CommentGroupId, usize, bool)> {
        let group = pending.take()?;
        let comments = arena.list_comment_ids(group.comments);
        let id = arena
            .comment_groups
            .alloc(CommentGroup { comments }, group.span);
        groups.push(id);
        if group.trailing {
            if let Some(last) = toks.iter_mut().rev().find(|t| !t.is_injected_semi()) {
                last.trailing = Some(id);
            }
        }
        Some((id, group.end_line, group.trailing))
    };

    for (start, tok, end) in lexer.by_ref() {
        let span = Span::new(start, end);

        if tok.is_comment() {
            let kind = match tok {
                Tok::BlockComment(_) => CommentKind::Block,
                _ => CommentKind::Line,
            };
            let id = arena.comments.alloc(Comment { kind }, span);
            let start_line = lines.line(start);
            let end_line = lines.line(end.saturating_sub(1).max(start));

            // Trailing groups only extend on their own line, doc groups also
            // over adjacent lines.
            if let Some(group) = &pending {
                let reach = if group.trailing { 0 } else { 1 };
                if start_line > group.end_line + reach {
                    flush(&mut pending, &mut toks, arena);
                }
            }

            match &mut pending {
                Some(group) => {
                    group.comments.push(id);
                    group.span = group.span.to(span);
                    group.end_line = end_line;
                }
                None => {
                    let trailing = toks
                        .iter()
                        .rev()
                        .find(|t| !t.is_injected_semi())
                        .is_some_and(|t| lines.line(t.span.start as usize) == start_line);
                    pending = Some(PendingGroup {
                        comments: vec![id],
                        span,
                        end_line,
                        trailing,
                    });
                }
            }
            continue;
        }

        let tok_line = lines.line(start);
        let lead = match flush(&mut pending, &mut toks, arena) {
            Some((id, end_line, false)) if end_line + 1 == tok_line => Some(id),
            _ => None,
        };
        toks.push(Token {
            tok,
            span,
            lead,
            trailing: None,
        });
    }
    flush(&mut pending, &mut toks, arena);

    (toks, groups)
}

// =============================================================================
// Pass 2: declarations
// =============================================================================

const EOF: Token<'static> = Token {
    tok: Tok::Semi,
    span: Span { start: u32::MAX, end: u32::MAX },
    lead: None,
    trailing: None,
};

struct Parser<'src, 'a> {
    src: &'src str,
    toks: Vec<Token<'src>>,
    pos: usize,
    arena: &'a mut AstArena,
    interner: &'a mut Interner,
    groups: Vec<CommentGroupId>,
}

impl<'src, 'a> Parser<'src, 'a> {
    // -------------------------------------------------------------------------
    // Cursor
    // -------------------------------------------------------------------------

    #[inline]
    fn peek(&self) -> Token<'src> {
        self.nth(0)
    }

    #[inline]
    fn nth(&self, n: usize) -> Token<'src> {
        self.toks.get(self.pos + n).copied().unwrap_or(EOF)
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.pos >= self.toks.len()
    }

    #[inline]
    fn prev(&self) -> Token<'src> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.toks.get(i).copied())
            .unwrap_or(EOF)
    }

    #[inline]
    fn bump(&mut self) -> Token<'src> {
        let t = self.peek();
        if !self.at_eof() {
            self.pos += 1;
        }
        t
    }

    #[inline]
    fn at(&self, tok: Tok<'src>) -> bool {
        !self.at_eof() && discriminant(&self.peek().tok) == discriminant(&tok)
    }

    #[inline]
    fn eat(&mut self, tok: Tok<'src>) -> bool {
        if self.at(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok<'src>, what: &str) -> PResult<Token<'src>> {
        if self.at(tok) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> Diag {
        let t = self.peek();
        if self.at_eof() {
            let end = self.src.len();
            Diag::parse(Span::empty_at(end), format!("unexpected EOF; expected {what}"))
        } else {
            Diag::parse(t.span, format!("unexpected `{}`; expected {what}", t.tok))
        }
    }

    fn ident(&mut self) -> PResult<IdentName> {
        match self.peek().tok {
            Tok::Ident(name) if !self.at_eof() => {
                let span = self.bump().span;
                Ok(IdentName {
                    sym: self.interner.intern(name),
                    pos: span,
                })
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    #[inline]
    fn is_ident(&self, n: usize) -> bool {
        self.pos + n < self.toks.len() && matches!(self.nth(n).tok, Tok::Ident(_))
    }

    /// Statement terminator: `;`, or nothing before a closing delimiter.
    fn end_of_spec(&mut self, close: Tok<'src>, what: &str) -> PResult<()> {
        if self.eat(Tok::Semi) || self.at(close) || self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Token following the bracket group that opens at `nth(n)`, without
    /// consuming anything. `List[int]` is an instance when a list separator
    /// or terminator follows; `a [N]int` is a name and an array type.
    fn after_brackets(&self, n: usize) -> Token<'src> {
        let mut depth = 0usize;
        let mut i = n;
        while self.pos + i < self.toks.len() {
            match self.nth(i).tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.nth(i + 1);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        EOF
    }

    /// Skips from an opening delimiter to just past its matching close.
    fn skip_balanced(&mut self) -> PResult<Span> {
        let open = self.bump();
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_eof() {
                return Err(Diag::parse(open.span, "unclosed delimiter"));
            }
            match self.bump().tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth -= 1,
                _ => {}
            }
        }
        Ok(open.span.to(self.prev().span))
    }

    /// Skips to the `;` ending the current spec, honouring nesting.
    fn skip_spec(&mut self, close: Tok<'src>) -> PResult<()> {
        while !self.at_eof() && !self.at(Tok::Semi) && !self.at(close) {
            if matches!(self.peek().tok, Tok::LParen | Tok::LBrack | Tok::LBrace) {
                self.skip_balanced()?;
            } else {
                self.bump();
            }
        }
        self.eat(Tok::Semi);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Source file
    // -------------------------------------------------------------------------

    fn source_file(&mut self) -> PResult<SourceFile> {
        let package = self.expect(Tok::KwPackage, "`package` clause")?;
        let name = self.ident()?;
        self.end_of_spec(Tok::Semi, "`;` after package clause")?;

        let mut imports = Vec::new();
        while self.at(Tok::KwImport) {
            self.import_decl(&mut imports)?;
        }

        let mut type_specs = Vec::new();
        let mut funcs = Vec::new();
        while !self.at_eof() {
            match self.peek().tok {
                Tok::KwType => self.type_decl(&mut type_specs)?,
                Tok::KwFunc => funcs.push(self.func_decl()?),
                Tok::KwVar | Tok::KwConst => {
                    self.bump();
                    if self.at(Tok::LParen) {
                        self.skip_balanced()?;
                        self.end_of_spec(Tok::Semi, "`;` after declaration")?;
                    } else {
                        self.skip_spec(Tok::Semi)?;
                    }
                }
                Tok::KwImport => return Err(self.unexpected("declaration (imports must come first)")),
                Tok::Semi => {
                    self.bump();
                }
                _ => return Err(self.unexpected("declaration")),
            }
        }

        let groups = std::mem::take(&mut self.groups);
        Ok(SourceFile {
            package_pos: package.span,
            name: name.sym,
            imports: self.arena.list_imports(imports),
            type_specs: self.arena.list_type_specs(type_specs),
            funcs: self.arena.list_funcs(funcs),
            comments: self.arena.list_comment_group_ids(groups),
            doc: package.lead,
        })
    }

    fn import_decl(&mut self, out: &mut Vec<ImportSpec>) -> PResult<()> {
        self.bump();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) {
                if self.eat(Tok::Semi) {
                    continue;
                }
                out.push(self.import_spec()?);
                self.end_of_spec(Tok::RParen, "`;` or `)` after import")?;
            }
            self.expect(Tok::RParen, "`)`")?;
        } else {
            out.push(self.import_spec()?);
        }
        self.end_of_spec(Tok::Semi, "`;` after import declaration")
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.peek().tok {
            Tok::Dot => Some(ImportName::Dot(self.bump().span)),
            Tok::Ident("_") => Some(ImportName::Blank(self.bump().span)),
            Tok::Ident(_) => {
                let id = self.ident()?;
                Some(ImportName::Name(id.sym, id.pos))
            }
            _ => None,
        };
        let path = match self.peek().tok {
            Tok::StringLit(raw) | Tok::RawStringLit(raw) if !self.at_eof() => {
                let span = self.bump().span;
                (raw.trim_matches(|c| c == '"' || c == '`'), span)
            }
            _ => return Err(self.unexpected("import path")),
        };
        Ok(ImportSpec {
            name,
            path: self.interner.intern(path.0),
            path_pos: path.1,
        })
    }

    // -------------------------------------------------------------------------
    // Type declarations
    // -------------------------------------------------------------------------

    fn type_decl(&mut self, out: &mut Vec<TypeSpecId>) -> PResult<()> {
        let kw = self.bump();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) {
                if self.eat(Tok::Semi) {
                    continue;
                }
                let doc = self.peek().lead;
                out.push(self.type_spec(doc)?);
                self.end_of_spec(Tok::RParen, "`;` or `)` after type spec")?;
            }
            self.expect(Tok::RParen, "`)`")?;
        } else {
            out.push(self.type_spec(kw.lead)?);
        }
        self.end_of_spec(Tok::Semi, "`;` after type declaration")
    }

    fn type_spec(&mut self, doc: Option<CommentGroupId>) -> PResult<TypeSpecId> {
        let name = self.ident()?;
        let type_params = if self.at(Tok::LBrack) && self.starts_type_params() {
            self.type_param_names()?
        } else {
            ListRef::EMPTY
        };
        let alias = self.eat(Tok::Assign);
        let typ = self.parse_type()?;
        let span = name.pos.to(self.arena.types.span(typ));
        Ok(self.arena.type_specs.alloc(
            TypeSpec {
                doc,
                name: name.sym,
                name_pos: name.pos,
                type_params,
                typ,
                alias,
            },
            span,
        ))
    }

    /// `type A[T any] ...` versus `type A [N]T`: a parameter list opens with
    /// a name followed by a constraint or another name. `[N * M]T` is
    /// ambiguous and reads as parameters.
    fn starts_type_params(&self) -> bool {
        self.is_ident(1)
            && (self.starts_type_at(2) || matches!(self.nth(2).tok, Tok::Comma | Tok::Tilde))
    }

    /// Collects the names of `[K comparable, V any]`, skipping constraints.
    /// Every entry at depth zero starts with a name.
    fn type_param_names(&mut self) -> PResult<ListRef<IdentName>> {
        let open = self.bump();
        let mut names = Vec::new();
        let mut depth = 0usize;
        let mut entry_start = true;
        loop {
            if self.at_eof() {
                return Err(Diag::parse(open.span, "unclosed type parameter list"));
            }
            match self.peek().tok {
                Tok::RBrack if depth == 0 => break,
                Tok::Ident(_) if depth == 0 && entry_start => {
                    names.push(self.ident()?);
                    if !self.at(Tok::Comma) {
                        entry_start = false;
                    }
                    continue;
                }
                Tok::Comma if depth == 0 => entry_start = true,
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        self.bump();
        Ok(self.arena.list_ident_names(names))
    }

    // -------------------------------------------------------------------------
    // Functions
    // -------------------------------------------------------------------------

    fn func_decl(&mut self) -> PResult<crate::ast::FuncDeclId> {
        let kw = self.bump();

        let recv = if self.at(Tok::LParen) {
            let fields = self.params()?;
            let [field] = fields.as_slice() else {
                return Err(Diag::parse(kw.span, "method must have exactly one receiver"));
            };
            let field = self.arena.fields[*field];
            let name = self.arena.ident_names(field.names).first().copied();
            Some(Receiver {
                name,
                typ: field.typ,
            })
        } else {
            None
        };

        let name = self.ident()?;
        if recv.is_none() && self.at(Tok::LBrack) {
            self.skip_balanced()?;
        }
        let signature = self.signature()?;
        let body = if self.at(Tok::LBrace) {
            Some(self.skip_balanced()?)
        } else {
            None
        };
        self.end_of_spec(Tok::Semi, "`;` after function declaration")?;

        let span = kw.span.to(self.prev().span);
        Ok(self.arena.funcs.alloc(
            FuncDecl {
                doc: kw.lead,
                func_pos: kw.span,
                recv,
                name: name.sym,
                name_pos: name.pos,
                signature,
                body,
            },
            span,
        ))
    }

    fn signature(&mut self) -> PResult<SignatureId> {
        let start = self.peek().span;
        let params = self.params()?;
        let results = if self.at(Tok::LParen) {
            self.params()?
        } else if self.starts_type() {
            let typ = self.parse_type()?;
            let field = Field {
                names: ListRef::EMPTY,
                ellipsis_pos: None,
                typ,
                tag: None,
                is_embed: false,
                doc: None,
                comment: None,
            };
            vec![self.arena.fields.alloc(field, self.arena.types.span(typ))]
        } else {
            Vec::new()
        };

        let sig = Signature {
            params: self.arena.list_fields(params),
            results: self.arena.list_fields(results),
        };
        Ok(self.arena.signatures.alloc(sig, start.to(self.prev().span)))
    }

    /// `"(" [ ParameterList [ "," ] ] ")"`
    fn params(&mut self) -> PResult<Vec<FieldId>> {
        self.expect(Tok::LParen, "`(`")?;
        let mut decls = Vec::new();
        while !self.at(Tok::RParen) {
            decls.push(self.param_decl()?);
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RParen, "`)` after parameters")?;
        Ok(resolve_param_list(self.arena, decls))
    }

    fn param_decl(&mut self) -> PResult<ParamDecl> {
        let start = self.peek().span;

        if self.is_ident(0) {
            let next = self.nth(1).tok;
            let lone = matches!(next, Tok::Comma | Tok::RParen);
            let instance = matches!(next, Tok::LBrack)
                && matches!(self.after_brackets(1).tok, Tok::Comma | Tok::RParen);
            let named = !matches!(next, Tok::Dot)
                && !instance
                && (self.starts_type_at(1) || matches!(next, Tok::Ellipsis));
            if lone || named {
                let name = self.ident()?;
                let (ellipsis_pos, typ) = if lone {
                    (None, None)
                } else {
                    let ellipsis = self.eat(Tok::Ellipsis).then(|| self.prev().span);
                    (ellipsis, Some(self.parse_type()?))
                };
                return Ok(ParamDecl {
                    names: vec![name],
                    ellipsis_pos,
                    typ,
                    span: start.to(self.prev().span),
                });
            }
        }

        let ellipsis_pos = self.eat(Tok::Ellipsis).then(|| self.prev().span);
        let typ = self.parse_type()?;
        Ok(ParamDecl {
            names: Vec::new(),
            ellipsis_pos,
            typ: Some(typ),
            span: start.to(self.prev().span),
        })
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    #[inline]
    fn starts_type(&self) -> bool {
        self.starts_type_at(0)
    }

    fn starts_type_at(&self, n: usize) -> bool {
        self.pos + n < self.toks.len()
            && matches!(
                self.nth(n).tok,
                Tok::Ident(_)
                    | Tok::Star
                    | Tok::LBrack
                    | Tok::LParen
                    | Tok::KwMap
                    | Tok::KwChan
                    | Tok::KwFunc
                    | Tok::KwStruct
                    | Tok::KwInterface
                    | Tok::Arrow
            )
    }

    fn alloc_type(&mut self, typ: Type, start: Span) -> TypeId {
        let span = start.to(self.prev().span);
        self.arena.types.alloc(typ, span)
    }

    fn parse_type(&mut self) -> PResult<TypeId> {
        let start = self.peek().span;
        if self.at_eof() {
            return Err(self.unexpected("type"));
        }

        let typ = match self.peek().tok {
            Tok::Ident(_) => return self.named_type(),
            Tok::Star => {
                self.bump();
                Type::Pointer {
                    elem: self.parse_type()?,
                }
            }
            Tok::LBrack => {
                self.bump();
                if self.eat(Tok::RBrack) {
                    Type::Slice {
                        elem: self.parse_type()?,
                    }
                } else {
                    let len = self.array_len()?;
                    Type::Array {
                        len,
                        elem: self.parse_type()?,
                    }
                }
            }
            Tok::KwMap => {
                self.bump();
                self.expect(Tok::LBrack, "`[` after map")?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack, "`]` after map key")?;
                Type::Map {
                    key,
                    val: self.parse_type()?,
                }
            }
            Tok::KwChan => {
                self.bump();
                let dir = if self.eat(Tok::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.parse_type()?,
                }
            }
            Tok::Arrow => {
                self.bump();
                self.expect(Tok::KwChan, "`chan` after `<-`")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.parse_type()?,
                }
            }
            Tok::KwFunc => {
                self.bump();
                Type::Func {
                    sig: self.signature()?,
                }
            }
            Tok::KwStruct => {
                self.bump();
                Type::Struct {
                    fields: self.struct_fields()?,
                }
            }
            Tok::KwInterface => {
                self.bump();
                Type::Interface {
                    elems: self.interface_elems()?,
                }
            }
            Tok::LParen => {
                self.bump();
                let typ = self.parse_type()?;
                self.expect(Tok::RParen, "`)` after type")?;
                Type::Paren { typ }
            }
            _ => return Err(self.unexpected("type")),
        };

        Ok(self.alloc_type(typ, start))
    }

    /// `TypeName [ TypeArgs ]` where `TypeName = identifier | QualifiedIdent`.
    fn named_type(&mut self) -> PResult<TypeId> {
        let start = self.peek().span;
        let first = self.ident()?;
        let (pkg, name) = if self.eat(Tok::Dot) {
            (Some(first.sym), self.ident()?.sym)
        } else {
            (None, first.sym)
        };

        let args = if self.at(Tok::LBrack) {
            self.bump();
            let mut args = Vec::new();
            while !self.at(Tok::RBrack) {
                args.push(self.parse_type()?);
                if !self.eat(Tok::Comma) {
                    break;
                }
            }
            self.expect(Tok::RBrack, "`]` after type arguments")?;
            self.arena.list_types(args)
        } else {
            ListRef::EMPTY
        };

        Ok(self.alloc_type(Type::Named { pkg, name, args }, start))
    }

    /// Array length after `[`, consuming the closing `]`. `[...]` keeps the
    /// ellipsis as its text.
    fn array_len(&mut self) -> PResult<Span> {
        let start = self.peek().span;
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return Err(self.unexpected("`]` after array length"));
            }
            match self.peek().tok {
                Tok::RBrack if depth == 0 => break,
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        let len = start.to(self.prev().span);
        self.bump();
        Ok(len)
    }

    fn struct_fields(&mut self) -> PResult<ListRef<FieldId>> {
        self.expect(Tok::LBrace, "`{` after struct")?;
        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("`}` after struct fields"));
            }
            if self.eat(Tok::Semi) {
                continue;
            }
            fields.push(self.struct_field()?);
            self.end_of_spec(Tok::RBrace, "`;` or `}` after field")?;
        }
        self.bump();
        Ok(self.arena.list_fields(fields))
    }

    fn struct_field(&mut self) -> PResult<FieldId> {
        let first = self.peek();
        let embedded = match first.tok {
            Tok::Star => true,
            Tok::Ident(_) => {
                let ends_field = |tok: Tok<'src>| {
                    matches!(tok, Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_))
                };
                let next = self.nth(1).tok;
                matches!(next, Tok::Dot)
                    || ends_field(next)
                    || (matches!(next, Tok::LBrack) && ends_field(self.after_brackets(1).tok))
                    || self.pos + 1 >= self.toks.len()
            }
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let (names, typ) = if embedded {
            (ListRef::EMPTY, self.parse_type()?)
        } else {
            let mut names = vec![self.ident()?];
            while self.eat(Tok::Comma) {
                names.push(self.ident()?);
            }
            let typ = self.parse_type()?;
            (self.arena.list_ident_names(names), typ)
        };

        let tag = match self.peek().tok {
            Tok::StringLit(_) | Tok::RawStringLit(_) if !self.at_eof() => Some(self.bump().span),
            _ => None,
        };

        let field = Field {
            names,
            ellipsis_pos: None,
            typ,
            tag,
            is_embed: embedded,
            doc: first.lead,
            comment: self.prev().trailing,
        };
        Ok(self.arena.fields.alloc(field, first.span.to(self.prev().span)))
    }

    fn interface_elems(&mut self) -> PResult<ListRef<InterfaceElem>> {
        self.expect(Tok::LBrace, "`{` after interface")?;
        let mut elems = Vec::new();
        while !self.at(Tok::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("`}` after interface elements"));
            }
            if self.eat(Tok::Semi) {
                continue;
            }
            elems.push(self.interface_elem()?);
            self.end_of_spec(Tok::RBrace, "`;` or `}` after interface element")?;
        }
        self.bump();
        Ok(self.arena.list_interface_elems(elems))
    }

    fn interface_elem(&mut self) -> PResult<InterfaceElem> {
        let doc = self.peek().lead;

        if self.is_ident(0) && matches!(self.nth(1).tok, Tok::LParen) {
            let name = self.ident()?;
            let sig = self.signature()?;
            return Ok(InterfaceElem::Method {
                name: name.sym,
                name_pos: name.pos,
                sig,
                doc,
                comment: self.prev().trailing,
            });
        }

        let mut terms = Vec::new();
        loop {
            let tilde = self.eat(Tok::Tilde);
            terms.push(TypeTerm {
                tilde,
                typ: self.parse_type()?,
            });
            if !self.eat(Tok::Pipe) {
                break;
            }
        }
        Ok(InterfaceElem::TypeElem {
            terms: self.arena.list_type_terms(terms),
            doc,
            comment: self.prev().trailing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (SourceFile, AstArena, Interner) {
        let mut arena = AstArena::new();
        let mut interner = Interner::new();
        let file = parse_file(src, &mut arena, &mut interner)
            .unwrap_or_else(|f| panic!("parse failed: {:#?}", f.diags));
        (file, arena, interner)
    }

    #[test]
    fn line_index_counts_from_one() {
        let lines = LineIndex::new("a\nb\n\nc");
        assert_eq!(lines.line(0), 1);
        assert_eq!(lines.line(2), 2);
        assert_eq!(lines.line(4), 3);
        assert_eq!(lines.line(5), 4);
    }

    #[test]
    fn doc_and_trailing_groups_attach_to_fields() {
        let (file, arena, _) = parse(
            "package p\n\ntype A struct {\n\t// one\n\t// two\n\tfoo string // tail\n\n\t// detached\n\n\tbar int\n}\n",
        );
        let spec = arena.type_specs[arena.type_specs_list(file.type_specs)[0]];
        let Type::Struct { fields } = arena.types[spec.typ] else {
            panic!("expected struct");
        };
        let fields = arena.fields_list(fields);
        let foo = arena.fields[fields[0]];
        let bar = arena.fields[fields[1]];

        let doc = arena.comment_groups[foo.doc.expect("foo doc")];
        assert_eq!(arena.comment_ids(doc.comments).len(), 2);
        assert!(foo.comment.is_some());
        assert!(bar.doc.is_none());
        // one, two / tail / detached
        assert_eq!(file.comments.len(), 3);
    }

    #[test]
    fn grouped_params_share_their_type() {
        let (file, arena, interner) = parse("package p\nfunc f(a, b int, c ...string) (int, error) {}\n");
        let func = arena.funcs[arena.funcs_list(file.funcs)[0]];
        let sig = arena.signatures[func.signature];
        let params = arena.fields_list(sig.params);
        assert_eq!(params.len(), 2);
        let ab = arena.fields[params[0]];
        let names: Vec<_> = arena
            .ident_names(ab.names)
            .iter()
            .map(|n| interner.resolve(n.sym))
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert!(arena.fields[params[1]].ellipsis_pos.is_some());
        assert_eq!(arena.fields_list(sig.results).len(), 2);
    }

    #[test]
    fn unterminated_struct_is_a_diagnostic() {
        let mut arena = AstArena::new();
        let mut interner = Interner::new();
        let err = parse_file("package p\ntype A struct {\n", &mut arena, &mut interner)
            .expect_err("must fail");
        assert_eq!(err.diags.len(), 1);
    }
}
