//! Type-name resolution.
//!
//! Every type expression renders on two axes in a single walk: `Name`
//! qualifies identifiers declared in this package with the package name and
//! keeps import qualifiers, while `InternalName` drops every qualifier. Both
//! strings are built by the same recursion, so they only ever differ at
//! identifier leaves.

use smallvec::SmallVec;
use tracing::trace;

use crate::ast::{ChanDir, FieldId, InterfaceElem, ListRef, SignatureId, Symbol, Type, TypeId};
use crate::error::{ExtractError, ExtractResult};
use crate::model;
use crate::package::{FileId, Package, Scope};

/// Renders type expressions appearing in one file of a package.
#[derive(Debug, Clone)]
pub struct TypeNameResolver<'p> {
    pkg: &'p Package,
    file: FileId,
    /// Type parameters in scope; they render bare on both axes.
    type_params: SmallVec<[Symbol; 4]>,
}

/// The two output buffers.
#[derive(Default)]
struct Names {
    name: String,
    internal: String,
}

impl Names {
    #[inline]
    fn push(&mut self, s: &str) {
        self.name.push_str(s);
        self.internal.push_str(s);
    }
}

impl<'p> TypeNameResolver<'p> {
    pub fn new(pkg: &'p Package, file: FileId) -> Self {
        Self {
            pkg,
            file,
            type_params: SmallVec::new(),
        }
    }

    /// Adds type parameter names to the scope.
    pub fn with_type_params(mut self, names: impl IntoIterator<Item = Symbol>) -> Self {
        self.type_params.extend(names);
        self
    }

    #[inline]
    pub fn file(&self) -> FileId {
        self.file
    }

    #[inline]
    pub fn is_type_param(&self, name: Symbol) -> bool {
        self.type_params.contains(&name)
    }

    /// Resolves one type expression.
    pub fn resolve(&self, typ: TypeId) -> ExtractResult<model::Type> {
        let mut out = Names::default();
        self.render(typ, &mut out)?;
        trace!(name = %out.name, internal = %out.internal, "resolved type");
        Ok(model::Type::new(out.name, out.internal))
    }

    /// The declared type itself: `pkg.Name` / `Name`.
    pub fn declared(&self, name: Symbol) -> model::Type {
        let ident = self.pkg.text(name);
        model::Type::new(format!("{}.{ident}", self.pkg.name()), ident)
    }

    /// One type per declared name, one per unnamed entry. A variadic
    /// `...T` yields `[]T`.
    pub fn field_types(&self, fields: ListRef<FieldId>) -> ExtractResult<Vec<model::Type>> {
        let arena = self.pkg.arena();
        let mut out = Vec::new();
        for &id in arena.fields_list(fields) {
            let field = arena.fields[id];
            let mut typ = self.resolve(field.typ)?;
            if field.ellipsis_pos.is_some() {
                typ.name.insert_str(0, "[]");
                typ.internal_name.insert_str(0, "[]");
            }
            let count = field.names.len().max(1);
            out.extend(std::iter::repeat(typ).take(count as usize));
        }
        Ok(out)
    }

    fn render(&self, typ: TypeId, out: &mut Names) -> ExtractResult<()> {
        let arena = self.pkg.arena();

        match arena.types[typ] {
            Type::Named { pkg, name, args } => {
                self.render_ident(pkg, name, out)?;
                let args = arena.types_list(args);
                if !args.is_empty() {
                    out.push("[");
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(", ");
                        }
                        self.render(arg, out)?;
                    }
                    out.push("]");
                }
            }
            Type::Pointer { elem } => {
                out.push("*");
                self.render(elem, out)?;
            }
            Type::Array { len, elem } => {
                out.push("[");
                out.push(self.pkg.source_text(self.file, len));
                out.push("]");
                self.render(elem, out)?;
            }
            Type::Slice { elem } => {
                out.push("[]");
                self.render(elem, out)?;
            }
            Type::Map { key, val } => {
                out.push("map[");
                self.render(key, out)?;
                out.push("]");
                self.render(val, out)?;
            }
            Type::Chan { dir, elem } => {
                out.push(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.render(elem, out)?;
            }
            Type::Struct { fields } => {
                out.push("struct{");
                let mut first = true;
                for &id in arena.fields_list(fields) {
                    let field = arena.fields[id];
                    let names = arena.ident_names(field.names);
                    if names.is_empty() {
                        if !std::mem::take(&mut first) {
                            out.push("; ");
                        }
                        self.render(field.typ, out)?;
                        continue;
                    }
                    for name in names {
                        if !std::mem::take(&mut first) {
                            out.push("; ");
                        }
                        out.push(self.pkg.text(name.sym));
                        out.push(" ");
                        self.render(field.typ, out)?;
                    }
                }
                out.push("}");
            }
            Type::Interface { elems } => {
                out.push("interface{");
                for (i, elem) in arena.interface_elems(elems).iter().enumerate() {
                    if i > 0 {
                        out.push("; ");
                    }
                    match *elem {
                        InterfaceElem::Method { name, sig, .. } => {
                            out.push(self.pkg.text(name));
                            self.render_signature(sig, out)?;
                        }
                        InterfaceElem::TypeElem { terms, .. } => {
                            for (j, term) in arena.type_terms(terms).iter().enumerate() {
                                if j > 0 {
                                    out.push(" | ");
                                }
                                if term.tilde {
                                    out.push("~");
                                }
                                self.render(term.typ, out)?;
                            }
                        }
                    }
                }
                out.push("}");
            }
            Type::Func { sig } => {
                out.push("func");
                self.render_signature(sig, out)?;
            }
            Type::Paren { typ } => self.render(typ, out)?,
        }

        Ok(())
    }

    fn render_ident(&self, qualifier: Option<Symbol>, ident: Symbol, out: &mut Names) -> ExtractResult<()> {
        let text = self.pkg.text(ident);

        if qualifier.is_none() && self.is_type_param(ident) {
            out.push(text);
            return Ok(());
        }

        match self.pkg.scope_of(self.file, qualifier, ident) {
            Some(Scope::Universe) => out.push(text),
            Some(Scope::Local) => {
                out.name.push_str(self.pkg.name());
                out.name.push('.');
                out.push(text);
            }
            Some(Scope::Imported { name, .. }) => {
                out.name.push_str(&name);
                out.name.push('.');
                out.push(text);
            }
            None => {
                let name = match qualifier {
                    Some(q) => format!("{}.{text}", self.pkg.text(q)),
                    None => text.to_owned(),
                };
                return Err(ExtractError::UnresolvedType {
                    name,
                    context: self.pkg.file_path(self.file).display().to_string(),
                });
            }
        }
        Ok(())
    }

    /// `(P1, P2) R` or `(P) (R1, R2)`, without the `func` keyword.
    fn render_signature(&self, sig: SignatureId, out: &mut Names) -> ExtractResult<()> {
        let arena = self.pkg.arena();
        let sig = arena.signatures[sig];

        out.push("(");
        self.render_field_list(sig.params, out)?;
        out.push(")");

        let results = arena.fields_list(sig.results);
        let single = results.len() == 1 && arena.fields[results[0]].names.len() <= 1;
        if single {
            out.push(" ");
            self.render(arena.fields[results[0]].typ, out)?;
        } else if !results.is_empty() {
            out.push(" (");
            self.render_field_list(sig.results, out)?;
            out.push(")");
        }
        Ok(())
    }

    fn render_field_list(&self, fields: ListRef<FieldId>, out: &mut Names) -> ExtractResult<()> {
        let arena = self.pkg.arena();
        let mut first = true;
        for &id in arena.fields_list(fields) {
            let field = arena.fields[id];
            for _ in 0..field.names.len().max(1) {
                if !std::mem::take(&mut first) {
                    out.push(", ");
                }
                if field.ellipsis_pos.is_some() {
                    out.push("...");
                }
                self.render(field.typ, out)?;
            }
        }
        Ok(())
    }
}
