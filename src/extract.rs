//! Field and method extraction for struct and interface declarations.

use smallvec::SmallVec;
use tracing::trace;

use crate::ast::{
    AstArena, FieldId, FuncDecl, InterfaceElem, ListRef, Symbol, Type, TypeId, TypeSpec,
};
use crate::comments::{comment_lines, CommentStyle};
use crate::error::{ExtractError, ExtractResult};
use crate::model::{Attribute, Method, Tags, Type as ModelType};
use crate::package::{FileId, Package, Scope, TypeDecl};
use crate::resolve::TypeNameResolver;
use crate::tags::parse_tags;

/// An identifier is exported when its first character is upper case.
#[inline]
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Resolver for types written inside a type declaration, with its type
/// parameters in scope.
pub fn decl_resolver(pkg: &Package, decl: TypeDecl) -> TypeNameResolver<'_> {
    let spec = pkg.type_spec(decl);
    let params = pkg.arena().ident_names(spec.type_params).iter().map(|n| n.sym);
    TypeNameResolver::new(pkg, decl.file).with_type_params(params)
}

/// One attribute per declared field name, in source order. Embedded fields
/// are named after their type.
pub fn struct_attributes(
    pkg: &Package,
    decl: TypeDecl,
    fields: ListRef<FieldId>,
) -> ExtractResult<Vec<Attribute>> {
    let arena = pkg.arena();
    let resolver = decl_resolver(pkg, decl);
    let mut attributes = Vec::with_capacity(fields.len() as usize);

    for &id in arena.fields_list(fields) {
        let field = arena.fields[id];
        let typ = resolver.resolve(field.typ)?;
        let comments = comment_lines(pkg, decl.file, field.doc, CommentStyle::Doc);
        let tags = match field.tag {
            Some(span) => parse_tags(pkg.source_text(decl.file, span))?,
            None => Tags::new(),
        };

        let names = arena.ident_names(field.names);
        if names.is_empty() {
            let name = embedded_name(arena, field.typ).map_or("", |sym| pkg.text(sym));
            trace!(field = name, "embedded field");
            attributes.push(Attribute {
                name: name.to_owned(),
                typ,
                comments,
                tags,
            });
            continue;
        }

        for name in names {
            attributes.push(Attribute {
                name: pkg.text(name.sym).to_owned(),
                typ: typ.clone(),
                comments: comments.clone(),
                tags: tags.clone(),
            });
        }
    }

    Ok(attributes)
}

/// Methods declared with `type_name` as receiver base type.
pub fn struct_methods(pkg: &Package, type_name: &str) -> ExtractResult<Vec<Method>> {
    let arena = pkg.arena();
    pkg.methods_of(type_name)
        .iter()
        .map(|m| receiver_method(pkg, m.file, &arena.funcs[m.func]))
        .collect()
}

fn receiver_method(pkg: &Package, file: FileId, func: &FuncDecl) -> ExtractResult<Method> {
    let arena = pkg.arena();
    let sig = arena.signatures[func.signature];
    let name = pkg.text(func.name);

    let (is_pointer_receiver, type_params) = match func.recv {
        Some(recv) => receiver_shape(arena, recv.typ),
        None => (false, SmallVec::new()),
    };
    let resolver = TypeNameResolver::new(pkg, file).with_type_params(type_params);

    trace!(method = name, is_pointer_receiver, "receiver method");
    Ok(Method {
        name: name.to_owned(),
        params: resolver.field_types(sig.params)?,
        returns: resolver.field_types(sig.results)?,
        is_pointer_receiver,
        is_exported: is_exported(name),
        comments: comment_lines(pkg, file, func.doc, CommentStyle::Doc),
    })
}

/// Pointer-ness of a receiver and the type parameter names it binds
/// (`(l *List[T])` binds `T`).
fn receiver_shape(arena: &AstArena, typ: TypeId) -> (bool, SmallVec<[Symbol; 4]>) {
    let mut typ = arena.unparen(typ);
    let pointer = match arena.types[typ] {
        Type::Pointer { elem } => {
            typ = arena.unparen(elem);
            true
        }
        _ => false,
    };

    let mut params = SmallVec::new();
    if let Type::Named { args, .. } = arena.types[typ] {
        for &arg in arena.types_list(args) {
            if let Type::Named { pkg: None, name, .. } = arena.types[arena.unparen(arg)] {
                params.push(name);
            }
        }
    }
    (pointer, params)
}

fn embedded_name(arena: &AstArena, typ: TypeId) -> Option<Symbol> {
    let mut typ = arena.unparen(typ);
    if let Type::Pointer { elem } = arena.types[typ] {
        typ = arena.unparen(elem);
    }
    match arena.types[typ] {
        Type::Named { name, .. } => Some(name),
        _ => None,
    }
}

// =============================================================================
// Interfaces
// =============================================================================

/// Methods of an interface declaration in source order, with embedded
/// interfaces expanded in place.
pub fn interface_methods(pkg: &Package, decl: TypeDecl) -> ExtractResult<Vec<Method>> {
    let mut expander = Expander {
        pkg,
        stack: SmallVec::new(),
        out: Vec::new(),
    };
    expander.declaration(decl)?;
    Ok(expander.out)
}

struct Expander<'p> {
    pkg: &'p Package,
    /// Interfaces currently being expanded, outermost first.
    stack: SmallVec<[Symbol; 8]>,
    out: Vec<Method>,
}

impl<'p> Expander<'p> {
    /// Expands a local declaration. `type B = A` and `type B A` follow `A`,
    /// so embedding `B` yields the methods of interface `A`.
    fn declaration(&mut self, decl: TypeDecl) -> ExtractResult<()> {
        let spec: &TypeSpec = self.pkg.type_spec(decl);
        let arena = self.pkg.arena();
        let resolver = decl_resolver(self.pkg, decl);

        self.stack.push(spec.name);
        match arena.types[arena.unparen(spec.typ)] {
            Type::Interface { elems } => self.elems(&resolver, elems)?,
            Type::Named { .. } => self.embedded(&resolver, spec.typ)?,
            _ => trace!(name = self.pkg.text(spec.name), "embedded type is not an interface"),
        }
        self.stack.pop();
        Ok(())
    }

    fn elems(&mut self, resolver: &TypeNameResolver<'p>, elems: ListRef<InterfaceElem>) -> ExtractResult<()> {
        let arena = self.pkg.arena();
        let file = resolver.file();

        for elem in arena.interface_elems(elems) {
            match *elem {
                InterfaceElem::Method { name, sig, doc, .. } => {
                    let sig = arena.signatures[sig];
                    let name = self.pkg.text(name);
                    self.out.push(Method {
                        name: name.to_owned(),
                        params: resolver.field_types(sig.params)?,
                        returns: resolver.field_types(sig.results)?,
                        is_pointer_receiver: false,
                        is_exported: is_exported(name),
                        comments: comment_lines(self.pkg, file, doc, CommentStyle::Raw),
                    });
                }
                InterfaceElem::TypeElem { terms, doc, .. } => {
                    let [term] = arena.type_terms(terms) else {
                        trace!("skipping union element");
                        continue;
                    };
                    if term.tilde {
                        trace!("skipping approximation element");
                        continue;
                    }

                    let first = self.out.len();
                    self.embedded(resolver, term.typ)?;
                    if let Some(method) = self.out.get_mut(first) {
                        let mut lines = comment_lines(self.pkg, file, doc, CommentStyle::Raw);
                        lines.append(&mut method.comments);
                        method.comments = lines;
                    }
                }
            }
        }
        Ok(())
    }

    fn embedded(&mut self, resolver: &TypeNameResolver<'p>, typ: TypeId) -> ExtractResult<()> {
        let arena = self.pkg.arena();
        let file = resolver.file();

        let (qualifier, name) = match arena.types[arena.unparen(typ)] {
            Type::Named { pkg, name, .. } => (pkg, name),
            Type::Interface { elems } => return self.elems(resolver, elems),
            _ => {
                trace!("skipping non-interface constraint element");
                return Ok(());
            }
        };
        let text = self.pkg.text(name);
        if qualifier.is_none() && resolver.is_type_param(name) {
            trace!(param = text, "skipping type parameter element");
            return Ok(());
        }

        match self.pkg.scope_of(file, qualifier, name) {
            Some(Scope::Local) => {
                if self.stack.contains(&name) {
                    let chain = self
                        .stack
                        .iter()
                        .chain(std::iter::once(&name))
                        .map(|&s| self.pkg.text(s))
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    return Err(ExtractError::EmbeddingCycle {
                        name: text.to_owned(),
                        chain,
                    });
                }
                match self.pkg.lookup_type(text) {
                    Some(decl) => self.declaration(decl),
                    None => Ok(()),
                }
            }
            Some(Scope::Universe) => {
                if text == "error" {
                    self.out.push(Method {
                        name: "Error".to_owned(),
                        params: Vec::new(),
                        returns: vec![ModelType::unqualified("string")],
                        is_pointer_receiver: false,
                        is_exported: true,
                        comments: Vec::new(),
                    });
                }
                Ok(())
            }
            Some(Scope::Imported { name: alias, .. }) => Err(ExtractError::UnresolvedType {
                name: format!("{alias}.{text}"),
                context: format!("interface embedded in {}", self.pkg.file_path(file).display()),
            }),
            None => Err(ExtractError::UnresolvedType {
                name: match qualifier {
                    Some(q) => format!("{}.{text}", self.pkg.text(q)),
                    None => text.to_owned(),
                },
                context: format!("interface embedded in {}", self.pkg.file_path(file).display()),
            }),
        }
    }
}
