use crate::ast::{self, ListRef, Span};

/// One comma-separated entry of a parameter list before grouping.
///
/// `typ` is `None` for a lone identifier, which is either a parameter name
/// waiting for the type of a later entry (`a, b int`) or, if no typed entry
/// follows, a type itself (`int, string`).
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: Vec<ast::IdentName>,
    pub ellipsis_pos: Option<Span>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

pub fn resolve_param_list(
    arena: &mut ast::AstArena,
    params: Vec<ParamDecl>,
) -> Vec<ast::FieldId> {
    let mut out = Vec::new();

    // Without a single `name Type` entry every lone identifier is a type.
    let named = params.iter().any(|p| p.typ.is_some() && !p.names.is_empty());
    if !named {
        for param in params {
            let typ = match param.typ {
                Some(typ) => typ,
                None => match param.names.first() {
                    Some(&name) => named_type_from_ident(arena, name),
                    None => continue,
                },
            };
            out.push(
                arena
                    .fields
                    .alloc(param_field(ListRef::EMPTY, param.ellipsis_pos, typ), param.span),
            );
        }
        return out;
    }

    let mut pending_names: Vec<ast::IdentName> = Vec::new();
    let mut pending_start: Option<u32> = None;

    for param in params {
        if let Some(typ) = param.typ {
            let mut names = std::mem::take(&mut pending_names);
            names.extend(param.names);

            let names_ref = if names.is_empty() {
                ListRef::EMPTY
            } else {
                arena.list_ident_names(names)
            };
            let start = pending_start.take().unwrap_or(param.span.start);
            let span = Span {
                start,
                end: param.span.end,
            };
            out.push(arena.fields.alloc(param_field(names_ref, param.ellipsis_pos, typ), span));
        } else {
            if pending_names.is_empty() {
                pending_start = Some(param.span.start);
            }
            pending_names.extend(param.names);
        }
    }

    // Only reachable for malformed lists such as `(a int, b)`.
    for name in pending_names {
        let typ = named_type_from_ident(arena, name);
        out.push(
            arena
                .fields
                .alloc(param_field(ListRef::EMPTY, None, typ), name.pos),
        );
    }

    out
}

fn param_field(
    names: ListRef<ast::IdentName>,
    ellipsis_pos: Option<Span>,
    typ: ast::TypeId,
) -> ast::Field {
    ast::Field {
        names,
        ellipsis_pos,
        typ,
        tag: None,
        is_embed: false,
        doc: None,
        comment: None,
    }
}

fn named_type_from_ident(arena: &mut ast::AstArena, name: ast::IdentName) -> ast::TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name: name.sym,
            args: ListRef::EMPTY,
        },
        name.pos,
    )
}
