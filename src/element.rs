//! Element building: the extraction entry points.

use rayon::prelude::*;
use tracing::debug;
use unicode_ident::{is_xid_continue, is_xid_start};

use crate::ast::Type;
use crate::error::{ExtractError, ExtractResult};
use crate::extract::{decl_resolver, interface_methods, struct_attributes, struct_methods};
use crate::model::Element;
use crate::package::Package;

/// Extracts the struct or interface declared as `name` in `pkg`.
///
/// Fails with [`ExtractError::NotFound`] when `name` is not a type declared
/// in the package or is declared as something other than a struct or
/// interface literal (including aliases).
pub fn build_element(pkg: &Package, name: &str) -> ExtractResult<Element> {
    let not_found = || ExtractError::NotFound {
        name: name.to_owned(),
        package: pkg.name().to_owned(),
    };

    if !is_identifier(name) {
        debug!(name, "rejecting non-identifier");
        return Err(not_found());
    }
    let decl = pkg.lookup_type(name).ok_or_else(not_found)?;
    let spec = pkg.type_spec(decl);
    if spec.alias {
        debug!(name, "rejecting alias declaration");
        return Err(not_found());
    }

    let arena = pkg.arena();
    let typ = decl_resolver(pkg, decl).declared(spec.name);
    let element = match arena.types[arena.unparen(spec.typ)] {
        Type::Struct { fields } => Element {
            typ,
            attributes: Some(struct_attributes(pkg, decl, fields)?),
            methods: struct_methods(pkg, name)?,
        },
        Type::Interface { .. } => Element {
            typ,
            attributes: None,
            methods: interface_methods(pkg, decl)?,
        },
        _ => {
            debug!(name, "rejecting non-struct, non-interface declaration");
            return Err(not_found());
        }
    };

    debug!(
        name,
        attributes = element.attributes.as_ref().map_or(0, Vec::len),
        methods = element.methods.len(),
        "built element"
    );
    Ok(element)
}

/// Extracts several declarations as independent parallel tasks over the same
/// package. Results come back in the order of `names`.
pub fn build_elements<S>(pkg: &Package, names: &[S]) -> Vec<ExtractResult<Element>>
where
    S: AsRef<str> + Sync,
{
    names
        .par_iter()
        .map(|name| build_element(pkg, name.as_ref()))
        .collect()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || is_xid_start(c))
        && chars.all(is_xid_continue)
}
