//! Extraction output handed to template consumers.
//!
//! Field names serialize in PascalCase (`InternalName`, `IsPointerReceiver`)
//! so templates can address them the same way regardless of the producer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Parsed field tags, in source order.
pub type Tags = IndexMap<String, String>;

/// A type reference rendered on two axes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Type {
    /// Package-qualified rendering (`main.A`, `[]uuid.UUID`).
    pub name: String,
    /// Rendering with every qualifier dropped (`A`, `[]UUID`).
    pub internal_name: String,
}

impl Type {
    pub fn new(name: impl Into<String>, internal_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal_name: internal_name.into(),
        }
    }

    /// A type whose two renderings agree, such as `string`.
    pub fn unqualified(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            internal_name: name.clone(),
            name,
        }
    }
}

/// One struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "Type")]
    pub typ: Type,
    pub comments: Vec<String>,
    pub tags: Tags,
}

/// A method of a struct, or a member of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Method {
    pub name: String,
    pub params: Vec<Type>,
    pub returns: Vec<Type>,
    pub is_pointer_receiver: bool,
    pub is_exported: bool,
    pub comments: Vec<String>,
}

/// One extracted declaration.
///
/// `attributes` is `Some` for structs (possibly empty) and `None` for
/// interfaces; `methods` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Element {
    #[serde(rename = "Type")]
    pub typ: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
    pub methods: Vec<Method>,
}

impl Element {
    #[inline]
    pub fn is_struct(&self) -> bool {
        self.attributes.is_some()
    }
}
