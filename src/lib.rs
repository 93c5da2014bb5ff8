//! Type-model extraction for Go packages.
//!
//! - Lexer uses Logos and implements Go semicolon insertion, keeping comments
//!   as tokens.
//! - Parser is a declaration-level recursive descent into an arena AST, with
//!   comment groups attached as docs while the tree is built.
//! - Extraction turns one struct or interface declaration into an
//!   [`Element`]: its fields, its methods, their docs and the resolved names
//!   of every referenced type.
//!
//! ```no_run
//! use genz_model::{build_element, LoadConfig, Loader};
//!
//! let pkg = Loader::new(LoadConfig::default()).load_dir("./models")?;
//! let user = build_element(&pkg, "User")?;
//! println!("{}", user.typ.name);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod comments;
pub mod element;
pub mod error;
pub mod extract;
pub mod lexer;
pub mod loader;
pub mod model;
pub mod package;
pub mod parser;
mod parser_support;
pub mod resolve;
pub mod tags;

// Re-exports for convenience
pub use element::{build_element, build_elements};
pub use error::{ExtractError, ExtractResult, LoadError, ParseFailure};
pub use lexer::Lexer;
pub use loader::{LoadConfig, Loader};
pub use model::{Attribute, Element, Method, Tags, Type};
pub use package::Package;
pub use parser::parse_file;
pub use tags::parse_tags;
