//! # cuelite - a small subset of the CUE configuration language
//!
//! `cuelite` reads CUE documents that consist of data and constraints, without references or
//! comprehensions, and evaluates them into a [Value] tree.
//!
//! ```cue
//! // comments start with two slashes
//! @inject(tfstate,stateURL="./terraform.tfstate")
//!
//! name: string @inject(env,name=USER_NAME)
//! port: int & >0 | *8080
//! _internal: {
//!     region: "eu-west-1"
//! }
//! ```
//!
//! ### Pipeline
//!
//! - [parse_str] / [parse_file] turn source text into a syntax tree ([File])
//! - [build] evaluates the syntax tree into a [Value]. Conflicting values do not fail the build,
//!   they become [Value::Bottom] where the conflict happened; [Value::validate] reports them.
//! - [Value::fill_path] unifies a value into the tree and returns the new tree
//! - [format()] renders a value as a document again, attributes included
//! - [Value::export] turns a complete value into plain data ([Concrete]) for serialization
pub mod attribute;
pub mod error;
pub mod eval;
pub mod export;
pub mod format;
mod lexer;
pub mod parser;
pub mod path;
mod unify;
pub mod value;

pub use attribute::{Arg, Attribute};
pub use error::{AttributeError, ExportError, FillError, LoadError, ParseError, ValidationError};
pub use eval::build;
pub use export::Concrete;
pub use format::format;
pub use parser::{parse_str, Decl, Expr, File};
pub use path::{Path, Selector};
pub use value::{Alternative, Bound, BoundOp, Field, Kind, Label, LabelKind, Struct, Value};

/// Read and parse a document
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<File, LoadError> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse_str(&source)?)
}

/// Parse and build in one step
pub fn compile_str(source: &str) -> Result<Value, ParseError> {
    parse_str(source).map(|file| build(&file))
}
