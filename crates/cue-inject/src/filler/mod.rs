//! Value sources
//!
//! A [Filler] resolves the key of a directive to a value. Fillers are registered under their
//! [Filler::name], which is what `@inject(<name>,...)` refers to.
pub mod env;
pub mod tfstate;

pub use env::EnvFiller;
pub use tfstate::TfStateFiller;

use cuelite::Value;

/// The document being injected into
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct Document<'a> {
    /// Where the document was read from. Relative references are resolved against its directory.
    pub path: &'a std::path::Path,
    /// The tree as filled so far
    pub tree: &'a Value,
}

pub trait Filler {
    /// Unique identifier
    fn name(&self) -> &str;

    /// Called before the first lookup of every pass
    fn begin_pass(&mut self) {}

    /// Look up `key`
    ///
    /// `field` is the constraint of the field the value will be written into.
    fn resolve(
        &mut self,
        document: &Document<'_>,
        key: &str,
        field: &Value,
    ) -> Result<Value, FillError>;
}

#[derive(thiserror::Error, Debug)]
pub enum FillError {
    #[error("value not found: {0}")]
    ValueNotFound(String),
    #[error("tfstate-lookup is not initialized")]
    NotInitialized,
    #[error("cannot resolve tfstate URL {url:?}: {reason}")]
    InvalidStateUrl { url: String, reason: String },
    #[error("cannot read tfstate({url})")]
    ReadState {
        url: String,
        #[source]
        source: ::tfstate::StateError,
    },
    #[error("tfstate value ({key}) not found")]
    Lookup {
        key: String,
        #[source]
        source: ::tfstate::LookupError,
    },
    #[error("cannot write value")]
    Write(#[from] cuelite::FillError),
}
