use crate::coerce::coerce;
use crate::directive;
use crate::filler::{Document, Filler};
use crate::walk::{walk, Leaf};
use cuelite::{LoadError, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::MakeWriter;

#[derive(thiserror::Error, Debug)]
pub enum InjectError {
    #[error("cannot parse file({})", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

/// Fills the fields of a document from a set of [Filler]s
///
/// Fillers keep their state between passes: once a [crate::TfStateFiller] has read its state file
/// it is not read again. A state file that could not be read is looked for again on the next pass.
pub struct Injector {
    fillers: HashMap<String, Box<dyn Filler>>,
    log_sink: Option<tracing::Dispatch>,
}

#[derive(Default)]
pub struct InjectorBuilder {
    fillers: HashMap<String, Box<dyn Filler>>,
    log_sink: Option<tracing::Dispatch>,
}

impl InjectorBuilder {
    /// Register a filler. A filler with the same name replaces the earlier one.
    pub fn filler(mut self, filler: impl Filler + 'static) -> Self {
        self.fillers.insert(filler.name().to_string(), Box::new(filler));
        self
    }

    /// Send diagnostics of each pass to `writer` instead of the global subscriber
    pub fn log_sink<W>(mut self, writer: W, level: tracing::Level) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_max_level(level)
            .with_ansi(false)
            .finish();
        self.log_sink = Some(tracing::Dispatch::new(subscriber));
        self
    }

    pub fn build(self) -> Injector {
        Injector {
            fillers: self.fillers,
            log_sink: self.log_sink,
        }
    }
}

impl Injector {
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::default()
    }

    /// An injector that only reads environment variables accepted by `predicate`
    #[deprecated(note = "use `Injector::builder().filler(EnvFiller::matching(predicate))`")]
    pub fn environment(predicate: impl Fn(&str) -> bool) -> Self {
        Self::builder()
            .filler(crate::EnvFiller::matching(predicate))
            .build()
    }

    /// Read the document at `path` and fill it
    ///
    /// Only a document that cannot be read or parsed fails the pass. Fields that cannot be filled
    /// are logged and left as they are.
    pub fn inject(&mut self, path: impl AsRef<Path>) -> Result<Value, InjectError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| InjectError::Parse {
            path: path.to_path_buf(),
            source: err.into(),
        })?;
        self.inject_source(path, &source)
    }

    /// Fill a document that is already in memory
    ///
    /// `path` is used for resolving relative references and for diagnostics.
    pub fn inject_source(&mut self, path: &Path, source: &str) -> Result<Value, InjectError> {
        match self.log_sink.clone() {
            Some(dispatch) => {
                tracing::dispatcher::with_default(&dispatch, || self.pass(path, source))
            }
            None => self.pass(path, source),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %path.display()))]
    fn pass(&mut self, path: &Path, source: &str) -> Result<Value, InjectError> {
        let file = cuelite::parse_str(source).map_err(|err| InjectError::Parse {
            path: path.to_path_buf(),
            source: err.into(),
        })?;

        for filler in self.fillers.values_mut() {
            filler.begin_pass();
        }

        // the walk follows the shape as parsed while fills replace `tree`
        let shape = cuelite::build(&file);
        let mut tree = shape.clone();
        walk(&shape, &mut |leaf: Leaf<'_>| {
            fill_leaf(&mut self.fillers, path, &mut tree, leaf)
        });

        Ok(tree)
    }
}

fn fill_leaf(
    fillers: &mut HashMap<String, Box<dyn Filler>>,
    path: &Path,
    tree: &mut Value,
    leaf: Leaf<'_>,
) {
    let directive = match directive::parse(leaf.attrs) {
        Ok(directive) => directive,
        Err(err) => {
            let err: &(dyn std::error::Error + 'static) = &err;
            tracing::info!(path = %leaf.path, error = err, "invalid attribute");
            return;
        }
    };

    let Some(filler) = fillers.get_mut(&directive.filler) else {
        tracing::warn!(path = %leaf.path, kind = %directive.filler, "not supported kind");
        return;
    };

    let filled = filler
        .resolve(&Document::new(path, tree), &directive.key, leaf.value)
        .and_then(|value| Ok(tree.fill_path(&leaf.path, coerce(leaf.value, value))?));

    match filled {
        Ok(filled) => {
            tracing::info!(
                path = %leaf.path,
                kind = %directive.filler,
                key = %directive.key,
                "filled value"
            );
            *tree = filled;
        }
        Err(err) => {
            let err: &(dyn std::error::Error + 'static) = &err;
            tracing::warn!(
                path = %leaf.path,
                kind = %directive.filler,
                key = %directive.key,
                error = err,
                "failed to fill value"
            );
        }
    }
}
