//! Terraform state lookups
//!
//! The state file is named by a declaration attribute at the root of the document:
//!
//! ```cue
//! @inject(tfstate,stateURL="./terraform/terraform.tfstate")
//!
//! name: string @inject(tfstate,name=output.user.name)
//! ```
//!
//! The path of the locator, bare or as a `file` URL, is always taken relative to the directory
//! of the document, leading `/` included. Other schemes are not supported.
use super::{Document, FillError, Filler};
use crate::directive::ATTRIBUTE_KEY;
use ::tfstate::TfState;
use cuelite::Value;
use std::path::{Component, Path, PathBuf};

pub const FILLER_NAME: &str = "tfstate";
const STATE_URL_ARG: &str = "stateURL";

#[derive(Debug, Default)]
enum StateSource {
    /// Not looked for yet
    #[default]
    Pending,
    Ready(TfState),
    /// Looked for and failed. Retried on the next pass.
    Unavailable,
}

/// Loads the state on the first lookup and keeps it for the lifetime of the filler
///
/// A failed load is reported once and the remaining lookups of the pass fail with
/// [FillError::NotInitialized].
#[derive(Debug, Default)]
pub struct TfStateFiller {
    source: StateSource,
}

impl TfStateFiller {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&mut self, document: &Document<'_>) -> Result<&TfState, FillError> {
        if let StateSource::Pending = self.source {
            self.source = StateSource::Unavailable;

            let url = state_url(document.tree).ok_or(FillError::NotInitialized)?;
            let path = resolve_url(document.path, &url)?;
            tracing::debug!(%url, path = %path.display(), "loading tfstate");
            let state =
                TfState::read_file(&path).map_err(|source| FillError::ReadState { url, source })?;
            self.source = StateSource::Ready(state);
        }

        match &self.source {
            StateSource::Ready(state) => Ok(state),
            _ => Err(FillError::NotInitialized),
        }
    }
}

impl Filler for TfStateFiller {
    fn name(&self) -> &str {
        FILLER_NAME
    }

    fn begin_pass(&mut self) {
        if let StateSource::Unavailable = self.source {
            self.source = StateSource::Pending;
        }
    }

    fn resolve(
        &mut self,
        document: &Document<'_>,
        key: &str,
        _field: &Value,
    ) -> Result<Value, FillError> {
        let object = self
            .state(document)?
            .lookup(key)
            .map_err(|source| FillError::Lookup {
                key: key.to_string(),
                source,
            })?;
        Ok(object.value.into())
    }
}

/// `stateURL` of the first root attribute of the form `@inject(tfstate,stateURL=...)`
fn state_url(tree: &Value) -> Option<String> {
    tree.as_struct()?
        .attributes(ATTRIBUTE_KEY)
        .filter_map(|attr| attr.args().ok())
        .find_map(|args| {
            let mut named = false;
            for arg in args {
                if arg.key == FILLER_NAME && arg.value.is_empty() {
                    named = true;
                } else if named && arg.key == STATE_URL_ARG {
                    return Some(arg.value);
                }
            }
            None
        })
}

fn resolve_url(document: &Path, raw: &str) -> Result<PathBuf, FillError> {
    let invalid = |reason: String| FillError::InvalidStateUrl {
        url: raw.to_string(),
        reason,
    };

    let locator = match url::Url::parse(raw) {
        Ok(url) if url.scheme() == "file" => percent_encoding::percent_decode_str(url.path())
            .decode_utf8()
            .map_err(|err| invalid(err.to_string()))?
            .into_owned(),
        Ok(url) => return Err(invalid(format!("unsupported scheme {}", url.scheme()))),
        Err(url::ParseError::RelativeUrlWithoutBase) => raw.to_string(),
        Err(err) => return Err(invalid(err.to_string())),
    };

    let mut path = document.parent().unwrap_or(Path::new("")).to_path_buf();
    path.extend(
        Path::new(&locator)
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_))),
    );
    Ok(normalize(&path))
}

/// Lexically remove `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}
