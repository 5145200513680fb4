//! # tfstate - Terraform state lookups
//!
//! Reads a Terraform state document (format version 4) and resolves addresses against it:
//!
//! - `output.NAME` and anything below it, e.g. `output.user.name`
//! - resource instance attributes: `[module.M[idx].]*[data.]TYPE.NAME[idx].ATTRIBUTE...`
//!
//! Terraform does not tell integers and floats apart. Every number returned by [TfState::lookup]
//! is a float (`17` comes back as `17.0`).
mod query;

use query::Segment;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SUPPORTED_VERSION: u64 = 4;

#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid state document")]
    Json(#[from] serde_json::Error),
    #[error("unsupported state version {0}, only version 4 is supported")]
    UnsupportedVersion(u64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid address {0:?}")]
    InvalidQuery(String),
}

/// Result of a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TfState {
    pub version: u64,
    #[serde(default)]
    pub terraform_version: Option<String>,
    #[serde(default)]
    outputs: HashMap<String, Output>,
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
struct Output {
    value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct Resource {
    #[serde(default)]
    module: Option<String>,
    mode: Mode,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    Managed,
    Data,
}

#[derive(Debug, Clone, Deserialize)]
struct Instance {
    #[serde(default)]
    index_key: Option<serde_json::Value>,
    #[serde(default)]
    attributes: serde_json::Value,
}

impl TfState {
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "reading state");

        let bytes = std::fs::read(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, StateError> {
        let state: TfState = serde_json::from_slice(bytes)?;
        if state.version != SUPPORTED_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    pub fn lookup(&self, query: &str) -> Result<Object, LookupError> {
        let not_found = || LookupError::NotFound(query.to_string());
        let segments = query::parse(query)?;

        let (value, rest) = match segments.as_slice() {
            [Segment::Name(first), Segment::Name(output), rest @ ..] if first == "output" => {
                let output = self.outputs.get(output).ok_or_else(not_found)?;
                (&output.value, rest)
            }
            [Segment::Name(first)] if first == "output" => {
                return Err(LookupError::InvalidQuery(query.to_string()))
            }
            _ => self.lookup_resource(query, &segments)?,
        };

        let value = rest
            .iter()
            .try_fold(value, |value, segment| match (value, segment) {
                (
                    serde_json::Value::Object(object),
                    Segment::Name(key) | Segment::Key(key),
                ) => object.get(key),
                (serde_json::Value::Array(items), Segment::Index(index)) => items.get(*index),
                _ => None,
            })
            .ok_or_else(not_found)?;

        Ok(Object {
            value: normalize_numbers(value.clone()),
        })
    }

    /// Finds the instance a query addresses and returns its attributes plus the unconsumed segments
    fn lookup_resource<'a, 'q>(
        &'a self,
        query: &str,
        segments: &'q [Segment],
    ) -> Result<(&'a serde_json::Value, &'q [Segment]), LookupError> {
        let not_found = || LookupError::NotFound(query.to_string());
        let invalid = || LookupError::InvalidQuery(query.to_string());
        let mut rest = segments;

        let mut module = Vec::new();
        while let [Segment::Name(keyword), Segment::Name(name), tail @ ..] = rest {
            if keyword != "module" {
                break;
            }
            let mut address = format!("module.{name}");
            rest = tail;
            if let [index @ (Segment::Index(_) | Segment::Key(_)), tail @ ..] = rest {
                address.push_str(&index.to_string());
                rest = tail;
            }
            module.push(address);
        }
        let module = module.join(".");

        let mode = match rest {
            [Segment::Name(keyword), tail @ ..] if keyword == "data" => {
                rest = tail;
                Mode::Data
            }
            _ => Mode::Managed,
        };

        let [Segment::Name(kind), Segment::Name(name), tail @ ..] = rest else {
            return Err(invalid());
        };
        rest = tail;

        let index_key = match rest {
            [Segment::Index(index), tail @ ..] => {
                rest = tail;
                Some(serde_json::Value::from(*index))
            }
            [Segment::Key(key), tail @ ..] => {
                rest = tail;
                Some(serde_json::Value::from(key.as_str()))
            }
            _ => None,
        };

        let resource = self
            .resources
            .iter()
            .find(|resource| {
                resource.mode == mode
                    && &resource.kind == kind
                    && &resource.name == name
                    && resource.module.as_deref().unwrap_or_default() == module
            })
            .ok_or_else(not_found)?;

        let instance = resource
            .instances
            .iter()
            .find(|instance| instance.index_key == index_key)
            .ok_or_else(not_found)?;

        Ok((&instance.attributes, rest))
    }
}

/// Turns every number into a float
fn normalize_numbers(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Json::Number(number) => number
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(Json::Number(number), Json::Number),
        Json::Array(items) => Json::Array(items.into_iter().map(normalize_numbers).collect()),
        Json::Object(object) => Json::Object(
            object
                .into_iter()
                .map(|(key, value)| (key, normalize_numbers(value)))
                .collect(),
        ),
        other => other,
    }
}
