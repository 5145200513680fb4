use super::{Document, FillError, Filler};
use cuelite::Value;
use std::collections::HashMap;

pub const FILLER_NAME: &str = "env";

/// Environment variables, captured when the filler is created
///
/// Changes to the process environment after construction are not seen.
#[derive(Debug, Clone, Default)]
pub struct EnvFiller {
    vars: HashMap<String, String>,
}

impl EnvFiller {
    pub fn all() -> Self {
        Self::matching(|_| true)
    }

    /// Only variables whose name satisfies `predicate`
    pub fn matching(predicate: impl Fn(&str) -> bool) -> Self {
        let vars = std::env::vars_os().filter_map(|(name, value)| {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (name, _) => {
                    tracing::debug!(?name, "skipping non-utf-8 environment variable");
                    None
                }
            }
        });
        Self::from_vars(vars, predicate)
    }

    pub fn from_vars<K, V>(
        vars: impl IntoIterator<Item = (K, V)>,
        predicate: impl Fn(&str) -> bool,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .filter(|(name, _): &(String, String)| predicate(name.as_str()))
            .collect();
        Self { vars }
    }
}

impl Filler for EnvFiller {
    fn name(&self) -> &str {
        FILLER_NAME
    }

    fn resolve(
        &mut self,
        _document: &Document<'_>,
        key: &str,
        _field: &Value,
    ) -> Result<Value, FillError> {
        self.vars
            .get(key)
            .map(|value| Value::from(value.as_str()))
            .ok_or_else(|| FillError::ValueNotFound(key.to_string()))
    }
}
