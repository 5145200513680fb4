//! `@key(body)` annotations
//!
//! The body is stored verbatim so documents keep their attributes byte-for-byte when formatted.
//! [Attribute::args] interprets the body the way CUE tooling conventionally does: a comma separated
//! list where each entry is either `key=value` or a bare `key`.
use crate::error::AttributeError;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Attribute {
    key: String,
    body: String,
}

/// One entry of an attribute body. Bare entries have an empty `value`.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Arg {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The raw text between the parentheses
    pub fn contents(&self) -> &str {
        &self.body
    }

    pub fn args(&self) -> Result<Vec<Arg>, AttributeError> {
        let unterminated = || AttributeError::UnterminatedString {
            key: self.key.clone(),
            body: self.body.clone(),
        };

        let mut args = Vec::new();
        for entry in split_top_level(&self.body, ',').ok_or_else(unterminated)? {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let arg = match split_top_level(entry, '=').ok_or_else(unterminated)?.as_slice() {
                [bare] => Arg::new(unquote(bare.trim()), String::new()),
                [key, ..] => {
                    let value = entry[key.len() + 1..].trim();
                    Arg::new(key.trim().to_string(), unquote(value))
                }
                [] => continue,
            };
            args.push(arg);
        }

        Ok(args)
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}({})", self.key, self.body)
    }
}

/// Split on `separator` outside of double quoted strings.
///
/// Returns `None` when a string is left open.
fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if quoted {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => quoted = false,
                _ => {}
            }
            continue;
        }

        if c == '"' {
            quoted = true;
        } else if c == separator {
            pieces.push(&text[start..index]);
            start = index + c.len_utf8();
        }
    }

    if quoted {
        return None;
    }
    pieces.push(&text[start..]);
    Some(pieces)
}

fn unquote(text: &str) -> String {
    let Some(inner) = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return text.to_string();
    };

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(body: &str) -> Vec<(String, String)> {
        Attribute::new("inject".into(), body.into())
            .args()
            .expect("must parse")
            .into_iter()
            .map(|arg| (arg.key, arg.value))
            .collect()
    }

    #[test]
    fn bare_and_keyed() {
        assert_eq!(
            args("env,name=X_NAME"),
            vec![
                ("env".to_string(), String::new()),
                ("name".to_string(), "X_NAME".to_string())
            ]
        );
    }

    #[test]
    fn whitespace_and_quotes() {
        assert_eq!(
            args(r#" tfstate , stateURL = "./a,b=c.tfstate" "#),
            vec![
                ("tfstate".to_string(), String::new()),
                ("stateURL".to_string(), "./a,b=c.tfstate".to_string())
            ]
        );
    }

    #[test]
    fn value_may_contain_equals_sign() {
        assert_eq!(
            args("name=a=b"),
            vec![("name".to_string(), "a=b".to_string())]
        );
    }

    #[test]
    fn empty_entries_are_skipped() {
        assert_eq!(args(""), vec![]);
        assert_eq!(args("env,"), vec![("env".to_string(), String::new())]);
    }

    #[test]
    fn unterminated_string() {
        let attr = Attribute::new("inject".into(), r#"env,name="X"#.into());
        assert!(matches!(
            attr.args(),
            Err(AttributeError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn display_is_verbatim() {
        let attr = Attribute::new("inject".into(), "env, name=X".into());
        assert_eq!(attr.to_string(), "@inject(env, name=X)");
        assert_eq!(attr.contents(), "env, name=X");
    }
}
