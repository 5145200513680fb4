//! `@inject(...)` attributes
//!
//! ```cue
//! name: string @inject(env,name=USER_NAME)
//! age:  int    @inject(tfstate,name=output.user.age)
//! home: string @injectenv(HOME) // deprecated, always the `env` filler
//! ```
use crate::filler::env::FILLER_NAME as ENV_FILLER;
use cuelite::{Attribute, AttributeError};

pub const ATTRIBUTE_KEY: &str = "inject";
pub const DEPRECATED_ATTRIBUTE_KEY: &str = "injectenv";

/// Which filler to ask for which key
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Directive {
    pub filler: String,
    pub key: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("no @inject attribute")]
    Absent,
    #[error("malformed attribute")]
    Malformed(#[from] AttributeError),
    #[error("no filler named in {0}")]
    MissingFiller(String),
    #[error("no name= argument in {0}")]
    MissingKey(String),
}

/// Find the directive among the attributes of a field
///
/// `@injectenv(KEY)` is checked first. When it is absent (or empty) the first `@inject(...)` is
/// used: its first bare argument names the filler, `name=` supplies the key and any other argument
/// is ignored.
pub fn parse(attrs: &[Attribute]) -> Result<Directive, DirectiveError> {
    if let Some(deprecated) = attrs
        .iter()
        .find(|attr| attr.key() == DEPRECATED_ATTRIBUTE_KEY)
    {
        let key = deprecated.contents().trim();
        if !key.is_empty() {
            return Ok(Directive::new(ENV_FILLER.to_string(), key.to_string()));
        }
    }

    let attr = attrs
        .iter()
        .find(|attr| attr.key() == ATTRIBUTE_KEY)
        .ok_or(DirectiveError::Absent)?;

    let mut filler = None;
    let mut key = None;
    for arg in attr.args()? {
        if arg.value.is_empty() {
            filler.get_or_insert(arg.key);
        } else if arg.key == "name" {
            key = Some(arg.value);
        }
    }

    let filler = filler.ok_or_else(|| DirectiveError::MissingFiller(attr.to_string()))?;
    let key = key.ok_or_else(|| DirectiveError::MissingKey(attr.to_string()))?;
    Ok(Directive::new(filler, key))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(key: &str, body: &str) -> Attribute {
        Attribute::new(key.to_string(), body.to_string())
    }

    fn directive(filler: &str, key: &str) -> Directive {
        Directive::new(filler.to_string(), key.to_string())
    }

    #[test]
    fn current_form() {
        assert_eq!(
            parse(&[attr("inject", "env,name=X_NAME")]),
            Ok(directive("env", "X_NAME"))
        );
        assert_eq!(
            parse(&[attr("inject", "name=output.user.age, tfstate")]),
            Ok(directive("tfstate", "output.user.age"))
        );
        assert_eq!(
            parse(&[attr("inject", "env,name=\"X,Y\",unknown=1")]),
            Ok(directive("env", "X,Y"))
        );
    }

    #[test]
    fn deprecated_form() {
        assert_eq!(
            parse(&[attr("injectenv", "X_NAME")]),
            Ok(directive("env", "X_NAME"))
        );
    }

    #[test]
    fn deprecated_form_wins() {
        assert_eq!(
            parse(&[
                attr("inject", "tfstate,name=output.name"),
                attr("injectenv", "X_NAME")
            ]),
            Ok(directive("env", "X_NAME"))
        );
        assert_eq!(
            parse(&[attr("injectenv", " "), attr("inject", "env,name=X_NAME")]),
            Ok(directive("env", "X_NAME"))
        );
    }

    #[test]
    fn first_bare_argument_names_the_filler() {
        assert_eq!(
            parse(&[attr("inject", "env,tfstate,name=X")]),
            Ok(directive("env", "X"))
        );
    }

    #[test]
    fn invalid() {
        assert_eq!(parse(&[]), Err(DirectiveError::Absent));
        assert_eq!(parse(&[attr("other", "env,name=X")]), Err(DirectiveError::Absent));
        assert_eq!(
            parse(&[attr("inject", "name=X_NAME")]),
            Err(DirectiveError::MissingFiller("@inject(name=X_NAME)".to_string()))
        );
        assert_eq!(
            parse(&[attr("inject", "tfstate,stateURL=./terraform.tfstate")]),
            Err(DirectiveError::MissingKey(
                "@inject(tfstate,stateURL=./terraform.tfstate)".to_string()
            ))
        );
        assert!(matches!(
            parse(&[attr("inject", "env,name=\"X")]),
            Err(DirectiveError::Malformed(_))
        ));
    }
}
