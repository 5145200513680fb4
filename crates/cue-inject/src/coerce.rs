//! Fitting resolved values to the field they are written into
//!
//! Some sources have a single number type. Terraform state for example hands out `17.0` for a
//! value declared as `17`, which an `int` field would reject.
use cuelite::Value;

/// The field admits `1` but not `1.0`
pub fn accepts_only_int(field: &Value) -> bool {
    let accepts = |probe: Value| field.unify(&probe).validate().is_ok();
    accepts(Value::Int(1)) && !accepts(Value::Float(1.0))
}

/// Narrow floats to integers for integer-only fields, truncating any fraction
pub fn coerce(field: &Value, value: Value) -> Value {
    match value {
        Value::Float(float) if accepts_only_int(field) => {
            tracing::debug!(%float, "narrowing to integer");
            Value::Int(float as i64)
        }
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cuelite::{Label, Path, Selector};
    use pretty_assertions::assert_eq;

    fn field(source: &str) -> Value {
        let value = cuelite::compile_str(&format!("x: {source}")).unwrap();
        let x = Path::root().child(Selector::Field(Label::ident("x")));
        value.lookup(&x).cloned().unwrap()
    }

    #[test]
    fn integer_only_fields() {
        for source in ["int", "int & >=0", "int | string", "*8080 | int", ">0 & int"] {
            assert!(accepts_only_int(&field(source)), "{source}");
        }
    }

    #[test]
    fn other_fields() {
        for source in ["number", "float", "_", "string", "1.0", "17", ">0", "{}"] {
            assert!(!accepts_only_int(&field(source)), "{source}");
        }
    }

    #[test]
    fn narrowing() {
        assert_eq!(coerce(&field("int"), Value::Float(17.0)), Value::Int(17));
        assert_eq!(coerce(&field("int"), Value::Float(-2.9)), Value::Int(-2));
        assert_eq!(coerce(&field("number"), Value::Float(17.0)), Value::Float(17.0));
        assert_eq!(coerce(&field("int"), Value::from("17")), Value::from("17"));
    }
}
