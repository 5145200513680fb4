//! Concrete data representation
//!
//! The export model contains the following data types
//! - null
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Hidden and definition fields are not part of the data and are left out.
use crate::error::ExportError;
use crate::path::{Path, Selector};
use crate::value::Value;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Concrete {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Concrete>),
    Object(indexmap::IndexMap<String, Concrete>),
}

impl Value {
    /// Convert into plain data
    ///
    /// Disjunctions resolve to their default. Anything else that is not concrete (types,
    /// bounds, ambiguous disjunctions) makes the export fail.
    pub fn export(&self) -> Result<Concrete, ExportError> {
        self.export_at(&mut Path::root())
    }

    fn export_at(&self, path: &mut Path) -> Result<Concrete, ExportError> {
        let incomplete = |path: &Path| ExportError::Incomplete {
            path: path.clone(),
            value: self.to_string(),
        };

        match self {
            Value::Null => Ok(Concrete::Null),
            Value::Bool(b) => Ok(Concrete::Boolean(*b)),
            Value::Int(int) => Ok(Concrete::Integer(*int)),
            Value::Float(float) => Ok(Concrete::Decimal(*float)),
            Value::String(s) => Ok(Concrete::String(s.clone())),
            Value::Bottom(reason) => Err(ExportError::Invalid {
                path: path.clone(),
                reason: reason.clone(),
            }),
            Value::Disjunction(alternatives) => {
                let mut defaults = alternatives.iter().filter(|alt| alt.default);
                match (defaults.next(), defaults.next()) {
                    (Some(default), None) => default.value.export_at(path),
                    _ => Err(incomplete(path)),
                }
            }
            Value::Struct(s) => {
                let mut object = indexmap::IndexMap::new();
                for (label, field) in s.fields().filter(|(label, _)| label.is_regular()) {
                    path.push(Selector::Field(label.clone()));
                    let value = field.value.export_at(path)?;
                    path.pop();
                    object.insert(label.name().to_string(), value);
                }
                Ok(Concrete::Object(object))
            }
            Value::List(items) => {
                let mut array = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(Selector::Index(index));
                    array.push(item.export_at(path)?);
                    path.pop();
                }
                Ok(Concrete::Array(array))
            }
            Value::Top | Value::Kind(_) | Value::Bound(_) | Value::Conjunction(_) => {
                Err(incomplete(path))
            }
        }
    }
}

impl serde::ser::Serialize for Concrete {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Concrete::Null => serializer.serialize_unit(),
            Concrete::Boolean(value) => serializer.serialize_bool(*value),
            Concrete::Integer(value) => serializer.serialize_i64(*value),
            Concrete::Decimal(value) => serializer.serialize_f64(*value),
            Concrete::String(value) => serializer.serialize_str(value),
            Concrete::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Concrete::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile_str;
    use pretty_assertions::assert_eq;

    #[test]
    fn json() {
        let value = compile_str(
            "name: \"aereal\"\nage: 17\nratio: 0.5\ntags: [\"a\", null]\n_hidden: 1\n#Def: string\nmode: *\"fast\" | string",
        )
        .expect("valid");
        let json = serde_json::to_string(&value.export().expect("concrete")).expect("serializes");
        assert_eq!(
            json,
            r#"{"name":"aereal","age":17,"ratio":0.5,"tags":["a",null],"mode":"fast"}"#
        );
    }

    #[test]
    fn incomplete() {
        let value = compile_str("a: {b: string}").expect("valid");
        let err = value.export().expect_err("b is not concrete");
        assert_eq!(err.to_string(), "incomplete value at a.b: string");
    }

    #[test]
    fn ambiguous_disjunction() {
        let value = compile_str("a: 1 | 2").expect("valid");
        assert!(matches!(
            value.export(),
            Err(ExportError::Incomplete { .. })
        ));
    }
}
