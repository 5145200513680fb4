//! Evaluated value tree
//!
//! A [Value] is either concrete data (`null`, booleans, numbers, strings, structs, lists) or a
//! constraint that concrete data may later be unified with (`string`, `>=0`, `int | *"auto"`).
//! Values form a lattice: [Value::Top] (`_`) accepts everything, [Value::Bottom] (`_|_`) nothing.
//!
//! Integers and floats are distinct kinds. `1` is not an instance of `float` and `1.0` is not an
//! instance of `int`; `number` covers both.
use crate::attribute::Attribute;
use crate::error::{FillError, ValidationError};
use crate::lexer::{is_ident_continue, is_ident_start};
use crate::path::{Path, Selector};
use indexmap::IndexMap;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `_`
    Top,
    /// `_|_` with the reason that produced it
    Bottom(String),
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// One or more basic types, e.g. `string` or `int | string`
    Kind(Kind),
    Bound(Bound),
    /// Two or more non-concrete constraints that all have to hold (`int & >=0`)
    ///
    /// Only holds [Value::Kind] and [Value::Bound] atoms.
    Conjunction(Vec<Value>),
    /// Two or more alternatives, never nested
    Disjunction(Vec<Alternative>),
    Struct(Struct),
    List(Vec<Value>),
}

/// Set of basic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind(u8);

impl Kind {
    pub const NULL: Kind = Kind(1);
    pub const BOOL: Kind = Kind(1 << 1);
    pub const INT: Kind = Kind(1 << 2);
    pub const FLOAT: Kind = Kind(1 << 3);
    pub const STRING: Kind = Kind(1 << 4);
    pub const NUMBER: Kind = Kind(Self::INT.0 | Self::FLOAT.0);
    pub const ANY: Kind = Kind(0b1_1111);

    const NAMES: [(Kind, &'static str); 5] = [
        (Self::NULL, "null"),
        (Self::BOOL, "bool"),
        (Self::INT, "int"),
        (Self::FLOAT, "float"),
        (Self::STRING, "string"),
    ];

    pub const fn union(self, other: Kind) -> Kind {
        Kind(self.0 | other.0)
    }

    pub const fn intersect(self, other: Kind) -> Kind {
        Kind(self.0 & other.0)
    }

    pub const fn contains(self, other: Kind) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if *self == Kind::NUMBER {
            return f.write_str("number");
        }
        if self.is_empty() {
            return f.write_str("_|_");
        }

        let names: Vec<_> = Self::NAMES
            .iter()
            .filter(|(kind, _)| self.contains(*kind))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(" | "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundOp {
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
}

impl std::fmt::Display for BoundOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BoundOp::Lt => "<",
            BoundOp::Le => "<=",
            BoundOp::Gt => ">",
            BoundOp::Ge => ">=",
            BoundOp::Ne => "!=",
        })
    }
}

/// Comparison against a concrete scalar, e.g. `>=0`
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub op: BoundOp,
    pub limit: Box<Value>,
}

impl Bound {
    pub fn new(op: BoundOp, limit: Value) -> Self {
        Self {
            op,
            limit: Box::new(limit),
        }
    }

    pub fn admits(&self, value: &Value) -> bool {
        let ordering = compare(value, &self.limit);
        match self.op {
            BoundOp::Ne => ordering.map_or(true, |ordering| ordering.is_ne()),
            BoundOp::Lt => ordering.is_some_and(|ordering| ordering.is_lt()),
            BoundOp::Le => ordering.is_some_and(|ordering| ordering.is_le()),
            BoundOp::Gt => ordering.is_some_and(|ordering| ordering.is_gt()),
            BoundOp::Ge => ordering.is_some_and(|ordering| ordering.is_ge()),
        }
    }

    /// Kinds a value must have to satisfy this bound
    pub fn kind(&self) -> Kind {
        match (self.op, self.limit.as_ref()) {
            (BoundOp::Ne, _) => Kind::ANY,
            (_, Value::Int(_) | Value::Float(_)) => Kind::NUMBER,
            (_, Value::String(_)) => Kind::STRING,
            _ => Kind::ANY,
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.op, self.limit)
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (a, b) if a == b => Some(std::cmp::Ordering::Equal),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Alternative {
    pub value: Value,
    /// marked with `*`
    pub default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Regular,
    /// `_name`, never exported
    Hidden,
    /// `#Name` or `_#Name`, never exported
    Definition,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    name: String,
    kind: LabelKind,
}

impl Label {
    /// Label written as a quoted string. Always regular.
    pub fn regular(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LabelKind::Regular,
        }
    }

    /// Label written as an identifier. The prefix decides the kind.
    pub fn ident(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = if name.starts_with('#') || name.starts_with("_#") {
            LabelKind::Definition
        } else if name.starts_with('_') {
            LabelKind::Hidden
        } else {
            LabelKind::Regular
        };
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn is_regular(&self) -> bool {
        self.kind == LabelKind::Regular
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let bare = match self.kind {
            LabelKind::Regular => !self.name.starts_with(['_', '#']) && is_identifier(&self.name),
            LabelKind::Hidden | LabelKind::Definition => true,
        };

        if bare {
            f.write_str(&self.name)
        } else {
            f.write_str(&crate::format::quote(&self.name))
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Field {
    pub value: Value,
    pub attrs: Vec<Attribute>,
}

impl Field {
    /// First attribute with the given key
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.key() == key)
    }
}

/// Ordered fields plus declaration attributes (attributes standing on their own inside the struct)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    fields: IndexMap<Label, Field>,
    attrs: Vec<Attribute>,
}

impl Struct {
    pub fn fields(&self) -> impl Iterator<Item = (&Label, &Field)> {
        self.fields.iter()
    }

    pub fn field(&self, label: &Label) -> Option<&Field> {
        self.fields.get(label)
    }

    pub fn field_mut(&mut self, label: &Label) -> Option<&mut Field> {
        self.fields.get_mut(label)
    }

    /// Declaration attributes
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Declaration attributes with the given key, in source order
    pub fn attributes<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Attribute> {
        self.attrs.iter().filter(move |attr| attr.key() == key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.attrs.is_empty()
    }

    /// Add a field. A label that already exists is unified with the new value.
    pub fn insert(&mut self, label: Label, field: Field) {
        match self.fields.get_mut(&label) {
            Some(existing) => {
                existing.value = existing.value.unify(&field.value);
                for attr in field.attrs {
                    if !existing.attrs.contains(&attr) {
                        existing.attrs.push(attr);
                    }
                }
            }
            None => {
                self.fields.insert(label, field);
            }
        }
    }

    pub fn push_attribute(&mut self, attr: Attribute) {
        if !self.attrs.contains(&attr) {
            self.attrs.push(attr);
        }
    }
}

impl Value {
    /// Kind of a concrete scalar
    pub fn scalar_kind(&self) -> Option<Kind> {
        match self {
            Value::Null => Some(Kind::NULL),
            Value::Bool(_) => Some(Kind::BOOL),
            Value::Int(_) => Some(Kind::INT),
            Value::Float(_) => Some(Kind::FLOAT),
            Value::String(_) => Some(Kind::STRING),
            _ => None,
        }
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self, Value::Bottom(_))
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        path.selectors()
            .iter()
            .try_fold(self, |value, selector| match (value, selector) {
                (Value::Struct(s), Selector::Field(label)) => s.field(label).map(|f| &f.value),
                (Value::List(items), Selector::Index(index)) => items.get(*index),
                _ => None,
            })
    }

    pub fn lookup_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut value = self;
        for selector in path.selectors() {
            value = match (value, selector) {
                (Value::Struct(s), Selector::Field(label)) => &mut s.field_mut(label)?.value,
                (Value::List(items), Selector::Index(index)) => items.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(value)
    }

    /// Fails with the location of the first bottom value found. Incomplete values are fine.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(&mut Path::root())
    }

    fn validate_at(&self, path: &mut Path) -> Result<(), ValidationError> {
        match self {
            Value::Bottom(reason) => Err(ValidationError {
                path: path.clone(),
                reason: reason.clone(),
            }),
            Value::Struct(s) => {
                for (label, field) in s.fields() {
                    path.push(Selector::Field(label.clone()));
                    field.value.validate_at(path)?;
                    path.pop();
                }
                Ok(())
            }
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(Selector::Index(index));
                    item.validate_at(path)?;
                    path.pop();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Returns a new tree where the value at `path` is unified with `value`
    ///
    /// `self` is left untouched.
    pub fn fill_path(&self, path: &Path, value: impl Into<Value>) -> Result<Value, FillError> {
        let value = value.into();
        let mut filled = self.clone();
        let slot = filled
            .lookup_mut(path)
            .ok_or_else(|| FillError::NotFound(path.clone()))?;

        let unified = slot.unify(&value);
        if let Err(ValidationError { reason, .. }) = unified.validate() {
            return Err(FillError::Conflict {
                path: path.clone(),
                reason,
            });
        }

        tracing::trace!(%path, value = %unified, "filled");
        *slot = unified;
        Ok(filled)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::format::format_value(self))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => b.into(),
            Json::Number(number) => match (number.is_f64(), number.as_i64()) {
                (false, Some(int)) => Value::Int(int),
                _ => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => s.into(),
            Json::Array(items) => items.into(),
            Json::Object(object) => {
                let mut fields = Struct::default();
                for (key, value) in object {
                    fields.insert(Label::regular(key), Field::new(value.into(), vec![]));
                }
                Value::Struct(fields)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile_str;
    use pretty_assertions::assert_eq;

    fn path(fields: &[&str]) -> Path {
        fields
            .iter()
            .map(|name| Selector::Field(Label::ident(*name)))
            .collect()
    }

    #[test]
    fn label_kinds() {
        assert_eq!(Label::ident("name").kind(), LabelKind::Regular);
        assert_eq!(Label::ident("_name").kind(), LabelKind::Hidden);
        assert_eq!(Label::ident("#Name").kind(), LabelKind::Definition);
        assert_eq!(Label::ident("_#Name").kind(), LabelKind::Definition);
        assert_eq!(Label::regular("_name").kind(), LabelKind::Regular);
        assert_ne!(Label::regular("_name"), Label::ident("_name"));
    }

    #[test]
    fn label_display_quotes_when_needed() {
        assert_eq!(Label::ident("_name").to_string(), "_name");
        assert_eq!(Label::regular("_name").to_string(), r#""_name""#);
        assert_eq!(Label::regular("a-b").to_string(), r#""a-b""#);
        assert_eq!(Label::regular("ab").to_string(), "ab");
    }

    #[test]
    fn fill_path_is_copy_on_write() {
        let tree = compile_str("a: { b: string }").expect("valid");
        let filled = tree.fill_path(&path(&["a", "b"]), "x").expect("fills");

        assert_eq!(tree.lookup(&path(&["a", "b"])), Some(&Value::Kind(Kind::STRING)));
        assert_eq!(filled.lookup(&path(&["a", "b"])), Some(&Value::from("x")));
    }

    #[test]
    fn fill_path_conflict() {
        let tree = compile_str("a: int").expect("valid");
        let err = tree.fill_path(&path(&["a"]), "x").expect_err("conflict");
        assert!(matches!(err, FillError::Conflict { .. }));
    }

    #[test]
    fn fill_path_missing() {
        let tree = compile_str("a: int").expect("valid");
        assert_eq!(
            tree.fill_path(&path(&["b"]), 1i64),
            Err(FillError::NotFound(path(&["b"])))
        );
    }

    #[test]
    fn fill_list_element() {
        let tree = compile_str("ports: [int, int]").expect("valid");
        let at = path(&["ports"]).child(Selector::Index(1));
        let filled = tree.fill_path(&at, 8080i64).expect("fills");
        assert_eq!(
            filled.lookup(&path(&["ports"])),
            Some(&Value::List(vec![Value::Kind(Kind::INT), Value::Int(8080)]))
        );
    }

    #[test]
    fn validate_reports_path() {
        let tree = compile_str("a: { b: int & \"x\" }").expect("valid syntax");
        let err = tree.validate().expect_err("b is bottom");
        assert_eq!(err.path, path(&["a", "b"]));
    }

    #[test]
    fn bounds() {
        let ge = Bound::new(BoundOp::Ge, Value::Int(0));
        assert!(ge.admits(&Value::Int(0)));
        assert!(ge.admits(&Value::Float(0.5)));
        assert!(!ge.admits(&Value::Int(-1)));
        assert!(!ge.admits(&Value::from("a")));

        let ne = Bound::new(BoundOp::Ne, Value::from(""));
        assert!(ne.admits(&Value::from("a")));
        assert!(!ne.admits(&Value::from("")));
        assert!(ne.admits(&Value::Int(1)));
    }

    #[test]
    fn from_json() {
        let json = serde_json::json!({"name": "aereal", "age": 17, "score": 1.5, "tags": [null, true]});
        let value = Value::from(json);
        let expected = compile_str(r#"{name: "aereal", age: 17, score: 1.5, tags: [null, true]}"#)
            .expect("valid");
        assert_eq!(value, expected);
    }
}
