//! Depth-first traversal of a value tree
//!
//! Struct fields (hidden and definition fields included) and list elements are descended into in
//! declaration order. Every other value is a leaf and handed to the visitor.
use cuelite::{Attribute, Path, Selector, Value};

/// A non-composite value and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<'a> {
    pub path: Path,
    pub value: &'a Value,
    /// Attributes of the field holding the value. Empty for list elements and the root.
    pub attrs: &'a [Attribute],
}

pub trait Visit {
    fn visit(&mut self, leaf: Leaf<'_>);
}

// blanket impl for FnMut
impl<F> Visit for F
where
    F: FnMut(Leaf<'_>),
{
    fn visit(&mut self, leaf: Leaf<'_>) {
        self(leaf)
    }
}

pub fn walk<V: Visit + ?Sized>(root: &Value, visitor: &mut V) {
    walk_at(root, &[], &mut Path::root(), visitor)
}

fn walk_at<V: Visit + ?Sized>(
    value: &Value,
    attrs: &[Attribute],
    path: &mut Path,
    visitor: &mut V,
) {
    match value {
        Value::Struct(s) => {
            for (label, field) in s.fields() {
                path.push(Selector::Field(label.clone()));
                walk_at(&field.value, &field.attrs, path, visitor);
                path.pop();
            }
        }
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(Selector::Index(index));
                walk_at(item, &[], path, visitor);
                path.pop();
            }
        }
        leaf => visitor.visit(Leaf {
            path: path.clone(),
            value: leaf,
            attrs,
        }),
    }
}
