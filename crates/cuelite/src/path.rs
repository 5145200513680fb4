//! Addressing values inside a tree
use crate::value::Label;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Field(Label),
    Index(usize),
}

/// Sequence of selectors from the root of a tree, e.g. `service.ports[0]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Selector>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    pub fn push(&mut self, selector: Selector) {
        self.0.push(selector);
    }

    pub fn pop(&mut self) -> Option<Selector> {
        self.0.pop()
    }

    pub fn child(&self, selector: Selector) -> Self {
        let mut path = self.clone();
        path.push(selector);
        path
    }
}

impl FromIterator<Selector> for Path {
    fn from_iter<T: IntoIterator<Item = Selector>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }

        for (position, selector) in self.0.iter().enumerate() {
            match selector {
                Selector::Field(label) if position == 0 => write!(f, "{label}")?,
                Selector::Field(label) => write!(f, ".{label}")?,
                Selector::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
