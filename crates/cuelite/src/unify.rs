//! Unification
use crate::value::{Alternative, Bound, Kind, Struct, Value};

impl Value {
    /// Combine two values into the most general value that is an instance of both
    ///
    /// Conflicts do not fail; they produce [Value::Bottom] at the place of the conflict. Use
    /// [Value::validate] to find them.
    pub fn unify(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Bottom(_), _) => self.clone(),
            (_, Value::Bottom(_)) => other.clone(),
            (Value::Top, _) => other.clone(),
            (_, Value::Top) => self.clone(),
            (Value::Disjunction(alternatives), _) => distribute(alternatives, other),
            (_, Value::Disjunction(alternatives)) => distribute(alternatives, self),
            (Value::Struct(a), Value::Struct(b)) => Value::Struct(a.unify(b)),
            (Value::List(a), Value::List(b)) => unify_lists(a, b),
            (Value::Struct(_) | Value::List(_), _) | (_, Value::Struct(_) | Value::List(_)) => {
                conflict(self, other)
            }
            _ => unify_scalars(self, other),
        }
    }

    /// Whether a concrete scalar satisfies this constraint
    fn admits(&self, concrete: &Value) -> bool {
        match self {
            Value::Kind(kind) => concrete.scalar_kind().is_some_and(|k| kind.contains(k)),
            Value::Bound(bound) => bound.admits(concrete),
            Value::Conjunction(atoms) => atoms.iter().all(|atom| atom.admits(concrete)),
            _ => false,
        }
    }

    fn atoms(&self) -> &[Value] {
        match self {
            Value::Conjunction(atoms) => atoms,
            other => std::slice::from_ref(other),
        }
    }

    /// Build a disjunction, flattening nested ones and dropping failed or duplicate alternatives
    pub(crate) fn disjunction(alternatives: impl IntoIterator<Item = Alternative>) -> Value {
        let mut kept: Vec<Alternative> = Vec::new();
        let mut last_error = None;

        for alternative in alternatives {
            match alternative.value {
                Value::Bottom(reason) => last_error = Some(reason),
                Value::Disjunction(nested) => {
                    for inner in nested {
                        push_alternative(&mut kept, inner.value, alternative.default || inner.default);
                    }
                }
                value => push_alternative(&mut kept, value, alternative.default),
            }
        }

        match kept.len() {
            0 => Value::Bottom(format!(
                "empty disjunction: {}",
                last_error.unwrap_or_else(|| "no alternatives".to_string())
            )),
            1 => kept.remove(0).value,
            _ => Value::Disjunction(kept),
        }
    }
}

fn push_alternative(kept: &mut Vec<Alternative>, value: Value, default: bool) {
    match kept.iter_mut().find(|existing| existing.value == value) {
        Some(existing) => existing.default |= default,
        None => kept.push(Alternative::new(value, default)),
    }
}

fn distribute(alternatives: &[Alternative], other: &Value) -> Value {
    Value::disjunction(
        alternatives
            .iter()
            .map(|alternative| Alternative::new(alternative.value.unify(other), alternative.default)),
    )
}

fn conflict(a: &Value, b: &Value) -> Value {
    Value::Bottom(format!("conflicting values {a} and {b}"))
}

fn unify_lists(a: &[Value], b: &[Value]) -> Value {
    if a.len() != b.len() {
        return Value::Bottom(format!(
            "incompatible list lengths ({} and {})",
            a.len(),
            b.len()
        ));
    }

    Value::List(a.iter().zip(b).map(|(a, b)| a.unify(b)).collect())
}

fn unify_scalars(a: &Value, b: &Value) -> Value {
    match (a.scalar_kind().is_some(), b.scalar_kind().is_some()) {
        (true, true) if a == b => a.clone(),
        (true, true) => conflict(a, b),
        (true, false) => admit(b, a),
        (false, true) => admit(a, b),
        (false, false) => merge_constraints(a, b),
    }
}

fn admit(constraint: &Value, concrete: &Value) -> Value {
    if constraint.admits(concrete) {
        concrete.clone()
    } else {
        Value::Bottom(format!("{concrete} does not satisfy {constraint}"))
    }
}

/// Both sides are made of [Value::Kind] and [Value::Bound] atoms
fn merge_constraints(a: &Value, b: &Value) -> Value {
    let mut kind: Option<Kind> = None;
    let mut bounds: Vec<Bound> = Vec::new();

    for atom in a.atoms().iter().chain(b.atoms()) {
        match atom {
            Value::Kind(k) => kind = Some(kind.map_or(*k, |acc| acc.intersect(*k))),
            Value::Bound(bound) if !bounds.contains(bound) => bounds.push(bound.clone()),
            _ => {}
        }
    }

    let bound_kind = bounds
        .iter()
        .fold(Kind::ANY, |acc, bound| acc.intersect(bound.kind()));
    let kind = kind.map(|kind| kind.intersect(bound_kind));

    if bound_kind.is_empty() || kind.is_some_and(Kind::is_empty) {
        return conflict(a, b);
    }

    let mut atoms: Vec<Value> = kind.map(Value::Kind).into_iter().collect();
    atoms.extend(bounds.into_iter().map(Value::Bound));

    match atoms.len() {
        1 => atoms.remove(0),
        _ => Value::Conjunction(atoms),
    }
}

impl Struct {
    /// Field-wise unification. Fields of `self` keep their position, new fields are appended.
    pub fn unify(&self, other: &Struct) -> Struct {
        let mut merged = self.clone();
        for (label, field) in other.fields() {
            merged.insert(label.clone(), field.clone());
        }
        for attr in other.attrs() {
            merged.push_attribute(attr.clone());
        }
        merged
    }
}
