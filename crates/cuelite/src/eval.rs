//! Turning a syntax tree into a [Value]
use crate::parser::{Decl, Expr, File};
use crate::value::{Alternative, Bound, Field, Struct, Value};

/// Evaluate a parsed file. Never fails: conflicts are left in the tree as [Value::Bottom].
#[tracing::instrument(level = "trace", skip_all)]
pub fn build(file: &File) -> Value {
    build_body(&file.decls)
}

fn build_body(decls: &[Decl]) -> Value {
    let mut own = Struct::default();
    let mut embeds = Vec::new();

    for decl in decls {
        match decl {
            Decl::Field {
                label,
                value,
                attrs,
            } => own.insert(label.clone(), Field::new(build_expr(value), attrs.clone())),
            Decl::Attribute(attr) => own.push_attribute(attr.clone()),
            Decl::Embed(expr) => embeds.push(build_expr(expr)),
        }
    }

    if embeds.is_empty() {
        return Value::Struct(own);
    }

    // a body that only embeds takes the shape of what it embeds
    let base = if own.is_empty() {
        Value::Top
    } else {
        Value::Struct(own)
    };
    embeds.iter().fold(base, |acc, embed| acc.unify(embed))
}

fn build_expr(expr: &Expr) -> Value {
    match expr {
        Expr::Null => Value::Null,
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Int(int) => Value::Int(*int),
        Expr::Float(float) => Value::Float(*float),
        Expr::String(s) => Value::String(s.clone()),
        Expr::Kind(kind) => Value::Kind(*kind),
        Expr::Top => Value::Top,
        Expr::Bottom => Value::Bottom("explicit error (_|_ literal)".to_string()),
        Expr::Bound(op, limit) => Value::Bound(Bound::new(*op, build_expr(limit))),
        Expr::Unify(operands) => operands
            .iter()
            .map(build_expr)
            .fold(Value::Top, |acc, operand| acc.unify(&operand)),
        Expr::Disjunction(alternatives) => Value::disjunction(
            alternatives
                .iter()
                .map(|(expr, default)| Alternative::new(build_expr(expr), *default)),
        ),
        Expr::Struct(decls) => build_body(decls),
        Expr::List(items) => Value::List(items.iter().map(build_expr).collect()),
    }
}

#[cfg(test)]
mod test {
    use crate::compile_str;
    use crate::value::{Kind, Label, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_struct_is_the_file() {
        let wrapped = compile_str("{\n\t@inject(x)\n\tname: string\n}").expect("valid");
        let bare = compile_str("@inject(x)\nname: string").expect("valid");
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn scalar_file() {
        assert_eq!(compile_str("\"x\"").expect("valid"), Value::from("x"));
    }

    #[test]
    fn field_order_is_kept() {
        let value = compile_str("b: 1\na: 2\nc: 3\na: int").expect("valid");
        let labels: Vec<_> = value
            .as_struct()
            .expect("struct")
            .fields()
            .map(|(label, _)| label.name().to_string())
            .collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn attributes_are_attached_to_fields() {
        let value = compile_str("name: string @inject(env,name=X)").expect("valid");
        let field = value
            .as_struct()
            .and_then(|s| s.field(&Label::ident("name")))
            .expect("field present");
        assert_eq!(field.value, Value::Kind(Kind::STRING));
        assert_eq!(
            field.attribute("inject").map(|attr| attr.contents()),
            Some("env,name=X")
        );
        assert_eq!(field.attribute("injectenv"), None);
    }
}
