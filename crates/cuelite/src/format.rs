//! Rendering values back to source text
//!
//! A struct at the root is written as a file body (no surrounding braces). Declaration attributes
//! come first, then one field per line. Nested structs are indented with tabs.
use crate::value::{Struct, Value};

/// Render a value as a document
pub fn format(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Struct(root) => write_body(&mut out, root, 0),
        other => {
            write_value(&mut out, other, 0);
            out.push('\n');
        }
    }
    out
}

pub(crate) fn format_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_body(out: &mut String, body: &Struct, depth: usize) {
    for attr in body.attrs() {
        indent(out, depth);
        out.push_str(&attr.to_string());
        out.push('\n');
    }

    for (label, field) in body.fields() {
        indent(out, depth);
        out.push_str(&label.to_string());
        out.push_str(": ");
        write_value(out, &field.value, depth);
        for attr in &field.attrs {
            out.push(' ');
            out.push_str(&attr.to_string());
        }
        out.push('\n');
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Top => out.push('_'),
        Value::Bottom(_) => out.push_str("_|_"),
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(int) => out.push_str(&int.to_string()),
        // Debug keeps the fraction of whole numbers: `17.0` instead of `17`
        Value::Float(float) => out.push_str(&format!("{float:?}")),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Kind(kind) => out.push_str(&kind.to_string()),
        Value::Bound(bound) => out.push_str(&bound.to_string()),
        Value::Conjunction(atoms) => {
            for (position, atom) in atoms.iter().enumerate() {
                if position > 0 {
                    out.push_str(" & ");
                }
                write_value(out, atom, depth);
            }
        }
        Value::Disjunction(alternatives) => {
            for (position, alternative) in alternatives.iter().enumerate() {
                if position > 0 {
                    out.push_str(" | ");
                }
                if alternative.default {
                    out.push('*');
                }
                write_value(out, &alternative.value, depth);
            }
        }
        Value::Struct(s) if s.is_empty() => out.push_str("{}"),
        Value::Struct(s) => {
            out.push_str("{\n");
            write_body(out, s, depth + 1);
            indent(out, depth);
            out.push('}');
        }
        Value::List(items) if items.is_empty() => out.push_str("[]"),
        Value::List(items) if items.iter().all(is_inline) => {
            out.push('[');
            for (position, item) in items.iter().enumerate() {
                if position > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth);
            }
            out.push(']');
        }
        Value::List(items) => {
            out.push_str("[\n");
            for item in items {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(']');
        }
    }
}

fn is_inline(value: &Value) -> bool {
    match value {
        Value::Struct(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile_str;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str) -> String {
        format(&compile_str(source).expect("valid"))
    }

    #[test]
    fn fields_and_attributes() {
        assert_eq!(
            roundtrip("@inject(tfstate,stateURL=x)\nname:   string  @inject(env,name=X)\nage: 17"),
            "@inject(tfstate,stateURL=x)\nname: string @inject(env,name=X)\nage: 17\n"
        );
    }

    #[test]
    fn nested_values() {
        let source = "service: {\n\tname: \"api\"\n\tports: [80, 443]\n\tlimits: [\n\t\t{\n\t\t\tcpu: 1.0\n\t\t},\n\t]\n\tmeta: {}\n}\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn constraints() {
        assert_eq!(
            roundtrip("a: int & >=0\nb: *\"x\" | string\nc: number\nd: _\ne: null"),
            "a: int & >=0\nb: *\"x\" | string\nc: number\nd: _\ne: null\n"
        );
    }

    #[test]
    fn labels_and_strings() {
        assert_eq!(
            roundtrip("\"a b\": \"say \\\"hi\\\"\"\n_h: 1\n#D: 2\n\"_q\": 3"),
            "\"a b\": \"say \\\"hi\\\"\"\n_h: 1\n#D: 2\n\"_q\": 3\n"
        );
    }

    #[test]
    fn floats_keep_their_kind() {
        assert_eq!(roundtrip("a: 17.0\nb: 1.5"), "a: 17.0\nb: 1.5\n");
        assert_eq!(compile_str(&roundtrip("a: 17.0")), compile_str("a: 17.0"));
    }

    #[test]
    fn output_parses_back() {
        let source = "@inject(x)\na: {\n\tb: [1, {c: int}]\n\td: \"\\n\"\n}\n_e: *1 | int & >0";
        let value = compile_str(source).expect("valid");
        assert_eq!(compile_str(&format(&value)).expect("formatted output is valid"), value);
    }
}
