use crate::{parser::{Node, NodeKind}, value::Value};


fn read_number(text: &str) -> Value {
    text.parse::<i64>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::error("invalid number"))
}

fn read_string(text: &str) -> Value {
    let inner = text.strip_prefix('"')
        .and_then(|text| text.strip_suffix('"'))
        .unwrap_or(text);

    let mut unescaped = String::with_capacity(inner.len());
    let mut characters = inner.chars();
    while let Some(character) = characters.next() {
        if character != '\\' {
            unescaped.push(character);
            continue;
        }
        match characters.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('r') => unescaped.push('\r'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }

    Value::String(unescaped)
}

fn read_children(node: &Node) -> Vec<Value> {
    node.children.iter()
        .filter(|child| !matches!(child.kind, NodeKind::Punctuation | NodeKind::Comment))
        .map(read)
        .collect()
}

/// Turns a parse tree into a value. The program root reads as one
/// S-Expression of its top-level expressions.
pub fn read(node: &Node) -> Value {
    match node.kind {
        NodeKind::Number => read_number(node.contents),
        NodeKind::Boolean => Value::Boolean(node.contents == "true"),
        NodeKind::Symbol => Value::symbol(node.contents),
        NodeKind::String => read_string(node.contents),
        NodeKind::Program | NodeKind::SExpression => Value::SExpression(read_children(node)),
        NodeKind::QExpression => Value::QExpression(read_children(node)),
        NodeKind::Comment | NodeKind::Punctuation
            => Value::error(format!("cannot read '{}' as a value", node.contents)),
    }
}
