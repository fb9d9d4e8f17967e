use core::fmt;

use itertools::Itertools;

use crate::{builtin::Builtin, environment::Environment};

/// Formal that binds every remaining argument as a Q-Expression to the
/// formal that follows it.
pub(crate) const VARIADIC_MARKER: &str = "&";

pub(crate) const INVALID_VARIADIC: &str = "Function format invalid. Symbol '&' not followed by single symbol.";

// Every runtime datum. Lists own their elements, so cloning a value never
// aliases anything, including the closure environment of a lambda
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i64),
    Boolean(bool),
    Symbol(String),
    String(String),
    Error(String),
    Function(Function),
    SExpression(Vec<Value>),
    QExpression(Vec<Value>),
}

impl Value {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    pub fn sexpr() -> Self {
        Self::SExpression(Vec::new())
    }

    pub fn qexpr() -> Self {
        Self::QExpression(Vec::new())
    }

    pub fn builtin(builtin: Builtin) -> Self {
        Self::Function(Function::Builtin(builtin))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Name used in error messages when a value has the wrong type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Boolean(_) => "Boolean",
            Self::Symbol(_) => "Symbol",
            Self::String(_) => "String",
            Self::Error(_) => "Error",
            Self::Function(_) => "Function",
            Self::SExpression(_) => "S-Expression",
            Self::QExpression(_) => "Q-Expression",
        }
    }

    /// The elements of an S-Expression or a Q-Expression.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Self::SExpression(elements) | Self::QExpression(elements) => Some(elements.as_slice()),
            _ => None,
        }
    }

    fn elements_mut(&mut self) -> &mut Vec<Value> {
        match self {
            Self::SExpression(elements) | Self::QExpression(elements) => elements,
            other => panic!("{} is not a list", other.type_name()),
        }
    }

    /// Appends `value` to a list and returns the list, so literals can be
    /// built up in one expression.
    ///
    /// # Panics
    /// If `self` is not an S-Expression or a Q-Expression.
    pub fn push(mut self, value: Value) -> Self {
        self.elements_mut().push(value);
        self
    }

    /// Removes the element at `index`, shifting the rest down.
    ///
    /// # Panics
    /// If `self` is not a list or `index` is out of range.
    pub fn pop(&mut self, index: usize) -> Value {
        self.elements_mut().remove(index)
    }

    /// Like [`Value::pop`], but throws away what is left of the list.
    pub fn take(mut self, index: usize) -> Value {
        self.pop(index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Builtin(Builtin),
    Lambda(Lambda),
}

/// A user-defined function. The environment belongs to this lambda alone and
/// holds the formals that have been bound so far by partial application.
pub struct Lambda {
    pub(crate) formals: Vec<String>,
    pub(crate) body: Vec<Value>,
    pub(crate) environment: Environment,
}

impl Lambda {
    pub fn new(formals: Vec<String>, body: Vec<Value>) -> Result<Self, String> {
        check_formals(&formals)?;
        Ok(Self { formals, body, environment: Environment::new() })
    }

    pub fn formals(&self) -> &[String] {
        &self.formals
    }

    pub fn body(&self) -> &[Value] {
        &self.body
    }
}

// `&` may only appear once, as the second to last formal
fn check_formals(formals: &[String]) -> Result<(), String> {
    match formals.iter().position(|formal| formal == VARIADIC_MARKER) {
        Some(index) if index + 2 != formals.len() || formals[index + 1] == VARIADIC_MARKER
            => Err(INVALID_VARIADIC.to_owned()),
        _ => Ok(()),
    }
}

impl Clone for Lambda {
    fn clone(&self) -> Self {
        Self {
            formals: self.formals.clone(),
            body: self.body.clone(),
            environment: self.environment.copy(),
        }
    }
}

// Closure environments are not part of a lambda's identity
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.formals == other.formals && self.body == other.body
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("formals", &self.formals)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for character in text.chars() {
        match character {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }
    escaped
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{}", number),
            Self::Boolean(boolean) => write!(f, "{}", boolean),
            Self::Symbol(name) => write!(f, "{}", name),
            Self::String(text) => write!(f, "\"{}\"", escape(text)),
            Self::Error(message) => write!(f, "Error: {}", message),
            Self::Function(function) => function.fmt(f),
            Self::SExpression(elements) => write!(f, "({})", elements.iter().join(" ")),
            Self::QExpression(elements) => write!(f, "{{{}}}", elements.iter().join(" ")),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(_) => write!(f, "<builtin>"),
            Self::Lambda(lambda) => write!(
                f,
                "(\\ {{{}}} {{{}}})",
                lambda.formals.iter().join(" "),
                lambda.body.iter().join(" ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn numbers(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Number).collect()
    }

    fn lambda(formals: &[&str], body: Vec<Value>) -> Lambda {
        Lambda::new(formals.iter().map(|formal| formal.to_string()).collect(), body).unwrap()
    }

    #[test]
    fn renders_every_variant() {
        let nested = Value::sexpr()
            .push(Value::symbol("+"))
            .push(Value::Number(1))
            .push(Value::qexpr().push(Value::Boolean(true)).push(Value::string("a\"b\n")));

        assert_eq!(nested.to_string(), r#"(+ 1 {true "a\"b\n"})"#);
        assert_eq!(Value::error("boom").to_string(), "Error: boom");
        assert_eq!(Value::builtin(Builtin::Add).to_string(), "<builtin>");
        assert_eq!(Value::sexpr().to_string(), "()");
        assert_eq!(Value::qexpr().to_string(), "{}");

        let function = Value::Function(Function::Lambda(lambda(&["x", "y"], vec![Value::symbol("+"), Value::symbol("x"), Value::symbol("y")])));
        assert_eq!(function.to_string(), r"(\ {x y} {+ x y})");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Value::QExpression(numbers(&[1, 2])), Value::QExpression(numbers(&[1, 2])));
        assert_ne!(Value::QExpression(numbers(&[1, 2])), Value::SExpression(numbers(&[1, 2])));
        assert_ne!(Value::Number(1), Value::Boolean(true));
        assert_ne!(Value::builtin(Builtin::Add), Value::builtin(Builtin::Sub));
        assert_eq!(Value::builtin(Builtin::Head), Value::builtin(Builtin::Head));
    }

    #[test]
    fn lambdas_ignore_their_environment_when_compared() {
        let first = lambda(&["x"], vec![Value::symbol("x")]);
        let second = lambda(&["x"], vec![Value::symbol("x")]);
        second.environment.define_local("y", Value::Number(3));

        assert_eq!(Value::Function(Function::Lambda(first)), Value::Function(Function::Lambda(second)));
    }

    #[test]
    fn cloning_a_lambda_copies_its_environment() {
        let original = lambda(&["x", "y"], vec![Value::symbol("x")]);
        original.environment.define_local("x", Value::Number(1));

        let copy = original.clone();
        copy.environment.define_local("x", Value::Number(2));

        assert_eq!(original.environment.lookup("x"), Value::Number(1));
        assert_eq!(copy.environment.lookup("x"), Value::Number(2));
    }

    #[test]
    fn misplaced_variadic_marker_is_rejected() {
        let invalid: [&[&str]; 5] = [&["&"], &["&", "x", "y"], &["x", "&"], &["&", "&"], &["&", "x", "&", "y"]];
        for formals in invalid {
            let formals = formals.iter().map(|formal| formal.to_string()).collect();
            assert_eq!(Lambda::new(formals, vec![]).err().as_deref(), Some(INVALID_VARIADIC));
        }
        assert!(Lambda::new(vec!["x".into(), "&".into(), "xs".into()], vec![]).is_ok());
    }

    #[test]
    fn pop_and_take_shift_elements() {
        let mut list = Value::QExpression(numbers(&[1, 2, 3]));
        assert_eq!(list.pop(1), Value::Number(2));
        assert_eq!(list.elements(), Some(numbers(&[1, 3]).as_slice()));
        assert_eq!(Value::Number(1).elements(), None);
        assert_eq!(list.take(1), Value::Number(3));
    }
}
