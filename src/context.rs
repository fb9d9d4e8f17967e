use tracing::{debug, warn};

use crate::{environment::Environment, error::RokError, interpreter::evaluate, parser::parse, reader::read, value::Value};


/// An evaluation context owns the root environment, seeded with the builtins,
/// and evaluates values, source text or whole files against it.
///
/// Definitions made with `def` persist in the context between calls.
pub struct EvaluationContext {
    environment: Environment,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self { environment: Environment::new_root() }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluate(&self, value: Value) -> Value {
        evaluate(&self.environment, value)
    }

    /// Evaluates one line of input. The line as a whole is a single
    /// S-Expression, so `+ 1 2` and `(+ 1 2)` mean the same thing.
    pub fn evaluate_str(&self, input: &str) -> Result<Value, RokError> {
        let program = parse(input)?;
        Ok(self.evaluate(read(&program)))
    }

    /// Evaluates every top-level expression in `path`, stopping at the first
    /// error.
    pub fn load_file(&self, path: &str) -> Value {
        load(&self.environment, path)
    }
}

fn read_program(path: &str) -> Result<Vec<Value>, RokError> {
    let source = std::fs::read_to_string(path).map_err(|error| RokError::io(path, error))?;
    let program = parse(&source)?;

    match read(&program) {
        Value::SExpression(expressions) => Ok(expressions),
        other => Ok(vec![other]),
    }
}

pub(crate) fn load(environment: &Environment, path: &str) -> Value {
    let expressions = match read_program(path) {
        Ok(expressions) => expressions,
        Err(error) => return Value::error(format!("Could not load Library {}", error)),
    };
    debug!(path, expressions = expressions.len(), "load");

    for expression in expressions {
        let result = evaluate(environment, expression);
        if let Value::Error(message) = &result {
            warn!(path, message = message.as_str(), "load stopped on error");
            return result
        }
    }

    debug!(path, "loaded");
    Value::sexpr()
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use pretty_assertions::assert_eq;

    use super::*;

    fn script(name: &str, source: &str) -> anyhow::Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("rok-{}-{}.rok", std::process::id(), name));
        fs::write(&path, source)?;
        Ok(path)
    }

    #[test]
    fn evaluates_a_line_as_one_expression() -> anyhow::Result<()> {
        let context = EvaluationContext::new();

        assert_eq!(context.evaluate_str("+ 1 2")?, Value::Number(3));
        assert_eq!(context.evaluate_str("(+ 1 (* 2 3))")?, Value::Number(7));
        assert_eq!(context.evaluate_str("")?, Value::sexpr());
        assert!(context.evaluate_str("(+ 1").is_err());
        Ok(())
    }

    #[test]
    fn definitions_persist_between_lines() -> anyhow::Result<()> {
        let context = EvaluationContext::new();

        context.evaluate_str("def {x} 10")?;
        assert_eq!(context.evaluate_str("* x 2")?, Value::Number(20));
        assert_eq!(context.environment().lookup("x"), Value::Number(10));
        Ok(())
    }

    #[test]
    fn loads_every_expression_in_a_file() -> anyhow::Result<()> {
        let path = script("library", "; helpers\n(def {double} (\\ {x} {* 2 x}))\n(def {y} (double 21))\n")?;
        let context = EvaluationContext::new();

        assert_eq!(context.load_file(&path.to_string_lossy()), Value::sexpr());
        assert_eq!(context.evaluate_str("y")?, Value::Number(42));

        fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn load_stops_at_the_first_error() -> anyhow::Result<()> {
        let path = script("failing", "(def {a} 1)\n(head {})\n(def {b} 2)\n")?;
        let context = EvaluationContext::new();

        let source = format!("load \"{}\"", path.to_string_lossy().replace('\\', "\\\\"));
        assert_eq!(context.evaluate_str(&source)?, Value::error("Function 'head' passed {}!"));
        assert_eq!(context.evaluate_str("a")?, Value::Number(1));
        assert!(context.evaluate_str("b")?.is_error());

        fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn missing_files_are_errors() {
        let context = EvaluationContext::new();
        match context.load_file("/definitely/not/here.rok") {
            Value::Error(message) => assert!(message.starts_with("Could not load Library could not read")),
            other => panic!("expected an error, got {}", other),
        }
    }
}
