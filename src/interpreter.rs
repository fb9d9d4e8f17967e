use std::collections::VecDeque;

use tracing::trace;

use crate::{builtin::Builtin, environment::Environment, stack::ensure_sufficient_stack, value::{Function, Lambda, Value, INVALID_VARIADIC, VARIADIC_MARKER}};


/// Evaluates `value` in `environment`. Symbols are looked up, S-Expressions
/// are reduced and everything else, Q-Expressions included, evaluates to
/// itself.
pub fn evaluate(environment: &Environment, value: Value) -> Value {
    match value {
        Value::Symbol(name) => environment.lookup(&name),
        Value::SExpression(_) => ensure_sufficient_stack(|| evaluate_sexpression(environment, value)),
        other => other,
    }
}

fn evaluate_sexpression(environment: &Environment, expression: Value) -> Value {
    // Every child is evaluated before looking for errors, so children after a
    // failing one still run. The error reported is the first one by position

    let children = match expression {
        Value::SExpression(children) => children,
        other => return other,
    };
    let children: Vec<Value> = children.into_iter()
        .map(|child| evaluate(environment, child))
        .collect();

    let first_error = children.iter().position(Value::is_error);
    let count = children.len();
    let mut expression = Value::SExpression(children);

    if let Some(index) = first_error {
        return expression.take(index)
    }

    match count {
        0 => expression,
        1 => evaluate(environment, expression.take(0)),
        _ => match expression.pop(0) {
            Value::Function(function) => apply(environment, function, expression.into_arguments()),
            other => Value::error(format!(
                "S-Expression starts with incorrect type. Got {}, Expected Function.",
                other.type_name()
            )),
        }
    }
}

impl Value {
    fn into_arguments(self) -> Vec<Value> {
        match self {
            Value::SExpression(elements) | Value::QExpression(elements) => elements,
            other => vec![other],
        }
    }
}

/// Calls `function` with already evaluated `arguments` on behalf of
/// `environment`.
pub fn apply(environment: &Environment, function: Function, arguments: Vec<Value>) -> Value {
    trace!(%function, arguments = arguments.len(), "apply");

    match function {
        Function::Builtin(builtin) => builtin.apply(environment, arguments),
        Function::Lambda(lambda) => lambda.call(environment, arguments),
    }
}

impl Lambda {
    /// Binds as many formals as there are arguments. When every formal is
    /// bound the body runs in the closure environment, reparented onto the
    /// caller. Otherwise the partially applied lambda is returned.
    pub(crate) fn call(mut self, caller: &Environment, arguments: Vec<Value>) -> Value {
        let given = arguments.len();
        let total = self.formals.len();
        let mut arguments = VecDeque::from(arguments);

        while !arguments.is_empty() {
            if self.formals.is_empty() {
                return Value::error(format!(
                    "Function passed too many arguments. Got {}, Expected {}",
                    given, total
                ))
            }

            let formal = self.formals.remove(0);
            if formal == VARIADIC_MARKER {
                if self.formals.len() != 1 {
                    return Value::error(INVALID_VARIADIC)
                }
                let rest = self.formals.remove(0);
                let rest_arguments = Builtin::List.apply(caller, arguments.drain(..).collect());
                self.environment.define_local(&rest, rest_arguments);
                break;
            }

            if let Some(argument) = arguments.pop_front() {
                self.environment.define_local(&formal, argument);
            }
        }

        // A variadic formal that got no arguments is bound to an empty list
        if self.formals.first().is_some_and(|formal| formal == VARIADIC_MARKER) {
            if self.formals.len() != 2 {
                return Value::error(INVALID_VARIADIC)
            }
            let rest = self.formals.remove(1);
            self.formals.clear();
            self.environment.define_local(&rest, Value::qexpr());
        }

        if !self.formals.is_empty() {
            return Value::Function(Function::Lambda(self))
        }

        self.environment.set_parent(caller);
        let body = Value::SExpression(self.body.clone());
        evaluate(&self.environment, body)
    }
}
