use itertools::Itertools;
use tracing::debug;

use crate::{context::load, environment::Environment, interpreter::evaluate, value::{Function, Lambda, Value}};

/// Builtins report their own contract violations through `Err`, which the
/// dispatcher turns into an error value.
pub(crate) type BuiltinResult = Result<Value, String>;

const DIVISION_BY_ZERO: &str = "Division By Zero!";
const INTEGER_OVERFLOW: &str = "Integer Overflow!";

/// Every native operation of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Add, Sub, Mul, Div, Mod, Pow,
    Greater, GreaterEq, Less, LessEq, Eq, NotEq,
    If,
    List, Head, Tail, Eval, Join, Len, Cons,
    Lambda, Def, Put,
    Load, Print, Error,
}

impl Builtin {
    pub const ALL: [Builtin; 26] = [
        Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Mod, Self::Pow,
        Self::Greater, Self::GreaterEq, Self::Less, Self::LessEq, Self::Eq, Self::NotEq,
        Self::If,
        Self::List, Self::Head, Self::Tail, Self::Eval, Self::Join, Self::Len, Self::Cons,
        Self::Lambda, Self::Def, Self::Put,
        Self::Load, Self::Print, Self::Error,
    ];

    /// The symbol the builtin is bound to in the root environment.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::If => "if",
            Self::List => "list",
            Self::Head => "head",
            Self::Tail => "tail",
            Self::Eval => "eval",
            Self::Join => "join",
            Self::Len => "len",
            Self::Cons => "cons",
            Self::Lambda => "\\",
            Self::Def => "def",
            Self::Put => "=",
            Self::Load => "load",
            Self::Print => "print",
            Self::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn apply(self, environment: &Environment, arguments: Vec<Value>) -> Value {
        let result = match self {
            Self::Add => builtin_arithmetic(self, arguments, |a, b| a.checked_add(b).ok_or_else(overflow)),
            Self::Sub => builtin_arithmetic(self, arguments, |a, b| a.checked_sub(b).ok_or_else(overflow)),
            Self::Mul => builtin_arithmetic(self, arguments, |a, b| a.checked_mul(b).ok_or_else(overflow)),
            Self::Div => builtin_arithmetic(self, arguments, floor_div),
            Self::Mod => builtin_arithmetic(self, arguments, floor_mod),
            Self::Pow => builtin_arithmetic(self, arguments, power),
            Self::Greater => builtin_order(self, arguments, |a, b| a > b),
            Self::GreaterEq => builtin_order(self, arguments, |a, b| a >= b),
            Self::Less => builtin_order(self, arguments, |a, b| a < b),
            Self::LessEq => builtin_order(self, arguments, |a, b| a <= b),
            Self::Eq => builtin_equality(self, arguments, true),
            Self::NotEq => builtin_equality(self, arguments, false),
            Self::If => builtin_if(environment, arguments),
            Self::List => builtin_list(arguments),
            Self::Head => builtin_head(arguments),
            Self::Tail => builtin_tail(arguments),
            Self::Eval => builtin_eval(environment, arguments),
            Self::Join => builtin_join(arguments),
            Self::Len => builtin_len(arguments),
            Self::Cons => builtin_cons(arguments),
            Self::Lambda => builtin_lambda(arguments),
            Self::Def | Self::Put => builtin_variable(self, environment, arguments),
            Self::Load => builtin_load(environment, arguments),
            Self::Print => builtin_print(arguments),
            Self::Error => builtin_error(arguments),
        };

        result.unwrap_or_else(Value::Error)
    }
}

fn overflow() -> String {
    INTEGER_OVERFLOW.to_owned()
}

fn check_count(builtin: Builtin, arguments: &[Value], expected: usize) -> Result<(), String> {
    if arguments.len() != expected {
        return Err(format!(
            "Function '{}' passed incorrect number of arguments. Got {}, Expected {}.",
            builtin.name(), arguments.len(), expected
        ))
    }
    Ok(())
}

fn incorrect_type(builtin: Builtin, index: usize, got: &Value, expected: &str) -> String {
    format!(
        "Function '{}' passed incorrect type for argument {}. Got {}, Expected {}.",
        builtin.name(), index, got.type_name(), expected
    )
}

fn expect_number(builtin: Builtin, index: usize, value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => Ok(*number),
        other => Err(incorrect_type(builtin, index, other, "Number")),
    }
}

fn expect_qexpr(builtin: Builtin, index: usize, value: Value) -> Result<Vec<Value>, String> {
    match value {
        Value::QExpression(elements) => Ok(elements),
        other => Err(incorrect_type(builtin, index, &other, "Q-Expression")),
    }
}

fn expect_string(builtin: Builtin, index: usize, value: Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(incorrect_type(builtin, index, &other, "String")),
    }
}

fn expect_symbols(builtin: Builtin, elements: Vec<Value>) -> Result<Vec<String>, String> {
    elements.into_iter()
        .map(|element| match element {
            Value::Symbol(name) => Ok(name),
            other => Err(format!(
                "Function '{}' cannot define non-symbol. Got {}, Expected Symbol.",
                builtin.name(), other.type_name()
            )),
        }).collect()
}

fn expect_arguments(builtin: Builtin, arguments: &[Value]) -> Result<(), String> {
    if arguments.is_empty() {
        return Err(format!("Function '{}' passed no arguments!", builtin.name()))
    }
    Ok(())
}

fn expect_not_empty(builtin: Builtin, elements: &[Value]) -> Result<(), String> {
    if elements.is_empty() {
        return Err(format!("Function '{}' passed {{}}!", builtin.name()))
    }
    Ok(())
}

fn builtin_arithmetic(builtin: Builtin, arguments: Vec<Value>, operation: impl Fn(i64, i64) -> Result<i64, String>) -> BuiltinResult {
    expect_arguments(builtin, &arguments)?;
    let numbers = arguments.iter().enumerate()
        .map(|(index, value)| expect_number(builtin, index, value))
        .collect::<Result<Vec<i64>, String>>()?;
    let (first, rest) = (&numbers[0], &numbers[1..]);

    if builtin == Builtin::Sub && rest.is_empty() {
        return first.checked_neg().map(Value::Number).ok_or_else(overflow)
    }

    rest.iter()
        .try_fold(*first, |accumulator, number| operation(accumulator, *number))
        .map(Value::Number)
}

fn floor_div(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 { return Err(DIVISION_BY_ZERO.to_owned()) }

    let quotient = a.checked_div(b).ok_or_else(overflow)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        return Ok(quotient - 1)
    }
    Ok(quotient)
}

fn floor_mod(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 { return Err(DIVISION_BY_ZERO.to_owned()) }

    // i64::MIN % -1 overflows, but the remainder is 0
    let remainder = a.checked_rem(b).unwrap_or(0);
    if remainder != 0 && (remainder < 0) != (b < 0) {
        return Ok(remainder + b)
    }
    Ok(remainder)
}

fn power(base: i64, exponent: i64) -> Result<i64, String> {
    let odd = exponent % 2 != 0;
    match (base, u32::try_from(exponent)) {
        (_, Ok(exponent)) => base.checked_pow(exponent).ok_or_else(overflow),
        (0, Err(_)) if exponent < 0 => Err(DIVISION_BY_ZERO.to_owned()),
        (0, Err(_)) => Ok(0),
        (1, Err(_)) => Ok(1),
        (-1, Err(_)) => Ok(if odd { -1 } else { 1 }),
        // Fractions truncate to zero
        (_, Err(_)) if exponent < 0 => Ok(0),
        (_, Err(_)) => Err(overflow()),
    }
}

fn builtin_order(builtin: Builtin, arguments: Vec<Value>, compare: impl Fn(i64, i64) -> bool) -> BuiltinResult {
    check_count(builtin, &arguments, 2)?;
    let a = expect_number(builtin, 0, &arguments[0])?;
    let b = expect_number(builtin, 1, &arguments[1])?;
    Ok(Value::Boolean(compare(a, b)))
}

fn builtin_equality(builtin: Builtin, arguments: Vec<Value>, equal: bool) -> BuiltinResult {
    check_count(builtin, &arguments, 2)?;
    Ok(Value::Boolean((arguments[0] == arguments[1]) == equal))
}

fn builtin_if(environment: &Environment, arguments: Vec<Value>) -> BuiltinResult {
    check_count(Builtin::If, &arguments, 3)?;

    let [condition, then, otherwise]: [Value; 3] = arguments.try_into()
        .map_err(|_| format!("Function '{}' passed incorrect number of arguments.", Builtin::If.name()))?;
    let condition = match condition {
        Value::Boolean(condition) => condition,
        other => return Err(incorrect_type(Builtin::If, 0, &other, "Boolean")),
    };
    let then = expect_qexpr(Builtin::If, 1, then)?;
    let otherwise = expect_qexpr(Builtin::If, 2, otherwise)?;

    let branch = if condition { then } else { otherwise };
    Ok(evaluate(environment, Value::SExpression(branch)))
}

fn single_qexpr(builtin: Builtin, mut arguments: Vec<Value>) -> Result<Vec<Value>, String> {
    check_count(builtin, &arguments, 1)?;
    expect_qexpr(builtin, 0, arguments.remove(0))
}

fn builtin_list(arguments: Vec<Value>) -> BuiltinResult {
    expect_arguments(Builtin::List, &arguments)?;
    Ok(Value::QExpression(arguments))
}

fn builtin_head(arguments: Vec<Value>) -> BuiltinResult {
    let elements = single_qexpr(Builtin::Head, arguments)?;
    expect_not_empty(Builtin::Head, &elements)?;

    let head = Value::QExpression(elements).take(0);
    Ok(Value::qexpr().push(head))
}

fn builtin_tail(arguments: Vec<Value>) -> BuiltinResult {
    let elements = single_qexpr(Builtin::Tail, arguments)?;
    expect_not_empty(Builtin::Tail, &elements)?;

    let mut tail = Value::QExpression(elements);
    tail.pop(0);
    Ok(tail)
}

fn builtin_eval(environment: &Environment, arguments: Vec<Value>) -> BuiltinResult {
    let elements = single_qexpr(Builtin::Eval, arguments)?;
    Ok(evaluate(environment, Value::SExpression(elements)))
}

fn builtin_join(arguments: Vec<Value>) -> BuiltinResult {
    if arguments.len() < 2 {
        return Err(format!(
            "Function '{}' passed too few arguments. Got {}, Expected at least 2.",
            Builtin::Join.name(), arguments.len()
        ))
    }

    let lists = arguments.into_iter().enumerate()
        .map(|(index, argument)| expect_qexpr(Builtin::Join, index, argument))
        .collect::<Result<Vec<_>, String>>()?;
    Ok(Value::QExpression(lists.into_iter().flatten().collect()))
}

fn builtin_len(arguments: Vec<Value>) -> BuiltinResult {
    let elements = single_qexpr(Builtin::Len, arguments)?;
    i64::try_from(elements.len()).map(Value::Number).map_err(|_| overflow())
}

fn builtin_cons(mut arguments: Vec<Value>) -> BuiltinResult {
    check_count(Builtin::Cons, &arguments, 2)?;

    let mut elements = expect_qexpr(Builtin::Cons, 1, arguments.pop().unwrap_or_else(Value::qexpr))?;
    elements.insert(0, arguments.remove(0));
    Ok(Value::QExpression(elements))
}

fn builtin_lambda(mut arguments: Vec<Value>) -> BuiltinResult {
    check_count(Builtin::Lambda, &arguments, 2)?;

    let formals = expect_qexpr(Builtin::Lambda, 0, arguments.remove(0))?;
    let body = expect_qexpr(Builtin::Lambda, 1, arguments.remove(0))?;
    let formals = expect_symbols(Builtin::Lambda, formals)?;

    Ok(Value::Function(Function::Lambda(Lambda::new(formals, body)?)))
}

// `def` binds in the root environment, `=` in the current one
fn builtin_variable(builtin: Builtin, environment: &Environment, mut arguments: Vec<Value>) -> BuiltinResult {
    expect_arguments(builtin, &arguments)?;

    let symbols = expect_qexpr(builtin, 0, arguments.remove(0))?;
    let symbols = expect_symbols(builtin, symbols)?;
    if symbols.len() != arguments.len() {
        return Err(format!(
            "Function '{}' passed incorrect number of values for symbols. Got {}, Expected {}.",
            builtin.name(), arguments.len(), symbols.len()
        ))
    }

    for (symbol, value) in symbols.iter().zip(arguments) {
        debug!(symbol = symbol.as_str(), %value, builtin = builtin.name(), "define");
        match builtin {
            Builtin::Def => environment.define_global(symbol, value),
            _ => environment.define_local(symbol, value),
        }
    }

    Ok(Value::sexpr())
}

fn builtin_load(environment: &Environment, mut arguments: Vec<Value>) -> BuiltinResult {
    check_count(Builtin::Load, &arguments, 1)?;
    let path = expect_string(Builtin::Load, 0, arguments.remove(0))?;
    Ok(load(environment, &path))
}

fn builtin_print(arguments: Vec<Value>) -> BuiltinResult {
    expect_arguments(Builtin::Print, &arguments)?;
    println!("{}", arguments.iter().join(" "));
    Ok(Value::sexpr())
}

fn builtin_error(mut arguments: Vec<Value>) -> BuiltinResult {
    check_count(Builtin::Error, &arguments, 1)?;
    expect_string(Builtin::Error, 0, arguments.remove(0)).map(Value::Error)
}

pub(crate) fn builtin_environment() -> Environment {
    let environment = Environment::new();
    for builtin in Builtin::ALL {
        environment.define_local(builtin.name(), Value::builtin(builtin));
    }
    environment
}
