#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Builtins and load from variables
#[derive(Arbitrary, Debug)]
enum RokAtom {
    Add, Sub, Mul, Div, Mod, Pow,
    True, False,
    Greater, GreaterEq,
    Less, LessEq, Eq, NotEq,

    List, Head, Tail, Eval,
    Join, Len, Cons, Error,
    Variadic,

    Identifier(String),
    Text(String),
    Number(i64),
}

impl fmt::Display for RokAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            RokAtom::Add => "+",
            RokAtom::Sub => "-",
            RokAtom::Mul => "*",
            RokAtom::Div => "/",
            RokAtom::Mod => "%",
            RokAtom::Pow => "^",
            RokAtom::True => "true",
            RokAtom::False => "false",
            RokAtom::Greater => ">",
            RokAtom::GreaterEq => ">=",
            RokAtom::Less => "<",
            RokAtom::LessEq => "<=",
            RokAtom::Eq => "==",
            RokAtom::NotEq => "!=",
            RokAtom::List => "list",
            RokAtom::Head => "head",
            RokAtom::Tail => "tail",
            RokAtom::Eval => "eval",
            RokAtom::Join => "join",
            RokAtom::Len => "len",
            RokAtom::Cons => "cons",
            RokAtom::Error => "error",
            RokAtom::Variadic => "&",
            RokAtom::Identifier(identifier) => identifier,
            RokAtom::Text(text) => return write!(f, "{:?}", text),
            RokAtom::Number(value) => return write!(f, "{}", value),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum RokCommand {
    // Functions taking Q-Expressions
    Lambda(Vec<RokCommand>),
    Def(Vec<RokCommand>),
    Put(Vec<RokCommand>),
    If(Vec<RokCommand>),

    SExpression(Vec<RokCommand>),
    QExpression(Vec<RokCommand>),
    Atom(RokAtom),
}

fn stringify_arguments(values: &[RokCommand]) -> String {
    values.iter()
        .map(RokCommand::to_string)
        .join(" ")
}

impl fmt::Display for RokCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RokCommand::Atom(atom) => atom.fmt(f),
            RokCommand::SExpression(args) => write!(f, "({})", stringify_arguments(args)),
            RokCommand::QExpression(args) => write!(f, "{{{}}}", stringify_arguments(args)),
            RokCommand::Lambda(args) => write!(f, "(\\ {})", stringify_arguments(args)),
            RokCommand::Def(args) => write!(f, "(def {})", stringify_arguments(args)),
            RokCommand::Put(args) => write!(f, "(= {})", stringify_arguments(args)),
            RokCommand::If(args) => write!(f, "(if {})", stringify_arguments(args)),
        }
    }
}

fuzz_target!(|commands: Vec<RokCommand>| {
    {
        let context = rok::EvaluationContext::new();

        for command in commands {
            let command = command.to_string();
            let _ = context.evaluate_str(&command);
        }
    }
});
