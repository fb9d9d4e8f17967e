
mod builtin;
mod context;
mod environment;
mod error;
mod interpreter;
mod parser;
mod reader;
mod stack;
mod value;

#[cfg(test)]
mod test_utils;

pub use builtin::Builtin;
pub use context::EvaluationContext;
pub use environment::Environment;
pub use error::RokError;
pub use interpreter::{apply, evaluate};
pub use parser::{parse, Node, NodeKind};
pub use reader::read;
pub use value::{Function, Lambda, Value};
