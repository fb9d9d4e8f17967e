use std::io;

use rok::{EvaluationContext, Value};
use rustyline::{error::ReadlineError, DefaultEditor};

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only log when asked to, and never onto stdout
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_files(context: &EvaluationContext, paths: &[String]) -> anyhow::Result<()> {
    for path in paths {
        if let Value::Error(message) = context.load_file(path) {
            anyhow::bail!("{}: {}", path, message);
        }
    }

    Ok(())
}

/// What the REPL prints for one line of input. Blank lines print nothing.
fn respond(context: &EvaluationContext, line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None
    }

    match context.evaluate_str(line) {
        Ok(value) => Some(value.to_string()),
        Err(err) => Some(format!("Error: {}", err)),
    }
}

fn run_repl(context: &EvaluationContext) -> anyhow::Result<()> {
    println!("Rok Version 0.1.0");
    println!("Press Ctrl-C or Ctrl-D to Exit\n");

    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline("rok> ") {
            Ok(line) => {
                if let Some(output) = respond(context, &line) {
                    let _ = editor.add_history_entry(line.trim());
                    println!("{}", output);
                }
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let context = EvaluationContext::new();

    if paths.is_empty() {
        run_repl(&context)
    } else {
        run_files(&context, &paths)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn repl_lines_share_one_context() {
        let context = EvaluationContext::new();

        assert_eq!(respond(&context, "   "), None);
        assert_eq!(respond(&context, "def {x} 4").as_deref(), Some("()"));
        assert_eq!(respond(&context, "  * x x  ").as_deref(), Some("16"));
        assert_eq!(respond(&context, "head {}").as_deref(), Some("Error: Function 'head' passed {}!"));
        assert_eq!(respond(&context, "(+ 1").as_deref(), Some("Error: syntax error: unclosed '('"));
    }

    #[test]
    fn failing_files_stop_the_run() {
        let context = EvaluationContext::new();
        let missing = vec!["/definitely/not/here.rok".to_owned()];

        assert!(run_files(&context, &missing).is_err());
        assert!(run_files(&context, &[]).is_ok());
    }
}
