use std::io::{stdin, stdout, Write};

use clap::Parser;

use interpreter::{Interpreter, Limits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LEN};

mod render;
use render::Renderer;

/// Evaluates arithmetic expressions (numbers, + - * /, parentheses, unary minus).
#[derive(clap::Parser)]
struct Args {
    /// Expression to evaluate. Starts a prompt when omitted.
    #[arg(allow_hyphen_values = true)]
    expr: Option<String>,

    /// Print results with this many decimals (at most 100).
    #[arg(long, value_parser = clap::value_parser!(u16).range(..=100))]
    precision: Option<u16>,

    /// Render results as HTML fragments, escaping the echoed input.
    #[arg(long)]
    html: bool,

    /// Refuse expressions longer than this many characters.
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_LEN)]
    max_input_len: usize,

    /// Refuse expressions nesting groups and unary minuses deeper than this.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn run_once(source: &str, interpreter: &Interpreter, renderer: &Renderer) -> anyhow::Result<()> {
    let result = interpreter.evaluate(source);
    // Plain errors are reported once, by anyhow on the way out
    if result.is_ok() || renderer.html {
        println!("{}", renderer.render(source, &result));
    }
    result?;
    Ok(())
}

fn run_prompt(interpreter: &Interpreter, renderer: &Renderer) -> anyhow::Result<()> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let source = line.trim_end_matches(['\r', '\n']);
        if source.trim().is_empty() {
            continue;
        }
        println!("{}", renderer.render(source, &interpreter.evaluate(source)));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let interpreter = Interpreter::new(Limits {
        max_input_len: args.max_input_len,
        max_depth: args.max_depth,
    });
    let renderer = Renderer { precision: args.precision.map(usize::from), html: args.html };
    log::debug!("Running with {:?}", interpreter.limits());

    match args.expr {
        Some(expr) => run_once(&expr, &interpreter, &renderer),
        None => run_prompt(&interpreter, &renderer),
    }
}
