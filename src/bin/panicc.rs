use std::env;
use std::fs;
use std::process;

use anyhow::{bail, Context, Result};
use log::info;
use panic_lang::error::PanicError;
use panic_lang::{CompileOptions, Compiler};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Js,
    Ir,
}

struct Options {
    compile: CompileOptions,
    emit: Emit,
    input: String,
    output: Option<String>,
}

fn print_usage() {
    println!("PANIC Compiler v{}", VERSION);
    println!("Usage: panicc [options] <source_file.panic>");
    println!();
    println!("Options:");
    println!("  --no-optimize         Skip the optimization pass");
    println!("  --emit <js|ir>        Output JavaScript (default) or the typed program");
    println!("  --indent <n>          Spaces per indentation level (default: 2)");
    println!("  -o <file>             Write the output to <file> instead of stdout");
    println!("  --version, -v         Show the version");
    println!("  --help, -h            Show this help");
    println!();
    println!("Set RUST_LOG=debug to trace the compiler stages.");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut compile = CompileOptions::default();
    let mut emit = Emit::Js;
    let mut input = None;
    let mut output = None;
    let mut i = 1;

    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--version" | "-v" => {
                println!("PANIC Compiler v{}", VERSION);
                process::exit(0);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--no-optimize" => compile.optimize = false,
            "--emit" => {
                i += 1;
                emit = match args.get(i).map(String::as_str) {
                    Some("js") => Emit::Js,
                    Some("ir") => Emit::Ir,
                    Some(other) => return Err(format!("Unknown output kind: {}", other)),
                    None => return Err("--emit requires an argument".to_string()),
                };
            }
            "--indent" => {
                i += 1;
                compile.indent = args
                    .get(i)
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| "--indent requires a number".to_string())?;
            }
            "-o" => {
                i += 1;
                output = Some(args.get(i).cloned().ok_or_else(|| "-o requires a file name".to_string())?);
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                input = Some(arg.clone());
            }
        }
        i += 1;
    }

    let input = input.ok_or_else(|| "No source file given".to_string())?;
    Ok(Options { compile, emit, input, output })
}

/// Prints the error followed by the offending source line and a caret.
fn print_error_with_context(error: &PanicError, source: &str, file: &str) {
    let location = error.location();
    eprintln!("{}: {}", file, error);
    if let Some(line) = source.lines().nth(location.line.saturating_sub(1)) {
        eprintln!("  {}", line);
        eprintln!("  {}^", " ".repeat(location.column.saturating_sub(1)));
    }
}

fn run(options: &Options) -> Result<()> {
    let source = fs::read_to_string(&options.input)
        .with_context(|| format!("Failed to read {}", options.input))?;
    let compiler = Compiler::with_options(options.compile);

    let result = match options.emit {
        Emit::Js => compiler.compile(&source).map(|lines| lines.join("\n") + "\n"),
        Emit::Ir => compiler.analyze(&source).map(|program| format!("{:#?}\n", program)),
    };
    let text = match result {
        Ok(text) => text,
        Err(error) => {
            print_error_with_context(&error, &source, &options.input);
            bail!("compilation of {} failed", options.input);
        }
    };

    match &options.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path))?;
            info!("wrote {}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(2);
        }
    };
    run(&options)
}
